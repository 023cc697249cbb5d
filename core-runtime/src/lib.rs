//! # Core Runtime Module
//!
//! Foundational infrastructure shared by every Linkup client crate:
//! - Logging and tracing setup (`logging`)
//! - Fail-fast configuration and dependency wiring (`config`)
//! - The event bus that carries user-facing notifications (`events`)
//!
//! ## Overview
//!
//! Nothing in here knows about routes or uploads. Domain crates depend on this
//! one for their configuration inputs and publish their outcomes on the
//! [`events::EventBus`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
