//! # Authentication Module
//!
//! Holds the single opaque credential token the client knows about.
//!
//! ## Overview
//!
//! The login flow writes the token, the logout flow removes it, and the
//! navigation guard asks whether one is present. Nothing here parses the
//! token or checks its expiry; presence is the only fact the client acts on.
//!
//! Readers go through the [`CredentialProvider`] seam so route decisions never
//! touch global state or perform I/O.

pub mod error;
pub mod session;
pub mod types;

pub use error::{AuthError, Result};
pub use session::SessionStore;
pub use types::{CredentialProvider, CredentialToken, StaticCredentials};
