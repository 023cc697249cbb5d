//! # Router Module
//!
//! Declarative route table with an authentication gate.
//!
//! ## Overview
//!
//! - [`RouteTable`]: ordered, immutable route descriptors with `:param`
//!   patterns; the first match wins.
//! - [`decide`] / [`NavigationGuard`]: allow, redirect to `login`, or redirect
//!   to `home` depending on the route's [`AccessRequirement`] and whether a
//!   credential token is present.
//! - [`Navigator`]: resolves a path, applies the guard and follows redirects.
//!
//! ```
//! use core_auth::StaticCredentials;
//! use core_router::{Navigation, Navigator, RouteTable};
//! use std::sync::Arc;
//!
//! let navigator = Navigator::new(
//!     Arc::new(RouteTable::linkup().unwrap()),
//!     Arc::new(StaticCredentials::anonymous()),
//! );
//!
//! let nav = navigator.navigate("/me").unwrap();
//! assert!(matches!(nav, Navigation::Redirected { .. }));
//! assert_eq!(nav.destination().unwrap().route.name, "login");
//! ```

pub mod error;
pub mod guard;
pub mod navigator;
pub mod route;

pub use error::{Result, RouterError};
pub use guard::{decide, Action, NavigationGuard, RedirectTarget, HOME_ROUTE, LOGIN_ROUTE};
pub use navigator::{Navigation, Navigator, MAX_REDIRECTS};
pub use route::{AccessRequirement, PathPattern, RouteDescriptor, RouteMatch, RouteTable, RouteTableBuilder};
