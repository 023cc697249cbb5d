//! # Navigator
//!
//! Resolves a requested path against the [`RouteTable`], runs the
//! [`NavigationGuard`] and follows redirects until a route is allowed.
//!
//! A redirect is itself a navigation: the guard runs again on the target. A
//! misconfigured table (for example a `login` route that requires
//! authentication) would bounce forever, so the chain is capped at
//! [`MAX_REDIRECTS`].

use crate::error::{Result, RouterError};
use crate::guard::{Action, NavigationGuard};
use crate::route::{path_only, RouteMatch, RouteTable};
use core_auth::CredentialProvider;
use core_runtime::events::{CoreEvent, EventBus, NavigationEvent};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest redirect chain followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The requested route may be rendered.
    Allowed(RouteMatch),
    /// The guard sent the user elsewhere; `to` is the route to render.
    Redirected { from: String, to: RouteMatch },
    /// No route matches.
    NotFound { path: String },
}

impl Navigation {
    /// The route the host should render, if any.
    pub fn destination(&self) -> Option<&RouteMatch> {
        match self {
            Navigation::Allowed(m) => Some(m),
            Navigation::Redirected { to, .. } => Some(to),
            Navigation::NotFound { .. } => None,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirected { .. })
    }
}

/// Entry point for every route transition.
#[derive(Debug, Clone)]
pub struct Navigator {
    table: Arc<RouteTable>,
    guard: NavigationGuard,
    event_bus: Option<EventBus>,
}

impl Navigator {
    pub fn new(table: Arc<RouteTable>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            table,
            guard: NavigationGuard::new(credentials),
            event_bus: None,
        }
    }

    /// Publish navigation outcomes on `event_bus`.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Navigate to a concrete path.
    ///
    /// # Errors
    ///
    /// - [`RouterError::RedirectLoop`] when more than [`MAX_REDIRECTS`]
    ///   redirects happen in a row
    /// - [`RouterError::UnknownRoute`] when the guard redirects to a route
    ///   name the table does not define
    pub fn navigate(&self, path: &str) -> Result<Navigation> {
        let Some(mut current) = self.table.resolve(path) else {
            let path = path_only(path).to_string();
            debug!(path = %path, "No route matches");
            self.publish(NavigationEvent::NotFound { path: path.clone() });
            return Ok(Navigation::NotFound { path });
        };

        let mut redirects = 0;
        while let Action::RedirectTo(target) = self.guard.check(&current.route) {
            redirects += 1;
            if redirects > MAX_REDIRECTS {
                warn!(path = path_only(path), limit = MAX_REDIRECTS, "Redirect loop detected");
                return Err(RouterError::RedirectLoop {
                    path: path_only(path).to_string(),
                    limit: MAX_REDIRECTS,
                });
            }

            let name = target.route_name();
            let href = self.table.href(name, &BTreeMap::new())?;
            debug!(from = %current.path, to = name, "Guard redirect");
            current = self
                .table
                .resolve(&href)
                .ok_or_else(|| RouterError::UnknownRoute(name.to_string()))?;
        }

        if redirects == 0 {
            debug!(route = %current.route.name, path = %current.path, "Navigation allowed");
            self.publish(NavigationEvent::Entered {
                route: current.route.name.clone(),
                path: current.path.clone(),
            });
            return Ok(Navigation::Allowed(current));
        }

        let from = path_only(path).to_string();
        info!(from = %from, to = %current.route.name, "Navigation redirected");
        self.publish(NavigationEvent::Redirected {
            from: from.clone(),
            to: current.route.name.clone(),
        });
        Ok(Navigation::Redirected { from, to: current })
    }

    /// Navigate to a route by name.
    pub fn navigate_named(&self, name: &str, params: &BTreeMap<String, String>) -> Result<Navigation> {
        let path = self.table.href(name, params)?;
        self.navigate(&path)
    }

    fn publish(&self, event: NavigationEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(CoreEvent::Navigation(event));
        }
    }
}
