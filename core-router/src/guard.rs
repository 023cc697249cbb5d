//! # Navigation Guard
//!
//! Decides whether a route transition may go ahead. The decision looks at
//! two things only: the route's [`AccessRequirement`] and whether a credential
//! token is present. The token is never inspected or validated here.
//!
//! | access                   | token   | action               |
//! |--------------------------|---------|----------------------|
//! | requires-authenticated   | absent  | redirect to `login`  |
//! | requires-guest           | present | redirect to `home`   |
//! | anything else            |         | proceed              |

use crate::route::{AccessRequirement, RouteDescriptor};
use core_auth::{CredentialProvider, CredentialToken};
use std::fmt;
use std::sync::Arc;

/// Route name the guard sends anonymous users to.
pub const LOGIN_ROUTE: &str = "login";
/// Route name the guard sends signed-in users to.
pub const HOME_ROUTE: &str = "home";

/// Where a blocked transition is sent instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
    Home,
}

impl RedirectTarget {
    /// Name of the route in the table.
    pub fn route_name(&self) -> &'static str {
        match self {
            RedirectTarget::Login => LOGIN_ROUTE,
            RedirectTarget::Home => HOME_ROUTE,
        }
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_name())
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Proceed,
    RedirectTo(RedirectTarget),
}

/// Decide what happens when entering `route` with `token`.
///
/// Pure and total: same inputs, same answer, no I/O.
///
/// Only the presence of a token is checked. Expiry and server-side validity
/// are not, so a stale token still opens protected routes until the backend
/// rejects it.
///
/// ```
/// use core_auth::CredentialToken;
/// use core_router::{decide, AccessRequirement, Action, RedirectTarget, RouteDescriptor};
///
/// let me = RouteDescriptor::new("/me", "my-profile", "MyProfilePage",
///     AccessRequirement::RequiresAuthenticated).unwrap();
/// assert_eq!(decide(&me, None), Action::RedirectTo(RedirectTarget::Login));
///
/// let token = CredentialToken::new("abc123").unwrap();
/// assert_eq!(decide(&me, Some(&token)), Action::Proceed);
/// ```
pub fn decide(route: &RouteDescriptor, token: Option<&CredentialToken>) -> Action {
    decide_access(route.access, token.is_some())
}

pub(crate) fn decide_access(access: AccessRequirement, has_token: bool) -> Action {
    match (access, has_token) {
        (AccessRequirement::RequiresAuthenticated, false) => {
            Action::RedirectTo(RedirectTarget::Login)
        }
        (AccessRequirement::RequiresGuest, true) => Action::RedirectTo(RedirectTarget::Home),
        _ => Action::Proceed,
    }
}

/// The guard bound to a credential source.
#[derive(Clone)]
pub struct NavigationGuard {
    credentials: Arc<dyn CredentialProvider>,
}

impl NavigationGuard {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { credentials }
    }

    /// Check `route` against the credential held right now.
    pub fn check(&self, route: &RouteDescriptor) -> Action {
        decide_access(route.access, self.credentials.has_token())
    }
}

impl fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("has_token", &self.credentials.has_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_auth::StaticCredentials;

    fn route(access: AccessRequirement) -> RouteDescriptor {
        RouteDescriptor::new("/x", "x", "XPage", access).unwrap()
    }

    #[test]
    fn test_decision_table() {
        use AccessRequirement::*;

        let cases = [
            (RequiresAuthenticated, false, Action::RedirectTo(RedirectTarget::Login)),
            (RequiresAuthenticated, true, Action::Proceed),
            (RequiresGuest, false, Action::Proceed),
            (RequiresGuest, true, Action::RedirectTo(RedirectTarget::Home)),
            (Unrestricted, false, Action::Proceed),
            (Unrestricted, true, Action::Proceed),
        ];

        for (access, has_token, expected) in cases {
            assert_eq!(
                decide_access(access, has_token),
                expected,
                "{access} with token={has_token}"
            );
        }
    }

    #[test]
    fn test_decide_only_looks_at_presence() {
        let guest_only = route(AccessRequirement::RequiresGuest);
        let odd = CredentialToken::new("not-a-jwt").unwrap();

        assert_eq!(
            decide(&guest_only, Some(&odd)),
            Action::RedirectTo(RedirectTarget::Home)
        );
    }

    #[test]
    fn test_guard_reads_provider() {
        let authed = NavigationGuard::new(Arc::new(StaticCredentials::from_raw(Some("abc123"))));
        let anonymous = NavigationGuard::new(Arc::new(StaticCredentials::from_raw(Some(""))));
        let protected = route(AccessRequirement::RequiresAuthenticated);

        assert_eq!(authed.check(&protected), Action::Proceed);
        assert_eq!(
            anonymous.check(&protected),
            Action::RedirectTo(RedirectTarget::Login)
        );
    }

    #[test]
    fn test_redirect_target_names() {
        assert_eq!(RedirectTarget::Login.route_name(), "login");
        assert_eq!(RedirectTarget::Home.to_string(), "home");
    }
}
