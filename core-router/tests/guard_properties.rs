//! Guard decisions over the full Linkup route table

use core_auth::{CredentialToken, StaticCredentials};
use core_router::{
    decide, AccessRequirement, Action, Navigation, Navigator, RedirectTarget, RouteDescriptor,
    RouteTable,
};
use std::sync::Arc;

fn token() -> CredentialToken {
    CredentialToken::new("abc123").unwrap()
}

fn routes_with(access: AccessRequirement) -> Vec<RouteDescriptor> {
    let table = RouteTable::linkup().unwrap();
    table
        .routes()
        .iter()
        .filter(|r| r.access == access)
        .cloned()
        .collect()
}

#[test]
fn protected_routes_without_token_redirect_to_login() {
    let routes = routes_with(AccessRequirement::RequiresAuthenticated);
    assert!(!routes.is_empty());

    for route in &routes {
        assert_eq!(
            decide(route, None),
            Action::RedirectTo(RedirectTarget::Login),
            "{}",
            route.name
        );
    }
}

#[test]
fn protected_routes_with_token_proceed() {
    let token = token();
    for route in &routes_with(AccessRequirement::RequiresAuthenticated) {
        assert_eq!(decide(route, Some(&token)), Action::Proceed, "{}", route.name);
    }
}

#[test]
fn guest_routes_with_token_redirect_home() {
    let token = token();
    for route in &routes_with(AccessRequirement::RequiresGuest) {
        assert_eq!(
            decide(route, Some(&token)),
            Action::RedirectTo(RedirectTarget::Home),
            "{}",
            route.name
        );
        assert_eq!(decide(route, None), Action::Proceed);
    }
}

#[test]
fn unrestricted_routes_always_proceed() {
    let about = RouteDescriptor::new("/about", "about", "AboutPage", AccessRequirement::Unrestricted)
        .unwrap();
    let token = token();

    assert_eq!(decide(&about, None), Action::Proceed);
    assert_eq!(decide(&about, Some(&token)), Action::Proceed);
}

#[test]
fn scenario_anonymous_user_opens_profile() {
    let navigator = Navigator::new(
        Arc::new(RouteTable::linkup().unwrap()),
        Arc::new(StaticCredentials::anonymous()),
    );

    let nav = navigator.navigate("/me").unwrap();
    assert!(nav.is_redirect());
    assert_eq!(nav.destination().unwrap().route.name, "login");
}

#[test]
fn scenario_signed_in_user_opens_login() {
    let navigator = Navigator::new(
        Arc::new(RouteTable::linkup().unwrap()),
        Arc::new(StaticCredentials::from_raw(Some("abc123"))),
    );

    let nav = navigator.navigate("/login").unwrap();
    match nav {
        Navigation::Redirected { from, to } => {
            assert_eq!(from, "/login");
            assert_eq!(to.route.name, "home");
        }
        other => panic!("expected redirect home, got {other:?}"),
    }
}

#[test]
fn scenario_signed_in_user_searches() {
    let navigator = Navigator::new(
        Arc::new(RouteTable::linkup().unwrap()),
        Arc::new(StaticCredentials::with_token(token())),
    );

    let nav = navigator.navigate("/search?q=rust").unwrap();
    let Navigation::Allowed(matched) = nav else {
        panic!("expected Allowed");
    };
    assert_eq!(matched.route.view, "SearchPage");
    assert_eq!(matched.path, "/search");
}

#[test]
fn empty_stored_token_counts_as_signed_out() {
    let navigator = Navigator::new(
        Arc::new(RouteTable::linkup().unwrap()),
        Arc::new(StaticCredentials::from_raw(Some(""))),
    );

    let nav = navigator.navigate("/thread/create").unwrap();
    assert_eq!(nav.destination().unwrap().route.name, "login");
}

#[test]
fn whitespace_stored_token_counts_as_signed_in() {
    let navigator = Navigator::new(
        Arc::new(RouteTable::linkup().unwrap()),
        Arc::new(StaticCredentials::from_raw(Some("  "))),
    );

    let nav = navigator.navigate("/login").unwrap();
    assert!(nav.is_redirect());
    assert_eq!(nav.destination().unwrap().route.name, "home");
}
