//! Integration tests for navigation through the standard route table.

use std::sync::Arc;

use sessionkit_auth::MockAuthApi;
use sessionkit_protocol::{Session, Token, UserProfile};
use sessionkit_router::{
    GuardConfig, MAX_REDIRECTS, RouteGuard, RouteMeta, RouteTable, Router, RouterError,
};
use sessionkit_session::SessionContext;
use sessionkit_store::{MemoryStorage, SessionStore};

// =========================================================================
// Helpers
// =========================================================================

fn router() -> Router {
    Router::default()
}

fn context() -> SessionContext<MockAuthApi> {
    SessionContext::hydrate(
        SessionStore::new(MemoryStorage::new()),
        Arc::new(MockAuthApi::new()),
    )
    .unwrap()
}

// =========================================================================
// Guard redirects
// =========================================================================

#[test]
fn test_navigate_home_unauthenticated_lands_on_login() {
    let r = router();
    assert_eq!(r.navigate("/", &false).unwrap(), "/login");
    assert_eq!(r.current(), "/login");
}

#[test]
fn test_navigate_login_authenticated_lands_home() {
    let r = router();
    assert_eq!(r.navigate("/login", &true).unwrap(), "/");
    assert_eq!(r.current(), "/");
}

#[test]
fn test_navigate_guest_pages_unauthenticated_are_admitted() {
    let r = router();
    for path in ["/login", "/signup", "/info", "/donation"] {
        assert_eq!(r.navigate(path, &false).unwrap(), path);
    }
}

#[test]
fn test_navigate_unknown_path_follows_catch_all_then_guard() {
    let r = router();
    // Unknown → "/" (catch-all) → "/login" (guard).
    assert_eq!(r.navigate("/does/not/exist", &false).unwrap(), "/login");
    assert_eq!(r.navigate("/does/not/exist", &true).unwrap(), "/");
}

#[test]
fn test_navigate_disabled_guard_admits_protected_route() {
    let r = Router::new(RouteTable::standard(), RouteGuard::new(GuardConfig::disabled()));
    assert_eq!(r.navigate("/", &false).unwrap(), "/");
    assert_eq!(r.navigate("/login", &true).unwrap(), "/login");
}

// =========================================================================
// Errors
// =========================================================================

#[test]
fn test_navigate_relative_path_is_rejected() {
    let err = router().navigate("login", &false).unwrap_err();
    assert!(matches!(err, RouterError::InvalidPath(p) if p == "login"));
}

#[test]
fn test_navigate_without_catch_all_is_not_found() {
    let r = Router::new(
        RouteTable::new().route("/login", "Login", RouteMeta::GUEST_ONLY),
        RouteGuard::default(),
    );
    let err = r.navigate("/elsewhere", &false).unwrap_err();
    assert!(matches!(err, RouterError::NotFound(p) if p == "/elsewhere"));
}

#[test]
fn test_navigate_self_guarded_login_is_a_loop() {
    // The login page itself requires a session: no way out.
    let r = Router::new(
        RouteTable::new().route("/login", "Login", RouteMeta::REQUIRES_AUTH),
        RouteGuard::default(),
    );
    let err = r.navigate("/login", &false).unwrap_err();
    assert!(matches!(
        err,
        RouterError::RedirectLoop { hops, .. } if hops == MAX_REDIRECTS
    ));
    assert_eq!(r.current(), "/login", "location is untouched on failure");
}

// =========================================================================
// Session integration
// =========================================================================

#[test]
fn test_navigate_reads_session_context() {
    let r = router();
    let ctx = context();
    assert_eq!(r.navigate("/", &ctx).unwrap(), "/login");

    ctx.commit_session(Session {
        token: Token::new("tok"),
        user: UserProfile::default(),
    })
    .unwrap();
    assert_eq!(r.navigate("/", &ctx).unwrap(), "/");

    ctx.logout().unwrap();
    assert_eq!(r.navigate("/", &ctx).unwrap(), "/login");
}

#[test]
fn test_redirect_to_login_moves_without_guard() {
    let r = router();
    r.navigate("/login", &true).unwrap();
    assert_eq!(r.current(), "/");

    r.redirect_to_login();
    assert_eq!(r.current(), "/login");
}
