//! The navigation guard.
//!
//! Evaluated before every navigation:
//!
//! ```text
//! requires_auth && !authenticated  → Redirect(login_path)
//! guest_only    &&  authenticated  → Redirect(home_path)
//! otherwise                        → Admit
//! ```

use std::sync::Arc;

use sessionkit_auth::AuthApi;
use sessionkit_session::SessionContext;

use crate::{GuardConfig, RouteMeta};

/// Anything the guard can ask "is there an active session?".
pub trait SessionView {
    fn is_authenticated(&self) -> bool;
}

impl SessionView for bool {
    fn is_authenticated(&self) -> bool {
        *self
    }
}

impl<A: AuthApi> SessionView for SessionContext<A> {
    fn is_authenticated(&self) -> bool {
        SessionContext::is_authenticated(self)
    }
}

impl<T: SessionView + ?Sized> SessionView for Arc<T> {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }
}

/// What the guard decided for one navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Admit,
    Redirect(String),
}

/// Applies [`GuardConfig`] to route metadata.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    config: GuardConfig,
}

impl RouteGuard {
    pub fn new(config: GuardConfig) -> Self {
        if !config.enforce {
            tracing::warn!("route guard enforcement is disabled");
        }
        Self { config }
    }

    pub fn check(&self, meta: &RouteMeta, authenticated: bool) -> GuardDecision {
        if !self.config.enforce {
            return GuardDecision::Admit;
        }
        if meta.requires_auth && !authenticated {
            return GuardDecision::Redirect(self.config.login_path.clone());
        }
        if meta.guest_only && authenticated {
            return GuardDecision::Redirect(self.config.home_path.clone());
        }
        GuardDecision::Admit
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> RouteGuard {
        RouteGuard::new(GuardConfig::default())
    }

    #[test]
    fn test_check_protected_without_session_redirects_to_login() {
        assert_eq!(
            guard().check(&RouteMeta::REQUIRES_AUTH, false),
            GuardDecision::Redirect("/login".into())
        );
    }

    #[test]
    fn test_check_guest_only_with_session_redirects_home() {
        assert_eq!(
            guard().check(&RouteMeta::GUEST_ONLY, true),
            GuardDecision::Redirect("/".into())
        );
    }

    #[test]
    fn test_check_admits_matching_access() {
        let g = guard();
        assert_eq!(g.check(&RouteMeta::REQUIRES_AUTH, true), GuardDecision::Admit);
        assert_eq!(g.check(&RouteMeta::GUEST_ONLY, false), GuardDecision::Admit);
        assert_eq!(g.check(&RouteMeta::PUBLIC, true), GuardDecision::Admit);
        assert_eq!(g.check(&RouteMeta::PUBLIC, false), GuardDecision::Admit);
    }

    #[test]
    fn test_check_disabled_admits_everything() {
        let g = RouteGuard::new(GuardConfig::disabled());
        assert_eq!(g.check(&RouteMeta::REQUIRES_AUTH, false), GuardDecision::Admit);
        assert_eq!(g.check(&RouteMeta::GUEST_ONLY, true), GuardDecision::Admit);
    }

    #[test]
    fn test_session_view_for_arc_delegates() {
        let view: Arc<bool> = Arc::new(true);
        assert!(view.is_authenticated());
    }
}
