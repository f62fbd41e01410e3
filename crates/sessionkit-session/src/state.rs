//! Session state: the data the client knows about the current principal.
//!
//! A [`SessionState`] is the pair the server issued at login:
//! - WHAT proves the session (the bearer [`Token`])
//! - WHO it belongs to (the [`UserProfile`])
//!
//! "Authenticated" is not stored; it is derived from the token every time
//! it is asked for, so it can never disagree with it.

use sessionkit_protocol::{Token, UserProfile};

/// A point-in-time copy of the session.
///
/// Returned by [`SessionContext::snapshot`](crate::SessionContext::snapshot).
/// Mutating a snapshot has no effect on the live session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub(crate) token: Option<Token>,
    pub(crate) user: Option<UserProfile>,
}

impl SessionState {
    /// The bearer token, if a session is active.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// The cached profile. May be present while a fresh one is being
    /// fetched, and may be stale until then.
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// `true` iff the token is present and non-empty.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// `true` iff the cached user is an administrator.
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::is_admin)
    }

    /// `true` iff the cached user has a pro account.
    pub fn is_pro(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::is_pro)
    }
}
