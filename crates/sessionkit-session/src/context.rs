//! The session context: the single, process-wide holder of session state.
//!
//! This is the central piece of the session layer. It is responsible for:
//! - Hydrating the session from the durable store at startup
//! - Committing tokens and profiles returned by the auth API
//! - Mirroring every commit into the [`SessionStore`] (write-through)
//! - Tearing the session down in one step on logout or expiry
//!
//! # Ownership
//!
//! There is exactly one `SessionContext` per client, created by the
//! composition root and shared as `Arc<SessionContext<A>>` with the
//! transport hook, the route guard and the refresh loop. The fields are
//! private: the mutation methods below are the only way state changes.
//!
//! # Locking
//!
//! State sits behind a `std::sync::RwLock`. The lock is never held across
//! an `.await`: async methods read what they need, drop the guard, talk to
//! the API, then take the lock again to commit. Two commits racing each
//! other resolve as last-write-wins.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sessionkit_auth::{AuthApi, AuthFailure, AuthResult, LOGIN_FAILED, SIGNUP_FAILED};
use sessionkit_protocol::{Credentials, Session, SignupRequest, Token, UserProfile};
use sessionkit_store::SessionStore;

use crate::{SessionError, SessionState};

/// Process-wide session state, kept in sync with a [`SessionStore`].
///
/// ## Lifecycle
///
/// ```text
/// hydrate() ──→ [optimistic state from disk] ──→ load_user_data()
///                         │                            │
///           login()/signup()/set_token()        [fresh profile]
///                         │                            │
///                         ▼                            ▼
///                   [authenticated] ──(logout / 401)──→ [empty]
/// ```
pub struct SessionContext<A: AuthApi> {
    state: RwLock<SessionState>,
    store: SessionStore,
    api: Arc<A>,
}

impl<A: AuthApi> SessionContext<A> {
    /// Builds the context from whatever the store currently holds.
    ///
    /// This is optimistic: the stored profile may be stale and the token
    /// may already be expired. Call [`load_user_data`](Self::load_user_data)
    /// afterwards to find out.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the store can't be read.
    pub fn hydrate(store: SessionStore, api: Arc<A>) -> Result<Self, SessionError> {
        let token = store.load_token()?;
        let user = store.load_user()?;

        api.install_token(token.as_ref());
        tracing::debug!(
            authenticated = token.is_some(),
            has_user = user.is_some(),
            "session hydrated from store"
        );

        Ok(Self {
            state: RwLock::new(SessionState { token, user }),
            store,
            api,
        })
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Sets (or clears, with `None`) the token.
    ///
    /// An empty token is treated as `None`. The store is written first;
    /// if that fails the in-memory token is left as it was.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the write-through fails.
    pub fn set_token(&self, token: Option<Token>) -> Result<(), SessionError> {
        let token = token.filter(|t| !t.is_empty());
        let mut state = self.write();

        self.store.set_token(token.as_ref())?;
        self.api.install_token(token.as_ref());
        state.token = token;

        tracing::debug!(authenticated = state.is_authenticated(), "token updated");
        Ok(())
    }

    /// Sets (or clears, with `None`) the cached profile.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the write-through fails.
    pub fn set_user(&self, user: Option<UserProfile>) -> Result<(), SessionError> {
        let mut state = self.write();

        self.store.set_user(user.as_ref())?;
        state.user = user;

        tracing::debug!(has_user = state.user.is_some(), "user updated");
        Ok(())
    }

    /// Commits a profile only if the session still holds `token`.
    ///
    /// Used by background work that started a fetch under one session and
    /// must not resurrect a profile after a logout (or a different login)
    /// happened in the meantime. Returns `true` if the profile was stored.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the write-through fails.
    pub fn set_user_if_current(
        &self,
        token: &Token,
        user: UserProfile,
    ) -> Result<bool, SessionError> {
        let mut state = self.write();
        if state.token.as_ref() != Some(token) {
            tracing::debug!("session changed while profile was in flight, discarding");
            return Ok(false);
        }

        self.store.set_user(Some(&user))?;
        state.user = Some(user);
        Ok(true)
    }

    /// Commits a full session (token + profile) in one store batch.
    ///
    /// An empty token de-authenticates: the previous token is removed so
    /// it can never end up paired with this profile.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the write-through fails.
    pub fn commit_session(&self, session: Session) -> Result<(), SessionError> {
        let Session { token, user } = session;
        let mut state = self.write();

        if token.is_empty() {
            self.store.set_token(None)?;
            self.api.install_token(None);
            state.token = None;
            self.store.set_user(Some(&user))?;
            state.user = Some(user);
            tracing::debug!("session committed without a token");
            return Ok(());
        }

        self.store.save(&token, &user)?;
        self.api.install_token(Some(&token));

        tracing::info!(user_id = user.id, username = %user.username, "session committed");
        state.token = Some(token);
        state.user = Some(user);
        Ok(())
    }

    /// Tears the session down: token, profile and the remember-me keys are
    /// removed from memory and from the store in a single step.
    ///
    /// Calling it without an active session is a harmless no-op.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the store couldn't be cleared;
    /// the in-memory session is cleared regardless, so the process never
    /// keeps acting on a session it was told to drop.
    pub fn logout(&self) -> Result<(), SessionError> {
        let mut state = self.write();
        let was_authenticated = state.is_authenticated();

        let cleared = self.store.clear_all();
        state.token = None;
        state.user = None;
        self.api.logout();
        drop(state);

        if was_authenticated {
            tracing::info!("logged out");
        }
        cleared.map_err(SessionError::from)
    }

    // -----------------------------------------------------------------
    // Async operations
    // -----------------------------------------------------------------

    /// Fetches a fresh profile and commits it.
    ///
    /// - No token → `Ok(None)` without calling the API.
    /// - Success → the profile is committed and returned, unless the
    ///   session changed while it was in flight (then `Ok(None)`).
    /// - 401 → the session is logged out, `Ok(None)`.
    /// - Any other failure → logged and swallowed, `Ok(None)`.
    ///
    /// # Errors
    /// Only [`SessionError::Store`], when committing or clearing fails.
    pub async fn load_user_data(&self) -> Result<Option<UserProfile>, SessionError> {
        let Some(token) = self.read().token.clone().filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        match self.api.get_fresh_user_data().await {
            Ok(user) => {
                let committed = self.set_user_if_current(&token, user.clone())?;
                Ok(committed.then_some(user))
            }
            Err(failure) if failure.is_unauthorized() => {
                tracing::warn!("session rejected while loading user data");
                self.logout()?;
                Ok(None)
            }
            Err(failure) => {
                tracing::warn!(status = ?failure.status, "failed to load user data: {failure}");
                Ok(None)
            }
        }
    }

    /// Logs in and, on success, commits the session.
    ///
    /// With `remember_me` set, the username is kept for the next login
    /// form; without it, any remembered username is forgotten.
    ///
    /// A 401 tears down whatever session was active. A response without a
    /// token is a failure and leaves the current session untouched.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<Session> {
        let session = self
            .api
            .login(credentials)
            .await
            .map_err(|failure| self.on_auth_failure(failure))?;
        self.commit_or_fail(&session, LOGIN_FAILED)?;

        let remembered = credentials
            .remember_me
            .then_some(credentials.username.as_str());
        if let Err(error) = self.store.remember_username(remembered) {
            tracing::warn!(%error, "failed to update remembered username");
        }
        Ok(session)
    }

    /// Signs up and, on success, commits the session. Failures are
    /// handled as in [`login`](Self::login).
    pub async fn signup(&self, user_data: &SignupRequest) -> AuthResult<Session> {
        let session = self
            .api
            .signup(user_data)
            .await
            .map_err(|failure| self.on_auth_failure(failure))?;
        self.commit_or_fail(&session, SIGNUP_FAILED)?;
        Ok(session)
    }

    fn on_auth_failure(&self, failure: AuthFailure) -> AuthFailure {
        if failure.is_unauthorized() {
            tracing::warn!("credentials rejected, dropping any active session");
            if let Err(error) = self.logout() {
                tracing::error!(%error, "failed to clear session after 401");
            }
        }
        failure
    }

    fn commit_or_fail(&self, session: &Session, fallback: &str) -> AuthResult<()> {
        if session.token.is_empty() {
            tracing::warn!("auth response carried no token, keeping current session");
            return Err(AuthFailure::new(fallback));
        }
        self.commit_session(session.clone()).map_err(|error| {
            tracing::error!(%error, "could not persist new session");
            AuthFailure::new(format!("could not save session: {error}"))
        })
    }

    // -----------------------------------------------------------------
    // Read-only views
    // -----------------------------------------------------------------

    /// A copy of the whole state.
    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    pub fn token(&self) -> Option<Token> {
        self.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.read().is_admin()
    }

    pub fn is_pro(&self) -> bool {
        self.read().is_pro()
    }

    /// The username remembered by a `remember_me` login, if any.
    pub fn saved_username(&self) -> Option<String> {
        self.store.saved_username().unwrap_or_else(|error| {
            tracing::warn!(%error, "failed to read remembered username");
            None
        })
    }

    /// The auth API this context calls.
    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// The durable store this context mirrors into.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// =========================================================================
// Tests
// =========================================================================
