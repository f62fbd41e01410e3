//! [`AuthService`]: the HTTP-backed [`AuthApi`].

use std::sync::Arc;

use sessionkit_protocol::{Credentials, Session, SignupRequest, Token, UserProfile};
use sessionkit_transport::AuthTransport;

use crate::{AuthApi, AuthFailure, AuthResult, FETCH_USER_FAILED, LOGIN_FAILED, SIGNUP_FAILED};

const LOGIN_PATH: &str = "/auth/login";
const SIGNUP_PATH: &str = "/auth/signup";
const ME_PATH: &str = "/auth/me";

/// Talks to the auth API through an [`AuthTransport`] and turns every
/// outcome into an [`AuthResult`].
#[derive(Clone)]
pub struct AuthService {
    transport: Arc<AuthTransport>,
}

impl AuthService {
    pub fn new(transport: Arc<AuthTransport>) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<AuthTransport> {
        &self.transport
    }
}

impl AuthApi for AuthService {
    async fn login(&self, credentials: &Credentials) -> AuthResult<Session> {
        match self.transport.post(LOGIN_PATH, credentials).await {
            Ok(session) => {
                tracing::info!(username = %credentials.username, "login succeeded");
                Ok(session)
            }
            Err(error) => {
                let failure = AuthFailure::from_transport(&error, LOGIN_FAILED, true);
                tracing::debug!(
                    username = %credentials.username,
                    status = ?failure.status,
                    "login failed: {failure}"
                );
                Err(failure)
            }
        }
    }

    async fn signup(&self, user_data: &SignupRequest) -> AuthResult<Session> {
        match self.transport.post(SIGNUP_PATH, user_data).await {
            Ok(session) => {
                tracing::info!(username = %user_data.username, "signup succeeded");
                Ok(session)
            }
            Err(error) => {
                let failure = AuthFailure::from_transport(&error, SIGNUP_FAILED, true);
                tracing::debug!(
                    username = %user_data.username,
                    status = ?failure.status,
                    "signup failed: {failure}"
                );
                Err(failure)
            }
        }
    }

    async fn get_fresh_user_data(&self) -> AuthResult<UserProfile> {
        self.transport
            .get(ME_PATH)
            .await
            .map_err(|error| AuthFailure::from_transport(&error, FETCH_USER_FAILED, false))
    }

    fn logout(&self) {
        if let Err(error) = self.transport.store().clear() {
            tracing::error!(%error, "failed to clear session store on logout");
        }
        self.transport.clear_auth_header();
    }

    fn install_token(&self, token: Option<&Token>) {
        match token {
            Some(token) => {
                if let Err(error) = self.transport.set_auth_header(token) {
                    tracing::warn!(%error, "token not installed as default header");
                }
            }
            None => self.transport.clear_auth_header(),
        }
    }
}
