//! The auth API contract and its uniform failure value.
//!
//! Every operation resolves to [`AuthResult`]: `Ok(data)` on success,
//! `Err(AuthFailure)` otherwise. Bad credentials, validation errors, an
//! expired session and a network blip all arrive as values the caller
//! inspects. Nothing panics and nothing needs to be caught.

use std::future::Future;

use sessionkit_protocol::{
    Credentials, ErrorBody, Session, SignupRequest, Token, UserProfile, ValidationErrors,
};
use sessionkit_transport::TransportError;

/// Fallback message when a login failure carries no better description.
pub const LOGIN_FAILED: &str = "Login failed";
/// Fallback message for signup failures.
pub const SIGNUP_FAILED: &str = "Registration failed";
/// Fallback message for profile fetch failures.
pub const FETCH_USER_FAILED: &str = "Failed to get user data";

/// Result of an auth operation.
pub type AuthResult<T> = Result<T, AuthFailure>;

/// Why an auth operation failed, in a form a UI can show directly.
///
/// - `message` — one human-readable line, always present.
/// - `validation_errors` — per-field messages (login/signup only).
/// - `status` — the HTTP status, when the server answered at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub message: String,
    pub validation_errors: Option<ValidationErrors>,
    pub status: Option<u16>,
}

impl AuthFailure {
    /// A failure with only a message (no status, no field errors).
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            validation_errors: None,
            status: None,
        }
    }

    /// Builder-style setter for the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Builds a failure from a transport error.
    ///
    /// The message is picked in order of preference:
    /// 1. the server's structured `error` field,
    /// 2. the transport error's own description,
    /// 3. `fallback`.
    ///
    /// Field-level errors are copied only when `with_validation` is set.
    pub fn from_transport(error: &TransportError, fallback: &str, with_validation: bool) -> Self {
        let body = error.body().map(ErrorBody::from_slice).unwrap_or_default();

        let message = body
            .error
            .or_else(|| Some(error.to_string()).filter(|m| !m.is_empty()))
            .unwrap_or_else(|| fallback.to_owned());

        Self {
            message,
            validation_errors: if with_validation { body.errors } else { None },
            status: error.status(),
        }
    }

    /// `true` if the server rejected the session (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// The operations the rest of the stack needs from the auth API.
///
/// [`AuthService`](crate::AuthService) is the real implementation; tests
/// swap in [`MockAuthApi`](crate::MockAuthApi). The session state and the
/// refresh loop are generic over this trait, so neither knows whether it
/// is talking HTTP.
///
/// # Trait bounds
///
/// - `Send + Sync` → one instance is shared by the session state and the
///   background refresh task.
/// - `'static` → it lives as long as the client.
pub trait AuthApi: Send + Sync + 'static {
    /// `POST /auth/login`.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = AuthResult<Session>> + Send;

    /// `POST /auth/signup`.
    fn signup(
        &self,
        user_data: &SignupRequest,
    ) -> impl Future<Output = AuthResult<Session>> + Send;

    /// `GET /auth/me`. Failures never carry validation errors.
    fn get_fresh_user_data(&self) -> impl Future<Output = AuthResult<UserProfile>> + Send;

    /// Drops local credentials. Synchronous and infallible.
    fn logout(&self);

    /// Installs (`Some`) or removes (`None`) the bearer header used for
    /// subsequent requests. Implementations without headers ignore it.
    fn install_token(&self, token: Option<&Token>) {
        let _ = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16, body: &str) -> TransportError {
        TransportError::Status {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_from_transport_prefers_server_error_field() {
        let err = status_error(400, r#"{"error":"incorrect username or password"}"#);

        let failure = AuthFailure::from_transport(&err, LOGIN_FAILED, true);

        assert_eq!(failure.message, "incorrect username or password");
        assert_eq!(failure.status, Some(400));
    }

    #[test]
    fn test_from_transport_falls_back_to_transport_message() {
        let err = status_error(502, "<html>bad gateway</html>");

        let failure = AuthFailure::from_transport(&err, LOGIN_FAILED, true);

        assert_eq!(failure.message, "request failed with status code 502");
        assert_eq!(failure.validation_errors, None);
    }

    #[test]
    fn test_from_transport_copies_validation_errors_when_asked() {
        let err = status_error(
            422,
            r#"{"error":"invalid input","errors":{"email":"already registered"}}"#,
        );

        let with = AuthFailure::from_transport(&err, SIGNUP_FAILED, true);
        let without = AuthFailure::from_transport(&err, FETCH_USER_FAILED, false);

        assert_eq!(
            with.validation_errors.unwrap()["email"],
            "already registered"
        );
        assert_eq!(without.validation_errors, None);
    }

    #[test]
    fn test_from_transport_non_http_error_has_no_status() {
        let err = TransportError::InvalidHeader("authorization");
        let failure = AuthFailure::from_transport(&err, FETCH_USER_FAILED, false);
        assert_eq!(failure.status, None);
        assert!(!failure.is_unauthorized());
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(AuthFailure::new("x").with_status(401).is_unauthorized());
        assert!(!AuthFailure::new("x").with_status(403).is_unauthorized());
    }

    #[test]
    fn test_display_is_message() {
        assert_eq!(AuthFailure::new("Login failed").to_string(), "Login failed");
    }
}
