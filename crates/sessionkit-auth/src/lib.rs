//! Auth service for sessionkit.
//!
//! Wraps the three auth API endpoints (login, signup, current profile)
//! plus local logout behind the [`AuthApi`] trait. Failures are values
//! ([`AuthFailure`]), never panics.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session state (above)  ← commits what the service returns
//!     ↕
//! Auth service (this crate)  ← uniform success/failure results
//!     ↕
//! Transport (below)  ← bearer header, 401 handling
//! ```

#![allow(async_fn_in_trait)]

mod api;
#[cfg(any(test, feature = "test-utils"))]
mod mock;
mod service;

pub use api::{
    AuthApi, AuthFailure, AuthResult, FETCH_USER_FAILED, LOGIN_FAILED, SIGNUP_FAILED,
};
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockAuthApi;
pub use service::AuthService;
