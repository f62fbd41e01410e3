//! # sessionkit
//!
//! Client-side auth session lifecycle.
//!
//! sessionkit acquires a bearer token and user profile from an auth API,
//! persists them across restarts, attaches the token to every request,
//! refreshes the profile in the background and tears everything down the
//! moment the server rejects the token. A route guard keeps navigation
//! consistent with whether a session is active.
//!
//! ## Layers
//!
//! ```text
//! Router ←──── 401 hook ────┐
//!   ↑                       │
//! SessionContext ← RefreshLoop
//!   ↓                       │
//! AuthService → AuthTransport
//!   ↓                ↓
//! SessionStore ←─────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sessionkit::prelude::*;
//!
//! # async fn run() -> Result<(), SessionKitError> {
//! init_tracing();
//! let kit = SessionKit::builder()
//!     .config(ClientConfig::from_env())
//!     .build()?;
//!
//! if kit.resume().await?.is_none() {
//!     // let session = kit.login(&Credentials::new("alice", "secret")).await?;
//! }
//! kit.navigate("/")?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod telemetry;

pub use client::{SessionKit, SessionKitBuilder};
pub use config::{
    API_URL_VAR, ClientConfig, GUARD_DISABLED_VAR, REFRESH_INTERVAL_VAR, STORAGE_PATH_VAR,
};
pub use error::SessionKitError;
pub use telemetry::init_tracing;

pub use sessionkit_auth as auth;
pub use sessionkit_protocol as protocol;
pub use sessionkit_refresh as refresh;
pub use sessionkit_router as router;
pub use sessionkit_session as session;
pub use sessionkit_store as store;
pub use sessionkit_transport as transport;

/// The types most clients need.
pub mod prelude {
    pub use crate::{ClientConfig, SessionKit, SessionKitError, init_tracing};
    pub use sessionkit_auth::{AuthApi, AuthFailure, AuthResult};
    pub use sessionkit_protocol::{Credentials, Session, SignupRequest, Token, UserProfile};
    pub use sessionkit_refresh::{RefreshConfig, RefreshMetrics, RefreshOutcome};
    pub use sessionkit_router::{GuardConfig, RouteMeta, RouteTable};
    pub use sessionkit_session::SessionState;
}
