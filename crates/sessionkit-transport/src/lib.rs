//! Authenticated HTTP transport for sessionkit.
//!
//! [`AuthTransport`] wraps every call to the auth API: it attaches the
//! bearer token from the [`SessionStore`](sessionkit_store::SessionStore)
//! and reacts to `401 Unauthorized` by clearing the stored session and
//! running an [`UnauthorizedHook`].
//!
//! Every other failure is handed back to the caller unchanged.

mod error;
mod http;

use std::sync::Arc;

pub use error::TransportError;
pub use http::AuthTransport;

/// Callback run when any request comes back `401 Unauthorized`.
///
/// Supplied by the composition root (usually "navigate to `/login`").
/// `Arc<dyn Fn>` so one hook can be shared and called from any task.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;
