//! Error types for the session layer.

use sessionkit_store::StoreError;

/// Errors that can occur while mutating the session.
///
/// Expected failures (bad credentials, expired session, network trouble)
/// are not here: they come back as [`AuthFailure`](sessionkit_auth::AuthFailure)
/// values. What's left is the session store refusing a write.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The durable mirror could not be updated. The in-memory state was
    /// left unchanged so the two don't diverge.
    #[error("session store unavailable: {0}")]
    Store(#[from] StoreError),
}
