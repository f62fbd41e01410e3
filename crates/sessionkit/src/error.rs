//! Unified error type for sessionkit.

use sessionkit_protocol::ProtocolError;
use sessionkit_router::RouterError;
use sessionkit_session::SessionError;
use sessionkit_store::StoreError;
use sessionkit_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `sessionkit` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
///
/// Auth failures (bad credentials, validation errors) are not here: they
/// are ordinary values of [`AuthFailure`](sessionkit_auth::AuthFailure).
#[derive(Debug, thiserror::Error)]
pub enum SessionKitError {
    /// A wire encoding/decoding error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The durable store could not be opened, read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The HTTP client could not be built or a request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The session could not be committed or cleared.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Navigation failed (bad path, redirect loop).
    #[error(transparent)]
    Router(#[from] RouterError),
}
