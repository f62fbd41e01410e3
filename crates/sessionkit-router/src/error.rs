//! Error types for the routing layer.

/// Errors that can occur while navigating.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Paths must be absolute (`/...`).
    #[error("invalid path {0:?}: must start with '/'")]
    InvalidPath(String),

    /// No route matches and the table has no catch-all.
    #[error("no route for {0}")]
    NotFound(String),

    /// The guard kept redirecting. Usually a login or home path that is
    /// itself guarded the wrong way.
    #[error("too many redirects navigating to {path} ({hops} hops)")]
    RedirectLoop { path: String, hops: usize },
}
