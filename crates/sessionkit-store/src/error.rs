use std::path::PathBuf;

use sessionkit_protocol::ProtocolError;

/// Errors raised by the storage layer.
///
/// These are the "truly unexpected" failures: the disk is full, the
/// storage directory is read-only, a value can't be encoded. A stored
/// profile that fails to *decode* is not an error; it reads back as absent.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode storage contents: {0}")]
    Encode(#[source] ProtocolError),
}

impl StoreError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
