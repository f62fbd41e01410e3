//! Error types for the protocol layer.
//!
//! Each sessionkit crate defines its own error enum. When you see a
//! `ProtocolError`, the problem is in turning values into bytes or back,
//! not in networking or storage.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, wrong data types, or a truncated
    /// response body.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
