//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The transport uses it to read response bodies and the store uses it to
//! persist the user profile, so both agree on one format.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → a codec is shared by every task that talks to the API.
/// - `'static` → it owns everything it needs, so it can live inside
///   long-lived handles.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the input bytes, so the response buffer can be
/// dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use sessionkit_protocol::{Codec, JsonCodec, UserProfile};
///
/// let codec = JsonCodec;
/// let user = UserProfile { id: 1, username: "alice".into(), ..Default::default() };
///
/// let bytes = codec.encode(&user).unwrap();
/// let decoded: UserProfile = codec.decode(&bytes).unwrap();
/// assert_eq!(user, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Session, Token, UserProfile};

    #[test]
    fn test_decode_session_response() {
        let codec = JsonCodec;
        let session: Session = codec
            .decode(br#"{"token":"t-1","user":{"id":3,"username":"carol"}}"#)
            .unwrap();

        assert_eq!(session.token, Token::new("t-1"));
        assert_eq!(session.user.username, "carol");
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<UserProfile, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
