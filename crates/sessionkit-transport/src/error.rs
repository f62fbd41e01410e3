use sessionkit_protocol::ProtocolError;
use sessionkit_store::StoreError;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never got a response: DNS, connect, TLS, timeout.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    ///
    /// The raw body is kept so upper layers can pull a structured error
    /// message out of it.
    #[error("request failed with status code {status}")]
    Status { status: u16, body: Vec<u8> },

    /// A success response whose body didn't decode as the expected type.
    #[error(transparent)]
    Decode(#[from] ProtocolError),

    /// The configured base URL is not a valid absolute URL.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// A header value contained characters HTTP doesn't allow.
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// Reading the token from, or clearing, the session store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TransportError {
    /// HTTP status of the response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of a failed request, if there was one.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// `true` if the server rejected our credentials (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
