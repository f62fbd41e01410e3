//! Core wire types for the sessionkit auth API.
//!
//! Every type in this module travels "on the wire": it is serialized to
//! JSON, sent to the remote API (or persisted locally), and deserialized on
//! the other side. The JSON shapes match what the API server emits, so the
//! serde attributes here are part of the contract.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// An opaque bearer credential issued by the API on login or signup.
///
/// This is a newtype wrapper around `String`. The wrapper buys us two
/// things:
///
/// 1. **Type safety**: a username or password can't be passed where a
///    token is expected, even though all three are strings underneath.
/// 2. **Redaction**: `Debug` is implemented by hand so that a token never
///    ends up in a log line or a panic message.
///
/// `#[serde(transparent)]` makes a `Token("abc")` serialize as plain
/// `"abc"`, which is what the API sends in `{"token": "abc", ...}`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wraps a raw credential string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw credential, e.g. for building an `Authorization`
    /// header.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the credential is the empty string.
    ///
    /// An empty token never counts as an active session.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Formats the `Authorization` header value: `Bearer <token>`.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Consumes the wrapper and returns the raw string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Token(<empty>)")
        } else {
            f.write_str("Token(<redacted>)")
        }
    }
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// Value of [`UserProfile::admin`] that marks an administrator.
pub const ADMIN_SENTINEL: i64 = 1;

/// Value of [`UserProfile::pro`] that marks a paid ("pro") account.
pub const PRO_ACCOUNT: i64 = 1;

/// The authenticated principal, as returned by `/auth/me`, `/auth/login`
/// and `/auth/signup`.
///
/// Only the fields the client actually reasons about are typed. Everything
/// else the server sends (tax settings, marketplace keys, timestamps, ...)
/// is kept verbatim in [`extra`](Self::extra) so a profile survives a
/// persist/reload cycle without losing data.
///
/// `#[serde(default)]` on the struct means a missing field becomes its
/// `Default` value instead of a decode error. Profiles come from a server
/// we don't control, so we decode them leniently.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Server-side user ID.
    pub id: i64,

    /// Login name.
    pub username: String,

    /// Display name. The server sends `null` when the user never set one.
    pub name: Option<String>,

    /// Contact email, if known.
    pub email: Option<String>,

    /// Role flag. Equal to [`ADMIN_SENTINEL`] for administrators.
    pub admin: i64,

    /// Account tier. Older payloads call this field `pro_account`.
    #[serde(alias = "pro_account")]
    pub pro: i64,

    /// Any additional fields the server included.
    ///
    /// `#[serde(flatten)]` collects unknown keys into this map on decode
    /// and writes them back at the top level on encode.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// Returns `true` if this user is an administrator.
    ///
    /// Strict equality against [`ADMIN_SENTINEL`]; other non-zero role
    /// values (e.g. super-admin codes) are not treated as admin.
    pub fn is_admin(&self) -> bool {
        self.admin == ADMIN_SENTINEL
    }

    /// Returns `true` if this user has a pro account.
    pub fn is_pro(&self) -> bool {
        self.pro == PRO_ACCOUNT
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
///
/// `remember_me` is sent to the server (as `rememberMe`) and also decides
/// whether the client keeps the username around after logout.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(rename = "rememberMe", default)]
    pub remember_me: bool,
}

impl Credentials {
    /// Creates credentials with `remember_me` turned off.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    /// Builder-style toggle for `remember_me`.
    pub fn remember(mut self, remember_me: bool) -> Self {
        self.remember_me = remember_me;
        self
    }
}

// Hand-written so passwords stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// Body of `POST /auth/signup`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Successful login/signup response: `{"token": "...", "user": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Token,
    pub user: UserProfile,
}

/// Field name → human-readable message, as sent by the server on a
/// validation failure.
///
/// `BTreeMap` (not `HashMap`) so iteration order is stable, which keeps
/// rendered error lists and test assertions deterministic.
pub type ValidationErrors = BTreeMap<String, String>;

/// The server's failure body: `{"error": "...", "errors": {...}}`.
///
/// Both fields are optional because not every failure carries both, and
/// some (proxy errors, HTML error pages) carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorBody {
    /// Summary message, e.g. `"incorrect username or password"`.
    pub error: Option<String>,

    /// Per-field validation messages.
    pub errors: Option<ValidationErrors>,
}

impl ErrorBody {
    /// Extracts an error body from raw response bytes.
    ///
    /// Never fails: a body that isn't JSON, or JSON of an unexpected
    /// shape, yields an empty `ErrorBody`. Validation values that aren't
    /// strings (arrays of messages, numbers) are kept as their JSON text.
    pub fn from_slice(data: &[u8]) -> Self {
        let Ok(serde_json::Value::Object(map)) =
            serde_json::from_slice::<serde_json::Value>(data)
        else {
            return Self::default();
        };

        let error = map
            .get("error")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let errors = map.get("errors").and_then(|v| v.as_object()).map(|fields| {
            fields
                .iter()
                .map(|(field, value)| {
                    let message = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (field.clone(), message)
                })
                .collect::<ValidationErrors>()
        });

        Self { error, errors }
    }
}

// =========================================================================
// Tests
// =========================================================================
