//! Wire protocol for sessionkit.
//!
//! This crate defines the "language" the client and the auth API speak:
//!
//! - **Types** ([`Credentials`], [`SignupRequest`], [`Session`],
//!   [`UserProfile`], [`ErrorBody`], [`Token`]) — the structures that
//!   travel on the wire and into local storage.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits underneath everything else. It doesn't know
//! about HTTP, storage or sessions; it only knows the shapes of messages.
//!
//! ```text
//! Transport (HTTP bodies) → Protocol (typed values) → Session (state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ADMIN_SENTINEL, Credentials, ErrorBody, PRO_ACCOUNT, Session, SignupRequest,
    Token, UserProfile, ValidationErrors,
};
