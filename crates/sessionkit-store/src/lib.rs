//! Persistent session storage for sessionkit.
//!
//! Holds the bearer token and the serialized user profile so a session
//! survives process restarts, plus the auxiliary remember-me keys.
//!
//! # Layers
//!
//! ```text
//! SessionStore (typed: Token, UserProfile)   ← what the rest of the stack uses
//!     ↕
//! Storage trait (string keys, atomic batches)
//!     ↕
//! FileStorage | MemoryStorage
//! ```

mod error;
mod storage;
mod store;

pub use error::StoreError;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageOp};
pub use store::{
    REMEMBER_ME_KEY, SAVED_USERNAME_KEY, SessionStore, TOKEN_KEY, USER_KEY,
};
