//! Session state for sessionkit.
//!
//! This crate owns the client's view of "who is logged in":
//!
//! 1. **State** — token + profile, with derived views ([`SessionState`])
//! 2. **Context** — the one mutable holder, kept in sync with durable
//!    storage ([`SessionContext`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Router / refresh loop (above)  ← read state, trigger refresh/logout
//!     ↕
//! Session layer (this crate)  ← owns and mutates the session
//!     ↕
//! Auth service + store (below)  ← API calls, durable mirror
//! ```

mod context;
mod error;
mod state;

pub use context::SessionContext;
pub use error::SessionError;
pub use state::SessionState;
