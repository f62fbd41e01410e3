//! Route table and navigation guard for sessionkit.
//!
//! Navigation is gated on whether a session is active. Some routes need
//! one, some need its absence, the rest don't care.
//!
//! # Key types
//!
//! - [`RouteTable`] — paths, names and access rules, plus a catch-all
//! - [`RouteGuard`] — the admit/redirect decision for one step
//! - [`Router`] — runs the guard to a fixed point and tracks the location
//! - [`SessionView`] — what the guard reads (implemented for [`SessionContext`](sessionkit_session::SessionContext))

mod config;
mod error;
mod guard;
mod router;

pub use config::{GuardConfig, Route, RouteMeta, RouteTable};
pub use error::RouterError;
pub use guard::{GuardDecision, RouteGuard, SessionView};
pub use router::{MAX_REDIRECTS, Router};
