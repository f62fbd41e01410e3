//! Background session refresh loop for sessionkit.
//!
//! While a session is active, the loop re-fetches the user's profile at a
//! fixed interval and commits it into the [`SessionContext`]. It stops by
//! itself (and logs the session out) the first time the server rejects the
//! token.
//!
//! # Cycle outcomes
//!
//! ```text
//! tick ──→ authenticated? ──no──→ Skipped
//!               │ yes
//!               ▼
//!      get_fresh_user_data()
//!        │        │        │
//!       Ok       401     other
//!        │        │        │
//!   Refreshed  Expired   Failed (loop continues)
//!   /Discarded (loop stops, session logged out)
//! ```
//!
//! # Integration
//!
//! One `RefreshLoop` per client, started after login or hydration:
//!
//! ```ignore
//! let refresh = RefreshLoop::new(ctx.clone(), RefreshConfig::default());
//! refresh.start();   // first cycle runs immediately
//! // ...
//! refresh.stop();    // safe to call any number of times
//! ```
//!
//! `start()` spawns onto the current Tokio runtime and must be called from
//! within one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use sessionkit_auth::AuthApi;
use sessionkit_session::SessionContext;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between two refresh cycles. Default: 30 seconds.
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

impl RefreshConfig {
    /// Default time between cycles.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
    /// Shortest interval the loop accepts.
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

    /// Create a config from an interval in milliseconds.
    pub fn from_millis(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// Clamp the interval to [`Self::MIN_INTERVAL`].
    ///
    /// Called automatically by [`RefreshLoop::new`].
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval = ?self.interval,
                min = ?Self::MIN_INTERVAL,
                "refresh interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Outcomes and metrics
// ---------------------------------------------------------------------------

/// What a single refresh cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No active session; the API was not called.
    Skipped,
    /// A fresh profile was committed.
    Refreshed,
    /// A profile arrived after the loop was stopped or the session changed,
    /// and was dropped.
    Discarded,
    /// The server rejected the token. The loop stopped and the session was
    /// logged out.
    Expired,
    /// A transient failure (network, 5xx, ...). The loop keeps going.
    Failed,
}

/// Running counters for the refresh loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshMetrics {
    /// Cycles run, scheduled and manual.
    pub cycles: u64,
    /// Cycles that committed a fresh profile.
    pub refreshed: u64,
    /// Cycles that did nothing: no session, or a discarded late result.
    pub skipped: u64,
    /// Cycles that failed for a transient reason.
    pub failures: u64,
    /// Cycles that found the session expired.
    pub expirations: u64,
}

impl RefreshMetrics {
    fn record(&mut self, outcome: RefreshOutcome) {
        self.cycles += 1;
        match outcome {
            RefreshOutcome::Skipped | RefreshOutcome::Discarded => self.skipped += 1,
            RefreshOutcome::Refreshed => self.refreshed += 1,
            RefreshOutcome::Expired => self.expirations += 1,
            RefreshOutcome::Failed => self.failures += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Refresh loop
// ---------------------------------------------------------------------------

/// Periodic profile refresher.
///
/// Cloning is cheap and every clone controls the same loop.
pub struct RefreshLoop<A: AuthApi> {
    inner: Arc<Inner<A>>,
}

impl<A: AuthApi> Clone for RefreshLoop<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<A: AuthApi> {
    ctx: Arc<SessionContext<A>>,
    config: RefreshConfig,
    /// The running timer task. `Some` exactly while the loop is active.
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Bumped on every start and stop. A scheduled cycle only commits if
    /// the generation it was spawned with is still current.
    generation: AtomicU64,
    metrics: Mutex<RefreshMetrics>,
}

impl<A: AuthApi> RefreshLoop<A> {
    /// Create a stopped loop over `ctx`.
    pub fn new(ctx: Arc<SessionContext<A>>, config: RefreshConfig) -> Self {
        let config = config.validated();
        debug!(interval = ?config.interval, "refresh loop created");
        Self {
            inner: Arc::new(Inner {
                ctx,
                config,
                timer: Mutex::new(None),
                generation: AtomicU64::new(0),
                metrics: Mutex::new(RefreshMetrics::default()),
            }),
        }
    }

    /// Start the loop. The first cycle runs immediately, then one every
    /// [`RefreshConfig::interval`].
    ///
    /// Returns `false` (and does nothing) if the loop is already running.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut timer = self.inner.lock_timer();
        if timer.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);
        *timer = Some(tokio::spawn(async move { inner.run(generation).await }));

        info!(generation, "refresh loop started");
        true
    }

    /// Stop the loop. Future ticks are cancelled; a result already in
    /// flight is discarded instead of committed.
    ///
    /// Returns `false` if the loop was not running.
    pub fn stop(&self) -> bool {
        let mut timer = self.inner.lock_timer();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        match timer.take() {
            Some(handle) => {
                handle.abort();
                info!("refresh loop stopped");
                true
            }
            None => false,
        }
    }

    /// Whether the timer is active.
    pub fn is_running(&self) -> bool {
        self.inner
            .lock_timer()
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Run one cycle now, outside the timer.
    ///
    /// Races with a scheduled cycle resolve as last-write-wins. An expired
    /// session stops the loop exactly as a scheduled cycle would.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        let outcome = self.inner.cycle(None).await;
        if outcome == RefreshOutcome::Expired {
            self.stop();
            self.inner.logout();
        }
        outcome
    }

    /// Snapshot of the counters.
    pub fn metrics(&self) -> RefreshMetrics {
        *self
            .inner
            .metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The effective (validated) configuration.
    pub fn config(&self) -> RefreshConfig {
        self.inner.config
    }
}

impl<A: AuthApi> Inner<A> {
    async fn run(self: Arc<Self>, generation: u64) {
        let mut ticker = time::interval(self.config.interval);
        // Don't burst after a long stall (e.g. a suspended laptop).
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.cycle(Some(generation)).await == RefreshOutcome::Expired {
                self.expire(generation);
                self.logout();
                break;
            }
        }
    }

    /// One refresh cycle. `generation` is `Some` for scheduled cycles.
    async fn cycle(&self, generation: Option<u64>) -> RefreshOutcome {
        let outcome = self.fetch_and_commit(generation).await;
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(outcome);
        outcome
    }

    async fn fetch_and_commit(&self, generation: Option<u64>) -> RefreshOutcome {
        let Some(token) = self.ctx.token().filter(|t| !t.is_empty()) else {
            debug!("no active session, skipping refresh");
            return RefreshOutcome::Skipped;
        };

        let user = match self.ctx.api().get_fresh_user_data().await {
            Ok(user) => user,
            Err(failure) if failure.is_unauthorized() => {
                warn!("session expired during refresh");
                return RefreshOutcome::Expired;
            }
            Err(failure) => {
                warn!(status = ?failure.status, "refresh failed: {failure}");
                return RefreshOutcome::Failed;
            }
        };

        if generation.is_some_and(|g| g != self.generation.load(Ordering::SeqCst)) {
            debug!("refresh loop stopped while fetching, discarding profile");
            return RefreshOutcome::Discarded;
        }

        match self.ctx.set_user_if_current(&token, user) {
            Ok(true) => {
                debug!("profile refreshed");
                RefreshOutcome::Refreshed
            }
            Ok(false) => RefreshOutcome::Discarded,
            Err(err) => {
                warn!(error = %err, "could not store refreshed profile");
                RefreshOutcome::Failed
            }
        }
    }

    /// Mark the loop stopped from inside its own task.
    ///
    /// The handle is dropped rather than aborted: the task is about to
    /// return on its own.
    fn expire(&self, generation: u64) {
        let mut timer = self.lock_timer();
        if self.generation.load(Ordering::SeqCst) == generation {
            self.generation.fetch_add(1, Ordering::SeqCst);
            timer.take();
            info!(generation, "refresh loop stopped after session expiry");
        }
    }

    fn logout(&self) {
        if let Err(err) = self.ctx.logout() {
            error!(error = %err, "failed to clear expired session");
        }
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
