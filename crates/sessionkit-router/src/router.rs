//! The router: resolves paths, runs the guard and tracks where we are.

use std::sync::{PoisonError, RwLock};

use tracing::{debug, info};

use crate::config::normalize;
use crate::{GuardDecision, RouteGuard, RouteTable, RouterError, SessionView};

/// Redirects followed by a single [`Router::navigate`] call before giving up.
pub const MAX_REDIRECTS: usize = 8;

/// Client-side router.
///
/// Shared as `Arc<Router>`: the composition root hands a clone to the
/// transport so a 401 anywhere sends the user to the login page.
#[derive(Debug)]
pub struct Router {
    table: RouteTable,
    guard: RouteGuard,
    current: RwLock<String>,
}

impl Router {
    /// A router positioned at the guard's login path.
    pub fn new(table: RouteTable, guard: RouteGuard) -> Self {
        let start = guard.config().login_path.clone();
        Self {
            table,
            guard,
            current: RwLock::new(start),
        }
    }

    /// Navigate to `path`, following catch-all and guard redirects.
    ///
    /// Returns the path actually landed on, which becomes [`current`](Self::current).
    ///
    /// # Errors
    /// - [`RouterError::InvalidPath`] if `path` is not absolute.
    /// - [`RouterError::NotFound`] if nothing matches and there is no catch-all.
    /// - [`RouterError::RedirectLoop`] after [`MAX_REDIRECTS`] redirects.
    pub fn navigate(&self, path: &str, session: &impl SessionView) -> Result<String, RouterError> {
        if !path.starts_with('/') {
            return Err(RouterError::InvalidPath(path.to_owned()));
        }

        let authenticated = session.is_authenticated();
        let mut target = normalize(path).to_owned();

        for _ in 0..=MAX_REDIRECTS {
            let next = match self.table.find(&target) {
                Some(route) => match self.guard.check(&route.meta, authenticated) {
                    GuardDecision::Admit => {
                        info!(path = %target, route = %route.name, "navigated");
                        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                            target.clone();
                        return Ok(target);
                    }
                    GuardDecision::Redirect(to) => to,
                },
                None => self
                    .table
                    .fallback_target()
                    .map(str::to_owned)
                    .ok_or_else(|| RouterError::NotFound(target.clone()))?,
            };
            debug!(from = %target, to = %next, authenticated, "redirecting");
            target = normalize(&next).to_owned();
        }

        Err(RouterError::RedirectLoop {
            path: path.to_owned(),
            hops: MAX_REDIRECTS,
        })
    }

    /// Jump to the login page without consulting the guard.
    ///
    /// Installed as the transport's 401 hook: by the time it runs the
    /// session has already been cleared.
    pub fn redirect_to_login(&self) {
        let login = self.guard.config().login_path.clone();
        info!(path = %login, "session rejected, redirecting to login");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = login;
    }

    /// The path last navigated to.
    pub fn current(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }
}

impl Default for Router {
    /// The standard route table with an enforcing guard.
    fn default() -> Self {
        Self::new(RouteTable::standard(), RouteGuard::default())
    }
}
