//! `SessionKit` builder and client handle.
//!
//! This is the composition root. It ties the layers together:
//! store → transport → auth service → session context → refresh loop,
//! with the router installed as the transport's 401 hook.

use std::sync::Arc;

use sessionkit_auth::{AuthFailure, AuthResult, AuthService};
use sessionkit_protocol::{Credentials, Session, SignupRequest, UserProfile};
use sessionkit_refresh::RefreshLoop;
use sessionkit_router::{RouteGuard, RouteTable, Router};
use sessionkit_session::SessionContext;
use sessionkit_store::{FileStorage, SessionStore, Storage};
use sessionkit_transport::{AuthTransport, UnauthorizedHook};

use crate::{ClientConfig, SessionKitError};

/// Builder for a [`SessionKit`] client.
///
/// # Example
///
/// ```rust,no_run
/// use sessionkit::prelude::*;
///
/// # async fn run() -> Result<(), SessionKitError> {
/// let kit = SessionKit::builder()
///     .config(ClientConfig::from_env())
///     .build()?;
/// kit.resume().await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionKitBuilder {
    config: ClientConfig,
    storage: Option<Arc<dyn Storage>>,
    routes: RouteTable,
}

impl SessionKitBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            storage: None,
            routes: RouteTable::standard(),
        }
    }

    /// Sets the client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `storage` instead of a file at `config.storage_path`.
    pub fn storage(mut self, storage: impl Storage) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Replaces the standard route table.
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Wires everything together and hydrates the session from storage.
    ///
    /// The refresh loop is created stopped; [`SessionKit::resume`] or a
    /// successful login starts it.
    ///
    /// # Errors
    /// - [`SessionKitError::Store`] if the storage file can't be opened.
    /// - [`SessionKitError::Transport`] if the API URL is invalid.
    /// - [`SessionKitError::Session`] if the stored session can't be read.
    pub fn build(self) -> Result<SessionKit, SessionKitError> {
        let storage: Arc<dyn Storage> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(FileStorage::open(&self.config.storage_path)?),
        };
        let store = SessionStore::from_arc(storage);

        let router = Arc::new(Router::new(
            self.routes,
            RouteGuard::new(self.config.guard_config()),
        ));
        let hook: UnauthorizedHook = {
            let router = Arc::clone(&router);
            Arc::new(move || router.redirect_to_login())
        };

        let transport = AuthTransport::new(&self.config.api_base_url, store.clone())?
            .on_unauthorized(hook);
        let service = Arc::new(AuthService::new(Arc::new(transport)));

        let ctx = Arc::new(SessionContext::hydrate(store, service)?);
        let refresh = RefreshLoop::new(Arc::clone(&ctx), self.config.refresh_config());

        tracing::info!(
            api = %self.config.api_base_url,
            authenticated = ctx.is_authenticated(),
            "sessionkit client ready"
        );

        Ok(SessionKit {
            config: self.config,
            ctx,
            router,
            refresh,
        })
    }
}

impl Default for SessionKitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A wired-up client: session, router and refresh loop.
pub struct SessionKit {
    config: ClientConfig,
    ctx: Arc<SessionContext<AuthService>>,
    router: Arc<Router>,
    refresh: RefreshLoop<AuthService>,
}

impl SessionKit {
    /// Creates a new builder.
    pub fn builder() -> SessionKitBuilder {
        SessionKitBuilder::new()
    }

    /// Validates a hydrated session against the server.
    ///
    /// Fetches a fresh profile; if the session survives, the refresh loop
    /// is started. Returns the fresh profile, or `None` if there is no
    /// (longer a) session.
    ///
    /// # Errors
    /// Only storage failures; network trouble is logged and swallowed.
    pub async fn resume(&self) -> Result<Option<UserProfile>, SessionKitError> {
        let user = self.ctx.load_user_data().await?;
        if self.ctx.is_authenticated() {
            self.refresh.start();
        }
        Ok(user)
    }

    /// Logs in, starts the refresh loop and moves to the home page.
    ///
    /// A 401 ends any active session: the refresh loop is stopped too.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<Session> {
        let session = self
            .ctx
            .login(credentials)
            .await
            .map_err(|failure| self.on_auth_failure(failure))?;
        self.after_authentication();
        Ok(session)
    }

    /// Signs up, starts the refresh loop and moves to the home page.
    pub async fn signup(&self, user_data: &SignupRequest) -> AuthResult<Session> {
        let session = self
            .ctx
            .signup(user_data)
            .await
            .map_err(|failure| self.on_auth_failure(failure))?;
        self.after_authentication();
        Ok(session)
    }

    fn on_auth_failure(&self, failure: AuthFailure) -> AuthFailure {
        if failure.is_unauthorized() {
            self.refresh.stop();
        }
        failure
    }

    /// Stops the refresh loop, clears the session and returns to login.
    ///
    /// # Errors
    /// [`SessionKitError::Session`] if the store couldn't be cleared; the
    /// in-memory session is gone either way.
    pub fn logout(&self) -> Result<(), SessionKitError> {
        self.refresh.stop();
        let result = self.ctx.logout();
        self.router.redirect_to_login();
        result.map_err(SessionKitError::from)
    }

    /// Navigate with the guard applied to the current session.
    ///
    /// # Errors
    /// [`SessionKitError::Router`] on invalid paths or redirect loops.
    pub fn navigate(&self, path: &str) -> Result<String, SessionKitError> {
        Ok(self.router.navigate(path, self.ctx.as_ref())?)
    }

    fn after_authentication(&self) {
        self.refresh.start();
        let home = self.router.guard().config().home_path.clone();
        if let Err(err) = self.router.navigate(&home, self.ctx.as_ref()) {
            tracing::warn!(error = %err, "could not navigate after login");
        }
    }

    pub fn context(&self) -> &Arc<SessionContext<AuthService>> {
        &self.ctx
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn refresh(&self) -> &RefreshLoop<AuthService> {
        &self.refresh
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Drop for SessionKit {
    fn drop(&mut self) {
        self.refresh.stop();
    }
}
