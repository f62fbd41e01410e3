//! HTTP transport implementation using `reqwest`.

use std::sync::{PoisonError, RwLock};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sessionkit_protocol::{Codec, JsonCodec, Token};
use sessionkit_store::SessionStore;

use crate::{TransportError, UnauthorizedHook};

/// HTTP client for the auth API that authenticates every request.
///
/// ## Request phase
///
/// Each request starts from the transport's default headers. If the
/// [`SessionStore`] holds a token, `Authorization: Bearer <token>` is set
/// on top. No token means an unauthenticated request.
///
/// ## Response phase
///
/// - 2xx: the body is decoded and returned.
/// - 401: the store is cleared, the unauthorized hook runs (typically a
///   redirect to the login route), then the failure is returned.
/// - anything else: returned as [`TransportError::Status`] untouched.
pub struct AuthTransport {
    client: Client,
    base_url: String,
    store: SessionStore,
    default_headers: RwLock<HeaderMap>,
    on_unauthorized: Option<UnauthorizedHook>,
    codec: JsonCodec,
}

impl AuthTransport {
    /// Creates a transport for `base_url` (e.g. `http://localhost:8081/api`).
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidBaseUrl`] if `base_url` doesn't
    /// parse as an absolute URL.
    pub fn new(base_url: &str, store: SessionStore) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), base_url, store)
    }

    /// Same as [`new`](Self::new) but with a pre-configured `reqwest`
    /// client (timeouts, proxies, ...).
    pub fn with_client(
        client: Client,
        base_url: &str,
        store: SessionStore,
    ) -> Result<Self, TransportError> {
        reqwest::Url::parse(base_url)
            .map_err(|e| TransportError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            store,
            default_headers: RwLock::new(HeaderMap::new()),
            on_unauthorized: None,
            codec: JsonCodec,
        })
    }

    /// Installs the callback run after a 401 has cleared the store.
    ///
    /// The transport itself knows nothing about navigation; the
    /// composition root decides what "go to login" means.
    pub fn on_unauthorized(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    /// The base URL requests are resolved against (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The store the transport reads the token from.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Sends `GET {base}{path}` and decodes the JSON response.
    ///
    /// # Errors
    /// See [`TransportError`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        self.send(self.request(Method::GET, path)).await
    }

    /// Sends `POST {base}{path}` with a JSON body and decodes the JSON
    /// response.
    ///
    /// # Errors
    /// See [`TransportError`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// Adds `Authorization: Bearer <token>` to the default headers.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidHeader`] if the token contains
    /// characters that can't appear in a header.
    pub fn set_auth_header(&self, token: &Token) -> Result<(), TransportError> {
        let value = HeaderValue::from_str(&token.bearer())
            .map_err(|_| TransportError::InvalidHeader("authorization"))?;
        self.write_headers().insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Removes the `Authorization` default header, if any.
    pub fn clear_auth_header(&self) {
        self.write_headers().remove(AUTHORIZATION);
    }

    /// Whether an `Authorization` default header is currently installed.
    pub fn has_auth_header(&self) -> bool {
        self.default_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(AUTHORIZATION)
    }

    fn write_headers(&self) -> std::sync::RwLockWriteGuard<'_, HeaderMap> {
        self.default_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, TransportError> {
        let mut headers = self
            .default_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        // The store is the source of truth: a token written by another
        // component since the header was installed still wins.
        if let Some(token) = self.store.load_token()? {
            let value = HeaderValue::from_str(&token.bearer())
                .map_err(|_| TransportError::InvalidHeader("authorization"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let request = builder.headers(headers).build().map_err(TransportError::Network)?;
        let method = request.method().clone();
        let url = request.url().path().to_owned();
        tracing::trace!(%method, %url, "sending request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(TransportError::Network)?;

        let status = response.status();
        let body = response.bytes().await.map_err(TransportError::Network)?;

        if status.is_success() {
            return Ok(self.codec.decode(&body)?);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(&url);
        } else {
            tracing::debug!(%method, %url, status = status.as_u16(), "request failed");
        }

        Err(TransportError::Status {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }

    fn handle_unauthorized(&self, url: &str) {
        tracing::warn!(%url, "credentials rejected (401), clearing stored session");
        if let Err(error) = self.store.clear() {
            tracing::error!(%error, "failed to clear session store after 401");
        }
        self.clear_auth_header();
        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
    }
}
