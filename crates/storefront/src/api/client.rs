//! HTTP plumbing shared by every endpoint module.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use super::ApiError;
use super::cache::CacheValue;
use crate::config::StorefrontConfig;
use crate::session::TokenStore;

/// Longest error body excerpt kept in logs and messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Header carrying a per-request correlation id.
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Whether a call needs the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Sent without a token.
    Public,
    /// Sent with the token if one exists.
    OptionalAuth,
    /// Refused with [`ApiError::Unauthenticated`] when there is no token.
    Authenticated,
}

/// A request path below the API base.
///
/// Literal parts are split on `/`. Ids added with [`ApiPath::id`] stay one
/// segment each and are percent-encoded when the URL is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            segments: split_literal(path),
        }
    }

    /// Append a caller-supplied id as a single segment.
    #[must_use]
    pub fn id(mut self, id: impl std::fmt::Display) -> Self {
        self.segments.push(id.to_string());
        self
    }

    /// Append literal segments such as `cancel` or `status`.
    #[must_use]
    pub fn join(mut self, path: &str) -> Self {
        self.segments.extend(split_literal(path));
        self
    }
}

impl From<&str> for ApiPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

fn split_literal(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Client for the store REST API.
///
/// Catalog responses are cached; everything else goes to the network.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    token_store: Option<Arc<dyn TokenStore>>,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a client with no persisted session.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        Self::build(config, None)
    }

    /// Create a client whose session is cleared from `store` whenever the
    /// server answers 401 to an authenticated call.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_token_store(
        config: &StorefrontConfig,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        Self::build(config, Some(store))
    }

    fn build(
        config: &StorefrontConfig,
        token_store: Option<Arc<dyn TokenStore>>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("scentbox/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                token: RwLock::new(None),
                token_store,
                cache,
            }),
        })
    }

    /// Base URL every path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Session Token
    // =========================================================================

    /// Attach a bearer token to subsequent authenticated calls.
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Forget the bearer token.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Whether a bearer token is attached.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Drop the token and the persisted session after a 401.
    async fn expire_session(&self) {
        self.clear_token().await;
        if let Some(store) = &self.inner.token_store
            && let Err(e) = store.clear()
        {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
        tracing::info!("Session rejected by server, signed out");
    }

    // =========================================================================
    // Cache
    // =========================================================================

    pub(super) async fn cached(&self, key: &str) -> Option<CacheValue> {
        self.inner.cache.get(key).await
    }

    pub(super) async fn cache(&self, key: String, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    pub(super) async fn invalidate(&self, key: &str) {
        self.inner.cache.invalidate(key).await;
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Resolve a path such as `/products/42` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidPath` for an empty, `.` or `..` segment.
    pub fn endpoint(&self, path: impl Into<ApiPath>) -> Result<Url, ApiError> {
        let path = path.into();
        if let Some(bad) = path
            .segments
            .iter()
            .find(|s| matches!(s.as_str(), "" | "." | ".."))
        {
            return Err(ApiError::InvalidPath(bad.clone()));
        }

        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidPath(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(&path.segments);
        Ok(url)
    }

    /// Start a request with the standard headers.
    async fn request(
        &self,
        method: Method,
        url: Url,
        access: Access,
    ) -> Result<(RequestBuilder, bool), ApiError> {
        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string());

        let mut authenticated = false;
        if access != Access::Public {
            let token = self.inner.token.read().await;
            match (token.as_ref(), access) {
                (Some(token), _) => {
                    builder = builder.bearer_auth(token.expose_secret());
                    authenticated = true;
                }
                (None, Access::Authenticated) => return Err(ApiError::Unauthenticated),
                (None, _) => {}
            }
        }

        Ok((builder, authenticated))
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures, non-success statuses and
    /// bodies that do not decode into `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: impl Into<ApiPath> + Send,
        access: Access,
    ) -> Result<T, ApiError> {
        self.get_with_query(path, &[], access).await
    }

    /// `GET` a JSON resource with query-string parameters.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: impl Into<ApiPath> + Send,
        query: &[(&str, String)],
        access: Access,
    ) -> Result<T, ApiError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        let (request, authenticated) = self.request(Method::GET, url, access).await?;
        self.execute(request, authenticated).await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn post<T, B>(
        &self,
        path: impl Into<ApiPath> + Send,
        body: &B,
        access: Access,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        self.send_json(Method::POST, path, body, access).await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn put<T, B>(
        &self,
        path: impl Into<ApiPath> + Send,
        body: &B,
        access: Access,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        self.send_json(Method::PUT, path, body, access).await
    }

    /// `PATCH` a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn patch<T, B>(
        &self,
        path: impl Into<ApiPath> + Send,
        body: &B,
        access: Access,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        self.send_json(Method::PATCH, path, body, access).await
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: impl Into<ApiPath> + Send,
        access: Access,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let (request, authenticated) = self.request(Method::DELETE, url, access).await?;
        self.execute(request, authenticated).await
    }

    /// `POST` a multipart form.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: impl Into<ApiPath> + Send,
        form: reqwest::multipart::Form,
        access: Access,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let (request, authenticated) = self.request(Method::POST, url, access).await?;
        self.execute(request.multipart(form), authenticated).await
    }

    async fn send_json<T, B>(
        &self,
        method: Method,
        path: impl Into<ApiPath> + Send,
        body: &B,
        access: Access,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint(path)?;
        let (request, authenticated) = self.request(method, url, access).await?;
        self.execute(request.json(body), authenticated).await
    }

    /// Send a request and decode the response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED && authenticated {
                self.expire_session().await;
            }
            return Err(status_error(status, &body));
        }

        decode_body(&body).inspect_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to decode API response"
            );
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Decode a success body, unwrapping a `{ "data": … }` envelope if present.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?
    };

    let payload = match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map a non-success response to the error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = error_message(body).unwrap_or_else(|| {
        let excerpt = truncate(body);
        if excerpt.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            excerpt
        }
    });

    if status.is_server_error() {
        tracing::error!(
            status = %status,
            body = %truncate(body),
            "API returned server error"
        );
    } else {
        tracing::debug!(status = %status, message = %message, "API rejected request");
    }

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::BusinessRule(message)
        }
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

/// Read `message` (or `error`) from a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .filter(|message| !message.trim().is_empty())
        .map(str::to_owned)
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        name: String,
    }

    #[test]
    fn test_decode_bare_and_wrapped() {
        let bare: Thing = decode_body(r#"{"name": "oud"}"#).unwrap();
        let wrapped: Thing = decode_body(r#"{"success": true, "data": {"name": "oud"}}"#).unwrap();
        assert_eq!(bare, wrapped);

        let list: Vec<Thing> = decode_body(r#"{"data": [{"name": "a"}, {"name": "b"}]}"#).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_decode_empty_body_as_ignored() {
        let _: serde::de::IgnoredAny = decode_body("").unwrap();
        let _: serde::de::IgnoredAny = decode_body(r#"{"message": "Removed"}"#).unwrap();
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let err = decode_body::<Thing>(r#"{"title": "oud"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));

        let err = decode_body::<Thing>("<html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_status_error_mapping() {
        let err = status_error(StatusCode::BAD_REQUEST, r#"{"message": "Insufficient stock"}"#);
        assert!(matches!(err, ApiError::BusinessRule(ref m) if m == "Insufficient stock"));

        let err = status_error(StatusCode::UNAUTHORIZED, r#"{"error": "Token expired"}"#);
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Token expired"));

        let err = status_error(StatusCode::FORBIDDEN, "");
        assert!(matches!(err, ApiError::Forbidden(ref m) if m == "Forbidden"));

        let err = status_error(StatusCode::NOT_FOUND, "{}");
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = status_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            err,
            ApiError::Status { status: 502, ref message } if message == "upstream down"
        ));
    }

    #[test]
    fn test_endpoint_join() {
        let config = StorefrontConfig::for_api_url("http://localhost:5000/api", "/tmp/sb").unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("/cart/update/p1").unwrap().as_str(),
            "http://localhost:5000/api/cart/update/p1"
        );
        assert_eq!(
            client.endpoint("products").unwrap().as_str(),
            "http://localhost:5000/api/products"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let config = StorefrontConfig::for_api_url("http://localhost:5000/api", "/tmp/sb").unwrap();
        let client = ApiClient::new(&config).unwrap();

        let path = ApiPath::new("/cart/remove").id("../admin/users/u1");
        assert_eq!(
            client.endpoint(path).unwrap().as_str(),
            "http://localhost:5000/api/cart/remove/..%2Fadmin%2Fusers%2Fu1"
        );

        let path = ApiPath::new("/orders").id("o 1?x#y").join("cancel");
        assert_eq!(
            client.endpoint(path).unwrap().as_str(),
            "http://localhost:5000/api/orders/o%201%3Fx%23y/cancel"
        );

        for id in ["..", ".", ""] {
            let err = client.endpoint(ApiPath::new("/orders").id(id)).unwrap_err();
            assert!(matches!(err, ApiError::InvalidPath(_)));
        }
    }

    #[tokio::test]
    async fn test_authenticated_call_without_token_skips_network() {
        // Nothing listens on this port; reaching the network would fail with Network.
        let config = StorefrontConfig::for_api_url("http://127.0.0.1:9/api", "/tmp/sb").unwrap();
        let client = ApiClient::new(&config).unwrap();
        let err = client
            .get::<serde::de::IgnoredAny>("/cart", Access::Authenticated)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }
}
