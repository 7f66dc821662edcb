//! REST client for the Candleworks backend.
//!
//! The backend keeps the session credential in a cookie, so every request
//! goes through a shared cookie jar; token-based deployments additionally
//! return a bearer pair from `POST /api/token/`, which is held in memory and
//! attached to subsequent requests.
//!
//! Endpoint groups live in submodules: [`auth`], [`cart`], [`catalog`],
//! [`addresses`], [`orders`].

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use catalog::CacheValue;

/// Request timeout for all backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog cache TTL (5 minutes).
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (network, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint path did not join onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Status code for API-level failures, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the Candleworks backend REST API.
///
/// Cheap to clone; all clones share the cookie jar, the held bearer token,
/// and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    /// Access token from `POST /api/token/`, when the deployment uses bearer
    /// auth on top of the session cookie.
    bearer: RwLock<Option<SecretString>>,
    catalog_cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let catalog_cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                bearer: RwLock::new(None),
                catalog_cache,
            }),
        })
    }

    /// Base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Hold a bearer token for subsequent requests.
    pub(crate) fn set_bearer_token(&self, token: SecretString) {
        if let Ok(mut bearer) = self.inner.bearer.write() {
            *bearer = Some(token);
        }
    }

    /// Drop the held bearer token. Idempotent.
    pub(crate) fn clear_bearer_token(&self) {
        if let Ok(mut bearer) = self.inner.bearer.write() {
            *bearer = None;
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn apply_bearer(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self
            .inner
            .bearer
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| t.expose_secret().to_string()));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.apply_bearer(self.inner.client.get(url)).send().await?;
        Ok(response)
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(path)?;
        let response = self
            .apply_bearer(self.inner.client.post(url))
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    pub(crate) async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(path)?;
        let response = self
            .apply_bearer(self.inner.client.put(url))
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(path)?;
        let response = self
            .apply_bearer(self.inner.client.delete(url))
            .send()
            .await?;
        Ok(response)
    }

    fn catalog_cache(&self) -> &Cache<String, CacheValue> {
        &self.inner.catalog_cache
    }
}

/// Require a success status, mapping anything else to [`ApiError::Api`].
pub(crate) async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Api {
        status: status.as_u16(),
        message: message.chars().take(200).collect(),
    })
}

/// Require a success status and decode the JSON body.
pub(crate) async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let response = expect_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - unauthorized");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_endpoint_joins_relative() {
        let client = ApiClient::new(Url::parse("http://localhost:3001/").unwrap()).unwrap();
        let url = client.endpoint("cart/query/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/cart/query/");
    }

    #[test]
    fn test_bearer_token_roundtrip() {
        let client = ApiClient::new(Url::parse("http://localhost:3001/").unwrap()).unwrap();
        client.set_bearer_token(SecretString::from("token-abc"));
        client.clear_bearer_token();
        // Clearing twice is fine.
        client.clear_bearer_token();
    }
}
