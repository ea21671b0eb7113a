//! HTTP collaborator: the request/response seam to the dashboard API.
//!
//! DESIGN
//! ======
//! Everything above this module talks to [`HttpClient`], a single async
//! `request` method. `ReqwestClient` is the real transport;
//! `AuthenticatedClient` decorates any client with bearer attachment and the
//! 401 credential drop.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures are `Err(HttpError)`. Non-2xx statuses are *not*
//! errors at this layer; callers inspect `HttpResponse::status` and decide.
//! Payloads are decoded into typed records here, at the boundary.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::session::BearerToken;
use crate::token_store::TokenStore;

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

pub const AUTHORIZATION: &str = "Authorization";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, headers: Vec::new() }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_bearer(self, token: &BearerToken) -> Self {
        self.header(AUTHORIZATION, token.header_value())
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Decode`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::Decode(e.to_string()))
    }

    /// Decode the API's `{ success, data, message }` wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Decode`] if the body is not a JSON object.
    pub fn envelope(&self) -> Result<ApiEnvelope, HttpError> {
        self.json()
    }

    /// Server-provided error message, if the body carries one.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.envelope().ok().and_then(|e| e.message).filter(|m| !m.is_empty())
    }
}

/// Response wrapper used by every dashboard API endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// CLIENT TRAIT
// =============================================================================

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// =============================================================================
// REQWEST CLIENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

pub struct ReqwestClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestClient {
    /// Build a client rooted at `base_url` (trailing `/` ignored).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::ClientBuild`] if the TLS backend fails to initialize.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| HttpError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = self.url(&request.path);
        tracing::debug!(method = %method, %url, "api request");

        let mut builder = self.http.request(method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| HttpError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| HttpError::Request(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

// =============================================================================
// AUTHENTICATED CLIENT
// =============================================================================

/// Attaches the stored bearer token and drops stored credentials on `401`.
pub struct AuthenticatedClient<C> {
    inner: C,
    store: TokenStore,
}

impl<C: HttpClient> AuthenticatedClient<C> {
    #[must_use]
    pub fn new(inner: C, store: TokenStore) -> Self {
        Self { inner, store }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for AuthenticatedClient<C> {
    async fn request(&self, mut request: HttpRequest) -> Result<HttpResponse, HttpError> {
        if request.header_value(AUTHORIZATION).is_none() {
            if let Some(token) = self.store.get() {
                request = request.with_bearer(&token);
            }
        }

        let path = request.path.clone();
        let response = self.inner.request(request).await?;
        if response.status == 401 {
            tracing::warn!(%path, "received 401; clearing stored credentials");
            self.store.clear_credentials();
        }
        Ok(response)
    }
}
