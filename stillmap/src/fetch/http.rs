//! HTTP client abstraction for testability.
//!
//! The [`HttpClient`] trait lets the tile fetcher be driven by a mock in
//! tests; [`ReqwestClient`] is the production implementation.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::FetchError;

/// A raw HTTP response, before any tile-level validation.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// The `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

/// Trait for HTTP GET operations.
///
/// This abstraction allows dependency injection and easier testing by
/// enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// Transport failures are reported as [`FetchError::Transport`];
    /// non-2xx responses are returned as-is for the caller to judge.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

impl<C: HttpClient> HttpClient for std::sync::Arc<C> {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send {
        (**self).fetch(url)
    }
}

/// Real HTTP client implementation using reqwest.
///
/// Timeout and default headers are fixed at construction and apply to every
/// request the client performs.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with the given per-request timeout and default
    /// headers.
    pub fn new(timeout: Duration, headers: &HashMap<String, String>) -> Result<Self, FetchError> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::ClientBuild(format!("bad header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::ClientBuild(format!("bad header value: {e}")))?;
            header_map.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(header_map)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    async fn fetch(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
