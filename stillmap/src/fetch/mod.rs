//! Tile acquisition: cache-aware, validated, concurrency-limited.
//!
//! [`TileFetcher`] resolves a batch of tile requests against the shared
//! [`TileCache`], performs the remaining fetches through an [`HttpClient`]
//! with at most `tile_request_limit` in flight, and validates responses.
//! Failures are per-tile values, never batch-aborting errors: a layer with
//! zero successful tiles still composites to a valid (blank) canvas.

mod http;
mod limiter;

pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use limiter::ConcurrencyLimiter;

#[cfg(test)]
pub(crate) use http::mock::MockHttpClient;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{cache_key, TileCache};

/// Errors for a single tile fetch.
///
/// These are recoverable by design: the compositor filters failed tiles and
/// renders a gap instead of aborting the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
    /// The request did not complete (connection, timeout, body read).
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    /// The server answered with a non-2xx status.
    #[error("unexpected status {status} from {url}")]
    BadStatus { status: u16, url: String },
    /// The response body is not an image.
    #[error("non-image content type {content_type:?} from {url}")]
    NotAnImage {
        content_type: Option<String>,
        url: String,
    },
}

/// Pixel-space placement of a tile on the canvas.
///
/// Coordinates may be negative or exceed the canvas; compositing clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

/// One tile to fetch and where to place it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    /// Fully resolved tile URL (placeholders already substituted).
    pub url: String,
    /// Canvas placement for the tile body.
    pub pixel_box: PixelBox,
}

/// A successfully fetched tile.
#[derive(Debug, Clone)]
pub struct FetchedTile {
    pub request: TileRequest,
    pub body: Bytes,
}

/// Cache-aware, concurrency-limited tile fetcher.
pub struct TileFetcher<C: HttpClient> {
    client: C,
    cache: Arc<TileCache>,
    limiter: ConcurrencyLimiter,
}

impl<C: HttpClient> TileFetcher<C> {
    /// Creates a fetcher.
    ///
    /// `request_limit` caps concurrent fetches; 0 means unlimited.
    pub fn new(client: C, cache: Arc<TileCache>, request_limit: usize) -> Self {
        Self {
            client,
            cache,
            limiter: ConcurrencyLimiter::new(request_limit),
        }
    }

    /// The limiter, shared with marker preparation so backpressure is
    /// uniform across the pipeline.
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Fetches one tile, consulting and populating the cache.
    ///
    /// Non-2xx statuses and non-`image/*` content types are fetch errors;
    /// successful bodies are cached before being returned.
    pub async fn get_tile(&self, request: TileRequest) -> Result<FetchedTile, FetchError> {
        let key = cache_key(&request.url);
        if let Some(body) = self.cache.get(&key).await {
            debug!(url = %request.url, "tile cache hit");
            return Ok(FetchedTile { request, body });
        }

        let response = self.client.fetch(&request.url).await?;

        if !(200..300).contains(&response.status) {
            return Err(FetchError::BadStatus {
                status: response.status,
                url: request.url,
            });
        }

        let is_image = response
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(FetchError::NotAnImage {
                content_type: response.content_type,
                url: request.url,
            });
        }

        self.cache.insert(key, response.body.clone()).await;
        Ok(FetchedTile {
            request,
            body: response.body,
        })
    }

    /// Fetches a batch of tiles with at most the configured number in
    /// flight, returning per-tile results in request order.
    pub async fn get_tiles(
        &self,
        requests: Vec<TileRequest>,
    ) -> Vec<Result<FetchedTile, FetchError>> {
        let tasks: Vec<_> = requests
            .into_iter()
            .map(|request| self.get_tile(request))
            .collect();
        let results = self.limiter.run(tasks).await;

        for error in results.iter().filter_map(|r| r.as_ref().err()) {
            warn!(%error, "tile fetch failed, rendering gap");
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn request(url: &str) -> TileRequest {
        TileRequest {
            url: url.to_string(),
            pixel_box: PixelBox {
                x0: 0,
                y0: 0,
                x1: 256,
                y1: 256,
            },
        }
    }

    fn requests(count: usize) -> Vec<TileRequest> {
        (0..count)
            .map(|i| request(&format!("https://tile.example/{i}.png")))
            .collect()
    }

    #[tokio::test]
    async fn test_success_populates_cache() {
        let cache = Arc::new(TileCache::default());
        let fetcher = TileFetcher::new(MockHttpClient::serving_png(b"tile"), cache.clone(), 2);

        let fetched = fetcher.get_tile(request("https://tile.example/0.png")).await.unwrap();
        assert_eq!(fetched.body, Bytes::from_static(b"tile"));

        let cached = cache.get(&cache_key("https://tile.example/0.png")).await;
        assert_eq!(cached, Some(Bytes::from_static(b"tile")));
    }

    #[tokio::test]
    async fn test_cache_hit_avoids_network() {
        let cache = Arc::new(TileCache::default());
        let mock = Arc::new(MockHttpClient::serving_png(b"tile"));
        let fetcher = TileFetcher::new(Arc::clone(&mock), cache, 2);

        fetcher.get_tile(request("https://tile.example/0.png")).await.unwrap();
        fetcher.get_tile(request("https://tile.example/0.png")).await.unwrap();
        assert_eq!(mock.calls().len(), 1, "second get must be served from cache");
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let mock = Arc::new(MockHttpClient::serving_png(b"tile"));
        let fetcher = TileFetcher::new(Arc::clone(&mock), Arc::new(TileCache::disabled()), 2);

        fetcher.get_tile(request("https://tile.example/0.png")).await.unwrap();
        fetcher.get_tile(request("https://tile.example/0.png")).await.unwrap();
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_bad_status_is_per_tile_error() {
        let mock = MockHttpClient::serving_png(b"tile").with_response(
            "https://tile.example/1.png",
            Ok(HttpResponse {
                status: 404,
                content_type: Some("image/png".to_string()),
                body: Bytes::new(),
            }),
        );
        let fetcher = TileFetcher::new(mock, Arc::new(TileCache::default()), 2);

        let results = fetcher.get_tiles(requests(2)).await;
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(FetchError::BadStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_non_image_content_type_rejected() {
        let mock = MockHttpClient::answering(Ok(HttpResponse {
            status: 200,
            content_type: Some("text/html".to_string()),
            body: Bytes::from_static(b"<html>rate limited</html>"),
        }));
        let fetcher = TileFetcher::new(mock, Arc::new(TileCache::default()), 2);

        let result = fetcher.get_tile(request("https://tile.example/0.png")).await;
        assert!(matches!(result, Err(FetchError::NotAnImage { .. })));
    }

    #[tokio::test]
    async fn test_failed_tiles_are_not_cached() {
        let cache = Arc::new(TileCache::default());
        let mock = MockHttpClient::answering(Ok(HttpResponse {
            status: 500,
            content_type: Some("image/png".to_string()),
            body: Bytes::new(),
        }));
        let fetcher = TileFetcher::new(mock, cache.clone(), 2);

        let _ = fetcher.get_tile(request("https://tile.example/0.png")).await;
        assert!(cache.get(&cache_key("https://tile.example/0.png")).await.is_none());
    }

    #[tokio::test]
    async fn test_batch_issues_one_fetch_per_request() {
        let mock = Arc::new(MockHttpClient::serving_png(b"tile"));
        let fetcher = TileFetcher::new(Arc::clone(&mock), Arc::new(TileCache::default()), 2);

        let results = fetcher.get_tiles(requests(4)).await;
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(mock.calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_concurrency_never_exceeds_limit() {
        let mock = Arc::new(
            MockHttpClient::serving_png(b"tile").with_delay(Duration::from_millis(10)),
        );
        let fetcher = TileFetcher::new(Arc::clone(&mock), Arc::new(TileCache::disabled()), 2);

        fetcher.get_tiles(requests(8)).await;
        assert_eq!(mock.calls().len(), 8);
        assert!(
            mock.max_in_flight() <= 2,
            "observed {} concurrent fetches with limit 2",
            mock.max_in_flight()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_limit_fetches_all_at_once() {
        let mock = Arc::new(
            MockHttpClient::serving_png(b"tile").with_delay(Duration::from_millis(10)),
        );
        let fetcher = TileFetcher::new(Arc::clone(&mock), Arc::new(TileCache::disabled()), 0);

        fetcher.get_tiles(requests(6)).await;
        assert_eq!(mock.max_in_flight(), 6);
    }

    #[tokio::test]
    async fn test_transport_error_propagates_per_tile() {
        let mock = MockHttpClient::answering(Err(FetchError::Transport {
            url: "https://tile.example/0.png".to_string(),
            reason: "connection refused".to_string(),
        }));
        let fetcher = TileFetcher::new(mock, Arc::new(TileCache::default()), 2);

        let results = fetcher.get_tiles(requests(3)).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_err()));
    }
}
