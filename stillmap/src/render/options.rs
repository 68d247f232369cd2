//! Per-renderer configuration.
//!
//! Every recognized field is enumerated here with its documented default.
//! Options are immutable once handed to the renderer; validation of raw
//! user input (HTTP parameters, CLI JSON) happens outside the core, which
//! consumes this struct read-only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::feature::{Coordinate, Extent};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default cap on concurrent tile requests; 0 means unlimited.
pub const DEFAULT_TILE_REQUEST_LIMIT: usize = 2;

/// Default per-fetch timeout in seconds.
pub const DEFAULT_TILE_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default tile cache time-to-live in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default tile layer URL template (OpenStreetMap).
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// One base tile source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    /// URL template with `{z}`, `{x}`, `{y}`, `{s}` and `{quadkey}`
    /// placeholders.
    pub tile_url: String,
    /// Candidate values for the `{s}` placeholder; one is chosen at random
    /// per tile.
    #[serde(default)]
    pub tile_subdomains: Vec<String>,
}

impl TileLayer {
    /// A layer without subdomains.
    pub fn new(tile_url: impl Into<String>) -> Self {
        Self {
            tile_url: tile_url.into(),
            tile_subdomains: Vec::new(),
        }
    }
}

/// Inclusive zoom clamp bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl ZoomRange {
    /// Clamps `zoom` into `[min, max]`.
    pub fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 1, max: 17 }
    }
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_tile_request_limit() -> usize {
    DEFAULT_TILE_REQUEST_LIMIT
}

fn default_tile_request_timeout() -> u64 {
    DEFAULT_TILE_REQUEST_TIMEOUT_SECS
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_tile_layers() -> Vec<TileLayer> {
    vec![TileLayer::new(DEFAULT_TILE_URL)]
}

/// Immutable per-renderer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Canvas width in pixels. Required.
    pub width: u32,
    /// Canvas height in pixels. Required.
    pub height: u32,
    /// Horizontal margin kept free when fitting a zoom. Default 0.
    #[serde(default)]
    pub padding_x: u32,
    /// Vertical margin kept free when fitting a zoom. Default 0.
    #[serde(default)]
    pub padding_y: u32,
    /// Tile edge length in pixels. Default 256.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Zoom clamp bounds. Default `{min: 1, max: 17}`.
    #[serde(default)]
    pub zoom_range: ZoomRange,
    /// TMS-style Y flip for providers counting rows from the south.
    /// Default false.
    #[serde(default)]
    pub reverse_y: bool,
    /// Cap on concurrent tile fetches per render; 0 means unlimited.
    /// Default 2.
    #[serde(default = "default_tile_request_limit")]
    pub tile_request_limit: usize,
    /// Per-fetch timeout in seconds. Default 30.
    #[serde(default = "default_tile_request_timeout")]
    pub tile_request_timeout: u64,
    /// Headers sent with every tile request. Default empty.
    #[serde(default)]
    pub tile_request_headers: HashMap<String, String>,
    /// Base tile sources, drawn in order. Default: one OSM layer. May be
    /// empty for an overlay-only map.
    #[serde(default = "default_tile_layers")]
    pub tile_layers: Vec<TileLayer>,
    /// Explicit zoom; skips the zoom-fitting search.
    #[serde(default)]
    pub zoom: Option<u8>,
    /// Explicit center; skips extent resolution.
    #[serde(default)]
    pub center: Option<Coordinate>,
    /// Explicit extent unioned into extent resolution.
    #[serde(default)]
    pub extent: Option<Extent>,
    /// Tile cache time-to-live in seconds. Default 3600.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,
}

impl RenderOptions {
    /// Creates options for a `width`×`height` canvas with every other
    /// field at its documented default.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            padding_x: 0,
            padding_y: 0,
            tile_size: DEFAULT_TILE_SIZE,
            zoom_range: ZoomRange::default(),
            reverse_y: false,
            tile_request_limit: DEFAULT_TILE_REQUEST_LIMIT,
            tile_request_timeout: DEFAULT_TILE_REQUEST_TIMEOUT_SECS,
            tile_request_headers: HashMap::new(),
            tile_layers: default_tile_layers(),
            zoom: None,
            center: None,
            extent: None,
            cache_ttl: DEFAULT_CACHE_TTL_SECS,
        }
    }

    /// Sets the zoom-fit padding.
    pub fn with_padding(mut self, x: u32, y: u32) -> Self {
        self.padding_x = x;
        self.padding_y = y;
        self
    }

    /// Sets the tile size.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Sets the zoom clamp bounds.
    pub fn with_zoom_range(mut self, min: u8, max: u8) -> Self {
        self.zoom_range = ZoomRange { min, max };
        self
    }

    /// Enables the TMS-style Y flip.
    pub fn with_reverse_y(mut self, reverse_y: bool) -> Self {
        self.reverse_y = reverse_y;
        self
    }

    /// Sets the concurrent tile request cap; 0 means unlimited.
    pub fn with_tile_request_limit(mut self, limit: usize) -> Self {
        self.tile_request_limit = limit;
        self
    }

    /// Replaces the tile layer list.
    pub fn with_tile_layers(mut self, layers: Vec<TileLayer>) -> Self {
        self.tile_layers = layers;
        self
    }

    /// Sets an explicit zoom.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Sets an explicit center.
    pub fn with_center(mut self, center: Coordinate) -> Self {
        self.center = Some(center);
        self
    }

    /// Sets an explicit extent override.
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Sets the tile cache time-to-live in seconds.
    pub fn with_cache_ttl(mut self, seconds: u64) -> Self {
        self.cache_ttl = seconds;
        self
    }
}
