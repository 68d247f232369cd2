//! Render orchestration.
//!
//! [`StaticMapRenderer`] owns the option set, the feature list and the
//! long-lived collaborators (HTTP client, tile cache, imaging backend) and
//! walks one render through its phases: resolve the viewport, stitch the
//! base tile layers, place marker icons, draw the vector overlay. Each
//! `render` call gets fresh per-render state, so one renderer can serve
//! sequential renders while the tile cache keeps paying off across them.

mod options;

pub use options::{
    RenderOptions, TileLayer, ZoomRange, DEFAULT_CACHE_TTL_SECS, DEFAULT_TILE_REQUEST_LIMIT,
    DEFAULT_TILE_REQUEST_TIMEOUT_SECS, DEFAULT_TILE_SIZE, DEFAULT_TILE_URL,
};

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::cache::TileCache;
use crate::compose::{Compositor, Viewport};
use crate::extent::ExtentResolver;
use crate::feature::{
    Bound, Circle, Coordinate, Feature, FeatureError, Line, Marker, MultiPolygon, Text,
};
use crate::fetch::{FetchError, HttpClient, ReqwestClient, TileFetcher};
use crate::imaging::{Canvas, Imaging, ImagingError, OutputFormat, RasterImaging};
use crate::projection::{lat_to_y, lon_to_x};

/// Errors that abort a render.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Nothing determines a viewport: no center, no extent, no features.
    #[error("cannot render an empty map: no center, extent or features")]
    EmptyMap,
    /// A feature is unusable (for example a marker without a coordinate).
    #[error(transparent)]
    Feature(#[from] FeatureError),
    /// The HTTP client could not be built.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Pixel work failed (decode, SVG rasterization, encode).
    #[error(transparent)]
    Imaging(#[from] ImagingError),
    /// A marker icon file could not be read.
    #[error("failed to read icon file: {0}")]
    Io(#[from] std::io::Error),
}

/// The phases one render moves through, strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderPhase {
    Empty,
    ExtentResolved,
    TilesDrawn,
    MarkersDrawn,
    OverlayDrawn,
}

/// Per-render phase tracking.
///
/// Created fresh for every `render` call; the renderer itself carries no
/// mutable render state, which is what makes sequential renders safe.
struct RenderState {
    phase: RenderPhase,
}

impl RenderState {
    fn new() -> Self {
        Self {
            phase: RenderPhase::Empty,
        }
    }

    /// Moves to the next phase. Phases never repeat or go backwards.
    fn advance(&mut self, next: RenderPhase) {
        debug_assert!(next > self.phase, "phase {next:?} after {:?}", self.phase);
        debug!(from = ?self.phase, to = ?next, "render phase");
        self.phase = next;
    }
}

/// Renders static raster maps from tile layers and overlay features.
///
/// Collaborators are fixed at construction; [`StaticMapRenderer::new`]
/// wires the production stack, [`StaticMapRenderer::with_parts`] accepts
/// arbitrary implementations for tests or embedding.
pub struct StaticMapRenderer<C: HttpClient = ReqwestClient, I: Imaging = RasterImaging> {
    options: RenderOptions,
    features: Vec<Feature>,
    fetcher: TileFetcher<C>,
    imaging: I,
}

impl StaticMapRenderer {
    /// Creates a renderer with the production HTTP client, a shared TTL
    /// tile cache and the raster imaging backend.
    ///
    /// A `cache_ttl` of zero disables tile caching entirely.
    pub fn new(options: RenderOptions) -> Result<Self, RenderError> {
        let client = ReqwestClient::new(
            Duration::from_secs(options.tile_request_timeout),
            &options.tile_request_headers,
        )?;
        let cache = if options.cache_ttl == 0 {
            TileCache::disabled()
        } else {
            TileCache::new(Duration::from_secs(options.cache_ttl))
        };
        Ok(Self::with_parts(
            options,
            client,
            Arc::new(cache),
            RasterImaging::new(),
        ))
    }
}

impl<C: HttpClient, I: Imaging> StaticMapRenderer<C, I> {
    /// Creates a renderer from explicit collaborators.
    pub fn with_parts(
        options: RenderOptions,
        client: C,
        cache: Arc<TileCache>,
        imaging: I,
    ) -> Self {
        let fetcher = TileFetcher::new(client, cache, options.tile_request_limit);
        Self {
            options,
            features: Vec::new(),
            fetcher,
            imaging,
        }
    }

    /// The option set this renderer was built with.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// The features added so far, in draw order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Adds any feature.
    pub fn add_feature(&mut self, feature: Feature) -> &mut Self {
        self.features.push(feature);
        self
    }

    /// Adds a marker.
    pub fn add_marker(&mut self, marker: Marker) -> &mut Self {
        self.add_feature(Feature::Marker(marker))
    }

    /// Adds a line or polygon.
    pub fn add_line(&mut self, line: Line) -> &mut Self {
        self.add_feature(Feature::Line(line))
    }

    /// Adds a multipolygon.
    pub fn add_multipolygon(&mut self, multipolygon: MultiPolygon) -> &mut Self {
        self.add_feature(Feature::MultiPolygon(multipolygon))
    }

    /// Adds a circle.
    pub fn add_circle(&mut self, circle: Circle) -> &mut Self {
        self.add_feature(Feature::Circle(circle))
    }

    /// Adds a text label.
    pub fn add_text(&mut self, text: Text) -> &mut Self {
        self.add_feature(Feature::Text(text))
    }

    /// Adds an invisible extent bound.
    pub fn add_bound(&mut self, bound: Bound) -> &mut Self {
        self.add_feature(Feature::Bound(bound))
    }

    /// True when nothing determines a viewport.
    fn is_empty_map(&self, center: Option<Coordinate>) -> bool {
        center.is_none()
            && self.options.center.is_none()
            && self.options.extent.is_none()
            && self.features.is_empty()
    }

    /// Resolves the viewport for one render.
    ///
    /// Explicit arguments win over options, which win over derivation from
    /// the feature extents. The zoom is always clamped into the configured
    /// range, derived or not.
    fn resolve_viewport(
        &self,
        center: Option<Coordinate>,
        zoom: Option<u8>,
    ) -> Result<Viewport, RenderError> {
        let resolver = ExtentResolver::new(&self.options, &self.features);

        let zoom = match zoom.or(self.options.zoom) {
            Some(zoom) => zoom,
            None => resolver.calculate_zoom()?,
        };
        let zoom = self.options.zoom_range.clamp_zoom(zoom);

        let center = match center.or(self.options.center) {
            Some(center) => center,
            None => {
                let extent = resolver.determine_extent(Some(zoom))?;
                if !extent.is_valid() {
                    return Err(RenderError::EmptyMap);
                }
                extent.center()
            }
        };

        Ok(Viewport {
            center_x: lon_to_x(center.lon, zoom),
            center_y: lat_to_y(center.lat, zoom),
            zoom,
            width: self.options.width,
            height: self.options.height,
            tile_size: self.options.tile_size,
        })
    }

    /// Renders one map to a canvas.
    ///
    /// `center` and `zoom` override the corresponding options for this call
    /// only. Fails with [`RenderError::EmptyMap`] when neither arguments,
    /// options nor features determine a viewport.
    pub async fn render(
        &self,
        center: Option<Coordinate>,
        zoom: Option<u8>,
    ) -> Result<Canvas, RenderError> {
        if self.is_empty_map(center) {
            return Err(RenderError::EmptyMap);
        }

        let viewport = self.resolve_viewport(center, zoom)?;
        let mut state = RenderState::new();
        state.advance(RenderPhase::ExtentResolved);
        debug!(
            zoom = viewport.zoom,
            center_x = viewport.center_x,
            center_y = viewport.center_y,
            "viewport resolved"
        );

        let mut canvas = Canvas::new(self.options.width, self.options.height);
        let compositor = Compositor::new(&self.fetcher, &self.imaging, &self.options, viewport);

        for layer in &self.options.tile_layers {
            compositor.draw_base_layer(&mut canvas, layer).await?;
        }
        state.advance(RenderPhase::TilesDrawn);

        let markers: Vec<&Marker> = self
            .features
            .iter()
            .filter_map(|feature| match feature {
                Feature::Marker(marker) => Some(marker),
                _ => None,
            })
            .collect();
        compositor.draw_markers(&mut canvas, &markers).await?;
        state.advance(RenderPhase::MarkersDrawn);

        let vector_features: Vec<&Feature> = self
            .features
            .iter()
            .filter(|feature| {
                matches!(
                    feature,
                    Feature::Line(_)
                        | Feature::MultiPolygon(_)
                        | Feature::Circle(_)
                        | Feature::Text(_)
                )
            })
            .collect();
        compositor.draw_svg(&mut canvas, &vector_features)?;
        state.advance(RenderPhase::OverlayDrawn);

        Ok(canvas)
    }

    /// Renders one map and encodes it into `format`.
    pub async fn render_encoded(
        &self,
        center: Option<Coordinate>,
        zoom: Option<u8>,
        format: OutputFormat,
    ) -> Result<Bytes, RenderError> {
        let canvas = self.render(center, zoom).await?;
        Ok(self.imaging.encode(&canvas, format)?)
    }
}
