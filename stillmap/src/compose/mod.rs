//! Compositing pipeline: tiles, markers and the vector overlay.
//!
//! The [`Compositor`] turns the resolved viewport into tile requests,
//! stitches fetched tiles onto the canvas, places resized marker icons and
//! renders vector features into size-bounded SVG overlay documents. All
//! pixel work is delegated to the [`Imaging`] collaborator.

mod svg;
mod viewport;

pub use svg::{circle_to_svg, line_to_svg, multipolygon_to_svg, text_to_svg};
pub use viewport::Viewport;

use bytes::Bytes;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::fetch::{HttpClient, PixelBox, TileFetcher, TileRequest};
use crate::feature::{Feature, FeatureError, IconSource, Marker};
use crate::imaging::{Canvas, Imaging, Overlay};
use crate::projection::{lat_to_y, lon_to_x};
use crate::render::{RenderError, RenderOptions, TileLayer};

/// Maximum number of features rendered into one SVG overlay document.
///
/// Bounds the size of any single markup payload so maps with very large
/// feature counts never build one unbounded string.
pub const SVG_FEATURE_CHUNK: usize = 1000;

/// Encodes a tile's x/y/zoom as a Bing-style quadkey.
pub fn tile_xy_to_quadkey(x: u32, y: u32, zoom: u8) -> String {
    let mut quadkey = String::with_capacity(zoom as usize);
    for i in (1..=zoom).rev() {
        let mask = 1u32 << (i - 1);
        let mut digit = 0u8;
        if x & mask != 0 {
            digit += 1;
        }
        if y & mask != 0 {
            digit += 2;
        }
        quadkey.push(char::from(b'0' + digit));
    }
    quadkey
}

/// Substitutes `{z}`, `{x}`, `{y}`, `{quadkey}` and `{s}` placeholders in a
/// tile URL template.
///
/// `{s}` is replaced with a randomly chosen subdomain, or removed when the
/// layer has none.
fn resolve_tile_url(
    template: &str,
    subdomains: &[String],
    zoom: u8,
    x: u32,
    y: u32,
) -> String {
    let mut url = template
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string());
    if url.contains("{quadkey}") {
        url = url.replace("{quadkey}", &tile_xy_to_quadkey(x, y, zoom));
    }
    if url.contains("{s}") {
        let subdomain = subdomains
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or("");
        url = url.replace("{s}", subdomain);
    }
    url
}

/// Draws one render's layers onto a canvas.
pub struct Compositor<'a, C: HttpClient, I: Imaging> {
    fetcher: &'a TileFetcher<C>,
    imaging: &'a I,
    options: &'a RenderOptions,
    viewport: Viewport,
}

impl<'a, C: HttpClient, I: Imaging> Compositor<'a, C, I> {
    /// Creates a compositor for one resolved viewport.
    pub fn new(
        fetcher: &'a TileFetcher<C>,
        imaging: &'a I,
        options: &'a RenderOptions,
        viewport: Viewport,
    ) -> Self {
        Self {
            fetcher,
            imaging,
            options,
            viewport,
        }
    }

    /// Computes the tile requests covering the viewport for one layer.
    ///
    /// Tile X and Y wrap modulo `2^zoom` so viewports spanning the
    /// antimeridian request the correct tiles; `reverse_y` flips the row
    /// index for TMS-style providers.
    fn tile_requests(&self, layer: &TileLayer) -> Vec<TileRequest> {
        let vp = &self.viewport;
        let zoom = vp.zoom;
        let tile_count = 1i64 << zoom;
        let tile_size = vp.tile_size as f64;

        let x_min = (vp.center_x - 0.5 * vp.width as f64 / tile_size).floor() as i64;
        let x_max = (vp.center_x + 0.5 * vp.width as f64 / tile_size).ceil() as i64;
        let y_min = (vp.center_y - 0.5 * vp.height as f64 / tile_size).floor() as i64;
        let y_max = (vp.center_y + 0.5 * vp.height as f64 / tile_size).ceil() as i64;

        let mut requests = Vec::new();
        for x in x_min..x_max {
            for y in y_min..y_max {
                let tile_x = x.rem_euclid(tile_count) as u32;
                let mut tile_y = y.rem_euclid(tile_count) as u32;
                if self.options.reverse_y {
                    tile_y = (tile_count - 1) as u32 - tile_y;
                }

                let url = resolve_tile_url(
                    &layer.tile_url,
                    &layer.tile_subdomains,
                    zoom,
                    tile_x,
                    tile_y,
                );
                requests.push(TileRequest {
                    url,
                    pixel_box: PixelBox {
                        x0: vp.x_to_px(x as f64).round() as i32,
                        y0: vp.y_to_px(y as f64).round() as i32,
                        x1: vp.x_to_px((x + 1) as f64).round() as i32,
                        y1: vp.y_to_px((y + 1) as f64).round() as i32,
                    },
                });
            }
        }
        requests
    }

    /// Fetches and stitches one tile layer onto the canvas.
    ///
    /// Failed tiles are filtered out; a layer with zero successes still
    /// leaves a valid canvas behind.
    pub async fn draw_base_layer(
        &self,
        canvas: &mut Canvas,
        layer: &TileLayer,
    ) -> Result<(), RenderError> {
        let requests = self.tile_requests(layer);
        let results = self.fetcher.get_tiles(requests).await;

        let overlays: Vec<Overlay> = results
            .into_iter()
            .filter_map(Result::ok)
            .map(|tile| Overlay {
                bytes: tile.body,
                left: tile.request.pixel_box.x0 as i64,
                top: tile.request.pixel_box.y0 as i64,
            })
            .collect();
        self.imaging.composite(canvas, &overlays)?;
        Ok(())
    }

    /// Loads, resizes and composites marker icons.
    ///
    /// Icon preparation runs through the same concurrency limiter as tile
    /// fetches so backpressure is uniform across the pipeline. Markers
    /// whose icon lands fully outside the canvas are skipped silently.
    pub async fn draw_markers(
        &self,
        canvas: &mut Canvas,
        markers: &[&Marker],
    ) -> Result<(), RenderError> {
        let tasks: Vec<_> = markers
            .iter()
            .map(|marker| self.prepare_marker(marker))
            .collect();
        let prepared = self.fetcher.limiter().run(tasks).await;

        let mut overlays = Vec::new();
        for result in prepared {
            if let Some(overlay) = result? {
                overlays.push(overlay);
            }
        }
        self.imaging.composite(canvas, &overlays)?;
        Ok(())
    }

    /// Resolves one marker into a positioned overlay, or `None` when it is
    /// off-canvas.
    ///
    /// Off-canvas means the whole icon box lies outside the canvas, not
    /// just the anchor coordinate: a marker anchored past the edge still
    /// draws as long as any part of its icon overlaps the canvas.
    async fn prepare_marker(&self, marker: &Marker) -> Result<Option<Overlay>, RenderError> {
        let coord = marker
            .coordinate()
            .ok_or(FeatureError::MissingCoordinate)?;

        let bytes: Bytes = match marker.icon() {
            IconSource::Bytes(bytes) => bytes.clone(),
            IconSource::Path(path) => Bytes::from(tokio::fs::read(path).await?),
        };

        // Explicit dimensions win; otherwise the intrinsic size is
        // auto-detected, and an undetectable size is fatal.
        let (width, height) = match marker.drawn_size() {
            Some(size) => size,
            None => self.imaging.metadata(&bytes)?,
        };

        let (anchor_x, anchor_y) = marker.offset(width, height);
        let left = self.viewport.x_to_px(lon_to_x(coord.lon, self.viewport.zoom)) - anchor_x;
        let top = self.viewport.y_to_px(lat_to_y(coord.lat, self.viewport.zoom)) - anchor_y;

        let off_canvas = left + width as f64 <= 0.0
            || top + height as f64 <= 0.0
            || left >= self.viewport.width as f64
            || top >= self.viewport.height as f64;
        if off_canvas {
            debug!(lon = coord.lon, lat = coord.lat, "marker off canvas, skipped");
            return Ok(None);
        }

        let resized = self
            .imaging
            .resize(&bytes, width, height, marker.resize_mode())?;
        Ok(Some(Overlay {
            bytes: resized,
            left: left.round() as i64,
            top: top.round() as i64,
        }))
    }

    /// Renders vector features (lines, multipolygons, circles, text) into
    /// size-bounded SVG overlay documents and composites each in one pass.
    pub fn draw_svg(&self, canvas: &mut Canvas, features: &[&Feature]) -> Result<(), RenderError> {
        let vp = &self.viewport;
        for chunk in features.chunks(SVG_FEATURE_CHUNK) {
            let mut document = format!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
                 viewBox=\"0 0 {w} {h}\">",
                w = vp.width,
                h = vp.height,
            );
            for feature in chunk {
                match feature {
                    Feature::Line(line) => document.push_str(&line_to_svg(line, vp)),
                    Feature::MultiPolygon(mp) => {
                        document.push_str(&multipolygon_to_svg(mp, vp))
                    }
                    Feature::Circle(circle) => document.push_str(&circle_to_svg(circle, vp)?),
                    Feature::Text(text) => document.push_str(&text_to_svg(text, vp)?),
                    // Markers composite as raster icons, bounds are never drawn.
                    Feature::Marker(_) | Feature::Bound(_) => {}
                }
            }
            document.push_str("</svg>");

            self.imaging.composite(
                canvas,
                &[Overlay {
                    bytes: Bytes::from(document),
                    left: 0,
                    top: 0,
                }],
            )?;
        }
        Ok(())
    }
}
