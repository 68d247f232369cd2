//! End-to-end renders against a scripted HTTP client.
//!
//! These tests drive the full public pipeline: viewport resolution, tile
//! fetching through the cache, marker compositing, vector overlays and
//! final encoding. No network is touched; every tile comes from a local
//! [`HttpClient`] implementation.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, RgbaImage};
use stillmap::cache::TileCache;
use stillmap::extent::ExtentResolver;
use stillmap::fetch::{FetchError, HttpClient, HttpResponse};
use stillmap::{
    Coordinate, Feature, Line, Marker, OutputFormat, RasterImaging, RenderOptions,
    StaticMapRenderer, TileLayer,
};

/// Serves the same PNG tile for every URL and records the calls.
struct ScriptedClient {
    tile: Bytes,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn serving(tile: Bytes) -> Self {
        Self {
            tile,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls poisoned").clone()
    }
}

impl HttpClient for ScriptedClient {
    async fn fetch(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.calls
            .lock()
            .expect("calls poisoned")
            .push(url.to_string());
        Ok(HttpResponse {
            status: 200,
            content_type: Some("image/png".to_string()),
            body: self.tile.clone(),
        })
    }
}

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Bytes {
    let image = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    Bytes::from(buffer)
}

fn renderer(
    options: RenderOptions,
    client: Arc<ScriptedClient>,
) -> StaticMapRenderer<Arc<ScriptedClient>, RasterImaging> {
    StaticMapRenderer::with_parts(
        options,
        client,
        Arc::new(TileCache::default()),
        RasterImaging::new(),
    )
}

#[tokio::test]
async fn test_paris_render_fills_canvas_with_tiles() {
    let client = Arc::new(ScriptedClient::serving(png(256, 256, [30, 60, 90, 255])));
    let options = RenderOptions::new(256, 256)
        .with_tile_layers(vec![TileLayer::new("https://t.example/{z}/{x}/{y}.png")]);
    let renderer = renderer(options, Arc::clone(&client));

    let canvas = renderer
        .render(Some(Coordinate::new(2.3522, 48.8566)), Some(12))
        .await
        .unwrap();

    assert_eq!((canvas.width(), canvas.height()), (256, 256));
    assert_eq!(canvas.image().get_pixel(128, 128).0, [30, 60, 90, 255]);
    // Every requested tile belongs to zoom 12.
    let calls = client.calls();
    assert!(!calls.is_empty());
    assert!(calls.iter().all(|url| url.contains("/12/")));
}

#[tokio::test]
async fn test_cache_is_shared_across_renders() {
    let client = Arc::new(ScriptedClient::serving(png(256, 256, [0, 0, 0, 255])));
    let options = RenderOptions::new(128, 128)
        .with_tile_layers(vec![TileLayer::new("https://t.example/{z}/{x}/{y}.png")]);
    let renderer = renderer(options, Arc::clone(&client));

    let center = Some(Coordinate::new(13.4050, 52.5200));
    renderer.render(center, Some(10)).await.unwrap();
    let after_first = client.calls().len();
    renderer.render(center, Some(10)).await.unwrap();

    assert_eq!(
        client.calls().len(),
        after_first,
        "second render must be served entirely from cache"
    );
}

#[tokio::test]
async fn test_two_markers_determine_midpoint_center() {
    let options = RenderOptions::new(256, 256);
    let features = vec![
        Feature::Marker(
            Marker::from_bytes(png(8, 8, [255, 0, 0, 255]))
                .with_coordinate(Coordinate::new(1.0, 2.0))
                .with_size(8, 8),
        ),
        Feature::Marker(
            Marker::from_bytes(png(8, 8, [255, 0, 0, 255]))
                .with_coordinate(Coordinate::new(3.0, 4.0))
                .with_size(8, 8),
        ),
    ];

    let resolver = ExtentResolver::new(&options, &features);
    let center = resolver.determine_extent(None).unwrap().center();
    assert!((center.lon - 2.0).abs() < 1e-9);
    assert!((center.lat - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_render_without_center_uses_marker_midpoint() {
    let client = Arc::new(ScriptedClient::serving(png(256, 256, [50, 50, 50, 255])));
    let options = RenderOptions::new(256, 256)
        .with_zoom(5)
        .with_tile_layers(vec![TileLayer::new("https://t.example/{z}/{x}/{y}.png")]);
    let mut renderer = renderer(options, Arc::clone(&client));
    renderer.add_marker(
        Marker::from_bytes(png(8, 8, [255, 0, 0, 255]))
            .with_coordinate(Coordinate::new(1.0, 2.0))
            .with_size(8, 8),
    );
    renderer.add_marker(
        Marker::from_bytes(png(8, 8, [255, 0, 0, 255]))
            .with_coordinate(Coordinate::new(3.0, 4.0))
            .with_size(8, 8),
    );

    let canvas = renderer.render(None, None).await.unwrap();

    // The resolved center is the marker midpoint, roughly (2, 3): at zoom 5
    // that is inside tile (16, 15), which must be among the fetched tiles.
    assert_eq!((canvas.width(), canvas.height()), (256, 256));
    let calls = client.calls();
    assert!(
        calls.iter().any(|url| url.contains("/5/16/15")),
        "center tile not fetched, calls: {calls:?}"
    );
}

#[tokio::test]
async fn test_marker_composites_onto_tiles() {
    let client = Arc::new(ScriptedClient::serving(png(256, 256, [200, 200, 200, 255])));
    let options = RenderOptions::new(128, 128)
        .with_tile_layers(vec![TileLayer::new("https://t.example/{z}/{x}/{y}.png")]);
    let mut renderer = renderer(options, client);

    renderer.add_marker(
        Marker::from_bytes(png(16, 16, [255, 0, 0, 255]))
            .with_coordinate(Coordinate::new(0.0, 0.0))
            .with_drawn_size(8, 8),
    );

    let canvas = renderer
        .render(Some(Coordinate::new(0.0, 0.0)), Some(8))
        .await
        .unwrap();

    // Bottom-center anchor puts the icon directly above the center pixel,
    // on top of the gray tiles.
    assert_eq!(canvas.image().get_pixel(64, 60).0, [255, 0, 0, 255]);
    assert_eq!(canvas.image().get_pixel(64, 70).0, [200, 200, 200, 255]);
}

#[tokio::test]
async fn test_line_overlay_drawn_over_tiles() {
    let client = Arc::new(ScriptedClient::serving(png(256, 256, [255, 255, 255, 255])));
    let options = RenderOptions::new(128, 128)
        .with_tile_layers(vec![TileLayer::new("https://t.example/{z}/{x}/{y}.png")]);
    let mut renderer = renderer(options, client);

    renderer.add_line(
        Line::new(vec![Coordinate::new(-5.0, 0.0), Coordinate::new(5.0, 0.0)])
            .unwrap()
            .with_color("#ff0000")
            .with_width(4.0),
    );

    let canvas = renderer
        .render(Some(Coordinate::new(0.0, 0.0)), Some(4))
        .await
        .unwrap();

    let [r, g, _, _] = canvas.image().get_pixel(64, 64).0;
    assert!(r > 200 && g < 100, "line not drawn over tiles: r={r} g={g}");
}

#[tokio::test]
async fn test_render_encoded_formats() {
    let client = Arc::new(ScriptedClient::serving(png(256, 256, [10, 20, 30, 255])));
    let options = RenderOptions::new(64, 64)
        .with_tile_layers(vec![TileLayer::new("https://t.example/{z}/{x}/{y}.png")]);
    let renderer = renderer(options, client);
    let center = Some(Coordinate::new(0.0, 0.0));

    let png_bytes = renderer
        .render_encoded(center, Some(3), OutputFormat::Png)
        .await
        .unwrap();
    assert!(png_bytes.starts_with(b"\x89PNG"));

    let jpeg_bytes = renderer
        .render_encoded(center, Some(3), OutputFormat::Jpeg)
        .await
        .unwrap();
    assert!(jpeg_bytes.starts_with(&[0xFF, 0xD8]));

    let webp_bytes = renderer
        .render_encoded(center, Some(3), OutputFormat::WebP)
        .await
        .unwrap();
    assert_eq!(&webp_bytes[0..4], b"RIFF");
}
