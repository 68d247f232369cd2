//! Production imaging collaborator.
//!
//! Raster payloads go through the `image` crate; SVG overlay documents are
//! rasterized with `usvg`/`resvg` into a `tiny-skia` pixmap. The system
//! font database is loaded once at construction so `<text>` elements in
//! overlays resolve without per-render scanning.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};

use super::{Canvas, FitMode, Imaging, ImagingError, OutputFormat, Overlay};

/// JPEG encode quality.
const JPEG_QUALITY: u8 = 90;

/// Returns true when the payload looks like an SVG document.
fn sniff_svg(bytes: &[u8]) -> bool {
    let trimmed = match bytes.iter().position(|b| !b.is_ascii_whitespace()) {
        Some(start) => &bytes[start..],
        None => bytes,
    };
    trimmed.starts_with(b"<svg") || trimmed.starts_with(b"<?xml")
}

/// Imaging implementation over `image` + `resvg`.
pub struct RasterImaging {
    svg_options: usvg::Options<'static>,
}

impl RasterImaging {
    /// Creates the collaborator, loading system fonts for SVG text.
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();

        let mut svg_options = usvg::Options::default();
        svg_options.fontdb = Arc::new(fontdb);

        Self { svg_options }
    }

    /// Rasterizes an SVG document into an RGBA image at its declared size.
    fn rasterize_svg(&self, bytes: &[u8]) -> Result<RgbaImage, ImagingError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ImagingError::Svg(format!("not valid UTF-8: {e}")))?;
        let tree = usvg::Tree::from_str(text, &self.svg_options)
            .map_err(|e| ImagingError::Svg(e.to_string()))?;

        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
            .ok_or_else(|| ImagingError::Svg("zero-sized SVG document".to_string()))?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        let (width, height) = (pixmap.width(), pixmap.height());
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for pixel in pixmap.pixels() {
            let color = pixel.demultiply();
            data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| ImagingError::Svg("pixmap size mismatch".to_string()))
    }

    /// Flattens the canvas onto a white background, for alpha-less formats.
    fn flatten_onto_white(canvas: &Canvas) -> RgbImage {
        let source = canvas.image();
        RgbImage::from_fn(source.width(), source.height(), |x, y| {
            let [r, g, b, a] = source.get_pixel(x, y).0;
            let alpha = a as u16;
            let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha)) / 255) as u8;
            image::Rgb([blend(r), blend(g), blend(b)])
        })
    }
}

impl Default for RasterImaging {
    fn default() -> Self {
        Self::new()
    }
}

impl Imaging for RasterImaging {
    fn metadata(&self, bytes: &[u8]) -> Result<(u32, u32), ImagingError> {
        image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|_| ImagingError::SizeUndetectable)?
            .into_dimensions()
            .map_err(|_| ImagingError::SizeUndetectable)
    }

    fn resize(
        &self,
        bytes: &[u8],
        width: u32,
        height: u32,
        fit: FitMode,
    ) -> Result<Bytes, ImagingError> {
        let source =
            image::load_from_memory(bytes).map_err(|e| ImagingError::Decode(e.to_string()))?;
        let resized = match fit {
            FitMode::Cover => source.resize_to_fill(width, height, FilterType::Lanczos3),
            FitMode::Contain => source.resize(width, height, FilterType::Lanczos3),
            FitMode::Fill => source.resize_exact(width, height, FilterType::Lanczos3),
        };

        let mut buffer = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| ImagingError::Encode(e.to_string()))?;
        Ok(Bytes::from(buffer))
    }

    fn composite(&self, canvas: &mut Canvas, overlays: &[Overlay]) -> Result<(), ImagingError> {
        for overlay in overlays {
            let layer = if sniff_svg(&overlay.bytes) {
                self.rasterize_svg(&overlay.bytes)?
            } else {
                image::load_from_memory(&overlay.bytes)
                    .map_err(|e| ImagingError::Decode(e.to_string()))?
                    .to_rgba8()
            };
            image::imageops::overlay(canvas.image_mut(), &layer, overlay.left, overlay.top);
        }
        Ok(())
    }

    fn encode(&self, canvas: &Canvas, format: OutputFormat) -> Result<Bytes, ImagingError> {
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Png => {
                DynamicImage::ImageRgba8(canvas.image().clone())
                    .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
                    .map_err(|e| ImagingError::Encode(e.to_string()))?;
            }
            OutputFormat::Jpeg => {
                let flattened = Self::flatten_onto_white(canvas);
                let mut cursor = Cursor::new(&mut buffer);
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
                flattened
                    .write_with_encoder(encoder)
                    .map_err(|e| ImagingError::Encode(e.to_string()))?;
            }
            OutputFormat::WebP => {
                let mut cursor = Cursor::new(&mut buffer);
                let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut cursor);
                DynamicImage::ImageRgba8(canvas.image().clone())
                    .write_with_encoder(encoder)
                    .map_err(|e| ImagingError::Encode(e.to_string()))?;
            }
        }
        Ok(Bytes::from(buffer))
    }
}
