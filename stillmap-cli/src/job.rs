//! Render job files.
//!
//! A job is one JSON document combining the full render option set with the
//! features to draw. Option fields sit at the top level (width, height,
//! center, zoom, tile_layers, ...); features are grouped by kind. Every
//! spec is plain data and is turned into a validated feature via
//! [`RenderJob::features`].

use std::path::PathBuf;

use serde::Deserialize;
use stillmap::{
    Bound, Circle, Coordinate, Extent, Feature, FeatureError, FitMode, Line, Marker,
    MultiPolygon, RenderOptions, Text,
};

/// One render job: options plus features.
#[derive(Debug, Deserialize)]
pub struct RenderJob {
    #[serde(flatten)]
    pub options: RenderOptions,
    #[serde(default)]
    pub markers: Vec<MarkerSpec>,
    #[serde(default)]
    pub lines: Vec<LineSpec>,
    #[serde(default)]
    pub multipolygons: Vec<MultiPolygonSpec>,
    #[serde(default)]
    pub circles: Vec<CircleSpec>,
    #[serde(default)]
    pub texts: Vec<TextSpec>,
    #[serde(default)]
    pub bounds: Vec<Extent>,
}

impl RenderJob {
    /// Builds the validated feature list, in draw order.
    pub fn features(&self) -> Result<Vec<Feature>, FeatureError> {
        let mut features = Vec::new();
        for spec in &self.markers {
            features.push(Feature::Marker(spec.build()));
        }
        for spec in &self.lines {
            features.push(Feature::Line(spec.build()?));
        }
        for spec in &self.multipolygons {
            features.push(Feature::MultiPolygon(spec.build()?));
        }
        for spec in &self.circles {
            features.push(Feature::Circle(spec.build()?));
        }
        for spec in &self.texts {
            features.push(Feature::Text(spec.build()?));
        }
        for extent in &self.bounds {
            features.push(Feature::Bound(Bound::new(*extent)));
        }
        Ok(features)
    }
}

/// A marker icon placed at a coordinate.
#[derive(Debug, Deserialize)]
pub struct MarkerSpec {
    pub coord: Coordinate,
    /// Path to the icon image file.
    pub icon: PathBuf,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub drawn_width: Option<u32>,
    #[serde(default)]
    pub drawn_height: Option<u32>,
    #[serde(default)]
    pub offset_x: Option<f64>,
    #[serde(default)]
    pub offset_y: Option<f64>,
    #[serde(default)]
    pub resize_mode: Option<FitMode>,
}

impl MarkerSpec {
    fn build(&self) -> Marker {
        let mut marker = Marker::from_path(&self.icon).with_coordinate(self.coord);
        if let (Some(width), Some(height)) = (self.width, self.height) {
            marker = marker.with_size(width, height);
        }
        if let (Some(width), Some(height)) = (self.drawn_width, self.drawn_height) {
            marker = marker.with_drawn_size(width, height);
        }
        if let (Some(x), Some(y)) = (self.offset_x, self.offset_y) {
            marker = marker.with_offset(x, y);
        }
        if let Some(mode) = self.resize_mode {
            marker = marker.with_resize_mode(mode);
        }
        marker
    }
}

/// A polyline or polygon (closed coordinate list).
#[derive(Debug, Deserialize)]
pub struct LineSpec {
    pub coords: Vec<Coordinate>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub dasharray: Option<Vec<u32>>,
}

impl LineSpec {
    fn build(&self) -> Result<Line, FeatureError> {
        let mut line = Line::new(self.coords.clone())?;
        if let Some(color) = &self.color {
            line = line.with_color(color);
        }
        if let Some(width) = self.width {
            line = line.with_width(width);
        }
        if let Some(fill) = &self.fill {
            line = line.with_fill(fill);
        }
        if let Some(dasharray) = &self.dasharray {
            line = line.with_dasharray(dasharray.clone());
        }
        Ok(line)
    }
}

/// Several closed rings filled with the even-odd rule.
#[derive(Debug, Deserialize)]
pub struct MultiPolygonSpec {
    pub rings: Vec<Vec<Coordinate>>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub fill: Option<String>,
}

impl MultiPolygonSpec {
    fn build(&self) -> Result<MultiPolygon, FeatureError> {
        let mut multipolygon = MultiPolygon::new(self.rings.clone())?;
        if let Some(color) = &self.color {
            multipolygon = multipolygon.with_color(color);
        }
        if let Some(width) = self.width {
            multipolygon = multipolygon.with_width(width);
        }
        if let Some(fill) = &self.fill {
            multipolygon = multipolygon.with_fill(fill);
        }
        Ok(multipolygon)
    }
}

/// A circle with a radius in meters.
#[derive(Debug, Deserialize)]
pub struct CircleSpec {
    pub coord: Coordinate,
    pub radius: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub fill: Option<String>,
}

impl CircleSpec {
    fn build(&self) -> Result<Circle, FeatureError> {
        let mut circle = Circle::new(self.coord, self.radius)?;
        if let Some(color) = &self.color {
            circle = circle.with_color(color);
        }
        if let Some(width) = self.width {
            circle = circle.with_width(width);
        }
        if let Some(fill) = &self.fill {
            circle = circle.with_fill(fill);
        }
        Ok(circle)
    }
}

/// A text label.
#[derive(Debug, Deserialize)]
pub struct TextSpec {
    pub coord: Coordinate,
    pub content: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub offset_x: Option<f64>,
    #[serde(default)]
    pub offset_y: Option<f64>,
}

impl TextSpec {
    fn build(&self) -> Result<Text, FeatureError> {
        let mut text = Text::new(self.coord, &self.content)?;
        if let Some(color) = &self.color {
            text = text.with_color(color);
        }
        if let Some(fill) = &self.fill {
            text = text.with_fill(fill);
        }
        if let Some(width) = self.width {
            text = text.with_width(width);
        }
        if let Some(size) = self.font_size {
            text = text.with_font_size(size);
        }
        if let Some(family) = &self.font_family {
            text = text.with_font_family(family);
        }
        if let Some(anchor) = &self.anchor {
            text = text.with_anchor(anchor);
        }
        if let (Some(x), Some(y)) = (self.offset_x, self.offset_y) {
            text = text.with_offset(x, y);
        }
        Ok(text)
    }
}
