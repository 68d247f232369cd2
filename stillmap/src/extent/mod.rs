//! Viewport resolution: extent aggregation and zoom fitting.
//!
//! [`ExtentResolver`] unions the bounding boxes of every feature (plus the
//! explicit extent override) into one extent, and searches for the highest
//! zoom at which that extent fits the padded canvas. Markers are special:
//! without a zoom they contribute point extents, with a zoom their icon's
//! pixel bounding box is projected back into degrees so the whole icon
//! stays inside the fitted viewport.

use crate::feature::{Extent, Feature, FeatureError, Marker};
use crate::projection::{lat_to_y, lon_to_x, x_to_lon, y_to_lat};
use crate::render::RenderOptions;

/// Aggregates feature extents and fits zoom levels for one render.
pub struct ExtentResolver<'a> {
    options: &'a RenderOptions,
    features: &'a [Feature],
}

impl<'a> ExtentResolver<'a> {
    /// Creates a resolver over the given options and feature list.
    pub fn new(options: &'a RenderOptions, features: &'a [Feature]) -> Self {
        Self { options, features }
    }

    /// Unions the explicit extent override and every feature extent.
    ///
    /// With `zoom` present, each marker contributes its icon's pixel
    /// bounding box projected into degrees at that zoom; without it,
    /// markers are point extents. Fails with
    /// [`FeatureError::MissingCoordinate`] for a marker lacking a
    /// coordinate. With no features and no override the result is the
    /// empty (invalid) extent, which the zoom solver catches.
    pub fn determine_extent(&self, zoom: Option<u8>) -> Result<Extent, FeatureError> {
        let mut extent = Extent::empty();
        if let Some(explicit) = self.options.extent {
            extent = extent.union(&explicit);
        }

        for feature in self.features {
            let feature_extent = match (feature, zoom) {
                (Feature::Marker(marker), Some(zoom)) => {
                    self.marker_extent_at_zoom(marker, zoom)?
                }
                _ => feature.extent()?,
            };
            extent = extent.union(&feature_extent);
        }
        Ok(extent)
    }

    /// A marker's icon bounding box at `zoom`, projected into degrees.
    fn marker_extent_at_zoom(&self, marker: &Marker, zoom: u8) -> Result<Extent, FeatureError> {
        let coord = marker
            .coordinate()
            .ok_or(FeatureError::MissingCoordinate)?;
        let [left, down, right, up] = marker.extent_px();
        let tile_size = self.options.tile_size as f64;

        let x = lon_to_x(coord.lon, zoom);
        let y = lat_to_y(coord.lat, zoom);
        Ok(Extent::new(
            x_to_lon(x - left / tile_size, zoom),
            y_to_lat(y + down / tile_size, zoom),
            x_to_lon(x + right / tile_size, zoom),
            y_to_lat(y - up / tile_size, zoom),
        ))
    }

    /// Finds the highest zoom at which the feature extent fits the canvas
    /// minus padding on both axes.
    ///
    /// An invalid (empty or non-finite) base extent short-circuits to
    /// `zoom_range.min`; so does an extent that fits no candidate zoom.
    /// The result is always within `[zoom_range.min, zoom_range.max]`.
    pub fn calculate_zoom(&self) -> Result<u8, FeatureError> {
        let range = self.options.zoom_range;
        let base = self.determine_extent(None)?;
        if !base.is_valid() {
            return Ok(range.min);
        }

        let tile_size = self.options.tile_size as f64;
        let fit_width = self
            .options
            .width
            .saturating_sub(2 * self.options.padding_x) as f64;
        let fit_height = self
            .options
            .height
            .saturating_sub(2 * self.options.padding_y) as f64;

        for zoom in (range.min..=range.max).rev() {
            let extent = self.determine_extent(Some(zoom))?;
            let width_px =
                (lon_to_x(extent.max_lon, zoom) - lon_to_x(extent.min_lon, zoom)) * tile_size;
            if width_px > fit_width {
                continue;
            }
            let height_px =
                (lat_to_y(extent.min_lat, zoom) - lat_to_y(extent.max_lat, zoom)) * tile_size;
            if height_px > fit_height {
                continue;
            }
            return Ok(zoom);
        }
        Ok(range.min)
    }
}
