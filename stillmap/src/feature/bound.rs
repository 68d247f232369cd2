//! Bound features: invisible extents that only influence the viewport.

use super::Extent;

/// An explicit bounding box included in extent resolution but never drawn.
///
/// Useful to force a minimum viewport around sparse features.
#[derive(Debug, Clone)]
pub struct Bound {
    extent: Extent,
}

impl Bound {
    /// Creates a bound from an extent.
    pub fn new(extent: Extent) -> Self {
        Self { extent }
    }

    /// The wrapped extent.
    pub fn extent(&self) -> Extent {
        self.extent
    }
}
