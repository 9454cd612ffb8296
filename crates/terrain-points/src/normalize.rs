//! Per-frame height normalization of the visible set.
//!
//! Heights are rescaled from the visible subset's own range, recomputed from
//! scratch every frame, into `[0, scale]`.

use crate::error::NormalizeError;
use crate::viewport::VisibleSet;

/// Default display height of the tallest visible point.
pub const DEFAULT_SCALE: f32 = 15.0;
/// Default denominator padding for flat visible regions.
pub const DEFAULT_EPSILON: f32 = 1e-5;

/// Raw height range of a visible set before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightRange {
    /// Lowest raw height.
    pub min: f32,
    /// Highest raw height.
    pub max: f32,
}

/// Linear rescale `h -> (h - min) / (max - min + epsilon) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightNormalizer {
    scale: f32,
    epsilon: f32,
}

impl Default for HeightNormalizer {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl HeightNormalizer {
    /// Creates a normalizer.
    ///
    /// # Returns
    /// * `Result<Self, NormalizeError>` - The normalizer, or an error if `scale` or
    ///   `epsilon` is not positive and finite
    pub fn new(scale: f32, epsilon: f32) -> Result<Self, NormalizeError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(NormalizeError::InvalidScale(scale));
        }
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(NormalizeError::InvalidEpsilon(epsilon));
        }
        Ok(Self { scale, epsilon })
    }

    /// Upper end of the output range.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Denominator padding.
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Rescales the heights of `visible` in place.
    ///
    /// # Returns
    /// * `Option<HeightRange>` - The raw range that was mapped onto `[0, scale]`,
    ///   `None` (and nothing changed) for an empty set
    pub fn normalize(&self, visible: &mut VisibleSet) -> Option<HeightRange> {
        let range = height_range(visible)?;
        let factor = self.scale / (range.max - range.min + self.epsilon);
        for p in visible.points_mut() {
            p.height = (p.height - range.min) * factor;
        }
        Some(range)
    }
}

/// Rescales `visible` with the default scale (15) and epsilon (1e-5).
pub fn normalize(visible: &mut VisibleSet) -> Option<HeightRange> {
    HeightNormalizer::default().normalize(visible)
}

fn height_range(visible: &VisibleSet) -> Option<HeightRange> {
    let mut heights = visible.points().iter().map(|p| p.height);
    let first = heights.next()?;
    let (min, max) = heights.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h)));
    Some(HeightRange { min, max })
}
