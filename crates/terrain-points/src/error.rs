//! This module defines the error types used by the `terrain-points` crate.

#![warn(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// Error type for building a point cloud from its source rasters.
///
/// Every variant is fatal at startup: the interactive loop never runs
/// without a complete, index-aligned cloud.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A raster could not be opened or decoded.
    #[error("failed to decode raster {}: {source}", .path.display())]
    Decode {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },
    /// The heightmap and color rasters differ in size, so pixels cannot be paired.
    #[error("raster dimensions differ: heightmap is {}x{}, color is {}x{}", .heightmap.0, .heightmap.1, .color.0, .color.1)]
    DimensionMismatch {
        /// Heightmap `(width, height)`.
        heightmap: (u32, u32),
        /// Color raster `(width, height)`.
        color: (u32, u32),
    },
    /// Point and color sequences of different lengths were supplied.
    #[error("{points} points but {colors} colors")]
    LengthMismatch {
        /// Number of points supplied.
        points: usize,
        /// Number of colors supplied.
        colors: usize,
    },
}

/// Error type for spatial index construction.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    /// The grid cell size is zero, negative or not finite.
    #[error("invalid grid cell size {0}: must be positive and finite")]
    InvalidCellSize(f32),
    /// The grid would need more cells, or the cloud has more points, than can be addressed.
    #[error("index too large: {0}")]
    TooLarge(&'static str),
}

/// Error type for height normalization parameters.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    /// The display scale is not positive and finite.
    #[error("invalid normalization scale {0}: must be positive and finite")]
    InvalidScale(f32),
    /// The epsilon is not positive and finite.
    #[error("invalid normalization epsilon {0}: must be positive and finite")]
    InvalidEpsilon(f32),
}
