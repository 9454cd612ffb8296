#![warn(missing_docs)]
//! Raster-derived point clouds for the terrain viewer.
//!
//! A heightmap raster and a color raster of equal size are turned into an
//! index-aligned [`PointCloud`]. Each frame the viewer selects the points
//! inside a camera-centered [`Viewport`] into a reusable [`VisibleSet`] and
//! rescales the selected heights with a [`HeightNormalizer`].

pub mod cloud;
pub mod error;
pub mod grid;
pub mod normalize;
pub mod viewport;

pub use cloud::{Bounds, Color, Point, PointCloud};
pub use error::{IndexError, LoadError, NormalizeError};
pub use grid::GridIndex;
pub use normalize::{HeightNormalizer, HeightRange, normalize};
pub use viewport::{LinearScan, Viewport, ViewportFilter, VisibleSet, filter};
