//! Point cloud data model and its raster source.
//!
//! This module provides the point, color and bounds types and the
//! [`PointCloud`] built once from a heightmap/color raster pair.

pub mod point_types;
pub mod source;

pub use point_types::{Bounds, Color, Point};
pub use source::PointCloud;
