//! Conversion of a heightmap/color raster pair into a point cloud.

use std::path::Path;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info};

use super::{Bounds, Color, Point};
use crate::error::LoadError;

/// Index-aligned points and colors derived from a raster pair.
///
/// `points[i]` and `colors[i]` always describe the same source pixel. The
/// cloud is built once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PointCloud {
    /// Source raster `(width, height)` in pixels.
    dimensions: (u32, u32),
    /// Point per pixel, row-major.
    points: Vec<Point>,
    /// Color per pixel, parallel to `points`.
    colors: Vec<Color>,
    /// Extent of `points` in x/y.
    bounds: Bounds,
}

impl PointCloud {
    /// Decodes both rasters from disk and builds the cloud.
    ///
    /// # Arguments
    /// * `heightmap` - Raster whose red channel is the terrain height
    /// * `color` - Raster providing the point colors
    ///
    /// # Returns
    /// * `Result<Self, LoadError>` - The cloud, or an error if either file cannot be decoded
    ///   or the two rasters differ in size
    pub fn load(heightmap: impl AsRef<Path>, color: impl AsRef<Path>) -> Result<Self, LoadError> {
        let started = Instant::now();
        let heightmap_raster = decode(heightmap.as_ref())?;
        let color_raster = decode(color.as_ref())?;
        debug!(elapsed = ?started.elapsed(), "Decoded rasters");

        let cloud = Self::from_rasters(&heightmap_raster, &color_raster)?;
        info!(
            width = cloud.dimensions.0,
            height = cloud.dimensions.1,
            points = cloud.len(),
            elapsed = ?started.elapsed(),
            "Point cloud loaded"
        );
        Ok(cloud)
    }

    /// Builds the cloud from two decoded rasters of identical size.
    ///
    /// For the pixel at `(px, py)`: `x = px`, `y = -py`, `height` is the
    /// heightmap's red channel and the color is the color raster's RGB / 255.
    ///
    /// # Returns
    /// * `Result<Self, LoadError>` - The cloud or `LoadError::DimensionMismatch`
    pub fn from_rasters(heightmap: &RgbImage, color: &RgbImage) -> Result<Self, LoadError> {
        if heightmap.dimensions() != color.dimensions() {
            return Err(LoadError::DimensionMismatch {
                heightmap: heightmap.dimensions(),
                color: color.dimensions(),
            });
        }

        let (width, height) = heightmap.dimensions();
        let count = width as usize * height as usize;
        let mut points = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        let mut bounds = Bounds::new();

        // Both iterators walk the pixels row by row.
        for ((px, py, h), c) in heightmap.enumerate_pixels().zip(color.pixels()) {
            let x = px as f32;
            let y = -(py as f32);
            points.push(Point::new(x, y, f32::from(h[0])));
            colors.push(Color::from_rgb8(c.0));
            bounds.update(x, y);
        }

        Ok(Self {
            dimensions: heightmap.dimensions(),
            points,
            colors,
            bounds,
        })
    }

    /// Builds a cloud from already paired points and colors.
    ///
    /// The parts are treated as a single raster row of `points.len()` pixels.
    ///
    /// # Returns
    /// * `Result<Self, LoadError>` - The cloud or `LoadError::LengthMismatch`
    pub fn from_parts(points: Vec<Point>, colors: Vec<Color>) -> Result<Self, LoadError> {
        if points.len() != colors.len() {
            return Err(LoadError::LengthMismatch {
                points: points.len(),
                colors: colors.len(),
            });
        }

        let mut bounds = Bounds::new();
        for p in &points {
            bounds.update(p.x, p.y);
        }
        let dimensions = if points.is_empty() {
            (0, 0)
        } else {
            (points.len() as u32, 1)
        };

        Ok(Self {
            dimensions,
            points,
            colors,
            bounds,
        })
    }

    /// Number of points (equal to the number of colors).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the source raster had no pixels.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in source pixel order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// All colors, parallel to [`PointCloud::points`].
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// x/y extent of the cloud.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Source raster `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

fn decode(path: &Path) -> Result<RgbImage, LoadError> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn raster(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| Rgb(f(x, y)))
    }

    #[test]
    fn test_from_rasters_layout() {
        let heightmap = raster(3, 2, |x, y| [(x + 10 * y) as u8, 200, 200]);
        let color = raster(3, 2, |x, y| [x as u8 * 100, y as u8 * 255, 17]);
        let cloud = PointCloud::from_rasters(&heightmap, &color).unwrap();

        assert_eq!(cloud.len(), 6);
        assert_eq!(cloud.points().len(), cloud.colors().len());
        assert_eq!(cloud.dimensions(), (3, 2));

        // Row-major: index = py * width + px
        let p = cloud.points()[5]; // (px, py) = (2, 1)
        assert_eq!(p, Point::new(2.0, -1.0, 12.0));
        let c = cloud.colors()[5];
        assert!((c.r - 200.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.g, 1.0);
        assert!((c.b - 17.0 / 255.0).abs() < 1e-6);

        let bounds = cloud.bounds();
        assert_eq!((bounds.min_x, bounds.max_x), (0.0, 2.0));
        assert_eq!((bounds.min_y, bounds.max_y), (-1.0, 0.0));
    }

    #[test]
    fn test_y_is_negated_row_and_colors_in_unit_range() {
        let heightmap = raster(7, 5, |x, y| [(x * y) as u8, 0, 0]);
        let color = raster(7, 5, |x, y| [(x * 37) as u8, (y * 61) as u8, 255]);
        let cloud = PointCloud::from_rasters(&heightmap, &color).unwrap();

        for (i, (p, c)) in cloud.points().iter().zip(cloud.colors()).enumerate() {
            let py = (i / 7) as f32;
            let px = (i % 7) as f32;
            assert_eq!(p.x, px);
            assert_eq!(p.y, -py);
            for v in [c.r, c.g, c.b] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_height_uses_red_channel_only() {
        let heightmap = raster(2, 1, |x, _| if x == 0 { [42, 255, 255] } else { [0, 255, 255] });
        let color = raster(2, 1, |_, _| [0, 0, 0]);
        let cloud = PointCloud::from_rasters(&heightmap, &color).unwrap();
        assert_eq!(cloud.points()[0].height, 42.0);
        assert_eq!(cloud.points()[1].height, 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let heightmap = raster(4, 4, |_, _| [0, 0, 0]);
        let color = raster(4, 3, |_, _| [0, 0, 0]);
        let result = PointCloud::from_rasters(&heightmap, &color);
        assert!(matches!(
            result,
            Err(LoadError::DimensionMismatch {
                heightmap: (4, 4),
                color: (4, 3)
            })
        ));
    }

    #[test]
    fn test_from_parts_length_mismatch() {
        let result = PointCloud::from_parts(vec![Point::default(); 3], vec![Color::default(); 2]);
        assert!(matches!(
            result,
            Err(LoadError::LengthMismatch { points: 3, colors: 2 })
        ));
        let empty = PointCloud::from_parts(Vec::new(), Vec::new()).unwrap();
        assert!(empty.is_empty());
        assert!(empty.bounds().is_empty());
        assert_eq!(empty.dimensions(), (0, 0));
    }

    #[test]
    fn test_load_missing_file() {
        let missing = std::env::temp_dir().join("terrain-points-does-not-exist.png");
        let result = PointCloud::load(&missing, &missing);
        match result {
            Err(LoadError::Decode { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_round_trip_through_png() {
        let dir = std::env::temp_dir().join(format!("terrain-points-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let heightmap_path = dir.join("heightmap.png");
        let color_path = dir.join("color.png");
        raster(4, 2, |x, _| [(x * 50) as u8, 0, 0]).save(&heightmap_path).unwrap();
        raster(4, 2, |_, y| [0, 0, (y * 255) as u8]).save(&color_path).unwrap();

        let cloud = PointCloud::load(&heightmap_path, &color_path).unwrap();
        assert_eq!(cloud.len(), 8);
        assert_eq!(cloud.points()[3].height, 150.0);
        assert_eq!(cloud.colors()[7].b, 1.0);

        // Mismatched sizes on disk are rejected after decoding
        raster(3, 2, |_, _| [0, 0, 0]).save(&color_path).unwrap();
        assert!(matches!(
            PointCloud::load(&heightmap_path, &color_path),
            Err(LoadError::DimensionMismatch { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
