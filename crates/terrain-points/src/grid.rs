//! Uniform grid spatial index.
//!
//! The cloud's x/y extent is divided into square cells of `cell_size` world
//! units. Point indices are bucketed per cell once, at load time, in a
//! compact layout: `entries` holds every point index ordered by cell and
//! `cell_starts[c]..cell_starts[c + 1]` is the slice of cell `c`. Cells are
//! stored row-major, so the cells of one grid row that a query touches form
//! a single contiguous run of `entries`.
//!
//! Queries visit only the cells overlapping the viewport and apply the exact
//! membership test to each candidate, so the result is identical to
//! [`LinearScan`](crate::viewport::LinearScan).

use std::time::Instant;

use tracing::info;

use crate::cloud::PointCloud;
use crate::error::IndexError;
use crate::viewport::{Viewport, ViewportFilter, VisibleSet};

/// Cell coordinate (possibly fractional or out of range) of `v`.
///
/// Build and query must share this exact arithmetic: it is monotonic in `v`,
/// which is what guarantees that every point inside a query rectangle lies
/// in a visited cell.
#[inline]
fn cell_coord(v: f32, origin: f32, cell_size: f32) -> f32 {
    ((v - origin) / cell_size).floor()
}

/// Number of cells needed along one axis to reach `max` from `origin`.
fn axis_cells(max: f32, origin: f32, cell_size: f32) -> Result<usize, IndexError> {
    let last = cell_coord(max, origin, cell_size);
    // An extent that overflows f32 yields an infinite coordinate.
    if !(last.is_finite() && last < u32::MAX as f32) {
        return Err(IndexError::TooLarge("cloud extent spans too many cells"));
    }
    Ok(last as usize + 1)
}

/// Grid index over a [`PointCloud`].
#[derive(Debug, Clone)]
pub struct GridIndex {
    /// World x of the left edge of column 0.
    origin_x: f32,
    /// World y of the bottom edge of row 0.
    origin_y: f32,
    /// Edge length of a cell in world units.
    cell_size: f32,
    /// Number of columns.
    cols: usize,
    /// Number of rows.
    rows: usize,
    /// Prefix offsets into `entries`, `cols * rows + 1` long.
    cell_starts: Vec<u32>,
    /// Point indices grouped by cell.
    entries: Vec<u32>,
}

impl GridIndex {
    /// Buckets every point of `cloud` into cells of `cell_size` world units.
    ///
    /// # Arguments
    /// * `cloud` - Cloud to index; the same cloud must be passed to every query
    /// * `cell_size` - Cell edge length in world units
    ///
    /// # Returns
    /// * `Result<Self, IndexError>` - The index, or an error for a bad cell size or an
    ///   unaddressable cloud
    pub fn build(cloud: &PointCloud, cell_size: f32) -> Result<Self, IndexError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(IndexError::InvalidCellSize(cell_size));
        }
        if u32::try_from(cloud.len()).is_err() {
            return Err(IndexError::TooLarge("more than u32::MAX points"));
        }

        let started = Instant::now();
        let bounds = cloud.bounds();
        if bounds.is_empty() {
            return Ok(Self {
                origin_x: 0.0,
                origin_y: 0.0,
                cell_size,
                cols: 0,
                rows: 0,
                cell_starts: vec![0],
                entries: Vec::new(),
            });
        }

        let origin_x = bounds.min_x;
        let origin_y = bounds.min_y;
        let cols = axis_cells(bounds.max_x, origin_x, cell_size)?;
        let rows = axis_cells(bounds.max_y, origin_y, cell_size)?;
        let cell_count = cols
            .checked_mul(rows)
            .filter(|&n| n < u32::MAX as usize)
            .ok_or(IndexError::TooLarge("grid has too many cells"))?;

        let mut index = Self {
            origin_x,
            origin_y,
            cell_size,
            cols,
            rows,
            cell_starts: vec![0; cell_count + 1],
            entries: vec![0; cloud.len()],
        };

        // Counting sort: histogram, prefix sum, scatter.
        for p in cloud.points() {
            let cell = index.cell_of(p.x, p.y);
            index.cell_starts[cell + 1] += 1;
        }
        for c in 0..cell_count {
            index.cell_starts[c + 1] += index.cell_starts[c];
        }
        let mut cursor = index.cell_starts.clone();
        for (i, p) in cloud.points().iter().enumerate() {
            let cell = index.cell_of(p.x, p.y);
            index.entries[cursor[cell] as usize] = i as u32;
            cursor[cell] += 1;
        }

        info!(
            cols,
            rows,
            cell_size,
            points = cloud.len(),
            elapsed = ?started.elapsed(),
            "Grid index built"
        );
        Ok(index)
    }

    /// Row-major cell of a point known to lie within the indexed bounds.
    fn cell_of(&self, x: f32, y: f32) -> usize {
        let col = (cell_coord(x, self.origin_x, self.cell_size) as usize).min(self.cols - 1);
        let row = (cell_coord(y, self.origin_y, self.cell_size) as usize).min(self.rows - 1);
        row * self.cols + col
    }

    /// Inclusive range of cells along one axis that can hold values in `[lo, hi)`.
    fn cell_span(&self, lo: f32, hi: f32, origin: f32, count: usize) -> Option<(usize, usize)> {
        if count == 0 {
            return None;
        }
        let first = cell_coord(lo, origin, self.cell_size).max(0.0);
        let last = cell_coord(hi, origin, self.cell_size).min((count - 1) as f32);
        if first > last {
            return None;
        }
        Some((first as usize, last as usize))
    }

    /// Number of `(columns, rows)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Cell edge length in world units.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the index holds no points.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ViewportFilter for GridIndex {
    fn select(&self, cloud: &PointCloud, viewport: &Viewport, out: &mut VisibleSet) {
        debug_assert_eq!(cloud.len(), self.entries.len(), "index built for another cloud");
        out.clear();
        if viewport.is_degenerate() {
            return;
        }
        let Some((col_first, col_last)) =
            self.cell_span(viewport.x_min, viewport.x_max, self.origin_x, self.cols)
        else {
            return;
        };
        let Some((row_first, row_last)) =
            self.cell_span(viewport.y_min, viewport.y_max, self.origin_y, self.rows)
        else {
            return;
        };

        let points = cloud.points();
        let colors = cloud.colors();
        for row in row_first..=row_last {
            let first_cell = row * self.cols + col_first;
            let last_cell = row * self.cols + col_last;
            let start = self.cell_starts[first_cell] as usize;
            let end = self.cell_starts[last_cell + 1] as usize;
            for &i in &self.entries[start..end] {
                let p = &points[i as usize];
                if viewport.contains(p.x, p.y) {
                    out.push(*p, colors[i as usize]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{Color, Point};
    use crate::viewport::LinearScan;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_cloud(rng: &mut StdRng, count: usize, extent: f32) -> PointCloud {
        let mut points = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(Point::new(
                rng.random_range(-extent..extent),
                rng.random_range(-extent..extent),
                rng.random_range(0.0..255.0),
            ));
            colors.push(Color::new(rng.random(), rng.random(), rng.random()));
        }
        PointCloud::from_parts(points, colors).unwrap()
    }

    fn raster_cloud(width: u32, height: u32) -> PointCloud {
        let mut points = Vec::new();
        let mut colors = Vec::new();
        for py in 0..height {
            for px in 0..width {
                points.push(Point::new(px as f32, -(py as f32), 0.0));
                colors.push(Color::default());
            }
        }
        PointCloud::from_parts(points, colors).unwrap()
    }

    /// Brute-force reference, independent of both filters.
    fn reference(cloud: &PointCloud, v: &Viewport) -> Vec<(u32, u32, u32)> {
        let mut keys: Vec<_> = cloud
            .points()
            .iter()
            .zip(cloud.colors())
            .filter(|(p, _)| p.x >= v.x_min && p.x < v.x_max && p.y >= v.y_min && p.y < v.y_max)
            .map(|(p, c)| key(p, c))
            .collect();
        keys.sort_unstable();
        keys
    }

    fn key(p: &Point, c: &Color) -> (u32, u32, u32) {
        (p.x.to_bits(), p.y.to_bits(), c.r.to_bits())
    }

    fn selected(filter: &impl ViewportFilter, cloud: &PointCloud, v: &Viewport) -> Vec<(u32, u32, u32)> {
        let mut out = VisibleSet::new();
        filter.select(cloud, v, &mut out);
        let mut keys: Vec<_> = out.iter().map(|(p, c)| key(p, c)).collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_invalid_cell_size() {
        let cloud = raster_cloud(4, 4);
        assert_eq!(GridIndex::build(&cloud, 0.0).unwrap_err(), IndexError::InvalidCellSize(0.0));
        assert!(matches!(
            GridIndex::build(&cloud, -3.0),
            Err(IndexError::InvalidCellSize(_))
        ));
        assert!(matches!(
            GridIndex::build(&cloud, f32::NAN),
            Err(IndexError::InvalidCellSize(_))
        ));
    }

    #[test]
    fn test_shape() {
        let cloud = raster_cloud(100, 50);
        let index = GridIndex::build(&cloud, 32.0).unwrap();
        // x spans [0, 99] -> 4 columns, y spans [-49, 0] -> 2 rows
        assert_eq!(index.shape(), (4, 2));
        assert_eq!(index.len(), 5000);
        assert_eq!(index.cell_size(), 32.0);
    }

    #[test]
    fn test_extent_too_large_for_grid() {
        // Extent overflows f32 to infinity
        let cloud = PointCloud::from_parts(
            vec![Point::new(-3e38, 0.0, 0.0), Point::new(3e38, 0.0, 0.0)],
            vec![Color::default(); 2],
        )
        .unwrap();
        assert_eq!(
            GridIndex::build(&cloud, 1.0).unwrap_err(),
            IndexError::TooLarge("cloud extent spans too many cells")
        );

        // Finite extent, but more cells than can be addressed
        let cloud = PointCloud::from_parts(
            vec![Point::new(0.0, 0.0, 0.0), Point::new(0.0, 1e20, 0.0)],
            vec![Color::default(); 2],
        )
        .unwrap();
        assert!(matches!(
            GridIndex::build(&cloud, 1.0),
            Err(IndexError::TooLarge(_))
        ));

        // The same points index fine with a coarse enough cell
        let index = GridIndex::build(&cloud, 1e18).unwrap();
        assert_eq!(index.shape().0, 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_empty_cloud() {
        let cloud = PointCloud::from_parts(Vec::new(), Vec::new()).unwrap();
        let index = GridIndex::build(&cloud, 8.0).unwrap();
        assert!(index.is_empty());
        let mut out = VisibleSet::new();
        index.select(&cloud, &Viewport::centered(0.0, 0.0, 100.0, 100.0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_matches_linear_scan_on_random_clouds() {
        let mut rng = StdRng::seed_from_u64(0x7e77a1);
        for round in 0..20 {
            let cloud = random_cloud(&mut rng, 2000, 100.0);
            let cell_size = rng.random_range(0.5..40.0);
            let index = GridIndex::build(&cloud, cell_size).unwrap();

            for _ in 0..50 {
                let v = Viewport::centered(
                    rng.random_range(-150.0..150.0),
                    rng.random_range(-150.0..150.0),
                    rng.random_range(0.0..120.0),
                    rng.random_range(0.0..120.0),
                );
                let expected = reference(&cloud, &v);
                assert_eq!(selected(&index, &cloud, &v), expected, "round {round}, {v:?}");
                assert_eq!(selected(&LinearScan, &cloud, &v), expected, "round {round}, {v:?}");
            }
        }
    }

    #[test]
    fn test_matches_linear_scan_on_cell_boundaries() {
        // Integer raster coordinates with viewport edges landing exactly on
        // points and on cell edges.
        let cloud = raster_cloud(64, 64);
        let index = GridIndex::build(&cloud, 8.0).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let v = Viewport::centered(
                rng.random_range(-10i32..74) as f32,
                -(rng.random_range(-10i32..74) as f32),
                (rng.random_range(0i32..40) * 2) as f32,
                (rng.random_range(0i32..40) * 2) as f32,
            );
            assert_eq!(selected(&index, &cloud, &v), reference(&cloud, &v), "{v:?}");
        }
    }

    #[test]
    fn test_far_outside_is_empty() {
        let cloud = raster_cloud(32, 32);
        let index = GridIndex::build(&cloud, 4.0).unwrap();
        let mut out = VisibleSet::new();
        for (cx, cy) in [(1e6, 0.0), (-1e6, 0.0), (0.0, 1e6), (0.0, -1e6), (f32::INFINITY, 0.0)] {
            index.select(&cloud, &Viewport::centered(cx, cy, 1600.0 / 9.0, 900.0 / 9.0), &mut out);
            assert!(out.is_empty(), "({cx}, {cy})");
        }
    }

    #[test]
    fn test_covering_viewport_selects_everything() {
        let cloud = raster_cloud(10, 7);
        let index = GridIndex::build(&cloud, 3.0).unwrap();
        let mut out = VisibleSet::new();
        index.select(&cloud, &Viewport::centered(0.0, 0.0, 1e4, 1e4), &mut out);
        assert_eq!(out.len(), 70);
    }
}
