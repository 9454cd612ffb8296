//! Viewport culling.
//!
//! The viewport is an axis-aligned, half-open rectangle centered on the
//! camera. Filters copy every (point, color) pair inside it into a
//! [`VisibleSet`] whose buffers are reused from frame to frame.

use crate::cloud::{Color, Point, PointCloud};

/// Half-open rectangle `[x_min, x_max) x [y_min, y_max)` in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Inclusive lower x bound.
    pub x_min: f32,
    /// Exclusive upper x bound.
    pub x_max: f32,
    /// Inclusive lower y bound.
    pub y_min: f32,
    /// Exclusive upper y bound.
    pub y_max: f32,
}

impl Viewport {
    /// Rectangle of size `view_width` x `view_height` centered on `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, view_width: f32, view_height: f32) -> Self {
        let half_width = view_width / 2.0;
        let half_height = view_height / 2.0;
        Self {
            x_min: cx - half_width,
            x_max: cx + half_width,
            y_min: cy - half_height,
            y_max: cy + half_height,
        }
    }

    /// Membership test: `x_min <= x < x_max && y_min <= y < y_max`.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x_min && x < self.x_max && y >= self.y_min && y < self.y_max
    }

    /// True when no point can satisfy [`Viewport::contains`]
    /// (zero or negative extent, or NaN bounds).
    pub fn is_degenerate(&self) -> bool {
        !(self.x_min < self.x_max && self.y_min < self.y_max)
    }
}

/// The points of a cloud that fell inside this frame's viewport.
///
/// Holds copies, so heights can be normalized in place without touching the
/// cloud. `clear` keeps the allocations for the next frame.
#[derive(Debug, Clone, Default)]
pub struct VisibleSet {
    points: Vec<Point>,
    colors: Vec<Color>,
}

impl VisibleSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every entry, keeping the buffers.
    pub fn clear(&mut self) {
        self.points.clear();
        self.colors.clear();
    }

    /// Appends one (point, color) pair.
    #[inline]
    pub fn push(&mut self, point: Point, color: Color) {
        self.points.push(point);
        self.colors.push(color);
    }

    /// Number of visible entries.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Visible points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Visible colors, parallel to [`VisibleSet::points`].
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Mutable access to the points, for in-place height normalization.
    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    /// Iterates the (point, color) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Point, &Color)> {
        self.points.iter().zip(self.colors.iter())
    }

    /// Currently allocated capacity, in entries.
    pub fn capacity(&self) -> usize {
        self.points.capacity().min(self.colors.capacity())
    }
}

/// Selects the entries of a cloud that lie inside a viewport.
///
/// Implementations must select exactly the pairs for which
/// [`Viewport::contains`] holds; only the output order may differ.
pub trait ViewportFilter {
    /// Clears `out` and fills it with the pairs of `cloud` inside `viewport`.
    fn select(&self, cloud: &PointCloud, viewport: &Viewport, out: &mut VisibleSet);
}

/// Reference filter: tests every point of the cloud.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScan;

impl ViewportFilter for LinearScan {
    fn select(&self, cloud: &PointCloud, viewport: &Viewport, out: &mut VisibleSet) {
        out.clear();
        if viewport.is_degenerate() {
            return;
        }
        for (p, c) in cloud.points().iter().zip(cloud.colors()) {
            if viewport.contains(p.x, p.y) {
                out.push(*p, *c);
            }
        }
    }
}

/// Selects the pairs within `view_width` x `view_height` of `(cx, cy)` using a full scan.
pub fn filter(
    cloud: &PointCloud,
    cx: f32,
    cy: f32,
    view_width: f32,
    view_height: f32,
    out: &mut VisibleSet,
) {
    LinearScan.select(cloud, &Viewport::centered(cx, cy, view_width, view_height), out);
}
