//! Plain value types shared by the cloud, the filters and the normalizer.

/// A terrain sample in world coordinates.
///
/// `x` and `y` are the source pixel column and the negated pixel row,
/// `height` is the raw heightmap value (red channel, 0-255).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    /// The x-coordinate (pixel column).
    pub x: f32,
    /// The y-coordinate (negated pixel row).
    pub y: f32,
    /// Raw or, inside a visible set, normalized height.
    pub height: f32,
}

impl Point {
    /// Creates a new `Point`.
    #[must_use]
    pub const fn new(x: f32, y: f32, height: f32) -> Self {
        Self { x, y, height }
    }
}

/// An RGB color with components in `[0, 1]`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
}

impl Color {
    /// Creates a new `Color`.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Converts 8-bit channels to `[0, 1]` by dividing by 255.
    #[must_use]
    pub fn from_rgb8([r, g, b]: [u8; 3]) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }
}

/// Axis-aligned x/y extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest x seen.
    pub min_x: f32,
    /// Largest x seen.
    pub max_x: f32,
    /// Smallest y seen.
    pub min_y: f32,
    /// Largest y seen.
    pub max_y: f32,
}

impl Bounds {
    /// Create new bounds initialised to infinity values
    pub fn new() -> Self {
        Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    /// Update bounds with a new point
    pub fn update(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// True until the first point has been added.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        write!(
            f,
            "x: [{:.1}, {:.1}], y: [{:.1}, {:.1}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_rgb8() {
        let c = Color::from_rgb8([0, 51, 255]);
        assert_eq!(c.r, 0.0);
        assert!((c.g - 0.2).abs() < 1e-6);
        assert_eq!(c.b, 1.0);
    }

    #[test]
    fn test_bounds_update() {
        let mut bounds = Bounds::new();
        assert!(bounds.is_empty());

        bounds.update(0.0, 0.0);
        bounds.update(3.0, -3.0);
        assert!(!bounds.is_empty());
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 3.0);
        assert_eq!(bounds.min_y, -3.0);
        assert_eq!(bounds.max_y, 0.0);
    }
}
