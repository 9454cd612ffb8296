//! Cursor heading indicator.
//!
//! A small isosceles triangle drawn just in front of the camera that points
//! from the screen center towards the cursor. It grows with the cursor's
//! distance from the center and turns more opaque while the drag button is
//! held.

use libm::{powf, sqrtf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CameraState, InputState, ScreenSize};

/// Geometry and color constants of the indicator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSettings {
    /// Half-width of the triangle base at scale 1.
    pub base_size: f32,
    /// Distance from the base to the tip at scale 1.
    pub height: f32,
    /// Exponent applied to the cursor distance (pixels) when computing the scale.
    pub scale_exponent: f32,
    /// Gain applied after the exponent.
    pub scale_gain: f32,
    /// Scale at zero cursor distance.
    pub scale_floor: f32,
    /// Cursor offset (pixels) is divided by this to shift the anchor in world units.
    pub anchor_divisor: f32,
    /// How far in front of the camera (along -z) the triangle sits.
    pub depth_offset: f32,
    /// RGB color.
    pub color: [f32; 3],
    /// Alpha while idle.
    pub idle_alpha: f32,
    /// Alpha while the primary button is held.
    pub drag_alpha: f32,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            base_size: 5.0,
            height: 10.0,
            scale_exponent: 0.75,
            scale_gain: 0.005,
            scale_floor: 0.1,
            anchor_divisor: 20.0,
            depth_offset: 50.0,
            color: [0.8, 0.9, 0.9],
            idle_alpha: 0.4,
            drag_alpha: 0.8,
        }
    }
}

/// A triangle in world coordinates, ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicator {
    /// Vertex the triangle points with.
    pub tip: [f32; 3],
    /// Base corner on the left of the heading.
    pub left: [f32; 3],
    /// Base corner on the right of the heading.
    pub right: [f32; 3],
    /// RGBA color.
    pub color: [f32; 4],
    /// Scale factor applied to the base geometry.
    pub scale: f32,
}

impl Indicator {
    /// Builds the indicator for the current camera and cursor.
    ///
    /// # Arguments
    ///
    /// * `camera`: Camera the triangle is anchored to.
    /// * `input`: Current cursor position and button state.
    /// * `screen`: Screen the cursor position refers to.
    /// * `settings`: Geometry and color constants.
    pub fn compute(
        camera: &CameraState,
        input: &InputState,
        screen: ScreenSize,
        settings: &IndicatorSettings,
    ) -> Self {
        let (cx, cy) = screen.center();
        // Screen y points down, world y points up.
        let dir_x = input.mouse_x - cx;
        let dir_y = -(input.mouse_y - cy);
        let magnitude = sqrtf(dir_x * dir_x + dir_y * dir_y);

        let scale = powf(magnitude, settings.scale_exponent) * settings.scale_gain
            + settings.scale_floor;
        let base = settings.base_size * scale;
        let height = settings.height * scale;

        let position = [
            camera.x + dir_x / settings.anchor_divisor,
            camera.y + dir_y / settings.anchor_divisor,
            camera.z - settings.depth_offset,
        ];

        let (ux, uy) = if magnitude > 0.0 {
            (dir_x / magnitude, dir_y / magnitude)
        } else {
            (0.0, 0.0)
        };

        let tip = [
            position[0] + ux * height,
            position[1] + uy * height,
            position[2],
        ];
        let left = [position[0] - uy * base, position[1] + ux * base, position[2]];
        let right = [position[0] + uy * base, position[1] - ux * base, position[2]];

        let alpha = if input.primary_down {
            settings.drag_alpha
        } else {
            settings.idle_alpha
        };
        let [r, g, b] = settings.color;

        Indicator {
            tip,
            left,
            right,
            color: [r, g, b, alpha],
            scale,
        }
    }
}
