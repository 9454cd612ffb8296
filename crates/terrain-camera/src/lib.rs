#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for the terrain viewer camera."]
#![doc = ""]
#![doc = "This crate provides the camera state, the per-frame input snapshot, the camera"]
#![doc = "controller (key pan, joystick drag pan, scroll zoom) and the cursor heading indicator."]

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub mod indicator;
pub use error::CameraError;
pub use indicator::{Indicator, IndicatorSettings};

/// Camera position `(x, y, z)` in world units plus the view rotation in degrees.
///
/// The camera looks down the world -Z axis. Nothing drives the rotation
/// fields from input; they are applied by the renderer after the translation
/// and stay at zero unless set explicitly.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraState {
    /// World-frame x position.
    pub x: f32,
    /// World-frame y position.
    pub y: f32,
    /// Distance along the viewing axis. Smaller is closer to the terrain.
    pub z: f32,
    /// Rotation about the x-axis (degrees).
    pub rotation_x: f32,
    /// Rotation about the y-axis (degrees).
    pub rotation_y: f32,
}

impl CameraState {
    /// Construct a camera at `(x, y, z)` with no rotation.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        CameraState {
            x,
            y,
            z,
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.1}, y: {:.1}, z: {:.1})", self.x, self.y, self.z)
    }
}

/// Screen dimensions in pixels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl ScreenSize {
    /// Construct a screen size.
    ///
    /// # Errors
    ///
    /// Returns `Err(CameraError::InvalidScreenSize)` if either dimension is not positive.
    pub fn new(width: f32, height: f32) -> Result<Self, CameraError> {
        // Written this way so NaN is rejected too.
        if !(width > 0.0 && height > 0.0) {
            return Err(CameraError::InvalidScreenSize("must be positive"));
        }
        Ok(ScreenSize { width, height })
    }

    /// Returns the screen center `(width / 2, height / 2)`.
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Snapshot of the input devices for a single frame.
///
/// Built by the platform layer once per frame and consumed by
/// [`CameraController::update`]. Scroll notches are counted since the
/// previous frame: positive for wheel-up, negative for wheel-down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    /// Left arrow held.
    pub left: bool,
    /// Right arrow held.
    pub right: bool,
    /// Up arrow held.
    pub up: bool,
    /// Down arrow held.
    pub down: bool,
    /// Primary (left) mouse button held.
    pub primary_down: bool,
    /// Cursor x in screen pixels.
    pub mouse_x: f32,
    /// Cursor y in screen pixels, growing downwards.
    pub mouse_y: f32,
    /// Wheel notches since the last frame.
    pub scroll_notches: i32,
    /// Window close requested or exit key pressed.
    pub quit: bool,
}

impl InputState {
    /// An idle snapshot with the cursor resting at the screen center.
    pub fn centered(screen: ScreenSize) -> Self {
        let (mouse_x, mouse_y) = screen.center();
        InputState {
            mouse_x,
            mouse_y,
            ..Default::default()
        }
    }
}

/// Tunables for [`CameraController`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// World units per frame applied by each held arrow key.
    pub speed: f32,
    /// Multiplier applied on top of `speed` for drag panning.
    pub drag_gain: f32,
    /// World units moved along z per scroll notch.
    pub zoom_step: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            speed: 5.0,
            drag_gain: 5.0,
            zoom_step: 5.0,
        }
    }
}

impl CameraSettings {
    /// Construct camera settings.
    ///
    /// # Errors
    ///
    /// Returns `Err(CameraError::InvalidSpeed)` if `speed` is not positive and finite.
    /// Returns `Err(CameraError::InvalidDragGain)` if `drag_gain` is negative or not finite.
    /// Returns `Err(CameraError::InvalidZoomStep)` if `zoom_step` is not positive and finite.
    pub fn new(speed: f32, drag_gain: f32, zoom_step: f32) -> Result<Self, CameraError> {
        let settings = CameraSettings {
            speed,
            drag_gain,
            zoom_step,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks the invariants enforced by [`CameraSettings::new`].
    ///
    /// Deserialized settings bypass the constructor, so callers loading them
    /// from configuration should run this before use.
    pub fn validate(&self) -> Result<(), CameraError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(CameraError::InvalidSpeed("must be positive and finite"));
        }
        if !(self.drag_gain.is_finite() && self.drag_gain >= 0.0) {
            return Err(CameraError::InvalidDragGain("must be non-negative and finite"));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(CameraError::InvalidZoomStep("must be positive and finite"));
        }
        Ok(())
    }
}

/// Camera controller.
///
/// There is a single always-active mode: every input produces an additive
/// update of the camera position. Positions are never clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraController {
    settings: CameraSettings,
    screen: ScreenSize,
}

impl CameraController {
    /// Construct a controller for a screen of the given size.
    ///
    /// # Errors
    ///
    /// Propagates `CameraSettings::validate` failures.
    pub fn new(settings: CameraSettings, screen: ScreenSize) -> Result<Self, CameraError> {
        settings.validate()?;
        Ok(CameraController { settings, screen })
    }

    /// Returns the controller settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Returns the screen size the drag offsets are computed against.
    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    /// Cursor offset from the screen center as a fraction of the screen size.
    ///
    /// Both components lie in `[-0.5, 0.5]` while the cursor is on screen.
    pub fn drag_offset(&self, mouse_x: f32, mouse_y: f32) -> (f32, f32) {
        let (cx, cy) = self.screen.center();
        (
            (mouse_x - cx) / self.screen.width,
            (mouse_y - cy) / self.screen.height,
        )
    }

    /// Joystick pan: moves the camera proportionally to the cursor offset.
    ///
    /// Screen y grows downwards, world y grows upwards, hence the sign flip.
    pub fn apply_drag(&self, camera: &mut CameraState, mouse_x: f32, mouse_y: f32) {
        let (offset_x, offset_y) = self.drag_offset(mouse_x, mouse_y);
        let rate = self.settings.speed * self.settings.drag_gain;
        camera.x += offset_x * rate;
        camera.y -= offset_y * rate;
    }

    /// Arrow-key pan. Held keys add up; diagonals are not normalized.
    pub fn apply_keys(&self, camera: &mut CameraState, input: &InputState) {
        let speed = self.settings.speed;
        if input.left {
            camera.x -= speed;
        }
        if input.right {
            camera.x += speed;
        }
        if input.up {
            camera.y += speed;
        }
        if input.down {
            camera.y -= speed;
        }
    }

    /// Scroll zoom: each wheel-up notch moves the camera closer (`z` decreases).
    pub fn apply_scroll(&self, camera: &mut CameraState, notches: i32) {
        camera.z -= notches as f32 * self.settings.zoom_step;
    }

    /// Applies one frame of input: drag pan, key pan, then zoom.
    pub fn update(&self, camera: &mut CameraState, input: &InputState) {
        if input.primary_down {
            self.apply_drag(camera, input.mouse_x, input.mouse_y);
        }
        self.apply_keys(camera, input);
        if input.scroll_notches != 0 {
            self.apply_scroll(camera, input.scroll_notches);
        }
    }
}

/// Alpha for a point with the given normalized height.
///
/// Higher points are slightly more opaque, which reads as a depth cue.
pub fn depth_cue_alpha(normalized_height: f32) -> f32 {
    0.5 + normalized_height / 30.0
}
