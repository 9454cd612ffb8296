use macroquad::prelude::{
    KeyCode, MouseButton, is_key_down, is_key_pressed, is_mouse_button_down, is_quit_requested,
    mouse_position, mouse_wheel,
};
use terrain_camera::InputState;

/// Turns raw wheel deltas into whole notches.
///
/// Platforms report wheel motion in different units (one per notch, 120 per
/// notch, fractional trackpad deltas). Partial motion is carried over to the
/// next frame so nothing is lost or double counted.
#[derive(Debug, Clone, Copy)]
pub struct WheelAccumulator {
    units_per_notch: f32,
    pending: f32,
}

impl WheelAccumulator {
    pub fn new(units_per_notch: f32) -> Self {
        Self {
            units_per_notch,
            pending: 0.0,
        }
    }

    /// Adds this frame's delta (positive is wheel-up) and returns the whole
    /// notches it completed.
    pub fn feed(&mut self, delta: f32) -> i32 {
        if !delta.is_finite() {
            return 0;
        }
        self.pending += delta / self.units_per_notch;
        let notches = self.pending.trunc();
        self.pending -= notches;
        notches as i32
    }
}

/// Polls macroquad for the current frame's input.
pub fn poll(wheel: &mut WheelAccumulator) -> InputState {
    let (mouse_x, mouse_y) = mouse_position();
    let (_, wheel_y) = mouse_wheel();
    InputState {
        left: is_key_down(KeyCode::Left),
        right: is_key_down(KeyCode::Right),
        up: is_key_down(KeyCode::Up),
        down: is_key_down(KeyCode::Down),
        primary_down: is_mouse_button_down(MouseButton::Left),
        mouse_x,
        mouse_y,
        scroll_notches: wheel.feed(wheel_y),
        quit: is_quit_requested() || is_key_pressed(KeyCode::Escape),
    }
}
