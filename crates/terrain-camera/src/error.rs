#![warn(missing_docs)]

//! Error types for the camera library.
//!
//! This module defines the errors returned when camera or indicator
//! parameters are rejected at construction time.

use core::fmt;

/// Errors that can occur when configuring the camera controller.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    /// Error for an invalid pan speed.
    /// This variant is returned when the speed is not a positive, finite number.
    InvalidSpeed(&'static str),
    /// Error for an invalid drag gain.
    /// This variant is returned when the drag gain is negative or not finite.
    InvalidDragGain(&'static str),
    /// Error for an invalid zoom step.
    /// This variant is returned when the zoom step is not a positive, finite number.
    InvalidZoomStep(&'static str),
    /// Error for an invalid screen size.
    /// This variant is returned when the screen width or height is not positive.
    InvalidScreenSize(&'static str),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::InvalidSpeed(msg) => write!(f, "Invalid camera speed: {}", msg),
            CameraError::InvalidDragGain(msg) => write!(f, "Invalid drag gain: {}", msg),
            CameraError::InvalidZoomStep(msg) => write!(f, "Invalid zoom step: {}", msg),
            CameraError::InvalidScreenSize(msg) => write!(f, "Invalid screen size: {}", msg),
        }
    }
}

impl core::error::Error for CameraError {}
