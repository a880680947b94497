// SPDX-License-Identifier: MPL-2.0
//! Capture device port definitions.
//!
//! Three traits cover the hardware a live-capture caller brings:
//! [`FrameSource`] for the camera, [`PositionProvider`] for the GPS
//! receiver, and [`HeadingSensor`] for the compass. Splitting them
//! keeps adapters small; a desktop adapter may implement only
//! [`FrameSource`] and leave position to a stub.

use crate::error::Error;
use std::fmt;

// =============================================================================
// DeviceError
// =============================================================================

/// Errors reported by capture hardware adapters.
#[derive(Debug, Clone)]
pub enum DeviceError {
    /// The device exists but access was denied.
    PermissionDenied(String),

    /// No such device on this platform.
    NotAvailable(String),

    /// The device is present but produced no usable reading.
    ReadFailed(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::PermissionDenied(msg) => write!(f, "Device access denied: {msg}"),
            DeviceError::NotAvailable(msg) => write!(f, "Device not available: {msg}"),
            DeviceError::ReadFailed(msg) => write!(f, "Device read failed: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

impl From<DeviceError> for Error {
    fn from(err: DeviceError) -> Self {
        Error::DeviceUnavailable(err.to_string())
    }
}

// =============================================================================
// PositionFix
// =============================================================================

/// One reading from a position provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level, when the receiver reports it.
    pub altitude: Option<f64>,
    /// Travel heading in degrees, when the receiver reports it. Distinct
    /// from the compass heading a [`HeadingSensor`] yields.
    pub heading: Option<f64>,
}

// =============================================================================
// Traits
// =============================================================================

/// Port for the current geographic position.
pub trait PositionProvider {
    /// Returns the most recent position fix.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError`] when no fix can be obtained.
    fn current_position(&mut self) -> Result<PositionFix, DeviceError>;
}

/// Port for the device compass.
pub trait HeadingSensor {
    /// Returns the current heading in degrees, `[0, 360)`.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError`] when the sensor cannot be read.
    fn current_heading(&mut self) -> Result<f64, DeviceError>;
}

/// Port for the camera.
pub trait FrameSource {
    /// Captures one frame as encoded JPEG bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError`] when capture fails.
    fn capture_frame(&mut self) -> Result<Vec<u8>, DeviceError>;
}
