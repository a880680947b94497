// SPDX-License-Identifier: MPL-2.0
use std::fmt;

/// Crate-wide error type.
///
/// Per-item failures in a batch are recorded against that item and never
/// abort sibling items; the variants distinguish "nothing detected" from
/// "file corrupt" from "permission denied" so callers can show short,
/// actionable messages.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The file or image bytes could not be decoded at all.
    InputUnreadable(String),
    /// No coordinate was found: the text matched none of the supported
    /// notations, or the image carries no GPS tags.
    NoCoordinateFound,
    /// The metadata container could not be re-encoded with new tags.
    MetadataWrite(String),
    /// A pixel buffer could not be produced or encoded.
    Render(String),
    /// Camera, geolocation, or orientation sensor denied or absent.
    DeviceUnavailable(String),
    /// The external text-recognition step failed.
    Recognition(String),
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InputUnreadable(msg) => write!(f, "Unreadable input: {msg}"),
            Error::NoCoordinateFound => write!(f, "No coordinates detected"),
            Error::MetadataWrite(msg) => write!(f, "Metadata write failed: {msg}"),
            Error::Render(msg) => write!(f, "Render failed: {msg}"),
            Error::DeviceUnavailable(msg) => write!(f, "Device unavailable: {msg}"),
            Error::Recognition(msg) => write!(f, "Text recognition failed: {msg}"),
            Error::Io(msg) => write!(f, "I/O Error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
