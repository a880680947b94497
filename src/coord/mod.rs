// SPDX-License-Identifier: MPL-2.0
//! Pure coordinate conversions: decimal degrees, GMS (degrees/minutes/
//! seconds) notation, and the rational pairs used by the Exif container.
//!
//! No I/O and no state; everything here is driven per value and is the
//! numeric foundation for both the text extractor and the metadata codec.

pub mod extract;

pub use extract::{extract_coordinates, ExtractedCoordinates, Notation};

use serde::Serialize;
use std::fmt;

// =============================================================================
// DecimalCoordinate
// =============================================================================

/// A geographic position in decimal degrees (WGS84).
///
/// # Example
///
/// ```ignore
/// let coords = DecimalCoordinate::new(18.4585, -69.9559); // Santo Domingo
/// assert!(coords.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecimalCoordinate {
    /// Latitude in decimal degrees (-90.0 to 90.0)
    latitude: f64,
    /// Longitude in decimal degrees (-180.0 to 180.0)
    longitude: f64,
}

impl DecimalCoordinate {
    /// Creates a new coordinate pair.
    ///
    /// Values outside the geographic ranges are clamped:
    /// - Latitude: -90.0 to 90.0
    /// - Longitude: -180.0 to 180.0
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: longitude.clamp(-180.0, 180.0),
        }
    }

    /// Returns the latitude in decimal degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns whether both components are finite numbers.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Formats both axes in GMS display notation.
    #[must_use]
    pub fn format(&self) -> FormattedCoordinates {
        format_gms(self.latitude, self.longitude)
    }
}

// =============================================================================
// Hemisphere / Axis
// =============================================================================

/// The four hemisphere reference letters used by GMS notation and the
/// Exif GPS ref tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Parses a hemisphere letter, case-insensitively.
    ///
    /// `O` (Spanish "Oeste") is accepted as an alias for `W`; OCR output
    /// from Spanish-labelled photos uses it for west longitudes.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' | 'O' => Some(Hemisphere::West),
            _ => None,
        }
    }

    /// Sign of the decimal value this hemisphere folds in: -1.0 for
    /// south and west, +1.0 otherwise.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Hemisphere::South | Hemisphere::West => -1.0,
            Hemisphere::North | Hemisphere::East => 1.0,
        }
    }

    /// The single-letter Exif GPS ref value ("N", "S", "E", "W").
    #[must_use]
    pub fn letter(self) -> &'static str {
        match self {
            Hemisphere::North => "N",
            Hemisphere::South => "S",
            Hemisphere::East => "E",
            Hemisphere::West => "W",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Which axis a decimal value belongs to; selects the hemisphere pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Hemisphere for a signed decimal value on this axis. Zero maps to
    /// N/E by the >= 0 convention.
    #[must_use]
    pub fn hemisphere_of(self, value: f64) -> Hemisphere {
        match (self, value >= 0.0) {
            (Axis::Latitude, true) => Hemisphere::North,
            (Axis::Latitude, false) => Hemisphere::South,
            (Axis::Longitude, true) => Hemisphere::East,
            (Axis::Longitude, false) => Hemisphere::West,
        }
    }
}

// =============================================================================
// Rational
// =============================================================================

/// Unsigned numerator/denominator pair, the container representation of
/// a single GMS component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rational {
    pub num: u32,
    pub denom: u32,
}

impl Rational {
    #[must_use]
    pub const fn new(num: u32, denom: u32) -> Self {
        Self { num, denom }
    }

    /// Decodes to a float. A zero denominator is repaired to `0.0`
    /// rather than raised; one malformed tag value must never abort the
    /// extraction of the rest of a record.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        if self.denom == 0 {
            return 0.0;
        }
        f64::from(self.num) / f64::from(self.denom)
    }
}

// =============================================================================
// GmsCoordinate
// =============================================================================

/// One axis of a position in degrees/minutes/seconds notation.
///
/// This is a lossy, display-oriented projection of a signed decimal
/// value: the sign folds into the hemisphere, degrees and minutes are
/// truncated to integers, and seconds are rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GmsCoordinate {
    pub degrees: u32,
    /// 0..=59
    pub minutes: u32,
    /// 0.0..60.0, rounded to 2 decimal places
    pub seconds: f64,
    pub hemisphere: Hemisphere,
}

impl GmsCoordinate {
    #[must_use]
    pub fn new(degrees: u32, minutes: u32, seconds: f64, hemisphere: Hemisphere) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
            hemisphere,
        }
    }

    /// Splits a signed decimal value into GMS for the given axis.
    ///
    /// degrees = floor(|v|), minutes = floor(fractional degrees * 60),
    /// seconds = remaining fraction * 60 rounded to 2 decimals. When the
    /// rounding carries seconds up to 60.00 the minute (and if needed the
    /// degree) is bumped instead, keeping seconds inside [0, 60).
    #[must_use]
    pub fn from_decimal(value: f64, axis: Axis) -> Self {
        let absolute = value.abs();
        let mut degrees = absolute.floor() as u32;
        let minutes_not_truncated = (absolute - absolute.floor()) * 60.0;
        let mut minutes = minutes_not_truncated.floor() as u32;
        let mut seconds =
            ((minutes_not_truncated - minutes_not_truncated.floor()) * 60.0 * 100.0).round()
                / 100.0;
        if seconds >= 60.0 {
            seconds = 0.0;
            minutes += 1;
        }
        if minutes >= 60 {
            minutes = 0;
            degrees += 1;
        }
        Self {
            degrees,
            minutes,
            seconds,
            hemisphere: axis.hemisphere_of(value),
        }
    }

    /// Recombines into decimal degrees: `d + m/60 + s/3600`, negated for
    /// southern and western hemispheres.
    ///
    /// Inverse of [`GmsCoordinate::from_decimal`] only up to the
    /// 2-decimal rounding of seconds; round trips carry a bounded error
    /// of about 0.005 arc-seconds.
    #[must_use]
    pub fn to_decimal(&self) -> f64 {
        let magnitude =
            f64::from(self.degrees) + f64::from(self.minutes) / 60.0 + self.seconds / 3600.0;
        magnitude * self.hemisphere.sign()
    }

    /// Encodes as the three-rational layout of an Exif GPS coordinate
    /// tag. Seconds are carried as `round(s*100)/100` so the two decimal
    /// places survive the integer arithmetic exactly.
    #[must_use]
    pub fn to_rational_triplet(&self) -> [Rational; 3] {
        [
            Rational::new(self.degrees, 1),
            Rational::new(self.minutes, 1),
            Rational::new((self.seconds * 100.0).round() as u32, 100),
        ]
    }
}

impl fmt::Display for GmsCoordinate {
    /// Renders `D° M' S" H`, trimming trailing zeros from the seconds
    /// (so `30.5`, not `30.50`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}° {}' {}\" {}",
            self.degrees,
            self.minutes,
            format_seconds(self.seconds),
            self.hemisphere
        )
    }
}

// =============================================================================
// Formatting helpers
// =============================================================================

/// Human-readable GMS strings for both axes of one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedCoordinates {
    pub latitude: String,
    pub longitude: String,
}

/// Renders `D° M' S" H` for each axis of a decimal position.
#[must_use]
pub fn format_gms(lat: f64, lng: f64) -> FormattedCoordinates {
    FormattedCoordinates {
        latitude: GmsCoordinate::from_decimal(lat, Axis::Latitude).to_string(),
        longitude: GmsCoordinate::from_decimal(lng, Axis::Longitude).to_string(),
    }
}

/// Formats seconds with at most two decimal places, trailing zeros
/// trimmed.
fn format_seconds(seconds: f64) -> String {
    let text = format!("{seconds:.2}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Maps a bearing in degrees to an 8-point compass direction.
///
/// `round(bearing / 45) mod 8` indexes `[N, NE, E, SE, S, SW, W, NW]`.
#[must_use]
pub fn cardinal(bearing: f64) -> &'static str {
    const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = ((bearing / 45.0).round() as i64).rem_euclid(8) as usize;
    DIRECTIONS[index]
}
