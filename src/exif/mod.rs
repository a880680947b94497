// SPDX-License-Identifier: MPL-2.0
//! Reading and writing the GPS tag group of the JPEG APP1 Exif
//! container.
//!
//! Reads are tolerant: an image without Exif, without a GPS group, or
//! with individual malformed tag values still produces a usable result.
//! Writes preserve every tag group the image already carried and only
//! touch the GPS group.

mod container;
mod jpeg;

pub use container::{decode_rational, MetadataContainer, TagValue};
pub use jpeg::is_jpeg;

use crate::coord::{format_gms, DecimalCoordinate, FormattedCoordinates, Hemisphere};
use crate::error::{Error, Result};
use exif::Tag;
use serde::Serialize;

// =============================================================================
// GpsRecord
// =============================================================================

/// The resolved GPS data of one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsRecord {
    /// Position in signed decimal degrees.
    pub coordinate: DecimalCoordinate,
    /// Display strings in GMS notation, one per axis.
    pub formatted: FormattedCoordinates,
    /// Altitude in meters, negative below sea level. Absent when the
    /// container carries no altitude tag.
    pub altitude_meters: Option<f64>,
    /// Camera heading at capture, degrees in [0, 360).
    pub bearing_degrees: Option<f64>,
}

impl GpsRecord {
    /// Builds a record from a decimal position, deriving the formatted
    /// display strings.
    #[must_use]
    pub fn new(
        coordinate: DecimalCoordinate,
        altitude_meters: Option<f64>,
        bearing_degrees: Option<f64>,
    ) -> Self {
        Self {
            coordinate,
            formatted: format_gms(coordinate.latitude(), coordinate.longitude()),
            altitude_meters,
            bearing_degrees,
        }
    }
}

/// Everything a read yields: the GPS record (if any), the capture
/// timestamp (if any), and the full container for re-encoding.
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    /// `None` means "no GPS data present", the common case.
    pub gps: Option<GpsRecord>,
    /// Original-capture timestamp in `"YYYY:MM:DD HH:MM:SS"` notation.
    pub timestamp: Option<String>,
    pub container: MetadataContainer,
}

// =============================================================================
// Read
// =============================================================================

/// Parses the Exif container of a JPEG image.
///
/// A JPEG without an Exif segment yields an empty container and no GPS
/// record. GPS tags that are partially absent, or whose rationals decode
/// to the zero sentinel such that the combined coordinate is not finite,
/// also yield `gps: None`; only a byte stream that is not a JPEG at all,
/// or an Exif blob that does not parse, is an error.
///
/// # Errors
///
/// Returns [`Error::InputUnreadable`] for unsupported or corrupt input.
pub fn read_metadata(bytes: &[u8]) -> Result<ImageMetadata> {
    let container = match jpeg::extract_exif_payload(bytes)? {
        Some(raw) => MetadataContainer::from_raw(raw)?,
        None => MetadataContainer::default(),
    };

    let gps = read_gps_record(&container);
    let timestamp = read_timestamp(&container);
    Ok(ImageMetadata {
        gps,
        timestamp,
        container,
    })
}

/// Extracts the GPS record from a parsed container, or `None` when the
/// required tags are missing or unusable.
fn read_gps_record(container: &MetadataContainer) -> Option<GpsRecord> {
    if !container.has_gps_group() {
        return None;
    }
    let latitude = read_axis(container, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
    let longitude = read_axis(container, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }

    let altitude_meters = container.gps_tag(Tag::GPSAltitude).map(|value| {
        let altitude = decode_rational(Some(value), 0);
        // A ref of 1 marks "below sea level"; any other value is read
        // as above, tolerating out-of-domain bytes.
        let below = decode_rational(container.gps_tag(Tag::GPSAltitudeRef), 0) == 1.0;
        if below {
            -altitude
        } else {
            altitude
        }
    });

    let bearing_degrees = container
        .gps_tag(Tag::GPSImgDirection)
        .map(|value| decode_rational(Some(value), 0).rem_euclid(360.0));

    Some(GpsRecord::new(
        DecimalCoordinate::new(latitude, longitude),
        altitude_meters,
        bearing_degrees,
    ))
}

/// Decodes one axis from its coordinate triplet and hemisphere ref.
/// Both tags must be present; individual rational components are
/// decoded tolerantly.
fn read_axis(container: &MetadataContainer, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let triplet = container.gps_tag(value_tag)?;
    let letter = container
        .gps_tag(ref_tag)?
        .as_str()?
        .trim()
        .chars()
        .next()?;
    let hemisphere = Hemisphere::from_letter(letter)?;

    let degrees = decode_rational(Some(triplet), 0);
    let minutes = decode_rational(Some(triplet), 1);
    let seconds = decode_rational(Some(triplet), 2);
    Some((degrees + minutes / 60.0 + seconds / 3600.0) * hemisphere.sign())
}

/// Capture timestamp, preferring the capture group's original timestamp
/// over the primary group's generic one.
fn read_timestamp(container: &MetadataContainer) -> Option<String> {
    container
        .capture_tag(Tag::DateTimeOriginal)
        .or_else(|| container.primary_tag(Tag::DateTime))
        .and_then(TagValue::as_str)
        .map(str::to_string)
}

// =============================================================================
// Write
// =============================================================================

/// Produces a new JPEG byte buffer with the GPS tag group set to the
/// given position. All other tag groups, pixel data, and segments are
/// preserved; an image without an Exif container gets a fresh one with
/// the other groups present but empty.
///
/// # Errors
///
/// Returns [`Error::MetadataWrite`] when the input is not a JPEG or the
/// container cannot be re-encoded; the input bytes are left untouched
/// and no partial output is produced.
pub fn write_gps(bytes: &[u8], coordinate: DecimalCoordinate) -> Result<Vec<u8>> {
    if !jpeg::is_jpeg(bytes) {
        return Err(Error::MetadataWrite(
            "cannot embed metadata: not a JPEG".to_string(),
        ));
    }

    let mut container = match jpeg::extract_exif_payload(bytes)
        .map_err(|e| Error::MetadataWrite(format!("cannot embed metadata: {e}")))?
    {
        Some(raw) => MetadataContainer::from_raw(raw).unwrap_or_else(|_| {
            // An unparseable existing blob is replaced wholesale, the
            // same recovery the rest of the read path applies per tag.
            eprintln!("[WARN] Existing Exif data did not parse; rebuilding container");
            MetadataContainer::default()
        }),
        None => MetadataContainer::default(),
    };

    container.set_gps_coordinate(coordinate);
    let raw = container.to_raw()?;
    jpeg::splice_exif_segment(bytes, &raw)
}
