// SPDX-License-Identifier: MPL-2.0
//! Locates a GMS-formatted coordinate pair inside noisy recognized text.
//!
//! The input is whatever the external recognition engine produced: line
//! breaks, stray characters, and common OCR misreads of the degree,
//! minute, and second symbols (`°`/`º`, `'`/`’`/`′`, `"`/`”`/`″`) are
//! all tolerated.

use crate::coord::{GmsCoordinate, Hemisphere};
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

/// The supported coordinate notations, in the priority order they are
/// tried. The first notation with a structurally and geographically
/// valid match wins; later notations are not consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Notation {
    /// `18° 27' 30.5" N, 69° 57' 21.3" W`
    DegreesFirst,
    /// `N 18° 27' 30.5", W 69° 57' 21.3"`
    HemisphereFirst,
    /// `18 27 30.5 N 69 57 21.3 W` (no symbols)
    BareTriplet,
}

static PATTERNS: LazyLock<Vec<(Notation, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Notation::DegreesFirst,
            Regex::new(
                r#"(?i)(\d{1,3})[°º]\s*(\d{1,2})['’′]\s*([\d.]+)["”″]?\s*([NS])\s*[,;]?\s*(\d{1,3})[°º]\s*(\d{1,2})['’′]\s*([\d.]+)["”″]?\s*([EWO])"#,
            )
            .expect("degrees-first regex should compile"),
        ),
        (
            Notation::HemisphereFirst,
            Regex::new(
                r#"(?i)([NS])\s*(\d{1,3})[°º]\s*(\d{1,2})['’′]\s*([\d.]+)["”″]?\s*[,;]?\s*([EWO])\s*(\d{1,3})[°º]\s*(\d{1,2})['’′]\s*([\d.]+)["”″]?"#,
            )
            .expect("hemisphere-first regex should compile"),
        ),
        (
            Notation::BareTriplet,
            Regex::new(
                r"(?i)(\d{1,3})\s+(\d{1,2})\s+([\d.]+)\s*([NS])\s+(\d{1,3})\s+(\d{1,2})\s+([\d.]+)\s*([EWO])",
            )
            .expect("bare-triplet regex should compile"),
        ),
    ]
});

/// A coordinate pair located in free text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedCoordinates {
    /// Signed decimal latitude, within [-90, 90].
    pub latitude: f64,
    /// Signed decimal longitude, within [-180, 180].
    pub longitude: f64,
    /// The exact substring the winning pattern matched.
    pub raw: String,
    /// Which notation matched.
    pub notation: Notation,
    /// The latitude as parsed, before decimal conversion.
    pub latitude_gms: GmsCoordinate,
    /// The longitude as parsed, before decimal conversion.
    pub longitude_gms: GmsCoordinate,
}

/// Scans `text` for a coordinate pair in any supported notation.
///
/// Patterns are tried in priority order; within each pattern only the
/// first match in document order is considered. A match whose decimal
/// values fall outside geographic bounds is discarded and the next
/// notation is tried. Returns `None` when nothing valid is found;
/// unmatched text is an expected outcome, not an error.
#[must_use]
pub fn extract_coordinates(text: &str) -> Option<ExtractedCoordinates> {
    for (notation, pattern) in PATTERNS.iter() {
        let Some(captures) = pattern.captures(text) else {
            continue;
        };
        let Some((lat_gms, lng_gms)) = parse_match(*notation, &captures) else {
            continue;
        };

        let latitude = lat_gms.to_decimal();
        let longitude = lng_gms.to_decimal();
        if !latitude.is_finite() || !longitude.is_finite() {
            continue;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            continue;
        }

        return Some(ExtractedCoordinates {
            latitude,
            longitude,
            raw: captures.get(0).map(|m| m.as_str().to_string())?,
            notation: *notation,
            latitude_gms: lat_gms,
            longitude_gms: lng_gms,
        });
    }
    None
}

/// Maps the capture groups of one notation onto a (lat, lng) GMS pair.
/// Both axes must parse cleanly or the whole match is rejected.
fn parse_match(notation: Notation, captures: &Captures<'_>) -> Option<(GmsCoordinate, GmsCoordinate)> {
    // Group order per axis: (degrees, minutes, seconds, hemisphere letter).
    let (lat_groups, lng_groups) = match notation {
        Notation::DegreesFirst | Notation::BareTriplet => ([1, 2, 3, 4], [5, 6, 7, 8]),
        Notation::HemisphereFirst => ([2, 3, 4, 1], [6, 7, 8, 5]),
    };
    let lat = parse_axis(captures, lat_groups)?;
    let lng = parse_axis(captures, lng_groups)?;
    Some((lat, lng))
}

fn parse_axis(captures: &Captures<'_>, groups: [usize; 4]) -> Option<GmsCoordinate> {
    let [deg_idx, min_idx, sec_idx, letter_idx] = groups;
    let degrees = captures.get(deg_idx)?.as_str().parse::<u32>().ok()?;
    let minutes = captures.get(min_idx)?.as_str().parse::<u32>().ok()?;
    let seconds = captures.get(sec_idx)?.as_str().parse::<f64>().ok()?;
    let hemisphere = Hemisphere::from_letter(captures.get(letter_idx)?.as_str().chars().next()?)?;
    Some(GmsCoordinate::new(degrees, minutes, seconds, hemisphere))
}
