// SPDX-License-Identifier: MPL-2.0
//! JPEG segment handling: locating, extracting, and splicing the APP1
//! Exif segment without touching scan data or any other segment.

use crate::error::{Error, Result};

/// Exif identifier at the start of the APP1 payload.
const EXIF_MARKER: &[u8] = b"Exif\0\0";

/// Returns whether the bytes start with a JPEG SOI marker.
#[must_use]
pub fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

/// Extracts the raw Exif (TIFF) payload from a JPEG, if present.
///
/// Returns `Ok(None)` for a well-formed JPEG without an Exif segment;
/// most images carry no GPS metadata and that is not an error.
///
/// # Errors
///
/// Returns [`Error::InputUnreadable`] when the bytes are not a JPEG or
/// the marker structure is invalid.
pub fn extract_exif_payload(data: &[u8]) -> Result<Option<Vec<u8>>> {
    let segment = find_exif_segment(data)?;
    Ok(segment.map(|(start, end)| data[start + 4 + EXIF_MARKER.len()..end].to_vec()))
}

/// Produces a new JPEG byte buffer with `raw_exif` as its APP1 Exif
/// segment, replacing an existing one or inserting directly after SOI.
/// The input buffer is never modified.
///
/// # Errors
///
/// Returns [`Error::MetadataWrite`] when the bytes are not a JPEG, the
/// structure is invalid, or the payload exceeds the APP1 size limit.
pub fn splice_exif_segment(data: &[u8], raw_exif: &[u8]) -> Result<Vec<u8>> {
    let existing = find_exif_segment(data)
        .map_err(|e| Error::MetadataWrite(format!("cannot embed metadata: {e}")))?;
    let segment = build_exif_segment(raw_exif)?;

    let new_data = if let Some((start, end)) = existing {
        let mut out = Vec::with_capacity(data.len() - (end - start) + segment.len());
        out.extend_from_slice(&data[..start]);
        out.extend_from_slice(&segment);
        out.extend_from_slice(&data[end..]);
        out
    } else {
        // Exif conventionally sits first, directly after SOI.
        let mut out = Vec::with_capacity(data.len() + segment.len());
        out.extend_from_slice(&data[..2]);
        out.extend_from_slice(&segment);
        out.extend_from_slice(&data[2..]);
        out
    };
    Ok(new_data)
}

/// Walks the marker stream looking for an APP1 segment carrying the
/// Exif identifier. Returns the segment range `start..end` (marker byte
/// through end of payload) when found.
fn find_exif_segment(data: &[u8]) -> Result<Option<(usize, usize)>> {
    if !is_jpeg(data) {
        return Err(Error::InputUnreadable("not a JPEG".to_string()));
    }

    let mut pos = 2; // Skip SOI (0xFF 0xD8)
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return Err(Error::InputUnreadable("invalid JPEG structure".to_string()));
        }

        let marker_type = data[pos + 1];
        match marker_type {
            0xD9 => break, // EOI - end of image
            0xD8 | 0x00 => {
                pos += 2;
                continue; // Embedded SOI / stuffed byte
            }
            _ if (0xD0..=0xD7).contains(&marker_type) => {
                // RST markers have no length
                pos += 2;
                continue;
            }
            0xDA => break, // SOS - start of scan data, stop searching
            _ => {
                let segment_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                let segment_end = pos + 2 + segment_len;
                if segment_len < 2 || segment_end > data.len() {
                    return Err(Error::InputUnreadable(
                        "truncated JPEG segment".to_string(),
                    ));
                }

                if marker_type == 0xE1 {
                    let payload_start = pos + 4;
                    if payload_start + EXIF_MARKER.len() <= segment_end
                        && &data[payload_start..payload_start + EXIF_MARKER.len()] == EXIF_MARKER
                    {
                        return Ok(Some((pos, segment_end)));
                    }
                }

                pos = segment_end;
            }
        }
    }
    Ok(None)
}

/// Builds an APP1 Exif segment: FF E1 + length + Exif marker + payload.
fn build_exif_segment(raw_exif: &[u8]) -> Result<Vec<u8>> {
    // Length covers the 2 length bytes + marker + payload.
    let total_len = 2 + EXIF_MARKER.len() + raw_exif.len();
    if total_len > 0xFFFF {
        return Err(Error::MetadataWrite(
            "Exif data too large for JPEG APP1 segment".to_string(),
        ));
    }

    let mut segment = Vec::with_capacity(2 + total_len);
    segment.push(0xFF);
    segment.push(0xE1);
    segment.extend_from_slice(&(total_len as u16).to_be_bytes());
    segment.extend_from_slice(EXIF_MARKER);
    segment.extend_from_slice(raw_exif);
    Ok(segment)
}
