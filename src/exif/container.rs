// SPDX-License-Identifier: MPL-2.0
//! The in-memory model of an Exif container: four independent tag
//! groups, each mapping tag identifiers to typed values.
//!
//! Only the GPS group and the minimal date/time tags are interpreted;
//! everything else is carried opaquely so a write does not disturb tags
//! it does not understand.

use crate::coord::{Axis, DecimalCoordinate, GmsCoordinate, Rational};
use crate::error::{Error, Result};
use exif::experimental::Writer;
use exif::{Context, Field, In, Tag, Value};
use std::io::Cursor;

// =============================================================================
// TagValue
// =============================================================================

/// A decoded Exif tag value.
///
/// The container only needs strings, integers, and ordered rational
/// lists to do its job; the remaining variants exist so unrelated tags
/// survive a read/modify/write cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Byte(Vec<u8>),
    Ascii(Vec<String>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<Rational>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<(i32, i32)>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl TagValue {
    /// Converts a parsed library value. Returns `None` for values that
    /// cannot be carried (unknown types whose bytes are not available).
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Byte(v) => Some(TagValue::Byte(v.clone())),
            Value::Ascii(v) => Some(TagValue::Ascii(
                v.iter()
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .collect(),
            )),
            Value::Short(v) => Some(TagValue::Short(v.clone())),
            Value::Long(v) => Some(TagValue::Long(v.clone())),
            Value::Rational(v) => Some(TagValue::Rational(
                v.iter().map(|r| Rational::new(r.num, r.denom)).collect(),
            )),
            Value::SByte(v) => Some(TagValue::SByte(v.clone())),
            Value::Undefined(v, _) => Some(TagValue::Undefined(v.clone())),
            Value::SShort(v) => Some(TagValue::SShort(v.clone())),
            Value::SLong(v) => Some(TagValue::SLong(v.clone())),
            Value::SRational(v) => Some(TagValue::SRational(
                v.iter().map(|r| (r.num, r.denom)).collect(),
            )),
            Value::Float(v) => Some(TagValue::Float(v.clone())),
            Value::Double(v) => Some(TagValue::Double(v.clone())),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            TagValue::Byte(v) => Value::Byte(v.clone()),
            TagValue::Ascii(v) => {
                Value::Ascii(v.iter().map(|s| s.as_bytes().to_vec()).collect())
            }
            TagValue::Short(v) => Value::Short(v.clone()),
            TagValue::Long(v) => Value::Long(v.clone()),
            TagValue::Rational(v) => Value::Rational(
                v.iter()
                    .map(|r| exif::Rational {
                        num: r.num,
                        denom: r.denom,
                    })
                    .collect(),
            ),
            TagValue::SByte(v) => Value::SByte(v.clone()),
            TagValue::Undefined(v) => Value::Undefined(v.clone(), 0),
            TagValue::SShort(v) => Value::SShort(v.clone()),
            TagValue::SLong(v) => Value::SLong(v.clone()),
            TagValue::SRational(v) => Value::SRational(
                v.iter()
                    .map(|&(num, denom)| exif::SRational { num, denom })
                    .collect(),
            ),
            TagValue::Float(v) => Value::Float(v.clone()),
            TagValue::Double(v) => Value::Double(v.clone()),
        }
    }

    /// First string of an ASCII value, if that is what this is.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Ascii(v) => v.first().map(String::as_str),
            _ => None,
        }
    }
}

/// Tolerantly decodes one component of a tag value as a float.
///
/// Accepts a rational, any raw numeric type, or an absent value; a
/// zero/absent denominator or an unrecognized type decodes to `0.0`
/// rather than an error. Malformed individual tag values must never
/// abort extraction of the rest of the record.
#[must_use]
pub fn decode_rational(value: Option<&TagValue>, index: usize) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    match value {
        TagValue::Rational(v) => v.get(index).map_or(0.0, |r| r.to_f64()),
        TagValue::SRational(v) => v.get(index).map_or(0.0, |&(num, denom)| {
            if denom == 0 {
                0.0
            } else {
                f64::from(num) / f64::from(denom)
            }
        }),
        TagValue::Byte(v) => v.get(index).map_or(0.0, |&n| f64::from(n)),
        TagValue::Short(v) => v.get(index).map_or(0.0, |&n| f64::from(n)),
        TagValue::Long(v) => v.get(index).map_or(0.0, |&n| f64::from(n)),
        TagValue::SLong(v) => v.get(index).map_or(0.0, |&n| f64::from(n)),
        TagValue::Float(v) => v.get(index).map_or(0.0, |&n| f64::from(n)),
        TagValue::Double(v) => v.get(index).copied().unwrap_or(0.0),
        _ => 0.0,
    }
}

// =============================================================================
// MetadataContainer
// =============================================================================

/// The four tag groups of the baseline Exif layout.
///
/// Absence of the GPS group, or of any required GPS tag, means "no GPS
/// data"; it is never an error. A container synthesized from an image
/// with no Exif segment simply has all four groups empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataContainer {
    /// 0th IFD: primary-image tags.
    primary: Vec<(Tag, TagValue)>,
    /// Exif IFD: capture tags, including the original-capture timestamp.
    capture: Vec<(Tag, TagValue)>,
    /// GPS IFD.
    gps: Vec<(Tag, TagValue)>,
    /// 1st IFD: thumbnail tags.
    thumbnail: Vec<(Tag, TagValue)>,
}

impl MetadataContainer {
    /// Parses a raw Exif (TIFF) blob into the four groups.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputUnreadable`] when the blob is not parseable
    /// Exif at all.
    pub fn from_raw(raw: Vec<u8>) -> Result<Self> {
        let parsed = exif::Reader::new()
            .read_raw(raw)
            .map_err(|e| Error::InputUnreadable(format!("Exif data did not parse: {e}")))?;

        let mut container = Self::default();
        for field in parsed.fields() {
            let Some(value) = TagValue::from_value(&field.value) else {
                eprintln!("[WARN] Dropping Exif tag {} with uncarryable value", field.tag);
                continue;
            };
            let group = if field.ifd_num == In::THUMBNAIL {
                &mut container.thumbnail
            } else {
                match field.tag.0 {
                    Context::Gps => &mut container.gps,
                    Context::Exif => &mut container.capture,
                    Context::Tiff => &mut container.primary,
                    // Interoperability tags are outside the modeled groups.
                    _ => continue,
                }
            };
            group.push((field.tag, value));
        }
        Ok(container)
    }

    /// Serializes the groups back into a raw Exif (TIFF) blob.
    ///
    /// Thumbnail offset tags are not re-emitted; their byte offsets are
    /// only meaningful inside the blob they were read from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MetadataWrite`] when the encoder rejects the
    /// field set.
    pub fn to_raw(&self) -> Result<Vec<u8>> {
        let fields: Vec<Field> = self
            .iter_with_ifd()
            .filter(|(tag, _, _)| {
                *tag != Tag::JPEGInterchangeFormat && *tag != Tag::JPEGInterchangeFormatLength
            })
            .map(|(tag, ifd_num, value)| Field {
                tag,
                ifd_num,
                value: value.to_value(),
            })
            .collect();

        let mut writer = Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut cursor = Cursor::new(Vec::new());
        writer
            .write(&mut cursor, false)
            .map_err(|e| Error::MetadataWrite(format!("Exif encoding failed: {e}")))?;
        Ok(cursor.into_inner())
    }

    fn iter_with_ifd(&self) -> impl Iterator<Item = (Tag, In, &TagValue)> {
        let primary = self.primary.iter().map(|(t, v)| (*t, In::PRIMARY, v));
        let capture = self.capture.iter().map(|(t, v)| (*t, In::PRIMARY, v));
        let gps = self.gps.iter().map(|(t, v)| (*t, In::PRIMARY, v));
        let thumbnail = self.thumbnail.iter().map(|(t, v)| (*t, In::THUMBNAIL, v));
        primary.chain(capture).chain(gps).chain(thumbnail)
    }

    /// Looks up a tag in the GPS group.
    #[must_use]
    pub fn gps_tag(&self, tag: Tag) -> Option<&TagValue> {
        Self::get(&self.gps, tag)
    }

    /// Looks up a tag in the capture (Exif IFD) group.
    #[must_use]
    pub fn capture_tag(&self, tag: Tag) -> Option<&TagValue> {
        Self::get(&self.capture, tag)
    }

    /// Looks up a tag in the primary-image (0th IFD) group.
    #[must_use]
    pub fn primary_tag(&self, tag: Tag) -> Option<&TagValue> {
        Self::get(&self.primary, tag)
    }

    /// Returns whether the GPS group holds no tags at all.
    #[must_use]
    pub fn has_gps_group(&self) -> bool {
        !self.gps.is_empty()
    }

    fn get(group: &[(Tag, TagValue)], tag: Tag) -> Option<&TagValue> {
        group.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }

    fn set(group: &mut Vec<(Tag, TagValue)>, tag: Tag, value: TagValue) {
        if let Some(entry) = group.iter_mut().find(|(t, _)| *t == tag) {
            entry.1 = value;
        } else {
            group.push((tag, value));
        }
    }

    /// Sets the GPS tag group to the given position.
    ///
    /// Hemisphere refs derive from the sign of each axis; a coordinate
    /// of exactly 0.0 still encodes a definite ref (N/E by the >= 0
    /// convention). The GPS version marker is always written.
    pub fn set_gps_coordinate(&mut self, coordinate: DecimalCoordinate) {
        let lat = GmsCoordinate::from_decimal(coordinate.latitude(), Axis::Latitude);
        let lng = GmsCoordinate::from_decimal(coordinate.longitude(), Axis::Longitude);

        Self::set(
            &mut self.gps,
            Tag::GPSVersionID,
            TagValue::Byte(vec![2, 3, 0, 0]),
        );
        Self::set(
            &mut self.gps,
            Tag::GPSLatitudeRef,
            TagValue::Ascii(vec![lat.hemisphere.letter().to_string()]),
        );
        Self::set(
            &mut self.gps,
            Tag::GPSLatitude,
            TagValue::Rational(lat.to_rational_triplet().to_vec()),
        );
        Self::set(
            &mut self.gps,
            Tag::GPSLongitudeRef,
            TagValue::Ascii(vec![lng.hemisphere.letter().to_string()]),
        );
        Self::set(
            &mut self.gps,
            Tag::GPSLongitude,
            TagValue::Rational(lng.to_rational_triplet().to_vec()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rational_handles_zero_denominator() {
        let value = TagValue::Rational(vec![Rational::new(10, 0)]);
        assert_eq!(decode_rational(Some(&value), 0), 0.0);
    }

    #[test]
    fn decode_rational_handles_absent_value_and_index() {
        assert_eq!(decode_rational(None, 0), 0.0);
        let value = TagValue::Rational(vec![Rational::new(18, 1)]);
        assert_eq!(decode_rational(Some(&value), 5), 0.0);
    }

    #[test]
    fn decode_rational_accepts_raw_numbers() {
        assert_eq!(decode_rational(Some(&TagValue::Short(vec![42])), 0), 42.0);
        assert_eq!(decode_rational(Some(&TagValue::Long(vec![7, 9])), 1), 9.0);
        assert_eq!(decode_rational(Some(&TagValue::Double(vec![1.5])), 0), 1.5);
    }

    #[test]
    fn decode_rational_rejects_unrecognized_type_as_zero() {
        let value = TagValue::Undefined(vec![1, 2, 3]);
        assert_eq!(decode_rational(Some(&value), 0), 0.0);
    }

    #[test]
    fn set_gps_coordinate_writes_refs_and_version() {
        let mut container = MetadataContainer::default();
        container.set_gps_coordinate(DecimalCoordinate::new(18.4585, -69.9559));

        assert_eq!(
            container.gps_tag(Tag::GPSLatitudeRef).and_then(TagValue::as_str),
            Some("N")
        );
        assert_eq!(
            container.gps_tag(Tag::GPSLongitudeRef).and_then(TagValue::as_str),
            Some("W")
        );
        assert_eq!(
            container.gps_tag(Tag::GPSVersionID),
            Some(&TagValue::Byte(vec![2, 3, 0, 0]))
        );
        let lat = container.gps_tag(Tag::GPSLatitude).expect("latitude triplet");
        assert!((decode_rational(Some(lat), 0) - 18.0).abs() < f64::EPSILON);
        assert!((decode_rational(Some(lat), 1) - 27.0).abs() < f64::EPSILON);
        assert!((decode_rational(Some(lat), 2) - 30.6).abs() < 0.011);
    }

    #[test]
    fn zero_coordinate_still_encodes_refs() {
        let mut container = MetadataContainer::default();
        container.set_gps_coordinate(DecimalCoordinate::new(0.0, 0.0));
        assert_eq!(
            container.gps_tag(Tag::GPSLatitudeRef).and_then(TagValue::as_str),
            Some("N")
        );
        assert_eq!(
            container.gps_tag(Tag::GPSLongitudeRef).and_then(TagValue::as_str),
            Some("E")
        );
    }

    #[test]
    fn setting_gps_twice_overwrites_in_place() {
        let mut container = MetadataContainer::default();
        container.set_gps_coordinate(DecimalCoordinate::new(10.0, 20.0));
        container.set_gps_coordinate(DecimalCoordinate::new(-10.0, -20.0));
        assert_eq!(
            container.gps_tag(Tag::GPSLatitudeRef).and_then(TagValue::as_str),
            Some("S")
        );
        // No duplicate tags accumulate.
        let raw = container.to_raw().expect("container should encode");
        let reparsed = MetadataContainer::from_raw(raw).expect("round trip");
        assert_eq!(
            reparsed.gps_tag(Tag::GPSLatitudeRef).and_then(TagValue::as_str),
            Some("S")
        );
    }

    #[test]
    fn raw_round_trip_preserves_gps_group() {
        let mut container = MetadataContainer::default();
        container.set_gps_coordinate(DecimalCoordinate::new(18.4585, -69.9559));
        let raw = container.to_raw().expect("encode");
        let reparsed = MetadataContainer::from_raw(raw).expect("parse back");

        let lat = reparsed.gps_tag(Tag::GPSLatitude).expect("latitude survives");
        let decimal = decode_rational(Some(lat), 0)
            + decode_rational(Some(lat), 1) / 60.0
            + decode_rational(Some(lat), 2) / 3600.0;
        assert!((decimal - 18.4585).abs() < 0.0001);
    }

    #[test]
    fn garbage_blob_is_unreadable() {
        let result = MetadataContainer::from_raw(b"not tiff at all".to_vec());
        assert!(matches!(result, Err(Error::InputUnreadable(_))));
    }
}
