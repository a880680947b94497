// SPDX-License-Identifier: MPL-2.0
//! End-to-end tests for the public API: OCR text to embedded GPS
//! metadata, metadata to a burned-in stamp, and the batch flows that
//! chain them.

use geostamp::pipeline::{self, BatchItem, NoProgress, ProgressObserver};
use geostamp::port::{ArchiveEntry, ArchiveError, Archiver, RecognitionError, TextRecognizer};
use geostamp::{
    extract_coordinates, read_metadata, render_stamp, write_gps, DecimalCoordinate, GpsRecord,
};
use image_rs::{Rgb, RgbImage};
use std::io::Cursor;

/// A real in-memory JPEG to run the codec and renderer against.
fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image_rs::ImageFormat::Jpeg)
        .expect("in-memory JPEG encoding");
    bytes
}

#[test]
fn gps_survives_a_write_read_cycle() {
    let coordinate = DecimalCoordinate::new(18.4585, -69.9559);
    let written = write_gps(&sample_jpeg(64, 48), coordinate).expect("write");
    let metadata = read_metadata(&written).expect("read back");

    let gps = metadata.gps.expect("GPS record present");
    assert!((gps.coordinate.latitude() - 18.4585).abs() < 0.0001);
    assert!((gps.coordinate.longitude() - -69.9559).abs() < 0.0001);
    assert_eq!(gps.formatted.latitude, "18° 27' 30.6\" N");
    assert_eq!(gps.formatted.longitude, "69° 57' 21.24\" W");
}

#[test]
fn printed_text_becomes_metadata_becomes_stamp() {
    // The text an OCR engine would return for a photo with a printed
    // coordinate caption.
    let text = "Sitio: 18°27'30.6\"N 69°57'21.24\"W  (levantamiento 2024)";
    let found = extract_coordinates(text).expect("caption should parse");

    let geotagged = write_gps(
        &sample_jpeg(400, 300),
        DecimalCoordinate::new(found.latitude, found.longitude),
    )
    .expect("embed");

    let metadata = read_metadata(&geotagged).expect("read");
    let gps = metadata.gps.expect("GPS present after embed");
    let stamped = render_stamp(&geotagged, &gps, metadata.timestamp.as_deref()).expect("stamp");

    let decoded = image_rs::load_from_memory(&stamped).expect("stamped output decodes");
    assert_eq!(decoded.width(), 400);
    assert_eq!(decoded.height(), 300);
}

#[test]
fn stamping_does_not_modify_the_input_buffer() {
    let original = write_gps(&sample_jpeg(200, 200), DecimalCoordinate::new(1.5, 2.5)).unwrap();
    let snapshot = original.clone();
    let gps = read_metadata(&original).unwrap().gps.unwrap();
    let _ = render_stamp(&original, &gps, None).unwrap();
    assert_eq!(original, snapshot);
}

struct CaptionRecognizer;

impl TextRecognizer for CaptionRecognizer {
    fn recognize(
        &mut self,
        image: &[u8],
        progress: &mut dyn FnMut(u8),
    ) -> Result<String, RecognitionError> {
        progress(100);
        if image.is_empty() {
            return Err(RecognitionError::InvalidImage("empty input".to_string()));
        }
        Ok("33 52 7.68 S 151 12 33.48 E".to_string())
    }
}

#[derive(Default)]
struct ProgressLog {
    batch: Vec<(usize, usize)>,
}

impl ProgressObserver for ProgressLog {
    fn batch_progress(&mut self, current: usize, total: usize) {
        self.batch.push((current, total));
    }
}

#[test]
fn batch_embeds_stamps_and_archives_with_one_failure() {
    let jpeg = sample_jpeg(300, 240);
    let items = vec![
        BatchItem::new("uno.jpg", jpeg.clone()),
        BatchItem::new("roto.jpg", Vec::new()),
        BatchItem::new("tres.jpg", jpeg),
    ];

    let mut log = ProgressLog::default();
    let embedded = pipeline::embed_batch(&mut CaptionRecognizer, &items, &mut log);
    assert_eq!(embedded.total, 3);
    assert_eq!(embedded.succeeded, 2);
    assert_eq!(log.batch, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(embedded.outcomes[1].name, "roto.jpg");
    assert!(embedded.outcomes[1].error.is_some());

    // Feed the successful outputs forward into the stamping batch.
    let stamp_items: Vec<BatchItem> = embedded
        .outcomes
        .iter()
        .filter(|o| o.succeeded())
        .map(|o| BatchItem::new(o.name.clone(), o.output.clone().unwrap()))
        .collect();
    let stamped = pipeline::stamp_batch(&stamp_items, &mut NoProgress);
    assert_eq!(stamped.succeeded, 2);

    struct NameCollector(Vec<String>);
    impl Archiver for NameCollector {
        fn archive(&mut self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
            self.0 = entries.iter().map(|e| e.name.clone()).collect();
            Ok(Vec::new())
        }
    }

    let mut collector = NameCollector(Vec::new());
    pipeline::archive_stamped(&stamped, &mut collector).unwrap();
    assert_eq!(collector.0, vec!["uno_STAMPED.jpg", "tres_STAMPED.jpg"]);
}

#[test]
fn southern_and_eastern_hemispheres_round_trip() {
    let written = write_gps(
        &sample_jpeg(64, 48),
        DecimalCoordinate::new(-33.8688, 151.2093),
    )
    .unwrap();
    let gps = read_metadata(&written).unwrap().gps.unwrap();
    assert!(gps.formatted.latitude.ends_with('S'));
    assert!(gps.formatted.longitude.ends_with('E'));
    assert!((gps.coordinate.latitude() - -33.8688).abs() < 0.0001);
}

#[test]
fn stamped_file_written_to_disk_reads_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let gps = GpsRecord::new(DecimalCoordinate::new(40.4168, -3.7038), Some(657.0), None);
    let stamped = render_stamp(&sample_jpeg(360, 360), &gps, Some("2025:05:17 10:45:00"))
        .expect("stamp");

    let path = dir.path().join("madrid_STAMPED.jpg");
    std::fs::write(&path, &stamped).expect("write to disk");
    let reread = std::fs::read(&path).expect("read from disk");
    assert!(image_rs::load_from_memory(&reread).is_ok());
}
