// SPDX-License-Identifier: MPL-2.0
//! Batch orchestration.
//!
//! Ties the other modules together into the three end-to-end flows:
//! embedding GPS metadata into scanned photos via OCR, stamping images
//! that already carry GPS metadata, and geotagging a freshly captured
//! frame. Batches run sequentially; a failing item is recorded and the
//! run continues with its siblings.

use crate::coord::{extract_coordinates, DecimalCoordinate};
use crate::error::{Error, Result};
use crate::exif::{read_metadata, write_gps, GpsRecord};
use crate::port::{ArchiveEntry, Archiver, FrameSource, HeadingSensor, PositionProvider, TextRecognizer};
use crate::stamp::render_stamp;
use serde::Serialize;

// =============================================================================
// Batch types
// =============================================================================

/// One input image, named so results and archive entries can refer
/// back to it.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl BatchItem {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// The result of processing one batch item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub name: String,
    /// The produced image bytes on success. Skipped when serializing a
    /// report; reports describe the run, not the payloads.
    #[serde(skip)]
    pub output: Option<Vec<u8>>,
    pub error: Option<String>,
}

impl ItemOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a whole batch run, outcomes in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
    pub succeeded: usize,
    pub total: usize,
}

// =============================================================================
// Progress
// =============================================================================

/// Observer for batch progress. Both notifications default to no-ops
/// so callers implement only what their UI shows.
pub trait ProgressObserver {
    /// Progress of the current item, 0 to 100. Values never go
    /// backwards within one item.
    fn item_progress(&mut self, _name: &str, _percent: u8) {}

    /// Called after each item completes, with `current` counting from 1.
    fn batch_progress(&mut self, _current: usize, _total: usize) {}
}

/// Observer that discards all notifications.
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

// =============================================================================
// Batch flows
// =============================================================================

/// Runs OCR over each scanned photo, extracts the printed GMS
/// coordinates, and embeds them as GPS metadata.
///
/// An item with no recognizable coordinates fails with
/// [`Error::NoCoordinateFound`]; the rest of the batch still runs.
pub fn embed_batch(
    recognizer: &mut dyn TextRecognizer,
    items: &[BatchItem],
    observer: &mut dyn ProgressObserver,
) -> BatchReport {
    run_batch(items, observer, |item, observer| {
        let text = recognizer.recognize(&item.bytes, &mut |percent| {
            observer.item_progress(&item.name, percent);
        })?;
        let found = extract_coordinates(&text).ok_or(Error::NoCoordinateFound)?;
        write_gps(
            &item.bytes,
            DecimalCoordinate::new(found.latitude, found.longitude),
        )
    })
}

/// Burns a coordinate stamp into each image that carries GPS metadata.
///
/// An item without GPS metadata fails with [`Error::NoCoordinateFound`].
pub fn stamp_batch(items: &[BatchItem], observer: &mut dyn ProgressObserver) -> BatchReport {
    run_batch(items, observer, |item, _observer| {
        let metadata = read_metadata(&item.bytes)?;
        let gps = metadata.gps.ok_or(Error::NoCoordinateFound)?;
        render_stamp(&item.bytes, &gps, metadata.timestamp.as_deref())
    })
}

fn run_batch<F>(items: &[BatchItem], observer: &mut dyn ProgressObserver, mut process: F) -> BatchReport
where
    F: FnMut(&BatchItem, &mut dyn ProgressObserver) -> Result<Vec<u8>>,
{
    let total = items.len();
    let mut outcomes = Vec::with_capacity(total);
    let mut succeeded = 0;

    for (index, item) in items.iter().enumerate() {
        let outcome = match process(item, &mut *observer) {
            Ok(output) => {
                succeeded += 1;
                ItemOutcome {
                    name: item.name.clone(),
                    output: Some(output),
                    error: None,
                }
            }
            Err(err) => {
                eprintln!("[WARN] Batch item '{}' failed: {err}", item.name);
                ItemOutcome {
                    name: item.name.clone(),
                    output: None,
                    error: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);
        observer.batch_progress(index + 1, total);
    }

    BatchReport {
        outcomes,
        succeeded,
        total,
    }
}

// =============================================================================
// Live capture
// =============================================================================

/// Captures one frame, geotags it with the current position, and burns
/// a stamp with the current local time.
///
/// The heading comes from the position fix when the receiver reports
/// one; otherwise the compass is consulted, and a dead compass simply
/// leaves the bearing off the stamp.
///
/// # Errors
///
/// Returns [`Error::DeviceUnavailable`] when the camera or the position
/// provider fails; stamping errors propagate as [`Error::Render`].
pub fn capture_and_stamp(
    camera: &mut dyn FrameSource,
    position: &mut dyn PositionProvider,
    compass: Option<&mut dyn HeadingSensor>,
) -> Result<Vec<u8>> {
    let frame = camera.capture_frame()?;
    let fix = position.current_position()?;

    let bearing = match fix.heading {
        Some(heading) => Some(heading.rem_euclid(360.0)),
        None => compass
            .and_then(|sensor| sensor.current_heading().ok())
            .map(|heading| heading.rem_euclid(360.0)),
    };

    let coordinate = DecimalCoordinate::new(fix.latitude, fix.longitude);
    let geotagged = write_gps(&frame, coordinate)?;
    let record = GpsRecord::new(coordinate, fix.altitude, bearing);
    render_stamp(&geotagged, &record, None)
}

// =============================================================================
// Archive handoff
// =============================================================================

/// Collects the successful outputs of a report as archive entries,
/// renaming each `photo.jpg` to `photo_STAMPED.jpg`.
#[must_use]
pub fn stamped_entries(report: &BatchReport) -> Vec<ArchiveEntry> {
    report
        .outcomes
        .iter()
        .filter_map(|outcome| {
            outcome.output.as_ref().map(|bytes| ArchiveEntry {
                name: stamped_name(&outcome.name),
                bytes: bytes.clone(),
            })
        })
        .collect()
}

/// Bundles the successful outputs of a report into one archive.
///
/// # Errors
///
/// Propagates the archiver's failure as [`Error::Io`].
pub fn archive_stamped(report: &BatchReport, archiver: &mut dyn Archiver) -> Result<Vec<u8>> {
    let entries = stamped_entries(report);
    Ok(archiver.archive(&entries)?)
}

fn stamped_name(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };
    format!("{stem}_STAMPED.jpg")
}
