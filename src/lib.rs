// SPDX-License-Identifier: MPL-2.0
//! `geostamp` converts between printed GMS (degrees/minutes/seconds)
//! coordinates and embedded Exif GPS metadata, and burns human-readable
//! coordinate stamps into image pixels.
//!
//! Three end-to-end flows build on the core modules: OCR text from a
//! scanned photo becomes GPS metadata, GPS metadata becomes a visible
//! stamp, and a live capture gets both at once. OCR engines, capture
//! hardware, and archive formats stay behind the traits in [`port`].

#![doc(html_root_url = "https://docs.rs/geostamp/0.1.0")]

pub mod coord;
pub mod error;
pub mod exif;
pub mod pipeline;
pub mod port;
pub mod stamp;

pub use coord::{extract_coordinates, DecimalCoordinate, FormattedCoordinates, GmsCoordinate};
pub use error::{Error, Result};
pub use crate::exif::{read_metadata, write_gps, GpsRecord, ImageMetadata};
pub use pipeline::{embed_batch, stamp_batch, BatchItem, BatchReport, ProgressObserver};
pub use stamp::{render_stamp, StampLayout};
