// SPDX-License-Identifier: MPL-2.0
//! Ports to the outside world.
//!
//! The library does not talk to an OCR engine, camera hardware, or an
//! archive format directly. Each of those concerns is a trait defined
//! here; callers plug in adapters (a Tesseract binding, a platform
//! camera API, a ZIP writer) behind them.

pub mod archive;
pub mod device;
pub mod recognizer;

pub use archive::{ArchiveEntry, ArchiveError, Archiver};
pub use device::{DeviceError, FrameSource, HeadingSensor, PositionFix, PositionProvider};
pub use recognizer::{RecognitionError, TextRecognizer};
