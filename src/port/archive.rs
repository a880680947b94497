// SPDX-License-Identifier: MPL-2.0
//! Archive port definition.
//!
//! After a batch run the caller usually wants the stamped images back
//! as a single downloadable bundle. The [`Archiver`] trait abstracts
//! the container format; a ZIP adapter is the expected implementation.

use crate::error::Error;
use std::fmt;

// =============================================================================
// ArchiveError
// =============================================================================

/// Errors that can occur while building an archive.
#[derive(Debug, Clone)]
pub enum ArchiveError {
    /// An entry could not be added.
    EntryFailed { name: String, reason: String },

    /// The archive could not be finalized.
    FinalizeFailed(String),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::EntryFailed { name, reason } => {
                write!(f, "Failed to archive '{name}': {reason}")
            }
            ArchiveError::FinalizeFailed(msg) => write!(f, "Failed to finalize archive: {msg}"),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<ArchiveError> for Error {
    fn from(err: ArchiveError) -> Self {
        Error::Io(err.to_string())
    }
}

// =============================================================================
// ArchiveEntry
// =============================================================================

/// One named file destined for an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Archiver Trait
// =============================================================================

/// Port for bundling a set of files into one container.
pub trait Archiver {
    /// Builds the archive from the given entries and returns its bytes.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] if an entry cannot be added or the
    /// container cannot be finalized.
    fn archive(&mut self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError>;
}
