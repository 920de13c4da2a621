use std::path::PathBuf;

use romtrim_core::PatchError;
use thiserror::Error;

use crate::outcome::BatchSummary;

/// Errors that can occur while trimming a single file.
///
/// The batch driver turns these into [`FileOutcome`](crate::FileOutcome)
/// records; none of them stop a batch on their own.
#[derive(Debug, Error)]
pub enum TrimError {
    /// I/O error while reading or writing the ROM
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    /// Format detection found nothing it knows how to validate
    #[error("Unsupported ROM format")]
    UnsupportedFormat,

    /// One or more safety rules rejected the trim
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// The written file does not have the expected length
    #[error("Write integrity check failed: expected {expected} bytes, found {actual}")]
    WriteIntegrity { expected: u64, actual: u64 },

    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Backup failed: {0}")]
    Backup(String),

    #[error("Patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl TrimError {
    pub fn backup(msg: impl Into<String>) -> Self {
        Self::Backup(msg.into())
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

/// Returned by the batch drivers once too many files have failed.
///
/// Carries everything recorded up to that point, including files that were
/// already in flight when the batch stopped.
#[derive(Debug, Error)]
#[error("Batch aborted after {failures} failed files")]
pub struct BatchAborted {
    pub failures: usize,
    pub summary: BatchSummary,
}
