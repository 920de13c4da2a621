//! Per-file outcome records and the batch accumulator.

use std::path::{Path, PathBuf};

use romtrim_core::{RiskAssessment, RomFormat};
use serde::Serialize;

use crate::error::TrimError;

/// How processing of a single file ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Trimmed file written to disk.
    Trimmed,
    /// Trim validated and reported, nothing written (analyze-only mode).
    Analyzed,
    /// Trim validated and simulated, nothing written (dry-run mode).
    Simulated,
    /// No trailing padding; file left as is.
    NoPadding,
    /// Format not recognized; skipped.
    Unsupported,
    ValidationFailed,
    Failed,
}

impl OutcomeStatus {
    /// Counts toward the batch failure limit.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::ValidationFailed | Self::Failed)
    }

    /// A trim was performed or would have been.
    pub fn has_savings(self) -> bool {
        matches!(self, Self::Trimmed | Self::Analyzed | Self::Simulated)
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Trimmed => "trimmed",
            Self::Analyzed => "analyzed",
            Self::Simulated => "simulated",
            Self::NoPadding => "no trimming needed",
            Self::Unsupported => "unsupported format",
            Self::ValidationFailed => "validation failed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything recorded about one processed file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: OutcomeStatus,
    pub format: RomFormat,
    pub original_size: u64,
    /// Size after trimming, or the size a trim would produce.
    pub trimmed_size: u64,
    pub saved_ratio: f64,
    /// True only when the trimmed file was actually written.
    pub trimmed: bool,
    pub confidence: Option<f64>,
    pub risk: Option<RiskAssessment>,
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub patch_path: Option<PathBuf>,
    pub duration_ms: u64,
}

impl FileOutcome {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            status: OutcomeStatus::NoPadding,
            format: RomFormat::Unknown,
            original_size: 0,
            trimmed_size: 0,
            saved_ratio: 0.0,
            trimmed: false,
            confidence: None,
            risk: None,
            error: None,
            warnings: Vec::new(),
            patch_path: None,
            duration_ms: 0,
        }
    }

    /// Outcome for a file whose processing could not even start.
    pub fn failed(path: &Path, error: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            error: Some(error.into()),
            ..Self::new(path)
        }
    }

    /// Record an error, picking the status from its kind.
    pub fn set_error(&mut self, err: &TrimError) {
        self.status = match err {
            TrimError::UnsupportedFormat => OutcomeStatus::Unsupported,
            TrimError::ValidationFailed(_) => OutcomeStatus::ValidationFailed,
            _ => OutcomeStatus::Failed,
        };
        self.error = Some(err.to_string());
    }

    pub fn set_trim_size(&mut self, trimmed_size: u64) {
        self.trimmed_size = trimmed_size;
        self.saved_ratio = if self.original_size == 0 {
            0.0
        } else {
            1.0 - trimmed_size as f64 / self.original_size as f64
        };
    }

    pub fn bytes_saved(&self) -> u64 {
        self.original_size.saturating_sub(self.trimmed_size)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Running totals for a batch. Outcomes are folded in one at a time by the
/// single consumer of the results channel.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub trimmed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub bytes_saved: u64,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: FileOutcome) {
        self.processed += 1;
        if outcome.status.is_failure() {
            self.failed += 1;
        } else if outcome.status == OutcomeStatus::Unsupported {
            self.skipped += 1;
        } else if outcome.status.has_savings() {
            self.trimmed += 1;
            self.bytes_saved += outcome.bytes_saved();
        }
        self.outcomes.push(outcome);
    }

    /// Average bytes saved per trimmed file.
    pub fn average_saved(&self) -> Option<u64> {
        (self.trimmed > 0).then(|| self.bytes_saved / self.trimmed as u64)
    }

    /// Sort outcomes by path; parallel batches record them as they finish.
    pub fn sort_outcomes(&mut self) {
        self.outcomes.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: OutcomeStatus, original: u64, trimmed: u64) -> FileOutcome {
        let mut o = FileOutcome::new(Path::new("game.gba"));
        o.status = status;
        o.original_size = original;
        o.set_trim_size(trimmed);
        o
    }

    #[test]
    fn record_counts_by_status() {
        let mut summary = BatchSummary::new();
        summary.record(outcome(OutcomeStatus::Trimmed, 1000, 600));
        summary.record(outcome(OutcomeStatus::Simulated, 1000, 800));
        summary.record(outcome(OutcomeStatus::NoPadding, 1000, 1000));
        summary.record(outcome(OutcomeStatus::Unsupported, 1000, 1000));
        summary.record(outcome(OutcomeStatus::ValidationFailed, 1000, 1000));
        summary.record(FileOutcome::failed(Path::new("x.gba"), "boom"));

        assert_eq!(summary.processed, 6);
        assert_eq!(summary.trimmed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.bytes_saved, 600);
        assert_eq!(summary.average_saved(), Some(300));
    }

    #[test]
    fn no_trims_has_no_average() {
        assert_eq!(BatchSummary::new().average_saved(), None);
    }

    #[test]
    fn saved_ratio_from_sizes() {
        let o = outcome(OutcomeStatus::Trimmed, 1000, 250);
        assert!((o.saved_ratio - 0.75).abs() < 1e-9);
        assert_eq!(o.bytes_saved(), 750);
    }

    #[test]
    fn error_kind_sets_status() {
        let mut o = FileOutcome::new(Path::new("a.gb"));
        o.set_error(&TrimError::UnsupportedFormat);
        assert_eq!(o.status, OutcomeStatus::Unsupported);
        o.set_error(&TrimError::ValidationFailed(vec!["too small".into()]));
        assert_eq!(o.status, OutcomeStatus::ValidationFailed);
        assert!(o.error.as_deref().unwrap().contains("too small"));
    }
}
