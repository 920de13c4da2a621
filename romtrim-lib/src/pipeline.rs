//! Single-file trim pipeline.
//!
//! A file moves through `Detecting -> Analyzing -> Validating`, then one of
//! `Reporting`, `Simulating` or `Writing` depending on the mode, and ends in
//! `Done` or `Aborted`. [`plan_trim`] runs the in-memory stages;
//! [`process_file`] adds reading, backup, patch and write.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use romtrim_core::patch::PATCH_EXTENSION;
use romtrim_core::util::format_bytes_approx;
use romtrim_core::{
    PaddingReport, RestorationPatch, RiskAssessment, RomFormat, analyze, assess_risk,
    auto_detect_padding, detect, validate,
};

use crate::error::TrimError;
use crate::options::{TrimMode, TrimOptions};
use crate::outcome::{FileOutcome, OutcomeStatus};

/// Files larger than this are refused before reading.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Pipeline stages, logged at debug level as a file moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimStage {
    Detecting,
    Analyzing,
    Validating,
    Reporting,
    Simulating,
    Writing,
    Done,
    Aborted,
}

impl std::fmt::Display for TrimStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Detecting => "detecting",
            Self::Analyzing => "analyzing",
            Self::Validating => "validating",
            Self::Reporting => "reporting",
            Self::Simulating => "simulating",
            Self::Writing => "writing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What [`plan_trim`] decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Format not recognized.
    Unsupported,
    /// Nothing to remove.
    NoPadding,
    /// Validation failed and the trim was not forced.
    Rejected { errors: Vec<String> },
    /// Safe (or forced) to cut at `trim_point`.
    Trim { trim_point: usize },
}

/// Result of running the in-memory stages over a buffer.
#[derive(Debug, Clone)]
pub struct TrimPlan {
    pub format: RomFormat,
    pub padding_byte: Option<u8>,
    pub report: Option<PaddingReport>,
    pub risk: Option<RiskAssessment>,
    pub warnings: Vec<String>,
    pub verdict: Verdict,
}

impl TrimPlan {
    fn stopped(format: RomFormat, verdict: Verdict) -> Self {
        Self {
            format,
            padding_byte: None,
            report: None,
            risk: None,
            warnings: Vec::new(),
            verdict,
        }
    }

    pub fn trim_point(&self) -> Option<usize> {
        match self.verdict {
            Verdict::Trim { trim_point } => Some(trim_point),
            _ => None,
        }
    }
}

fn enter(name: &str, stage: TrimStage) {
    log::debug!("{}: {}", name, stage);
}

/// Detect, analyze and validate a buffer without touching the filesystem.
pub fn plan_trim(data: &[u8], options: &TrimOptions) -> TrimPlan {
    plan_named(data, options, "<buffer>")
}

fn plan_named(data: &[u8], options: &TrimOptions, name: &str) -> TrimPlan {
    enter(name, TrimStage::Detecting);
    let format = detect(data);
    if !format.is_known() {
        return TrimPlan::stopped(format, Verdict::Unsupported);
    }
    log::debug!("{}: detected {}", name, format.display_name());

    let padding_byte = match options.padding_byte {
        Some(byte) => byte,
        None => {
            let byte = auto_detect_padding(data, format);
            log::debug!("{}: auto-detected padding 0x{:02X}", name, byte);
            byte
        }
    };

    enter(name, TrimStage::Analyzing);
    let report = analyze(data, padding_byte);
    if !report.has_padding {
        return TrimPlan {
            padding_byte: Some(padding_byte),
            report: Some(report),
            ..TrimPlan::stopped(format, Verdict::NoPadding)
        };
    }

    enter(name, TrimStage::Validating);
    let trim_point = report.trim_point;
    let validation = validate(data, trim_point, format, &options.policy());
    let risk = assess_risk(data, trim_point, format);
    let mut warnings = validation.warnings.clone();

    let verdict = if validation.is_valid() {
        Verdict::Trim { trim_point }
    } else if options.force {
        log::warn!(
            "{}: forcing trim despite {} validation error(s)",
            name,
            validation.errors.len()
        );
        warnings.extend(validation.errors.iter().map(|e| format!("forced: {}", e)));
        Verdict::Trim { trim_point }
    } else {
        Verdict::Rejected {
            errors: validation.errors.clone(),
        }
    };

    TrimPlan {
        format,
        padding_byte: Some(padding_byte),
        report: Some(report),
        risk: Some(risk),
        warnings,
        verdict,
    }
}

/// Run the full pipeline for one file. Never fails: errors end up in the
/// returned outcome.
pub fn process_file(path: &Path, options: &TrimOptions) -> FileOutcome {
    let start = Instant::now();
    let mut outcome = FileOutcome::new(path);
    let name = outcome.file_name();

    match trim_file(path, options, &name, &mut outcome) {
        Ok(stage) => enter(&name, stage),
        Err(e) => {
            enter(&name, TrimStage::Aborted);
            log::debug!("{}: {}", name, e);
            outcome.set_error(&e);
        }
    }

    outcome.duration_ms = start.elapsed().as_millis() as u64;
    outcome
}

fn trim_file(
    path: &Path,
    options: &TrimOptions,
    name: &str,
    outcome: &mut FileOutcome,
) -> Result<TrimStage, TrimError> {
    let data = read_rom(path)?;
    outcome.original_size = data.len() as u64;
    outcome.set_trim_size(outcome.original_size);

    let plan = plan_named(&data, options, name);
    outcome.format = plan.format;
    outcome.confidence = plan.report.as_ref().map(|r| r.confidence);
    outcome.risk = plan.risk.clone();
    outcome.warnings.extend(plan.warnings.iter().cloned());

    let (trim_point, padding_byte) = match (&plan.verdict, plan.padding_byte) {
        (Verdict::Unsupported, _) => return Err(TrimError::UnsupportedFormat),
        (Verdict::Rejected { errors }, _) => return Err(TrimError::ValidationFailed(errors.clone())),
        (Verdict::Trim { trim_point }, Some(byte)) => (*trim_point, byte),
        _ => {
            outcome.status = OutcomeStatus::NoPadding;
            return Ok(TrimStage::Done);
        }
    };

    outcome.set_trim_size(trim_point as u64);
    let savings = format_bytes_approx(outcome.bytes_saved());

    match options.mode() {
        TrimMode::Analyze => {
            enter(name, TrimStage::Reporting);
            log::info!(
                "{}: {} can be removed ({:.1}%)",
                name,
                savings,
                outcome.saved_ratio * 100.0
            );
            outcome.status = OutcomeStatus::Analyzed;
        }
        TrimMode::DryRun => {
            enter(name, TrimStage::Simulating);
            log::info!("{}: would remove {}", name, savings);
            outcome.status = OutcomeStatus::Simulated;
        }
        TrimMode::Write => {
            enter(name, TrimStage::Writing);
            write_trimmed(path, &data, trim_point, padding_byte, options, outcome)?;
            log::info!(
                "{}: removed {} ({:.1}%)",
                name,
                savings,
                outcome.saved_ratio * 100.0
            );
            outcome.status = OutcomeStatus::Trimmed;
            outcome.trimmed = true;
        }
    }

    Ok(TrimStage::Done)
}

/// Read a whole ROM into memory, refusing empty files and anything over
/// [`MAX_FILE_SIZE`].
pub fn read_rom(path: &Path) -> Result<Vec<u8>, TrimError> {
    let size = fs::metadata(path)?.len();
    if size == 0 {
        return Err(TrimError::EmptyFile(path.to_path_buf()));
    }
    if size > MAX_FILE_SIZE {
        return Err(TrimError::FileTooLarge {
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(fs::read(path)?)
}

/// `game.gba` -> `game.gba.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, "bak")
}

/// `game.gba` -> `game.gba.rtpt`
pub fn patch_path(path: &Path) -> PathBuf {
    with_suffix(path, PATCH_EXTENSION)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Where the trimmed file goes: the original path, or the same file name
/// inside `output_dir`.
pub fn output_path(path: &Path, options: &TrimOptions) -> PathBuf {
    match (&options.output_dir, path.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn write_trimmed(
    path: &Path,
    data: &[u8],
    trim_point: usize,
    padding_byte: u8,
    options: &TrimOptions,
    outcome: &mut FileOutcome,
) -> Result<(), TrimError> {
    let output = output_path(path, options);
    let in_place = output == path || is_same_file(&output, path);

    if !in_place && output.exists() && !options.force {
        return Err(TrimError::OutputExists(output));
    }

    if options.backup {
        create_backup(path)?;
    }

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    if options.write_patch {
        match RestorationPatch::create(data, &data[..trim_point], padding_byte) {
            Some(patch) => {
                let patch_file = patch_path(&output);
                patch.save(&patch_file)?;
                log::debug!("Wrote restoration patch {}", patch_file.display());
                outcome.patch_path = Some(patch_file);
            }
            None => outcome
                .warnings
                .push("removed data is not uniform padding; no restoration patch written".into()),
        }
    }

    fs::write(&output, &data[..trim_point])?;

    let actual = fs::metadata(&output)?.len();
    if actual != trim_point as u64 {
        return Err(TrimError::WriteIntegrity {
            expected: trim_point as u64,
            actual,
        });
    }

    Ok(())
}

fn create_backup(path: &Path) -> Result<PathBuf, TrimError> {
    let bak_path = backup_path(path);
    if bak_path.exists() {
        log::warn!("Overwriting existing backup {}", bak_path.display());
    }
    fs::copy(path, &bak_path).map_err(|e| {
        TrimError::backup(format!(
            "could not copy {} to {}: {}",
            path.display(),
            bak_path.display(),
            e
        ))
    })?;
    log::debug!("Created backup {}", bak_path.display());
    Ok(bak_path)
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
