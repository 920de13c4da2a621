use std::path::PathBuf;

use romtrim_core::SafetyPolicy;
use serde::{Deserialize, Serialize};

/// Options that control how files are trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimOptions {
    /// Walk input directories recursively.
    pub recursive: bool,
    /// Report what would be removed without writing.
    pub dry_run: bool,
    /// Copy the original to `<file>.<ext>.bak` before writing.
    pub backup: bool,
    pub verbose: bool,
    /// Only analyze; takes priority over `dry_run`.
    pub analyze_only: bool,
    /// Trim even when validation fails, and overwrite existing outputs.
    pub force: bool,
    /// Padding byte to look for. `None` picks one per file.
    pub padding_byte: Option<u8>,
    pub min_size: usize,
    pub safety_margin: usize,
    pub max_cut_ratio: f64,
    /// Write trimmed files here instead of in place.
    pub output_dir: Option<PathBuf>,
    /// Save a `.rtpt` restoration patch next to each trimmed file.
    pub write_patch: bool,
    /// Number of files processed concurrently.
    pub threads: usize,
}

impl Default for TrimOptions {
    fn default() -> Self {
        let policy = SafetyPolicy::default();
        Self {
            recursive: false,
            dry_run: false,
            backup: true,
            verbose: false,
            analyze_only: false,
            force: false,
            padding_byte: None,
            min_size: policy.min_size,
            safety_margin: policy.safety_margin,
            max_cut_ratio: policy.max_cut_ratio,
            output_dir: None,
            write_patch: false,
            threads: 1,
        }
    }
}

impl TrimOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn analyze_only(mut self, analyze_only: bool) -> Self {
        self.analyze_only = analyze_only;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn padding_byte(mut self, padding_byte: Option<u8>) -> Self {
        self.padding_byte = padding_byte;
        self
    }

    pub fn min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn safety_margin(mut self, safety_margin: usize) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    pub fn max_cut_ratio(mut self, max_cut_ratio: f64) -> Self {
        self.max_cut_ratio = max_cut_ratio;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn write_patch(mut self, write_patch: bool) -> Self {
        self.write_patch = write_patch;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Safety limits handed to the validator.
    pub fn policy(&self) -> SafetyPolicy {
        SafetyPolicy {
            max_cut_ratio: self.max_cut_ratio,
            safety_margin: self.safety_margin,
            min_size: self.min_size,
            force: self.force,
        }
    }

    pub fn mode(&self) -> TrimMode {
        if self.analyze_only {
            TrimMode::Analyze
        } else if self.dry_run {
            TrimMode::DryRun
        } else {
            TrimMode::Write
        }
    }
}

/// What the pipeline does once a trim has been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimMode {
    Analyze,
    DryRun,
    Write,
}

impl std::fmt::Display for TrimMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Analyze => "analysis",
            Self::DryRun => "simulation",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Parse a padding byte setting: `auto`, or a hex byte such as `0xFF`, `ff`
/// or `0x00`.
pub fn parse_padding_byte(s: &str) -> Result<Option<u8>, String> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if hex.is_empty() || hex.len() > 2 {
        return Err(format!("invalid padding byte '{}'", s));
    }
    u8::from_str_radix(hex, 16)
        .map(Some)
        .map_err(|_| format!("invalid padding byte '{}'", s))
}
