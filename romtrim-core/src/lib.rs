//! Core analysis for romtrim.
//!
//! Everything here works on in-memory byte slices and performs no I/O apart
//! from the patch file helpers. The pieces are:
//!
//! - [`format`]: classify a buffer as GBA, NDS, GB/GBC or unknown
//! - [`padding`]: locate the trailing filler and score confidence
//! - [`safety`]: validate a trim point and estimate risk
//! - [`patch`]: describe removed padding so a trim can be undone

pub mod error;
pub mod format;
pub mod padding;
pub mod patch;
pub mod safety;
pub mod util;

pub use error::PatchError;
pub use format::{RomFormat, RomFormatParseError, detect};
pub use padding::{PaddingReport, PatternType, analyze, auto_detect_padding};
pub use patch::{PATCH_MAGIC, RestorationPatch, apply_restoration_patch};
pub use safety::{
    RiskAssessment, RiskLevel, SafetyPolicy, ValidationResult, assess_risk, validate,
};
