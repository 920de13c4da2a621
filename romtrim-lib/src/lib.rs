//! romtrim library: the trim pipeline and everything around it.
//!
//! Front ends build a [`TrimOptions`] (usually from [`settings`] plus
//! command-line overrides), collect inputs with [`scanner`], and hand them
//! to [`run_batch`] or [`run_batch_parallel`]. Single buffers can go
//! straight through [`plan_trim`].

pub mod batch;
pub mod error;
pub mod options;
pub mod outcome;
pub mod pipeline;
pub mod scanner;
pub mod settings;
pub mod worker_pool;

pub use batch::{BatchProgress, MAX_FAILURES, run_batch, run_batch_parallel};
pub use error::{BatchAborted, TrimError};
pub use options::{TrimMode, TrimOptions, parse_padding_byte};
pub use outcome::{BatchSummary, FileOutcome, OutcomeStatus};
pub use pipeline::{TrimPlan, TrimStage, Verdict, plan_trim, process_file};

// Re-export core types so front ends only need this crate
pub use romtrim_core::{
    PatchError, RestorationPatch, RiskAssessment, RiskLevel, RomFormat, apply_restoration_patch,
};
pub use romtrim_core::util::{format_bytes, format_bytes_approx};
