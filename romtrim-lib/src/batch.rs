//! Batch drivers: run the pipeline over many files, either one after
//! another or on a [`WorkerPool`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::BatchAborted;
use crate::options::TrimOptions;
use crate::outcome::{BatchSummary, FileOutcome};
use crate::pipeline::process_file;
use crate::worker_pool::WorkerPool;

/// A batch stops once more than this many files have failed, unless forced.
pub const MAX_FAILURES: usize = 10;

/// Progress information for callbacks.
#[derive(Debug, Clone)]
pub enum BatchProgress {
    /// About to process `total` files.
    Starting { total: usize },
    /// A file is being processed (sequential batches only).
    Processing {
        file_name: String,
        file_index: usize,
        total: usize,
    },
    /// A file has finished.
    Finished {
        outcome: Box<FileOutcome>,
        completed: usize,
        total: usize,
    },
    /// The failure limit was hit; no further files will be started.
    Aborting { failures: usize },
}

fn over_limit(summary: &BatchSummary, options: &TrimOptions) -> bool {
    !options.force && summary.failed > MAX_FAILURES
}

fn finish(summary: BatchSummary, aborted: bool) -> Result<BatchSummary, BatchAborted> {
    if aborted {
        Err(BatchAborted {
            failures: summary.failed,
            summary,
        })
    } else {
        Ok(summary)
    }
}

/// Process files one at a time, in order.
pub fn run_batch(
    files: &[PathBuf],
    options: &TrimOptions,
    progress: &dyn Fn(BatchProgress),
) -> Result<BatchSummary, BatchAborted> {
    let total = files.len();
    let mut summary = BatchSummary::new();
    progress(BatchProgress::Starting { total });

    let mut aborted = false;
    for (i, path) in files.iter().enumerate() {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        progress(BatchProgress::Processing {
            file_name,
            file_index: i,
            total,
        });

        let outcome = process_file(path, options);
        progress(BatchProgress::Finished {
            outcome: Box::new(outcome.clone()),
            completed: i + 1,
            total,
        });
        summary.record(outcome);

        if over_limit(&summary, options) {
            log::error!("Too many failures ({}), aborting batch", summary.failed);
            progress(BatchProgress::Aborting {
                failures: summary.failed,
            });
            aborted = true;
            break;
        }
    }

    finish(summary, aborted)
}

/// Process files on `options.threads` workers.
///
/// Per-file work runs on the blocking thread pool. Outcomes are folded into
/// the summary here, on the receiving side only. When the failure limit is
/// hit the pool stops taking new files, and files already in progress are
/// still recorded.
pub async fn run_batch_parallel(
    files: Vec<PathBuf>,
    options: TrimOptions,
    progress: impl Fn(BatchProgress),
) -> Result<BatchSummary, BatchAborted> {
    let total = files.len();
    let threads = options.threads.max(1);
    let options = Arc::new(options);
    let mut summary = BatchSummary::new();
    progress(BatchProgress::Starting { total });

    let worker_options = options.clone();
    let mut pool = WorkerPool::start(threads, files, move |path: PathBuf| {
        let options = worker_options.clone();
        async move {
            let task_path = path.clone();
            match tokio::task::spawn_blocking(move || process_file(&task_path, &options)).await {
                Ok(outcome) => outcome,
                Err(e) => FileOutcome::failed(&path, format!("worker task failed: {}", e)),
            }
        }
    });

    let mut aborted = false;
    while let Some(outcome) = pool.recv().await {
        progress(BatchProgress::Finished {
            outcome: Box::new(outcome.clone()),
            completed: summary.processed + 1,
            total,
        });
        summary.record(outcome);

        if !aborted && over_limit(&summary, &options) {
            log::error!("Too many failures ({}), aborting batch", summary.failed);
            progress(BatchProgress::Aborting {
                failures: summary.failed,
            });
            pool.stop();
            aborted = true;
        }
    }

    summary.sort_outcomes();
    finish(summary, aborted)
}

#[cfg(test)]
#[path = "tests/batch_tests.rs"]
mod tests;
