use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::Level;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romtrim_lib::scanner::{self, DEFAULT_EXTENSIONS};
use romtrim_lib::settings;
use romtrim_lib::{
    BatchAborted, BatchProgress, BatchSummary, FileOutcome, OutcomeStatus, RiskLevel, TrimMode,
    TrimOptions, format_bytes, format_bytes_approx, parse_padding_byte, run_batch,
    run_batch_parallel,
};

use crate::CliError;
use crate::cli_types::TrimArgs;

/// Run the trim command.
pub(crate) fn run_trim(args: TrimArgs, quiet: bool, verbose: bool) -> Result<(), CliError> {
    let started = Instant::now();
    let options = build_options(&args, verbose)?;
    let mode = options.mode();

    let extensions = scanner::extension_set(DEFAULT_EXTENSIONS);
    let files = scanner::collect_rom_files(&args.paths, options.recursive, &extensions)?;
    if files.is_empty() {
        log::info!(
            "{}",
            "No ROM files found".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    if !args.json {
        log::info!(
            "{} {} file{} ({} mode)",
            "Processing".if_supports_color(Stdout, |t| t.bold()),
            files.len(),
            if files.len() == 1 { "" } else { "s" },
            mode,
        );
        if let Some(dir) = &options.output_dir {
            log::info!(
                "{}",
                format!("Output directory: {}", dir.display())
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        if options.force {
            log::warn!(
                "{} Force enabled: safety validation will not block trims",
                "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            );
        }
        crate::log_blank();
    }

    let pb = if quiet || args.json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} {msg}")
                .expect("static pattern")
                .tick_chars("/-\\|"),
        );
        pb
    };

    let show_lines = !args.json;
    let progress_callback = |progress: BatchProgress| match progress {
        BatchProgress::Starting { total } => {
            pb.set_message(format!("Starting {} files", total));
            pb.tick();
        }
        BatchProgress::Processing {
            ref file_name,
            file_index,
            total,
        } => {
            pb.set_message(format!("[{}/{}] {}", file_index + 1, total, file_name));
            pb.tick();
        }
        BatchProgress::Finished {
            ref outcome,
            completed,
            total,
        } => {
            if show_lines {
                pb.suspend(|| print_outcome(outcome));
            }
            pb.set_message(format!("[{}/{}] done", completed, total));
            pb.tick();
        }
        BatchProgress::Aborting { failures } => {
            pb.set_message(format!("Aborting after {} failures", failures));
            pb.tick();
        }
    };

    let result = if options.threads > 1 && files.len() > 1 {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;
        rt.block_on(run_batch_parallel(files, options.clone(), progress_callback))
    } else {
        run_batch(&files, &options, &progress_callback)
    };
    pb.finish_and_clear();

    let (summary, aborted) = match result {
        Ok(summary) => (summary, None),
        Err(BatchAborted { failures, summary }) => (summary, Some(failures)),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&summary.outcomes)
            .map_err(|e| CliError::other(format!("Failed to serialize outcomes: {}", e)))?;
        println!("{}", json);
    } else {
        crate::log_blank();
        print_summary(&summary, mode, started.elapsed().as_secs_f64());
    }

    match aborted {
        Some(failures) => Err(CliError::Aborted(failures)),
        None => Ok(()),
    }
}

/// Settings file first, then command-line overrides.
fn build_options(args: &TrimArgs, verbose: bool) -> Result<TrimOptions, CliError> {
    let mut options = settings::load_settings()?.to_options()?;

    options.verbose = verbose;
    options.recursive |= args.recursive;
    options.analyze_only = args.analyze;
    options.dry_run = args.dry_run;
    options.force = args.force;
    options.write_patch |= args.patch;
    if args.no_backup {
        options.backup = false;
    }
    if let Some(dir) = &args.output {
        options = options.output_dir(dir.clone());
    }
    if let Some(raw) = &args.padding_byte {
        options.padding_byte = parse_padding_byte(raw).map_err(CliError::config)?;
    }
    if let Some(min_size) = args.min_size {
        options.min_size = min_size;
    }
    if let Some(margin) = args.safety_margin {
        options.safety_margin = margin;
    }
    if let Some(ratio) = args.max_cut_ratio {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(CliError::config(format!(
                "--max-cut-ratio must be between 0.0 and 1.0, got {}",
                ratio
            )));
        }
        options.max_cut_ratio = ratio;
    }
    if let Some(threads) = args.threads {
        options = options.threads(threads);
    }

    log::debug!("Effective options: {:?}", options);
    Ok(options)
}

/// Print the result line for one file, plus its warnings.
fn print_outcome(outcome: &FileOutcome) {
    let name = outcome.file_name();
    match outcome.status {
        OutcomeStatus::Trimmed | OutcomeStatus::Analyzed | OutcomeStatus::Simulated => {
            let verb = match outcome.status {
                OutcomeStatus::Trimmed => "Trimmed",
                OutcomeStatus::Analyzed => "Can trim",
                _ => "Would trim",
            };
            log::info!(
                "  {} {} {} {} -> {} ({:.1}% saved){}",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                verb,
                name.if_supports_color(Stdout, |t| t.bold()),
                format_bytes(outcome.original_size),
                format_bytes(outcome.trimmed_size),
                outcome.saved_ratio * 100.0,
                format!(" [{}]", outcome.format.short_name())
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
            if let Some(risk) = &outcome.risk {
                let level = if risk.level >= RiskLevel::High {
                    Level::Warn
                } else {
                    Level::Info
                };
                log::log!(
                    level,
                    "    Risk: {}{}",
                    risk.level,
                    outcome
                        .confidence
                        .map(|c| format!(", confidence {:.0}%", c * 100.0))
                        .unwrap_or_default(),
                );
                for factor in &risk.factors {
                    log::debug!("      {}", factor);
                }
            }
            if let Some(patch) = &outcome.patch_path {
                log::info!(
                    "    Patch: {}",
                    patch.display().if_supports_color(Stdout, |t| t.cyan()),
                );
            }
        }
        OutcomeStatus::NoPadding => {
            log::info!(
                "  {} {} {}",
                "-".if_supports_color(Stdout, |t| t.dimmed()),
                name,
                "(no trimming needed)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        OutcomeStatus::Unsupported => {
            log::info!(
                "  {} {} {}",
                "?".if_supports_color(Stdout, |t| t.yellow()),
                name,
                "(unsupported format)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        OutcomeStatus::ValidationFailed | OutcomeStatus::Failed => {
            log::warn!(
                "  {} {}: {}",
                "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                name.if_supports_color(Stdout, |t| t.bold()),
                outcome.error.as_deref().unwrap_or("unknown error"),
            );
        }
    }

    for warning in &outcome.warnings {
        log::warn!(
            "    {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            warning,
        );
    }
}

fn print_summary(summary: &BatchSummary, mode: TrimMode, elapsed_secs: f64) {
    log::info!("{}", "Summary:".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Files processed: {}", summary.processed);

    let trimmed_label = match mode {
        TrimMode::Write => "Files trimmed",
        TrimMode::DryRun => "Files that would be trimmed",
        TrimMode::Analyze => "Files with removable padding",
    };
    log::info!(
        "  {} {}: {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        trimmed_label,
        summary.trimmed,
    );
    if summary.skipped > 0 {
        log::info!(
            "  {} Skipped (unsupported): {}",
            "?".if_supports_color(Stdout, |t| t.yellow()),
            summary.skipped,
        );
    }
    if summary.failed > 0 {
        log::warn!(
            "  {} Failed: {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            summary.failed,
        );
    }

    let recovered_label = match mode {
        TrimMode::Write => "Space recovered",
        _ => "Space recoverable",
    };
    log::info!(
        "  {}: {}",
        recovered_label,
        format_bytes(summary.bytes_saved)
    );
    if let Some(avg) = summary.average_saved() {
        log::info!("  Average per file: {}", format_bytes_approx(avg));
    }
    log::info!("  Mode: {}", mode);
    log::info!("  Total time: {:.2}s", elapsed_secs);
}
