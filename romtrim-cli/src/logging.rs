//! Console logger.
//!
//! `log::info!` is the CLI's normal output channel and goes to stdout
//! unadorned. Warnings and errors go to stderr. In verbose mode every line
//! gets a timestamp and level tag. With `--logfile` each line is also
//! appended to a file with ANSI escapes stripped.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};

struct CliLogger {
    level: LevelFilter,
    verbose: bool,
    file: Option<Mutex<File>>,
}

impl CliLogger {
    fn format_line(&self, record: &Record) -> String {
        if self.verbose {
            format!(
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        } else {
            format!("{}", record.args())
        }
    }
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format_line(record);
        if record.level() <= Level::Warn {
            let _ = writeln!(std::io::stderr(), "{}", line);
        } else {
            let _ = writeln!(std::io::stdout(), "{}", line);
        }

        if let Some(file) = &self.file
            && let Ok(mut f) = file.lock()
        {
            let _ = writeln!(f, "{}", strip_ansi_escapes::strip_str(&line));
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        if let Some(file) = &self.file
            && let Ok(mut f) = file.lock()
        {
            let _ = f.flush();
        }
    }
}

/// Install the global logger.
///
/// `quiet` keeps warnings and errors only; `verbose` enables debug output
/// and wins over `quiet`.
pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> std::io::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let file = match logfile {
        Some(path) => Some(Mutex::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => None,
    };

    let logger = CliLogger {
        level,
        verbose,
        file,
    };
    log::set_boxed_logger(Box::new(logger))
        .map(|()| log::set_max_level(level))
        .map_err(std::io::Error::other)
}
