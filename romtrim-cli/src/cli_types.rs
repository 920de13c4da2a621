//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "romtrim")]
#[command(about = "Safely trim padding from cartridge ROM images", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for the trim command. Unset values come from settings.toml.
#[derive(Args, Clone, Debug)]
pub(crate) struct TrimArgs {
    /// ROM files or directories to process
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Walk directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Write trimmed files to this directory instead of in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Analyze only: report what could be removed
    #[arg(short, long)]
    pub analyze: bool,

    /// Simulate the trim without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Trim even when safety validation fails
    #[arg(short, long)]
    pub force: bool,

    /// Do not create .bak backups
    #[arg(long)]
    pub no_backup: bool,

    /// Padding byte: auto, 0xFF, 0x00 or another hex byte
    #[arg(long)]
    pub padding_byte: Option<String>,

    /// Never trim below this many bytes
    #[arg(long)]
    pub min_size: Option<usize>,

    /// Trimmed size must be at least this many bytes
    #[arg(long)]
    pub safety_margin: Option<usize>,

    /// Largest fraction of a file that may be removed (0.0-1.0)
    #[arg(long)]
    pub max_cut_ratio: Option<f64>,

    /// Number of files processed concurrently
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Write a .rtpt restoration patch for each trimmed file
    #[arg(long)]
    pub patch: bool,

    /// Print per-file results as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Trim trailing padding from ROM files
    Trim(TrimArgs),

    /// Restore a trimmed file from its .rtpt patch
    Restore {
        /// Trimmed ROM file
        file: PathBuf,

        /// Restoration patch (.rtpt)
        patch: PathBuf,

        /// Write the restored image here instead of over the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported ROM formats
    Formats,

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the current settings
    Show,

    /// Print the settings file path
    Path,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_flags_parse() {
        let cli = Cli::try_parse_from([
            "romtrim",
            "--quiet",
            "trim",
            "roms",
            "-r",
            "-n",
            "--padding-byte",
            "0x00",
            "--max-cut-ratio",
            "0.5",
            "-j",
            "4",
        ])
        .unwrap();

        assert!(cli.quiet);
        let Commands::Trim(args) = cli.command else {
            panic!("expected trim");
        };
        assert_eq!(args.paths, vec![PathBuf::from("roms")]);
        assert!(args.recursive);
        assert!(args.dry_run);
        assert!(!args.analyze);
        assert_eq!(args.padding_byte.as_deref(), Some("0x00"));
        assert_eq!(args.max_cut_ratio, Some(0.5));
        assert_eq!(args.threads, Some(4));
    }

    #[test]
    fn trim_requires_paths() {
        assert!(Cli::try_parse_from(["romtrim", "trim"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["romtrim", "formats", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Formats));
    }

    #[test]
    fn restore_and_config_parse() {
        let cli =
            Cli::try_parse_from(["romtrim", "restore", "a.gba", "a.gba.rtpt", "-o", "b.gba"])
                .unwrap();
        match cli.command {
            Commands::Restore { output, .. } => assert_eq!(output, Some(PathBuf::from("b.gba"))),
            _ => panic!("expected restore"),
        }

        let cli = Cli::try_parse_from(["romtrim", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }
}
