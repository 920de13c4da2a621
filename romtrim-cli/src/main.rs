//! romtrim CLI
//!
//! Command-line interface for trimming padding from cartridge ROM images.

mod cli_types;
mod commands;
mod error;
mod logging;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};

pub(crate) use error::CliError;

/// Print an empty line through the logger so it respects `--quiet`.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Trim(args) => commands::trim::run_trim(args, cli.quiet, cli.verbose),
        Commands::Restore {
            file,
            patch,
            output,
        } => commands::restore::run_restore(&file, &patch, output.as_deref()),
        Commands::Formats => {
            commands::formats::run_formats();
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::Init { force } => commands::config::run_config_init(force),
        },
    };

    if let Err(e) = result {
        log::error!("{}", e);
        log::logger().flush();
        std::process::exit(1);
    }
    log::logger().flush();
}
