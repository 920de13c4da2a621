use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romtrim_lib::settings::{self, Settings};

use crate::CliError;

/// Show the effective settings and where they come from.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings::settings_path();

    log::info!(
        "{}",
        "romtrim Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let current = settings::load_settings()?;
    // Surface bad values here rather than on the next trim.
    current.to_options()?;

    let g = &current.general;
    let s = &current.safety;
    log::info!("  {}", "[general]".if_supports_color(Stdout, |t| t.bold()));
    log::info!("    default_padding = {}", g.default_padding);
    log::info!("    create_backup   = {}", g.create_backup);
    log::info!("    recursive       = {}", g.recursive);
    log::info!("    threads         = {}", g.threads);
    log::info!("    write_patch     = {}", g.write_patch);
    log::info!("  {}", "[safety]".if_supports_color(Stdout, |t| t.bold()));
    log::info!("    min_size        = {}", s.min_size);
    log::info!("    safety_margin   = {}", s.safety_margin);
    log::info!("    max_cut_ratio   = {}", s.max_cut_ratio);

    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    log::info!("{}", settings::settings_path().display());
}

/// Write a settings file with default values.
pub(crate) fn run_config_init(force: bool) -> Result<(), CliError> {
    let path = settings::settings_path();
    if path.exists() && !force {
        return Err(CliError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    settings::save_settings(&Settings::default())?;
    log::info!(
        "{} Wrote default settings to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}
