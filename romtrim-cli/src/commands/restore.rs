use std::fs;
use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romtrim_lib::{RestorationPatch, apply_restoration_patch, format_bytes};

use crate::CliError;

/// Rebuild an untrimmed image from a trimmed file and its patch.
pub(crate) fn run_restore(
    file: &Path,
    patch_file: &Path,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let trimmed = fs::read(file)?;
    let patch = RestorationPatch::load(patch_file)?;
    log::debug!(
        "Patch: append {} bytes of 0x{:02X}",
        patch.length,
        patch.padding_byte,
    );

    let restored = apply_restoration_patch(&trimmed, &patch)?;
    let target = output.unwrap_or(file);
    fs::write(target, &restored)?;

    let expected = trimmed.len() as u64 + u64::from(patch.length);
    let written = fs::metadata(target)?.len();
    if written != expected {
        return Err(CliError::other(format!(
            "Restored file is {} bytes, expected {}",
            written, expected
        )));
    }

    log::info!(
        "{} Restored {} ({} -> {})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        target.display().if_supports_color(Stdout, |t| t.bold()),
        format_bytes(trimmed.len() as u64),
        format_bytes(written),
    );
    Ok(())
}
