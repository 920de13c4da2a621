use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romtrim_lib::{RomFormat, format_bytes_approx};

pub(crate) fn run_formats() {
    log::info!("Supported formats:");
    crate::log_blank();

    for format in RomFormat::all().iter().filter(|f| f.is_known()) {
        log::info!(
            "  {} [{}]",
            format.short_name().if_supports_color(Stdout, |t| t.bold()),
            format
                .display_name()
                .if_supports_color(Stdout, |t| t.cyan()),
        );
        log::info!("    Extensions: {}", format.file_extensions().join(", "));
        if !format.aliases().is_empty() {
            log::info!("    Aliases: {}", format.aliases().join(", "));
        }
        if let Some(min) = format.min_trim_size() {
            log::info!(
                "    Minimum trimmed size: {}",
                format_bytes_approx(min as u64)
            );
        }
        log::info!(
            "    Recommended size: {}",
            format_bytes_approx(format.recommended_size() as u64)
        );
    }

    crate::log_blank();
    log::info!(
        "{}",
        "Files that match none of these are skipped.".if_supports_color(Stdout, |t| t.dimmed()),
    );
}
