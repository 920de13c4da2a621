//! Input collection: expand files and directories into a sorted list of
//! ROM paths.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Extensions picked up by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["gba", "nds", "gb", "gbc", "bin", "rom"];

/// Build a lowercase extension set.
pub fn extension_set(extensions: &[&str]) -> HashSet<String> {
    extensions.iter().map(|e| e.to_lowercase()).collect()
}

/// Collect ROM files from a mix of file and directory inputs.
///
/// Files are taken as given when their extension matches. Directories are
/// walked one level deep, or fully when `recursive` is set. Hidden entries
/// are skipped, and inputs that do not exist are logged and ignored. The
/// result is sorted with duplicates removed.
pub fn collect_rom_files(
    inputs: &[PathBuf],
    recursive: bool,
    extensions: &HashSet<String>,
) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            if has_matching_extension(input, extensions) {
                files.push(input.clone());
            } else {
                log::warn!("Skipping {}: unsupported extension", input.display());
            }
        } else if input.is_dir() {
            walk_dir(input, recursive, extensions, &mut files)?;
        } else {
            log::warn!("Skipping {}: not found", input.display());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn walk_dir(
    dir: &Path,
    recursive: bool,
    extensions: &HashSet<String>,
    out: &mut Vec<PathBuf>,
) -> std::io::Result<()> {
    let mut entries: Vec<std::fs::DirEntry> = std::fs::read_dir(dir)?.flatten().collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }
        if path.is_file() {
            if has_matching_extension(&path, extensions) {
                out.push(path);
            }
        } else if recursive && path.is_dir() {
            if let Err(e) = walk_dir(&path, recursive, extensions, out) {
                log::warn!("Error reading {}: {}", path.display(), e);
            }
        }
    }
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Check if a path has an extension in the allowed set.
fn has_matching_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase()))
        .unwrap_or(false)
}
