//! User settings file.
//!
//! Lives at `~/.config/romtrim/settings.toml`. Missing files and missing
//! keys fall back to defaults; command-line flags override whatever the
//! file says.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TrimError;
use crate::options::{TrimOptions, parse_padding_byte};

/// Canonical path to the settings file: `~/.config/romtrim/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("romtrim").join("settings.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub safety: SafetySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// `"auto"` or a hex byte such as `"0xFF"`.
    pub default_padding: String,
    pub create_backup: bool,
    pub recursive: bool,
    pub threads: usize,
    pub write_patch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetySettings {
    pub min_size: usize,
    pub safety_margin: usize,
    pub max_cut_ratio: f64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        let options = TrimOptions::default();
        Self {
            default_padding: "auto".to_string(),
            create_backup: options.backup,
            recursive: options.recursive,
            threads: options.threads,
            write_patch: options.write_patch,
        }
    }
}

impl Default for SafetySettings {
    fn default() -> Self {
        let options = TrimOptions::default();
        Self {
            min_size: options.min_size,
            safety_margin: options.safety_margin,
            max_cut_ratio: options.max_cut_ratio,
        }
    }
}

impl Settings {
    /// Base trim options described by this file.
    pub fn to_options(&self) -> Result<TrimOptions, TrimError> {
        let padding_byte = parse_padding_byte(&self.general.default_padding)
            .map_err(|e| TrimError::settings(format!("general.default_padding: {}", e)))?;
        if !(0.0..=1.0).contains(&self.safety.max_cut_ratio) {
            return Err(TrimError::settings(format!(
                "safety.max_cut_ratio must be between 0.0 and 1.0, got {}",
                self.safety.max_cut_ratio
            )));
        }

        Ok(TrimOptions::new()
            .backup(self.general.create_backup)
            .recursive(self.general.recursive)
            .threads(self.general.threads)
            .write_patch(self.general.write_patch)
            .padding_byte(padding_byte)
            .min_size(self.safety.min_size)
            .safety_margin(self.safety.safety_margin)
            .max_cut_ratio(self.safety.max_cut_ratio))
    }
}

/// Load settings from the canonical path.
pub fn load_settings() -> Result<Settings, TrimError> {
    load_settings_from(&settings_path())
}

/// Load settings from `path`. A missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings, TrimError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(e) => return Err(e.into()),
    };
    toml::from_str(&contents)
        .map_err(|e| TrimError::settings(format!("{}: {}", path.display(), e)))
}

/// Save settings to the canonical path.
pub fn save_settings(settings: &Settings) -> io::Result<()> {
    save_settings_to(&settings_path(), settings)
}

/// Write settings atomically (temp file, then rename).
pub fn save_settings_to(path: &Path, settings: &Settings) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(settings).map_err(io::Error::other)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load the settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&tmp.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.to_options().unwrap(), TrimOptions::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(
            &path,
            "[general]\ndefault_padding = \"0x00\"\ncreate_backup = false\n\n[safety]\nmax_cut_ratio = 0.8\n",
        )
        .unwrap();

        let options = load_settings_from(&path).unwrap().to_options().unwrap();
        assert_eq!(options.padding_byte, Some(0x00));
        assert!(!options.backup);
        assert_eq!(options.max_cut_ratio, 0.8);
        assert_eq!(options.safety_margin, 65536);
        assert_eq!(options.min_size, 1024);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("settings.toml");
        let mut settings = Settings::default();
        settings.general.threads = 4;
        settings.general.default_padding = "0xFF".into();

        save_settings_to(&path, &settings).unwrap();
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(load_settings_from(&path).unwrap(), settings);
    }

    #[test]
    fn invalid_values_are_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.toml");

        std::fs::write(&path, "[general]\ndefault_padding = \"maybe\"\n").unwrap();
        let err = load_settings_from(&path).unwrap().to_options().unwrap_err();
        assert!(matches!(err, TrimError::Settings(_)));

        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            load_settings_from(&path).unwrap_err(),
            TrimError::Settings(_)
        ));
    }
}
