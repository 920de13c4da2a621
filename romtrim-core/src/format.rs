//! ROM format detection.
//!
//! Classifies a buffer into one of the cartridge layouts the trimmer knows
//! how to validate. Detection uses fixed header signatures first and falls
//! back to size heuristics only for GBA dumps with erased logos.

use serde::{Deserialize, Serialize};

use crate::padding::find_last_non_padding;
use crate::util::{is_power_of_two, read_u32_le};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Buffers shorter than this are never classified.
pub const MIN_DETECT_SIZE: usize = 192;

/// Full NDS cartridge header is 512 bytes (0x200).
const NDS_HEADER_SIZE: usize = 0x200;

/// GB/GBC header ends at 0x14F.
const GB_HEADER_END: usize = 0x150;

const MIB: usize = 1024 * 1024;

/// Nintendo compressed logo bitmap (156 bytes), stored at 0x04 in GBA
/// cartridges and at 0xC0 in NDS cartridges.
pub(crate) const NINTENDO_LOGO: [u8; 156] = [
    0x24, 0xFF, 0xAE, 0x51, 0x69, 0x9A, 0xA2, 0x21, 0x3D, 0x84, 0x82, 0x0A, 0x84, 0xE4, 0x09, 0xAD,
    0x11, 0x24, 0x8B, 0x98, 0xC0, 0x81, 0x7F, 0x21, 0xA3, 0x52, 0xBE, 0x19, 0x93, 0x09, 0xCE, 0x20,
    0x10, 0x46, 0x4A, 0x4A, 0xF8, 0x27, 0x31, 0xEC, 0x58, 0xC7, 0xE8, 0x33, 0x82, 0xE3, 0xCE, 0xBF,
    0x85, 0xF4, 0xDF, 0x94, 0xCE, 0x4B, 0x09, 0xC1, 0x94, 0x56, 0x8A, 0xC0, 0x13, 0x72, 0xA7, 0xFC,
    0x9F, 0x84, 0x4D, 0x73, 0xA3, 0xCA, 0x9A, 0x61, 0x58, 0x97, 0xA3, 0x27, 0xFC, 0x03, 0x98, 0x76,
    0x23, 0x1D, 0xC7, 0x61, 0x03, 0x04, 0xAE, 0x56, 0xBF, 0x38, 0x84, 0x00, 0x40, 0xA7, 0x0E, 0xFD,
    0xFF, 0x52, 0xFE, 0x03, 0x6F, 0x95, 0x30, 0xF1, 0x97, 0xFB, 0xC0, 0x85, 0x60, 0xD6, 0x80, 0x25,
    0xA9, 0x63, 0xBE, 0x03, 0x01, 0x4E, 0x38, 0xE2, 0xF9, 0xA2, 0x34, 0xFF, 0xBB, 0x3E, 0x03, 0x44,
    0x78, 0x00, 0x90, 0xCB, 0x88, 0x11, 0x3A, 0x94, 0x65, 0xC0, 0x7C, 0x63, 0x87, 0xF0, 0x3C, 0xAF,
    0xD6, 0x25, 0xE4, 0x8B, 0x38, 0x0A, 0xAC, 0x72, 0x21, 0xD4, 0xF8, 0x07,
];

/// Game Boy boot logo (48 bytes at 0x104).
pub(crate) const GAME_BOY_LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

/// "Nintendo DS" plus its terminating NUL, checked at 0x0C.
const NDS_SIGNATURE: &[u8; 12] = b"Nintendo DS\0";

// ---------------------------------------------------------------------------
// Format tag
// ---------------------------------------------------------------------------

/// ROM layouts the trimmer recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RomFormat {
    Unknown,
    Gba,
    Nds,
    /// Game Boy and Game Boy Color share one header layout.
    GameBoy,
}

const ALL_FORMATS: &[RomFormat] = &[
    RomFormat::Gba,
    RomFormat::Nds,
    RomFormat::GameBoy,
    RomFormat::Unknown,
];

impl RomFormat {
    /// Canonical short name used for CLI output and reports.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Gba => "gba",
            Self::Nds => "nds",
            Self::GameBoy => "gb",
        }
    }

    /// Full display name for the format.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Gba => "Game Boy Advance",
            Self::Nds => "Nintendo DS",
            Self::GameBoy => "Game Boy / Game Boy Color",
        }
    }

    /// All accepted names for this format (case-insensitive matching).
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Unknown => &["unknown"],
            Self::Gba => &["gba", "game boy advance", "gameboy advance"],
            Self::Nds => &["nds", "ds", "nintendo ds"],
            Self::GameBoy => &["gb", "gbc", "gameboy", "game boy", "game boy color"],
        }
    }

    /// File extensions commonly used for dumps of this format.
    pub fn file_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Unknown => &[],
            Self::Gba => &["gba"],
            Self::Nds => &["nds"],
            Self::GameBoy => &["gb", "gbc"],
        }
    }

    /// Absolute floor for a trimmed image. `None` means the format can never
    /// be trimmed safely.
    pub fn min_trim_size(&self) -> Option<usize> {
        match self {
            Self::Gba => Some(MIB),
            Self::Nds => Some(8 * MIB),
            Self::GameBoy => Some(32 * 1024),
            Self::Unknown => None,
        }
    }

    /// Size below which a trim is flagged as risky (advisory only).
    pub fn recommended_size(&self) -> usize {
        match self {
            Self::Gba => 8 * MIB,
            Self::Nds => 64 * MIB,
            Self::GameBoy => 512 * 1024,
            Self::Unknown => 8192,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// All format tags, known formats first.
    pub fn all() -> &'static [RomFormat] {
        ALL_FORMATS
    }
}

impl std::fmt::Display for RomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Error returned when a string cannot be parsed into a `RomFormat`.
#[derive(Debug, Clone)]
pub struct RomFormatParseError(pub String);

impl std::fmt::Display for RomFormatParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown ROM format: '{}'", self.0)
    }
}

impl std::error::Error for RomFormatParseError {}

impl std::str::FromStr for RomFormat {
    type Err = RomFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ALL_FORMATS
            .iter()
            .copied()
            .find(|format| format.aliases().contains(&lower.as_str()))
            .ok_or_else(|| RomFormatParseError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Classify a ROM buffer.
///
/// Checks run in a fixed priority order (GBA, NDS, GB/GBC) and the first
/// match wins. Never panics; anything shorter than [`MIN_DETECT_SIZE`] is
/// `Unknown`.
pub fn detect(data: &[u8]) -> RomFormat {
    if data.len() < MIN_DETECT_SIZE {
        return RomFormat::Unknown;
    }

    if is_gba(data) {
        RomFormat::Gba
    } else if is_nds(data) {
        RomFormat::Nds
    } else if is_game_boy(data) {
        RomFormat::GameBoy
    } else {
        RomFormat::Unknown
    }
}

fn is_gba(data: &[u8]) -> bool {
    if data.get(0x04..0x04 + NINTENDO_LOGO.len()) == Some(&NINTENDO_LOGO[..]) {
        return true;
    }
    is_gba_by_size(data)
}

/// Size heuristic for GBA dumps whose logo was erased by a patching tool.
///
/// This is a guess, not a signature match: a 1–32 MiB image whose data
/// (ignoring trailing 0xFF) ends exactly on a power of two or a whole MiB
/// looks like a padded GBA cartridge.
fn is_gba_by_size(data: &[u8]) -> bool {
    if !(MIB..=32 * MIB).contains(&data.len()) {
        return false;
    }
    match find_last_non_padding(data, 0xFF) {
        Some(last) => {
            let used = (last + 1) as u64;
            is_power_of_two(used) || used.is_multiple_of(MIB as u64)
        }
        None => false,
    }
}

fn is_nds(data: &[u8]) -> bool {
    if data.len() < NDS_HEADER_SIZE {
        return false;
    }
    if data[0x0C..0x18] == NDS_SIGNATURE[..] {
        return true;
    }

    let len = data.len() as u64;
    match (read_u32_le(data, 0x20), read_u32_le(data, 0x30)) {
        (Some(arm9), Some(arm7)) => {
            u64::from(arm9) < len
                && u64::from(arm7) < len
                && arm9.is_multiple_of(4)
                && arm7.is_multiple_of(4)
        }
        _ => false,
    }
}

fn is_game_boy(data: &[u8]) -> bool {
    data.len() >= GB_HEADER_END && data[0x104..0x134] == GAME_BOY_LOGO
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
