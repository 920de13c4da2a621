//! Safety validation for a proposed trim.
//!
//! [`validate`] applies one canonical rule set per format and reports every
//! violation it finds. [`assess_risk`] is an independent, advisory estimate
//! and never affects validity.

use serde::{Deserialize, Serialize};

use crate::format::RomFormat;
use crate::util::{format_bytes, read_u16_le, read_u32_le};

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;

/// Largest GBA cartridge address space.
const GBA_MAX_SIZE: usize = 32 * MIB;

/// End of the GBA cartridge header region that must always be kept.
const GBA_HEADER_END: usize = 0xA0;

/// Window after an unaligned GBA trim point that must be pure filler.
const GBA_TAIL_WINDOW: usize = 1024;

const NDS_HEADER_SIZE: usize = 0x200;

/// Canonical GB/GBC cartridge sizes, 32 KiB to 8 MiB.
const GB_SIZES: [usize; 9] = [
    32 * KIB,
    64 * KIB,
    128 * KIB,
    256 * KIB,
    512 * KIB,
    MIB,
    2 * MIB,
    4 * MIB,
    8 * MIB,
];

/// Strings that commonly appear in headers and title screens. Cutting one in
/// half is a strong sign the trim point is inside real data.
const KNOWN_MARKERS: [&str; 5] = ["Nintendo", "LICENSED", "GAME BOY", "POKEMON", "SEGA"];

// ---------------------------------------------------------------------------
// Policy and results
// ---------------------------------------------------------------------------

/// Caller-supplied limits for a trim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyPolicy {
    /// Largest fraction of the file that may be removed.
    pub max_cut_ratio: f64,
    /// Trimmed size may never go below this many bytes.
    pub safety_margin: usize,
    /// User floor, combined with the per-format floor.
    pub min_size: usize,
    /// Recorded for callers; [`validate`] reports violations regardless.
    pub force: bool,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            max_cut_ratio: 0.6,
            safety_margin: 64 * KIB,
            min_size: 1024,
            force: false,
        }
    }
}

/// Outcome of [`validate`]. Once an error is pushed, the result stays invalid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.valid = false;
        self.errors.push(msg.into());
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Advisory risk classification, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// One step more severe, saturating at `Critical`.
    pub fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }

    fn from_cut_ratio(ratio: f64) -> Self {
        if ratio < 0.2 {
            Self::Low
        } else if ratio < 0.4 {
            Self::Medium
        } else if ratio < 0.6 {
            Self::High
        } else {
            Self::Critical
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub data_loss_probability: f64,
    pub factors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a proposed trim point against the policy and the format's layout.
///
/// An empty buffer, an out-of-range trim point or an `Unknown` format stop
/// evaluation immediately. Every other rule is always checked, so the error
/// list names every violation. `policy.force` does not change the verdict.
pub fn validate(
    data: &[u8],
    trim_point: usize,
    format: RomFormat,
    policy: &SafetyPolicy,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    let len = data.len();

    if len == 0 {
        result.error("ROM data is empty");
        return result;
    }
    if trim_point >= len {
        result.error(format!(
            "Trim point {} is not inside the ROM ({} bytes)",
            trim_point, len
        ));
        return result;
    }
    let Some(format_floor) = format.min_trim_size() else {
        result.error("Unknown ROM format: no safe trim rules");
        return result;
    };

    let floor = format_floor.max(policy.min_size);
    if trim_point < floor {
        result.error(format!(
            "Trimmed size {} is below the minimum of {} for {}",
            trim_point,
            format_bytes(floor as u64),
            format.short_name()
        ));
    }

    let cut_ratio = cut_ratio(len, trim_point);
    if cut_ratio > policy.max_cut_ratio {
        result.error(format!(
            "Cut ratio {:.1}% exceeds the maximum of {:.1}%",
            cut_ratio * 100.0,
            policy.max_cut_ratio * 100.0
        ));
    }

    if trim_point < policy.safety_margin {
        result.error(format!(
            "Trimmed size {} is inside the safety margin of {} bytes",
            trim_point, policy.safety_margin
        ));
    }

    match format {
        RomFormat::Gba => check_gba_structure(data, trim_point, &mut result),
        RomFormat::Nds => check_nds_structure(data, trim_point, &mut result),
        RomFormat::GameBoy => check_gb_structure(trim_point, &mut result),
        RomFormat::Unknown => {}
    }

    if let Some(marker) = straddled_marker(data, trim_point) {
        result.error(format!(
            "Trim point cuts through known structure \"{}\"",
            marker
        ));
    }

    check_header_checksum(data, format, &mut result);

    result
}

fn cut_ratio(len: usize, trim_point: usize) -> f64 {
    1.0 - trim_point as f64 / len as f64
}

fn check_gba_structure(data: &[u8], trim_point: usize, result: &mut ValidationResult) {
    if trim_point < GBA_HEADER_END {
        result.error(format!(
            "Trim point 0x{:X} is inside the GBA header region (0x00-0x{:X})",
            trim_point, GBA_HEADER_END
        ));
    }
    if trim_point > GBA_MAX_SIZE {
        result.error(format!(
            "Trim point {} is beyond the 32 MB GBA address space",
            trim_point
        ));
    }
    if !trim_point.is_multiple_of(0x1000) {
        let end = data.len().min(trim_point + GBA_TAIL_WINDOW);
        let dirty = data[trim_point..end]
            .iter()
            .position(|&b| b != 0x00 && b != 0xFF);
        if let Some(pos) = dirty {
            result.error(format!(
                "Unaligned GBA trim point 0x{:X} is followed by data at 0x{:X}",
                trim_point,
                trim_point + pos
            ));
        }
    }
}

fn check_nds_structure(data: &[u8], trim_point: usize, result: &mut ValidationResult) {
    if data.len() < NDS_HEADER_SIZE {
        result.error("NDS image is smaller than its 512-byte header");
        return;
    }

    let tp = trim_point as u64;
    for (name, offset_at, size_at) in [("ARM9", 0x20, 0x2C), ("ARM7", 0x30, 0x3C)] {
        let offset = read_u32_le(data, offset_at).map_or(0, u64::from);
        let size = read_u32_le(data, size_at).map_or(0, u64::from);
        if tp > offset && tp < offset + size {
            result.error(format!(
                "Trim point 0x{:X} overlaps the {} binary (0x{:X}-0x{:X})",
                trim_point,
                name,
                offset,
                offset + size
            ));
        }
    }

    if !trim_point.is_multiple_of(0x200) {
        result.error(format!(
            "Trim point 0x{:X} is not aligned to the 512-byte NDS sector size",
            trim_point
        ));
    }
}

fn check_gb_structure(trim_point: usize, result: &mut ValidationResult) {
    let canonical = GB_SIZES
        .iter()
        .any(|&size| trim_point.abs_diff(size) as f64 <= size as f64 * 0.01);
    if !canonical {
        result.error(format!(
            "Trimmed size {} is not a standard Game Boy cartridge size",
            trim_point
        ));
    }
}

/// First marker whose bytes cross `trim_point` or end exactly on it.
fn straddled_marker(data: &[u8], trim_point: usize) -> Option<&'static str> {
    KNOWN_MARKERS.into_iter().find(|marker| {
        let needle = marker.as_bytes();
        let lo = trim_point.saturating_sub(needle.len());
        let hi = data
            .len()
            .min(trim_point.saturating_add(needle.len() - 1));
        data.get(lo..hi)
            .is_some_and(|window| window.windows(needle.len()).any(|w| w == needle))
    })
}

// ---------------------------------------------------------------------------
// Header checksums (advisory)
// ---------------------------------------------------------------------------

fn check_header_checksum(data: &[u8], format: RomFormat, result: &mut ValidationResult) {
    let mismatch = match format {
        RomFormat::Gba => gba_complement(data).map(|c| (c as u32, data[0xBD] as u32)),
        RomFormat::GameBoy => gb_header_checksum(data).map(|c| (c as u32, data[0x14D] as u32)),
        RomFormat::Nds => nds_header_crc(data)
            .zip(read_u16_le(data, 0x15E))
            .map(|(c, stored)| (c as u32, stored as u32)),
        RomFormat::Unknown => None,
    };
    if let Some((computed, stored)) = mismatch
        && computed != stored
    {
        log::debug!(
            "{} header checksum mismatch: computed 0x{:X}, stored 0x{:X}",
            format.short_name(),
            computed,
            stored
        );
        result.warn(format!(
            "{} header checksum does not match (stored 0x{:X}, computed 0x{:X})",
            format.short_name(),
            stored,
            computed
        ));
    }
}

/// GBA complement check over 0xA0..=0xBC, stored at 0xBD.
pub fn gba_complement(data: &[u8]) -> Option<u8> {
    let header = data.get(0xA0..=0xBD)?;
    let sum = header[..0x1D]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    Some((sum as i8).wrapping_neg().wrapping_sub(0x19) as u8)
}

/// Game Boy header checksum over 0x134..=0x14C, stored at 0x14D.
pub fn gb_header_checksum(data: &[u8]) -> Option<u8> {
    let header = data.get(0x134..=0x14D)?;
    Some(
        header[..0x19]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1)),
    )
}

/// NDS header CRC-16 over 0x000..0x15E, stored at 0x15E.
pub fn nds_header_crc(data: &[u8]) -> Option<u16> {
    let header = data.get(..0x160)?;
    Some(crc16(&header[..0x15E]))
}

fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

/// Estimate how likely a trim is to destroy real data. Advisory only.
pub fn assess_risk(data: &[u8], trim_point: usize, format: RomFormat) -> RiskAssessment {
    if data.is_empty() {
        return RiskAssessment {
            level: RiskLevel::Critical,
            data_loss_probability: 1.0,
            factors: vec!["empty data".to_string()],
        };
    }

    let ratio = cut_ratio(data.len(), trim_point.min(data.len()));
    let mut level = RiskLevel::from_cut_ratio(ratio);
    let mut factors = Vec::new();

    if ratio > 0.5 {
        factors.push(format!("large cut ({:.1}%)", ratio * 100.0));
    }
    if straddled_marker(data, trim_point).is_some() {
        level = level.escalate();
        factors.push("structure conflict".to_string());
    }
    if trim_point < format.recommended_size() {
        level = level.escalate();
        factors.push(format!(
            "below recommended size ({})",
            format_bytes(format.recommended_size() as u64)
        ));
    }

    RiskAssessment {
        level,
        data_loss_probability: (ratio * 1.5).min(1.0),
        factors,
    }
}

#[cfg(test)]
#[path = "tests/safety_tests.rs"]
mod tests;
