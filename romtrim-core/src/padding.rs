//! Trailing padding analysis.
//!
//! Finds where the real data in a ROM image ends and how confident we are
//! that everything after it is filler.

use serde::{Deserialize, Serialize};

use crate::format::RomFormat;

/// Number of trailing bytes inspected for the alternation guard.
const ALTERNATION_WINDOW: usize = 256;

/// Number of trailing bytes sampled by [`auto_detect_padding`].
const AUTO_DETECT_WINDOW: usize = 1024;

const KIB: usize = 1024;
const MIB: usize = 1024 * 1024;

/// Shape of the trailing region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// One contiguous run of the padding byte.
    Continuous,
    /// Padding byte interleaved with its complement; looks like data.
    Alternating,
    /// No recognizable filler at the end.
    Mixed,
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Continuous => "continuous",
            Self::Alternating => "alternating",
            Self::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Result of analyzing a buffer's trailing padding.
///
/// `trim_point` is always `<= len`, and when `has_padding` is false it equals
/// the buffer length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddingReport {
    pub has_padding: bool,
    pub trim_point: usize,
    pub padding_size: usize,
    pub padding_byte: u8,
    pub confidence: f64,
    pub pattern_type: PatternType,
}

impl PaddingReport {
    fn none(len: usize, padding_byte: u8) -> Self {
        Self {
            has_padding: false,
            trim_point: len,
            padding_size: 0,
            padding_byte,
            confidence: 0.0,
            pattern_type: PatternType::Mixed,
        }
    }
}

/// Index of the last byte that differs from `byte`, or `None` if every byte
/// matches (or the buffer is empty).
pub fn find_last_non_padding(data: &[u8], byte: u8) -> Option<usize> {
    data.iter().rposition(|&b| b != byte)
}

/// Analyze the trailing run of `padding_byte` in `data`.
pub fn analyze(data: &[u8], padding_byte: u8) -> PaddingReport {
    let len = data.len();

    let Some(last_data) = find_last_non_padding(data, padding_byte) else {
        // Empty, or nothing but padding: there is no data to keep.
        return PaddingReport::none(len, padding_byte);
    };
    let first_padding = last_data + 1;
    if first_padding == len {
        return PaddingReport::none(len, padding_byte);
    }

    if has_alternating_pattern(data, padding_byte) {
        return PaddingReport {
            confidence: 0.3,
            pattern_type: PatternType::Alternating,
            ..PaddingReport::none(len, padding_byte)
        };
    }

    let confidence = confidence_for(len, first_padding);

    let trim_point = first_padding.next_multiple_of(4).min(len);
    let padding_size = len - trim_point;
    if padding_size == 0 {
        return PaddingReport {
            confidence,
            ..PaddingReport::none(len, padding_byte)
        };
    }

    PaddingReport {
        has_padding: true,
        trim_point,
        padding_size,
        padding_byte,
        confidence,
        pattern_type: PatternType::Continuous,
    }
}

fn confidence_for(len: usize, first_padding: usize) -> f64 {
    let run = len - first_padding;
    let ratio = run as f64 / len as f64;

    let base: f64 = if run < KIB {
        0.5
    } else if ratio > 0.5 {
        0.7
    } else {
        0.9
    };

    // Cartridges are built on round sizes; a data end on one is a good sign.
    if first_padding.is_multiple_of(MIB) {
        (base + 0.1).min(1.0)
    } else if first_padding.is_multiple_of(8 * KIB) {
        (base + 0.05).min(1.0)
    } else if !first_padding.is_multiple_of(4 * KIB) {
        (base - 0.2).max(0.0)
    } else {
        base
    }
}

/// True when the last (up to 256) bytes strictly alternate between
/// `padding_byte` and its complement, which is test-pattern data rather
/// than filler.
pub fn has_alternating_pattern(data: &[u8], padding_byte: u8) -> bool {
    let window = data.len().min(ALTERNATION_WINDOW);
    if window < 4 {
        return false;
    }
    let tail = &data[data.len() - window..];
    let complement = if padding_byte == 0xFF { 0x00 } else { 0xFF };

    let (a, b) = (tail[0], tail[1]);
    let pair_ok = (a == padding_byte && b == complement) || (a == complement && b == padding_byte);
    pair_ok
        && tail
            .iter()
            .enumerate()
            .all(|(i, &byte)| byte == if i % 2 == 0 { a } else { b })
}

/// Pick the likely padding byte for a buffer.
///
/// GBA cartridges are always padded with 0xFF. Everything else takes
/// whichever of 0x00/0xFF is more common in the last KiB, preferring 0xFF
/// on a tie.
pub fn auto_detect_padding(data: &[u8], format: RomFormat) -> u8 {
    if format == RomFormat::Gba {
        return 0xFF;
    }

    let window = data.len().min(AUTO_DETECT_WINDOW);
    let tail = &data[data.len() - window..];
    let ff = tail.iter().filter(|&&b| b == 0xFF).count();
    let zero = tail.iter().filter(|&&b| b == 0x00).count();

    if zero > ff { 0x00 } else { 0xFF }
}

#[cfg(test)]
#[path = "tests/padding_tests.rs"]
mod tests;
