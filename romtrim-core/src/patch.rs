//! Restoration patches for trimmed images.
//!
//! A patch records only the padding byte and how many copies of it were
//! removed. The on-disk layout is:
//!
//! | offset | size   | field                                  |
//! |--------|--------|----------------------------------------|
//! | 0      | 4      | magic `"RTPT"` (u32 LE `0x54505452`)   |
//! | 4      | 1      | padding byte                           |
//! | 5      | 4      | payload length (u32 LE)                |
//! | 9      | length | padding byte, repeated                 |
//!
//! The patch carries no fingerprint of the base image, so applying it to
//! the wrong trimmed file goes unnoticed.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PatchError;
use crate::util::read_u32_le;

/// `"RTPT"` read as a little-endian u32.
pub const PATCH_MAGIC: u32 = 0x5450_5452;

/// Magic, padding byte and length.
pub const PATCH_HEADER_LEN: usize = 9;

/// Default extension appended to a ROM path for its patch file.
pub const PATCH_EXTENSION: &str = "rtpt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorationPatch {
    pub magic: u32,
    pub padding_byte: u8,
    pub length: u32,
}

impl RestorationPatch {
    /// Build a patch describing how `trimmed` was cut from `original`.
    ///
    /// Returns `None` when nothing was removed, when the removed suffix is
    /// not entirely `padding_byte`, or when it is too long to encode.
    pub fn create(original: &[u8], trimmed: &[u8], padding_byte: u8) -> Option<Self> {
        if original.len() <= trimmed.len() {
            return None;
        }
        let removed = &original[trimmed.len()..];
        if removed.iter().any(|&b| b != padding_byte) {
            return None;
        }
        let length = u32::try_from(removed.len()).ok()?;
        Some(Self {
            magic: PATCH_MAGIC,
            padding_byte,
            length,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.magic == PATCH_MAGIC
    }

    /// Size of the encoded record in bytes.
    pub fn encoded_len(&self) -> u64 {
        PATCH_HEADER_LEN as u64 + u64::from(self.length)
    }

    /// Encode the full record, payload included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len() as usize);
        out.extend_from_slice(&self.header());
        out.resize(out.len() + self.length as usize, self.padding_byte);
        out
    }

    /// Decode a record, verifying its size, magic and payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PatchError> {
        let patch = Self::decode_header(bytes)?;
        let expected = patch.encoded_len();
        if (bytes.len() as u64) < expected {
            return Err(PatchError::Truncated {
                expected,
                actual: bytes.len() as u64,
            });
        }

        let payload = &bytes[PATCH_HEADER_LEN..expected as usize];
        if let Some(pos) = payload.iter().position(|&b| b != patch.padding_byte) {
            return Err(PatchError::PayloadMismatch { offset: pos as u64 });
        }
        Ok(patch)
    }

    /// Write the encoded record to `path`.
    pub fn save(&self, path: &Path) -> Result<(), PatchError> {
        let mut writer = BufWriter::new(std::fs::File::create(path)?);
        writer.write_all(&self.header())?;

        let chunk = [self.padding_byte; 64 * 1024];
        let mut remaining = self.length as usize;
        while remaining > 0 {
            let n = remaining.min(chunk.len());
            writer.write_all(&chunk[..n])?;
            remaining -= n;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read and verify a patch file.
    pub fn load(path: &Path) -> Result<Self, PatchError> {
        let mut bytes = Vec::new();
        BufReader::new(std::fs::File::open(path)?).read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    fn header(&self) -> [u8; PATCH_HEADER_LEN] {
        let mut header = [0u8; PATCH_HEADER_LEN];
        header[0..4].copy_from_slice(&self.magic.to_le_bytes());
        header[4] = self.padding_byte;
        header[5..9].copy_from_slice(&self.length.to_le_bytes());
        header
    }

    fn decode_header(bytes: &[u8]) -> Result<Self, PatchError> {
        let truncated = || PatchError::Truncated {
            expected: PATCH_HEADER_LEN as u64,
            actual: bytes.len() as u64,
        };
        let magic = read_u32_le(bytes, 0).ok_or_else(truncated)?;
        if magic != PATCH_MAGIC {
            return Err(PatchError::BadMagic { found: magic });
        }
        let length = read_u32_le(bytes, 5).ok_or_else(truncated)?;
        Ok(Self {
            magic,
            padding_byte: bytes[4],
            length,
        })
    }
}

/// Rebuild the original image: `trimmed` followed by `length` copies of the
/// padding byte. `trimmed` is never modified.
pub fn apply_restoration_patch(
    trimmed: &[u8],
    patch: &RestorationPatch,
) -> Result<Vec<u8>, PatchError> {
    if !patch.is_valid() {
        return Err(PatchError::BadMagic { found: patch.magic });
    }
    let mut restored = Vec::with_capacity(trimmed.len() + patch.length as usize);
    restored.extend_from_slice(trimmed);
    restored.resize(trimmed.len() + patch.length as usize, patch.padding_byte);
    Ok(restored)
}

#[cfg(test)]
#[path = "tests/patch_tests.rs"]
mod tests;
