use thiserror::Error;

/// Errors from reading, decoding or applying a restoration patch.
#[derive(Debug, Error)]
pub enum PatchError {
    /// I/O error while reading or writing a patch file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record does not start with the `RTPT` magic
    #[error("Not a restoration patch: bad magic 0x{found:08X}")]
    BadMagic { found: u32 },

    /// The encoded data ends before the header or payload does
    #[error("Patch truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    /// A payload byte differs from the declared padding byte
    #[error("Patch payload mismatch at offset {offset}")]
    PayloadMismatch { offset: u64 },
}
