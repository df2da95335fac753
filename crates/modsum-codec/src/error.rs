//! Error types for summary decoding

use thiserror::Error;

/// Errors from decoding a summary byte stream
///
/// Every variant carries the byte offset at which the problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// E-CODEC-001: A declared length or varint runs past the available bytes
    #[error("truncated stream at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        offset: usize,
        needed: u64,
        available: usize,
    },

    /// E-CODEC-002: Signature or module framing is wrong
    #[error("malformed header at offset {offset}: {reason}")]
    MalformedHeader { offset: usize, reason: String },

    /// E-CODEC-003: Produced by a newer, possibly incompatible format
    #[error("summary format version {found} is newer than supported version {supported}")]
    VersionMismatch {
        offset: usize,
        found: u64,
        supported: u64,
    },

    /// E-CODEC-004: A known record is well framed but its contents are invalid
    #[error("malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },
}

impl CodecError {
    /// Byte offset where decoding stopped
    pub fn offset(&self) -> usize {
        match self {
            CodecError::TruncatedStream { offset, .. }
            | CodecError::MalformedHeader { offset, .. }
            | CodecError::VersionMismatch { offset, .. }
            | CodecError::MalformedRecord { offset, .. } => *offset,
        }
    }

    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::TruncatedStream { .. } => "E-CODEC-001",
            CodecError::MalformedHeader { .. } => "E-CODEC-002",
            CodecError::VersionMismatch { .. } => "E-CODEC-003",
            CodecError::MalformedRecord { .. } => "E-CODEC-004",
        }
    }

    /// Whether regenerating the file with a current toolchain would fix it
    pub fn needs_regeneration(&self) -> bool {
        matches!(self, CodecError::VersionMismatch { .. })
    }
}
