//! Error types for the codec and project sync layers.
//!
//! Store mutations never fail: an unknown id is a logged no-op. Only reading,
//! writing and decoding project files surface errors to the caller.

use thiserror::Error;

/// Errors raised while validating or decoding an `.lf` container.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Buffer is shorter than the fixed header.
    #[error("Invalid .lf file: too short ({len} bytes)")]
    TooShort { len: usize },

    /// First four bytes are not `LYRA`.
    #[error("Invalid .lf file: missing LYRA header")]
    BadMagic,

    /// Container version is newer than this build understands.
    #[error("Unsupported .lf format version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("Failed to compress data: {0}")]
    Compress(#[source] std::io::Error),

    #[error("Failed to decompress data: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Invalid UTF-8 data: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised by project load/save orchestration.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document is structurally unusable (e.g. root is not an object).
    #[error("Invalid project document: {reason}")]
    InvalidDocument { reason: String },

    #[error("Migration from container version {from} failed: {reason}")]
    Migration { from: u8, reason: String },

    /// A blocking I/O task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Runtime(String),
}

pub type SyncResult<T> = Result<T, SyncError>;
