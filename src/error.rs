use std::io;
use thiserror::Error;

/// Result type for pak operations
pub type Result<T> = std::result::Result<T, PakError>;

/// Unified error type for all pak operations
#[derive(Debug, Error)]
pub enum PakError {
    // Archive errors
    #[error("Invalid archive format: {0}")]
    InvalidFormat(String),

    #[error("Pak file has unsupported version {0}")]
    UnsupportedVersion(i32),

    #[error("Invalid string in index: {0}")]
    InvalidString(String),

    #[error("Archive is not attached")]
    NotAttached,

    // Stream errors
    #[error("Unsupported compression method: {0:#x}")]
    UnsupportedCompression(i32),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Seek to {pos} outside of entry of size {size}")]
    SeekOutOfRange { pos: u64, size: u64 },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<toml::de::Error> for PakError {
    fn from(err: toml::de::Error) -> Self {
        PakError::Config(err.to_string())
    }
}

impl From<PakError> for io::Error {
    fn from(err: PakError) -> Self {
        match err {
            PakError::Io(inner) => inner,
            PakError::SeekOutOfRange { .. } => io::Error::new(io::ErrorKind::InvalidInput, err),
            PakError::ShortRead { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
