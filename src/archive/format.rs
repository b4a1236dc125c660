use crate::error::{PakError, Result};
use std::io::Read;

/// Magic number stored in the pak footer
pub const PAK_FILE_MAGIC: u32 = 0x5A6F_12E1;

/// Footer size in bytes (fixed for every supported version)
///
/// Layout: `[encrypted_index:1][magic:4][version:4][index_offset:8][index_size:8][index_hash:20]`
pub const FOOTER_SIZE: usize = 1 + 4 + 4 + 8 + 8 + 20;

/// Size of the SHA-1 digests stored in the footer and in each entry
pub const HASH_LENGTH: usize = 20;

/// Pak format versions understood by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum PakVersion {
    Initial = 1,
    NoTimestamps = 2,
    CompressionEncryption = 3,
    IndexEncryption = 4,
}

/// Optional fields present in a given format version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// 8-byte legacy timestamp after the compression method
    pub timestamp: bool,
    /// Block table, `encrypted` flag and block size after the hash
    pub compression_fields: bool,
    /// Footer `encrypted_index` byte is meaningful
    pub encrypted_index: bool,
}

impl PakVersion {
    /// Highest version this crate can parse
    pub const LATEST: PakVersion = PakVersion::IndexEncryption;

    pub fn from_i32(value: i32) -> Result<Self> {
        match value {
            1 => Ok(Self::Initial),
            2 => Ok(Self::NoTimestamps),
            3 => Ok(Self::CompressionEncryption),
            4 => Ok(Self::IndexEncryption),
            _ => Err(PakError::UnsupportedVersion(value)),
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Compatibility matrix: which optional fields each version carries
    pub fn layout(self) -> RecordLayout {
        match self {
            Self::Initial => RecordLayout {
                timestamp: true,
                compression_fields: false,
                encrypted_index: false,
            },
            Self::NoTimestamps => RecordLayout {
                timestamp: false,
                compression_fields: false,
                encrypted_index: false,
            },
            Self::CompressionEncryption => RecordLayout {
                timestamp: false,
                compression_fields: true,
                encrypted_index: false,
            },
            Self::IndexEncryption => RecordLayout {
                timestamp: false,
                compression_fields: true,
                encrypted_index: true,
            },
        }
    }
}

/// Read a length-prefixed string.
///
/// A positive length counts single-byte (Latin-1) characters, a negative one
/// counts UTF-16LE code units; both include a trailing NUL which is dropped.
pub fn read_fstring<R: Read>(mut reader: R, max_length: usize) -> Result<String> {
    let length = read_i32(&mut reader)?;
    if length == 0 {
        return Ok(String::new());
    }

    let units = length.unsigned_abs() as usize;
    if units > max_length {
        return Err(PakError::InvalidString(format!(
            "String length {} exceeds limit of {}",
            units, max_length
        )));
    }

    let mut text = if length > 0 {
        let mut bytes = vec![0u8; units];
        reader.read_exact(&mut bytes)?;
        bytes.into_iter().map(char::from).collect::<String>()
    } else {
        let mut bytes = vec![0u8; units * 2];
        reader.read_exact(&mut bytes)?;
        let wide: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&wide)
            .map_err(|e| PakError::InvalidString(format!("Invalid UTF-16 string: {}", e)))?
    };

    if text.ends_with('\0') {
        text.pop();
    }
    Ok(text)
}

// Helper functions for reading primitive types
pub(crate) fn read_u8<R: Read>(mut reader: R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_i32<R: Read>(mut reader: R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub(crate) fn read_i64<R: Read>(mut reader: R) -> Result<i64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}
