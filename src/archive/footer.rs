use crate::archive::format::{
    read_i32, read_i64, read_u8, PakVersion, FOOTER_SIZE, HASH_LENGTH, PAK_FILE_MAGIC,
};
use crate::archive::source::{read_full, ByteSource};
use crate::error::Result;
use std::io::Read;
use tracing::debug;

/// Trailing pak footer
///
/// Located in the last `FOOTER_SIZE` bytes of the archive. Fields added by
/// later format versions are stored *before* the legacy fields, so the
/// block is always parsed new-fields-first:
/// - Encrypted index flag: uint8 (1 byte)
/// - Magic: uint32 (4 bytes)
/// - Version: int32 (4 bytes)
/// - Index offset: int64 (8 bytes)
/// - Index size: int64 (8 bytes)
/// - Index hash: SHA-1 (20 bytes, not verified)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub version: PakVersion,
    pub index_offset: i64,
    pub index_size: i64,
    pub index_hash: [u8; HASH_LENGTH],
    pub encrypted_index: bool,
}

impl Footer {
    /// Parse a footer block.
    ///
    /// Returns `Ok(None)` when the magic does not match (some other format).
    /// A recognised footer with an unknown version is an error.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Option<Self>> {
        // New fields
        let encrypted_index = read_u8(&mut reader)? != 0;

        // Legacy fields
        let magic = read_i32(&mut reader)? as u32;
        let raw_version = read_i32(&mut reader)?;
        let index_offset = read_i64(&mut reader)?;
        let index_size = read_i64(&mut reader)?;
        let mut index_hash = [0u8; HASH_LENGTH];
        reader.read_exact(&mut index_hash)?;

        if magic != PAK_FILE_MAGIC {
            return Ok(None);
        }

        let version = PakVersion::from_i32(raw_version)?;

        Ok(Some(Self {
            version,
            index_offset,
            index_size,
            index_hash,
            // Older versions leave this byte undefined
            encrypted_index: encrypted_index && version.layout().encrypted_index,
        }))
    }

    /// Read the footer from the end of a byte source
    pub fn locate<S: ByteSource + ?Sized>(source: &mut S) -> Result<Option<Self>> {
        let file_size = source.size_in_bytes()?;
        if file_size < FOOTER_SIZE as u64 {
            return Ok(None);
        }

        let mut block = [0u8; FOOTER_SIZE];
        source.seek_to(file_size - FOOTER_SIZE as u64)?;
        read_full(source, &mut block)?;

        let footer = Self::read_from(&block[..])?;
        if let Some(footer) = &footer {
            debug!(
                version = footer.version.as_i32(),
                index_offset = footer.index_offset,
                index_size = footer.index_size,
                encrypted_index = footer.encrypted_index,
                "Found pak footer"
            );
        }
        Ok(footer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PakError;
    use std::io::Cursor;

    fn footer_bytes(encrypted: u8, magic: u32, version: i32) -> Vec<u8> {
        let mut buf = vec![encrypted];
        buf.extend_from_slice(&magic.to_le_bytes());
        buf.extend_from_slice(&version.to_le_bytes());
        buf.extend_from_slice(&1024i64.to_le_bytes());
        buf.extend_from_slice(&300i64.to_le_bytes());
        buf.extend_from_slice(&[0xAB; HASH_LENGTH]);
        buf
    }

    #[test]
    fn test_footer_size() {
        assert_eq!(FOOTER_SIZE, 45);
        assert_eq!(footer_bytes(0, PAK_FILE_MAGIC, 3).len(), FOOTER_SIZE);
    }

    #[test]
    fn test_parse_footer() {
        let buf = footer_bytes(0, PAK_FILE_MAGIC, 3);
        let footer = Footer::read_from(&buf[..]).unwrap().unwrap();
        assert_eq!(footer.version, PakVersion::CompressionEncryption);
        assert_eq!(footer.index_offset, 1024);
        assert_eq!(footer.index_size, 300);
        assert_eq!(footer.index_hash, [0xAB; HASH_LENGTH]);
        assert!(!footer.encrypted_index);
    }

    #[test]
    fn test_wrong_magic_is_not_an_error() {
        let buf = footer_bytes(0, 0xDEAD_BEEF, 3);
        assert!(Footer::read_from(&buf[..]).unwrap().is_none());
    }

    #[test]
    fn test_wrong_magic_wins_over_bad_version() {
        let buf = footer_bytes(0, 0xDEAD_BEEF, 99);
        assert!(Footer::read_from(&buf[..]).unwrap().is_none());
    }

    #[test]
    fn test_future_version_is_fatal() {
        let buf = footer_bytes(0, PAK_FILE_MAGIC, PakVersion::LATEST.as_i32() + 1);
        assert!(matches!(
            Footer::read_from(&buf[..]),
            Err(PakError::UnsupportedVersion(5))
        ));
    }

    #[test]
    fn test_encrypted_index_flag_gated_by_version() {
        let buf = footer_bytes(1, PAK_FILE_MAGIC, 4);
        assert!(Footer::read_from(&buf[..]).unwrap().unwrap().encrypted_index);

        let buf = footer_bytes(1, PAK_FILE_MAGIC, 3);
        assert!(!Footer::read_from(&buf[..]).unwrap().unwrap().encrypted_index);
    }

    #[test]
    fn test_locate_at_end_of_source() {
        let mut data = vec![0x55u8; 100];
        data.extend_from_slice(&footer_bytes(0, PAK_FILE_MAGIC, 4));
        let mut source = Cursor::new(data);
        let footer = Footer::locate(&mut source).unwrap().unwrap();
        assert_eq!(footer.version, PakVersion::IndexEncryption);
    }

    #[test]
    fn test_locate_in_tiny_source() {
        let mut source = Cursor::new(vec![0u8; 10]);
        assert!(Footer::locate(&mut source).unwrap().is_none());
    }
}
