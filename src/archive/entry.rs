use crate::archive::format::{read_i32, read_i64, read_u8, PakVersion, HASH_LENGTH};
use crate::config::DEFAULT_MAX_BLOCK_SIZE;
use crate::error::{PakError, Result};
use std::io::{self, Read};

/// Compressed byte range of one block, absolute within the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionBlock {
    pub compressed_start: i64,
    pub compressed_end: i64,
}

impl CompressionBlock {
    pub fn compressed_len(&self) -> Result<usize> {
        usize::try_from(self.compressed_end - self.compressed_start).map_err(|_| {
            PakError::InvalidFormat(format!(
                "Compression block ends before it starts ({}..{})",
                self.compressed_start, self.compressed_end
            ))
        })
    }
}

/// Options applied while decoding entry records
#[derive(Debug, Clone, Copy)]
pub struct EntryOptions {
    /// Force `encrypted` to false after decoding
    pub ignore_encryption: bool,
    /// Largest accepted uncompressed block size
    pub max_block_size: usize,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            ignore_encryption: false,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }
}

/// Index entry for one file stored in the archive
///
/// The same record (without the name) is duplicated in front of the file's
/// payload, which is why the exact size of the parsed record is kept.
///
/// Structure (variable length):
/// - Data offset: int64 (8 bytes)
/// - Compressed size: int64 (8 bytes)
/// - Uncompressed size: int64 (8 bytes)
/// - Compression method: int32 (4 bytes)
/// - Timestamp: int64 (8 bytes, version 1 only, ignored)
/// - Hash: SHA-1 (20 bytes)
/// - Version 3+: block count + blocks (only when compressed), encrypted flag (1 byte),
///   compression block size (4 bytes)
#[derive(Debug, Clone)]
pub struct Entry {
    /// Mount point joined with the stored file name
    pub name: String,
    pub data_offset: i64,
    pub compressed_size: i64,
    pub uncompressed_size: i64,
    pub compression_method: i32,
    pub content_hash: [u8; HASH_LENGTH],
    pub encrypted: bool,
    pub compression_blocks: Vec<CompressionBlock>,
    pub compression_block_size: i32,
    /// Bytes occupied by this record when it was parsed
    pub header_record_size: u32,
}

impl Entry {
    /// Decode one entry record for the given format version.
    ///
    /// The name is read separately by the index, since it is absent from the
    /// copy of the record stored next to the payload.
    pub fn read_from<R: Read>(
        reader: R,
        name: String,
        version: PakVersion,
        options: EntryOptions,
    ) -> Result<Self> {
        let mut reader = CountingReader::new(reader);
        let layout = version.layout();

        let data_offset = read_i64(&mut reader)?;
        let compressed_size = read_i64(&mut reader)?;
        let uncompressed_size = read_i64(&mut reader)?;
        let compression_method = read_i32(&mut reader)?;

        if layout.timestamp {
            let _timestamp = read_i64(&mut reader)?;
        }

        let mut content_hash = [0u8; HASH_LENGTH];
        reader.read_exact(&mut content_hash)?;

        let mut compression_blocks = Vec::new();
        let mut encrypted = false;
        let mut compression_block_size = 0;
        if layout.compression_fields {
            if compression_method != 0 {
                let count = read_i32(&mut reader)?;
                if count < 0 {
                    return Err(PakError::InvalidFormat(format!(
                        "Negative compression block count {} for {}",
                        count, name
                    )));
                }
                compression_blocks.reserve((count as usize).min(4096));
                for _ in 0..count {
                    let compressed_start = read_i64(&mut reader)?;
                    let compressed_end = read_i64(&mut reader)?;
                    compression_blocks.push(CompressionBlock {
                        compressed_start,
                        compressed_end,
                    });
                }
            }
            encrypted = read_u8(&mut reader)? != 0;
            compression_block_size = read_i32(&mut reader)?;
        }

        if options.ignore_encryption {
            encrypted = false;
        }

        if data_offset < 0 || compressed_size < 0 || uncompressed_size < 0 {
            return Err(PakError::InvalidFormat(format!(
                "Negative offset or size in entry {}",
                name
            )));
        }
        if compression_method != 0 && layout.compression_fields && compression_block_size <= 0 {
            return Err(PakError::InvalidFormat(format!(
                "Compressed entry {} has block size {}",
                name, compression_block_size
            )));
        }
        if compression_method != 0
            && compression_block_size as u64 > options.max_block_size as u64
        {
            return Err(PakError::InvalidFormat(format!(
                "Compressed entry {} has block size {} above the limit of {}",
                name, compression_block_size, options.max_block_size
            )));
        }

        let header_record_size = u32::try_from(reader.consumed())
            .map_err(|_| PakError::InvalidFormat(format!("Oversized record for {}", name)))?;

        Ok(Self {
            name,
            data_offset,
            compressed_size,
            uncompressed_size,
            compression_method,
            content_hash,
            encrypted,
            compression_blocks,
            compression_block_size,
            header_record_size,
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.compression_method != 0
    }

    /// Absolute offset of stored (uncompressed) payload bytes
    pub fn payload_offset(&self) -> u64 {
        self.data_offset as u64 + self.header_record_size as u64
    }

    /// Uncompressed length of block `index`; the last block may be short
    pub fn block_uncompressed_len(&self, index: usize) -> u64 {
        let block_size = self.compression_block_size.max(0) as u64;
        let start = block_size * index as u64;
        block_size.min((self.uncompressed_size as u64).saturating_sub(start))
    }

    /// Hex form of the stored content hash, for diagnostics
    pub fn content_hash_hex(&self) -> String {
        hex::encode(self.content_hash)
    }
}

/// Tracks how many bytes a record consumed
struct CountingReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}
