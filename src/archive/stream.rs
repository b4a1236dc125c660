//! Per-entry seekable byte streams
//!
//! Stored entries are forwarded straight from the shared source. Compressed
//! entries are served one block at a time through a single-block cache, so
//! a read that spans several blocks decompresses each of them in turn.

use crate::archive::decompress::Decompressor;
use crate::archive::entry::Entry;
use crate::archive::source::{read_full, ByteSource};
use crate::error::{PakError, Result};
use std::cell::RefCell;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::trace;

/// Most recently decompressed block of a compressed entry
struct BlockCache {
    /// Logical offset of the first byte in `data`
    start: u64,
    data: Vec<u8>,
}

impl BlockCache {
    fn contains(&self, position: u64, block_size: u64) -> bool {
        position >= self.start && position < self.start + block_size
    }
}

/// Read/seek view of one archive entry
///
/// Borrows the entry and the archive's byte source. The source cursor is
/// repositioned on every read, so several readers may share it as long as
/// they are driven from one thread.
pub struct EntryStreamReader<'a, S: ByteSource + ?Sized> {
    entry: &'a Entry,
    source: &'a RefCell<S>,
    decompressor: &'a dyn Decompressor,
    position: u64,
    stopper: Option<u64>,
    cache: Option<BlockCache>,
    scratch: Vec<u8>,
}

impl<'a, S: ByteSource + ?Sized> EntryStreamReader<'a, S> {
    pub(crate) fn new(
        entry: &'a Entry,
        source: &'a RefCell<S>,
        decompressor: &'a dyn Decompressor,
    ) -> Self {
        Self {
            entry,
            source,
            decompressor,
            position: 0,
            stopper: None,
            cache: None,
            scratch: Vec::new(),
        }
    }

    pub fn entry(&self) -> &'a Entry {
        self.entry
    }

    /// Uncompressed size of the entry
    pub fn len(&self) -> u64 {
        self.entry.uncompressed_size as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Limit reads to logical offsets below `stopper`.
    ///
    /// A stopper of zero disables the limit, the same as `None`.
    pub fn set_stopper(&mut self, stopper: Option<u64>) {
        self.stopper = stopper.filter(|&stopper| stopper > 0);
    }

    pub fn stopper(&self) -> Option<u64> {
        self.stopper
    }

    /// Move to `pos`, which must lie inside the entry
    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        if pos >= self.len() {
            return Err(PakError::SeekOutOfRange {
                pos,
                size: self.len(),
            });
        }
        self.position = pos;
        Ok(())
    }

    /// Read into `buf` from the current position.
    ///
    /// Reads are clamped to the end of the entry; the number of bytes
    /// delivered is returned. After an error the position is unspecified.
    ///
    /// # Panics
    ///
    /// Panics if the request extends past the stopper set with
    /// [`set_stopper`](Self::set_stopper).
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let Some(stopper) = self.stopper.filter(|_| !buf.is_empty()) {
            let end = self.position + buf.len() as u64;
            if end > stopper {
                panic!(
                    "Reading behind stopper ({:#x}+{:#x} > {:#x}) in {}",
                    self.position,
                    buf.len(),
                    stopper,
                    self.entry.name
                );
            }
        }

        let remaining = self.len().saturating_sub(self.position);
        let count = (buf.len() as u64).min(remaining) as usize;
        if count == 0 {
            return Ok(0);
        }

        let out = &mut buf[..count];
        if self.entry.is_compressed() {
            self.read_compressed(out)?;
        } else {
            self.read_stored(out)?;
        }
        Ok(count)
    }

    /// Check that the declared size of the entry is backed by the archive.
    ///
    /// Stored payloads must end inside the source; compressed entries must
    /// have enough blocks to cover every byte.
    pub fn validate_extent(&self) -> Result<()> {
        let entry = self.entry;
        let backed = if entry.is_compressed() {
            let block_size = entry.compression_block_size.max(0) as u64;
            let blocks = entry.compression_blocks.len() as u64;
            self.len() <= block_size.saturating_mul(blocks)
        } else {
            let archive_len = self.source.borrow_mut().size_in_bytes()?;
            entry.payload_offset().saturating_add(self.len()) <= archive_len
        };
        if !backed {
            return Err(PakError::InvalidFormat(format!(
                "Entry {} declares {} bytes the archive cannot hold",
                entry.name,
                self.len()
            )));
        }
        Ok(())
    }

    /// Fill `buf` completely or fail with [`PakError::ShortRead`]
    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = self.read_bytes(buf)?;
        if n < buf.len() {
            return Err(PakError::ShortRead {
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }

    fn read_stored(&mut self, out: &mut [u8]) -> Result<()> {
        // Always seek: another reader may have moved the shared cursor
        let mut source = self.source.borrow_mut();
        source.seek_to(self.entry.payload_offset() + self.position)?;
        read_full(&mut *source, out)?;
        self.position += out.len() as u64;
        Ok(())
    }

    fn read_compressed(&mut self, out: &mut [u8]) -> Result<()> {
        let block_size = self.entry.compression_block_size;
        if block_size <= 0 {
            return Err(PakError::InvalidFormat(format!(
                "Compressed entry {} has no block table",
                self.entry.name
            )));
        }
        let block_size = block_size as u64;

        let mut written = 0;
        while written < out.len() {
            let block_index = (self.position / block_size) as usize;
            let cache = match self.cache.take() {
                Some(cache) if cache.contains(self.position, block_size) => cache,
                stale => self.load_block(block_index, stale.map(|c| c.data).unwrap_or_default())?,
            };

            let offset = (self.position - cache.start) as usize;
            let n = (out.len() - written).min(cache.data.len() - offset);
            out[written..written + n].copy_from_slice(&cache.data[offset..offset + n]);
            self.cache = Some(cache);

            self.position += n as u64;
            written += n;
        }
        Ok(())
    }

    fn load_block(&mut self, index: usize, mut data: Vec<u8>) -> Result<BlockCache> {
        let entry = self.entry;
        let block = entry.compression_blocks.get(index).ok_or_else(|| {
            PakError::InvalidFormat(format!(
                "Block {} missing from {} ({} blocks)",
                index,
                entry.name,
                entry.compression_blocks.len()
            ))
        })?;
        let compressed_len = block.compressed_len()?;
        let start = u64::try_from(block.compressed_start).map_err(|_| {
            PakError::InvalidFormat(format!("Negative block offset in {}", entry.name))
        })?;

        {
            let mut source = self.source.borrow_mut();
            if start.saturating_add(compressed_len as u64) > source.size_in_bytes()? {
                return Err(PakError::InvalidFormat(format!(
                    "Block {} of {} lies outside the archive",
                    index, entry.name
                )));
            }
            self.scratch.resize(compressed_len, 0);
            source.seek_to(start)?;
            read_full(&mut *source, &mut self.scratch)?;
        }

        data.resize(entry.block_uncompressed_len(index) as usize, 0);
        self.decompressor
            .decompress(entry.compression_method, &self.scratch, &mut data)?;

        trace!(
            entry = %entry.name,
            block = index,
            compressed = compressed_len,
            uncompressed = data.len(),
            "Decompressed block"
        );

        Ok(BlockCache {
            start: index as u64 * entry.compression_block_size as u64,
            data,
        })
    }
}

/// io-style reads stop at the stopper instead of panicking
impl<S: ByteSource + ?Sized> Read for EntryStreamReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = match self.stopper {
            Some(stopper) => stopper.saturating_sub(self.position),
            None => buf.len() as u64,
        };
        let n = (buf.len() as u64).min(limit) as usize;
        if n == 0 {
            return Ok(0);
        }
        Ok(self.read_bytes(&mut buf[..n])?)
    }
}

/// The end of the entry is a valid io position; anything past it is not
impl<S: ByteSource + ?Sized> Seek for EntryStreamReader<'_, S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };
        match target {
            Some(target) if target == self.len() => {
                self.position = target;
                Ok(target)
            }
            Some(target) => {
                self.seek_to(target)?;
                Ok(target)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            )),
        }
    }
}
