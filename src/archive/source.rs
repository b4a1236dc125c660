//! Random-access byte sources
//!
//! The archive never owns a cursor of its own: every read is preceded by an
//! explicit seek, so any number of entry readers can share one source.

use crate::error::{PakError, Result};
use std::io::{self, Read, Seek, SeekFrom};

/// Seekable, readable backing store for an archive
pub trait ByteSource {
    /// Move the cursor to an absolute offset
    fn seek_to(&mut self, offset: u64) -> io::Result<()>;

    /// Read up to `buf.len()` bytes at the cursor
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Total length of the source
    fn size_in_bytes(&mut self) -> io::Result<u64>;
}

impl<T: Read + Seek> ByteSource for T {
    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    fn size_in_bytes(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::End(0))
    }
}

/// Fill `buf` completely from the current cursor position
pub fn read_full<S: ByteSource + ?Sized>(source: &mut S, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read_bytes(&mut buf[filled..]) {
            Ok(0) => {
                return Err(PakError::ShortRead {
                    expected: buf.len(),
                    actual: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
