use crate::config::CustomCodec;
use crate::error::{PakError, Result};
use flate2::read::{GzDecoder, ZlibDecoder};
use std::io::Read;

/// Stored without compression
pub const COMPRESS_NONE: i32 = 0x00;
pub const COMPRESS_ZLIB: i32 = 0x01;
pub const COMPRESS_GZIP: i32 = 0x02;
/// Title-specific codec, see [`CustomCodec`]
pub const COMPRESS_CUSTOM: i32 = 0x04;
/// Hint flags that may accompany a method id; they do not change the codec
pub const COMPRESS_BIAS_MEMORY: i32 = 0x10;
pub const COMPRESS_BIAS_SPEED: i32 = 0x20;

const COMPRESS_BIAS_MASK: i32 = COMPRESS_BIAS_MEMORY | COMPRESS_BIAS_SPEED;

/// Decodes one compression block.
///
/// `out` has the exact uncompressed length of the block and must be filled
/// completely.
pub trait Decompressor {
    fn decompress(&self, method: i32, compressed: &[u8], out: &mut [u8]) -> Result<()>;
}

/// zlib and gzip via flate2, plus a configurable custom codec
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDecompressor {
    custom: CustomCodec,
}

impl StandardDecompressor {
    pub fn new(custom: CustomCodec) -> Self {
        Self { custom }
    }

    fn decompress_zlib(compressed: &[u8], out: &mut [u8]) -> Result<()> {
        ZlibDecoder::new(compressed)
            .read_exact(out)
            .map_err(|e| PakError::DecompressionFailed(format!("zlib block: {}", e)))
    }

    fn decompress_gzip(compressed: &[u8], out: &mut [u8]) -> Result<()> {
        GzDecoder::new(compressed)
            .read_exact(out)
            .map_err(|e| PakError::DecompressionFailed(format!("gzip block: {}", e)))
    }

    fn decompress_zstd(compressed: &[u8], out: &mut [u8]) -> Result<()> {
        let written = zstd::bulk::decompress_to_buffer(compressed, out)
            .map_err(|e| PakError::DecompressionFailed(format!("zstd block: {}", e)))?;
        expect_len(written, out.len())
    }

    fn decompress_lz4(compressed: &[u8], out: &mut [u8]) -> Result<()> {
        let written = lz4_flex::block::decompress_into(compressed, out)
            .map_err(|e| PakError::DecompressionFailed(format!("lz4 block: {}", e)))?;
        expect_len(written, out.len())
    }
}

impl Decompressor for StandardDecompressor {
    fn decompress(&self, method: i32, compressed: &[u8], out: &mut [u8]) -> Result<()> {
        match method & !COMPRESS_BIAS_MASK {
            COMPRESS_ZLIB => Self::decompress_zlib(compressed, out),
            COMPRESS_GZIP => Self::decompress_gzip(compressed, out),
            COMPRESS_CUSTOM => match self.custom {
                CustomCodec::Zstd => Self::decompress_zstd(compressed, out),
                CustomCodec::Lz4 => Self::decompress_lz4(compressed, out),
                CustomCodec::None => Err(PakError::UnsupportedCompression(method)),
            },
            _ => Err(PakError::UnsupportedCompression(method)),
        }
    }
}

fn expect_len(written: usize, expected: usize) -> Result<()> {
    if written != expected {
        return Err(PakError::DecompressionFailed(format!(
            "Block size mismatch: expected {}, got {}",
            expected, written
        )));
    }
    Ok(())
}
