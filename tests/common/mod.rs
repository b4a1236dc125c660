//! Test-only pak writer used to build fixture archives in memory

#![allow(dead_code)]

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use pak_vfs::archive::{COMPRESS_CUSTOM, COMPRESS_GZIP, COMPRESS_ZLIB};
use pak_vfs::PAK_FILE_MAGIC;
use std::io::Write;

/// Codec used for `COMPRESS_CUSTOM` blocks in fixtures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureCodec {
    Zstd,
    Lz4,
}

struct FixtureFile {
    name: String,
    data: Vec<u8>,
    method: i32,
    block_size: usize,
    encrypted: bool,
}

pub struct PakBuilder {
    version: i32,
    magic: u32,
    mount_point: String,
    encrypted_index: bool,
    custom: FixtureCodec,
    files: Vec<FixtureFile>,
}

impl PakBuilder {
    pub fn new(version: i32) -> Self {
        Self {
            version,
            magic: PAK_FILE_MAGIC,
            mount_point: "../../../".to_string(),
            encrypted_index: false,
            custom: FixtureCodec::Zstd,
            files: Vec::new(),
        }
    }

    pub fn mount_point(mut self, mount_point: &str) -> Self {
        self.mount_point = mount_point.to_string();
        self
    }

    pub fn magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    pub fn encrypted_index(mut self) -> Self {
        self.encrypted_index = true;
        self
    }

    pub fn custom_codec(mut self, codec: FixtureCodec) -> Self {
        self.custom = codec;
        self
    }

    pub fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.files.push(FixtureFile {
            name: name.to_string(),
            data: data.to_vec(),
            method: 0,
            block_size: 0,
            encrypted: false,
        });
        self
    }

    pub fn compressed(mut self, name: &str, data: &[u8], method: i32, block_size: usize) -> Self {
        self.files.push(FixtureFile {
            name: name.to_string(),
            data: data.to_vec(),
            method,
            block_size,
            encrypted: false,
        });
        self
    }

    pub fn encrypted(mut self, name: &str, data: &[u8]) -> Self {
        self.files.push(FixtureFile {
            name: name.to_string(),
            data: data.to_vec(),
            method: 0,
            block_size: 0,
            encrypted: true,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pak = Vec::new();
        let mut records = Vec::new();

        for file in &self.files {
            let offset = pak.len() as i64;
            let chunks: Vec<Vec<u8>> = if file.method != 0 {
                file.data
                    .chunks(file.block_size)
                    .map(|chunk| self.compress(file.method, chunk))
                    .collect()
            } else {
                Vec::new()
            };

            // Record size does not depend on block values, only on their count
            let placeholder = vec![(0i64, 0i64); chunks.len()];
            let header_len = self.record(file, offset, 0, &placeholder).len() as i64;

            let mut blocks = Vec::with_capacity(chunks.len());
            let mut cursor = offset + header_len;
            for chunk in &chunks {
                blocks.push((cursor, cursor + chunk.len() as i64));
                cursor += chunk.len() as i64;
            }
            let compressed_size = if file.method != 0 {
                chunks.iter().map(Vec::len).sum::<usize>() as i64
            } else {
                file.data.len() as i64
            };

            let record = self.record(file, offset, compressed_size, &blocks);
            pak.extend_from_slice(&record);
            if file.method != 0 {
                for chunk in &chunks {
                    pak.extend_from_slice(chunk);
                }
            } else {
                pak.extend_from_slice(&file.data);
            }
            records.push(record);
        }

        let index_offset = pak.len() as i64;
        push_string(&mut pak, &self.mount_point);
        pak.extend_from_slice(&(self.files.len() as i32).to_le_bytes());
        for (file, record) in self.files.iter().zip(&records) {
            push_string(&mut pak, &file.name);
            pak.extend_from_slice(record);
        }
        let index_size = pak.len() as i64 - index_offset;

        pak.push(self.encrypted_index as u8);
        pak.extend_from_slice(&self.magic.to_le_bytes());
        pak.extend_from_slice(&self.version.to_le_bytes());
        pak.extend_from_slice(&index_offset.to_le_bytes());
        pak.extend_from_slice(&index_size.to_le_bytes());
        pak.extend_from_slice(&[0x5C; 20]);
        pak
    }

    fn record(
        &self,
        file: &FixtureFile,
        offset: i64,
        compressed_size: i64,
        blocks: &[(i64, i64)],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&offset.to_le_bytes());
        buf.extend_from_slice(&compressed_size.to_le_bytes());
        buf.extend_from_slice(&(file.data.len() as i64).to_le_bytes());
        buf.extend_from_slice(&file.method.to_le_bytes());
        if self.version < 2 {
            buf.extend_from_slice(&1_500_000_000i64.to_le_bytes());
        }
        buf.extend_from_slice(&[0xC3; 20]);
        if self.version >= 3 {
            if file.method != 0 {
                buf.extend_from_slice(&(blocks.len() as i32).to_le_bytes());
                for (start, end) in blocks {
                    buf.extend_from_slice(&start.to_le_bytes());
                    buf.extend_from_slice(&end.to_le_bytes());
                }
            }
            buf.push(file.encrypted as u8);
            buf.extend_from_slice(&(file.block_size as i32).to_le_bytes());
        }
        buf
    }

    fn compress(&self, method: i32, chunk: &[u8]) -> Vec<u8> {
        match method & 0x0F {
            COMPRESS_ZLIB => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(chunk).unwrap();
                encoder.finish().unwrap()
            }
            COMPRESS_GZIP => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(chunk).unwrap();
                encoder.finish().unwrap()
            }
            COMPRESS_CUSTOM => match self.custom {
                FixtureCodec::Zstd => zstd::bulk::compress(chunk, 3).unwrap(),
                FixtureCodec::Lz4 => lz4_flex::block::compress(chunk),
            },
            other => panic!("fixture cannot compress method {:#x}", other),
        }
    }
}

pub fn push_string(buf: &mut Vec<u8>, text: &str) {
    buf.extend_from_slice(&((text.len() + 1) as i32).to_le_bytes());
    buf.extend_from_slice(text.as_bytes());
    buf.push(0);
}

/// Deterministic, mildly compressible test payload
pub fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| ((i / 3) as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}
