//! pak-vfs: read-only virtual file system over Unreal-style `.pak` archives
//!
//! This library parses the trailing footer and the entry index of a pak,
//! exposes every contained file as an independently seekable stream, and
//! decompresses block-compressed entries on demand:
//! - Footer and index parsing for pak versions 1 through 4
//! - Case-insensitive name lookup with a hash table for large archives
//! - Random-access reads through a one-block decompression cache
//!
//! Encrypted indices and encrypted entries are detected and refused.
//!
//! # Example
//!
//! ```no_run
//! use pak_vfs::{ArchiveVfs, AttachStatus};
//! use std::io::Read;
//!
//! let mut vfs: ArchiveVfs = ArchiveVfs::new("pakchunk0.pak");
//! if vfs.attach_path("pakchunk0.pak")? == AttachStatus::Attached {
//!     for name in vfs.list_names() {
//!         println!("{} ({:?} bytes)", name, vfs.size_of(name));
//!     }
//!     if let Some(mut file) = vfs.open("/Game/Config/DefaultGame.ini") {
//!         let mut text = String::new();
//!         file.read_to_string(&mut text)?;
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod archive;
pub mod config;
pub mod error;
pub mod vfs;

// Re-export commonly used types
pub use archive::{
    ArchiveIndex, ByteSource, CompressionBlock, Decompressor, Entry, EntryStreamReader, Footer,
    NameHashTable, PakVersion, StandardDecompressor, FOOTER_SIZE, PAK_FILE_MAGIC,
};
pub use config::{CustomCodec, PakConfig};
pub use error::{PakError, Result};
pub use vfs::{ArchiveVfs, AttachStatus};
