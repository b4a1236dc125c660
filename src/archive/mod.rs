mod decompress;
mod entry;
mod footer;
mod format;
mod hash_table;
mod index;
mod source;
mod stream;

pub use decompress::{
    Decompressor, StandardDecompressor, COMPRESS_BIAS_MEMORY, COMPRESS_BIAS_SPEED,
    COMPRESS_CUSTOM, COMPRESS_GZIP, COMPRESS_NONE, COMPRESS_ZLIB,
};
pub use entry::{CompressionBlock, Entry, EntryOptions};
pub use footer::Footer;
pub use format::{read_fstring, PakVersion, RecordLayout, FOOTER_SIZE, HASH_LENGTH, PAK_FILE_MAGIC};
pub use hash_table::{hash_name, NameHashTable, HASH_SIZE};
pub use index::{normalize_mount_point, ArchiveIndex, MOUNT_POINT_PREFIX, ROOT_MOUNT_POINT};
pub use source::{read_full, ByteSource};
pub use stream::EntryStreamReader;
