use crate::archive::entry::{Entry, EntryOptions};
use crate::archive::footer::Footer;
use crate::archive::format::{read_fstring, read_i32, PakVersion};
use crate::archive::hash_table::NameHashTable;
use crate::archive::source::{read_full, ByteSource};
use crate::config::PakConfig;
use crate::error::{PakError, Result};
use std::io::{Cursor, Read};
use tracing::{debug, warn};

/// Relative prefix that well-formed mount points start with
pub const MOUNT_POINT_PREFIX: &str = "../../..";

/// Mount point used when the stored one cannot be trusted
pub const ROOT_MOUNT_POINT: &str = "/";

/// Turn a stored mount point into an absolute logical path.
///
/// Returns `None` when the mount point is malformed; callers fall back to
/// [`ROOT_MOUNT_POINT`].
pub fn normalize_mount_point(raw: &str) -> Option<String> {
    let stripped = raw.strip_prefix(MOUNT_POINT_PREFIX)?;
    if !stripped.starts_with('/') || stripped[1..].starts_with('.') {
        return None;
    }
    Some(stripped.to_string())
}

/// Directory of an attached archive
///
/// Entries keep their on-disk order. Built once, immutable afterwards.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    mount_point: String,
    entries: Vec<Entry>,
    hash_table: Option<NameHashTable>,
}

impl ArchiveIndex {
    /// Load the index blob the footer points at and decode it
    pub fn build<S: ByteSource + ?Sized>(
        source: &mut S,
        footer: &Footer,
        config: &PakConfig,
    ) -> Result<Self> {
        let file_size = source.size_in_bytes()?;
        let offset = u64::try_from(footer.index_offset).ok();
        let size = u64::try_from(footer.index_size).ok();
        let (offset, size) = match (offset, size) {
            (Some(offset), Some(size)) if offset.saturating_add(size) <= file_size => (offset, size),
            _ => {
                return Err(PakError::InvalidFormat(format!(
                    "Index range {}+{} lies outside archive of {} bytes",
                    footer.index_offset, footer.index_size, file_size
                )))
            }
        };

        let mut blob = vec![0u8; size as usize];
        source.seek_to(offset)?;
        read_full(source, &mut blob)?;

        Self::read_from(Cursor::new(blob), footer.version, config)
    }

    /// Decode `[mount point][count][{name, record}...]`
    pub fn read_from<R: Read>(mut reader: R, version: PakVersion, config: &PakConfig) -> Result<Self> {
        let raw_mount_point = read_fstring(&mut reader, config.max_string_length)?;
        let mount_point = match normalize_mount_point(&raw_mount_point) {
            Some(mount_point) => mount_point,
            None => {
                warn!(
                    mount_point = %raw_mount_point,
                    "Pak has strange mount point, mounting to root"
                );
                ROOT_MOUNT_POINT.to_string()
            }
        };

        let count = read_i32(&mut reader)?;
        if count < 0 {
            return Err(PakError::InvalidFormat(format!(
                "Negative entry count {}",
                count
            )));
        }

        let options = EntryOptions {
            ignore_encryption: config.ignore_entry_encryption,
            max_block_size: config.max_block_size,
        };
        let mut entries = Vec::with_capacity((count as usize).min(1 << 16));
        for _ in 0..count {
            let file_name = read_fstring(&mut reader, config.max_string_length)?;
            let name = format!("{}{}", mount_point, file_name);
            entries.push(Entry::read_from(&mut reader, name, version, options)?);
        }

        let hash_table = if entries.len() >= config.hash_threshold {
            debug!(entries = entries.len(), "Building name hash table");
            Some(NameHashTable::build(&entries))
        } else {
            None
        };

        Ok(Self {
            mount_point,
            entries,
            hash_table,
        })
    }

    /// Case-insensitive lookup of an entry position
    pub fn find(&self, name: &str) -> Option<usize> {
        match &self.hash_table {
            Some(table) => table.lookup(&self.entries, name),
            None => self
                .entries
                .iter()
                .position(|entry| entry.name.eq_ignore_ascii_case(name)),
        }
    }

    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_hash_table(&self) -> bool {
        self.hash_table.is_some()
    }

    pub fn encrypted_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.encrypted).count()
    }
}
