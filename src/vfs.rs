//! Virtual file system view of a pak archive
//!
//! Attaches a byte source, loads its index and hands out per-file streams.

use crate::archive::{
    ArchiveIndex, ByteSource, Decompressor, Entry, EntryStreamReader, Footer,
    StandardDecompressor,
};
use crate::config::PakConfig;
use crate::error::{PakError, Result};
use std::cell::{Cell, RefCell};
use std::fs::File;
use std::path::Path;
use tracing::{info, info_span, warn};

/// Outcome of [`ArchiveVfs::attach`] that is not an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachStatus {
    /// Index loaded, entries available
    Attached,
    /// Footer magic did not match; try another format
    NotThisFormat,
    /// Pak uses an encrypted index, which is not supported
    EncryptedIndex,
}

impl AttachStatus {
    pub fn is_attached(self) -> bool {
        self == AttachStatus::Attached
    }
}

/// Read-only file system over one pak archive
pub struct ArchiveVfs<S: ByteSource = File> {
    name: String,
    config: PakConfig,
    decompressor: Box<dyn Decompressor>,
    source: Option<RefCell<S>>,
    footer: Option<Footer>,
    index: Option<ArchiveIndex>,
    /// Position of the last entry found, checked before every lookup
    last_found: Cell<Option<usize>>,
}

impl<S: ByteSource> ArchiveVfs<S> {
    /// Create an unattached VFS; `name` is used in log messages
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, PakConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: PakConfig) -> Self {
        let decompressor = Box::new(StandardDecompressor::new(config.custom_codec));
        Self {
            name: name.into(),
            config,
            decompressor,
            source: None,
            footer: None,
            index: None,
            last_found: Cell::new(None),
        }
    }

    /// Replace the block decompressor
    pub fn with_decompressor(mut self, decompressor: Box<dyn Decompressor>) -> Self {
        self.decompressor = decompressor;
        self
    }

    /// Read the footer and index of `source`.
    ///
    /// The source is kept even when the archive is not usable, so it can be
    /// recovered with [`detach`](Self::detach) and handed to another format.
    ///
    /// # Errors
    ///
    /// Fails for a pak with an unsupported version, and for any I/O or parse
    /// error while reading the index.
    pub fn attach(&mut self, mut source: S) -> Result<AttachStatus> {
        let _span = info_span!("pak", archive = %self.name).entered();
        self.footer = None;
        self.index = None;
        self.last_found.set(None);

        let Some(footer) = Footer::locate(&mut source)? else {
            self.source = Some(RefCell::new(source));
            return Ok(AttachStatus::NotThisFormat);
        };

        if footer.encrypted_index {
            warn!("Pak has encrypted index, skipping");
            self.source = Some(RefCell::new(source));
            return Ok(AttachStatus::EncryptedIndex);
        }

        let index = ArchiveIndex::build(&mut source, &footer, &self.config)?;

        let encrypted = index.encrypted_count();
        if index.mount_point() != "/" {
            info!(
                files = index.len(),
                encrypted,
                mount_point = %index.mount_point(),
                "Attached pak"
            );
        } else {
            info!(files = index.len(), encrypted, "Attached pak");
        }

        self.source = Some(RefCell::new(source));
        self.footer = Some(footer);
        self.index = Some(index);
        Ok(AttachStatus::Attached)
    }

    /// Drop the index and give the byte source back
    pub fn detach(&mut self) -> Option<S> {
        self.footer = None;
        self.index = None;
        self.last_found.set(None);
        self.source.take().map(RefCell::into_inner)
    }

    pub fn is_attached(&self) -> bool {
        self.index.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PakConfig {
        &self.config
    }

    pub fn footer(&self) -> Option<&Footer> {
        self.footer.as_ref()
    }

    pub fn index(&self) -> Option<&ArchiveIndex> {
        self.index.as_ref()
    }

    /// Mount point of the attached archive
    pub fn mount_point(&self) -> Option<&str> {
        self.index.as_ref().map(ArchiveIndex::mount_point)
    }

    /// All entries in on-disk order
    pub fn entries(&self) -> &[Entry] {
        match &self.index {
            Some(index) => index.entries(),
            None => &[],
        }
    }

    /// Entry names in on-disk order
    pub fn list_names(&self) -> Vec<&str> {
        self.entries().iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn num_files(&self) -> usize {
        self.entries().len()
    }

    /// Name of the `index`-th entry; also primes the lookup cache
    pub fn file_name(&self, index: usize) -> Option<&str> {
        let entry = self.entries().get(index)?;
        self.last_found.set(Some(index));
        Some(entry.name.as_str())
    }

    /// Case-insensitive entry lookup
    pub fn find_entry(&self, name: &str) -> Option<&Entry> {
        let index = self.index.as_ref()?;

        if let Some(last) = self.last_found.get() {
            if let Some(entry) = index.entry(last) {
                if entry.name.eq_ignore_ascii_case(name) {
                    return Some(entry);
                }
            }
        }

        let position = index.find(name)?;
        self.last_found.set(Some(position));
        index.entry(position)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_entry(name).is_some()
    }

    /// Uncompressed size of an entry
    pub fn size_of(&self, name: &str) -> Option<u64> {
        self.find_entry(name)
            .map(|entry| entry.uncompressed_size as u64)
    }

    /// Open a stream over an entry.
    ///
    /// Returns `None` when the name is unknown or the entry is encrypted.
    pub fn open(&self, name: &str) -> Option<EntryStreamReader<'_, S>> {
        let entry = self.find_entry(name)?;
        if entry.encrypted {
            warn!(archive = %self.name, file = %name, "Attempt to open encrypted file");
            return None;
        }
        let source = self.source.as_ref()?;
        Some(EntryStreamReader::new(entry, source, &*self.decompressor))
    }

    /// Read a whole entry into memory
    pub fn read_all(&self, name: &str) -> Result<Option<Vec<u8>>> {
        if !self.is_attached() {
            return Err(PakError::NotAttached);
        }
        let Some(mut reader) = self.open(name) else {
            return Ok(None);
        };
        reader.validate_extent()?;
        let len = usize::try_from(reader.len()).map_err(|_| {
            PakError::InvalidFormat(format!("Entry {} is too large to load", name))
        })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| {
            PakError::InvalidFormat(format!("Cannot allocate {} bytes for {}", len, name))
        })?;
        data.resize(len, 0);
        reader.read_exact_bytes(&mut data)?;
        Ok(Some(data))
    }
}

impl ArchiveVfs<File> {
    /// Open a pak file from disk and attach it
    pub fn attach_path<P: AsRef<Path>>(&mut self, path: P) -> Result<AttachStatus> {
        let file = File::open(path)?;
        self.attach(file)
    }
}
