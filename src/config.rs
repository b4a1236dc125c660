//! Parse-time configuration for pak archives
//!
//! Settings are plain data handed to the index builder; nothing here is
//! global. A config can be built in code or loaded from TOML:
//!
//! ```toml
//! hash_threshold = 256
//! ignore_entry_encryption = false
//! max_string_length = 1024
//! max_block_size = 16777216
//! custom_codec = "zstd"
//! ```

use crate::error::{PakError, Result};
use serde::Deserialize;
use std::path::Path;

/// Entry count at which the name hash table is built
pub const DEFAULT_HASH_THRESHOLD: usize = 256;

/// Longest length-prefixed string accepted in an index
pub const DEFAULT_MAX_STRING_LENGTH: usize = 1024;

/// Largest compression block size accepted in an entry record
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 16 * 1024 * 1024;

/// Codec used for the "custom" compression method id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomCodec {
    /// Custom-compressed entries cannot be read
    #[default]
    None,
    Zstd,
    Lz4,
}

/// Options controlling how an archive index is parsed
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PakConfig {
    /// Build the name hash table when the entry count reaches this value
    pub hash_threshold: usize,

    /// Clear the per-entry `encrypted` flag after parsing.
    ///
    /// Some titles set the flag on entries that are stored in the clear.
    pub ignore_entry_encryption: bool,

    /// Maximum length of the mount point and entry name strings
    pub max_string_length: usize,

    /// Entries whose compression block size exceeds this are rejected
    pub max_block_size: usize,

    pub custom_codec: CustomCodec,
}

impl Default for PakConfig {
    fn default() -> Self {
        Self {
            hash_threshold: DEFAULT_HASH_THRESHOLD,
            ignore_entry_encryption: false,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            custom_codec: CustomCodec::None,
        }
    }
}

impl PakConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PakConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.max_string_length == 0 {
            return Err(PakError::Config(
                "max_string_length must be greater than zero".to_string(),
            ));
        }
        if self.max_block_size == 0 {
            return Err(PakError::Config(
                "max_block_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
