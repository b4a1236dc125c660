use crate::archive::entry::Entry;

/// Number of buckets in the name table (power of two)
pub const HASH_SIZE: usize = 1024;

const HASH_MASK: u16 = (HASH_SIZE - 1) as u16;

/// Case-insensitive bucket hash of an entry name.
///
/// Only ASCII letters are folded, matching the comparison used for lookups.
pub fn hash_name(name: &str) -> u16 {
    let mut hash: u16 = 0;
    for &byte in name.as_bytes() {
        let c = byte.to_ascii_lowercase() as u16;
        hash = hash
            .rotate_left(5)
            .wrapping_sub(hash)
            .wrapping_add(((c << 4) + c) ^ 0x13F);
    }
    hash & HASH_MASK
}

/// Bucketed lookup from entry name to its position in the index
///
/// Buckets hold indices into the index's entry list. Within a bucket the most
/// recently inserted entry is found first, so when two entries share a name
/// the later one wins.
#[derive(Debug, Clone, Default)]
pub struct NameHashTable {
    buckets: Vec<Vec<usize>>,
}

impl NameHashTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash every entry in on-disk order
    pub fn build(entries: &[Entry]) -> Self {
        let mut table = Self::new();
        for (index, entry) in entries.iter().enumerate() {
            table.insert(&entry.name, index);
        }
        table
    }

    pub fn insert(&mut self, name: &str, index: usize) {
        if self.buckets.is_empty() {
            self.buckets = vec![Vec::new(); HASH_SIZE];
        }
        self.buckets[hash_name(name) as usize].push(index);
    }

    pub fn lookup(&self, entries: &[Entry], name: &str) -> Option<usize> {
        let bucket = self.buckets.get(hash_name(name) as usize)?;
        bucket
            .iter()
            .rev()
            .copied()
            .find(|&index| entries[index].name.eq_ignore_ascii_case(name))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
