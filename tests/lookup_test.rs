//! Name lookup with and without the hash table

mod common;

use common::PakBuilder;
use pak_vfs::{ArchiveVfs, PakConfig};
use std::io::Cursor;

fn pak_with_files(count: usize) -> Vec<u8> {
    let mut builder = PakBuilder::new(4).mount_point("../../../Game/");
    for i in 0..count {
        let name = format!("Dir{}/Asset_{}.uasset", i % 7, i);
        builder = builder.stored(&name, format!("asset {}", i).as_bytes());
    }
    builder.build()
}

fn attach(pak: Vec<u8>, config: PakConfig) -> ArchiveVfs<Cursor<Vec<u8>>> {
    let mut vfs = ArchiveVfs::with_config("lookup.pak", config);
    assert!(vfs.attach(Cursor::new(pak)).unwrap().is_attached());
    vfs
}

fn check_all_names(vfs: &ArchiveVfs<Cursor<Vec<u8>>>, count: usize) {
    assert_eq!(vfs.num_files(), count);
    for i in 0..count {
        let name = format!("/Game/Dir{}/Asset_{}.uasset", i % 7, i);
        let lower = name.to_lowercase();
        let upper = name.to_uppercase();
        for candidate in [&name, &lower, &upper] {
            let entry = vfs.find_entry(candidate).unwrap();
            assert_eq!(entry.name, name);
        }
        assert_eq!(
            vfs.read_all(&upper).unwrap().unwrap(),
            format!("asset {}", i).into_bytes()
        );
    }
    assert!(vfs.find_entry("/Game/Dir0/Asset_99999.uasset").is_none());
}

#[test]
fn test_small_archive_uses_linear_scan() {
    let vfs = attach(pak_with_files(40), PakConfig::default());
    assert!(!vfs.index().unwrap().has_hash_table());
    check_all_names(&vfs, 40);
}

#[test]
fn test_large_archive_uses_hash_table() {
    let vfs = attach(pak_with_files(600), PakConfig::default());
    assert!(vfs.index().unwrap().has_hash_table());
    check_all_names(&vfs, 600);
}

#[test]
fn test_threshold_boundary() {
    let config = PakConfig {
        hash_threshold: 10,
        ..PakConfig::default()
    };
    let below = attach(pak_with_files(9), config.clone());
    assert!(!below.index().unwrap().has_hash_table());
    let at = attach(pak_with_files(10), config);
    assert!(at.index().unwrap().has_hash_table());
    check_all_names(&at, 10);
}

#[test]
fn test_non_ascii_names_fold_only_ascii() {
    let pak = PakBuilder::new(4)
        .stored("Café/Menu.txt", b"menu")
        .build();
    let config = PakConfig {
        hash_threshold: 1,
        ..PakConfig::default()
    };
    let vfs = attach(pak, config);
    let name = vfs.list_names()[0].to_string();
    assert!(vfs.contains(&name));
    assert!(vfs.contains(&name.to_ascii_lowercase()));
}

#[test]
fn test_duplicate_names() {
    let pak = PakBuilder::new(4)
        .stored("dup.txt", b"first")
        .stored("other.txt", b"other")
        .stored("DUP.txt", b"second")
        .build();

    // Both copies stay listed in on-disk order
    let linear = attach(pak.clone(), PakConfig::default());
    assert_eq!(linear.list_names(), vec!["/dup.txt", "/other.txt", "/DUP.txt"]);

    // Linear scan finds the first copy
    assert_eq!(linear.read_all("/dup.txt").unwrap().unwrap(), b"first");

    // The hash table prefers the most recently inserted copy
    let hashed = attach(
        pak,
        PakConfig {
            hash_threshold: 1,
            ..PakConfig::default()
        },
    );
    assert_eq!(hashed.read_all("/dup.txt").unwrap().unwrap(), b"second");
}

#[test]
fn test_enumeration_primes_lookup_cache() {
    let vfs = attach(pak_with_files(30), PakConfig::default());
    for i in 0..vfs.num_files() {
        let name = vfs.file_name(i).unwrap().to_string();
        let size = vfs.size_of(&name).unwrap();
        assert_eq!(size, vfs.entries()[i].uncompressed_size as u64);
        assert!(vfs.open(&name).is_some());
    }
    assert_eq!(vfs.file_name(30), None);
}
