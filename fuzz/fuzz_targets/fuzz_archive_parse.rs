#![no_main]

use libfuzzer_sys::fuzz_target;
use pak_vfs::{ArchiveVfs, CustomCodec, PakConfig};
use std::io::{Cursor, Read};

fuzz_target!(|data: &[u8]| {
    let config = PakConfig {
        hash_threshold: 4,
        custom_codec: CustomCodec::Zstd,
        ..PakConfig::default()
    };
    let mut vfs = ArchiveVfs::with_config("fuzz.pak", config);

    // Try to attach - should never panic
    match vfs.attach(Cursor::new(data.to_vec())) {
        Ok(status) if status.is_attached() => {}
        _ => return,
    }

    // Try to read every entry - should never panic
    let names: Vec<String> = vfs.list_names().into_iter().map(str::to_string).collect();
    for name in &names {
        let _ = vfs.size_of(name);
        let _ = vfs.read_all(name);
        let Some(mut reader) = vfs.open(name) else {
            continue;
        };
        let mut sink = vec![0u8; 4096];
        let _ = reader.read(&mut sink);
        if reader.len() > 2 {
            let _ = reader.seek_to(reader.len() / 2);
            let _ = reader.read_bytes(&mut sink);
        }
    }

    // Lookups with odd names - should never panic
    let _ = vfs.contains("");
    let _ = vfs.contains("/");
    let _ = vfs.contains("../../../Engine/Config/BaseEngine.ini");
});
