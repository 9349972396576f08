//! Codec Tests
//!
//! Tests verify:
//! - Uncompressed and compressed save/load round trips
//! - Dynamic value types survive a round trip
//! - Compressed files are smaller for redundant data
//! - Invalid levels abort the save before the file is touched
//! - Corrupt, truncated and padded files are rejected
//! - Files with a valid CRC but duplicate keys or mismatched settings are rejected

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use bincode::Options;
use flate2::write::ZlibEncoder;
use serde::Serialize;
use smoldb::codec::{self, FileHeader, HEADER_SIZE, MAX_PAYLOAD_SIZE, TRAILER_SIZE};
use smoldb::{Compression, SmolError, Store, Value, ValueKind};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_path(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    (temp_dir, path)
}

fn sample_store(path: &Path) -> Store {
    let mut store = Store::create(path);
    store.add("a", 1).unwrap();
    store.add("b", "text").unwrap();
    store.add("c", Value::list([1, 2, 3])).unwrap();
    store
}

fn redundant_store(path: &Path) -> Store {
    let mut store = Store::create(path);
    for i in 0..500 {
        store
            .add(format!("key-{:04}", i), "the same rather long value, repeated")
            .unwrap();
    }
    store
}

fn encode(store: &Store) -> Vec<u8> {
    codec::encode_to(store, Vec::new()).unwrap()
}

/// Same field layout as `Store`, without its invariants
#[derive(Serialize)]
struct RawStore {
    filename: String,
    entries: Vec<RawEntry>,
    compression: Compression,
}

#[derive(Serialize)]
struct RawEntry {
    key: String,
    value: Value,
}

fn raw_store(keys: &[&str], compression: Compression) -> RawStore {
    RawStore {
        filename: "raw.db".to_string(),
        entries: keys
            .iter()
            .enumerate()
            .map(|(i, key)| RawEntry {
                key: key.to_string(),
                value: Value::Int(i as i64 + 1),
            })
            .collect(),
        compression,
    }
}

/// Build a file by hand: valid header for `header`, bincode body, valid CRC
fn write_raw(header: Compression, body: &RawStore) -> Vec<u8> {
    let encoded = bincode::DefaultOptions::new()
        .with_limit(MAX_PAYLOAD_SIZE)
        .serialize(body)
        .unwrap();

    let mut bytes = FileHeader::new(header).unwrap().encode().to_vec();
    if header.enabled {
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::new(header.level));
        encoder.write_all(&encoded).unwrap();
        bytes.extend_from_slice(&encoder.finish().unwrap());
    } else {
        bytes.extend_from_slice(&encoded);
    }
    bytes.extend_from_slice(&crc32fast::hash(&encoded).to_le_bytes());
    bytes
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_uncompressed() {
    let (_temp, path) = setup_temp_path("plain.db");
    let store = sample_store(&path);

    store.save().unwrap();
    let loaded = Store::load(&path).unwrap();

    assert_eq!(loaded.filename(), store.filename());
    assert!(!loaded.compression().enabled);
    assert_eq!(loaded.compression().level, 0);
    assert_eq!(loaded.to_map(), store.to_map());
    assert_eq!(loaded, store);
}

#[test]
fn test_round_trip_compressed() {
    let (_temp, path) = setup_temp_path("packed.db");
    let mut store = sample_store(&path);
    store.enable_compression(6);

    store.save().unwrap();
    let loaded = Store::load(&path).unwrap();

    assert_eq!(loaded.compression(), Compression::with_level(6));
    assert_eq!(loaded, store);
}

#[test]
fn test_round_trip_preserves_types() {
    let (_temp, path) = setup_temp_path("types.db");
    let mut nested = BTreeMap::new();
    nested.insert("inner".to_string(), Value::list([Value::Null, Value::from(false)]));

    let mut store = Store::create(&path);
    store.add("null", Value::Null).unwrap();
    store.add("bool", true).unwrap();
    store.add("int", -7).unwrap();
    store.add("float", 7.0).unwrap();
    store.add("text", "7").unwrap();
    store.add("bytes", Value::bytes(vec![7u8])).unwrap();
    store.add("map", nested).unwrap();

    store.save().unwrap();
    let loaded = Store::load(&path).unwrap();

    for entry in store.iter() {
        let restored = loaded.get(entry.key()).unwrap();
        assert_eq!(restored.value(), entry.value());
        assert_eq!(restored.value().kind(), entry.value().kind());
    }
    assert_eq!(loaded.get_value("float").unwrap().kind(), ValueKind::Float);
    assert_eq!(loaded.get_value("int").unwrap().kind(), ValueKind::Int);
}

#[test]
fn test_round_trip_preserves_order() {
    let (_temp, path) = setup_temp_path("order.db");
    let mut store = Store::create(&path);
    for key in ["z", "y", "x", "w"] {
        store.add(key, key).unwrap();
    }

    store.save().unwrap();
    let loaded = Store::load(&path).unwrap();

    let keys: Vec<&str> = loaded.keys().collect();
    assert_eq!(keys, vec!["z", "y", "x", "w"]);
}

#[test]
fn test_round_trip_empty_store() {
    let (_temp, path) = setup_temp_path("empty.db");
    let store = Store::create(&path);

    store.save().unwrap();
    let loaded = Store::load(&path).unwrap();

    assert!(loaded.is_empty());
}

#[test]
fn test_round_trip_every_level() {
    for level in 0..=9 {
        let mut store = sample_store(Path::new("levels.db"));
        store.enable_compression(level);

        let bytes = encode(&store);
        let decoded = codec::decode_from(Cursor::new(bytes)).unwrap();

        assert_eq!(decoded, store, "level {}", level);
    }
}

#[test]
fn test_save_overwrites_previous_file() {
    let (_temp, path) = setup_temp_path("overwrite.db");
    let mut store = redundant_store(&path);
    store.save().unwrap();

    store.clear();
    store.add("only", 1).unwrap();
    store.save().unwrap();

    let loaded = Store::load(&path).unwrap();
    assert_eq!(loaded.len(), 1);
}

#[test]
fn test_save_to_other_path_keeps_filename() {
    let (temp, path) = setup_temp_path("original.db");
    let copy = temp.path().join("copy.db");
    let store = sample_store(&path);

    store.save_to(&copy).unwrap();
    let loaded = Store::load(&copy).unwrap();

    assert!(!path.exists());
    assert_eq!(loaded.filename(), path.as_path());
}

#[test]
fn test_compression_mode_switch() {
    let (_temp, path) = setup_temp_path("switch.db");
    let mut store = sample_store(&path);
    store.enable_compression(9);
    store.save().unwrap();

    let mut loaded = Store::load(&path).unwrap();
    loaded.disable_compression();
    loaded.save().unwrap();

    let reloaded = Store::load(&path).unwrap();
    assert!(!reloaded.compression().enabled);
    assert!(!codec::read_header(&path).unwrap().is_compressed());
    assert_eq!(reloaded.to_map(), store.to_map());
}

// =============================================================================
// Compression Tests
// =============================================================================

#[test]
fn test_compressed_file_is_smaller() {
    let (temp, plain_path) = setup_temp_path("plain.db");
    let packed_path = temp.path().join("packed.db");

    let plain = redundant_store(&plain_path);
    plain.save().unwrap();

    let mut packed = redundant_store(&packed_path);
    packed.enable_compression(6);
    packed.save().unwrap();

    let plain_size = fs::metadata(&plain_path).unwrap().len();
    let packed_size = fs::metadata(&packed_path).unwrap().len();
    assert!(
        packed_size < plain_size,
        "compressed {} >= uncompressed {}",
        packed_size,
        plain_size
    );
}

#[test]
fn test_invalid_level_fails_before_truncating() {
    let (_temp, path) = setup_temp_path("guarded.db");
    let mut store = sample_store(&path);
    store.save().unwrap();
    let before = fs::read(&path).unwrap();

    store.enable_compression(10);
    let err = store.save().unwrap_err();

    assert!(matches!(err, SmolError::InvalidCompressionLevel(10)));
    assert_eq!(fs::read(&path).unwrap(), before);
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_load_missing_file_is_io_error() {
    let (_temp, path) = setup_temp_path("missing.db");

    let err = Store::load(&path).unwrap_err();

    assert!(matches!(err, SmolError::Io(_)));
}

#[test]
fn test_save_into_missing_directory_is_io_error() {
    let (_temp, dir) = setup_temp_path("no-such-dir");
    let store = Store::create(dir.join("store.db"));

    let err = store.save().unwrap_err();

    assert!(matches!(err, SmolError::Io(_)));
}

#[test]
fn test_load_empty_file() {
    let (_temp, path) = setup_temp_path("empty-file.db");
    fs::write(&path, b"").unwrap();

    let err = Store::load(&path).unwrap_err();

    assert!(matches!(err, SmolError::Decoding(_)));
}

#[test]
fn test_truncated_file_rejected() {
    for level in [None, Some(6)] {
        let mut store = redundant_store(Path::new("t.db"));
        if let Some(level) = level {
            store.enable_compression(level);
        }
        let bytes = encode(&store);

        for cut in [HEADER_SIZE, bytes.len() / 2, bytes.len() - 1] {
            let truncated = bytes[..cut].to_vec();
            let err = codec::decode_from(Cursor::new(truncated)).unwrap_err();
            assert!(
                matches!(err, SmolError::Decoding(_)),
                "level {:?}, cut at {}: {:?}",
                level,
                cut,
                err
            );
        }
    }
}

#[test]
fn test_trailing_bytes_rejected() {
    for level in [None, Some(1)] {
        let mut store = sample_store(Path::new("t.db"));
        if let Some(level) = level {
            store.enable_compression(level);
        }
        let mut bytes = encode(&store);
        bytes.extend_from_slice(b"junk");

        let err = codec::decode_from(Cursor::new(bytes)).unwrap_err();

        assert!(matches!(err, SmolError::Decoding(_)));
    }
}

#[test]
fn test_checksum_mismatch_rejected() {
    let store = sample_store(Path::new("t.db"));
    let mut bytes = encode(&store);
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;

    let err = codec::decode_from(Cursor::new(bytes)).unwrap_err();

    assert!(matches!(err, SmolError::Decoding(ref msg) if msg.contains("checksum")));
}

#[test]
fn test_corrupt_uncompressed_body_rejected() {
    let mut store = Store::create("t.db");
    store.add("key", "some value that is long enough").unwrap();
    let mut bytes = encode(&store);
    // Flip a byte inside the value text
    let idx = bytes.len() - TRAILER_SIZE - 3;
    bytes[idx] ^= 0x20;

    let err = codec::decode_from(Cursor::new(bytes)).unwrap_err();

    assert!(matches!(err, SmolError::Decoding(_)));
}

#[test]
fn test_corrupt_compressed_body_rejected() {
    let mut store = redundant_store(Path::new("t.db"));
    store.enable_compression(6);
    let mut bytes = encode(&store);
    let mid = HEADER_SIZE + (bytes.len() - HEADER_SIZE - TRAILER_SIZE) / 2;
    for b in &mut bytes[mid..mid + 8] {
        *b ^= 0x5a;
    }

    let err = codec::decode_from(Cursor::new(bytes)).unwrap_err();

    assert!(matches!(err, SmolError::Decoding(_)), "{:?}", err);
}

#[test]
fn test_compressed_flag_on_plain_body_rejected() {
    let store = sample_store(Path::new("t.db"));
    let mut bytes = encode(&store);
    bytes[6] = codec::FLAG_COMPRESSED;
    bytes[7] = 6;

    let err = codec::decode_from(Cursor::new(bytes)).unwrap_err();

    assert!(matches!(err, SmolError::Decoding(_)));
}

// =============================================================================
// Hand-Written File Tests
// =============================================================================

#[test]
fn test_hand_written_file_decodes() {
    for compression in [Compression::disabled(), Compression::with_level(6)] {
        let bytes = write_raw(compression, &raw_store(&["a", "b"], compression));

        let store = codec::decode_from(Cursor::new(bytes)).unwrap();

        let keys: Vec<&str> = store.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(store.compression(), compression);
    }
}

#[test]
fn test_duplicate_keys_in_file_rejected() {
    for compression in [Compression::disabled(), Compression::with_level(6)] {
        let bytes = write_raw(compression, &raw_store(&["k", "other", "k"], compression));

        let err = codec::decode_from(Cursor::new(bytes)).unwrap_err();

        assert!(
            matches!(err, SmolError::Decoding(ref msg) if msg.contains("duplicate key")),
            "{:?}",
            err
        );
    }
}

#[test]
fn test_header_level_disagreeing_with_body_rejected() {
    let bytes = write_raw(
        Compression::with_level(6),
        &raw_store(&["k"], Compression::with_level(3)),
    );

    let err = codec::decode_from(Cursor::new(bytes)).unwrap_err();

    assert!(matches!(err, SmolError::Decoding(ref msg) if msg.contains("disagrees")));
}

#[test]
fn test_plain_header_over_compressed_settings_rejected() {
    let bytes = write_raw(
        Compression::disabled(),
        &raw_store(&["k"], Compression::with_level(6)),
    );

    let err = codec::decode_from(Cursor::new(bytes)).unwrap_err();

    assert!(matches!(err, SmolError::Decoding(ref msg) if msg.contains("disagrees")));
}

#[test]
fn test_compressed_header_over_plain_settings_rejected() {
    let bytes = write_raw(
        Compression::with_level(6),
        &raw_store(&["k"], Compression::disabled()),
    );

    let err = codec::decode_from(Cursor::new(bytes)).unwrap_err();

    assert!(matches!(err, SmolError::Decoding(ref msg) if msg.contains("disagrees")));
}
