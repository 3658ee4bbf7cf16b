use super::*;
use crate::test_support::BrokenCache;
use serde_json::{Value, json};

// =============================================================================
// MemoryCache
// =============================================================================

#[test]
fn memory_cache_set_get_remove() {
    let cache = MemoryCache::new();
    assert_eq!(cache.get("theme").unwrap(), None);

    cache.set("theme", "\"dark\"").unwrap();
    assert_eq!(cache.get("theme").unwrap().as_deref(), Some("\"dark\""));
    assert_eq!(cache.len(), 1);

    cache.remove("theme").unwrap();
    assert!(cache.is_empty());
}

#[test]
fn memory_cache_set_overwrites() {
    let cache = MemoryCache::new();
    cache.set("theme", "a").unwrap();
    cache.set("theme", "b").unwrap();
    assert_eq!(cache.get("theme").unwrap().as_deref(), Some("b"));
    assert_eq!(cache.len(), 1);
}

// =============================================================================
// load_json / save_json
// =============================================================================

#[test]
fn save_then_load_round_trips_structured_values() {
    let cache = MemoryCache::new();
    let values = [
        json!("dark"),
        json!(42),
        json!(null),
        json!({"panels": [{"id": 1, "open": true}], "ratio": 0.25}),
    ];
    for (i, value) in values.iter().enumerate() {
        let key = format!("k{i}");
        assert!(save_json(&cache, &key, value));
        assert_eq!(load_json::<Value>(&cache, &key).as_ref(), Some(value));
    }
}

#[test]
fn save_json_stores_serialized_form() {
    let cache = MemoryCache::new();
    save_json(&cache, "theme", &"dark");
    assert_eq!(cache.get("theme").unwrap().as_deref(), Some("\"dark\""));
}

#[test]
fn load_json_treats_unparseable_entry_as_miss() {
    let cache = MemoryCache::new();
    cache.set("count", "not json").unwrap();
    assert_eq!(load_json::<u32>(&cache, "count"), None);
}

#[test]
fn load_json_treats_wrong_shape_as_miss() {
    let cache = MemoryCache::new();
    cache.set("count", "\"seven\"").unwrap();
    assert_eq!(load_json::<u32>(&cache, "count"), None);
}

#[test]
fn broken_cache_is_isolated() {
    assert_eq!(load_json::<String>(&BrokenCache, "theme"), None);
    assert!(!save_json(&BrokenCache, "theme", &"dark"));
}

// =============================================================================
// FileCache
// =============================================================================

#[test]
fn file_cache_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCache::open(dir.path().join("cache.json")).unwrap();
    assert_eq!(cache.get("theme").unwrap(), None);
}

#[test]
fn file_cache_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("cache.json");

    let cache = FileCache::open(&path).unwrap();
    cache.set("theme", "\"dark\"").unwrap();
    cache.set("zoom", "1.5").unwrap();
    drop(cache);

    let reopened = FileCache::open(&path).unwrap();
    assert_eq!(reopened.path(), path.as_path());
    assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("\"dark\""));
    assert_eq!(reopened.get("zoom").unwrap().as_deref(), Some("1.5"));
}

#[test]
fn file_cache_remove_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    let cache = FileCache::open(&path).unwrap();
    cache.set("theme", "x").unwrap();
    cache.remove("theme").unwrap();
    drop(cache);

    assert_eq!(FileCache::open(&path).unwrap().get("theme").unwrap(), None);
}

#[test]
fn file_cache_corrupt_file_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(&path, "{ not json").unwrap();

    let cache = FileCache::open(&path).unwrap();
    assert_eq!(cache.get("theme").unwrap(), None);
    cache.set("theme", "ok").unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let parsed: BTreeMap<String, String> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.get("theme").map(String::as_str), Some("ok"));
}

#[test]
fn file_cache_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let cache = FileCache::open(&path).unwrap();
    cache.set("theme", "x").unwrap();
    assert!(!path.with_extension("tmp").exists());
}
