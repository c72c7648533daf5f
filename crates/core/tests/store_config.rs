use fwident_core::store::{load_config, open_catalog_db, IdentConfig, StoreContext, StoreLayout};
use tempfile::tempdir;

#[test]
fn layout_computes_paths_without_touching_disk() {
    let layout = StoreLayout::new("/some/root");

    assert_eq!(layout.meta_dir, std::path::Path::new("/some/root/.fwident"));
    assert_eq!(layout.config_path, std::path::Path::new("/some/root/.fwident/ident.json"));
    assert_eq!(layout.db_path, std::path::Path::new("/some/root/.fwident/catalog.db"));
    assert_eq!(layout.db_path_relative_string(), ".fwident/catalog.db");
}

#[test]
fn config_round_trips_with_custom_stoplist() {
    let dir = tempdir().expect("tempdir");
    let layout = StoreLayout::new(dir.path());
    std::fs::create_dir_all(&layout.meta_dir).expect("meta dir");

    let mut config = IdentConfig::new("test-store", layout.db_path_relative_string());
    config.stoplist = vec!["custombrand".to_string(), "testmodel".to_string()];

    let json = serde_json::to_string_pretty(&config).expect("serialize");
    std::fs::write(&layout.config_path, json).expect("write config");

    let loaded = load_config(&layout).expect("load config");
    assert_eq!(loaded.name, "test-store");
    assert_eq!(loaded.stoplist, config.stoplist);
}

#[test]
fn config_without_stoplist_falls_back_to_the_default() {
    let dir = tempdir().expect("tempdir");
    let layout = StoreLayout::new(dir.path());
    std::fs::create_dir_all(&layout.meta_dir).expect("meta dir");

    // Older configs predate the stoplist field; loading must still work.
    let json = r#"{
        "name": "legacy",
        "description": null,
        "config_version": "0.1.0",
        "db": { "path": ".fwident/catalog.db" }
    }"#;
    std::fs::write(&layout.config_path, json).expect("write config");

    let loaded = load_config(&layout).expect("load config");
    assert!(!loaded.stoplist.is_empty());
    assert!(loaded.stoplist.iter().any(|w| w == "toyota"));
}

#[test]
fn open_catalog_db_resolves_relative_paths_and_opens() {
    let dir = tempdir().expect("tempdir");
    let layout = StoreLayout::new(dir.path());
    std::fs::create_dir_all(&layout.meta_dir).expect("meta dir");

    let config = IdentConfig::new("test-store", layout.db_path_relative_string());
    let json = serde_json::to_string_pretty(&config).expect("serialize");
    std::fs::write(&layout.config_path, json).expect("write config");

    let (loaded, db_path, db) = open_catalog_db(&layout).expect("open catalog");
    assert_eq!(loaded.name, "test-store");
    assert_eq!(db_path, layout.db_path);
    assert_eq!(db.stats().expect("stats").total_firmwares, 0);

    // The context helper bundles the same pieces.
    let ctx = StoreContext::from_root(dir.path()).expect("context");
    assert_eq!(ctx.config.name, "test-store");
}

#[test]
fn load_config_fails_cleanly_when_missing() {
    let dir = tempdir().expect("tempdir");
    let layout = StoreLayout::new(dir.path());
    assert!(load_config(&layout).is_err());
}
