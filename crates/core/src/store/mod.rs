//! Store configuration and on-disk layout.
//!
//! An identification store is a directory holding:
//! - `.fwident/ident.json` — serializable store config, including the
//!   smart-filename stoplist (a tuning knob, so it lives in config rather
//!   than in code).
//! - `.fwident/catalog.db` — the SQLite firmware catalog.
//!
//! `StoreLayout` computes paths without touching the filesystem; the CLI is
//! responsible for creating directories and files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogDb;
use crate::parse::filename::default_stoplist;

/// Database configuration: where the catalog lives, typically relative to
/// the store root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Serializable configuration describing an identification store.
///
/// This lives at `.fwident/ident.json` in the store root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentConfig {
    /// Human-friendly store name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Schema/config version. This is about the config format, not firmware
    /// versions.
    pub config_version: String,
    /// Database configuration (path is typically relative to store root).
    pub db: DbConfig,
    /// Words excluded from smart filename search (brand/model/generic
    /// terms, matched case-insensitively).
    #[serde(default = "default_stoplist")]
    pub stoplist: Vec<String>,
}

impl IdentConfig {
    /// Create a new store configuration using the given name and db path,
    /// with the built-in default stoplist.
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            stoplist: default_stoplist(),
        }
    }
}

/// Logical layout of a store on disk.
///
/// This is derived from a chosen root path. It does not perform any IO
/// itself.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    /// Root directory of the store.
    pub root: PathBuf,
    /// Directory for internal metadata (.fwident).
    pub meta_dir: PathBuf,
    /// Path to the store config file (JSON).
    pub config_path: PathBuf,
    /// Path to the catalog database file.
    pub db_path: PathBuf,
}

impl StoreLayout {
    /// Compute the default layout for a store rooted at `root`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".fwident");
        let config_path = meta_dir.join("ident.json");
        let db_path = meta_dir.join("catalog.db");

        Self { root, meta_dir, config_path, db_path }
    }

    /// Compute a database path string suitable for storing in `IdentConfig`,
    /// typically as a path relative to `root`.
    pub fn db_path_relative_string(&self) -> String {
        match self.db_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.db_path.to_string_lossy().to_string(),
        }
    }
}

/// Load the store config JSON from disk for a given layout.
pub fn load_config(layout: &StoreLayout) -> Result<IdentConfig> {
    let config_json = std::fs::read_to_string(&layout.config_path).with_context(|| {
        format!("Failed to read store config at {}", layout.config_path.display())
    })?;
    let config: IdentConfig =
        serde_json::from_str(&config_json).context("Failed to parse store config JSON")?;
    Ok(config)
}

/// Resolve the DB path (respecting relative/absolute config) and open the
/// catalog database.
pub fn open_catalog_db(layout: &StoreLayout) -> Result<(IdentConfig, PathBuf, CatalogDb)> {
    let config = load_config(layout)?;
    let config_db_path = Path::new(&config.db.path);
    let db_path = if config_db_path.is_absolute() {
        config_db_path.to_path_buf()
    } else {
        layout.root.join(config_db_path)
    };
    let db = CatalogDb::open(&db_path)
        .with_context(|| format!("Failed to open catalog database at {}", db_path.display()))?;
    Ok((config, db_path, db))
}

/// Convenience wrapper bundling layout, config, db path, and an open
/// catalog database.
#[derive(Debug)]
pub struct StoreContext {
    pub layout: StoreLayout,
    pub config: IdentConfig,
    pub db_path: PathBuf,
    pub db: CatalogDb,
}

impl StoreContext {
    /// Load store config and open the catalog for a given root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = StoreLayout::new(root);
        let (config, db_path, db) = open_catalog_db(&layout)?;
        Ok(Self { layout, config, db_path, db })
    }
}
