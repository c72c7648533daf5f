use std::fs;

use anyhow::{Context, Result};
use fwident_core::catalog::CatalogDb;
use fwident_core::store::{IdentConfig, StoreContext, StoreLayout};

use crate::{canonicalize_or_current, infer_store_name};

/// Initialize a new identification store at `root`.
///
/// Creates the `.fwident` metadata directory, writes `ident.json` with the
/// default stoplist, and creates the catalog database immediately so
/// follow-on commands (and tests) can rely on its presence.
pub fn init_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = StoreLayout::new(&root_path);

    // Derive store name if not provided.
    let store_name = match name {
        Some(n) => n,
        None => infer_store_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;

    // Build store config and write it as pretty JSON.
    let db_path_rel = layout.db_path_relative_string();
    let config = IdentConfig::new(&store_name, db_path_rel);
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.config_path, json).with_context(|| {
        format!("Failed to write store config: {}", layout.config_path.display())
    })?;

    CatalogDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize catalog database at {}", layout.db_path.display())
    })?;

    println!("Initialized firmware identification store:");
    println!("  Name: {}", store_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Stoplist entries: {}", config.stoplist.len());

    Ok(())
}

/// Show basic information about an existing store.
pub fn store_info_command(root: &str) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = StoreContext::from_root(&root_path)?;

    println!("Firmware Identification Store");
    println!("=============================");
    println!("Name: {}", ctx.config.name);
    println!("Root: {}", ctx.layout.root.display());
    println!("Config file: {}", ctx.layout.config_path.display());
    println!("Config version: {}", ctx.config.config_version);
    println!("DB path (config): {}", ctx.config.db.path);
    println!("Stoplist entries: {}", ctx.config.stoplist.len());
    println!();

    let stats = ctx.db.stats().context("Failed to read catalog stats")?;
    println!("Catalog:");
    println!("  Firmwares: {}", stats.total_firmwares);
    println!("  Brands: {}", stats.total_brands);
    println!("  ECU types: {}", stats.total_ecu_types);

    Ok(())
}
