use anyhow::{Context, Result};
use fwident_core::catalog::NewFirmware;
use fwident_core::store::StoreContext;

use crate::canonicalize_or_current;

/// Register a single firmware record in the catalog.
#[allow(clippy::too_many_arguments)]
pub fn add_firmware_command(
    root: &str,
    brand: &str,
    series: Option<String>,
    ecu_brand: Option<String>,
    software_id: Option<String>,
    hardware_id: Option<String>,
    file_size: Option<i64>,
    price: Option<f64>,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = StoreContext::from_root(&root_path)?;

    let record = NewFirmware {
        brand: brand.to_string(),
        series,
        ecu_brand,
        software_id,
        hardware_id,
        file_size,
        price,
    };

    let id = ctx.db.insert_firmware(&record).context("Failed to insert firmware record")?;

    println!("Added firmware:");
    println!("  Id: {}", id);
    println!("  Brand: {}", record.brand);
    println!("  Series: {}", record.series.as_deref().unwrap_or("-"));
    println!("  Software ID: {}", record.software_id.as_deref().unwrap_or("-"));
    println!("  DB: {}", ctx.db_path.display());

    Ok(())
}

/// Bulk-import firmware records from a JSON file.
///
/// The file holds an array of firmware objects (same fields as
/// `add-firmware` flags). Records whose `software_id` already exists in the
/// catalog are skipped, so re-running an import is safe.
pub fn import_catalog_command(root: &str, file: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = StoreContext::from_root(&root_path)?;

    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read import file {file}"))?;
    let records: Vec<NewFirmware> =
        serde_json::from_str(&contents).context("Failed to parse import file JSON")?;

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for record in &records {
        if let Some(software_id) = record.software_id.as_deref() {
            if ctx.db.has_software_id(software_id)? {
                skipped += 1;
                continue;
            }
        }
        ctx.db.insert_firmware(record).context("Failed to insert firmware record")?;
        inserted += 1;
    }

    if json {
        let summary = serde_json::json!({
            "total": records.len(),
            "inserted": inserted,
            "skipped": skipped,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Import complete: {} total, {} inserted, {} skipped", records.len(), inserted, skipped);
    }

    Ok(())
}

/// List all firmware records in the catalog.
pub fn list_firmwares_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = StoreContext::from_root(&root_path)?;

    let firmwares = ctx.db.list_firmwares().context("Failed to list firmwares")?;

    if json {
        let serialized = serde_json::to_string_pretty(&firmwares)?;
        println!("{}", serialized);
        return Ok(());
    }

    if firmwares.is_empty() {
        println!("Firmwares:");
        println!("(none)");
        return Ok(());
    }

    println!("Firmwares:");
    for fw in firmwares {
        println!(
            "- [{}] {} {} (ECU: {}, SW: {})",
            fw.id,
            fw.brand,
            fw.series.as_deref().unwrap_or("-"),
            fw.ecu_brand.as_deref().unwrap_or("-"),
            fw.software_id.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

/// Show aggregate catalog statistics.
pub fn stats_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = StoreContext::from_root(&root_path)?;

    let stats = ctx.db.stats().context("Failed to read catalog stats")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Catalog statistics:");
        println!("  Firmwares: {}", stats.total_firmwares);
        println!("  Brands: {}", stats.total_brands);
        println!("  ECU types: {}", stats.total_ecu_types);
    }

    Ok(())
}
