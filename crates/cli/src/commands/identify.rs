use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use fwident_core::catalog::{RequestRecord, RequestStatus};
use fwident_core::parse::filename::{default_stoplist, extract_ids_from_filename, smart_tokens};
use fwident_core::parse::signatures::identify_ecu_vendor;
use fwident_core::resolve::{Identification, Identifier};
use fwident_core::store::StoreContext;

use crate::{canonicalize_or_current, sha256_hex};

/// Identify a firmware image file against the store's catalog.
///
/// Runs the full pipeline (smart filename tokens, byte signatures, string
/// fallback, filename regexes), records the attempt as a request row, and
/// reports either the matched record or a "needs manual review" summary
/// with the attempted candidates.
pub fn identify_command(
    root: &str,
    file: &str,
    upload_name: Option<String>,
    json: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = StoreContext::from_root(&root_path)?;

    let path = Path::new(file);
    if !path.is_file() {
        return Err(anyhow!("Firmware file does not exist: {}", path.display()));
    }

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read firmware file {}", path.display()))?;
    let name = upload_name.unwrap_or_else(|| {
        path.file_name().and_then(|os| os.to_str()).unwrap_or(file).to_string()
    });

    let identifier = Identifier::with_stoplist(&ctx.db, ctx.config.stoplist.clone());
    let ident = identifier.identify_data(&data, &name)?;

    record_request(&ctx, &ident, Some(&name), Some(sha256_hex(&data)))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ident)?);
        return Ok(());
    }

    print_identification(&ident, &name, &data);
    Ok(())
}

/// Identify firmware from OCR-derived text (screenshot path).
///
/// The text comes either from `--text` or from a file; `--provider` names
/// the OCR engine for diagnostics and is not interpreted.
pub fn match_text_command(
    root: &str,
    text: Option<String>,
    text_file: Option<String>,
    provider: Option<String>,
    json: bool,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = StoreContext::from_root(&root_path)?;

    let text = match (text, text_file) {
        (Some(t), _) => t,
        (None, Some(f)) => std::fs::read_to_string(&f)
            .with_context(|| format!("Failed to read text file {f}"))?,
        (None, None) => return Err(anyhow!("Provide --text or --text-file")),
    };

    let identifier = Identifier::with_stoplist(&ctx.db, ctx.config.stoplist.clone());
    let result = identifier.identify_ocr_text(&text, provider.as_deref())?;

    // Both outcomes are bookkept, like file uploads.
    let status =
        if result.resolution.found { RequestStatus::Matched } else { RequestStatus::Manual };
    let request = RequestRecord {
        filename: None,
        file_hash: None,
        firmware_id: result.resolution.record.as_ref().map(|r| r.id),
        matched_candidate: result.resolution.matched_candidate.clone(),
        confidence: result.outcome.best_match.as_ref().map(|m| f64::from(m.confidence)),
        status,
        created_at: Utc::now().to_rfc3339(),
    };
    ctx.db.insert_request(&request).context("Failed to record request")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.outcome.found() {
        println!("No firmware ID recognized in the text.");
        if let Some(provider) = &result.outcome.provider {
            println!("OCR provider: {}", provider);
        }
        return Ok(());
    }

    println!("Recognized IDs:");
    for m in &result.outcome.matches {
        println!("  - {} ({}, {:.0}%)", m.id, m.pattern_type, m.confidence * 100.0);
    }

    match (&result.resolution.record, &result.resolution.matched_candidate) {
        (Some(record), Some(candidate)) => {
            println!();
            println!("Firmware found in catalog (matched: {}):", candidate);
            println!("  Id: {}", record.id);
            println!("  Brand: {}", record.brand);
            println!("  Series: {}", record.series.as_deref().unwrap_or("-"));
            println!("  ECU: {}", record.ecu_brand.as_deref().unwrap_or("-"));
            println!("  Software ID: {}", record.software_id.as_deref().unwrap_or("-"));
        }
        _ => {
            println!();
            println!("No catalog match; forwarded for manual review.");
        }
    }

    Ok(())
}

/// Debug view of filename-based extraction: the candidate list and the
/// smart tokens a given upload name would produce.
pub fn filename_ids_command(name: &str, json: bool) -> Result<()> {
    let ids = extract_ids_from_filename(name);
    let tokens = smart_tokens(name, &default_stoplist());

    if json {
        let out = serde_json::json!({
            "filename": name,
            "candidates": ids,
            "smart_tokens": tokens,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Filename: {}", name);
    println!("Candidates ({}):", ids.len());
    for id in &ids {
        println!("  - {}", id);
    }
    println!("Smart tokens ({}):", tokens.len());
    for token in &tokens {
        println!("  - {}", token);
    }

    Ok(())
}

/// Persist an identification attempt in the store.
fn record_request(
    ctx: &StoreContext,
    ident: &Identification,
    filename: Option<&str>,
    file_hash: Option<String>,
) -> Result<()> {
    let status =
        if ident.resolution.found { RequestStatus::Matched } else { RequestStatus::Manual };
    let request = RequestRecord {
        filename: filename.map(str::to_string),
        file_hash,
        firmware_id: ident.resolution.record.as_ref().map(|r| r.id),
        matched_candidate: ident.resolution.matched_candidate.clone(),
        confidence: ident.parse.as_ref().map(|p| f64::from(p.confidence)),
        status,
        created_at: Utc::now().to_rfc3339(),
    };
    ctx.db.insert_request(&request).context("Failed to record request")?;
    Ok(())
}

/// Human-readable identification report.
fn print_identification(ident: &Identification, name: &str, data: &[u8]) {
    println!("File: {}", name);

    if let Some(parse) = &ident.parse {
        println!("Parsed: confidence {:.0}%", parse.confidence * 100.0);
        if let Some(id) = &parse.software_id {
            println!("  Software ID: {}", id);
        }
        if let Some(brand) = &parse.brand {
            println!("  Brand: {}", brand);
        }
        if let Some(ecu) = &parse.ecu_family {
            println!("  ECU: {}", ecu);
        }
        for m in &parse.all_matches {
            match &m.offset {
                Some(offset) => println!("  - {} @ {}: {}", m.pattern, offset, m.matched),
                None => println!("  - {} (x{}): {}", m.pattern, m.count, m.matched),
            }
        }
    } else if ident.smart_short_circuit {
        println!("Matched directly from filename token; content parsing skipped.");
    }

    println!();
    match (&ident.resolution.record, &ident.resolution.matched_candidate) {
        (Some(record), Some(candidate)) => {
            println!("Firmware found in catalog (matched: {}):", candidate);
            println!("  Id: {}", record.id);
            println!("  Brand: {}", record.brand);
            println!("  Series: {}", record.series.as_deref().unwrap_or("-"));
            println!("  ECU: {}", record.ecu_brand.as_deref().unwrap_or("-"));
            println!("  Software ID: {}", record.software_id.as_deref().unwrap_or("-"));
            if let Some(price) = record.price {
                println!("  Price: {:.2}", price);
            }
        }
        _ => {
            println!("Firmware not found in catalog; needs manual review.");
            if let Some(vendor) = identify_ecu_vendor(data) {
                println!("  Likely ECU vendor: {}", vendor);
            }
            if !ident.resolution.candidates.is_empty() {
                println!("  Tried candidates:");
                for candidate in &ident.resolution.candidates {
                    println!("    - {}", candidate);
                }
            }
        }
    }
}
