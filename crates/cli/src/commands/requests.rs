use anyhow::{Context, Result};
use fwident_core::store::StoreContext;

use crate::canonicalize_or_current;

/// List recorded identification requests.
pub fn requests_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = StoreContext::from_root(&root_path)?;

    let requests = ctx.db.list_requests().context("Failed to list requests")?;

    if json {
        let serialized = serde_json::to_string_pretty(&requests)?;
        println!("{}", serialized);
        return Ok(());
    }

    if requests.is_empty() {
        println!("Requests:");
        println!("(none)");
        return Ok(());
    }

    println!("Requests:");
    for req in requests {
        let filename = req.filename.as_deref().unwrap_or("(text)");
        let candidate = req.matched_candidate.as_deref().unwrap_or("-");
        println!(
            "- [{}] {} (candidate: {}, at: {})",
            req.status.as_str(),
            filename,
            candidate,
            req.created_at
        );
    }

    Ok(())
}
