//! Candidate assembly and catalog resolution.
//!
//! All extractors feed this module: their candidate identifiers are merged
//! into one de-duplicated, precedence-ordered list and tried against the
//! catalog until one resolves or the list is exhausted. Precedence across
//! the feeding components:
//!
//! 1. Smart filename tokens — probed before any content parsing; a hit
//!    short-circuits everything else.
//! 2. The content-derived identifier (byte signature, else string fallback).
//! 3. Filename-regex candidates.
//! 4. Remaining unmatched-pattern alternates from the signature scan.
//!
//! A candidate list that resolves nothing is a normal terminal state
//! ("escalate to manual review"), never an error.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{CatalogDb, CatalogError, FirmwareRecord};
use crate::model::{OcrOutcome, ParseResult};
use crate::parse::{self, filename, ocr, ParseError};

/// The catalog capability the resolver needs: a case-insensitive substring
/// lookup on the software identifier, first hit wins.
///
/// `CatalogDb` implements this; tests use an in-memory double.
pub trait CatalogLookup {
    fn find_by_software_id(&self, query: &str) -> Result<Option<FirmwareRecord>, CatalogError>;
}

impl CatalogLookup for CatalogDb {
    fn find_by_software_id(&self, query: &str) -> Result<Option<FirmwareRecord>, CatalogError> {
        CatalogDb::find_by_software_id(self, query)
    }
}

/// Error type for identification entry points that touch the filesystem
/// or the catalog. Everything recoverable stays inside the result values.
#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Outcome of sweeping a candidate list against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub found: bool,
    /// The candidate (as supplied, not its stripped variant) that hit.
    pub matched_candidate: Option<String>,
    pub record: Option<FirmwareRecord>,
    /// Every candidate that was tried, in order — the escalation diagnostic
    /// when nothing resolved.
    pub candidates: Vec<String>,
}

impl Resolution {
    fn not_found(candidates: Vec<String>) -> Self {
        Self { found: false, matched_candidate: None, record: None, candidates }
    }
}

/// Full identification outcome for a firmware upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub resolution: Resolution,
    /// Content parse diagnostics; `None` when the smart filename path
    /// short-circuited before content parsing ran.
    pub parse: Option<ParseResult>,
    /// True when a smart filename token resolved directly.
    pub smart_short_circuit: bool,
}

/// Identification outcome for the OCR text path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrIdentification {
    pub outcome: OcrOutcome,
    pub resolution: Resolution,
}

/// Try each candidate in order against the catalog.
///
/// Every candidate is probed as supplied, then (on a miss) with dashes,
/// underscores and spaces stripped. The first hit anywhere stops the whole
/// sweep. No hit returns `found = false` with the full candidate list.
pub fn resolve<C: CatalogLookup>(
    catalog: &C,
    candidates: &[String],
) -> Result<Resolution, CatalogError> {
    for candidate in candidates {
        if candidate.is_empty() {
            continue;
        }

        if let Some(record) = catalog.find_by_software_id(candidate)? {
            info!(candidate = %candidate, firmware_id = record.id, "catalog hit");
            return Ok(Resolution {
                found: true,
                matched_candidate: Some(candidate.clone()),
                record: Some(record),
                candidates: candidates.to_vec(),
            });
        }

        let stripped: String =
            candidate.chars().filter(|c| !matches!(c, '-' | '_' | ' ')).collect();
        if stripped.len() != candidate.len() && !stripped.is_empty() {
            if let Some(record) = catalog.find_by_software_id(&stripped)? {
                info!(
                    candidate = %candidate,
                    stripped = %stripped,
                    firmware_id = record.id,
                    "catalog hit on stripped variant"
                );
                return Ok(Resolution {
                    found: true,
                    matched_candidate: Some(candidate.clone()),
                    record: Some(record),
                    candidates: candidates.to_vec(),
                });
            }
        }
    }

    debug!(tried = candidates.len(), "no catalog match");
    Ok(Resolution::not_found(candidates.to_vec()))
}

/// End-to-end identification pipeline over one catalog.
///
/// Bundles the catalog handle with the smart-token stoplist so callers
/// configure once and identify many times.
pub struct Identifier<'a, C: CatalogLookup> {
    pub catalog: &'a C,
    pub stoplist: Vec<String>,
}

impl<'a, C: CatalogLookup> Identifier<'a, C> {
    /// Identifier with the built-in default stoplist.
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog, stoplist: filename::default_stoplist() }
    }

    /// Identifier with a deployment-configured stoplist.
    pub fn with_stoplist(catalog: &'a C, stoplist: Vec<String>) -> Self {
        Self { catalog, stoplist }
    }

    /// Identify an in-memory firmware image plus its reported filename.
    ///
    /// The filename may be empty (untrusted upload metadata); it then
    /// contributes no candidates.
    pub fn identify_data(
        &self,
        data: &[u8],
        upload_name: &str,
    ) -> Result<Identification, CatalogError> {
        // Smart filename tokens first: empirically the highest-precision
        // signal, and a hit makes content parsing unnecessary.
        let smart = filename::smart_tokens(upload_name, &self.stoplist);
        if !smart.is_empty() {
            let resolution = resolve(self.catalog, &smart)?;
            if resolution.found {
                return Ok(Identification {
                    resolution,
                    parse: None,
                    smart_short_circuit: true,
                });
            }
        }

        let parse_result = parse::parse_data(data);
        let candidates = assemble_candidates(&parse_result, upload_name);
        let resolution = resolve(self.catalog, &candidates)?;

        Ok(Identification { resolution, parse: Some(parse_result), smart_short_circuit: false })
    }

    /// Identify a firmware image from disk.
    pub fn identify_file(
        &self,
        path: &Path,
        upload_name: Option<&str>,
    ) -> Result<Identification, IdentifyError> {
        let data = std::fs::read(path)
            .map_err(|source| ParseError::Io { path: path.display().to_string(), source })?;
        let name = upload_name
            .map(str::to_string)
            .or_else(|| {
                path.file_name().and_then(|os| os.to_str()).map(str::to_string)
            })
            .unwrap_or_default();
        Ok(self.identify_data(&data, &name)?)
    }

    /// Identify from OCR-derived text: pattern-match the text, then try the
    /// recognized IDs (best first) against the catalog.
    pub fn identify_ocr_text(
        &self,
        text: &str,
        provider: Option<&str>,
    ) -> Result<OcrIdentification, CatalogError> {
        let outcome = ocr::process_text(text, provider);
        let ids: Vec<String> = outcome.matches.iter().map(|m| m.id.clone()).collect();
        let resolution = resolve(self.catalog, &ids)?;
        Ok(OcrIdentification { outcome, resolution })
    }
}

/// Merge content- and filename-derived candidates in precedence order.
///
/// Order: primary content identifier, then filename-regex candidates, then
/// the unmatched-pattern alternates recorded during the signature scan.
/// De-duplicated case-insensitively, first occurrence wins.
fn assemble_candidates(parse_result: &ParseResult, upload_name: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(id) = &parse_result.software_id {
        candidates.push(id.clone());
    }

    candidates.extend(filename::extract_ids_from_filename(upload_name));

    for m in &parse_result.all_matches {
        if Some(&m.matched) != parse_result.software_id.as_ref() {
            candidates.push(m.matched.clone());
        }
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.to_uppercase()));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PatternMatch;

    #[test]
    fn assemble_orders_content_then_filename_then_alternates() {
        let parse_result = ParseResult {
            software_id: Some("89663-47351".to_string()),
            confidence: 0.9,
            all_matches: vec![
                PatternMatch {
                    pattern: "denso_toyota".to_string(),
                    matched: "89663-47351".to_string(),
                    count: 1,
                    offset: None,
                },
                PatternMatch {
                    pattern: "bosch_10digit".to_string(),
                    matched: "1234567890".to_string(),
                    count: 2,
                    offset: None,
                },
            ],
            ..ParseResult::default()
        };

        let candidates = assemble_candidates(&parse_result, "F01R0AD3G0.bin");
        assert_eq!(candidates[0], "89663-47351");
        assert!(candidates.iter().position(|c| c == "F01R0AD3G0").unwrap()
            < candidates.iter().position(|c| c == "1234567890").unwrap());
    }
}
