//! Content-based firmware parsing.
//!
//! Strategy order for a raw image:
//! 1. `signatures` — byte-regex scan against the known manufacturer table.
//! 2. `strings` — printable-run fallback when no signature hits.
//!
//! `filename` and `ocr` are independent extractors over the upload name and
//! OCR-derived text; the resolver combines all of them.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::model::{ParseResult, PatternMatch};

pub mod filename;
pub mod ocr;
pub mod signatures;
pub mod strings;

/// Pattern name used for string-extractor fallback entries in `all_matches`.
pub const STRING_SEARCH_PATTERN: &str = "string_search";

/// Confidence assigned to identifiers found by the string fallback.
pub const STRING_SEARCH_CONFIDENCE: f32 = 0.5;

/// At most this many fallback candidates are surfaced as diagnostics.
const STRING_SEARCH_DIAGNOSTICS: usize = 5;

/// Error type for content parsing entry points.
///
/// Unreadable input surfaces as an explicit error value; a partial
/// `ParseResult` is never returned for it. Everything else (no matches,
/// empty buffer) is a normal result, not an error.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The firmware image could not be read from disk.
    #[error("Failed to read firmware image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse an in-memory firmware buffer.
///
/// Runs the byte-signature scan; when no signature matches, falls back to
/// printable-string extraction over the head of the buffer. Infallible:
/// a buffer that yields nothing returns a result with `software_id = None`.
pub fn parse_data(data: &[u8]) -> ParseResult {
    let mut result = signatures::match_signatures(data);

    if result.software_id.is_none() {
        apply_string_fallback(data, &mut result);
    }

    if let Some(id) = &result.software_id {
        info!(software_id = %id, confidence = result.confidence, "firmware identified");
    } else {
        debug!(file_size = result.file_size, "no identifier found in content");
    }

    result
}

/// Parse a firmware image from disk.
///
/// IO failures are returned as `ParseError::Io`; the parse itself cannot
/// fail once the bytes are in memory.
pub fn parse_file(path: &Path) -> Result<ParseResult, ParseError> {
    let data = std::fs::read(path)
        .map_err(|source| ParseError::Io { path: path.display().to_string(), source })?;
    Ok(parse_data(&data))
}

/// Fill a signature-less result from the string extractor.
///
/// The first filtered candidate becomes the primary identifier at low
/// confidence; up to 5 candidates are recorded with their hex offsets.
fn apply_string_fallback(data: &[u8], result: &mut ParseResult) {
    let runs = strings::extract_strings(data, strings::MIN_STRING_LENGTH);
    let candidates = strings::filter_candidates(&runs);

    let Some((_, first)) = candidates.first() else { return };

    result.software_id = Some(first.clone());
    result.confidence = STRING_SEARCH_CONFIDENCE;

    for (offset, s) in candidates.iter().take(STRING_SEARCH_DIAGNOSTICS) {
        // Identical runs recurring at different offsets would duplicate the
        // (pattern, matched) pair; keep the first occurrence only.
        if result.all_matches.iter().any(|m| m.matched == *s) {
            continue;
        }
        result.all_matches.push(PatternMatch {
            pattern: STRING_SEARCH_PATTERN.to_string(),
            matched: s.clone(),
            count: 1,
            offset: Some(format!("{offset:#x}")),
        });
    }
}
