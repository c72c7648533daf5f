//! Identifier extraction from uploaded file names.
//!
//! Chinese-market ECU dumps frequently carry no in-image signature at all;
//! the upload filename is then the most reliable signal available. Two
//! strategies feed the resolver:
//!
//! - `extract_ids_from_filename`: the cleaned name itself plus an ordered
//!   family of vendor-shaped regexes, every match collected.
//! - `smart_tokens`: separator-split tokens of the cleaned name, filtered
//!   against a stoplist; these probe the catalog directly and take
//!   precedence over content parsing.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Trailing `-YYYYMMDD-HHMMSS` stamps that export tools append to dumps.
static RE_DATE_STAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d{8}-\d{6}").expect("invalid date stamp regex"));

/// Trailing extension: a dot plus 2-4 word characters.
static RE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\w{2,4}$").expect("invalid extension regex"));

/// Splitter for `smart_tokens`: underscores and whitespace.
static RE_TOKEN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\s]+").expect("invalid token split regex"));

/// Vendor identifier shapes observed in real upload names, in precedence
/// order. Every pattern carries one capture group; all matches from all
/// patterns are collected, not just the first.
static FILENAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Full Chinese calibration code, 13-20 chars: GCQBRB44CQS03A00
        r"(?i)([A-Z]{3,5}[A-Z0-9]{10,15})",
        // UAES/Bosch China: F01R0AD3G0, F01RB0D2T4
        r"(?i)(F01R[0-9A-Z]{5,10})",
        // Denso/Toyota MCU + calibration: R7F701202_89663-06N50
        r"(?i)(R7F[0-9]+_[0-9A-Z-]+)",
        // Denso part number: 89663-06N50
        r"(?i)([0-9]{5}-[0-9A-Z]{4,6})",
        // Bosch MED17/EDC17 VIN tag: vi_004782 -> 004782
        r"(?i)vi_(\d{6,8})",
        // Underscore-delimited 10-digit Bosch serial
        r"_(\d{10})_",
        // Bosch SW number: 27XXXXXXXX / 26XXXXXXXX
        r"(2[67]\d{8})",
        // Bosch 1037 family
        r"(103\d{7,10})",
        // Hyundai/Kia calibration: GR/GN prefixed
        r"(?i)(G[RN][A-Z0-9]{8,14})",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("invalid filename pattern"))
    .collect()
});

/// Default stoplist for `smart_tokens`: brand, model, and generic upload
/// words that are never identifiers. Deployments extend or replace this via
/// store configuration.
pub const DEFAULT_STOPLIST: &[&str] = &[
    "toyota",
    "lexus",
    "mazda",
    "honda",
    "subaru",
    "nissan",
    "hyundai",
    "mercedes",
    "original",
    "virgin",
    "backup",
    "tuning",
    "stage1",
    "stage2",
    "egroff",
    "dpfoff",
    "прошивка",
    "оригинал",
];

/// Strip the date-time stamp and the extension from an upload name.
pub fn clean_filename(filename: &str) -> String {
    let without_stamp = RE_DATE_STAMP.replace_all(filename, "");
    RE_EXTENSION.replace(&without_stamp, "").trim().to_string()
}

/// Derive candidate identifiers from a filename alone.
///
/// The cleaned name itself is seeded as the first candidate when it is at
/// least 6 characters long, then every vendor pattern contributes all of
/// its matches. The result is de-duplicated case-insensitively with
/// first-seen order preserved.
pub fn extract_ids_from_filename(filename: &str) -> Vec<String> {
    let clean = clean_filename(filename);
    let mut ids = Vec::new();

    if clean.len() >= 6 {
        ids.push(clean.clone());
    }

    for pattern in FILENAME_PATTERNS.iter() {
        for caps in pattern.captures_iter(&clean) {
            if let Some(m) = caps.get(1) {
                ids.push(m.as_str().to_string());
            }
        }
    }

    let ids = dedup_case_insensitive(ids);
    debug!(filename, candidates = ids.len(), "filename extraction");
    ids
}

/// Split the cleaned filename into direct catalog probe tokens.
///
/// Tokens shorter than 6 characters and tokens on the stoplist are
/// discarded; what survives is tried against the catalog verbatim (the
/// resolver adds separator-stripped variants). Filename tokens are the
/// highest-precision signal available, so callers probe these before any
/// content parsing.
pub fn smart_tokens(filename: &str, stoplist: &[String]) -> Vec<String> {
    let clean = clean_filename(filename);
    let tokens: Vec<String> = RE_TOKEN_SPLIT
        .split(&clean)
        .filter(|t| t.len() >= 6)
        .filter(|t| {
            let lower = t.to_lowercase();
            !stoplist.iter().any(|s| s.to_lowercase() == lower)
        })
        .map(str::to_string)
        .collect();

    dedup_case_insensitive(tokens)
}

/// The default stoplist as owned strings, for configs and callers without
/// a store.
pub fn default_stoplist() -> Vec<String> {
    DEFAULT_STOPLIST.iter().map(|s| s.to_string()).collect()
}

fn dedup_case_insensitive(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for id in ids {
        if seen.insert(id.to_uppercase()) {
            unique.push(id);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_stamp_and_extension() {
        assert_eq!(clean_filename("Z601EF000Z6V5060-20251229-125826.bin"), "Z601EF000Z6V5060");
        assert_eq!(clean_filename("dump.bin"), "dump");
        assert_eq!(clean_filename("no_extension"), "no_extension");
    }

    #[test]
    fn short_cleaned_names_are_not_seeded() {
        let ids = extract_ids_from_filename("a.bin");
        assert!(ids.is_empty());
    }

    #[test]
    fn seed_comes_before_pattern_matches() {
        let ids = extract_ids_from_filename("F01R0AD3G0_extra.bin");
        assert_eq!(ids[0], "F01R0AD3G0_extra");
        assert!(ids.iter().any(|id| id == "F01R0AD3G0"));
    }

    #[test]
    fn duplicates_are_removed_case_insensitively() {
        let ids = extract_ids_from_filename("f01r0ad3g0.bin");
        // Seed and pattern match differ only by case; only the seed stays.
        assert_eq!(ids, vec!["f01r0ad3g0".to_string()]);
    }

    #[test]
    fn smart_tokens_drop_short_and_stoplisted_words() {
        let stoplist = default_stoplist();
        let tokens = smart_tokens("toyota_GATA-BE42QS09A00_v2.bin", &stoplist);
        assert_eq!(tokens, vec!["GATA-BE42QS09A00".to_string()]);
    }
}
