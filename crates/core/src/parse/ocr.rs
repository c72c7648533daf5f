//! Text-pattern matcher for OCR-derived screenshot text.
//!
//! The screen-rendered part-number library is larger and looser than the
//! byte-signature table: OCR text is noisy, spacing is unreliable, and the
//! same identifier may appear dashed or spaced. Input is upper-cased and
//! whitespace-collapsed before matching; matched IDs are normalized by
//! removing spaces (dashes are kept).
//!
//! The two catch-all families at the end of the table exist to surface
//! *something* for unknown formats; they are scored low so any specific
//! family outranks them.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{OcrMatch, OcrOutcome};

/// Confidence for specific (manufacturer-shaped) pattern families.
pub const SPECIFIC_CONFIDENCE: f32 = 0.95;

/// Confidence for the catch-all families.
pub const CATCH_ALL_CONFIDENCE: f32 = 0.5;

/// Diagnostics keep at most this much of the normalized text.
const TEXT_PREVIEW_LEN: usize = 500;

/// One text-pattern family for screen-rendered identifiers.
#[derive(Debug)]
pub struct TextPattern {
    /// Family label reported as `OcrMatch::pattern_type`.
    pub name: &'static str,
    pub regex: Regex,
    /// Catch-all families score 0.5 instead of 0.95.
    pub catch_all: bool,
}

impl TextPattern {
    fn new(name: &'static str, pattern: &str, catch_all: bool) -> Self {
        let regex = Regex::new(pattern).expect("invalid text pattern");
        Self { name, regex, catch_all }
    }
}

/// Ordered pattern table for OCR text. Ties in confidence keep this order,
/// so more specific shapes sit earlier.
static TEXT_PATTERNS: LazyLock<Vec<TextPattern>> = LazyLock::new(|| {
    vec![
        // Toyota/Lexus/Subaru: 89663-47351, 89666-02J22
        TextPattern::new("Toyota/Lexus", r"\b(89[0-9]{3}[-\s]?[0-9A-Z]{5})\b", false),
        // VAG (VW/Audi/Skoda/Seat): 03L906018RR, 4L0910552B
        TextPattern::new("VAG", r"\b([0-9][A-Z][0-9][A-Z]?[0-9]{6}[A-Z]{0,3})\b", false),
        // BMW: 7-digit codes like 7626957, 8615088
        TextPattern::new("BMW", r"\b(7[0-9]{6}|8[0-9]{6})\b", false),
        // Mercedes: A2789003500
        TextPattern::new("Mercedes", r"\b(A[0-9]{10})\b", false),
        // Hyundai/Kia: 39128-2B270
        TextPattern::new("Hyundai/Kia", r"\b(39[0-9]{3}[-\s]?[0-9][A-Z][0-9]{3})\b", false),
        // Ford: AV6A-12A650-AXD (three dashed blocks)
        TextPattern::new(
            "Ford",
            r"\b([A-Z]{2}[0-9][A-Z][-\s]?[0-9]{2}[A-Z][0-9]{3}[-\s]?[A-Z]{2,3})\b",
            false,
        ),
        // Bosch ECU part numbers: 0281018428, 0261206076
        TextPattern::new("Bosch ECU", r"\b(02[68]1[0-9]{6})\b", false),
        // Denso part numbers: 275700-0193
        TextPattern::new("Denso", r"\b(27[0-9]{4}[-\s]?[0-9]{4})\b", false),
        // Continental: A2C53374830
        TextPattern::new("Continental", r"\b(A2C[0-9]{8})\b", false),
        // UAES/Bosch China: F01R0AD3G0, F01RB0D2T4
        TextPattern::new("UAES/Bosch China", r"\b(F01R[0-9A-Z]{5,8})\b", false),
        // Chinese ECU calibration: GCQBRB44CQS03A00
        TextPattern::new("Chinese ECU", r"\b(GCQ[A-Z0-9]{10,15})\b", false),
        // Chinese ECU type 2: FE315NMT
        TextPattern::new("Chinese ECU FE", r"\b(FE[0-9]{3}[A-Z0-9]{2,5})\b", false),
        // UAES B05: B05_0100F01R00DGQ7
        TextPattern::new("UAES B05", r"\b(B0[0-9]_[0-9A-Z]{10,20})\b", false),
        // LB calibration: LB6WA001
        TextPattern::new("LB Calibration", r"\b(LB[0-9][A-Z]{2}[0-9]{3})\b", false),
        // Engine type: J4G15, J4G12
        TextPattern::new("Engine Type", r"\b(J[0-9][A-Z][0-9]{2})\b", false),
        // Chinese VIN-like serial: YHK382455XB000329
        TextPattern::new("VIN/Serial", r"\b([A-Z]{2,3}[0-9]{5,6}[A-Z0-9]{8,10})\b", false),
        // Bosch MED17/EDC17: 1037XXXXXXX
        TextPattern::new("Bosch MED17", r"\b(1037[0-9]{6,10})\b", false),
        // Catch-alls for unknown formats.
        TextPattern::new("Generic", r"\b([A-Z0-9]{2,6}-[A-Z0-9]{2,6}-?[A-Z0-9]{0,6})\b", true),
        TextPattern::new("Calibration ID", r"\b([0-9]{5}-[0-9A-Z]{5})\b", true),
    ]
});

/// The static text-pattern table, in registration order.
pub fn text_patterns() -> &'static [TextPattern] {
    &TEXT_PATTERNS
}

/// Find all firmware identifiers in free text.
///
/// Returns matches sorted by confidence descending; ties keep table order.
/// IDs are upper-cased and space-stripped, and de-duplicated across all
/// families (first family to produce an ID keeps it).
pub fn find_firmware_ids(text: &str) -> Vec<OcrMatch> {
    let normalized = normalize(text);
    let mut results = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for pattern in text_patterns() {
        for caps in pattern.regex.captures_iter(&normalized) {
            let Some(m) = caps.get(1) else { continue };
            let id = m.as_str().replace(' ', "");
            if !seen.insert(id.clone()) {
                continue;
            }

            let confidence =
                if pattern.catch_all { CATCH_ALL_CONFIDENCE } else { SPECIFIC_CONFIDENCE };
            results.push(OcrMatch { id, pattern_type: pattern.name.to_string(), confidence });
        }
    }

    // Stable sort: equal confidence preserves table order.
    results.sort_by(|a, b| {
        b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(matches = results.len(), "ocr text scan");
    results
}

/// Run the text matcher and wrap the outcome for callers.
///
/// Empty text and zero matches are normal outcomes, not errors; the caller
/// can distinguish them from a catalog miss further down the pipeline.
/// `provider` names the OCR engine that produced the text and is passed
/// through untouched for diagnostics.
pub fn process_text(text: &str, provider: Option<&str>) -> OcrOutcome {
    let normalized = normalize(text);
    let matches = if normalized.is_empty() { Vec::new() } else { find_firmware_ids(text) };
    let best_match = matches.first().cloned();

    OcrOutcome {
        text_preview: truncate(&normalized, TEXT_PREVIEW_LEN),
        matches,
        best_match,
        provider: provider.map(str::to_string),
    }
}

/// Upper-case and collapse all whitespace runs to single spaces.
fn normalize(text: &str) -> String {
    text.to_uppercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
