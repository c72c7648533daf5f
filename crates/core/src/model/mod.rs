//! Core value types shared by the matchers and the resolver.
//!
//! Everything here is a plain, immutable result shape: created once by a
//! parse/match call, handed to the caller, never mutated afterwards. The
//! fields are deliberately explicit (no open-ended maps) so invariants like
//! "first pattern match wins" are enforced where the value is built.

use serde::{Deserialize, Serialize};

/// One pattern that produced at least one hit during a scan.
///
/// `count` is the total number of non-overlapping occurrences; `matched` is
/// the decoded text of the first occurrence. `offset` is only populated by
/// the string-extractor fallback, where the byte offset of the run is the
/// most useful diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: String,
    pub matched: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// Result of content-based parsing of a firmware image.
///
/// `software_id`, once set, is never overwritten within a single parse call:
/// the first signature (in table order) that matches owns the primary fields,
/// later matches only append to `all_matches`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub software_id: Option<String>,
    pub hardware_id: Option<String>,
    pub brand: Option<String>,
    pub ecu_family: Option<String>,
    pub file_size: u64,
    pub confidence: f32,
    pub all_matches: Vec<PatternMatch>,
}

impl ParseResult {
    /// A result carrying only the input size, before any pattern has matched.
    pub fn empty(file_size: u64) -> Self {
        Self { file_size, ..Self::default() }
    }

    /// True if any extraction strategy produced a primary identifier.
    pub fn identified(&self) -> bool {
        self.software_id.is_some()
    }
}

/// A single identifier recognized in OCR-derived text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrMatch {
    pub id: String,
    pub pattern_type: String,
    pub confidence: f32,
}

/// Outcome of running the text-pattern matcher over OCR output.
///
/// Empty input text and zero pattern hits are both *normal* outcomes here,
/// represented by an empty `matches` list; they are distinguishable from a
/// catalog-lookup miss, which only happens further downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrOutcome {
    /// First 500 chars of the normalized input, for operator diagnostics.
    pub text_preview: String,
    /// All recognized identifiers, best first.
    pub matches: Vec<OcrMatch>,
    /// Highest-confidence match, if any.
    pub best_match: Option<OcrMatch>,
    /// Which OCR engine produced the text (reported by the caller, opaque here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl OcrOutcome {
    /// True if at least one identifier was recognized in the text.
    pub fn found(&self) -> bool {
        !self.matches.is_empty()
    }
}
