//! Byte-signature matcher for raw firmware images.
//!
//! Known manufacturer identifier shapes are expressed as regexes over raw
//! bytes and scanned against the whole buffer. The signature table is a
//! static, ordered list: the first entry that produces any match owns the
//! primary `software_id`/`brand`/`ecu_family` fields, every matching entry
//! contributes a `PatternMatch` entry for diagnostics.

use std::sync::LazyLock;

use regex::bytes::Regex;
use tracing::debug;

use crate::model::{ParseResult, PatternMatch};

/// Confidence assigned when a byte signature identifies the image.
pub const SIGNATURE_CONFIDENCE: f32 = 0.9;

/// A named byte-signature rule for one manufacturer/ECU identifier shape.
#[derive(Debug)]
pub struct ByteSignature {
    /// Stable pattern name used in `PatternMatch::pattern`.
    pub name: &'static str,
    pub regex: Regex,
    /// Vehicle brand implied by the pattern, when it is brand-specific.
    pub brand: Option<&'static str>,
    /// ECU manufacturer/family implied by the pattern.
    pub ecu: Option<&'static str>,
}

impl ByteSignature {
    fn new(
        name: &'static str,
        pattern: &str,
        brand: Option<&'static str>,
        ecu: Option<&'static str>,
    ) -> Self {
        // Table entries are compiled constants; a bad pattern is a programmer
        // error caught by the table smoke test.
        let regex = Regex::new(pattern).expect("invalid byte signature pattern");
        Self { name, regex, brand, ecu }
    }
}

/// Ordered signature table. Registration order is match precedence: the
/// first entry to hit sets the primary fields, ties are never re-ranked by
/// specificity. The generic 10-digit Bosch shape stays last for exactly
/// that reason.
static BYTE_SIGNATURES: LazyLock<Vec<ByteSignature>> = LazyLock::new(|| {
    vec![
        ByteSignature::new("denso_toyota", r"89663-[0-9A-Z]{5}", Some("Toyota"), Some("Denso")),
        ByteSignature::new("denso_lexus", r"89661-[0-9A-Z]{5}", Some("Lexus"), Some("Denso")),
        ByteSignature::new(
            "denso_mazda",
            r"Z6[0-9]{2}[0-9A-Z]{2}C[0-9]{5}",
            Some("Mazda"),
            Some("Denso"),
        ),
        ByteSignature::new(
            "keihin_honda",
            r"37805-[A-Z0-9]{3}-[A-Z0-9]{4}",
            Some("Honda/Acura"),
            Some("Keihin"),
        ),
        ByteSignature::new("bosch_1037", r"1037[0-9]{6,12}[A-Z0-9]*", Some("MB"), Some("Bosch")),
        ByteSignature::new("bosch_27xx", r"27[0-9]{8}", Some("MB"), Some("Bosch")),
        ByteSignature::new("bosch_26xx", r"26[0-9]{8}", Some("MB"), Some("Bosch")),
        ByteSignature::new(
            "hyundai_gcq",
            r"GCQ[A-Z0-9]{10,15}",
            Some("Hyundai/Kia"),
            Some("Bosch"),
        ),
        ByteSignature::new("chinese_f01r", r"F01R[0-9A-Z]{5,10}", None, Some("Bosch/UAES")),
        // Last resort: bare 10-digit Bosch software number.
        ByteSignature::new("bosch_10digit", r"[0-9]{10}", None, Some("Bosch")),
    ]
});

/// The static signature table, in registration order.
pub fn byte_signatures() -> &'static [ByteSignature] {
    &BYTE_SIGNATURES
}

/// Scan a firmware buffer against the signature table.
///
/// Returns a `ParseResult` whose `software_id` is taken from the first
/// matching table entry (confidence fixed at 0.9). An empty buffer or a
/// buffer with no signature hits returns a result with `software_id = None`;
/// the caller decides whether to fall back to string extraction.
pub fn match_signatures(data: &[u8]) -> ParseResult {
    let mut result = ParseResult::empty(data.len() as u64);

    for sig in byte_signatures() {
        let mut count = 0usize;
        let mut first: Option<String> = None;
        for m in sig.regex.find_iter(data) {
            count += 1;
            if first.is_none() {
                first = Some(decode_ascii_lossy(m.as_bytes()));
            }
        }

        let Some(matched) = first else { continue };
        debug!(pattern = sig.name, %matched, count, "byte signature matched");

        result.all_matches.push(PatternMatch {
            pattern: sig.name.to_string(),
            matched: matched.clone(),
            count,
            offset: None,
        });

        // First pattern in table order wins the primary fields; later hits
        // only extend the diagnostics list.
        if result.software_id.is_none() {
            result.software_id = Some(matched);
            result.brand = sig.brand.map(str::to_string);
            result.ecu_family = sig.ecu.map(str::to_string);
            result.confidence = SIGNATURE_CONFIDENCE;
        }
    }

    result
}

/// Identify the ECU manufacturer from image size and vendor marker strings.
///
/// This is a diagnostic hint for images where no identifier signature hits:
/// common Denso images ship at 512 KB / 1 MB, Bosch at 2 MB / 4 MB (matched
/// within 1 KB), and most vendors leave a copyright marker somewhere in the
/// calibration area.
pub fn identify_ecu_vendor(data: &[u8]) -> Option<&'static str> {
    const SIZE_HINTS: &[(usize, &str)] = &[
        (512 * 1024, "Denso"),
        (1024 * 1024, "Denso"),
        (2 * 1024 * 1024, "Bosch"),
        (4 * 1024 * 1024, "Bosch"),
    ];

    let size = data.len();
    for &(expected, vendor) in SIZE_HINTS {
        if size.abs_diff(expected) < 1024 {
            return Some(vendor);
        }
    }

    if contains(data, b"DENSO") || contains(data, b"Copr.DENSO") {
        return Some("Denso");
    }
    if contains(data, b"BOSCH") || contains(data, b"Robert Bosch") {
        return Some("Bosch");
    }
    if contains(data, b"Siemens") || contains(data, b"Continental") {
        return Some("Siemens");
    }

    None
}

/// Decode matched bytes as ASCII, dropping anything outside the ASCII range.
///
/// Signatures are ASCII-only by construction, so drops only happen when a
/// pattern straddles binary padding; losing those bytes is preferable to
/// failing the whole scan.
fn decode_ascii_lossy(bytes: &[u8]) -> String {
    bytes.iter().copied().filter(u8::is_ascii).map(char::from).collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
