//! Printable-string fallback for images with no known byte signature.
//!
//! Firmware identifiers live near the start of the image, so the scan is
//! bounded to the first 100 KB; unbounded scanning of multi-megabyte dumps
//! buys nothing. Extracted runs are then filtered down to strings that
//! plausibly look like an identifier.

use tracing::debug;

/// Only this many leading bytes are scanned for strings.
pub const SCAN_WINDOW: usize = 100_000;

/// Minimum run length kept by `extract_strings` unless overridden.
pub const MIN_STRING_LENGTH: usize = 8;

/// Candidates get at most this many characters; longer runs are log text,
/// not identifiers.
const MAX_CANDIDATE_LENGTH: usize = 30;

/// Substrings that mark a run as identifier-like (checked uppercased).
const PRIORITY_MARKERS: &[&str] = &["ECU", "SW", "HW", "VER"];

/// Extract printable-ASCII runs from the head of a firmware buffer.
///
/// A run is a maximal sequence of printable bytes (CR, LF, TAB and NUL
/// break runs like any other non-printable byte); runs shorter than
/// `min_length` are discarded. Each kept run is returned with the byte
/// offset where it starts.
pub fn extract_strings(data: &[u8], min_length: usize) -> Vec<(usize, String)> {
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut start_offset = 0usize;

    for (i, &byte) in data.iter().take(SCAN_WINDOW).enumerate() {
        if matches!(byte, 0x20..=0x7e) {
            if current.is_empty() {
                start_offset = i;
            }
            current.push(byte as char);
        } else {
            if current.len() >= min_length {
                strings.push((start_offset, std::mem::take(&mut current)));
            } else {
                current.clear();
            }
        }
    }
    if current.len() >= min_length {
        strings.push((start_offset, current));
    }

    strings
}

/// Filter extracted runs down to identifier-shaped candidates.
///
/// A candidate must contain at least one digit and one letter, be at most
/// 30 characters long, and not be a pure hex string (hex dumps are noise).
/// Candidates containing a dash or one of the `ECU`/`SW`/`HW`/`VER` markers
/// are moved to the front; within each class, scan order is preserved.
pub fn filter_candidates(strings: &[(usize, String)]) -> Vec<(usize, String)> {
    let mut priority = Vec::new();
    let mut rest = Vec::new();

    for (offset, s) in strings {
        if !(s.chars().any(|c| c.is_ascii_digit()) && s.chars().any(|c| c.is_ascii_alphabetic())) {
            continue;
        }
        if s.len() > MAX_CANDIDATE_LENGTH {
            continue;
        }
        if s.chars().all(|c| c.is_ascii_hexdigit()) {
            continue;
        }

        let upper = s.to_uppercase();
        if s.contains('-') || PRIORITY_MARKERS.iter().any(|m| upper.contains(m)) {
            priority.push((*offset, s.clone()));
        } else {
            rest.push((*offset, s.clone()));
        }
    }

    debug!(priority = priority.len(), other = rest.len(), "string candidates after filter");
    priority.extend(rest);
    priority
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_shorter_than_min_length_are_dropped() {
        let data = b"\x00short\x00LONGENOUGH1\x00";
        let strings = extract_strings(data, 8);
        assert_eq!(strings, vec![(7, "LONGENOUGH1".to_string())]);
    }

    #[test]
    fn scan_stops_at_window_boundary() {
        let mut data = vec![0u8; SCAN_WINDOW];
        data.extend_from_slice(b"SWID-1234567");
        assert!(extract_strings(&data, 8).is_empty());
    }

    #[test]
    fn pure_hex_and_letter_only_runs_are_rejected() {
        let strings = vec![
            (0, "DEADBEEF1234".to_string()),
            (16, "JUSTLETTERS".to_string()),
            (32, "MIXED123OK".to_string()),
        ];
        let candidates = filter_candidates(&strings);
        assert_eq!(candidates, vec![(32, "MIXED123OK".to_string())]);
    }

    #[test]
    fn dash_and_marker_candidates_come_first() {
        let strings = vec![
            (0, "PLAIN123".to_string()),
            (10, "SW1V23456".to_string()),
            (20, "AB-1234567".to_string()),
        ];
        let candidates = filter_candidates(&strings);
        let ordered: Vec<&str> = candidates.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(ordered, vec!["SW1V23456", "AB-1234567", "PLAIN123"]);
    }
}
