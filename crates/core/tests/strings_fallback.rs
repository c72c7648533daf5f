use fwident_core::parse::{self, strings};

#[test]
fn fallback_identifier_comes_from_string_extraction() {
    // No byte signature matches, but an identifier-shaped string is present
    // near the start of the image.
    let mut data = vec![0u8; 64];
    data.extend_from_slice(b"SWVER-A1B2X");
    data.extend_from_slice(&[0x00, 0xff]);
    data.extend_from_slice(b"just some text");
    data.push(0);

    let result = parse::parse_data(&data);

    assert_eq!(result.software_id.as_deref(), Some("SWVER-A1B2X"));
    assert_eq!(result.confidence, 0.5);
    assert_eq!(result.all_matches.len(), 1);
    assert_eq!(result.all_matches[0].pattern, "string_search");
    assert_eq!(result.all_matches[0].offset.as_deref(), Some("0x40"));
}

#[test]
fn fallback_keeps_at_most_five_diagnostics() {
    let mut data = Vec::new();
    for i in 0..8 {
        data.extend_from_slice(format!("CANDIDATE{i}X").as_bytes());
        data.push(0);
    }

    let result = parse::parse_data(&data);

    assert!(result.identified());
    assert_eq!(result.confidence, 0.5);
    assert_eq!(result.all_matches.len(), 5);
}

#[test]
fn hex_only_and_letter_only_content_yields_nothing() {
    let mut data = Vec::new();
    data.extend_from_slice(b"DEADBEEFCAFE1234");
    data.push(0);
    data.extend_from_slice(b"NODIGITSHERE");
    data.push(0);

    let result = parse::parse_data(&data);

    assert_eq!(result.software_id, None);
    assert_eq!(result.confidence, 0.0);
    assert!(result.all_matches.is_empty());
}

#[test]
fn extraction_is_bounded_to_the_first_100kb() {
    let mut data = vec![0u8; strings::SCAN_WINDOW];
    data.extend_from_slice(b"LATEID-12345");

    let result = parse::parse_data(&data);
    assert_eq!(result.software_id, None);
}

#[test]
fn priority_candidate_outranks_earlier_plain_one() {
    // The plain run appears first in the buffer, but the dash/marker run
    // must become the primary identifier.
    let mut data = Vec::new();
    data.extend_from_slice(b"PLAINRUN123");
    data.push(0);
    data.extend_from_slice(b"HW-99887A");
    data.push(0);

    let result = parse::parse_data(&data);
    assert_eq!(result.software_id.as_deref(), Some("HW-99887A"));
}
