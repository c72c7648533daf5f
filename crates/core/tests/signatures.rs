use fwident_core::parse::{self, signatures};

/// Build a buffer with the given ASCII fragments separated by binary noise.
fn image_with(fragments: &[&str]) -> Vec<u8> {
    let mut data = vec![0u8, 0xff, 0x13, 0x37];
    for fragment in fragments {
        data.extend_from_slice(fragment.as_bytes());
        data.extend_from_slice(&[0x00, 0xfe, 0x01]);
    }
    data
}

#[test]
fn single_signature_sets_primary_fields() {
    let data = image_with(&["89663-47351"]);
    let result = signatures::match_signatures(&data);

    assert_eq!(result.software_id.as_deref(), Some("89663-47351"));
    assert_eq!(result.brand.as_deref(), Some("Toyota"));
    assert_eq!(result.ecu_family.as_deref(), Some("Denso"));
    assert_eq!(result.confidence, 0.9);
    assert_eq!(result.all_matches.len(), 1);
    assert_eq!(result.all_matches[0].pattern, "denso_toyota");
    assert_eq!(result.all_matches[0].count, 1);
    assert_eq!(result.file_size, data.len() as u64);
}

#[test]
fn repeated_signature_is_counted_once_in_all_matches() {
    let data = image_with(&["89663-47351", "89663-47351"]);
    let result = signatures::match_signatures(&data);

    assert_eq!(result.all_matches.len(), 1);
    assert_eq!(result.all_matches[0].count, 2);
}

#[test]
fn first_table_entry_wins_regardless_of_byte_position() {
    // The F01R fragment sits earlier in the buffer, but denso_toyota is
    // registered earlier in the table and must own the primary fields.
    let data = image_with(&["F01R0AD3G0", "89663-47351"]);
    let result = signatures::match_signatures(&data);

    assert_eq!(result.software_id.as_deref(), Some("89663-47351"));
    assert_eq!(result.brand.as_deref(), Some("Toyota"));
    assert_eq!(result.all_matches.len(), 2);
    assert_eq!(result.all_matches[0].pattern, "denso_toyota");
    assert_eq!(result.all_matches[1].pattern, "chinese_f01r");
}

#[test]
fn empty_buffer_yields_no_identifier() {
    let result = signatures::match_signatures(&[]);

    assert_eq!(result.software_id, None);
    assert_eq!(result.confidence, 0.0);
    assert!(result.all_matches.is_empty());
    assert_eq!(result.file_size, 0);
}

#[test]
fn parse_is_idempotent() {
    let data = image_with(&["37805-A1B-C234", "2712345678"]);
    let first = parse::parse_data(&data);
    let second = parse::parse_data(&data);
    assert_eq!(first, second);
}

#[test]
fn parse_file_reports_unreadable_input_as_error() {
    let err = parse::parse_file(std::path::Path::new("/nonexistent/image.bin"));
    assert!(err.is_err());
}

#[test]
fn vendor_hint_from_marker_strings() {
    let data = image_with(&["Copr.DENSO"]);
    assert_eq!(signatures::identify_ecu_vendor(&data), Some("Denso"));

    let data = image_with(&["Robert Bosch GmbH"]);
    assert_eq!(signatures::identify_ecu_vendor(&data), Some("Bosch"));

    assert_eq!(signatures::identify_ecu_vendor(b"plain"), None);
}

#[test]
fn vendor_hint_from_image_size() {
    // 512 KB (within the 1 KB tolerance) reads as a Denso image.
    let data = vec![0u8; 512 * 1024 + 100];
    assert_eq!(signatures::identify_ecu_vendor(&data), Some("Denso"));

    let data = vec![0u8; 2 * 1024 * 1024];
    assert_eq!(signatures::identify_ecu_vendor(&data), Some("Bosch"));
}
