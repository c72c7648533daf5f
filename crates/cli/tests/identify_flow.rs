use std::fs;

use predicates::prelude::*;
use tempfile::tempdir;

fn init_store(root: &std::path::Path) {
    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("init")
        .arg("--name")
        .arg("FlowStore")
        .assert()
        .success();
}

fn add_toyota(root: &std::path::Path) {
    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("add-firmware")
        .arg("--brand")
        .arg("Toyota")
        .arg("--series")
        .arg("Prius 1.8")
        .arg("--ecu-brand")
        .arg("Denso")
        .arg("--software-id")
        .arg("89663-47351")
        .arg("--price")
        .arg("50.0")
        .assert()
        .success();
}

/// Upload with an embedded byte signature resolves and records a request.
#[test]
fn identify_matches_signature_against_catalog() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_store(root);
    add_toyota(root);

    // Firmware image with the Denso identifier embedded in binary noise.
    let mut image = vec![0u8; 256];
    image.extend_from_slice(b"89663-47351");
    image.extend_from_slice(&[0x00, 0xff, 0x10]);
    let image_path = root.join("dump.bin");
    fs::write(&image_path, &image).expect("write image");

    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("identify")
        .arg("dump.bin")
        .assert()
        .success()
        .stdout(predicate::str::contains("Firmware found in catalog"))
        .stdout(predicate::str::contains("89663-47351"));

    // The attempt must be bookkept as a matched request.
    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("requests")
        .assert()
        .success()
        .stdout(predicate::str::contains("[matched]"))
        .stdout(predicate::str::contains("dump.bin"));
}

/// Unknown uploads report manual review and keep the candidate diagnostics.
#[test]
fn identify_unknown_image_escalates_to_manual_review() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_store(root);

    let image_path = root.join("mystery.bin");
    fs::write(&image_path, [0u8, 1, 2, 3, 4, 5, 6, 7]).expect("write image");

    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("identify")
        .arg("mystery.bin")
        .assert()
        .success()
        .stdout(predicate::str::contains("needs manual review"));

    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("requests")
        .assert()
        .success()
        .stdout(predicate::str::contains("[manual]"));
}

/// identify on a missing file is an input error, not a silent success.
#[test]
fn identify_missing_file_fails() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_store(root);

    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("identify")
        .arg("does-not-exist.bin")
        .assert()
        .failure();
}

/// The --filename override feeds the filename extractors, so a contentless
/// image still resolves via the upload name.
#[test]
fn identify_resolves_from_reported_filename() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_store(root);
    add_toyota(root);

    let image_path = root.join("upload.tmp");
    fs::write(&image_path, [0u8; 16]).expect("write image");

    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("identify")
        .arg("upload.tmp")
        .arg("--filename")
        .arg("Toyota Prius 1.8 (89663-47351_E2_EGR).bin")
        .assert()
        .success()
        .stdout(predicate::str::contains("Firmware found in catalog"));
}

/// Bulk import inserts new records and skips known software ids.
#[test]
fn import_catalog_inserts_and_skips() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    init_store(root);
    add_toyota(root);

    let import = serde_json::json!([
        { "brand": "Toyota", "software_id": "89663-47351" },
        { "brand": "MB", "ecu_brand": "Bosch", "software_id": "2712345678" }
    ]);
    let import_path = root.join("catalog.json");
    fs::write(&import_path, serde_json::to_string_pretty(&import).unwrap())
        .expect("write import");

    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("import-catalog")
        .arg("--file")
        .arg("catalog.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 inserted"))
        .stdout(predicate::str::contains("1 skipped"));

    assert_cmd::cargo::cargo_bin_cmd!("fwident")
        .current_dir(root)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Firmwares: 2"));
}
