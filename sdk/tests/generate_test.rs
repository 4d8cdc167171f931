#![cfg(test)]

use brine_fidl::{generate_from_json, inspect_to_json, FidlgenError, GeneratorConfig};
use std::{fs, path::PathBuf};

fn echo_json() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../compiler/tests/fixtures/echo.json")
}

#[test]
fn test_generate_writes_all_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        output_base: dir.path().join("gen"),
        dartfmt:     None,
    };

    let written = generate_from_json(&echo_json(), &config).unwrap();
    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["fidl.dart", "fidl_async.dart", "fidl_test.dart"]);

    let sync = fs::read_to_string(config.output_base.join("fidl.dart")).unwrap();
    assert!(sync.contains("library fidl_fidl_examples_echo;"));
    let test = fs::read_to_string(config.output_base.join("fidl_test.dart")).unwrap();
    assert!(test.contains("class Echo$TestBase extends Echo {"));
}

#[cfg(unix)]
#[test]
fn test_identity_formatter_matches_unformatted_output() {
    let plain = tempfile::tempdir().unwrap();
    let formatted = tempfile::tempdir().unwrap();

    generate_from_json(&echo_json(), &GeneratorConfig {
        output_base: plain.path().to_path_buf(),
        dartfmt:     None,
    })
    .unwrap();
    generate_from_json(&echo_json(), &GeneratorConfig {
        output_base: formatted.path().to_path_buf(),
        dartfmt:     Some(PathBuf::from("/bin/cat")),
    })
    .unwrap();

    for name in ["fidl.dart", "fidl_async.dart", "fidl_test.dart"] {
        assert_eq!(
            fs::read(plain.path().join(name)).unwrap(),
            fs::read(formatted.path().join(name)).unwrap(),
            "{} differs",
            name
        );
    }
}

#[cfg(unix)]
#[test]
fn test_failed_formatter_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        output_base: dir.path().to_path_buf(),
        dartfmt:     Some(PathBuf::from("/bin/false")),
    };

    let err = generate_from_json(&echo_json(), &config).unwrap_err();
    assert!(matches!(err, FidlgenError::FormatterFailed { .. }));
    assert!(!dir.path().join("fidl.dart").exists());
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        output_base: dir.path().to_path_buf(),
        dartfmt:     None,
    };
    let err = generate_from_json(&dir.path().join("missing.json"), &config).unwrap_err();
    assert!(matches!(err, FidlgenError::Schema(_)));
}

#[test]
fn test_inspect_dumps_the_model() {
    let json = inspect_to_json(&echo_json()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["library_name"], "fidl_fidl_examples_echo");
    assert_eq!(value["interfaces"][0]["methods"][1]["response"]["result"]["value_fields"][0], "reversed");
    assert_eq!(value["imports"].as_array().unwrap().len(), 1);
}
