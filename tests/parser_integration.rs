//! Integration tests for the parser and syntax-error recovery.
//!
//! These tests run the parser against the testdata fixtures and check
//! that malformed sources degrade to the empty program.

use std::path::PathBuf;

use pyforensics::analysis::CallSites;
use pyforensics::parser::{self, Expr, ParseStatus, Stmt};
use pyforensics::{check_logging, extract_call_sites, extract_feature_assignments};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

#[test]
fn test_parse_fixture_top_level_shape() {
    let (unit, status) =
        parser::parse_file(testdata_path().join("logging_pipeline.py")).expect("should read");

    assert_eq!(status, ParseStatus::Parsed);
    // import, import, assignment, two function definitions
    assert_eq!(unit.body.len(), 5);
    assert!(matches!(unit.body[0], Stmt::Import(_)));
    assert!(matches!(unit.body[1], Stmt::Import(_)));

    let Stmt::Assign(assign) = &unit.body[2] else {
        panic!("expected assignment, got {:?}", unit.body[2]);
    };
    assert_eq!(assign.simple_target(), "logger");
    assert_eq!(assign.line, 5);
    assert!(matches!(assign.value, Expr::Call(_)));

    let Stmt::Other(def) = &unit.body[3] else {
        panic!("expected function definition");
    };
    assert_eq!(def.kind, "function_definition");
    assert_eq!(def.line, 8);
    assert_eq!(def.body.len(), 3);
}

#[test]
fn test_malformed_fixture_recovers_to_empty_unit() {
    let (unit, status) =
        parser::parse_file(testdata_path().join("malformed.py")).expect("should read");

    assert!(unit.is_empty());
    match status {
        ParseStatus::Recovered(diagnostic) => assert!(diagnostic.line >= 1),
        ParseStatus::Parsed => panic!("malformed source should not parse"),
    }

    // Every extractor sees nothing, coverage is false
    assert_eq!(extract_call_sites(&unit), CallSites::default());
    assert!(extract_feature_assignments(&unit).is_empty());
    assert!(!check_logging(&unit, "x"));
}

#[test]
fn test_python2_print_statement_is_rejected() {
    let (unit, status) =
        parser::parse_file(testdata_path().join("legacy_print.py")).expect("should read");

    assert!(unit.is_empty());
    assert!(status.is_recovered());
    assert!(!check_logging(&unit, "model"));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = parser::parse_file(testdata_path().join("does_not_exist.py"));
    assert!(result.is_err());
}

#[test]
fn test_syntax_error_scenario() {
    let unit = parser::parse_source("def f(:\n");
    assert!(unit.is_empty());
    assert!(!check_logging(&unit, "f"));
}

#[test]
fn test_non_utf8_source_is_read_lossily() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("latin1.py");
    let mut bytes = b"name = greet('caf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"')\n");
    std::fs::write(&path, bytes).unwrap();

    let (unit, status) = parser::parse_file(&path).expect("should read");
    assert_eq!(status, ParseStatus::Parsed);
    let sites = extract_call_sites(&unit);
    assert_eq!(sites.assignment_calls.len(), 1);
    assert_eq!(sites.assignment_calls[0].callee, "greet");
    assert!(sites.assignment_calls[0].arguments[0].text().starts_with("caf"));
}
