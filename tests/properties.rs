//! Property-based tests for extraction and coverage
//!
//! These tests verify invariants that should hold for all inputs:
//! - Positional arguments keep their count and order
//! - Extraction is deterministic
//! - Coverage only turns on when all evidence is present
//! - Sources Python 3 rejects extract nothing

use proptest::prelude::*;

use pyforensics::analysis::{
    extract_call_sites, extract_calls, extract_feature_assignments, ArgumentValue,
    CoverageAnalyzer, FileFacts,
};
use pyforensics::{parse_source, parse_source_with_status, AnalysisContext, ForensicsConfig};

/// Python keywords to avoid
const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "case", "class", "continue", "def", "del",
    "elif", "else", "except", "exec", "finally", "for", "from", "global", "if", "import", "in",
    "is", "lambda", "match", "nonlocal", "not", "or", "pass", "print", "raise", "return", "try",
    "type", "while", "with", "yield", "None", "True", "False",
];

/// Generate valid Python identifier (avoiding keywords)
fn python_identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}".prop_filter("not a keyword", |s| !PYTHON_KEYWORDS.contains(&s.as_str()))
}

/// One positional argument: source text and the value it should normalize to.
fn argument() -> impl Strategy<Value = (String, ArgumentValue)> {
    prop_oneof![
        python_identifier().prop_map(|id| (id.clone(), ArgumentValue::Identifier(id))),
        "[a-z0-9 ]{0,8}"
            .prop_map(|s| (format!("'{}'", s), ArgumentValue::StringLiteral(s))),
        (0u32..1000).prop_map(|n| (n.to_string(), ArgumentValue::Opaque(n.to_string()))),
    ]
}

/// Number of shapes produced by `invalid_statement`.
const INVALID_SHAPES: usize = 8;

/// A statement that is not valid Python 3 and that logs `arg` if read
/// leniently.
fn invalid_statement(shape: usize, name: &str, arg: &str) -> String {
    match shape {
        0 => format!("def {}(:\n    logging.info({})\n", name, arg),
        1 => format!("logging.info(k=1, {})\n", arg),
        2 => format!("logging.info(**{}, {})\n", name, arg),
        3 => format!("{}, {} += logging.info({})\n", name, arg, arg),
        4 => format!("del {}()\nlogging.info({})\n", name, arg),
        5 => format!("if {} <> {}:\n    logging.info({})\n", name, arg, arg),
        6 => format!("print {}\nlogging.info({})\n", name, arg),
        _ => format!("exec {}\nlogging.info({})\n", name, arg),
    }
}

fn facts_for(source: &str, tracked: &[String]) -> FileFacts {
    let config = ForensicsConfig {
        tracked_identifiers: tracked.to_vec(),
        ..ForensicsConfig::default()
    };
    AnalysisContext::new(".", &config).analyze_source("prop.py", source)
}

proptest! {
    /// Property: a call's positional arguments come back in order, labeled
    /// arg1..argN, one per source argument
    #[test]
    fn prop_arguments_preserve_count_and_order(
        callee in python_identifier(),
        args in prop::collection::vec(argument(), 0..6)
    ) {
        let rendered: Vec<&str> = args.iter().map(|(text, _)| text.as_str()).collect();
        let source = format!("{}({})\n", callee, rendered.join(", "));

        let calls = extract_calls(&parse_source(&source));
        prop_assert_eq!(calls.len(), 1);
        prop_assert_eq!(&calls[0].callee, &callee);
        prop_assert_eq!(calls[0].arguments.len(), args.len());

        for (i, (arg, (_, expected))) in calls[0].arguments.iter().zip(args.iter()).enumerate() {
            prop_assert_eq!(&arg.value, expected);
            prop_assert_eq!(arg.label(), format!("arg{}", i + 1));
        }
    }

    /// Property: extraction is deterministic for the same parsed unit
    #[test]
    fn prop_extraction_is_idempotent(
        names in prop::collection::vec(python_identifier(), 1..5),
        receiver in python_identifier()
    ) {
        let mut source = String::from("import logging\n");
        for name in &names {
            source.push_str(&format!("{} = {}.load({})\n", name, receiver, name));
            source.push_str(&format!("logging.info(f\"{{{}}} ready\", {})\n", name, name));
        }

        let unit = parse_source(&source);
        let first = extract_call_sites(&unit);
        let second = extract_call_sites(&unit);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            extract_feature_assignments(&unit),
            extract_feature_assignments(&unit)
        );
        prop_assert_eq!(first.assignment_calls.len(), names.len());

        let analyzer = CoverageAnalyzer::default();
        for name in &names {
            let once = analyzer.analyze(&unit, name);
            prop_assert_eq!(once, analyzer.analyze(&unit, name));
            prop_assert!(once.is_covered());
        }
    }

    /// Property: coverage requires all three pieces of evidence, and adding
    /// the missing one never turns coverage off
    #[test]
    fn prop_coverage_is_monotonic(
        tracked in python_identifier(),
        with_import in any::<bool>(),
        with_call in any::<bool>(),
        with_argument in any::<bool>()
    ) {
        let build = |import: bool, call: bool, argument: bool| {
            let mut source = String::new();
            if import {
                source.push_str("import logging\n");
            }
            let arg = if argument { tracked.as_str() } else { "1" };
            if call {
                source.push_str(&format!("logging.info({})\n", arg));
            } else {
                source.push_str(&format!("other.send({})\n", arg));
            }
            source
        };

        let analyzer = CoverageAnalyzer::default();
        let partial = parse_source(&build(with_import, with_call, with_argument));
        let base = analyzer.analyze(&partial, &tracked);
        prop_assert_eq!(base.is_covered(), with_import && with_call && with_argument);
        prop_assert_eq!(base.import_found, with_import);
        prop_assert_eq!(base.call_found, with_call);

        let full = analyzer.analyze(&parse_source(&build(true, true, true)), &tracked);
        prop_assert!(full.is_covered());
    }

    /// Property: a source Python 3 rejects extracts nothing, even when
    /// tree-sitter alone would accept it
    #[test]
    fn prop_unparsable_source_extracts_nothing(
        shape in 0..INVALID_SHAPES,
        name in python_identifier(),
        body in python_identifier()
    ) {
        let source = format!("import logging\n{}", invalid_statement(shape, &name, &body));
        let (unit, status) = parse_source_with_status(&source);

        prop_assert!(unit.is_empty());
        prop_assert!(status.is_recovered());
        prop_assert!(extract_calls(&unit).is_empty());

        let facts = facts_for(&source, &[body.clone()]);
        prop_assert_eq!(facts.record_count(), 0);
        prop_assert!(!facts.coverage[0].covered);
    }
}
