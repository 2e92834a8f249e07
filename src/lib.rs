//! Pyforensics - call-site and logging forensics for Python sources.
//!
//! Pyforensics parses Python code into a typed syntax tree and extracts
//! flat facts from it: every call with its normalized positional arguments,
//! method calls with their receivers, call-valued assignments, and
//! attribute reads assigned to names. On top of those facts it answers one
//! question per tracked identifier: is it passed to a logging call?
//!
//! # Architecture
//!
//! The codebase uses tree-sitter for parsing:
//!
//! - `parser`: tree-sitter parse, syntax-error recovery, lowering to `ast`
//! - `analysis`: extractors, logging coverage and the per-file context
//! - `config`: YAML configuration
//! - `report`: Output formatting (pretty, JSON)
//! - `cli`: command-line front end
//!
//! # Example
//!
//! ```
//! use pyforensics::{check_logging, extract_assignment_calls, parse_source};
//!
//! let unit = parse_source("import logging\nmodel = load('m.h5')\nlogging.info(model)\n");
//! let records = extract_assignment_calls(&unit);
//! assert_eq!(records[0].target, "model");
//! assert!(check_logging(&unit, "model"));
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod parser;
pub mod report;

pub use analysis::{
    check_logging, extract_assignment_calls, extract_attribute_calls, extract_call_sites,
    extract_calls, extract_feature_assignments, AnalysisContext, Argument, ArgumentValue,
    CoverageAnalyzer, FileFacts,
};
pub use config::ForensicsConfig;
pub use parser::{parse_file, parse_source, parse_source_with_status, ParseStatus, ParsedUnit};
