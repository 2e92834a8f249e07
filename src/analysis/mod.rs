//! Fact extraction over parsed Python units.
//!
//! Every extractor is a pure function of a `ParsedUnit`: it walks the tree in
//! pre-order and returns records in encounter order. Record families:
//! - Calls (every call expression)
//! - Attribute calls (`receiver.method(...)`)
//! - Assignment calls (`target = callee(...)`)
//! - Feature assignments (`target = base.feature`)
//!
//! On top of the attribute calls sits the logging coverage check.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ Parser       │────▶│ ParsedUnit    │
//! └─────────────────┘     │ (tree-sitter)│     │ (Stmt / Expr) │
//!                         └──────────────┘     └───────────────┘
//!                                                      │
//!                                                      ▼
//!                         ┌──────────────┐     ┌───────────────┐
//!                         │ FileFacts    │◀────│ Extractors    │
//!                         │ (+ coverage) │     │ (walk)        │
//!                         └──────────────┘     └───────────────┘
//! ```

mod arguments;
mod calls;
mod context;
mod coverage;
mod facts;
mod features;
mod walk;

pub use arguments::{normalize_argument, normalize_arguments, render_fstring, PLACEHOLDER};
pub use calls::{
    extract_assignment_calls, extract_attribute_calls, extract_call_sites, extract_calls,
    resolve_callee, resolve_receiver, CallSites,
};
pub use context::AnalysisContext;
pub use coverage::{check_logging, CoverageAnalyzer, LoggingCoverage, LOGGING_MARKER};
pub use facts::{
    render_arguments, Argument, ArgumentValue, AssignmentCallRecord, AttributeCallRecord,
    CallRecord, FactRecord, FeatureAssignmentRecord, Field, FileFacts, TrackedCoverage,
};
pub use features::extract_feature_assignments;
pub use walk::{walk, NodeRef, Walk};
