//! Logging coverage: is a tracked identifier passed to a logging call?
//!
//! Coverage needs three pieces of evidence in the same unit:
//!
//! 1. an `import` of a module whose name contains the marker,
//! 2. an attribute call whose receiver or method contains the marker,
//! 3. an argument of such a call whose resolved text contains the identifier.
//!
//! The import clause is file-scoped. An import anywhere in the unit satisfies
//! it, whether or not it is the import the qualifying call actually uses.

use serde::Serialize;

use super::calls::extract_attribute_calls;
use super::facts::AttributeCallRecord;
use super::walk::{walk, NodeRef};
use crate::parser::{ParsedUnit, Stmt};

/// Default substring identifying logging imports and calls.
pub const LOGGING_MARKER: &str = "logging";

/// The evidence found for one tracked identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoggingCoverage {
    pub import_found: bool,
    pub call_found: bool,
    pub argument_found: bool,
}

impl LoggingCoverage {
    /// True only when all three pieces of evidence are present.
    pub fn is_covered(&self) -> bool {
        self.import_found && self.call_found && self.argument_found
    }
}

/// Decides logging coverage for a configurable marker.
#[derive(Debug, Clone)]
pub struct CoverageAnalyzer {
    marker: String,
    count_from_imports: bool,
}

impl Default for CoverageAnalyzer {
    fn default() -> Self {
        Self::new(LOGGING_MARKER)
    }
}

impl CoverageAnalyzer {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            count_from_imports: false,
        }
    }

    /// Also accept `from <module> import ...` as import evidence.
    pub fn count_from_imports(mut self, enabled: bool) -> Self {
        self.count_from_imports = enabled;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether any import in the unit (nested ones included) names the marker.
    pub fn imports_marker(&self, unit: &ParsedUnit) -> bool {
        walk(unit).any(|node| match node {
            NodeRef::Stmt(Stmt::Import(import)) => {
                import.names.iter().any(|alias| alias.name.contains(&self.marker))
            }
            NodeRef::Stmt(Stmt::ImportFrom(import)) if self.count_from_imports => import
                .module
                .as_deref()
                .is_some_and(|module| module.contains(&self.marker)),
            _ => false,
        })
    }

    /// Coverage of `tracked` in `unit`.
    pub fn analyze(&self, unit: &ParsedUnit, tracked: &str) -> LoggingCoverage {
        let calls = extract_attribute_calls(unit);
        self.analyze_calls(self.imports_marker(unit), &calls, tracked)
    }

    /// Coverage of `tracked` from already extracted facts.
    pub fn analyze_calls(
        &self,
        import_found: bool,
        calls: &[AttributeCallRecord],
        tracked: &str,
    ) -> LoggingCoverage {
        let mut coverage = LoggingCoverage {
            import_found,
            ..LoggingCoverage::default()
        };

        for call in calls.iter().filter(|c| self.is_logging_call(c)) {
            coverage.call_found = true;
            if call.arguments.iter().any(|arg| arg.text().contains(tracked)) {
                coverage.argument_found = true;
            }
        }

        coverage
    }

    fn is_logging_call(&self, call: &AttributeCallRecord) -> bool {
        call.receiver.contains(&self.marker) || call.method.contains(&self.marker)
    }
}

/// Whether `tracked` is logged in `unit`, with the default marker.
pub fn check_logging(unit: &ParsedUnit, tracked: &str) -> bool {
    CoverageAnalyzer::default().analyze(unit, tracked).is_covered()
}
