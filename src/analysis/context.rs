//! Analysis context: runs the per-file pipeline over many files.
//!
//! The extractors are pure; this layer owns file I/O, path bookkeeping and
//! the diagnostic events around them.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::calls::extract_call_sites;
use super::coverage::CoverageAnalyzer;
use super::facts::{FileFacts, TrackedCoverage};
use super::features::extract_feature_assignments;
use crate::config::ForensicsConfig;
use crate::parser::{parse_source_with_status, ParseStatus, ParsedUnit};

/// Analysis context for a set of files under one base directory.
pub struct AnalysisContext {
    /// Base directory for relative path resolution.
    base_dir: PathBuf,
    tracked: Vec<String>,
    coverage: CoverageAnalyzer,
}

impl AnalysisContext {
    /// Create a new analysis context.
    pub fn new<P: AsRef<Path>>(base_dir: P, config: &ForensicsConfig) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            tracked: config.tracked_identifiers.clone(),
            coverage: config.coverage_analyzer(),
        }
    }

    /// Extract all facts from an already parsed unit.
    pub fn analyze_unit(&self, path: &str, unit: &ParsedUnit, status: ParseStatus) -> FileFacts {
        let sites = extract_call_sites(unit);
        let imports_logging = self.coverage.imports_marker(unit);

        let coverage = self
            .tracked
            .iter()
            .map(|identifier| {
                let evidence =
                    self.coverage
                        .analyze_calls(imports_logging, &sites.attribute_calls, identifier);
                TrackedCoverage {
                    identifier: identifier.clone(),
                    covered: evidence.is_covered(),
                    evidence,
                }
            })
            .collect();

        FileFacts {
            path: path.to_string(),
            parse_status: status,
            imports_logging,
            calls: sites.calls,
            attribute_calls: sites.attribute_calls,
            assignment_calls: sites.assignment_calls,
            features: extract_feature_assignments(unit),
            coverage,
        }
    }

    /// Parse and analyze in-memory source.
    pub fn analyze_source(&self, path: &str, source: &str) -> FileFacts {
        let (unit, status) = parse_source_with_status(source);
        if let ParseStatus::Recovered(diagnostic) = &status {
            warn!(file = %path, error = %diagnostic, "syntax error, analyzing as empty program");
        }
        let facts = self.analyze_unit(path, &unit, status);
        debug!(
            file = %path,
            calls = facts.calls.len(),
            attribute_calls = facts.attribute_calls.len(),
            assignment_calls = facts.assignment_calls.len(),
            features = facts.features.len(),
            "analyzed file"
        );
        facts
    }

    /// Read, parse and analyze one file.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<FileFacts> {
        let path = path.as_ref();
        let abs_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };

        let bytes = fs::read(&abs_path)?;
        let source = String::from_utf8_lossy(&bytes);

        // Store relative path in facts
        let rel_path = abs_path
            .strip_prefix(&self.base_dir)
            .unwrap_or(&abs_path)
            .to_string_lossy()
            .to_string();

        Ok(self.analyze_source(&rel_path, &source))
    }

    /// Analyze multiple files sequentially.
    ///
    /// Unreadable files are logged and skipped. Results are sorted by path.
    pub fn analyze_files(&self, paths: &[PathBuf]) -> Vec<FileFacts> {
        let results: Vec<_> = paths.iter().map(|p| (p, self.analyze_file(p))).collect();
        collect_facts(results)
    }

    /// Analyze multiple files in parallel.
    ///
    /// Uses rayon; units share nothing, so no coordination is needed.
    /// Results are sorted by path.
    pub fn analyze_files_parallel(&self, paths: &[PathBuf]) -> Vec<FileFacts> {
        let results: Vec<_> = paths.par_iter().map(|p| (p, self.analyze_file(p))).collect();
        collect_facts(results)
    }
}

fn collect_facts(results: Vec<(&PathBuf, anyhow::Result<FileFacts>)>) -> Vec<FileFacts> {
    let mut all_facts = Vec::with_capacity(results.len());
    for (path, result) in results {
        match result {
            Ok(facts) => all_facts.push(facts),
            Err(e) => warn!(file = %path.display(), error = %e, "skipping unreadable file"),
        }
    }

    // Sort by path for deterministic ordering
    all_facts.sort_by(|a, b| a.path.cmp(&b.path));
    all_facts
}
