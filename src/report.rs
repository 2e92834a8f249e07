//! Output formatting for scan and coverage results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::analysis::{render_arguments, FileFacts, LoggingCoverage, TrackedCoverage};
use crate::parser::ParseStatus;

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report for the `scan` command.
#[derive(Serialize)]
pub struct ScanReport<'a> {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub recovered_files: usize,
    pub files: &'a [FileFacts],
}

impl<'a> ScanReport<'a> {
    pub fn new(path: &str, files: &'a [FileFacts]) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.to_string(),
            files_scanned: files.len(),
            recovered_files: files.iter().filter(|f| f.parse_status.is_recovered()).count(),
            files,
        }
    }
}

/// JSON report for the `check` command.
#[derive(Serialize)]
pub struct CoverageReport {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub tracked: Vec<String>,
    pub passed: bool,
    pub results: Vec<CoverageEntry>,
}

/// Coverage of one identifier in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageEntry {
    pub file: String,
    pub identifier: String,
    pub covered: bool,
    pub evidence: LoggingCoverage,
}

impl CoverageReport {
    pub fn new(path: &str, tracked: &[String], files: &[FileFacts]) -> Self {
        let results: Vec<CoverageEntry> = files
            .iter()
            .flat_map(|facts| {
                facts.coverage.iter().map(move |c| coverage_entry(&facts.path, c))
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.to_string(),
            files_scanned: files.len(),
            tracked: tracked.to_vec(),
            passed: results.iter().all(|r| r.covered),
            results,
        }
    }

    /// Entries whose identifier is not logged.
    pub fn uncovered(&self) -> impl Iterator<Item = &CoverageEntry> {
        self.results.iter().filter(|r| !r.covered)
    }
}

fn coverage_entry(file: &str, coverage: &TrackedCoverage) -> CoverageEntry {
    CoverageEntry {
        file: file.to_string(),
        identifier: coverage.identifier.clone(),
        covered: coverage.covered,
        evidence: coverage.evidence,
    }
}

/// Write scan results in JSON format.
pub fn write_scan_json(path: &str, files: &[FileFacts]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&ScanReport::new(path, files))?;
    println!("{}", json);
    Ok(())
}

/// Write coverage results in JSON format.
pub fn write_coverage_json(report: &CoverageReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header(label: &str, path: &str) {
    println!();
    print!("  ");
    print!("{}", "pyforensics".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", format!("{:<10}", label).dimmed());
    println!("{}", path);
    println!();
}

/// Write scan results in pretty (human-readable) format.
pub fn write_scan_pretty(path: &str, files: &[FileFacts]) {
    write_header("Scanning:", path);

    for facts in files {
        write_file_facts(facts);
    }

    let recovered = files.iter().filter(|f| f.parse_status.is_recovered()).count();
    let records: usize = files.iter().map(|f| f.record_count()).sum();
    print!("  {}", format!("{} files, {} records", files.len(), records).bold());
    if recovered > 0 {
        print!("  {}", format!("({} unparsable)", recovered).yellow());
    }
    println!();
    println!();
}

fn write_file_facts(facts: &FileFacts) {
    print!("  {}", facts.path.blue().bold());
    if let ParseStatus::Recovered(diagnostic) = &facts.parse_status {
        print!("  {}", format!("syntax error at {}", diagnostic).yellow());
    }
    println!();

    if facts.record_count() == 0 && facts.coverage.is_empty() {
        println!("    {}", "(no facts)".dimmed());
        println!();
        return;
    }

    for call in &facts.calls {
        write_row("call", call.line, &call.callee, &render_arguments(&call.arguments));
    }
    for call in &facts.attribute_calls {
        let name = format!("{}.{}", call.receiver, call.method);
        write_row("method", call.line, &name, &render_arguments(&call.arguments));
    }
    for call in &facts.assignment_calls {
        let name = format!("{} = {}", display_target(&call.target), call.callee);
        write_row("assign", call.line, &name, &render_arguments(&call.arguments));
    }
    for feature in &facts.features {
        let name = format!(
            "{} = {}.{}",
            display_target(&feature.target),
            feature.base,
            feature.feature
        );
        write_row("feature", feature.line, &name, "");
    }
    for coverage in &facts.coverage {
        write_coverage_line(coverage);
    }
    println!();
}

fn display_target(target: &str) -> &str {
    if target.is_empty() {
        "_"
    } else {
        target
    }
}

fn write_row(kind: &str, line: usize, name: &str, arguments: &str) {
    print!("    {}", format!("{:<8}", kind).dimmed());
    print!("{}", format!("{:>5}  ", format!(":{}", line)).dimmed());
    print!("{}", name);
    if !arguments.is_empty() {
        print!("  {}", arguments.dimmed());
    }
    println!();
}

fn write_coverage_line(coverage: &TrackedCoverage) {
    print!("    {}", format!("{:<8}", "logged").dimmed());
    print!("       ");
    if coverage.covered {
        print!("{}", "✓ ".green());
    } else {
        print!("{}", "✗ ".red());
    }
    print!("{}", coverage.identifier);
    if !coverage.covered {
        print!("  {}", missing_evidence(&coverage.evidence).dimmed());
    }
    println!();
}

/// Short description of what keeps an identifier from being covered.
fn missing_evidence(evidence: &LoggingCoverage) -> String {
    let mut missing = Vec::new();
    if !evidence.import_found {
        missing.push("no logging import");
    }
    if !evidence.call_found {
        missing.push("no logging call");
    } else if !evidence.argument_found {
        missing.push("not passed to a logging call");
    }
    missing.join(", ")
}

/// Write coverage results in pretty format.
pub fn write_coverage_pretty(report: &CoverageReport) {
    write_header("Checking:", &report.path);

    let mut current_file: Option<&str> = None;
    for entry in &report.results {
        if current_file != Some(entry.file.as_str()) {
            if current_file.is_some() {
                println!();
            }
            println!("  {}", entry.file.blue().bold());
            current_file = Some(entry.file.as_str());
        }

        if entry.covered {
            print!("    {} ", "LOGGED ".green());
        } else {
            print!("    {} ", "MISSING".red());
        }
        print!("{}", entry.identifier);
        if !entry.covered {
            print!("  {}", missing_evidence(&entry.evidence).dimmed());
        }
        println!();
    }
    if current_file.is_some() {
        println!();
    }

    let uncovered = report.uncovered().count();
    print!(
        "  {}",
        format!(
            "{} files, {} identifiers tracked",
            report.files_scanned,
            report.tracked.len()
        )
        .dimmed()
    );
    print!("  ");
    if report.passed {
        print!("{}", "ALL LOGGED".green());
    } else {
        let noun = if uncovered != 1 { "entries" } else { "entry" };
        print!("{}", format!("{} uncovered {}", uncovered, noun).red());
    }
    println!();
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisContext;
    use crate::config::ForensicsConfig;
    use std::path::Path;

    fn scan(sources: &[(&str, &str)], tracked: &[&str]) -> Vec<FileFacts> {
        let config = ForensicsConfig {
            tracked_identifiers: tracked.iter().map(|s| s.to_string()).collect(),
            ..ForensicsConfig::default()
        };
        let ctx = AnalysisContext::new(Path::new("."), &config);
        sources
            .iter()
            .map(|(path, source)| ctx.analyze_source(path, source))
            .collect()
    }

    #[test]
    fn test_scan_report_json_shape() {
        let files = scan(
            &[
                ("a.py", "model = load_model('x.h5')\n"),
                ("b.py", "def f(:\n"),
            ],
            &[],
        );
        let value = serde_json::to_value(ScanReport::new("src", &files)).unwrap();

        assert_eq!(value["path"], "src");
        assert_eq!(value["files_scanned"], 2);
        assert_eq!(value["recovered_files"], 1);
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));

        let first = &value["files"][0];
        assert_eq!(first["parse_status"]["status"], "parsed");
        let record = &first["assignment_calls"][0];
        assert_eq!(record["target"], "model");
        assert_eq!(record["callee"], "load_model");
        assert_eq!(record["line"], 1);
        assert_eq!(record["arguments"][0]["label"], "arg1");
        assert_eq!(record["arguments"][0]["value"]["kind"], "string_literal");
        assert_eq!(record["arguments"][0]["value"]["text"], "x.h5");

        assert_eq!(value["files"][1]["parse_status"]["status"], "recovered");
    }

    #[test]
    fn test_coverage_report_pass_and_fail() {
        let files = scan(
            &[
                ("a.py", "import logging\nlogging.info(model)\n"),
                ("b.py", "import logging\nprint(model)\n"),
            ],
            &["model"],
        );
        let tracked = vec!["model".to_string()];
        let report = CoverageReport::new(".", &tracked, &files);

        assert_eq!(report.results.len(), 2);
        assert!(!report.passed);
        let uncovered: Vec<&str> = report.uncovered().map(|e| e.file.as_str()).collect();
        assert_eq!(uncovered, vec!["b.py"]);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["results"][0]["evidence"]["argument_found"], true);
        assert_eq!(value["results"][1]["evidence"]["call_found"], false);
    }

    #[test]
    fn test_missing_evidence_message() {
        let evidence = LoggingCoverage {
            import_found: false,
            call_found: true,
            argument_found: false,
        };
        assert_eq!(
            missing_evidence(&evidence),
            "no logging import, not passed to a logging call"
        );
        assert_eq!(
            missing_evidence(&LoggingCoverage::default()),
            "no logging import, no logging call"
        );
    }
}
