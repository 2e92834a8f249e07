//! Command-line interface for pyforensics.

use clap::{Args, Parser, Subcommand};
use globset::GlobSet;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::{DirEntry, WalkDir};

use crate::analysis::AnalysisContext;
use crate::config::{ForensicsConfig, DEFAULT_CONFIG_NAMES};
use crate::report::{self, CoverageReport};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["venv", ".venv", "__pycache__", "node_modules"];

/// Starter configuration written by `init`.
const CONFIG_TEMPLATE: &str = include_str!("templates/pyforensics.yaml");

/// Extract call sites, feature reads and logging coverage from Python code.
///
/// Pyforensics parses Python sources and reports every call, method call,
/// call-valued assignment and attribute-read assignment it finds, and
/// whether tracked identifiers are passed to a logging call.
#[derive(Parser)]
#[command(name = "pyforensics")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable informational logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract all facts from Python files
    Scan(ScanArgs),
    /// Check that tracked identifiers are logged
    Check(CheckArgs),
    /// Write a starter configuration file
    Init(InitArgs),
}

/// Options shared by `scan` and `check`.
#[derive(Args)]
pub struct InputArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Identifier to check for logging coverage (repeatable)
    #[arg(short, long = "track", value_name = "NAME")]
    pub track: Vec<String>,
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Identifier to check for logging coverage (repeatable)
    #[arg(short, long = "track", value_name = "NAME")]
    pub track: Vec<String>,

    /// Exit non-zero if any identifier is not logged
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "pyforensics.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// A resolved scan: config, root and the files under it.
struct Prepared {
    config: ForensicsConfig,
    root: PathBuf,
    files: Vec<PathBuf>,
}

/// Load config, resolve the path and collect files.
///
/// Returns `Ok(Err(code))` for user errors already reported on stderr.
fn prepare(input: &InputArgs, track: &[String]) -> anyhow::Result<Result<Prepared, i32>> {
    if input.format != "pretty" && input.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            input.format
        );
        return Ok(Err(EXIT_ERROR));
    }

    let cwd = std::env::current_dir()?;
    let mut config = match ForensicsConfig::load(input.config.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(Err(EXIT_ERROR));
        }
    };
    config.track(track.iter().cloned());
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return Ok(Err(EXIT_ERROR));
    }

    // Resolve path
    let abs_path = match input.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", input.path, e);
            return Ok(Err(EXIT_ERROR));
        }
    };

    let exclusions = config.exclusion_matcher()?;
    let (root, files) = if abs_path.is_dir() {
        let files = collect_files(&abs_path, &exclusions)?;
        (abs_path, files)
    } else {
        let root = abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| abs_path.clone());
        (root, vec![abs_path])
    };

    info!(root = %root.display(), files = files.len(), "collected files");
    Ok(Ok(Prepared {
        config,
        root,
        files,
    }))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    // Skip hidden directories
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// Collect Python files under `root`, skipping excluded paths.
pub fn collect_files(root: &Path, exclusions: &GlobSet) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        if exclusions.is_match(rel) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    let prepared = match prepare(&args.input, &args.track)? {
        Ok(p) => p,
        Err(code) => return Ok(code),
    };

    if prepared.files.is_empty() {
        eprintln!("Warning: no Python files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let ctx = AnalysisContext::new(&prepared.root, &prepared.config);
    let facts = ctx.analyze_files_parallel(&prepared.files);

    let path_str = args.input.path.to_string_lossy().to_string();
    match args.input.format.as_str() {
        "json" => report::write_scan_json(&path_str, &facts)?,
        _ => report::write_scan_pretty(&path_str, &facts),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let prepared = match prepare(&args.input, &args.track)? {
        Ok(p) => p,
        Err(code) => return Ok(code),
    };

    if prepared.config.tracked_identifiers.is_empty() {
        eprintln!("Error: no identifiers to check");
        eprintln!("Pass --track NAME or list tracked_identifiers in the config");
        return Ok(EXIT_ERROR);
    }

    if prepared.files.is_empty() {
        eprintln!("Warning: no Python files to check");
        return Ok(EXIT_SUCCESS);
    }

    let ctx = AnalysisContext::new(&prepared.root, &prepared.config);
    let facts = ctx.analyze_files_parallel(&prepared.files);

    let path_str = args.input.path.to_string_lossy().to_string();
    let coverage = CoverageReport::new(&path_str, &prepared.config.tracked_identifiers, &facts);

    match args.input.format.as_str() {
        "json" => report::write_coverage_json(&coverage)?,
        _ => report::write_coverage_pretty(&coverage),
    }

    if args.strict && !coverage.passed {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite or --output to choose another path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. List the identifiers to track in {}", args.output.display());
    if DEFAULT_CONFIG_NAMES.iter().any(|n| args.output.as_path() == Path::new(n)) {
        println!("  2. Run: pyforensics check .");
    } else {
        println!("  2. Run: pyforensics check . --config {}", args.output.display());
    }

    Ok(EXIT_SUCCESS)
}
