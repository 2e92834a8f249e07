//! Source parsing: Python text in, `ParsedUnit` out.
//!
//! Parsing never fails on malformed input. Any syntax error discards the
//! content and yields the empty program instead, so a batch scan over an
//! uncontrolled corpus keeps going. A syntax error is an ERROR or MISSING
//! node in the tree-sitter parse, or a construct the tree-sitter grammar
//! tolerates but Python 3 rejects (Python 2 statements and `<>`, positional
//! arguments after keywords, bad augmented-assignment or `del` targets).

pub mod ast;
mod lower;

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tree_sitter::{Node, Parser, Tree};

pub use ast::{
    Alias, ArgSlot, Assign, Attribute, Call, Expr, ExprStmt, FString, FStringPart, Import,
    ImportFrom, Keyword, Name, OtherExpr, OtherStmt, ParsedUnit, Stmt, StrLit,
};

use lower::{named_children, Lowerer};

/// Statements tree-sitter-python accepts but Python 3 rejects.
///
/// `print_statement` is only rejected without a chevron: `print >> f, x`
/// is an ordinary Python 3 expression.
const LEGACY_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

/// Expression kinds that can be assigned to or deleted.
const STORE_TARGETS: &[&str] = &["identifier", "attribute", "subscript"];

/// Where and why a source was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxDiagnostic {
    /// Line (1-indexed), 0 when no location is known.
    pub line: usize,
    /// Column (1-indexed), 0 when no location is known.
    pub column: usize,
    pub message: String,
}

impl SyntaxDiagnostic {
    fn at(node: Node, message: String) -> Self {
        let start = node.start_position();
        Self {
            line: start.row + 1,
            column: start.column + 1,
            message,
        }
    }
}

impl fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Outcome of parsing one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ParseStatus {
    Parsed,
    /// The source was replaced by the empty program.
    Recovered(SyntaxDiagnostic),
}

impl ParseStatus {
    pub fn is_recovered(&self) -> bool {
        matches!(self, ParseStatus::Recovered(_))
    }
}

/// Parse Python source into a `ParsedUnit`.
pub fn parse_source(source: &str) -> ParsedUnit {
    parse_source_with_status(source).0
}

/// Parse Python source, also reporting whether it had to be recovered.
pub fn parse_source_with_status(source: &str) -> (ParsedUnit, ParseStatus) {
    let tree = match parse_tree(source) {
        Ok(tree) => tree,
        Err(e) => {
            let diagnostic = SyntaxDiagnostic {
                line: 0,
                column: 0,
                message: e.to_string(),
            };
            return (ParsedUnit::empty(), ParseStatus::Recovered(diagnostic));
        }
    };

    let root = tree.root_node();
    match find_syntax_error(root) {
        Some(diagnostic) => (ParsedUnit::empty(), ParseStatus::Recovered(diagnostic)),
        None => (Lowerer::new(source).lower_module(root), ParseStatus::Parsed),
    }
}

/// Read and parse a file. Only I/O failures are errors.
pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<(ParsedUnit, ParseStatus)> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let source = String::from_utf8_lossy(&bytes);
    Ok(parse_source_with_status(&source))
}

fn parse_tree(source: &str) -> anyhow::Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse Python source"))
}

/// First node (in document order) that makes the source invalid Python 3.
fn find_syntax_error(root: Node) -> Option<SyntaxDiagnostic> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() {
            return Some(SyntaxDiagnostic::at(node, "invalid syntax".to_string()));
        }
        if node.is_missing() {
            return Some(SyntaxDiagnostic::at(node, format!("missing {}", node.kind())));
        }
        if let Some(message) = python3_violation(node) {
            return Some(SyntaxDiagnostic::at(node, message));
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Constructs tree-sitter-python parses cleanly but Python 3 rejects.
fn python3_violation(node: Node) -> Option<String> {
    match node.kind() {
        "print_statement" if has_child_kind(node, "chevron") => None,
        kind if LEGACY_STATEMENTS.contains(&kind) => {
            Some(format!("Python 2 {} is not supported", kind))
        }
        "<>" if !node.is_named() => Some("Python 2 operator <> is not supported".to_string()),
        "argument_list" => argument_order_violation(node),
        "augmented_assignment" => {
            let left = node.child_by_field_name("left")?;
            (!is_single_target(left))
                .then(|| format!("illegal target for augmented assignment: {}", left.kind()))
        }
        "delete_statement" => named_children(node)
            .into_iter()
            .find(|target| !is_delete_target(*target))
            .map(|target| format!("cannot delete {}", target.kind())),
        _ => None,
    }
}

/// Positional after keyword, or `*args` after `**kwargs`.
fn argument_order_violation(node: Node) -> Option<String> {
    let mut seen_keyword = false;
    let mut seen_double_splat = false;

    for arg in named_children(node) {
        match arg.kind() {
            "keyword_argument" => seen_keyword = true,
            "dictionary_splat" => seen_double_splat = true,
            "list_splat" if seen_double_splat => {
                return Some("iterable unpacking follows keyword unpacking".to_string())
            }
            "list_splat" => {}
            _ if seen_keyword || seen_double_splat => {
                return Some("positional argument follows keyword argument".to_string())
            }
            _ => {}
        }
    }
    None
}

/// A name, attribute or subscript, possibly parenthesized.
fn is_single_target(node: Node) -> bool {
    match node.kind() {
        "parenthesized_expression" => match named_children(node).as_slice() {
            [inner] => is_single_target(*inner),
            _ => false,
        },
        kind => STORE_TARGETS.contains(&kind),
    }
}

/// A single target, or a tuple/list of deletable targets.
fn is_delete_target(node: Node) -> bool {
    match node.kind() {
        "expression_list" | "tuple" | "list" | "parenthesized_expression" => {
            named_children(node).into_iter().all(is_delete_target)
        }
        kind => STORE_TARGETS.contains(&kind),
    }
}

fn has_child_kind(node: Node, kind: &str) -> bool {
    named_children(node).iter().any(|c| c.kind() == kind)
}
