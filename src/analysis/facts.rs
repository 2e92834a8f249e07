//! Fact records extracted from a parsed unit.

use std::fmt;

use serde::{Serialize, Serializer};

use super::coverage::LoggingCoverage;
use crate::parser::ParseStatus;

/// Identifiers of the fields carried by the fact records.
///
/// Each record type lists its fields in a fixed order (`FactRecord::FIELDS`),
/// which downstream tabular consumers use as their column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Target,
    Callee,
    Receiver,
    Method,
    Base,
    Feature,
    Line,
    Arguments,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Target => "target",
            Field::Callee => "callee",
            Field::Receiver => "receiver",
            Field::Method => "method",
            Field::Base => "base",
            Field::Feature => "feature",
            Field::Line => "line",
            Field::Arguments => "arguments",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A record with a stable, ordered set of fields.
pub trait FactRecord {
    /// Fields of this record type, in column order.
    const FIELDS: &'static [Field];

    /// Render one field, or `None` if this record type does not carry it.
    fn field(&self, field: Field) -> Option<String>;

    /// Render all fields in `FIELDS` order.
    fn row(&self) -> Vec<String> {
        Self::FIELDS
            .iter()
            .map(|f| self.field(*f).unwrap_or_default())
            .collect()
    }
}

/// Resolved value of one call argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ArgumentValue {
    /// A bare identifier, e.g. `x`.
    Identifier(String),
    /// A string literal's content, e.g. `x.h5` for `'x.h5'`.
    StringLiteral(String),
    /// An f-string with `{expr}` in place of each embedded expression.
    Interpolated(String),
    /// Source text of any other expression.
    Opaque(String),
}

impl ArgumentValue {
    /// The resolved text, whatever the kind.
    pub fn text(&self) -> &str {
        match self {
            ArgumentValue::Identifier(s)
            | ArgumentValue::StringLiteral(s)
            | ArgumentValue::Interpolated(s)
            | ArgumentValue::Opaque(s) => s,
        }
    }
}

/// A call argument with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Argument {
    pub value: ArgumentValue,
    #[serde(rename = "label", serialize_with = "serialize_label")]
    pub position: usize,
}

impl Argument {
    /// Positional label: `arg1`, `arg2`, ...
    pub fn label(&self) -> String {
        format!("arg{}", self.position)
    }

    pub fn text(&self) -> &str {
        self.value.text()
    }
}

fn serialize_label<S: Serializer>(position: &usize, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("arg{}", position))
}

/// Render an argument list as `arg1=value;arg2=value`.
pub fn render_arguments(arguments: &[Argument]) -> String {
    arguments
        .iter()
        .map(|a| format!("{}={}", a.label(), a.text()))
        .collect::<Vec<_>>()
        .join(";")
}

/// Any call: `callee(args)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub callee: String,
    pub line: usize,
    pub arguments: Vec<Argument>,
}

impl FactRecord for CallRecord {
    const FIELDS: &'static [Field] = &[Field::Callee, Field::Line, Field::Arguments];

    fn field(&self, field: Field) -> Option<String> {
        match field {
            Field::Callee => Some(self.callee.clone()),
            Field::Line => Some(self.line.to_string()),
            Field::Arguments => Some(render_arguments(&self.arguments)),
            _ => None,
        }
    }
}

/// A method call: `receiver.method(args)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeCallRecord {
    pub receiver: String,
    pub method: String,
    pub line: usize,
    pub arguments: Vec<Argument>,
}

impl FactRecord for AttributeCallRecord {
    const FIELDS: &'static [Field] = &[
        Field::Receiver,
        Field::Method,
        Field::Line,
        Field::Arguments,
    ];

    fn field(&self, field: Field) -> Option<String> {
        match field {
            Field::Receiver => Some(self.receiver.clone()),
            Field::Method => Some(self.method.clone()),
            Field::Line => Some(self.line.to_string()),
            Field::Arguments => Some(render_arguments(&self.arguments)),
            _ => None,
        }
    }
}

/// A call whose result is assigned: `target = callee(args)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentCallRecord {
    /// Empty when no target is a bare name.
    pub target: String,
    pub callee: String,
    pub line: usize,
    pub arguments: Vec<Argument>,
}

impl FactRecord for AssignmentCallRecord {
    const FIELDS: &'static [Field] = &[
        Field::Target,
        Field::Callee,
        Field::Line,
        Field::Arguments,
    ];

    fn field(&self, field: Field) -> Option<String> {
        match field {
            Field::Target => Some(self.target.clone()),
            Field::Callee => Some(self.callee.clone()),
            Field::Line => Some(self.line.to_string()),
            Field::Arguments => Some(render_arguments(&self.arguments)),
            _ => None,
        }
    }
}

/// An attribute read assigned to a name: `target = base.feature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureAssignmentRecord {
    pub target: String,
    pub base: String,
    pub feature: String,
    pub line: usize,
}

impl FactRecord for FeatureAssignmentRecord {
    const FIELDS: &'static [Field] = &[Field::Target, Field::Base, Field::Feature, Field::Line];

    fn field(&self, field: Field) -> Option<String> {
        match field {
            Field::Target => Some(self.target.clone()),
            Field::Base => Some(self.base.clone()),
            Field::Feature => Some(self.feature.clone()),
            Field::Line => Some(self.line.to_string()),
            _ => None,
        }
    }
}

/// Coverage outcome for one tracked identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedCoverage {
    pub identifier: String,
    pub covered: bool,
    pub evidence: LoggingCoverage,
}

/// All facts extracted from a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileFacts {
    /// File path (relative to the scan root when possible).
    pub path: String,
    /// Whether the file parsed or was replaced by the empty program.
    pub parse_status: ParseStatus,
    /// Whether the file imports a module named after the logging marker.
    pub imports_logging: bool,
    pub calls: Vec<CallRecord>,
    pub attribute_calls: Vec<AttributeCallRecord>,
    pub assignment_calls: Vec<AssignmentCallRecord>,
    pub features: Vec<FeatureAssignmentRecord>,
    /// One entry per configured tracked identifier.
    pub coverage: Vec<TrackedCoverage>,
}

impl FileFacts {
    /// Facts for a file with nothing in it.
    pub fn empty(path: &str, parse_status: ParseStatus) -> Self {
        Self {
            path: path.to_string(),
            parse_status,
            imports_logging: false,
            calls: Vec::new(),
            attribute_calls: Vec::new(),
            assignment_calls: Vec::new(),
            features: Vec::new(),
            coverage: Vec::new(),
        }
    }

    /// Total number of records of every family.
    pub fn record_count(&self) -> usize {
        self.calls.len() + self.attribute_calls.len() + self.assignment_calls.len() + self.features.len()
    }

    /// Tracked identifiers that are not logged in this file.
    pub fn uncovered(&self) -> impl Iterator<Item = &TrackedCoverage> {
        self.coverage.iter().filter(|c| !c.covered)
    }
}
