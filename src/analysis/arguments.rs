//! Normalization of call arguments into tagged, comparable values.

use super::facts::{Argument, ArgumentValue};
use crate::parser::{Expr, FString, FStringPart};

/// Stands in for each embedded expression of an f-string.
pub const PLACEHOLDER: &str = "{expr}";

/// Resolve one argument expression.
///
/// Identifiers, string literals and f-strings get their own tag; every other
/// shape falls back to its source text.
pub fn normalize_argument(expr: &Expr) -> ArgumentValue {
    match expr {
        Expr::Name(name) => ArgumentValue::Identifier(name.id.clone()),
        Expr::Str(lit) => ArgumentValue::StringLiteral(lit.value.clone()),
        Expr::FString(fstring) => ArgumentValue::Interpolated(render_fstring(fstring)),
        other => ArgumentValue::Opaque(other.text().to_string()),
    }
}

/// Resolve a positional argument list, keeping count and order.
pub fn normalize_arguments(args: &[Expr]) -> Vec<Argument> {
    args.iter()
        .enumerate()
        .map(|(i, expr)| Argument {
            value: normalize_argument(expr),
            position: i + 1,
        })
        .collect()
}

/// Literal segments of an f-string with `PLACEHOLDER` for each interpolation.
pub fn render_fstring(fstring: &FString) -> String {
    fstring
        .parts
        .iter()
        .map(|part| match part {
            FStringPart::Literal(text) => text.as_str(),
            FStringPart::Interpolation { .. } => PLACEHOLDER,
        })
        .collect()
}
