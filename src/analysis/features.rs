//! Attribute-read assignments (`x = obj.attr`), used to track model
//! features and hyperparameters.

use super::facts::FeatureAssignmentRecord;
use super::walk::{walk, NodeRef};
use crate::parser::{Assign, Expr, ParsedUnit, Stmt};

/// Every `target = base.feature` assignment whose base is a bare name.
pub fn extract_feature_assignments(unit: &ParsedUnit) -> Vec<FeatureAssignmentRecord> {
    walk(unit)
        .filter_map(|node| match node {
            NodeRef::Stmt(Stmt::Assign(assign)) => feature_record(assign),
            _ => None,
        })
        .collect()
}

fn feature_record(assign: &Assign) -> Option<FeatureAssignmentRecord> {
    let Expr::Attribute(attr) = &assign.value else {
        return None;
    };
    let base = attr.value.as_name()?;

    Some(FeatureAssignmentRecord {
        target: assign.simple_target().to_string(),
        base: base.to_string(),
        feature: attr.attr.clone(),
        line: attr.line,
    })
}
