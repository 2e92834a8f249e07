//! Call-site extraction: plain calls, attribute calls and call-valued
//! assignments.

use serde::Serialize;

use super::arguments::normalize_arguments;
use super::facts::{AssignmentCallRecord, AttributeCallRecord, CallRecord};
use super::walk::{walk, NodeRef};
use crate::parser::{Call, Expr, ParsedUnit, Stmt};

/// The three call record families of one unit, each in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallSites {
    pub calls: Vec<CallRecord>,
    pub attribute_calls: Vec<AttributeCallRecord>,
    pub assignment_calls: Vec<AssignmentCallRecord>,
}

/// Extract every call family in a single walk.
pub fn extract_call_sites(unit: &ParsedUnit) -> CallSites {
    let mut sites = CallSites::default();

    for node in walk(unit) {
        match node {
            NodeRef::Expr(Expr::Call(call)) => {
                sites.calls.push(call_record(call));
                if let Some(record) = attribute_call_record(call) {
                    sites.attribute_calls.push(record);
                }
            }
            NodeRef::Stmt(Stmt::Assign(assign)) => {
                if let Expr::Call(call) = &assign.value {
                    sites.assignment_calls.push(AssignmentCallRecord {
                        target: assign.simple_target().to_string(),
                        callee: resolve_callee(&call.func),
                        line: call.line,
                        arguments: normalize_arguments(&call.args),
                    });
                }
            }
            _ => {}
        }
    }

    sites
}

/// Every call expression in the unit.
pub fn extract_calls(unit: &ParsedUnit) -> Vec<CallRecord> {
    extract_call_sites(unit).calls
}

/// Calls whose callee is an attribute (`receiver.method(...)`).
pub fn extract_attribute_calls(unit: &ParsedUnit) -> Vec<AttributeCallRecord> {
    walk(unit)
        .filter_map(|node| match node {
            NodeRef::Expr(Expr::Call(call)) => attribute_call_record(call),
            _ => None,
        })
        .collect()
}

/// Assignments whose value is a call.
pub fn extract_assignment_calls(unit: &ParsedUnit) -> Vec<AssignmentCallRecord> {
    extract_call_sites(unit).assignment_calls
}

/// Name of a callee: bare name, else trailing attribute, else source text.
pub fn resolve_callee(func: &Expr) -> String {
    match func {
        Expr::Name(name) => name.id.clone(),
        Expr::Attribute(attr) => attr.attr.clone(),
        other => other.text().to_string(),
    }
}

/// Name of a method receiver: bare name, else source text.
pub fn resolve_receiver(value: &Expr) -> String {
    match value {
        Expr::Name(name) => name.id.clone(),
        other => other.text().to_string(),
    }
}

fn call_record(call: &Call) -> CallRecord {
    CallRecord {
        callee: resolve_callee(&call.func),
        line: call.line,
        arguments: normalize_arguments(&call.args),
    }
}

fn attribute_call_record(call: &Call) -> Option<AttributeCallRecord> {
    let Expr::Attribute(attr) = call.func.as_ref() else {
        return None;
    };
    Some(AttributeCallRecord {
        receiver: resolve_receiver(&attr.value),
        method: attr.attr.clone(),
        line: call.line,
        arguments: normalize_arguments(&call.args),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::facts::ArgumentValue;
    use crate::parser::parse_source;

    #[test]
    fn test_plain_and_attribute_calls() {
        let source = r#"
import numpy as np
data = np.load(path)
print(data)
"#;
        let sites = extract_call_sites(&parse_source(source));

        let callees: Vec<&str> = sites.calls.iter().map(|c| c.callee.as_str()).collect();
        assert_eq!(callees, vec!["load", "print"]);

        assert_eq!(sites.attribute_calls.len(), 1);
        let load = &sites.attribute_calls[0];
        assert_eq!(load.receiver, "np");
        assert_eq!(load.method, "load");
        assert_eq!(load.line, 3);
        assert_eq!(load.arguments[0].value, ArgumentValue::Identifier("path".to_string()));
    }

    #[test]
    fn test_assignment_call_record() {
        let sites = extract_call_sites(&parse_source("model = load_model('x.h5')\n"));
        assert_eq!(sites.assignment_calls.len(), 1);

        let record = &sites.assignment_calls[0];
        assert_eq!(record.target, "model");
        assert_eq!(record.callee, "load_model");
        assert_eq!(record.line, 1);
        assert_eq!(record.arguments.len(), 1);
        assert_eq!(record.arguments[0].text(), "x.h5");
        assert_eq!(record.arguments[0].label(), "arg1");
    }

    #[test]
    fn test_assignment_targets() {
        let source = "a = b = make()\nx, y = split()\nself.model = build()\nz = obj.attr.create()\n";
        let records = extract_assignment_calls(&parse_source(source));
        let pairs: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.target.as_str(), r.callee.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("b", "make"), ("", "split"), ("", "build"), ("z", "create")]
        );
    }

    #[test]
    fn test_receiver_fallback_to_source_text() {
        let source = "self.logger.info(msg)\nget_logger().warning(msg)\n";
        let records = extract_attribute_calls(&parse_source(source));
        assert_eq!(records[0].receiver, "self.logger");
        assert_eq!(records[0].method, "info");
        // the inner get_logger() call is not an attribute call
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].receiver, "get_logger()");
        assert_eq!(records[1].method, "warning");
    }

    #[test]
    fn test_callee_fallback_to_source_text() {
        let calls = extract_calls(&parse_source("handlers[0](event)\n"));
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].callee, "handlers[0]");
    }

    #[test]
    fn test_nested_calls_in_order() {
        let source = r#"
def train(x):
    result = fit(transform(x))
    logger.info(f"{summarize(result)}")
    return result
"#;
        let calls = extract_calls(&parse_source(source));
        let callees: Vec<&str> = calls.iter().map(|c| c.callee.as_str()).collect();
        assert_eq!(callees, vec!["fit", "transform", "info", "summarize"]);
        assert!(calls.windows(2).all(|w| w[0].line <= w[1].line));
    }

    #[test]
    fn test_empty_unit_has_no_call_sites() {
        assert_eq!(extract_call_sites(&ParsedUnit::empty()), CallSites::default());
    }
}
