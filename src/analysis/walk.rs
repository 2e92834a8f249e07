//! Pre-order traversal over a parsed unit.

use crate::parser::{Expr, FStringPart, ParsedUnit, Stmt};

/// A borrowed statement or expression visited by `walk`.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

/// Iterator over every statement and expression of a unit, pre-order.
///
/// Children are visited in source order: assignment targets before the
/// value, a call's callee before its arguments (positional and keyword, as
/// written), header expressions before nested bodies.
pub struct Walk<'a> {
    stack: Vec<NodeRef<'a>>,
}

/// Walk all statements of `unit` and everything nested in them.
pub fn walk(unit: &ParsedUnit) -> Walk<'_> {
    Walk {
        stack: unit.body.iter().rev().map(NodeRef::Stmt).collect(),
    }
}

impl<'a> Walk<'a> {
    fn push_children(&mut self, node: NodeRef<'a>) {
        match node {
            NodeRef::Stmt(stmt) => match stmt {
                Stmt::Import(_) | Stmt::ImportFrom(_) => {}
                Stmt::Assign(assign) => {
                    self.stack.extend(assign.targets.iter().map(NodeRef::Expr));
                    self.stack.push(NodeRef::Expr(&assign.value));
                }
                Stmt::Expr(stmt) => self.stack.extend(stmt.values.iter().map(NodeRef::Expr)),
                Stmt::Other(stmt) => {
                    self.stack.extend(stmt.exprs.iter().map(NodeRef::Expr));
                    self.stack.extend(stmt.body.iter().map(NodeRef::Stmt));
                }
            },
            NodeRef::Expr(expr) => match expr {
                Expr::Name(_) | Expr::Str(_) => {}
                Expr::FString(fstring) => {
                    for part in &fstring.parts {
                        if let FStringPart::Interpolation { value, format_spec } = part {
                            self.stack.push(NodeRef::Expr(value));
                            self.stack.extend(format_spec.iter().map(NodeRef::Expr));
                        }
                    }
                }
                Expr::Attribute(attr) => self.stack.push(NodeRef::Expr(&attr.value)),
                Expr::Call(call) => {
                    self.stack.push(NodeRef::Expr(&call.func));
                    self.stack.extend(call.argument_values().map(NodeRef::Expr));
                }
                Expr::Other(other) => self.stack.extend(other.children.iter().map(NodeRef::Expr)),
            },
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let start = self.stack.len();
        self.push_children(node);
        // children were pushed in source order; the stack pops from the end
        self.stack[start..].reverse();
        Some(node)
    }
}
