//! Lowering of tree-sitter-python nodes into the typed tree in `ast`.

use tree_sitter::Node;

use super::ast::{
    Alias, ArgSlot, Assign, Attribute, Call, Expr, ExprStmt, FString, FStringPart, Import,
    ImportFrom, Keyword, Name, OtherExpr, OtherStmt, ParsedUnit, Stmt, StrLit,
};

/// Converts nodes of one parse tree, borrowing the source they index into.
pub(crate) struct Lowerer<'s> {
    source: &'s [u8],
}

impl<'s> Lowerer<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        Self {
            source: source.as_bytes(),
        }
    }

    pub(crate) fn lower_module(&self, root: Node) -> ParsedUnit {
        ParsedUnit {
            body: self.lower_block(root),
        }
    }

    fn text(&self, node: Node) -> String {
        node.utf8_text(self.source).unwrap_or("").to_string()
    }

    fn lower_block(&self, node: Node) -> Vec<Stmt> {
        named_children(node)
            .into_iter()
            .map(|child| self.lower_stmt(child))
            .collect()
    }

    fn lower_stmt(&self, node: Node) -> Stmt {
        let line = line_of(node);
        match node.kind() {
            "import_statement" => Stmt::Import(Import {
                names: self.import_aliases(node),
                line,
            }),
            "import_from_statement" => Stmt::ImportFrom(ImportFrom {
                module: node
                    .child_by_field_name("module_name")
                    .and_then(|m| self.module_name(m)),
                names: self.import_aliases(node),
                line,
            }),
            "future_import_statement" => Stmt::ImportFrom(ImportFrom {
                module: Some("__future__".to_string()),
                names: self.import_aliases(node),
                line,
            }),
            "expression_statement" => {
                let children = named_children(node);
                match children.as_slice() {
                    [only] if only.kind() == "assignment" => self.lower_assignment(*only, line),
                    [only] if only.kind() == "augmented_assignment" => self.other_stmt(*only),
                    _ => Stmt::Expr(ExprStmt {
                        values: children.iter().map(|c| self.lower_expr(*c)).collect(),
                        line,
                    }),
                }
            }
            // `print >> f, x` is a valid Python 3 tuple expression
            "print_statement" => self.lower_chevron_print(node, line),
            _ => self.other_stmt(node),
        }
    }

    /// `print >> target, a, b` as the tuple `(print >> target), a, b`.
    fn lower_chevron_print(&self, node: Node, line: usize) -> Stmt {
        let children = named_children(node);
        let Some(chevron) = children.iter().find(|c| c.kind() == "chevron") else {
            return self.other_stmt(node);
        };

        let shift_text =
            String::from_utf8_lossy(&self.source[node.start_byte()..chevron.end_byte()])
                .into_owned();
        let mut shift_children = vec![Expr::Name(Name {
            id: "print".to_string(),
            line,
        })];
        shift_children.extend(named_children(*chevron).into_iter().map(|c| self.lower_expr(c)));

        let mut values = vec![Expr::Other(OtherExpr {
            kind: "binary_operator".to_string(),
            text: shift_text,
            children: shift_children,
            line,
        })];
        values.extend(
            children
                .iter()
                .filter(|c| c.kind() != "chevron")
                .map(|c| self.lower_expr(*c)),
        );

        Stmt::Expr(ExprStmt { values, line })
    }

    fn module_name(&self, node: Node) -> Option<String> {
        if node.kind() != "relative_import" {
            return Some(self.text(node));
        }
        // `from .pkg import x` keeps "pkg"; `from . import x` has no module.
        named_children(node)
            .into_iter()
            .find(|c| c.kind() == "dotted_name")
            .map(|c| self.text(c))
    }

    fn import_aliases(&self, node: Node) -> Vec<Alias> {
        let mut cursor = node.walk();
        let mut aliases: Vec<Alias> = node
            .children_by_field_name("name", &mut cursor)
            .map(|child| match child.kind() {
                "aliased_import" => Alias {
                    name: child
                        .child_by_field_name("name")
                        .map(|n| self.text(n))
                        .unwrap_or_default(),
                    asname: child.child_by_field_name("alias").map(|n| self.text(n)),
                },
                _ => Alias {
                    name: self.text(child),
                    asname: None,
                },
            })
            .collect();

        if named_children(node)
            .iter()
            .any(|c| c.kind() == "wildcard_import")
        {
            aliases.push(Alias {
                name: "*".to_string(),
                asname: None,
            });
        }
        aliases
    }

    /// `a = b = value` becomes one `Assign` with targets `[a, b]`.
    fn lower_assignment(&self, node: Node, line: usize) -> Stmt {
        let mut targets = Vec::new();
        let mut current = node;
        loop {
            // Annotated assignments are a different statement.
            if current.child_by_field_name("type").is_some() {
                return self.other_stmt(node);
            }
            let Some(left) = current.child_by_field_name("left") else {
                return self.other_stmt(node);
            };
            targets.push(self.lower_expr(left));

            match current.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = right,
                Some(right) => {
                    return Stmt::Assign(Assign {
                        targets,
                        value: self.lower_expr(right),
                        line,
                    })
                }
                None => return self.other_stmt(node),
            }
        }
    }

    fn other_stmt(&self, node: Node) -> Stmt {
        let mut exprs = Vec::new();
        let mut body = Vec::new();

        for child in named_children(node) {
            if child.kind() == "block" {
                body.extend(self.lower_block(child));
            } else if has_block(child) {
                // elif/else/except/finally/case clauses and nested definitions
                body.push(self.lower_stmt(child));
            } else {
                exprs.push(self.lower_expr(child));
            }
        }

        Stmt::Other(OtherStmt {
            kind: node.kind().to_string(),
            exprs,
            body,
            line: line_of(node),
        })
    }

    fn lower_expr(&self, node: Node) -> Expr {
        let line = line_of(node);
        match node.kind() {
            "identifier" => Expr::Name(Name {
                id: self.text(node),
                line,
            }),
            "attribute" => self.lower_attribute(node, line),
            "call" => self.lower_call(node, line),
            "string" => self.lower_strings(node, &[node], line),
            "concatenated_string" => self.lower_strings(node, &named_children(node), line),
            "parenthesized_expression" => match named_children(node).as_slice() {
                [inner] => self.lower_expr(*inner),
                _ => self.other_expr(node, line),
            },
            _ => self.other_expr(node, line),
        }
    }

    fn lower_attribute(&self, node: Node, line: usize) -> Expr {
        let (Some(object), Some(attr)) = (
            node.child_by_field_name("object"),
            node.child_by_field_name("attribute"),
        ) else {
            return self.other_expr(node, line);
        };

        Expr::Attribute(Attribute {
            value: Box::new(self.lower_expr(object)),
            attr: self.text(attr),
            text: self.text(node),
            line,
        })
    }

    fn lower_call(&self, node: Node, line: usize) -> Expr {
        let Some(function) = node.child_by_field_name("function") else {
            return self.other_expr(node, line);
        };

        let mut args = Vec::new();
        let mut keywords = Vec::new();
        let mut order = Vec::new();

        if let Some(arguments) = node.child_by_field_name("arguments") {
            if arguments.kind() == "argument_list" {
                for arg in named_children(arguments) {
                    match arg.kind() {
                        "keyword_argument" => {
                            order.push(ArgSlot::Keyword(keywords.len()));
                            keywords.push(Keyword {
                                arg: arg.child_by_field_name("name").map(|n| self.text(n)),
                                value: match arg.child_by_field_name("value") {
                                    Some(value) => self.lower_expr(value),
                                    None => self.other_expr(arg, line_of(arg)),
                                },
                            });
                        }
                        "dictionary_splat" => {
                            order.push(ArgSlot::Keyword(keywords.len()));
                            keywords.push(Keyword {
                                arg: None,
                                value: match named_children(arg).first() {
                                    Some(value) => self.lower_expr(*value),
                                    None => self.other_expr(arg, line_of(arg)),
                                },
                            });
                        }
                        _ => {
                            order.push(ArgSlot::Positional(args.len()));
                            args.push(self.lower_expr(arg));
                        }
                    }
                }
            } else {
                // f(x for x in xs)
                order.push(ArgSlot::Positional(0));
                args.push(self.lower_expr(arguments));
            }
        }

        Expr::Call(Call {
            func: Box::new(self.lower_expr(function)),
            args,
            keywords: (!keywords.is_empty()).then_some(keywords),
            order,
            text: self.text(node),
            line,
        })
    }

    /// Lowers a string or an implicit concatenation of strings.
    fn lower_strings(&self, node: Node, pieces: &[Node], line: usize) -> Expr {
        let mut parts: Vec<FStringPart> = Vec::new();
        let mut formatted = false;

        for piece in pieces {
            let prefix = self.string_prefix(*piece);
            if prefix.contains('b') {
                return self.other_expr(node, line);
            }
            let raw = prefix.contains('r');
            let is_f = prefix.contains('f');
            formatted |= is_f;

            for child in named_children(*piece) {
                match child.kind() {
                    "string_content" | "escape_sequence" => {
                        let text = self.text(child);
                        push_literal(&mut parts, decode_literal(&text, raw, is_f));
                    }
                    "interpolation" if is_f => parts.push(self.lower_interpolation(child)),
                    "interpolation" => push_literal(&mut parts, self.text(child)),
                    _ => {}
                }
            }
        }

        let text = self.text(node);
        if formatted {
            return Expr::FString(FString { parts, text, line });
        }

        let value = parts
            .into_iter()
            .map(|part| match part {
                FStringPart::Literal(s) => s,
                FStringPart::Interpolation { .. } => String::new(),
            })
            .collect();
        Expr::Str(StrLit { value, text, line })
    }

    fn lower_interpolation(&self, node: Node) -> FStringPart {
        let value = match node.child_by_field_name("expression") {
            Some(expr) => self.lower_expr(expr),
            None => self.other_expr(node, line_of(node)),
        };

        let mut format_spec = Vec::new();
        if let Some(spec) = node.child_by_field_name("format_specifier") {
            for nested in named_children(spec) {
                if let Some(expr) = nested.child_by_field_name("expression") {
                    format_spec.push(self.lower_expr(expr));
                }
            }
        }

        FStringPart::Interpolation {
            value: Box::new(value),
            format_spec,
        }
    }

    /// Lowercased prefix letters of a string (`rb`, `f`, ...).
    fn string_prefix(&self, node: Node) -> String {
        let start = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "string_start")
            .map(|c| self.text(c))
            .unwrap_or_default();
        start
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }

    fn other_expr(&self, node: Node, line: usize) -> Expr {
        Expr::Other(OtherExpr {
            kind: node.kind().to_string(),
            text: self.text(node),
            children: named_children(node)
                .into_iter()
                .map(|child| self.lower_expr(child))
                .collect(),
            line,
        })
    }
}

/// Named, non-comment children of a node.
pub(super) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn has_block(node: Node) -> bool {
    named_children(node).iter().any(|c| c.kind() == "block")
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1 // tree-sitter rows are 0-indexed
}

fn push_literal(parts: &mut Vec<FStringPart>, text: String) {
    if let Some(FStringPart::Literal(last)) = parts.last_mut() {
        last.push_str(&text);
    } else {
        parts.push(FStringPart::Literal(text));
    }
}

fn decode_literal(text: &str, raw: bool, formatted: bool) -> String {
    let text = if formatted {
        text.replace("{{", "{").replace("}}", "}")
    } else {
        text.to_string()
    };
    if raw {
        text
    } else {
        unescape(&text)
    }
}

/// Resolves Python backslash escapes. Unknown escapes are kept verbatim.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(kind @ ('x' | 'u' | 'U')) => {
                let width = match kind {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(kind);
                        out.push_str(&digits);
                    }
                }
            }
            Some(first @ '0'..='7') => {
                let mut digits = String::from(first);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
