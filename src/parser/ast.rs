//! Owned, typed syntax tree produced by lowering a tree-sitter parse.
//!
//! Only the shapes the extractors care about get their own variant. Every
//! other statement or expression lands in an `Other` variant that still keeps
//! its children, so walks reach calls nested anywhere in the file.

/// The syntax tree of one source file's top-level statements.
///
/// An empty `body` is also what unparsable input turns into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUnit {
    pub body: Vec<Stmt>,
}

impl ParsedUnit {
    /// A unit representing the empty program.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the unit has no statements at all.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Import(Import),
    ImportFrom(ImportFrom),
    Assign(Assign),
    Expr(ExprStmt),
    Other(OtherStmt),
}

/// One `name` or `name as alias` entry of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

/// `import a.b, c as d`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub names: Vec<Alias>,
    pub line: usize,
}

/// `from module import a, b` (module is `None` for `from . import x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFrom {
    pub module: Option<String>,
    pub names: Vec<Alias>,
    pub line: usize,
}

/// Plain (possibly chained) assignment: `a = b = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    /// Targets in source order.
    pub targets: Vec<Expr>,
    pub value: Expr,
    pub line: usize,
}

impl Assign {
    /// The last target that is a bare name, or the empty string.
    pub fn simple_target(&self) -> &str {
        self.targets
            .iter()
            .filter_map(Expr::as_name)
            .last()
            .unwrap_or("")
    }
}

/// An expression (or bare tuple of expressions) used as a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprStmt {
    pub values: Vec<Expr>,
    pub line: usize,
}

/// Any other statement: compound statements, returns, augmented assignments...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherStmt {
    /// tree-sitter node kind, e.g. `function_definition`.
    pub kind: String,
    /// Header expressions (conditions, parameters, decorators, operands).
    pub exprs: Vec<Expr>,
    /// Nested statements, including clause statements like `elif`/`except`.
    pub body: Vec<Stmt>,
    pub line: usize,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Name(Name),
    Str(StrLit),
    FString(FString),
    Attribute(Attribute),
    Call(Call),
    Other(OtherExpr),
}

impl Expr {
    /// Source text of the expression.
    pub fn text(&self) -> &str {
        match self {
            Expr::Name(e) => &e.id,
            Expr::Str(e) => &e.text,
            Expr::FString(e) => &e.text,
            Expr::Attribute(e) => &e.text,
            Expr::Call(e) => &e.text,
            Expr::Other(e) => &e.text,
        }
    }

    /// The identifier if this is a bare name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Expr::Name(n) => Some(&n.id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub id: String,
    pub line: usize,
}

/// A string literal. `value` is the decoded content, `text` the source form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrLit {
    pub value: String,
    pub text: String,
    pub line: usize,
}

/// One segment of an f-string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FStringPart {
    Literal(String),
    Interpolation {
        value: Box<Expr>,
        /// Expressions nested in the format specifier (`f"{x:{width}}"`).
        format_spec: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FString {
    pub parts: Vec<FStringPart>,
    pub text: String,
    pub line: usize,
}

/// `value.attr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub value: Box<Expr>,
    pub attr: String,
    pub text: String,
    pub line: usize,
}

/// `key=value`, or `**value` when `arg` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
}

/// Where one written argument of a call landed: `args[i]` or `keywords[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSlot {
    Positional(usize),
    Keyword(usize),
}

/// `func(args..., keywords...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub func: Box<Expr>,
    /// Positional arguments, `*splat` included.
    pub args: Vec<Expr>,
    /// `None` when the call has no keyword arguments.
    pub keywords: Option<Vec<Keyword>>,
    /// Every argument in the order it was written.
    pub order: Vec<ArgSlot>,
    pub text: String,
    pub line: usize,
}

impl Call {
    /// Positional and keyword argument values, in source order.
    ///
    /// `f(k=g(), *h())` yields `g()` before `h()` even though `*h()` is
    /// positional.
    pub fn argument_values(&self) -> impl Iterator<Item = &Expr> + '_ {
        self.order.iter().filter_map(move |slot| match *slot {
            ArgSlot::Positional(i) => self.args.get(i),
            ArgSlot::Keyword(i) => self
                .keywords
                .as_ref()
                .and_then(|keywords| keywords.get(i))
                .map(|keyword| &keyword.value),
        })
    }
}

/// Any other expression shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherExpr {
    pub kind: String,
    pub text: String,
    pub children: Vec<Expr>,
    pub line: usize,
}
