//
// ast.rs
//
// Syntax tree contract consumed by the extractor
//
// The extractor is agnostic to how this tree was produced: any Lua parser
// front-end can lower into these shapes. Every node kind is a closed enum
// variant so traversal is exhaustive-match rather than tag-string dispatch.
//

use serde::{Deserialize, Serialize};

/// Line range of a block or definition. Lines are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_line: u32,
    pub end_line: u32,
}

impl Span {
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// Span covering a single line.
    pub fn line(line: u32) -> Self {
        Self::new(line, line)
    }
}

/// Root of a parsed source unit.
///
/// Only `Chunk` is a valid extraction root. The fragment variants exist
/// because parser front-ends can be entered at statement or expression
/// level (REPL input, snippet evaluation); handing such a root to the
/// extractor is the one hard error it reports.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxTree {
    Chunk(Chunk),
    Statement(Box<Stat>),
    Expression(Box<Expr>),
}

impl SyntaxTree {
    /// Human-readable kind of the root node, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SyntaxTree::Chunk(_) => "chunk",
            SyntaxTree::Statement(_) => "statement",
            SyntaxTree::Expression(_) => "expression",
        }
    }
}

/// A whole program: the top-level statement sequence of one source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub block: Block,
    pub span: Span,
}

/// A statement sequence (chunk body, function body, loop body, branch).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stats: Vec<Stat>,
}

impl Block {
    pub fn new(stats: Vec<Stat>) -> Self {
        Self { stats }
    }
}

/// An identifier with its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub name: String,
    pub line: u32,
}

impl Name {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

/// Member access operator: `.` (plain member) or `:` (value-call, which
/// implicitly binds a `self` receiver in definition syntax).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indexer {
    #[serde(rename = ".")]
    Dot,
    #[serde(rename = ":")]
    Colon,
}

impl Indexer {
    pub fn as_str(self) -> &'static str {
        match self {
            Indexer::Dot => ".",
            Indexer::Colon => ":",
        }
    }
}

impl std::fmt::Display for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stat {
    Local(LocalStat),
    Assign(AssignStat),
    Call(CallStat),
    Function(FunctionStat),
    If(IfStat),
    While(WhileStat),
    Repeat(RepeatStat),
    NumericFor(NumericForStat),
    GenericFor(GenericForStat),
    Do(DoStat),
    Return(ReturnStat),
    Break(u32),
}

/// `local a, b = e1, e2` — names and values pair up by position; either
/// side may be longer than the other.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalStat {
    pub names: Vec<Name>,
    pub values: Vec<Expr>,
    pub line: u32,
}

/// `t1, t2 = e1, e2`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStat {
    pub targets: Vec<AssignTarget>,
    pub values: Vec<Expr>,
    pub line: u32,
}

/// Left-hand side of one assignment clause.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// `x = ...`
    Name(Name),
    /// `base.x = ...` (the base may itself be an arbitrary expression)
    Member(MemberTarget),
    /// `base[k] = ...` — never resolvable to an owner, always skipped
    Index(IndexTarget),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberTarget {
    pub base: Expr,
    pub indexer: Indexer,
    pub member: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexTarget {
    pub base: Expr,
    pub index: Expr,
    pub line: u32,
}

/// A call in statement position, e.g. `hook.Run("Init")`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStat {
    pub call: CallExpr,
}

/// `function name() end` / `local function name() end`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionStat {
    pub name: FuncName,
    pub is_local: bool,
    pub body: FuncBody,
    pub line: u32,
}

/// Name form of a function declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum FuncName {
    /// `function f() end`
    Name(Name),
    /// `function base.f() end` / `function base:f() end` — the base is a
    /// full expression so chained forms like `function a.b:c()` are
    /// representable (and get skipped by the extractor).
    Member {
        base: Expr,
        indexer: Indexer,
        member: Name,
    },
}

/// Parameter list and body shared by declarations and function literals.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncBody {
    pub params: Vec<Param>,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Name(String),
    /// The variadic marker, recorded under the literal token `...`.
    Vararg,
}

/// `if`/`elseif`/`else` chain. The `else` clause has no condition.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStat {
    pub clauses: Vec<IfClause>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfClause {
    pub cond: Option<Expr>,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStat {
    pub cond: Expr,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatStat {
    pub block: Block,
    pub cond: Expr,
    pub span: Span,
}

/// `for i = from, to [, step] do ... end`
#[derive(Debug, Clone, PartialEq)]
pub struct NumericForStat {
    pub var: Name,
    pub from: Expr,
    pub to: Expr,
    pub step: Option<Expr>,
    pub block: Block,
    pub span: Span,
}

/// `for k, v in exprs do ... end`
#[derive(Debug, Clone, PartialEq)]
pub struct GenericForStat {
    pub vars: Vec<Name>,
    pub exprs: Vec<Expr>,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoStat {
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStat {
    pub exprs: Vec<Expr>,
    pub line: u32,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Nil {
        line: u32,
    },
    Bool {
        value: bool,
        line: u32,
    },
    Number {
        value: f64,
        line: u32,
    },
    Str {
        value: String,
        line: u32,
    },
    Vararg {
        line: u32,
    },
    /// Anonymous function literal, `function(...) ... end`.
    Function(FuncBody),
    /// Table constructor. Field contents are irrelevant to global-symbol
    /// extraction, so only the entry expressions are carried.
    Table(TableExpr),
    Name(Name),
    Member(Box<MemberExpr>),
    Index(Box<IndexExpr>),
    Call(Box<CallExpr>),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableExpr {
    pub fields: Vec<TableField>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableField {
    /// `{ expr }`
    Item(Expr),
    /// `{ name = expr }`
    Named(String, Expr),
    /// `{ [key] = expr }`
    Keyed(Expr, Expr),
}

/// `base.member` / `base:member`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub base: Expr,
    pub indexer: Indexer,
    pub member: Name,
}

/// `base[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub base: Expr,
    pub index: Expr,
    pub line: u32,
}

/// `callee(args...)` — includes method-call sugar, whose callee is then a
/// `Member` expression with a `:` indexer.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Expr>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub lhs: Expr,
    pub rhs: Expr,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Expr,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
    Len,
}

impl Expr {
    /// Resolve this expression to a bare identifier, if it is one.
    ///
    /// Ownership rules ask this of member-access bases; `None` means the
    /// base is too complex to attribute and the symbol gets skipped.
    pub fn plain_name(&self) -> Option<&str> {
        match self {
            Expr::Name(name) => Some(&name.name),
            _ => None,
        }
    }

    /// Render the statically known value of a literal, if any.
    ///
    /// Used for hook display names: `hook.Run("PlayerSpawn", ...)` is the
    /// common case, but number/boolean/nil literals still carry a value.
    pub fn static_display_value(&self) -> Option<String> {
        match self {
            Expr::Str { value, .. } => Some(value.clone()),
            Expr::Number { value, .. } => Some(value.to_string()),
            Expr::Bool { value, .. } => Some(value.to_string()),
            Expr::Nil { .. } => Some("nil".to_string()),
            _ => None,
        }
    }

    /// Source line of the expression.
    pub fn line(&self) -> u32 {
        match self {
            Expr::Nil { line }
            | Expr::Bool { line, .. }
            | Expr::Number { line, .. }
            | Expr::Str { line, .. }
            | Expr::Vararg { line } => *line,
            Expr::Function(body) => body.span.start_line,
            Expr::Table(table) => table.line,
            Expr::Name(name) => name.line,
            Expr::Member(member) => member.member.line,
            Expr::Index(index) => index.line,
            Expr::Call(call) => call.line,
            Expr::Binary(binary) => binary.line,
            Expr::Unary(unary) => unary.line,
        }
    }

    /// Shorthand constructor for an identifier expression.
    pub fn name(name: impl Into<String>, line: u32) -> Self {
        Expr::Name(Name::new(name, line))
    }

    /// Shorthand constructor for a string literal.
    pub fn string(value: impl Into<String>, line: u32) -> Self {
        Expr::Str {
            value: value.into(),
            line,
        }
    }

    /// Shorthand constructor for a number literal.
    pub fn number(value: f64, line: u32) -> Self {
        Expr::Number { value, line }
    }
}
