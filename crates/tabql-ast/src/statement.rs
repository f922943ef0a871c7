use crate::expression::Expression;
use tabql_core::CodePosition;

/// Cursor advance directions: more than a bare "next".
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPosition {
    Next,
    Prior,
    First,
    Last,
    Absolute(i64),
    Relative(i64),
}

/// A positional AST node. The relational statements (`Select`, `Insert`,
/// ...) only carry the opaque query text here — their algorithms are
/// implemented by the external operators, not by this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub pos: Option<CodePosition>,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    // --- Scope mutators ---
    VariableDeclaration { names: Vec<String>, initial: Option<Expression> },
    VariableSubstitution { name: String, value: Expression },
    DisposeVariable { name: String },
    CursorDeclaration { name: String, query: String },
    CursorOpen { name: String },
    CursorClose { name: String },
    CursorDispose { name: String },
    CursorFetch { name: String, position: FetchPosition, into: Vec<String> },
    TableDeclaration { name: String, columns: Vec<String> },
    DisposeTable { name: String },
    FunctionDeclaration { name: String, params: Vec<String>, body: Vec<Statement> },
    AggregateDeclaration { name: String, params: Vec<String>, body: Vec<Statement> },

    // --- Relational (algorithms are external) ---
    Select { query: String },
    Insert { query: String },
    Update { query: String },
    Delete { query: String },
    CreateTable { query: String },
    AddColumns { query: String },
    DropColumns { query: String },
    RenameColumn { query: String },

    // --- Transaction ---
    Commit,
    Rollback,

    // --- Control flow ---
    If { branches: Vec<(Expression, Vec<Statement>)>, else_body: Option<Vec<Statement>> },
    Case { subject: Option<Expression>, whens: Vec<(Expression, Vec<Statement>)>, else_body: Option<Vec<Statement>> },
    While { condition: Expression, body: Vec<Statement> },
    WhileInCursor { cursor: String, into: Vec<String>, body: Vec<Statement> },
    Continue,
    Break,
    Exit,
    Return { value: Option<Expression> },

    // --- I/O ---
    Print { value: Expression },
    Printf { format: String, args: Vec<Expression> },

    // --- Source inclusion ---
    Source { path: Expression },

    // --- Trigger ---
    Trigger { code: Option<i64>, message: Expression },
}
