use std::fmt;

/// A source position an AST node carries, when it carries one at all.
/// Not every `AppError` has one; `AutoCommitError` raised at script exit
/// never does (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePosition {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for CodePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The structured error taxonomy surfaced to the host shell (§4.H).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("variable redeclared: {name}")]
    VariableRedeclared { name: String, pos: Option<CodePosition> },

    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String, pos: Option<CodePosition> },

    #[error("undefined cursor: {name}")]
    UndefinedCursor { name: String, pos: Option<CodePosition> },

    #[error("cursor closed: {name}")]
    CursorClosed { name: String, pos: Option<CodePosition> },

    #[error("cursor exhausted: {name}")]
    CursorExhausted { name: String, pos: Option<CodePosition> },

    #[error("invalid value: {message}")]
    InvalidValue { message: String, pos: Option<CodePosition> },

    #[error("empty result set")]
    EmptyResultSet,

    #[error("invalid delimiter position: {positions:?}")]
    InvalidDelimiterPosition { positions: Vec<i64> },

    #[error("unpermitted character in {context}: U+{code:04X}")]
    UnpermittedCharacter { context: &'static str, code: u32 },

    #[error("prompt evaluation failed: {message}")]
    PromptEvaluationError { message: String },

    #[error("{message}")]
    AutoCommitError { message: String, pos: Option<CodePosition> },

    #[error("{message}")]
    WriteFileError { path: String, message: String },

    #[error("{message}")]
    UserTriggeredError {
        code: Option<i64>,
        message: String,
        pos: Option<CodePosition>,
    },

    #[error("source inclusion depth exceeded ({limit})")]
    SourceDepthExceeded { limit: usize },

    #[error("function arity mismatch: {name} expects {expected} argument(s), got {got}")]
    FunctionArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        pos: Option<CodePosition>,
    },

    #[error("{0}")]
    AppError(String),
}

impl AppError {
    pub fn position(&self) -> Option<CodePosition> {
        match self {
            AppError::VariableRedeclared { pos, .. }
            | AppError::UndefinedVariable { pos, .. }
            | AppError::UndefinedCursor { pos, .. }
            | AppError::CursorClosed { pos, .. }
            | AppError::CursorExhausted { pos, .. }
            | AppError::InvalidValue { pos, .. }
            | AppError::AutoCommitError { pos, .. }
            | AppError::UserTriggeredError { pos, .. }
            | AppError::FunctionArityMismatch { pos, .. } => *pos,
            _ => None,
        }
    }
}
