use tabql_core::{AppError, Value};

/// What every statement execution returns. A block executes
/// statements in order; on anything other than `Terminate` it stops
/// executing further statements in that block and propagates the signal
/// to its caller unchanged (parent blocks never wrap it).
#[derive(Debug)]
pub enum FlowSignal {
    /// The statement ran to completion; the enclosing block continues
    /// with its next statement.
    Terminate,
    /// From a `CONTINUE` statement: caught by the nearest enclosing
    /// `WHILE`/`WHILE IN CURSOR`, which re-evaluates its condition.
    Continue,
    /// From a `BREAK` statement: caught by the nearest enclosing loop,
    /// which itself becomes `Terminate` for its own caller.
    Break,
    /// From an `EXIT` statement: propagates all the way to the script
    /// boundary, unlike `Break`.
    Exit,
    /// From a `RETURN` statement: propagates to the enclosing function
    /// call boundary, carrying the evaluated return value if any.
    Return(Option<Value>),
    Error(AppError),
}

impl FlowSignal {
    pub fn is_terminate(&self) -> bool {
        matches!(self, FlowSignal::Terminate)
    }
}
