//! External contracts consumed by the interpreter, transaction manager
//! and prompt evaluator. This crate defines only the traits;
//! the relational algorithms, the SQL/procedure parser, file I/O with
//! advisory locking, and the interactive terminal are out of scope here
//! and are expected to be supplied by a caller.

use tabql_ast::statement::FetchPosition;
use tabql_ast::SyntaxError;
use tabql_core::{AppError, Value, View};

use crate::session::Session;

/// Evaluates the one `Expression` variant this crate cannot resolve on
/// its own: `Raw`, an opaque scalar/query expression beyond the closed
/// set of literal/variable/boolean-connective nodes. The prompt evaluator
/// (§4.G) and `IF`/`WHILE`/`PRINT` argument evaluation both go through
/// this for anything beyond a bare variable reference.
pub trait Evaluator {
    fn eval_raw(&mut self, query: &str, session: &mut Session) -> Result<Value, AppError>;
}

/// Select/Insert/Update/Delete/DDL and cursor advancement. Each method
/// receives the opaque query text carried by the corresponding
/// [`tabql_ast::statement::StatementKind`] variant plus the session
/// (for scope lookups and the view cache) and returns the materialized
/// view(s) the interpreter logs a [`tabql_core::MutationResult`] from.
pub trait RelationalOperators {
    fn select(&mut self, query: &str, session: &mut Session) -> Result<View, AppError>;

    /// `OperatedRecords` is set on the returned view.
    fn insert(&mut self, query: &str, session: &mut Session) -> Result<View, AppError>;

    /// One view per touched table.
    fn update(&mut self, query: &str, session: &mut Session) -> Result<Vec<View>, AppError>;

    fn delete(&mut self, query: &str, session: &mut Session) -> Result<Vec<View>, AppError>;

    /// `OperatedRecords` is always 0.
    fn create_table(&mut self, query: &str, session: &mut Session) -> Result<View, AppError>;

    fn add_columns(&mut self, query: &str, session: &mut Session) -> Result<View, AppError>;

    fn drop_columns(&mut self, query: &str, session: &mut Session) -> Result<View, AppError>;

    fn rename_column(&mut self, query: &str, session: &mut Session) -> Result<View, AppError>;

    /// Advances `cursor`, binding the fetched row into `into`. `false`
    /// means the cursor is exhausted; the caller is responsible for
    /// translating that into loop termination, not an error.
    fn fetch_cursor(
        &mut self,
        cursor: &str,
        position: Option<&FetchPosition>,
        into: &[String],
        session: &mut Session,
    ) -> Result<bool, AppError>;
}

/// Create/update a file on disk with an advisory exclusive lock. Exact
/// error text is part of the contract so the interpreter can map it to
/// `AutoCommitError` vs `WriteFileError` without string matching inside
/// this crate.
pub trait FileLayer {
    /// Errors with `"file {path} already exists"` or `"open {path}: no
    /// such file or directory"` (missing parent directory).
    fn create_file(&mut self, path: &str, bytes: &[u8]) -> std::io::Result<()>;

    /// Errors with `"open {path}: no such file or directory"` if the
    /// file does not exist. Writes atomically (write-to-temp-and-rename)
    /// under an advisory exclusive lock, retrying on contention.
    fn update_file(&mut self, path: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// `Parse(source, name) -> [Statement] | SyntaxError`.
pub trait Parser {
    fn parse(&self, source: &str, name: &str) -> Result<Vec<tabql_ast::Statement>, SyntaxError>;
}

/// The interactive line-editor and its surrounding terminal chrome
///. Implemented outside this core; the prompt evaluator and
/// CLI driver are the only callers.
pub trait Terminal {
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;
    fn write(&mut self, text: &str);
    fn write_error(&mut self, text: &str);
    fn set_prompt(&mut self, prompt: String);
    fn set_continuous_prompt(&mut self, prompt: String);
    fn save_history(&mut self);
    fn teardown(&mut self);
    fn get_size(&self) -> (u16, u16);
    fn reload_config(&mut self);
    fn update_completer(&mut self, words: &[String]);
}
