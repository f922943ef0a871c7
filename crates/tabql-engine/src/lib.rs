//! Scope chain, view cache, procedure interpreter, transaction manager
//! and prompt evaluator. The
//! relational operators, parser and terminal line-editor this crate
//! calls through are external contracts, defined here only as
//! traits — their implementations live outside this core.

pub mod cache;
pub mod file;
pub mod flow;
pub mod interpreter;
pub mod operators;
pub mod prompt;
pub mod scope;
pub mod session;
pub mod transaction;

pub use cache::ViewCache;
pub use flow::FlowSignal;
pub use interpreter::Interpreter;
pub use operators::{Evaluator, FileLayer, Parser, RelationalOperators, Terminal};
pub use scope::{CursorBinding, ScopeStack, UserFunction};
pub use session::{BufferWriter, Session, StdWriter, Writer};
pub use transaction::TransactionManager;
