//! The explicit context threaded through every statement handler. Spec
//! §9 is blunt about this: Results and the ViewCache "are lifecycle-
//! scoped to a single script execution... do not rely on process
//! globals in the rewrite." `Session` is that context.

use tabql_core::{Flags, MutationResult};

use crate::cache::ViewCache;
use crate::scope::ScopeStack;

/// Injectable sink for PRINT/PRINTF output and diagnostics. Keeping this
/// behind a trait lets the CLI wire a real terminal while tests and
/// `SOURCE`d sub-scripts can share a plain buffer.
pub trait Writer {
    fn write_line(&mut self, line: &str);
    fn write_error_line(&mut self, line: &str);
}

/// Writes to the process's real stdout/stderr.
#[derive(Debug, Default)]
pub struct StdWriter;

impl Writer for StdWriter {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }

    fn write_error_line(&mut self, line: &str) {
        eprintln!("{line}");
    }
}

/// Accumulates output in memory; used by tests and by `SOURCE` when
/// capturing a nested script's output is useful.
#[derive(Debug, Default)]
pub struct BufferWriter {
    pub lines: Vec<String>,
    pub error_lines: Vec<String>,
}

impl Writer for BufferWriter {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn write_error_line(&mut self, line: &str) {
        self.error_lines.push(line.to_string());
    }
}

/// Guards against unbounded `SOURCE` recursion: without this, a
/// self-including script can stack-overflow the interpreter.
const DEFAULT_MAX_SOURCE_DEPTH: usize = 50;

pub struct Session {
    pub flags: Flags,
    pub cache: ViewCache,
    pub results: Vec<MutationResult>,
    pub scope: ScopeStack,
    writer: Box<dyn Writer>,
    source_depth: usize,
    max_source_depth: usize,
}

impl Session {
    pub fn new(flags: Flags, writer: Box<dyn Writer>) -> Self {
        Session {
            flags,
            cache: ViewCache::new(),
            results: Vec::new(),
            scope: ScopeStack::new(),
            writer,
            source_depth: 0,
            max_source_depth: DEFAULT_MAX_SOURCE_DEPTH,
        }
    }

    pub fn print(&mut self, line: &str) {
        self.writer.write_line(line);
    }

    pub fn print_error(&mut self, line: &str) {
        self.writer.write_error_line(line);
    }

    pub fn log_result(&mut self, result: MutationResult) {
        self.results.push(result);
    }

    /// Drained by the transaction manager on commit/rollback.
    pub fn take_results(&mut self) -> Vec<MutationResult> {
        std::mem::take(&mut self.results)
    }

    /// Called on entering a `SOURCE` statement; returns
    /// `SourceDepthExceeded` instead of recursing past the configured
    /// limit. Pair with [`Session::exit_source`] in a guard/drop pattern
    /// at the call site.
    pub fn enter_source(&mut self) -> Result<(), tabql_core::AppError> {
        if self.source_depth >= self.max_source_depth {
            return Err(tabql_core::AppError::SourceDepthExceeded { limit: self.max_source_depth });
        }
        self.source_depth += 1;
        Ok(())
    }

    pub fn exit_source(&mut self) {
        self.source_depth = self.source_depth.saturating_sub(1);
    }
}
