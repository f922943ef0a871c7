//! Wires parsed CLI flags into a [`tabql_core::Flags`], initializes
//! logging, and drives a [`tabql_engine::Interpreter`] against a script
//! file or stdin: parse argv, init logging, build the thing that does
//! the work, return a process exit code.
//!
//! The relational-operator algorithms, the parser and the terminal's
//! line-editing are external collaborators this core never implements.
//! [`UnimplementedCollaborators`] is an honest placeholder for them —
//! every method returns a clear error rather than faking behavior — so
//! this crate still produces a runnable binary. A real deployment plugs
//! in its own `RelationalOperators`/`Parser`/`Evaluator` by calling
//! [`run`] directly instead of [`run_with_args`].

mod commands;
mod logger;

use std::ffi::OsString;
use std::io::Read;
use std::time::Duration;

use clap::Parser as _;
use tabql_core::{AppError, Flags};
use tabql_engine::file::LocalFileLayer;
use tabql_ast::FetchPosition;
use tabql_engine::operators::{Evaluator, FileLayer, Parser, RelationalOperators};
use tabql_engine::{Interpreter, Session, StdWriter};

pub use commands::{Cli, CliEncoding, CliJsonEscape, CliLineBreak, OutputFormat};

/// Placeholder for the three collaborators this core declares out of
/// scope. Every method fails with a descriptive error instead of
/// pretending to execute a query language this crate does not parse or
/// plan.
pub struct UnimplementedCollaborators;

fn unimplemented(what: &str) -> AppError {
    AppError::AppError(format!("{what} is an external collaborator; no implementation is linked into this build"))
}

impl RelationalOperators for UnimplementedCollaborators {
    fn select(&mut self, _query: &str, _session: &mut Session) -> Result<tabql_core::View, AppError> {
        Err(unimplemented("SELECT"))
    }
    fn insert(&mut self, _query: &str, _session: &mut Session) -> Result<tabql_core::View, AppError> {
        Err(unimplemented("INSERT"))
    }
    fn update(&mut self, _query: &str, _session: &mut Session) -> Result<Vec<tabql_core::View>, AppError> {
        Err(unimplemented("UPDATE"))
    }
    fn delete(&mut self, _query: &str, _session: &mut Session) -> Result<Vec<tabql_core::View>, AppError> {
        Err(unimplemented("DELETE"))
    }
    fn create_table(&mut self, _stmt: &str, _session: &mut Session) -> Result<tabql_core::View, AppError> {
        Err(unimplemented("CREATE TABLE"))
    }
    fn add_columns(&mut self, _stmt: &str, _session: &mut Session) -> Result<tabql_core::View, AppError> {
        Err(unimplemented("ADD COLUMNS"))
    }
    fn drop_columns(&mut self, _stmt: &str, _session: &mut Session) -> Result<tabql_core::View, AppError> {
        Err(unimplemented("DROP COLUMNS"))
    }
    fn rename_column(&mut self, _stmt: &str, _session: &mut Session) -> Result<tabql_core::View, AppError> {
        Err(unimplemented("RENAME COLUMN"))
    }
    fn fetch_cursor(
        &mut self,
        _cursor: &str,
        _position: Option<&FetchPosition>,
        _into: &[String],
        _session: &mut Session,
    ) -> Result<bool, AppError> {
        Err(unimplemented("FETCH"))
    }
}

impl Evaluator for UnimplementedCollaborators {
    fn eval_raw(&mut self, _query: &str, _session: &mut Session) -> Result<tabql_core::Value, AppError> {
        Err(unimplemented("scalar expression evaluation"))
    }
}

impl Parser for UnimplementedCollaborators {
    fn parse(&self, _source: &str, _name: &str) -> Result<Vec<tabql_ast::Statement>, tabql_ast::SyntaxError> {
        Err(tabql_ast::SyntaxError { message: "no parser is linked into this build".to_string(), line: 1, column: 1 })
    }
}

/// Maps parsed CLI flags onto the process-global flag registry the
/// engine reads; `WithOutFile`'s line-break override happens
/// here, matching the default-LF-unless-OutFile rule in §6.
pub fn flags_from_cli(cli: &Cli) -> Flags {
    use tabql_core::{Encoding, Format, JsonEscape, LineBreak};

    let format = match cli.format {
        OutputFormat::Csv => Format::Csv,
        OutputFormat::Tsv => Format::Tsv,
        OutputFormat::Fixed => Format::Fixed,
        OutputFormat::Json => Format::Json,
        OutputFormat::Ltsv => Format::Ltsv,
        OutputFormat::Gfm => Format::Gfm,
        OutputFormat::Org => Format::Org,
        OutputFormat::Text => Format::Text,
    };
    let write_encoding = match cli.write_encoding {
        CliEncoding::Utf8 => Encoding::Utf8,
        CliEncoding::Utf8Bom => Encoding::Utf8Bom,
        CliEncoding::Sjis => Encoding::Sjis,
    };
    let line_break = match cli.line_break {
        CliLineBreak::Lf => LineBreak::Lf,
        CliLineBreak::CrLf => LineBreak::CrLf,
        CliLineBreak::Cr => LineBreak::Cr,
    };
    let json_escape = match cli.json_escape {
        CliJsonEscape::Backslash => JsonEscape::Backslash,
        CliJsonEscape::HexDigits => JsonEscape::HexDigits,
        CliJsonEscape::AllWithHexDigits => JsonEscape::AllWithHexDigits,
    };

    Flags {
        format,
        delimiter: cli.delimiter,
        write_delimiter: cli.write_delimiter.unwrap_or(cli.delimiter),
        write_encoding,
        line_break,
        without_header: cli.without_header,
        enclose_all: cli.enclose_all,
        json_escape,
        pretty_print: cli.pretty_print,
        color: cli.color,
        out_file: cli.out_file.clone(),
        lock_retry_interval: Duration::from_millis(50),
        lock_timeout: Duration::from_secs(10),
    }
}

fn read_source(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Parses `args` as CLI flags, initializes logging, and runs the script
/// against `operators`/`evaluator`/`parser` with the local filesystem as
/// the file layer. Returns a process exit code.
pub fn run_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    if let Err(e) = logger::init() {
        eprintln!("logger init failed: {e}");
    }
    let cli = Cli::parse_from(args);
    let mut collaborators = UnimplementedCollaborators;
    run(&cli, &mut collaborators, &mut collaborators, &collaborators)
}

/// The reusable entry point: a downstream binary with a real parser and
/// relational operators calls this directly instead of going through
/// [`run_with_args`]'s placeholder collaborators.
pub fn run(
    cli: &Cli,
    operators: &mut dyn RelationalOperators,
    evaluator: &mut dyn Evaluator,
    parser: &dyn Parser,
) -> i32 {
    let flags = flags_from_cli(cli);
    let mut file_layer = LocalFileLayer::new(flags.lock_retry_interval, flags.lock_timeout);
    let mut session = Session::new(flags, Box::new(StdWriter));

    let source = match read_source(cli.source.as_deref()) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("tabql: {e}");
            return 1;
        }
    };
    let name = cli.source.as_deref().unwrap_or("<stdin>");
    let statements = match parser.parse(&source, name) {
        Ok(statements) => statements,
        Err(e) => {
            eprintln!("tabql: {name}:{}:{}: {}", e.line, e.column, e.message);
            return 1;
        }
    };

    let mut interpreter = Interpreter::new(operators, evaluator, &mut file_layer, parser);
    match interpreter.run(&statements, &mut session) {
        tabql_engine::FlowSignal::Error(e) => {
            log::error!("{e}");
            eprintln!("tabql: {e}");
            1
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser as _;

    #[test]
    fn flags_from_cli_defaults_match_the_core_defaults() {
        let cli = Cli::parse_from(["tabql"]);
        let flags = flags_from_cli(&cli);
        assert_eq!(flags.format, tabql_core::Format::Csv);
        assert_eq!(flags.delimiter, ',');
        assert!(!flags.color);
    }

    #[test]
    fn write_delimiter_defaults_to_the_read_delimiter() {
        let cli = Cli::parse_from(["tabql", "--delimiter", ";"]);
        let flags = flags_from_cli(&cli);
        assert_eq!(flags.write_delimiter, ';');
    }

    #[test]
    fn missing_source_file_reports_a_clean_error() {
        let cli = Cli::parse_from(["tabql", "/no/such/file.tabql"]);
        let mut collaborators = UnimplementedCollaborators;
        let code = run(&cli, &mut collaborators, &mut collaborators, &collaborators);
        assert_eq!(code, 1);
    }
}
