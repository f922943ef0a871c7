//! Drives a real [`Interpreter`] against a real [`LocalFileLayer`] on a
//! temp directory, exercising the scenarios that need an actual
//! filesystem: a committed `CREATE TABLE`/`INSERT` persists a
//! file, and a rolled-back `INSERT` leaves it untouched. The relational
//! algorithms themselves are out of scope, so `ScriptedTable`
//! below is a test-only stand-in that performs one fixed table's worth
//! of create/insert instead of parsing its query text.

use tabql_ast::statement::{FetchPosition, Statement, StatementKind};
use tabql_core::{AppError, FileInfo, Flags, Format, Header, HeaderField, Value, View};
use tabql_engine::file::LocalFileLayer;
use tabql_engine::operators::{Evaluator, Parser, RelationalOperators};
use tabql_engine::{Interpreter, Session, StdWriter};

struct ScriptedTable {
    path: String,
}

impl RelationalOperators for ScriptedTable {
    fn select(&mut self, _query: &str, _session: &mut Session) -> Result<View, AppError> {
        unimplemented!("not exercised by this scenario")
    }

    fn insert(&mut self, _query: &str, session: &mut Session) -> Result<View, AppError> {
        let mut view = session.cache.get(&self.path).expect("table must be created first").clone();
        view.records.push(vec![Value::Integer(1), Value::Integer(2)]);
        view.operated_records = 1;
        Ok(view)
    }

    fn update(&mut self, _query: &str, _session: &mut Session) -> Result<Vec<View>, AppError> {
        unimplemented!()
    }

    fn delete(&mut self, _query: &str, _session: &mut Session) -> Result<Vec<View>, AppError> {
        unimplemented!()
    }

    fn create_table(&mut self, _query: &str, _session: &mut Session) -> Result<View, AppError> {
        let header = Header(vec![HeaderField::new(None, "a"), HeaderField::new(None, "b")]);
        let info = FileInfo {
            path: self.path.clone(),
            format: Format::Csv,
            delimiter: ',',
            delimiter_positions: None,
            encoding: tabql_core::Encoding::Utf8,
            line_break: tabql_core::LineBreak::Lf,
            no_header: false,
            enclose_all: false,
            json_escape: tabql_core::JsonEscape::Backslash,
            pretty_print: false,
            is_temporary: false,
        };
        Ok(View::new(header, vec![], Some(info)))
    }

    fn add_columns(&mut self, _query: &str, _session: &mut Session) -> Result<View, AppError> {
        unimplemented!()
    }

    fn drop_columns(&mut self, _query: &str, _session: &mut Session) -> Result<View, AppError> {
        unimplemented!()
    }

    fn rename_column(&mut self, _query: &str, _session: &mut Session) -> Result<View, AppError> {
        unimplemented!()
    }

    fn fetch_cursor(
        &mut self,
        _cursor: &str,
        _position: Option<&FetchPosition>,
        _into: &[String],
        _session: &mut Session,
    ) -> Result<bool, AppError> {
        unimplemented!()
    }
}

struct NoopEvaluator;
impl Evaluator for NoopEvaluator {
    fn eval_raw(&mut self, _query: &str, _session: &mut Session) -> Result<Value, AppError> {
        unimplemented!()
    }
}

struct NoopParser;
impl Parser for NoopParser {
    fn parse(&self, _source: &str, _name: &str) -> Result<Vec<Statement>, tabql_ast::SyntaxError> {
        unimplemented!()
    }
}

fn stmt(kind: StatementKind) -> Statement {
    Statement { pos: None, kind }
}

#[test]
fn create_table_insert_commit_persists_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.csv").to_str().unwrap().to_string();

    let mut table = ScriptedTable { path: path.clone() };
    let mut evaluator = NoopEvaluator;
    let parser = NoopParser;
    let mut file_layer = LocalFileLayer::new(std::time::Duration::from_millis(1), std::time::Duration::from_millis(50));
    let mut session = Session::new(Flags::default(), Box::new(StdWriter));

    let statements = vec![
        stmt(StatementKind::CreateTable { query: format!("CREATE TABLE `{path}` (a, b)") }),
        stmt(StatementKind::Insert { query: format!("INSERT INTO `{path}` VALUES (1, 2)") }),
        stmt(StatementKind::Commit),
    ];

    let mut interpreter = Interpreter::new(&mut table, &mut evaluator, &mut file_layer, &parser);
    let signal = interpreter.run(&statements, &mut session);
    assert!(matches!(signal, tabql_engine::FlowSignal::Terminate));

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "a,b\n1,2");
}

#[test]
fn insert_then_rollback_leaves_the_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.csv").to_str().unwrap().to_string();
    std::fs::write(&path, "a,b\n1,2").unwrap();

    let mut table = ScriptedTable { path: path.clone() };
    let mut evaluator = NoopEvaluator;
    let parser = NoopParser;
    let mut file_layer = LocalFileLayer::new(std::time::Duration::from_millis(1), std::time::Duration::from_millis(50));
    let mut session = Session::new(Flags::default(), Box::new(StdWriter));

    // Prime the cache the way a SELECT/loader would, then update and
    // roll back without ever calling the file layer.
    let header = Header(vec![HeaderField::new(None, "a"), HeaderField::new(None, "b")]);
    let info = FileInfo { path: path.clone(), format: Format::Csv, ..FileInfo::temporary(&path) };
    session.cache.set(&path, View::new(header, vec![vec![Value::Integer(1), Value::Integer(2)]], Some(info)));

    let statements = vec![
        stmt(StatementKind::Insert { query: format!("INSERT INTO `{path}` VALUES (3, 4)") }),
        stmt(StatementKind::Rollback),
    ];

    let mut interpreter = Interpreter::new(&mut table, &mut evaluator, &mut file_layer, &parser);
    let signal = interpreter.run(&statements, &mut session);
    assert!(matches!(signal, tabql_engine::FlowSignal::Terminate));

    let unchanged = std::fs::read_to_string(&path).unwrap();
    assert_eq!(unchanged, "a,b\n1,2");
}
