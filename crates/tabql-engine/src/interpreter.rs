//! Statement dispatch over the closed `StatementKind` set.
//! Each handler threads the [`Session`] (scope chain, view cache, result
//! log) and returns a [`FlowSignal`]; a block stops at the first
//! non-`Terminate` signal and hands it to its own caller unchanged
//!.

use tabql_ast::statement::{FetchPosition, Statement, StatementKind};
use tabql_ast::Expression;
use tabql_core::{AppError, CodePosition, MutationResult, ResultType, SortValue, Ternary, Value, View};

use crate::flow::FlowSignal;
use crate::operators::{Evaluator, FileLayer, Parser, RelationalOperators};
use crate::session::Session;
use crate::transaction::TransactionManager;

/// Bundles the external collaborators the interpreter calls through
///; the interpreter itself owns none of these algorithms.
pub struct Interpreter<'a> {
    pub operators: &'a mut dyn RelationalOperators,
    pub evaluator: &'a mut dyn Evaluator,
    pub file_layer: &'a mut dyn FileLayer,
    pub parser: &'a dyn Parser,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        operators: &'a mut dyn RelationalOperators,
        evaluator: &'a mut dyn Evaluator,
        file_layer: &'a mut dyn FileLayer,
        parser: &'a dyn Parser,
    ) -> Self {
        Interpreter { operators, evaluator, file_layer, parser }
    }

    /// Runs a whole script: the statements execute in the session's
    /// outermost scope, and `EXIT`/`RETURN` reaching the top level end
    /// the script rather than propagating further.
    pub fn run(&mut self, statements: &[Statement], session: &mut Session) -> FlowSignal {
        self.exec_block(statements, session)
    }

    fn exec_block(&mut self, statements: &[Statement], session: &mut Session) -> FlowSignal {
        for statement in statements {
            match self.exec(statement, session) {
                FlowSignal::Terminate => continue,
                other => return other,
            }
        }
        FlowSignal::Terminate
    }

    /// Runs `statements` in a fresh child scope, popping it regardless
    /// of how the block exited.
    fn exec_scoped_block(&mut self, statements: &[Statement], session: &mut Session) -> FlowSignal {
        session.scope.push();
        let signal = self.exec_block(statements, session);
        session.scope.pop();
        signal
    }

    fn exec(&mut self, statement: &Statement, session: &mut Session) -> FlowSignal {
        let pos = statement.pos;
        match self.exec_kind(&statement.kind, pos, session) {
            Ok(signal) => signal,
            Err(err) => FlowSignal::Error(err),
        }
    }

    fn exec_kind(
        &mut self,
        kind: &StatementKind,
        pos: Option<CodePosition>,
        session: &mut Session,
    ) -> Result<FlowSignal, AppError> {
        match kind {
            // --- Scope mutators -------------------------------------------------
            StatementKind::VariableDeclaration { names, initial } => {
                let value = match initial {
                    Some(expr) => self.eval(expr, session)?,
                    None => Value::Null,
                };
                for name in names {
                    session.scope.declare_variable(name, value.clone(), pos)?;
                }
                Ok(FlowSignal::Terminate)
            }
            StatementKind::VariableSubstitution { name, value } => {
                let value = self.eval(value, session)?;
                session.scope.substitute_variable(name, value, pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::DisposeVariable { name } => {
                session.scope.dispose_variable(name, pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::CursorDeclaration { name, query } => {
                session.scope.declare_cursor(name, query.clone(), pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::CursorOpen { name } => {
                session.scope.open_cursor(name, pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::CursorClose { name } => {
                session.scope.close_cursor(name, pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::CursorDispose { name } => {
                session.scope.dispose_cursor(name, pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::CursorFetch { name, position, into } => {
                session.scope.require_open_cursor(name, pos)?;
                self.operators.fetch_cursor(name, Some(position), into, session)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::TableDeclaration { name, columns } => {
                let header = tabql_core::Header(
                    columns
                        .iter()
                        .map(|c| tabql_core::HeaderField::new(None, c.clone()))
                        .collect(),
                );
                let view = View::new(header, vec![], Some(tabql_core::FileInfo::temporary(name.clone())));
                session.scope.declare_temp_table(name, view, pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::DisposeTable { name } => {
                session.scope.dispose_temp_table(name, pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::FunctionDeclaration { name, params, body } => {
                session.scope.declare_function(name, params.clone(), body.clone(), pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::AggregateDeclaration { name, params, body } => {
                session.scope.declare_aggregate(name, params.clone(), body.clone(), pos)?;
                Ok(FlowSignal::Terminate)
            }

            // --- Relational -------------------------------------------------------
            StatementKind::Select { query } => {
                self.operators.select(query, session)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::Insert { query } => {
                let view = self.operators.insert(query, session)?;
                self.log_mutation(session, ResultType::Insert, view);
                Ok(FlowSignal::Terminate)
            }
            StatementKind::Update { query } => {
                let views = self.operators.update(query, session)?;
                for view in views {
                    self.log_mutation(session, ResultType::Update, view);
                }
                Ok(FlowSignal::Terminate)
            }
            StatementKind::Delete { query } => {
                let views = self.operators.delete(query, session)?;
                for view in views {
                    self.log_mutation(session, ResultType::Delete, view);
                }
                Ok(FlowSignal::Terminate)
            }
            StatementKind::CreateTable { query } => {
                let view = self.operators.create_table(query, session)?;
                self.log_mutation(session, ResultType::CreateTable, view);
                Ok(FlowSignal::Terminate)
            }
            StatementKind::AddColumns { query } => {
                let view = self.operators.add_columns(query, session)?;
                self.log_mutation(session, ResultType::AddColumns, view);
                Ok(FlowSignal::Terminate)
            }
            StatementKind::DropColumns { query } => {
                let view = self.operators.drop_columns(query, session)?;
                self.log_mutation(session, ResultType::DropColumns, view);
                Ok(FlowSignal::Terminate)
            }
            StatementKind::RenameColumn { query } => {
                let view = self.operators.rename_column(query, session)?;
                self.log_mutation(session, ResultType::RenameColumn, view);
                Ok(FlowSignal::Terminate)
            }

            // --- Transaction --------------------------------------------------
            StatementKind::Commit => {
                TransactionManager::commit(session, self.file_layer, pos)?;
                Ok(FlowSignal::Terminate)
            }
            StatementKind::Rollback => {
                TransactionManager::rollback(session);
                Ok(FlowSignal::Terminate)
            }

            // --- Control flow ---------------------------------------------------
            StatementKind::If { branches, else_body } => {
                for (condition, body) in branches {
                    if self.eval_ternary(condition, session)?.is_true() {
                        return Ok(self.exec_scoped_block(body, session));
                    }
                }
                if let Some(body) = else_body {
                    return Ok(self.exec_scoped_block(body, session));
                }
                Ok(FlowSignal::Terminate)
            }
            StatementKind::Case { subject, whens, else_body } => {
                let subject_value = match subject {
                    Some(expr) => Some(self.eval(expr, session)?),
                    None => None,
                };
                for (when_expr, body) in whens {
                    let matched = match &subject_value {
                        Some(subject_value) => {
                            let candidate = self.eval(when_expr, session)?;
                            sql_equal(subject_value, &candidate).is_true()
                        }
                        None => self.eval_ternary(when_expr, session)?.is_true(),
                    };
                    if matched {
                        return Ok(self.exec_scoped_block(body, session));
                    }
                }
                if let Some(body) = else_body {
                    return Ok(self.exec_scoped_block(body, session));
                }
                Ok(FlowSignal::Terminate)
            }
            StatementKind::While { condition, body } => {
                while self.eval_ternary(condition, session)?.is_true() {
                    match self.exec_scoped_block(body, session) {
                        FlowSignal::Terminate | FlowSignal::Continue => continue,
                        FlowSignal::Break => break,
                        other @ (FlowSignal::Exit | FlowSignal::Return(_) | FlowSignal::Error(_)) => {
                            return Ok(other)
                        }
                    }
                }
                Ok(FlowSignal::Terminate)
            }
            StatementKind::WhileInCursor { cursor, into, body } => {
                session.scope.require_open_cursor(cursor, pos)?;
                loop {
                    let advanced = self.operators.fetch_cursor(cursor, None, into, session)?;
                    if !advanced {
                        break;
                    }
                    match self.exec_scoped_block(body, session) {
                        FlowSignal::Terminate | FlowSignal::Continue => continue,
                        FlowSignal::Break => break,
                        other @ (FlowSignal::Exit | FlowSignal::Return(_) | FlowSignal::Error(_)) => {
                            return Ok(other)
                        }
                    }
                }
                Ok(FlowSignal::Terminate)
            }
            StatementKind::Continue => Ok(FlowSignal::Continue),
            StatementKind::Break => Ok(FlowSignal::Break),
            StatementKind::Exit => Ok(FlowSignal::Exit),
            StatementKind::Return { value } => {
                let value = match value {
                    Some(expr) => Some(self.eval(expr, session)?),
                    None => None,
                };
                Ok(FlowSignal::Return(value))
            }

            // --- I/O ------------------------------------------------------------
            StatementKind::Print { value } => {
                let value = self.eval(value, session)?;
                session.print(&value.to_string());
                Ok(FlowSignal::Terminate)
            }
            StatementKind::Printf { format, args } => {
                let text = self.printf(format, args, pos, session)?;
                session.print(&text);
                Ok(FlowSignal::Terminate)
            }

            // --- Source inclusion ------------------------------------------------
            StatementKind::Source { path } => {
                let path_value = self.eval(path, session)?.to_string();
                session.enter_source()?;
                let outcome = self.exec_source(&path_value, pos, session);
                session.exit_source();
                outcome
            }

            // --- Trigger ----------------------------------------------------------
            StatementKind::Trigger { code, message } => {
                let message = self.eval(message, session)?.to_string();
                log::warn!("user trigger fired: {message}");
                Err(AppError::UserTriggeredError { code: *code, message, pos })
            }
        }
    }

    /// Reads, parses and inline-executes `path` in the *current* scope
    ///, not a child one —
    /// names a sourced script declares remain visible to its includer.
    fn exec_source(
        &mut self,
        path: &str,
        pos: Option<CodePosition>,
        session: &mut Session,
    ) -> Result<FlowSignal, AppError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::AppError(format!("source {path}: {e}")))?;
        let statements = self
            .parser
            .parse(&text, path)
            .map_err(|e| AppError::AppError(format!("{path}: {} ({}:{})", e.message, e.line, e.column)))?;
        let _ = pos;
        Ok(self.exec_block(&statements, session))
    }

    fn log_mutation(&mut self, session: &mut Session, result_type: ResultType, mut view: View) {
        let operated_count = match result_type {
            ResultType::AddColumns => view.operated_fields,
            _ => view.operated_records,
        };
        if let Some(file_info) = view.file_info.clone() {
            let path = file_info.path.clone();
            session.log_result(MutationResult { result_type, file_info, operated_count });
            view.reset_operated_counters();
            session.cache.set(&path, view);
        }
    }

    /// `PRINTF` requires the argument count to match the format's
    /// placeholders.
    fn printf(
        &mut self,
        format: &str,
        args: &[Expression],
        pos: Option<CodePosition>,
        session: &mut Session,
    ) -> Result<String, AppError> {
        let placeholders = format.matches("%s").count();
        if placeholders != args.len() {
            return Err(AppError::FunctionArityMismatch {
                name: "PRINTF".to_string(),
                expected: placeholders,
                got: args.len(),
                pos,
            });
        }
        let mut out = String::with_capacity(format.len());
        let mut args = args.iter();
        let mut rest = format;
        while let Some(idx) = rest.find("%s") {
            out.push_str(&rest[..idx]);
            let value = self.eval(args.next().expect("count checked above"), session)?;
            out.push_str(&value.to_string());
            rest = &rest[idx + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn eval(&mut self, expr: &Expression, session: &mut Session) -> Result<Value, AppError> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Variable(name) => session.scope.get_variable(name, None),
            Expression::EnvVar(name) => std::env::var(name)
                .map(Value::String)
                .map_err(|_| AppError::InvalidValue { message: format!("undefined environment variable: {name}"), pos: None }),
            Expression::Not(inner) => Ok(Value::Ternary(self.eval_ternary(inner, session)?.not())),
            Expression::And(lhs, rhs) => {
                let l = self.eval_ternary(lhs, session)?;
                let r = self.eval_ternary(rhs, session)?;
                Ok(Value::Ternary(l.and(r)))
            }
            Expression::Or(lhs, rhs) => {
                let l = self.eval_ternary(lhs, session)?;
                let r = self.eval_ternary(rhs, session)?;
                Ok(Value::Ternary(l.or(r)))
            }
            Expression::Equal(lhs, rhs) => {
                let l = self.eval(lhs, session)?;
                let r = self.eval(rhs, session)?;
                Ok(Value::Ternary(sql_equal(&l, &r)))
            }
            Expression::Less(lhs, rhs) => {
                let l = self.eval(lhs, session)?;
                let r = self.eval(rhs, session)?;
                let less = tabql_core::sort_value::less(&SortValue::new(&l), &SortValue::new(&r));
                Ok(Value::Ternary(less))
            }
            Expression::Raw(query) => self.evaluator.eval_raw(query, session),
        }
    }

    fn eval_ternary(&mut self, expr: &Expression, session: &mut Session) -> Result<Ternary, AppError> {
        Ok(as_ternary(&self.eval(expr, session)?))
    }
}

fn as_ternary(value: &Value) -> Ternary {
    match value {
        Value::Ternary(t) => *t,
        Value::Boolean(b) => Ternary::from_bool(*b),
        _ => Ternary::Unknown,
    }
}

/// `Null` compares unequal to everything, including itself;
/// everything else goes through the sort kernel's equivalence, which
/// already implements the Integer/Boolean cross-equivalence.
fn sql_equal(a: &Value, b: &Value) -> Ternary {
    if a.is_null() || b.is_null() {
        return Ternary::Unknown;
    }
    Ternary::from_bool(SortValue::new(a).equivalent(&SortValue::new(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabql_ast::statement::StatementKind;
    use tabql_core::Flags;

    struct NoopOperators;
    impl RelationalOperators for NoopOperators {
        fn select(&mut self, _query: &str, _session: &mut Session) -> Result<View, AppError> {
            unimplemented!("not exercised by these tests")
        }
        fn insert(&mut self, _query: &str, _session: &mut Session) -> Result<View, AppError> {
            unimplemented!()
        }
        fn update(&mut self, _query: &str, _session: &mut Session) -> Result<Vec<View>, AppError> {
            unimplemented!()
        }
        fn delete(&mut self, _query: &str, _session: &mut Session) -> Result<Vec<View>, AppError> {
            unimplemented!()
        }
        fn create_table(&mut self, _query: &str, _session: &mut Session) -> Result<View, AppError> {
            unimplemented!()
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
            Ok(false)
        }
    }

    struct NoopEvaluator;
    impl Evaluator for NoopEvaluator {
        fn eval_raw(&mut self, _query: &str, _session: &mut Session) -> Result<Value, AppError> {
            unimplemented!("not exercised by these tests")
        }
    }

    struct NoopFileLayer;
    impl FileLayer for NoopFileLayer {
        fn create_file(&mut self, _path: &str, _bytes: &[u8]) -> std::io::Result<()> {
            Ok(())
        }
        fn update_file(&mut self, _path: &str, _bytes: &[u8]) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct NoopParser;
    impl Parser for NoopParser {
        fn parse(&self, _source: &str, _name: &str) -> Result<Vec<Statement>, tabql_ast::SyntaxError> {
            Ok(vec![])
        }
    }

    fn stmt(kind: StatementKind) -> Statement {
        Statement { pos: None, kind }
    }

    fn new_session() -> Session {
        Session::new(Flags::default(), Box::new(crate::session::BufferWriter::default()))
    }

    #[test]
    fn variable_declared_inside_if_is_invisible_after() {
        let mut ops = NoopOperators;
        let mut ev = NoopEvaluator;
        let mut fl = NoopFileLayer;
        let parser = NoopParser;
        let mut interp = Interpreter::new(&mut ops, &mut ev, &mut fl, &parser);
        let mut session = new_session();

        let script = vec![stmt(StatementKind::If {
            branches: vec![(
                Expression::Literal(Value::Ternary(Ternary::True)),
                vec![stmt(StatementKind::VariableDeclaration {
                    names: vec!["x".to_string()],
                    initial: Some(Expression::Literal(Value::Integer(1))),
                })],
            )],
            else_body: None,
        })];

        let signal = interp.run(&script, &mut session);
        assert!(signal.is_terminate());
        let err = session.scope.get_variable("x", None).unwrap_err();
        assert!(matches!(err, AppError::UndefinedVariable { .. }));
    }

    #[test]
    fn break_inside_nested_if_terminates_only_the_while() {
        let mut ops = NoopOperators;
        let mut ev = NoopEvaluator;
        let mut fl = NoopFileLayer;
        let parser = NoopParser;
        let mut interp = Interpreter::new(&mut ops, &mut ev, &mut fl, &parser);
        let mut session = new_session();
        session.scope.declare_variable("i", Value::Integer(0), None).unwrap();

        // WHILE i < 3: IF true: BREAK (so the loop always runs exactly once)
        let inner_if = stmt(StatementKind::If {
            branches: vec![(
                Expression::Literal(Value::Ternary(Ternary::True)),
                vec![stmt(StatementKind::Break)],
            )],
            else_body: None,
        });
        let while_stmt = stmt(StatementKind::While {
            condition: Expression::Less(
                Box::new(Expression::Variable("i".to_string())),
                Box::new(Expression::Literal(Value::Integer(3))),
            ),
            body: vec![inner_if],
        });
        let print_after = stmt(StatementKind::Print { value: Expression::Literal(Value::String("after".into())) });

        let signal = interp.run(&[while_stmt, print_after], &mut session);
        assert!(signal.is_terminate());
    }

    #[test]
    fn printf_arity_mismatch_errors() {
        let mut ops = NoopOperators;
        let mut ev = NoopEvaluator;
        let mut fl = NoopFileLayer;
        let parser = NoopParser;
        let mut interp = Interpreter::new(&mut ops, &mut ev, &mut fl, &parser);
        let mut session = new_session();

        let script = vec![stmt(StatementKind::Printf { format: "%s and %s".to_string(), args: vec![Expression::Literal(Value::Integer(1))] })];
        let signal = interp.run(&script, &mut session);
        match signal {
            FlowSignal::Error(AppError::FunctionArityMismatch { name, expected: 2, got: 1, .. }) => {
                assert_eq!(name, "PRINTF");
            }
            other => panic!("expected arity mismatch, got {other:?}"),
        }
    }

    #[test]
    fn trigger_statement_raises_user_triggered_error() {
        let mut ops = NoopOperators;
        let mut ev = NoopEvaluator;
        let mut fl = NoopFileLayer;
        let parser = NoopParser;
        let mut interp = Interpreter::new(&mut ops, &mut ev, &mut fl, &parser);
        let mut session = new_session();

        let script = vec![stmt(StatementKind::Trigger {
            code: Some(42),
            message: Expression::Literal(Value::String("boom".into())),
        })];
        let signal = interp.run(&script, &mut session);
        match signal {
            FlowSignal::Error(AppError::UserTriggeredError { code: Some(42), message, .. }) => {
                assert_eq!(message, "boom");
            }
            other => panic!("expected user triggered error, got {other:?}"),
        }
    }
}
