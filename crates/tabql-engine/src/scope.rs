//! Lexically scoped name tables for variables, cursors, user functions and
//! temporary tables. The naive approach stores a parent pointer per
//! scope; instead we keep a flat stack of frames owned by the caller,
//! pushed on block entry and popped on exit. Lookups walk the stack from
//! the top down.

use ahash::AHashMap;
use tabql_core::{AppError, CodePosition, Value, View};

use tabql_ast::statement::Statement;

/// A declared cursor: its defining query plus whether it is currently
/// open. Row advancement itself is delegated to the external
/// `FetchCursor` operator — this struct only tracks the
/// declaration-level state the scope chain is responsible for.
#[derive(Debug, Clone)]
pub struct CursorBinding {
    pub query: String,
    pub is_open: bool,
}

/// A user-declared function or aggregate. The interpreter executes `body` in a fresh
/// child scope seeded with `params` bound to the call arguments.
#[derive(Debug, Clone)]
pub struct UserFunction {
    pub params: Vec<String>,
    pub body: Vec<Statement>,
}

/// One lexical frame. Empty maps are cheap (`AHashMap::default()`
/// allocates nothing until first insert), so pushing a frame per block
/// — including ones that never declare anything — is inexpensive.
#[derive(Debug, Default)]
struct Scope {
    variables: AHashMap<String, Value>,
    cursors: AHashMap<String, CursorBinding>,
    functions: AHashMap<String, UserFunction>,
    aggregates: AHashMap<String, UserFunction>,
    temp_views: AHashMap<String, View>,
}

/// The scope stack threaded through statement execution. Index 0 is the
/// script-level (outermost) frame; the last element is the innermost
/// currently executing block.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { frames: vec![Scope::default()] }
    }

    /// Opens a new child scope on block entry (IF/WHILE/function body).
    pub fn push(&mut self) {
        self.frames.push(Scope::default());
    }

    /// Discards the innermost scope on block exit. Every binding it held
    /// — including temporary tables declared inside it — goes with it.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    fn top(&self) -> &Scope {
        self.frames.last().expect("scope stack is never empty")
    }

    fn top_mut(&mut self) -> &mut Scope {
        self.frames.last_mut().expect("scope stack is never empty")
    }

    // --- Variables ---------------------------------------------------

    pub fn declare_variable(
        &mut self,
        name: &str,
        value: Value,
        pos: Option<CodePosition>,
    ) -> Result<(), AppError> {
        let top = self.top_mut();
        if top.variables.contains_key(name) {
            return Err(AppError::VariableRedeclared { name: name.to_string(), pos });
        }
        top.variables.insert(name.to_string(), value);
        Ok(())
    }

    /// SET-style assignment: the name must already exist somewhere on the
    /// stack, and the assignment lands in the frame that owns it — not
    /// necessarily the innermost one.
    pub fn substitute_variable(
        &mut self,
        name: &str,
        value: Value,
        pos: Option<CodePosition>,
    ) -> Result<(), AppError> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.variables.get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }
        Err(AppError::UndefinedVariable { name: name.to_string(), pos })
    }

    pub fn get_variable(&self, name: &str, pos: Option<CodePosition>) -> Result<Value, AppError> {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.variables.get(name) {
                return Ok(value.clone());
            }
        }
        Err(AppError::UndefinedVariable { name: name.to_string(), pos })
    }

    /// Dispose is scope-local: a name only visible through a parent frame
    /// is not disposable from a child, distinct from plain lookup which
    /// does walk the chain.
    pub fn dispose_variable(&mut self, name: &str, pos: Option<CodePosition>) -> Result<(), AppError> {
        if self.top_mut().variables.remove(name).is_some() {
            Ok(())
        } else {
            Err(AppError::UndefinedVariable { name: name.to_string(), pos })
        }
    }

    // --- Cursors -------------------------------------------------------

    pub fn declare_cursor(
        &mut self,
        name: &str,
        query: String,
        pos: Option<CodePosition>,
    ) -> Result<(), AppError> {
        let top = self.top_mut();
        if top.cursors.contains_key(name) {
            return Err(AppError::VariableRedeclared { name: name.to_string(), pos });
        }
        top.cursors.insert(name.to_string(), CursorBinding { query, is_open: false });
        Ok(())
    }

    fn find_cursor_mut(&mut self, name: &str) -> Option<&mut CursorBinding> {
        self.frames.iter_mut().rev().find_map(|frame| frame.cursors.get_mut(name))
    }

    fn find_cursor(&self, name: &str) -> Option<&CursorBinding> {
        self.frames.iter().rev().find_map(|frame| frame.cursors.get(name))
    }

    pub fn cursor(&self, name: &str, pos: Option<CodePosition>) -> Result<&CursorBinding, AppError> {
        self.find_cursor(name).ok_or_else(|| AppError::UndefinedCursor { name: name.to_string(), pos })
    }

    pub fn open_cursor(&mut self, name: &str, pos: Option<CodePosition>) -> Result<(), AppError> {
        let binding = self
            .find_cursor_mut(name)
            .ok_or_else(|| AppError::UndefinedCursor { name: name.to_string(), pos })?;
        binding.is_open = true;
        Ok(())
    }

    pub fn close_cursor(&mut self, name: &str, pos: Option<CodePosition>) -> Result<(), AppError> {
        let binding = self
            .find_cursor_mut(name)
            .ok_or_else(|| AppError::UndefinedCursor { name: name.to_string(), pos })?;
        binding.is_open = false;
        Ok(())
    }

    pub fn dispose_cursor(&mut self, name: &str, pos: Option<CodePosition>) -> Result<(), AppError> {
        if self.top_mut().cursors.remove(name).is_some() {
            Ok(())
        } else {
            Err(AppError::UndefinedCursor { name: name.to_string(), pos })
        }
    }

    /// Returns an error if the cursor is not open — callers (FETCH) use
    /// this before delegating to the external `FetchCursor` operator.
    pub fn require_open_cursor(&self, name: &str, pos: Option<CodePosition>) -> Result<&CursorBinding, AppError> {
        let binding = self.cursor(name, pos)?;
        if binding.is_open {
            Ok(binding)
        } else {
            Err(AppError::CursorClosed { name: name.to_string(), pos })
        }
    }

    // --- Functions / aggregates ----------------------------------------

    pub fn declare_function(
        &mut self,
        name: &str,
        params: Vec<String>,
        body: Vec<Statement>,
        pos: Option<CodePosition>,
    ) -> Result<(), AppError> {
        let top = self.top_mut();
        if top.functions.contains_key(name) {
            return Err(AppError::VariableRedeclared { name: name.to_string(), pos });
        }
        top.functions.insert(name.to_string(), UserFunction { params, body });
        Ok(())
    }

    pub fn declare_aggregate(
        &mut self,
        name: &str,
        params: Vec<String>,
        body: Vec<Statement>,
        pos: Option<CodePosition>,
    ) -> Result<(), AppError> {
        let top = self.top_mut();
        if top.aggregates.contains_key(name) {
            return Err(AppError::VariableRedeclared { name: name.to_string(), pos });
        }
        top.aggregates.insert(name.to_string(), UserFunction { params, body });
        Ok(())
    }

    fn lookup_function<'a>(
        frames: &'a [Scope],
        pick: impl Fn(&Scope) -> &AHashMap<String, UserFunction>,
        name: &str,
    ) -> Option<&'a UserFunction> {
        frames.iter().rev().find_map(|frame| pick(frame).get(name))
    }

    pub fn function(
        &self,
        name: &str,
        argc: usize,
        pos: Option<CodePosition>,
    ) -> Result<&UserFunction, AppError> {
        let func = Self::lookup_function(&self.frames, |s| &s.functions, name)
            .ok_or_else(|| AppError::UndefinedVariable { name: name.to_string(), pos })?;
        if func.params.len() != argc {
            return Err(AppError::FunctionArityMismatch {
                name: name.to_string(),
                expected: func.params.len(),
                got: argc,
                pos,
            });
        }
        Ok(func)
    }

    pub fn aggregate(
        &self,
        name: &str,
        argc: usize,
        pos: Option<CodePosition>,
    ) -> Result<&UserFunction, AppError> {
        let func = Self::lookup_function(&self.frames, |s| &s.aggregates, name)
            .ok_or_else(|| AppError::UndefinedVariable { name: name.to_string(), pos })?;
        if func.params.len() != argc {
            return Err(AppError::FunctionArityMismatch {
                name: name.to_string(),
                expected: func.params.len(),
                got: argc,
                pos,
            });
        }
        Ok(func)
    }

    // --- Temporary tables ------------------------------------------------

    pub fn declare_temp_table(
        &mut self,
        name: &str,
        view: View,
        pos: Option<CodePosition>,
    ) -> Result<(), AppError> {
        let top = self.top_mut();
        if top.temp_views.contains_key(name) {
            return Err(AppError::VariableRedeclared { name: name.to_string(), pos });
        }
        top.temp_views.insert(name.to_string(), view);
        Ok(())
    }

    pub fn temp_table(&self, name: &str, pos: Option<CodePosition>) -> Result<&View, AppError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.temp_views.get(name))
            .ok_or_else(|| AppError::UndefinedVariable { name: name.to_string(), pos })
    }

    pub fn temp_table_mut(&mut self, name: &str, pos: Option<CodePosition>) -> Result<&mut View, AppError> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.temp_views.get_mut(name))
            .ok_or_else(|| AppError::UndefinedVariable { name: name.to_string(), pos })
    }

    pub fn dispose_temp_table(&mut self, name: &str, pos: Option<CodePosition>) -> Result<(), AppError> {
        if self.top_mut().temp_views.remove(name).is_some() {
            Ok(())
        } else {
            Err(AppError::UndefinedVariable { name: name.to_string(), pos })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaration_in_same_scope_errors() {
        let mut scope = ScopeStack::new();
        scope.declare_variable("x", Value::Integer(1), None).unwrap();
        let err = scope.declare_variable("x", Value::Integer(2), None).unwrap_err();
        assert!(matches!(err, AppError::VariableRedeclared { .. }));
    }

    #[test]
    fn child_scope_sees_parent_binding_but_dispose_is_local() {
        let mut scope = ScopeStack::new();
        scope.declare_variable("x", Value::Integer(1), None).unwrap();
        scope.push();
        assert_eq!(scope.get_variable("x", None).unwrap(), Value::Integer(1));
        let err = scope.dispose_variable("x", None).unwrap_err();
        assert!(matches!(err, AppError::UndefinedVariable { .. }));
        scope.pop();
        scope.dispose_variable("x", None).unwrap();
    }

    #[test]
    fn variable_declared_in_child_is_invisible_after_pop() {
        let mut scope = ScopeStack::new();
        scope.push();
        scope.declare_variable("y", Value::Integer(5), None).unwrap();
        scope.pop();
        let err = scope.get_variable("y", None).unwrap_err();
        assert!(matches!(err, AppError::UndefinedVariable { .. }));
    }

    #[test]
    fn substitute_mutates_the_owning_frame_not_a_shadow() {
        let mut scope = ScopeStack::new();
        scope.declare_variable("x", Value::Integer(1), None).unwrap();
        scope.push();
        scope.substitute_variable("x", Value::Integer(99), None).unwrap();
        scope.pop();
        assert_eq!(scope.get_variable("x", None).unwrap(), Value::Integer(99));
    }

    #[test]
    fn fetch_before_open_is_cursor_closed() {
        let mut scope = ScopeStack::new();
        scope.declare_cursor("c", "SELECT 1".into(), None).unwrap();
        let err = scope.require_open_cursor("c", None).unwrap_err();
        assert!(matches!(err, AppError::CursorClosed { .. }));
        scope.open_cursor("c", None).unwrap();
        scope.require_open_cursor("c", None).unwrap();
    }

    #[test]
    fn function_arity_mismatch_is_reported() {
        let mut scope = ScopeStack::new();
        scope
            .declare_function("f", vec!["a".into(), "b".into()], vec![], None)
            .unwrap();
        let err = scope.function("f", 1, None).unwrap_err();
        assert!(matches!(err, AppError::FunctionArityMismatch { expected: 2, got: 1, .. }));
    }
}
