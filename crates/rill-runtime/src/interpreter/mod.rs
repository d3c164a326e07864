//! AST interpreter (tree-walking)
//!
//! Direct AST evaluation with environment-based variable storage. Runs on
//! undecorated trees: the analyzer is not a prerequisite, so runtime
//! errors on unanalyzed programs are a separate, fully supported error
//! surface. Execution is a single-threaded depth-first walk; `return` is
//! modeled as an explicit `ControlFlow` signal propagated by statement
//! executors, never as unwinding.

mod expr;
mod stmt;

use crate::ast::{FunctionDecl, GlobalDecl, Program, Stmt};
use crate::environment::{Scope, ScopeRef};
use crate::span::Span;
use crate::value::{RuntimeError, Value};
use std::io::{self, Write};
use std::rc::Rc;

/// Control flow signal for handling early return
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlFlow {
    None,
    Return(Value),
}

/// A variable's live binding: current value plus mutability.
///
/// Clones share the value cell, so an assignment seen through any scope in
/// the chain updates the one binding.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub(crate) mutable: bool,
    pub(crate) value: Rc<std::cell::RefCell<Value>>,
}

impl Binding {
    fn new(mutable: bool, value: Value) -> Self {
        Self {
            mutable,
            value: Rc::new(std::cell::RefCell::new(value)),
        }
    }
}

/// A callable function binding, keyed in scope by (name, arity).
#[derive(Debug, Clone)]
pub(crate) struct Callable {
    pub(crate) name: String,
    pub(crate) kind: CallableKind,
}

#[derive(Debug, Clone)]
pub(crate) enum CallableKind {
    /// Built-in dispatched by name
    Builtin,
    /// User-defined function body with its lexical defining scope
    User(Rc<UserFunction>),
}

/// User-defined function
#[derive(Debug)]
pub(crate) struct UserFunction {
    pub(crate) parameters: Vec<String>,
    pub(crate) body: Vec<Stmt>,
    /// Scope the function was defined in; calls chain off this scope,
    /// not the caller's.
    pub(crate) defining_scope: Env,
}

/// Runtime scope chain: live bindings by name, callables by (name, arity).
pub(crate) type Env = ScopeRef<Binding, Callable>;

/// Interpreter state
pub struct Interpreter {
    /// Active scope; swapped to a child on block entry, restored on exit
    scope: Env,
    /// Output sink for `print`
    out: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter printing to stdout
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Create an interpreter printing to the given sink
    pub fn with_output(out: Box<dyn Write>) -> Self {
        let scope: Env = Scope::root();
        let print = Callable {
            name: "print".to_string(),
            kind: CallableKind::Builtin,
        };
        let defined = scope.borrow_mut().define_function("print", 1, print);
        debug_assert!(defined);
        Self { scope, out }
    }

    /// Execute a program: run globals, define functions, then invoke the
    /// zero-argument `main` and return its value.
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        for global in &program.globals {
            self.define_global(global)?;
        }
        for function in &program.functions {
            self.define_user_function(function)?;
        }
        let main = self.lookup_function("main", 0, Span::default())?;
        self.call(&main, Vec::new(), Span::default())
    }

    fn define_global(&mut self, global: &GlobalDecl) -> Result<(), RuntimeError> {
        let value = match &global.init {
            Some(init) => self.eval_expr(init)?,
            None => Value::Nil,
        };
        self.define_variable(&global.name, global.mutable, value, global.span)
    }

    fn define_user_function(&mut self, function: &FunctionDecl) -> Result<(), RuntimeError> {
        let callable = Callable {
            name: function.name.clone(),
            kind: CallableKind::User(Rc::new(UserFunction {
                parameters: function.parameters.clone(),
                body: function.body.clone(),
                defining_scope: Rc::clone(&self.scope),
            })),
        };
        let defined = self.scope.borrow_mut().define_function(
            &function.name,
            function.parameters.len(),
            callable,
        );
        if !defined {
            return Err(RuntimeError::DuplicateDefinition {
                name: function.name.clone(),
                span: function.span,
            });
        }
        Ok(())
    }

    /// Invoke a callable with already-evaluated arguments.
    pub(crate) fn call(
        &mut self,
        callable: &Callable,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match &callable.kind {
            CallableKind::Builtin => self.call_builtin(&callable.name, args, span),
            CallableKind::User(function) => {
                // The call scope chains off the defining scope (lexical),
                // not the caller's; the caller's scope comes back whether
                // the body completes or errors.
                let caller = Rc::clone(&self.scope);
                self.scope = Scope::child_of(&function.defining_scope);
                let result = self.invoke_user(function, args, span);
                self.scope = caller;
                result
            }
        }
    }

    fn invoke_user(
        &mut self,
        function: &UserFunction,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        for (name, value) in function.parameters.iter().zip(args) {
            self.define_variable(name, true, value, span)?;
        }
        for stmt in &function.body {
            if let ControlFlow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(value);
            }
        }
        Ok(Value::Nil)
    }

    fn call_builtin(
        &mut self,
        name: &str,
        mut args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match name {
            "print" => {
                let value = args.pop().unwrap_or(Value::Nil);
                writeln!(self.out, "{value}").map_err(|err| RuntimeError::Io {
                    message: err.to_string(),
                    span,
                })?;
                Ok(Value::Nil)
            }
            _ => Err(RuntimeError::UndefinedFunction {
                name: name.to_string(),
                arity: args.len(),
                span,
            }),
        }
    }

    pub(crate) fn define_variable(
        &mut self,
        name: &str,
        mutable: bool,
        value: Value,
        span: Span,
    ) -> Result<(), RuntimeError> {
        let defined = self
            .scope
            .borrow_mut()
            .define_variable(name, Binding::new(mutable, value));
        if !defined {
            return Err(RuntimeError::DuplicateDefinition {
                name: name.to_string(),
                span,
            });
        }
        Ok(())
    }

    pub(crate) fn lookup_variable(
        &self,
        name: &str,
        span: Span,
    ) -> Result<Binding, RuntimeError> {
        self.scope
            .borrow()
            .lookup_variable(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
                span,
            })
    }

    pub(crate) fn lookup_function(
        &self,
        name: &str,
        arity: usize,
        span: Span,
    ) -> Result<Callable, RuntimeError> {
        self.scope
            .borrow()
            .lookup_function(name, arity)
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
                arity,
                span,
            })
    }

    /// Run `f` in a fresh child scope; the parent is restored on every
    /// exit path, error and return-unwind included.
    fn in_child_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let parent = Rc::clone(&self.scope);
        self.scope = Scope::child_of(&parent);
        let result = f(self);
        self.scope = parent;
        result
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
