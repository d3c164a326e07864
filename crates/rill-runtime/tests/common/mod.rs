//! Shared test helpers: AST builders and run/analyze harnesses.
//!
//! Trees are built the way the external parser would build them, with
//! default spans; the semantic passes never require real offsets.

#![allow(dead_code)]

use rill_runtime::analyzer::{AnalysisError, Analyzer};
use rill_runtime::ast::*;
use rill_runtime::span::Span;
use rill_runtime::value::{RuntimeError, Value};
use rill_runtime::Interpreter;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

// ============================================================================
// Expression builders
// ============================================================================

pub fn int(value: i64) -> Expr {
    Expr::Literal(LiteralExpr::new(Literal::Integer(value), Span::default()))
}

pub fn dec(value: f64) -> Expr {
    Expr::Literal(LiteralExpr::new(Literal::Decimal(value), Span::default()))
}

pub fn boolean(value: bool) -> Expr {
    Expr::Literal(LiteralExpr::new(Literal::Boolean(value), Span::default()))
}

pub fn chr(value: char) -> Expr {
    Expr::Literal(LiteralExpr::new(Literal::Character(value), Span::default()))
}

pub fn text(value: &str) -> Expr {
    Expr::Literal(LiteralExpr::new(
        Literal::String(value.to_string()),
        Span::default(),
    ))
}

pub fn nil() -> Expr {
    Expr::Literal(LiteralExpr::new(Literal::Nil, Span::default()))
}

pub fn access(name: &str) -> Expr {
    Expr::Access(AccessExpr::new(name, None, Span::default()))
}

pub fn index(name: &str, offset: Expr) -> Expr {
    Expr::Access(AccessExpr::new(name, Some(offset), Span::default()))
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr::new(name, args, Span::default()))
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr::new(op, left, right, Span::default()))
}

pub fn group(inner: Expr) -> Expr {
    Expr::Group(GroupExpr::new(inner, Span::default()))
}

pub fn list(elements: Vec<Expr>) -> Expr {
    Expr::List(ListExpr::new(elements, Span::default()))
}

// ============================================================================
// Statement builders
// ============================================================================

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(ExprStmt {
        expr,
        span: Span::default(),
    })
}

pub fn let_decl(name: &str, type_name: Option<&str>, init: Option<Expr>) -> Stmt {
    Stmt::VarDecl(VarDecl::new(
        name,
        type_name.map(str::to_string),
        init,
        Span::default(),
    ))
}

pub fn assign(target: Expr, value: Expr) -> Stmt {
    Stmt::Assign(AssignStmt {
        target,
        value,
        span: Span::default(),
    })
}

pub fn assign_name(name: &str, value: Expr) -> Stmt {
    assign(access(name), value)
}

pub fn if_stmt(cond: Expr, then_block: Vec<Stmt>, else_block: Vec<Stmt>) -> Stmt {
    Stmt::If(IfStmt {
        cond,
        then_block,
        else_block,
        span: Span::default(),
    })
}

pub fn case(value: Expr, body: Vec<Stmt>) -> SwitchCase {
    SwitchCase {
        value: Some(value),
        body,
        span: Span::default(),
    }
}

pub fn default_case(body: Vec<Stmt>) -> SwitchCase {
    SwitchCase {
        value: None,
        body,
        span: Span::default(),
    }
}

pub fn switch(cond: Expr, cases: Vec<SwitchCase>) -> Stmt {
    Stmt::Switch(SwitchStmt {
        cond,
        cases,
        span: Span::default(),
    })
}

pub fn while_stmt(cond: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::While(WhileStmt {
        cond,
        body,
        span: Span::default(),
    })
}

pub fn ret(value: Expr) -> Stmt {
    Stmt::Return(ReturnStmt {
        value,
        span: Span::default(),
    })
}

// ============================================================================
// Declaration builders
// ============================================================================

pub fn global(name: &str, type_name: &str, mutable: bool, init: Option<Expr>) -> GlobalDecl {
    GlobalDecl::new(name, type_name, mutable, init, Span::default())
}

pub fn function(
    name: &str,
    params: &[(&str, &str)],
    return_type: Option<&str>,
    body: Vec<Stmt>,
) -> FunctionDecl {
    FunctionDecl::new(
        name,
        params.iter().map(|(n, _)| n.to_string()).collect(),
        params.iter().map(|(_, t)| t.to_string()).collect(),
        return_type.map(str::to_string),
        body,
        Span::default(),
    )
}

/// `FUN main(): Integer DO ... END`
pub fn main_fn(body: Vec<Stmt>) -> FunctionDecl {
    function("main", &[], Some("Integer"), body)
}

pub fn program(globals: Vec<GlobalDecl>, functions: Vec<FunctionDecl>) -> Program {
    Program { globals, functions }
}

/// A program whose only function is `main` with the given body
pub fn program_main(body: Vec<Stmt>) -> Program {
    program(vec![], vec![main_fn(body)])
}

// ============================================================================
// Harnesses
// ============================================================================

pub fn analyze(program: &Program) -> Result<(), AnalysisError> {
    Analyzer::new().analyze(program)
}

pub fn run(program: &Program) -> Result<Value, RuntimeError> {
    Interpreter::new().run(program)
}

/// Run the program with `print` captured; returns the outcome and the
/// collected output text.
pub fn run_capturing(program: &Program) -> (Result<Value, RuntimeError>, String) {
    let sink = SharedOutput::default();
    let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));
    let result = interpreter.run(program);
    (result, sink.into_string())
}

/// Clonable in-memory output sink for capturing `print`.
#[derive(Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn into_string(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
