//! Abstract Syntax Tree (AST) definitions
//!
//! Node shapes for Rill programs, produced by the external parser. Nodes
//! are structurally immutable after construction; the analyzer writes each
//! decoration slot (resolved type, resolved binding) exactly once during
//! its pass. The interpreter never reads decorations, so an undecorated
//! tree runs directly.

use crate::environment::{Function, Variable};
use crate::span::Span;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

/// AST schema version
///
/// Included in JSON dumps so external producers and this crate can detect
/// incompatible tree shapes. Increment on breaking AST changes.
pub const AST_VERSION: u32 = 1;

/// Top-level program: globals in declaration order, then functions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub globals: Vec<GlobalDecl>,
    pub functions: Vec<FunctionDecl>,
}

/// Versioned program wrapper for JSON interchange with the external parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedProgram {
    /// AST schema version
    pub ast_version: u32,
    /// The actual program AST
    #[serde(flatten)]
    pub program: Program,
}

impl VersionedProgram {
    /// Wrap a program with the current schema version
    pub fn new(program: Program) -> Self {
        Self {
            ast_version: AST_VERSION,
            program,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Program> for VersionedProgram {
    fn from(program: Program) -> Self {
        Self::new(program)
    }
}

/// Global declaration: `VAR name: Type = expr;` / `VAL name: Type = expr;`
///
/// The declared type name is required; the initializer is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalDecl {
    pub name: String,
    pub type_name: String,
    pub mutable: bool,
    pub init: Option<Expr>,
    pub span: Span,
    /// Resolved binding, written by the analyzer
    #[serde(skip)]
    pub variable: OnceCell<Rc<Variable>>,
}

impl GlobalDecl {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        mutable: bool,
        init: Option<Expr>,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            mutable,
            init,
            span,
            variable: OnceCell::new(),
        }
    }
}

/// Function declaration: `FUN name(p: T, ...): R DO ... END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub parameters: Vec<String>,
    pub parameter_type_names: Vec<String>,
    /// Absent return type means the function returns `Nil`
    pub return_type_name: Option<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
    /// Resolved binding, written by the analyzer
    #[serde(skip)]
    pub binding: OnceCell<Rc<Function>>,
}

impl FunctionDecl {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<String>,
        parameter_type_names: Vec<String>,
        return_type_name: Option<String>,
        body: Vec<Stmt>,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            parameter_type_names,
            return_type_name,
            body,
            span,
            binding: OnceCell::new(),
        }
    }
}

/// Statement variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(ExprStmt),
    VarDecl(VarDecl),
    Assign(AssignStmt),
    If(IfStmt),
    Switch(SwitchStmt),
    While(WhileStmt),
    Return(ReturnStmt),
}

impl Stmt {
    /// Source span of this statement
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(s) => s.span,
            Stmt::VarDecl(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Return(s) => s.span,
        }
    }
}

/// Expression statement; only function calls are legal here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// Local declaration: `LET name: Type = expr;`
///
/// Needs a type name, an initializer, or both (never neither). Locals are
/// always mutable regardless of how globals spell their mutability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub type_name: Option<String>,
    pub init: Option<Expr>,
    pub span: Span,
    /// Resolved binding, written by the analyzer
    #[serde(skip)]
    pub variable: OnceCell<Rc<Variable>>,
}

impl VarDecl {
    pub fn new(
        name: impl Into<String>,
        type_name: Option<String>,
        init: Option<Expr>,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            type_name,
            init,
            span,
            variable: OnceCell::new(),
        }
    }
}

/// Assignment: `target = value;` where the target must be an access expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub target: Expr,
    pub value: Expr,
    pub span: Span,
}

/// Conditional: `IF cond DO ... ELSE ... END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Vec<Stmt>,
    pub else_block: Vec<Stmt>,
    pub span: Span,
}

/// Switch: ordered cases with exactly one trailing default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStmt {
    pub cond: Expr,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

/// One `CASE value:` block, or the trailing `DEFAULT` block (no value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub value: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Loop: `WHILE cond DO ... END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `RETURN value;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Expr,
    pub span: Span,
}

/// Expression variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(LiteralExpr),
    Group(GroupExpr),
    Binary(BinaryExpr),
    Access(AccessExpr),
    Call(CallExpr),
    List(ListExpr),
}

impl Expr {
    /// Source span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Group(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Access(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::List(e) => e.span,
        }
    }

    /// Resolved type decoration, if the analyzer has run
    pub fn ty(&self) -> Option<Type> {
        match self {
            Expr::Literal(e) => e.ty.get().copied(),
            Expr::Group(e) => e.ty.get().copied(),
            Expr::Binary(e) => e.ty.get().copied(),
            Expr::Access(e) => e.ty.get().copied(),
            Expr::Call(e) => e.ty.get().copied(),
            Expr::List(e) => e.ty.get().copied(),
        }
    }
}

/// Literal constant carried by a `LiteralExpr`.
///
/// Integers are carried as `i64` so out-of-range source literals stay
/// representable for diagnosis; the analyzer rejects values outside `i32`
/// and the runtime narrows to 32-bit arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Nil,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Character(char),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
    #[serde(skip)]
    pub ty: OnceCell<Type>,
}

impl LiteralExpr {
    pub fn new(value: Literal, span: Span) -> Self {
        Self {
            value,
            span,
            ty: OnceCell::new(),
        }
    }
}

/// Parenthesized expression; the grammar only groups binary expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupExpr {
    pub inner: Box<Expr>,
    pub span: Span,
    #[serde(skip)]
    pub ty: OnceCell<Type>,
}

impl GroupExpr {
    pub fn new(inner: Expr, span: Span) -> Self {
        Self {
            inner: Box::new(inner),
            span,
            ty: OnceCell::new(),
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    And,
    Or,
    Lt,
    Gt,
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Source-level operator token
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
    #[serde(skip)]
    pub ty: OnceCell<Type>,
}

impl BinaryExpr {
    pub fn new(op: BinaryOp, left: Expr, right: Expr, span: Span) -> Self {
        Self {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
            ty: OnceCell::new(),
        }
    }
}

/// Variable access, optionally indexed: `name` or `name[offset]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessExpr {
    pub name: String,
    pub offset: Option<Box<Expr>>,
    pub span: Span,
    #[serde(skip)]
    pub ty: OnceCell<Type>,
    /// Resolved binding, written by the analyzer
    #[serde(skip)]
    pub variable: OnceCell<Rc<Variable>>,
}

impl AccessExpr {
    pub fn new(name: impl Into<String>, offset: Option<Expr>, span: Span) -> Self {
        Self {
            name: name.into(),
            offset: offset.map(Box::new),
            span,
            ty: OnceCell::new(),
            variable: OnceCell::new(),
        }
    }
}

/// Function call: `name(arg, ...)`, resolved by (name, arity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
    #[serde(skip)]
    pub ty: OnceCell<Type>,
    /// Resolved binding, written by the analyzer
    #[serde(skip)]
    pub function: OnceCell<Rc<Function>>,
}

impl CallExpr {
    pub fn new(name: impl Into<String>, args: Vec<Expr>, span: Span) -> Self {
        Self {
            name: name.into(),
            args,
            span,
            ty: OnceCell::new(),
            function: OnceCell::new(),
        }
    }
}

/// List literal: `[e1, e2, ...]`, never empty; the first element fixes
/// the element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
    #[serde(skip)]
    pub ty: OnceCell<Type>,
}

impl ListExpr {
    pub fn new(elements: Vec<Expr>, span: Span) -> Self {
        Self {
            elements,
            span,
            ty: OnceCell::new(),
        }
    }
}
