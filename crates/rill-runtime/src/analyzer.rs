//! Static analysis: name binding and type checking
//!
//! A single fail-fast pass over the program. On success every expression
//! carries a resolved type and every access/call carries its resolved
//! binding; on the first violation analysis stops with an `AnalysisError`
//! naming the offending node. Globals are analyzed in declaration order,
//! then functions; the program must end up defining `main` with arity 0
//! returning `Integer`.

use crate::ast::*;
use crate::environment::{Function, Scope, ScopeRef, Variable};
use crate::span::Span;
use crate::types::Type;
use std::rc::Rc;
use thiserror::Error;

/// A semantic violation, reported at the first offending node.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// Type name outside the fixed registry
    #[error("Unknown type name: {name}")]
    UnknownType { name: String, span: Span },
    /// Undefined variable
    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },
    /// Undefined function for a given name and arity
    #[error("Undefined function: {name}/{arity}")]
    UndefinedFunction {
        name: String,
        arity: usize,
        span: Span,
    },
    /// Name already defined in the same scope
    #[error("Duplicate definition: {name}")]
    DuplicateDefinition { name: String, span: Span },
    /// Assignability violation
    #[error("Type mismatch: cannot assign {found} to {expected}")]
    NotAssignable {
        expected: Type,
        found: Type,
        span: Span,
    },
    /// Operand types outside an operator's domain
    #[error("Invalid operands for '{op}': {left} and {right}")]
    InvalidOperands {
        op: BinaryOp,
        left: Type,
        right: Type,
        span: Span,
    },
    /// Expression statement whose expression is not a call
    #[error("Expression statement must be a function call")]
    ExpressionNotCall { span: Span },
    /// Assignment whose target is not an access expression
    #[error("Assignment target must be a variable or list element")]
    InvalidAssignmentTarget { span: Span },
    /// Grouping around anything but a binary expression
    #[error("Grouped expression must be a binary expression")]
    GroupNotBinary { span: Span },
    /// Integer literal outside the 32-bit range
    #[error("Integer literal out of range")]
    IntegerOutOfRange { span: Span },
    /// Non-finite decimal literal
    #[error("Decimal literal out of range")]
    DecimalOutOfRange { span: Span },
    /// Declaration with neither a type name nor an initializer
    #[error("Declaration of '{name}' needs a type or an initializer")]
    UntypedDeclaration { name: String, span: Span },
    /// `if` with an empty then block
    #[error("'if' requires a non-empty then block")]
    EmptyThenBlock { span: Span },
    /// Case/default structure violation
    #[error("Malformed switch: {msg}")]
    MalformedSwitch { msg: String, span: Span },
    /// `return` outside any function body
    #[error("'return' outside of a function")]
    ReturnOutsideFunction { span: Span },
    /// Empty list literal
    #[error("List literal must not be empty")]
    EmptyList { span: Span },
}

impl AnalysisError {
    /// Get the source span for this error
    pub fn span(&self) -> Span {
        match self {
            AnalysisError::UnknownType { span, .. } => *span,
            AnalysisError::UndefinedVariable { span, .. } => *span,
            AnalysisError::UndefinedFunction { span, .. } => *span,
            AnalysisError::DuplicateDefinition { span, .. } => *span,
            AnalysisError::NotAssignable { span, .. } => *span,
            AnalysisError::InvalidOperands { span, .. } => *span,
            AnalysisError::ExpressionNotCall { span } => *span,
            AnalysisError::InvalidAssignmentTarget { span } => *span,
            AnalysisError::GroupNotBinary { span } => *span,
            AnalysisError::IntegerOutOfRange { span } => *span,
            AnalysisError::DecimalOutOfRange { span } => *span,
            AnalysisError::UntypedDeclaration { span, .. } => *span,
            AnalysisError::EmptyThenBlock { span } => *span,
            AnalysisError::MalformedSwitch { span, .. } => *span,
            AnalysisError::ReturnOutsideFunction { span } => *span,
            AnalysisError::EmptyList { span } => *span,
        }
    }
}

/// Compile-time scope chain: names to declared variables, (name, arity)
/// pairs to function signatures.
type Bindings = ScopeRef<Rc<Variable>, Rc<Function>>;

/// Analyzer state
pub struct Analyzer {
    /// Active scope; swapped to a child on block entry, restored on exit
    scope: Bindings,
    /// Declared return type of the enclosing function, for `return` checks
    return_type: Option<Type>,
}

impl Analyzer {
    /// Create an analyzer whose program scope knows the built-in
    /// `print(Any) -> Nil`.
    pub fn new() -> Self {
        let scope: Bindings = Scope::root();
        let print = Rc::new(Function {
            name: "print".to_string(),
            parameter_types: vec![Type::Any],
            return_type: Type::Nil,
        });
        let defined = scope.borrow_mut().define_function("print", 1, print);
        debug_assert!(defined);
        Self {
            scope,
            return_type: None,
        }
    }

    /// Analyze a program: globals in order, then functions, then the
    /// `main`/0 contract. Decorates the tree in place on success.
    pub fn analyze(&mut self, program: &Program) -> Result<(), AnalysisError> {
        for global in &program.globals {
            self.analyze_global(global)?;
        }
        for function in &program.functions {
            self.analyze_function(function)?;
        }
        let main = self.lookup_function("main", 0, Span::default())?;
        require_assignable(Type::Integer, main.return_type, Span::default())?;
        Ok(())
    }

    /// Require `found` to be assignable to `expected` at `span`.
    pub fn require_assignable(
        expected: Type,
        found: Type,
        span: Span,
    ) -> Result<(), AnalysisError> {
        require_assignable(expected, found, span)
    }

    fn analyze_global(&mut self, global: &GlobalDecl) -> Result<(), AnalysisError> {
        // Initializer is analyzed before the name becomes visible.
        let init_ty = match &global.init {
            Some(init) => Some((self.analyze_expr(init)?, init.span())),
            None => None,
        };
        let declared = self.resolve_type(&global.type_name, global.span)?;
        let variable = Rc::new(Variable {
            name: global.name.clone(),
            ty: declared,
            mutable: global.mutable,
        });
        self.define_variable(&global.name, Rc::clone(&variable), global.span)?;
        let _ = global.variable.set(variable);
        if let Some((found, span)) = init_ty {
            require_assignable(declared, found, span)?;
        }
        Ok(())
    }

    fn analyze_function(&mut self, function: &FunctionDecl) -> Result<(), AnalysisError> {
        let mut parameter_types = Vec::with_capacity(function.parameter_type_names.len());
        for type_name in &function.parameter_type_names {
            parameter_types.push(self.resolve_type(type_name, function.span)?);
        }
        let return_type = match &function.return_type_name {
            Some(type_name) => self.resolve_type(type_name, function.span)?,
            None => Type::Nil,
        };

        let binding = Rc::new(Function {
            name: function.name.clone(),
            parameter_types: parameter_types.clone(),
            return_type,
        });
        let defined = self.scope.borrow_mut().define_function(
            &function.name,
            function.parameters.len(),
            Rc::clone(&binding),
        );
        if !defined {
            return Err(AnalysisError::DuplicateDefinition {
                name: function.name.clone(),
                span: function.span,
            });
        }
        let _ = function.binding.set(binding);

        self.in_child_scope(|this| {
            for (name, ty) in function.parameters.iter().zip(&parameter_types) {
                let parameter = Rc::new(Variable {
                    name: name.clone(),
                    ty: *ty,
                    mutable: true,
                });
                this.define_variable(name, parameter, function.span)?;
            }
            let enclosing = this.return_type.replace(return_type);
            let result = this.analyze_block(&function.body);
            this.return_type = enclosing;
            result
        })
    }

    fn analyze_block(&mut self, block: &[Stmt]) -> Result<(), AnalysisError> {
        for stmt in block {
            self.analyze_stmt(stmt)?;
        }
        Ok(())
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<(), AnalysisError> {
        match stmt {
            Stmt::Expr(s) => {
                self.analyze_expr(&s.expr)?;
                if !matches!(s.expr, Expr::Call(_)) {
                    return Err(AnalysisError::ExpressionNotCall { span: s.span });
                }
                Ok(())
            }
            Stmt::VarDecl(decl) => self.analyze_var_decl(decl),
            Stmt::Assign(assign) => self.analyze_assign(assign),
            Stmt::If(if_stmt) => self.analyze_if(if_stmt),
            Stmt::Switch(switch) => self.analyze_switch(switch),
            Stmt::While(while_stmt) => {
                let cond_ty = self.analyze_expr(&while_stmt.cond)?;
                require_assignable(Type::Boolean, cond_ty, while_stmt.cond.span())?;
                self.in_child_scope(|this| this.analyze_block(&while_stmt.body))
            }
            Stmt::Return(ret) => {
                let Some(expected) = self.return_type else {
                    return Err(AnalysisError::ReturnOutsideFunction { span: ret.span });
                };
                let found = self.analyze_expr(&ret.value)?;
                require_assignable(expected, found, ret.value.span())
            }
        }
    }

    fn analyze_var_decl(&mut self, decl: &VarDecl) -> Result<(), AnalysisError> {
        let init_ty = match &decl.init {
            Some(init) => Some((self.analyze_expr(init)?, init.span())),
            None => None,
        };
        let declared = match &decl.type_name {
            Some(type_name) => self.resolve_type(type_name, decl.span)?,
            None => match init_ty {
                Some((ty, _)) => ty,
                None => {
                    return Err(AnalysisError::UntypedDeclaration {
                        name: decl.name.clone(),
                        span: decl.span,
                    })
                }
            },
        };
        // Locals are always mutable, whatever the declared type says about
        // globals of the same shape.
        let variable = Rc::new(Variable {
            name: decl.name.clone(),
            ty: declared,
            mutable: true,
        });
        self.define_variable(&decl.name, Rc::clone(&variable), decl.span)?;
        let _ = decl.variable.set(variable);
        if let Some((found, span)) = init_ty {
            require_assignable(declared, found, span)?;
        }
        Ok(())
    }

    fn analyze_assign(&mut self, assign: &AssignStmt) -> Result<(), AnalysisError> {
        let target_ty = self.analyze_expr(&assign.target)?;
        if !matches!(assign.target, Expr::Access(_)) {
            return Err(AnalysisError::InvalidAssignmentTarget { span: assign.span });
        }
        let value_ty = self.analyze_expr(&assign.value)?;
        require_assignable(target_ty, value_ty, assign.value.span())
    }

    fn analyze_if(&mut self, if_stmt: &IfStmt) -> Result<(), AnalysisError> {
        let cond_ty = self.analyze_expr(&if_stmt.cond)?;
        require_assignable(Type::Boolean, cond_ty, if_stmt.cond.span())?;
        if if_stmt.then_block.is_empty() {
            return Err(AnalysisError::EmptyThenBlock { span: if_stmt.span });
        }
        self.in_child_scope(|this| this.analyze_block(&if_stmt.then_block))?;
        self.in_child_scope(|this| this.analyze_block(&if_stmt.else_block))
    }

    fn analyze_switch(&mut self, switch: &SwitchStmt) -> Result<(), AnalysisError> {
        let cond_ty = self.analyze_expr(&switch.cond)?;
        let Some((default, labeled)) = switch.cases.split_last() else {
            return Err(AnalysisError::MalformedSwitch {
                msg: "switch needs a trailing default case".to_string(),
                span: switch.span,
            });
        };
        for case in labeled {
            let Some(value) = &case.value else {
                return Err(AnalysisError::MalformedSwitch {
                    msg: "only the last case may omit a value".to_string(),
                    span: case.span,
                });
            };
            let value_ty = self.analyze_expr(value)?;
            require_assignable(cond_ty, value_ty, value.span())?;
            self.in_child_scope(|this| this.analyze_block(&case.body))?;
        }
        if default.value.is_some() {
            return Err(AnalysisError::MalformedSwitch {
                msg: "default case must not carry a value".to_string(),
                span: default.span,
            });
        }
        self.in_child_scope(|this| this.analyze_block(&default.body))
    }

    fn analyze_expr(&mut self, expr: &Expr) -> Result<Type, AnalysisError> {
        match expr {
            Expr::Literal(lit) => {
                let ty = type_of_literal(lit)?;
                let _ = lit.ty.set(ty);
                Ok(ty)
            }
            Expr::Group(group) => {
                let inner_ty = self.analyze_expr(&group.inner)?;
                let _ = group.ty.set(inner_ty);
                if !matches!(*group.inner, Expr::Binary(_)) {
                    return Err(AnalysisError::GroupNotBinary { span: group.span });
                }
                Ok(inner_ty)
            }
            Expr::Binary(binary) => {
                let ty = self.analyze_binary(binary)?;
                let _ = binary.ty.set(ty);
                Ok(ty)
            }
            Expr::Access(access) => {
                let ty = self.analyze_access(access)?;
                let _ = access.ty.set(ty);
                Ok(ty)
            }
            Expr::Call(call) => {
                let ty = self.analyze_call(call)?;
                let _ = call.ty.set(ty);
                Ok(ty)
            }
            Expr::List(list) => {
                let ty = self.analyze_list(list)?;
                let _ = list.ty.set(ty);
                Ok(ty)
            }
        }
    }

    fn analyze_binary(&mut self, binary: &BinaryExpr) -> Result<Type, AnalysisError> {
        let left = self.analyze_expr(&binary.left)?;
        let right = self.analyze_expr(&binary.right)?;
        let mismatch = || AnalysisError::InvalidOperands {
            op: binary.op,
            left,
            right,
            span: binary.span,
        };
        match binary.op {
            BinaryOp::And | BinaryOp::Or => {
                require_assignable(Type::Boolean, left, binary.left.span())?;
                require_assignable(Type::Boolean, right, binary.right.span())?;
                Ok(Type::Boolean)
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Eq | BinaryOp::Ne => {
                if left != right {
                    return Err(mismatch());
                }
                require_assignable(Type::Comparable, left, binary.left.span())?;
                Ok(Type::Boolean)
            }
            BinaryOp::Add => {
                if left == Type::String || right == Type::String {
                    Ok(Type::String)
                } else if left == right && matches!(left, Type::Integer | Type::Decimal) {
                    Ok(left)
                } else {
                    Err(mismatch())
                }
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                if left == right && matches!(left, Type::Integer | Type::Decimal) {
                    Ok(left)
                } else {
                    Err(mismatch())
                }
            }
            BinaryOp::Pow => {
                require_assignable(Type::Integer, right, binary.right.span())?;
                if matches!(left, Type::Integer | Type::Decimal) {
                    Ok(left)
                } else {
                    Err(mismatch())
                }
            }
        }
    }

    fn analyze_access(&mut self, access: &AccessExpr) -> Result<Type, AnalysisError> {
        let variable = self
            .scope
            .borrow()
            .lookup_variable(&access.name)
            .ok_or_else(|| AnalysisError::UndefinedVariable {
                name: access.name.clone(),
                span: access.span,
            })?;
        if let Some(offset) = &access.offset {
            let offset_ty = self.analyze_expr(offset)?;
            require_assignable(Type::Integer, offset_ty, offset.span())?;
        }
        // A list variable's declared type is its element type, so the
        // access types the same with or without an index.
        let ty = variable.ty;
        let _ = access.variable.set(variable);
        Ok(ty)
    }

    fn analyze_call(&mut self, call: &CallExpr) -> Result<Type, AnalysisError> {
        let function = self.lookup_function(&call.name, call.args.len(), call.span)?;
        for (arg, expected) in call.args.iter().zip(&function.parameter_types) {
            let found = self.analyze_expr(arg)?;
            require_assignable(*expected, found, arg.span())?;
        }
        let ty = function.return_type;
        let _ = call.function.set(function);
        Ok(ty)
    }

    fn analyze_list(&mut self, list: &ListExpr) -> Result<Type, AnalysisError> {
        let mut element_types = Vec::with_capacity(list.elements.len());
        for element in &list.elements {
            element_types.push((self.analyze_expr(element)?, element.span()));
        }
        let Some(((element_ty, _), _)) = element_types.split_first() else {
            return Err(AnalysisError::EmptyList { span: list.span });
        };
        let element_ty = *element_ty;
        for (found, span) in element_types {
            require_assignable(element_ty, found, span)?;
        }
        Ok(element_ty)
    }

    fn resolve_type(&self, name: &str, span: Span) -> Result<Type, AnalysisError> {
        Type::from_name(name).ok_or_else(|| AnalysisError::UnknownType {
            name: name.to_string(),
            span,
        })
    }

    fn define_variable(
        &mut self,
        name: &str,
        binding: Rc<Variable>,
        span: Span,
    ) -> Result<(), AnalysisError> {
        if !self.scope.borrow_mut().define_variable(name, binding) {
            return Err(AnalysisError::DuplicateDefinition {
                name: name.to_string(),
                span,
            });
        }
        Ok(())
    }

    fn lookup_function(
        &self,
        name: &str,
        arity: usize,
        span: Span,
    ) -> Result<Rc<Function>, AnalysisError> {
        self.scope
            .borrow()
            .lookup_function(name, arity)
            .ok_or_else(|| AnalysisError::UndefinedFunction {
                name: name.to_string(),
                arity,
                span,
            })
    }

    /// Run `f` in a fresh child scope; the parent is restored on every
    /// exit path, error included.
    fn in_child_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, AnalysisError>,
    ) -> Result<T, AnalysisError> {
        let parent = Rc::clone(&self.scope);
        self.scope = Scope::child_of(&parent);
        let result = f(self);
        self.scope = parent;
        result
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn type_of_literal(lit: &LiteralExpr) -> Result<Type, AnalysisError> {
    match &lit.value {
        Literal::Nil => Ok(Type::Nil),
        Literal::Boolean(_) => Ok(Type::Boolean),
        Literal::Integer(value) => {
            if i32::try_from(*value).is_ok() {
                Ok(Type::Integer)
            } else {
                Err(AnalysisError::IntegerOutOfRange { span: lit.span })
            }
        }
        Literal::Decimal(value) => {
            if value.is_finite() {
                Ok(Type::Decimal)
            } else {
                Err(AnalysisError::DecimalOutOfRange { span: lit.span })
            }
        }
        Literal::Character(_) => Ok(Type::Character),
        Literal::String(_) => Ok(Type::String),
    }
}

fn require_assignable(expected: Type, found: Type, span: Span) -> Result<(), AnalysisError> {
    if found.is_assignable_to(&expected) {
        Ok(())
    } else {
        Err(AnalysisError::NotAssignable {
            expected,
            found,
            span,
        })
    }
}
