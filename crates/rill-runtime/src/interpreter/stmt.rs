//! Statement execution
//!
//! Each executor returns a `ControlFlow` signal. `ControlFlow::Return`
//! short-circuits every enclosing block up to the function invocation
//! that catches it; no statement after the return runs at any level.

use crate::ast::*;
use crate::interpreter::{ControlFlow, Interpreter};
use crate::value::{RuntimeError, Value};

impl Interpreter {
    /// Execute a statement
    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::Expr(expr_stmt) => {
                self.eval_expr(&expr_stmt.expr)?;
                Ok(ControlFlow::None)
            }
            Stmt::VarDecl(decl) => self.exec_var_decl(decl),
            Stmt::Assign(assign) => self.exec_assign(assign),
            Stmt::If(if_stmt) => self.exec_if(if_stmt),
            Stmt::Switch(switch) => self.exec_switch(switch),
            Stmt::While(while_stmt) => self.exec_while(while_stmt),
            Stmt::Return(ret) => Ok(ControlFlow::Return(self.eval_expr(&ret.value)?)),
        }
    }

    /// Execute a block of statements in a fresh child scope
    fn exec_block(&mut self, block: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        self.in_child_scope(|this| {
            for stmt in block {
                let flow = this.exec_stmt(stmt)?;
                if flow != ControlFlow::None {
                    return Ok(flow);
                }
            }
            Ok(ControlFlow::None)
        })
    }

    fn exec_var_decl(&mut self, decl: &VarDecl) -> Result<ControlFlow, RuntimeError> {
        let value = match &decl.init {
            Some(init) => self.eval_expr(init)?,
            None => Value::Nil,
        };
        // Locals are always mutable.
        self.define_variable(&decl.name, true, value, decl.span)?;
        Ok(ControlFlow::None)
    }

    fn exec_assign(&mut self, assign: &AssignStmt) -> Result<ControlFlow, RuntimeError> {
        let Expr::Access(access) = &assign.target else {
            return Err(RuntimeError::TypeError {
                msg: "assignment target must be a variable or list element".to_string(),
                span: assign.span,
            });
        };
        let binding = self.lookup_variable(&access.name, access.span)?;
        if !binding.mutable {
            return Err(RuntimeError::ImmutableAssignment {
                name: access.name.clone(),
                span: assign.span,
            });
        }
        match &access.offset {
            Some(offset) => {
                let index = self.eval_index(offset)?;
                let value = self.eval_expr(&assign.value)?;
                let mut cell = binding.value.borrow_mut();
                match &mut *cell {
                    Value::List(items) => {
                        let slot = list_slot(index, items.len(), offset.span())?;
                        items[slot] = value;
                    }
                    other => {
                        return Err(RuntimeError::TypeError {
                            msg: format!(
                                "only lists can be indexed, found {}",
                                other.type_name()
                            ),
                            span: access.span,
                        })
                    }
                }
            }
            None => {
                let value = self.eval_expr(&assign.value)?;
                *binding.value.borrow_mut() = value;
            }
        }
        Ok(ControlFlow::None)
    }

    fn exec_if(&mut self, if_stmt: &IfStmt) -> Result<ControlFlow, RuntimeError> {
        if self.eval_bool(&if_stmt.cond)? {
            self.exec_block(&if_stmt.then_block)
        } else {
            self.exec_block(&if_stmt.else_block)
        }
    }

    fn exec_switch(&mut self, switch: &SwitchStmt) -> Result<ControlFlow, RuntimeError> {
        let subject = self.eval_expr(&switch.cond)?;
        let Some((default, labeled)) = switch.cases.split_last() else {
            return Ok(ControlFlow::None);
        };
        for case in labeled {
            let Some(match_expr) = &case.value else {
                return Err(RuntimeError::TypeError {
                    msg: "switch case before the default must carry a value".to_string(),
                    span: case.span,
                });
            };
            if subject == self.eval_expr(match_expr)? {
                return self.exec_block(&case.body);
            }
        }
        self.exec_block(&default.body)
    }

    fn exec_while(&mut self, while_stmt: &WhileStmt) -> Result<ControlFlow, RuntimeError> {
        while self.eval_bool(&while_stmt.cond)? {
            let flow = self.exec_block(&while_stmt.body)?;
            if flow != ControlFlow::None {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::None)
    }
}

/// Check an index against `[0, len)` and convert it to a slot.
pub(super) fn list_slot(
    index: i32,
    len: usize,
    span: crate::span::Span,
) -> Result<usize, RuntimeError> {
    if index >= 0 && (index as usize) < len {
        Ok(index as usize)
    } else {
        Err(RuntimeError::IndexOutOfBounds { index, len, span })
    }
}
