//! Scope chain and name bindings
//!
//! A `Scope` maps names to variable bindings and (name, arity) pairs to
//! function bindings, chained to an optional parent. The analyzer and the
//! interpreter share this structure but never an instance: the analyzer
//! instantiates it with compile-time bindings (`Rc<Variable>`,
//! `Rc<Function>`), the interpreter with live runtime payloads. Definition
//! targets the current scope only (shadowing an outer scope is allowed,
//! redefining within one scope is not); lookup walks outward to the first
//! defining scope.

use crate::types::Type;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A variable binding as the analyzer sees it: declared type and mutability.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
}

/// A function binding: ordered parameter types and return type.
///
/// Functions are distinguished by (name, arity); two functions with the
/// same name and different parameter counts coexist.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
}

/// Shared handle to a scope in the chain.
pub type ScopeRef<V, F> = Rc<RefCell<Scope<V, F>>>;

/// One lexical scope: variables by name, functions by (name, arity),
/// chained to the enclosing scope.
#[derive(Debug)]
pub struct Scope<V, F> {
    parent: Option<ScopeRef<V, F>>,
    variables: HashMap<String, V>,
    functions: HashMap<(String, usize), F>,
}

impl<V: Clone, F: Clone> Scope<V, F> {
    /// Create a chain root (program-level scope)
    pub fn root() -> ScopeRef<V, F> {
        Rc::new(RefCell::new(Scope {
            parent: None,
            variables: HashMap::new(),
            functions: HashMap::new(),
        }))
    }

    /// Create a child scope chained to `parent`
    pub fn child_of(parent: &ScopeRef<V, F>) -> ScopeRef<V, F> {
        Rc::new(RefCell::new(Scope {
            parent: Some(Rc::clone(parent)),
            variables: HashMap::new(),
            functions: HashMap::new(),
        }))
    }

    /// Define a variable in this scope.
    ///
    /// Returns `false` if the name is already defined here; the caller
    /// reports the duplicate with its own span and error type.
    #[must_use]
    pub fn define_variable(&mut self, name: impl Into<String>, binding: V) -> bool {
        let name = name.into();
        if self.variables.contains_key(&name) {
            return false;
        }
        self.variables.insert(name, binding);
        true
    }

    /// Define a function by (name, arity) in this scope.
    #[must_use]
    pub fn define_function(&mut self, name: impl Into<String>, arity: usize, binding: F) -> bool {
        let key = (name.into(), arity);
        if self.functions.contains_key(&key) {
            return false;
        }
        self.functions.insert(key, binding);
        true
    }

    /// Look up a variable, walking outward through the chain.
    pub fn lookup_variable(&self, name: &str) -> Option<V> {
        if let Some(binding) = self.variables.get(name) {
            return Some(binding.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().lookup_variable(name))
    }

    /// Look up a function by name and arity, walking outward through the chain.
    pub fn lookup_function(&self, name: &str, arity: usize) -> Option<F> {
        if let Some(binding) = self.functions.get(&(name.to_string(), arity)) {
            return Some(binding.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().lookup_function(name, arity))
    }
}
