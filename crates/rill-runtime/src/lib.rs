//! Rill Runtime - semantic core of the Rill language
//!
//! This library provides the two consumers of a parsed Rill program tree:
//! - Static analysis: type checking and name binding with in-place
//!   decoration of the AST
//! - Interpretation: tree-walking evaluation against a runtime
//!   environment
//!
//! Scanning, parsing, and code generation are external collaborators; the
//! AST defined here (JSON-interchangeable via [`ast::VersionedProgram`])
//! is the only input format. The two passes are independent: the
//! interpreter runs undecorated trees, so a program that fails analysis
//! can still be executed to exercise the runtime error surface.

/// Rill runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod analyzer;
pub mod ast;
pub mod diagnostic;
pub mod environment;
pub mod interpreter;
pub mod span;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use analyzer::{AnalysisError, Analyzer};
pub use ast::{Program, VersionedProgram, AST_VERSION};
pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use environment::{Function, Scope, ScopeRef, Variable};
pub use interpreter::Interpreter;
pub use span::Span;
pub use types::Type;
pub use value::{RuntimeError, Value};
