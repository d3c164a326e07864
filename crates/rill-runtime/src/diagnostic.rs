//! Diagnostic rendering for errors
//!
//! Analysis and runtime failures flow through one coded `Diagnostic`
//! shape, so the surrounding tooling formats both surfaces the same way.
//! Code families: RL1xxx binding, RL2xxx type, RL3xxx mutability, RL4xxx
//! range, RL9xxx environment.

use crate::analyzer::AnalysisError;
use crate::span::Span;
use crate::value::RuntimeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Fatal error; analysis or evaluation stopped here
    Error,
    /// Advisory only
    Warning,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub level: DiagnosticLevel,
    /// Error code (e.g., "RL2001")
    pub code: String,
    /// Main diagnostic message
    pub message: String,
    /// Source span of the offending node
    pub span: Span,
}

impl Diagnostic {
    /// Create an error diagnostic with a code
    pub fn error_with_code(code: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            code: code.into(),
            message: message.into(),
            span,
        }
    }

    /// Render an analysis failure
    pub fn from_analysis_error(err: &AnalysisError) -> Self {
        let code = match err {
            AnalysisError::UndefinedVariable { .. } => "RL1001",
            AnalysisError::UndefinedFunction { .. } => "RL1002",
            AnalysisError::DuplicateDefinition { .. } => "RL1003",
            AnalysisError::UnknownType { .. } => "RL1004",
            AnalysisError::NotAssignable { .. } => "RL2001",
            AnalysisError::InvalidOperands { .. } => "RL2002",
            AnalysisError::ExpressionNotCall { .. } => "RL2003",
            AnalysisError::InvalidAssignmentTarget { .. } => "RL2004",
            AnalysisError::GroupNotBinary { .. } => "RL2005",
            AnalysisError::UntypedDeclaration { .. } => "RL2006",
            AnalysisError::EmptyThenBlock { .. } => "RL2007",
            AnalysisError::MalformedSwitch { .. } => "RL2008",
            AnalysisError::ReturnOutsideFunction { .. } => "RL2009",
            AnalysisError::EmptyList { .. } => "RL2010",
            AnalysisError::IntegerOutOfRange { .. } => "RL4001",
            AnalysisError::DecimalOutOfRange { .. } => "RL4002",
        };
        Self::error_with_code(code, err.to_string(), err.span())
    }

    /// Render a runtime failure
    pub fn from_runtime_error(err: &RuntimeError) -> Self {
        let code = match err {
            RuntimeError::UndefinedVariable { .. } => "RL1001",
            RuntimeError::UndefinedFunction { .. } => "RL1002",
            RuntimeError::DuplicateDefinition { .. } => "RL1003",
            RuntimeError::TypeError { .. } => "RL2002",
            RuntimeError::ImmutableAssignment { .. } => "RL3001",
            RuntimeError::IntegerOutOfRange { .. } => "RL4001",
            RuntimeError::DecimalOutOfRange { .. } => "RL4002",
            RuntimeError::IndexOutOfBounds { .. } => "RL4003",
            RuntimeError::DivisionByZero { .. } => "RL4004",
            RuntimeError::NegativeExponent { .. } => "RL4005",
            RuntimeError::Io { .. } => "RL9001",
        };
        Self::error_with_code(code, err.to_string(), err.span())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} (at {})",
            self.level, self.code, self.message, self.span
        )
    }
}

impl From<&AnalysisError> for Diagnostic {
    fn from(err: &AnalysisError) -> Self {
        Self::from_analysis_error(err)
    }
}

impl From<&RuntimeError> for Diagnostic {
    fn from(err: &RuntimeError) -> Self {
        Self::from_runtime_error(err)
    }
}
