//! Type system representation
//!
//! The fixed Rill type lattice. Assignability is a partial order, not
//! equality: everything flows into `Any`, the five primitive value types
//! flow into `Comparable`, and nothing else is compatible.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// The type of `nil` and of functions without a declared return type
    Nil,
    /// Top type: every type is assignable to `Any`
    Any,
    /// Supertype of the five orderable primitives
    Comparable,
    /// Boolean type
    Boolean,
    /// 32-bit integer type
    Integer,
    /// Double-precision decimal type
    Decimal,
    /// Character type
    Character,
    /// String type
    String,
}

impl Type {
    /// Resolve a source-level type name against the registry.
    ///
    /// Returns `None` for names outside the fixed set; the analyzer turns
    /// that into an unknown-type error at the declaration site.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "Nil" => Some(Type::Nil),
            "Any" => Some(Type::Any),
            "Comparable" => Some(Type::Comparable),
            "Boolean" => Some(Type::Boolean),
            "Integer" => Some(Type::Integer),
            "Decimal" => Some(Type::Decimal),
            "Character" => Some(Type::Character),
            "String" => Some(Type::String),
            _ => None,
        }
    }

    /// Check if a value of this type may be used where `target` is expected
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        if target == &Type::Any {
            return true;
        }
        if self == target {
            return true;
        }
        if target == &Type::Comparable {
            return matches!(
                self,
                Type::Boolean | Type::Integer | Type::Decimal | Type::Character | Type::String
            );
        }
        false
    }

    /// Get the source-level name for this type
    pub fn display_name(&self) -> &'static str {
        match self {
            Type::Nil => "Nil",
            Type::Any => "Any",
            Type::Comparable => "Comparable",
            Type::Boolean => "Boolean",
            Type::Integer => "Integer",
            Type::Decimal => "Decimal",
            Type::Character => "Character",
            Type::String => "String",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
