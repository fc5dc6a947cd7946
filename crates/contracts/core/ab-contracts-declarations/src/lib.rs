//! Read-only declaration graph of an annotated contract.
//!
//! The graph is produced by a compiler front end and consumed by interface tooling (ABI generator,
//! dispatch code generator and read-only analyzer). Tooling never mutates it, all access goes
//! through [`DeclarationGraph`], which makes the rest of the toolchain independent of a particular
//! front end. [`Declarations`] is an in-memory implementation that can be deserialized from JSON
//! or assembled with [`DeclarationsBuilder`].

pub mod builder;
pub mod call_graph;
pub mod decls;
pub mod graph;
pub mod types;

pub use crate::builder::DeclarationsBuilder;
pub use crate::call_graph::{Binding, CallGraph, FunctionBody, Initializer, Statement};
pub use crate::decls::{
    AliasDecl, Declaration, FieldDecl, MethodDecl, ParameterDecl, RecordDecl, Redeclaration, Tags,
};
pub use crate::graph::{DeclarationGraph, Declarations};
pub use crate::types::{TemplateArgument, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a type known to the front end.
///
/// Two handles compare equal if and only if they denote the same type, which is what makes them
/// usable as keys of visited-sets during type resolution.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Identity of a declaration (record, method or alias)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

/// Location of a declaration in the source program
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path as reported by the front end
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            return f.write_str("<unknown>");
        }
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl SourceLocation {
    /// Create new source location
    pub fn new<F>(file: F, line: u32, column: u32) -> Self
    where
        F: Into<String>,
    {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}
