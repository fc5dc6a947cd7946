//! Type descriptors

use crate::{DeclId, TypeId};
use serde::{Deserialize, Serialize};

/// Shape of a type as known by the front end.
///
/// Descriptors are immutable; identity of a type is its [`TypeId`], not the structural content of
/// the descriptor.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// Built-in type, `name` is the source spelling (`uint64_t`, `u64`, `eosio::name`, etc.)
    Primitive { name: String },
    /// `using`/`typedef` alias declared by [`AliasDecl`](crate::AliasDecl)
    Alias { decl: DeclId },
    /// Composite record declared by [`RecordDecl`](crate::RecordDecl)
    Record { decl: DeclId },
    /// Template instantiation
    Template {
        /// Template name, possibly namespace-qualified (`std::vector`, `Vec`, `eosio::multi_index`)
        name: String,
        /// Template arguments in declaration order
        arguments: Vec<TemplateArgument>,
        /// Instantiated record for user-defined templates
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decl: Option<DeclId>,
    },
    /// Pointer, reference or cv-qualified wrapper, transparent for interface purposes
    Reference { target: TypeId },
}

/// Template argument
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateArgument {
    /// Type argument
    Type(TypeId),
    /// Compile-time constant (array length, encoded table name, etc.)
    Value(u64),
}

impl TemplateArgument {
    /// Type argument, if this is one
    #[inline]
    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            Self::Type(type_id) => Some(*type_id),
            Self::Value(_) => None,
        }
    }

    /// Constant argument, if this is one
    #[inline]
    pub fn as_value(&self) -> Option<u64> {
        match self {
            Self::Type(_) => None,
            Self::Value(value) => Some(*value),
        }
    }
}

/// Unqualified template or type name: `std::vector` becomes `vector`
pub fn unqualified_name(name: &str) -> &str {
    let name = name.trim();
    name.rsplit_once("::").map_or(name, |(_, last)| last)
}
