//! Declarations: records, methods and aliases

use crate::{DeclId, SourceLocation, TypeId};
use serde::{Deserialize, Serialize};

/// Interface annotations attached to a declaration.
///
/// Each annotation that accepts a name is stored as `Some(name)`, an annotation written without an
/// explicit name is `Some("")` and means "use the source identifier".
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Tags {
    /// Contract annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    /// Action annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Synchronous call annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call: Option<String>,
    /// Table annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Notification handler annotation, `code::action` where code may be `*`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<String>,
    /// Read-only annotation
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl Tags {
    /// Whether any of the annotations that make a method externally callable is present
    pub fn has_role(&self) -> bool {
        self.action.is_some() || self.call.is_some() || self.notify.is_some()
    }

    /// Whether declaration carries no annotations at all
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Data member of a record
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub location: SourceLocation,
}

/// Composite record (class/struct)
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordDecl {
    /// Unqualified name
    pub name: String,
    /// Fully qualified source path, used by generated code to refer to the record
    pub qualified_name: String,
    #[serde(default)]
    pub location: SourceLocation,
    /// Enclosing record, if nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<DeclId>,
    /// Direct base classes
    #[serde(default)]
    pub bases: Vec<TypeId>,
    /// Data members in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    /// Member declarations (methods, nested records, member aliases) in declaration order
    #[serde(default)]
    pub members: Vec<DeclId>,
    #[serde(default)]
    pub tags: Tags,
}

/// Parameter of a method
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeId,
    /// Fully qualified source spelling of the parameter type with references removed
    pub spelling: String,
}

/// Additional declaration of a method, for instance out-of-class definition
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Redeclaration {
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub tags: Tags,
}

/// Member function
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    /// Record this method belongs to
    pub parent: DeclId,
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    /// Return type, `None` for `void`/`()`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TypeId>,
    /// Annotations of the canonical declaration
    #[serde(default)]
    pub tags: Tags,
    /// Other declarations of the same method
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redeclarations: Vec<Redeclaration>,
}

/// `using`/`typedef` alias
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AliasDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<DeclId>,
    /// Aliased type
    pub target: TypeId,
    #[serde(default)]
    pub location: SourceLocation,
}

/// Any declaration known to the graph
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Record(RecordDecl),
    Method(MethodDecl),
    Alias(AliasDecl),
}

impl Declaration {
    /// Unqualified name of the declaration
    pub fn name(&self) -> &str {
        match self {
            Self::Record(record) => &record.name,
            Self::Method(method) => &method.name,
            Self::Alias(alias) => &alias.name,
        }
    }

    /// Location of the declaration
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::Record(record) => &record.location,
            Self::Method(method) => &method.location,
            Self::Alias(alias) => &alias.location,
        }
    }
}
