//! Externally callable operations and table bindings discovered in a contract

use ab_contracts_declarations::{DeclId, SourceLocation, TypeId};
use std::fmt;

/// How an operation is invoked by the host
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum OperationRole {
    /// Transactional entry point
    Action,
    /// Synchronous call returning a value to the caller
    Call,
    /// Handler of another contract's action notification
    Notify,
}

impl fmt::Display for OperationRole {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Action => "Action",
            Self::Call => "Call",
            Self::Notify => "Notification handler",
        })
    }
}

impl OperationRole {
    /// Tag used in generated symbol names
    #[inline]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Call => "call",
            Self::Notify => "notify",
        }
    }
}

/// Parameter of an operation
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OperationParameter {
    pub name: String,
    pub ty: TypeId,
    /// Source spelling of the parameter type
    pub spelling: String,
    /// Resolved ABI type name
    pub type_name: String,
}

/// Operation implemented by a contract method
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Operation {
    pub role: OperationRole,
    /// External name: action name, call name or `code::action` notification target
    pub name: String,
    pub method: DeclId,
    pub method_name: String,
    /// Declaring class
    pub class: DeclId,
    /// Unqualified name of the declaring class
    pub class_name: String,
    /// Fully qualified source path of the declaring class
    pub class_path: String,
    /// Parameters in declaration order
    pub parameters: Vec<OperationParameter>,
    /// Resolved result type name, `None` for void
    pub result: Option<String>,
    pub read_only: bool,
    /// Whether the declaring class derives from the base contract and thus supports execution
    /// kind marker
    pub derives_base_contract: bool,
    pub location: SourceLocation,
}

impl Operation {
    /// Identity used for deduplication of dispatchers
    #[inline]
    pub fn key(&self) -> (OperationRole, DeclId, &str) {
        (self.role, self.class, &self.method_name)
    }

    /// Fully qualified function name as used in the call graph
    pub fn function(&self) -> String {
        format!("{}::{}", self.class_path, self.method_name)
    }
}

/// Association between an index structure and the record it stores
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TableBinding {
    /// Table name decoded from the index's name constant
    pub name: String,
    pub record: DeclId,
    /// Record type name
    pub type_name: String,
    /// Unqualified name of the index template (`multi_index`, `singleton`, ...)
    pub index: String,
    pub location: SourceLocation,
}
