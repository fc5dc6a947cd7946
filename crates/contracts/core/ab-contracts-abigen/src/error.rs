//! Errors of ABI generation

use crate::name::NameError;
use crate::operation::OperationRole;
use ab_contracts_declarations::{DeclId, SourceLocation, TypeId};

/// Type resolution error
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// Type is not known to the declaration graph
    #[error("Unknown type {type_id}")]
    UnknownType { type_id: TypeId },
    /// Declaration is not known to the declaration graph or has unexpected kind
    #[error("Unknown declaration {decl_id}")]
    UnknownDeclaration { decl_id: DeclId },
    /// Type shape can't be expressed in the ABI
    #[error("Type `{type_name}` is not supported")]
    UnsupportedType { type_name: String },
    /// Template instantiation is missing an argument
    #[error("Template `{template}` is missing argument #{index}")]
    MissingTemplateArgument { template: String, index: usize },
    /// Type reaches itself through references, aliases or container arguments alone
    #[error("Type `{type_name}` is defined in terms of itself")]
    CyclicType { type_name: String },
    /// Two distinct types map to the same ABI name
    #[error("ABI name `{name}` is claimed by both `{existing}` and `{new}`")]
    NameCollision {
        name: String,
        existing: String,
        new: String,
    },
}

/// Invalid contract declarations
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum DeclarationError {
    /// No class is tagged as the requested contract and derives from the base contract
    #[error("Contract class `{contract}` not found")]
    ContractNotFound { contract: String },
    /// External name doesn't pass naming convention validation
    #[error("Invalid {what} name `{name}` of `{declaration}` at {location}: {source}")]
    InvalidName {
        what: &'static str,
        name: String,
        declaration: String,
        location: SourceLocation,
        source: NameError,
    },
    /// Notification handler target is not `code::action`
    #[error("Invalid notification target `{target}` of `{declaration}` at {location}")]
    InvalidNotifyTarget {
        target: String,
        declaration: String,
        location: SourceLocation,
    },
    /// Annotations of a declaration contradict each other
    #[error("Conflicting annotations on `{declaration}` at {location}: {reason}")]
    ConflictingTags {
        declaration: String,
        location: SourceLocation,
        reason: &'static str,
    },
    /// The same external name is implemented by different methods or signatures
    #[error(
        "{role} `{name}` of `{declaration}` at {location} was already declared by `{previous}` at \
        {previous_location} with a different signature"
    )]
    DuplicateOperation {
        role: OperationRole,
        name: String,
        declaration: String,
        location: SourceLocation,
        previous: String,
        previous_location: SourceLocation,
    },
    /// Two call names hash to the same function selector
    #[error("Call `{name}` at {location} has the same selector {id:#x} as call `{other}`")]
    CallIdConflict {
        name: String,
        other: String,
        id: u64,
        location: SourceLocation,
    },
    /// Two different tables use the same name
    #[error("Table `{name}` of `{declaration}` at {location} is already bound to `{existing}`")]
    DuplicateTable {
        name: String,
        declaration: String,
        location: SourceLocation,
        existing: String,
    },
    /// Index binding stores a record that belongs to a different contract
    #[error(
        "Record `{record}` at {location} belongs to contract `{owner}`, but is bound as a table \
        of contract `{contract}`"
    )]
    ForeignRecord {
        record: String,
        owner: String,
        contract: String,
        location: SourceLocation,
    },
    /// Index binding template doesn't have the expected name and record arguments
    #[error(
        "Malformed index binding `{binding}` at {location}, expected name constant and record \
        arguments"
    )]
    MalformedIndexBinding {
        binding: String,
        location: SourceLocation,
    },
}

/// ABI generation error
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum AbigenError {
    /// Invalid declaration
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    /// Failed to resolve a type used by a declaration
    #[error("Failed to resolve types of `{declaration}` at {location}: {source}")]
    Resolution {
        declaration: String,
        location: SourceLocation,
        source: ResolveError,
    },
    /// Type is referenced by the document, but never registered
    #[error("Type `{type_name}` referenced by `{referenced_by}` is not defined")]
    DanglingType {
        type_name: String,
        referenced_by: String,
    },
}
