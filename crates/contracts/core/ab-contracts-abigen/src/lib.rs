//! ABI generation for annotated contracts.
//!
//! Generation happens in three stages:
//! * [`Collector`] walks the declaration graph of a contract, validates annotations and discovers
//!   operations and table bindings
//! * [`TypeResolver`] maps every source type used by the interface to its ABI name, registering
//!   structs, aliases and variants it needs along the way
//! * [`assemble()`] prunes everything not reachable from the interface and produces
//!   [`AbiDocument`] ready for serialization
//!
//! ```ignore
//! let collected = Collector::new(&declarations, CollectorOptions::new("token")).collect()?;
//! let abi = assemble(&collected.schema)?.to_json_pretty()?;
//! ```

pub mod collector;
pub mod document;
pub mod error;
pub mod name;
pub mod operation;
pub mod resolver;
pub mod schema;

pub use crate::collector::{Collected, Collector, CollectorOptions, RicardianInputs};
pub use crate::document::{AbiDocument, assemble};
pub use crate::error::{AbigenError, DeclarationError, ResolveError};
pub use crate::name::NameError;
pub use crate::operation::{Operation, OperationParameter, OperationRole, TableBinding};
pub use crate::resolver::TypeResolver;
pub use crate::schema::{AbiVersion, Schema};

/// Collect contract `options.contract` from `graph` and assemble its ABI document
pub fn generate<G>(
    graph: &G,
    options: CollectorOptions,
) -> Result<(Collected, AbiDocument), AbigenError>
where
    G: ab_contracts_declarations::DeclarationGraph,
{
    let collected = Collector::new(graph, options).collect()?;
    let document = assemble(&collected.schema)?;
    Ok((collected, document))
}
