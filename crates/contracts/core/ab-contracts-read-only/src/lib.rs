//! Verification of read-only operations.
//!
//! An operation annotated as read-only must not reach any state-modifying host primitive through
//! direct calls or calls through function values. [`ReadOnlyAnalyzer`] walks the call graph
//! produced by the front end starting from each read-only operation and reports every operation
//! that does, together with the offending call path.

mod analyzer;
mod error;
mod indirect;

pub use crate::analyzer::{DEFAULT_MUTATING_PRIMITIVES, Policy, ReadOnlyAnalyzer, Violation};
pub use crate::error::ReadOnlyError;
pub use crate::indirect::{IndirectCallResolver, LastAssignment};
