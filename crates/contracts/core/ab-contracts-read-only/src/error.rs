use crate::analyzer::Violation;

/// Read-only verification error
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ReadOnlyError {
    /// Read-only operation reaches a state-modifying primitive
    #[error("{violation}")]
    MutatingCall {
        /// First violation found
        violation: Violation,
        /// Total number of violations
        total: usize,
    },
}
