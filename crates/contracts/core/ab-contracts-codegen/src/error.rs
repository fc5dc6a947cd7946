//! Errors of dispatcher generation

/// Dispatcher generation error
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// Runtime path is not a valid Rust path
    #[error("Invalid runtime path `{path}`: {source}")]
    InvalidRuntimePath { path: String, source: syn::Error },
    /// Generated symbol or method name is not a valid Rust identifier
    #[error("`{identifier}` of `{operation}` is not a valid identifier")]
    InvalidIdentifier {
        identifier: String,
        operation: String,
    },
    /// Parameter type or class path can't be parsed as a Rust type
    #[error("Type `{spelling}` of `{operation}` is not a valid Rust type: {source}")]
    InvalidTypeSpelling {
        spelling: String,
        operation: String,
        source: syn::Error,
    },
    /// Two different operations map to the same exported symbol
    #[error("Symbol `{symbol}` of `{operation}` is already exported by `{existing}`")]
    DuplicateSymbol {
        symbol: String,
        operation: String,
        existing: String,
    },
    /// Generated code doesn't parse
    #[error("Generated code is not valid Rust: {0}")]
    Syntax(#[from] syn::Error),
}
