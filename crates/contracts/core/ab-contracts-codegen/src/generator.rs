
use crate::error::CodegenError;
use crate::trampoline;
use ab_contracts_abigen::{Operation, OperationRole};
use ab_contracts_declarations::DeclId;
use proc_macro2::TokenStream;
use std::collections::HashMap;
use syn::{Ident, Path};
use tracing::debug;

/// Header of every generated compilation unit
pub const GENERATED_HEADER: &str =
    "// This file was generated by cargo-ab-contract. DO NOT EDIT\n\n";

/// Options of [`DispatchGenerator`]
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Path of the runtime module providing serialization and host functions
    pub runtime_path: String,
    /// Payloads smaller than this are read into a stack buffer, larger ones into a heap buffer
    pub stack_buffer_limit: usize,
    /// Mark generated symbols as weak so that multiple compilation units can carry them
    pub weak_linkage: bool,
}

impl Default for CodegenOptions {
    #[inline]
    fn default() -> Self {
        Self {
            runtime_path: "::ab_contract_sdk::__private".to_string(),
            stack_buffer_limit: 512,
            weak_linkage: true,
        }
    }
}

/// Generated trampoline of a single operation
#[derive(Debug, Clone)]
pub struct GeneratedDispatcher {
    pub role: OperationRole,
    /// Exported symbol name
    pub symbol: String,
    /// Export record `<external name>:<symbol>`
    pub export: String,
    pub tokens: TokenStream,
}

/// Generator of dispatch trampolines.
///
/// Each operation is emitted at most once no matter how many times it was discovered.
#[derive(Debug)]
pub struct DispatchGenerator {
    options: CodegenOptions,
    runtime: Path,
    dispatchers: Vec<GeneratedDispatcher>,
    emitted: HashMap<(OperationRole, DeclId, String), usize>,
    /// Symbol -> function that exports it
    symbols: HashMap<String, String>,
}

impl DispatchGenerator {
    /// Create new generator
    pub fn new(options: CodegenOptions) -> Result<Self, CodegenError> {
        let runtime = syn::parse_str::<Path>(&options.runtime_path).map_err(|source| {
            CodegenError::InvalidRuntimePath {
                path: options.runtime_path.clone(),
                source,
            }
        })?;

        Ok(Self {
            options,
            runtime,
            dispatchers: Vec::new(),
            emitted: HashMap::new(),
            symbols: HashMap::new(),
        })
    }

    /// Dispatchers generated so far, in generation order
    pub fn dispatchers(&self) -> &[GeneratedDispatcher] {
        &self.dispatchers
    }

    /// Generate dispatcher for `operation`, returns `None` if it was already generated
    pub fn generate(
        &mut self,
        operation: &Operation,
    ) -> Result<Option<&GeneratedDispatcher>, CodegenError> {
        let (role, class, method_name) = operation.key();
        let key = (role, class, method_name.to_string());
        if self.emitted.contains_key(&key) {
            debug!(
                function = %operation.function(),
                %role,
                "Dispatcher already generated, skipping"
            );
            return Ok(None);
        }

        let function = operation.function();
        let symbol_name = format!(
            "__eosio_{}_{}_{}",
            role.tag(),
            operation.method_name,
            operation.class_name
        );
        let symbol = syn::parse_str::<Ident>(&symbol_name).map_err(|_error| {
            CodegenError::InvalidIdentifier {
                identifier: symbol_name.clone(),
                operation: function.clone(),
            }
        })?;
        if let Some(existing) = self.symbols.get(&symbol_name) {
            return Err(CodegenError::DuplicateSymbol {
                symbol: symbol_name,
                operation: function,
                existing: existing.clone(),
            });
        }

        let export = format!("{}:{symbol_name}", operation.name);
        let tokens =
            trampoline::dispatcher(&self.runtime, &self.options, operation, &symbol, &export)?;

        debug!(%function, %role, symbol = %symbol_name, "Generated dispatcher");
        self.symbols.insert(symbol_name.clone(), function);
        self.emitted.insert(key, self.dispatchers.len());
        self.dispatchers.push(GeneratedDispatcher {
            role,
            symbol: symbol_name,
            export,
            tokens,
        });

        Ok(self.dispatchers.last())
    }

    /// Produce formatted compilation unit with all dispatchers, shared helpers and optionally
    /// embedded ABI document
    pub fn finish(self, abi: Option<&str>) -> Result<String, CodegenError> {
        let mut tokens = TokenStream::new();

        if self
            .dispatchers
            .iter()
            .any(|dispatcher| dispatcher.role == OperationRole::Call)
        {
            tokens.extend(trampoline::call_helpers(&self.runtime, &self.options));
        }
        for dispatcher in self.dispatchers {
            tokens.extend(dispatcher.tokens);
        }
        if let Some(abi) = abi {
            tokens.extend(trampoline::abi_embedding(&self.runtime, &self.options, abi));
        }

        let file = syn::parse2::<syn::File>(tokens)?;

        Ok(format!("{GENERATED_HEADER}{}", prettyplease::unparse(&file)))
    }
}
