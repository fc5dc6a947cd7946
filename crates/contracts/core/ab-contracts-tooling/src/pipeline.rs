//! Whole interface generation run for a single contract

use crate::output::stage_if_changed;
use ab_contracts_abigen::{AbiDocument, Collected, CollectorOptions};
use ab_contracts_codegen::{CodegenOptions, DispatchGenerator, GeneratedDispatcher};
use ab_contracts_declarations::{CallGraph, DeclarationGraph};
use ab_contracts_read_only::{Policy, ReadOnlyAnalyzer, Violation};
use anyhow::Context;
use std::path::Path;
use tracing::{debug, info, warn};

/// Options of [`generate()`]
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub collector: CollectorOptions,
    pub codegen: CodegenOptions,
    /// What to do with read-only violations
    pub read_only_policy: Policy,
    /// Embed ABI document into generated dispatchers
    pub embed_abi: bool,
}

impl GenerateOptions {
    /// Default options for contract `contract`
    pub fn new<C>(contract: C) -> Self
    where
        C: Into<String>,
    {
        Self {
            collector: CollectorOptions::new(contract),
            codegen: CodegenOptions::default(),
            read_only_policy: Policy::default(),
            embed_abi: true,
        }
    }
}

/// Everything produced by a successful run
#[derive(Debug)]
pub struct Artifacts {
    pub collected: Collected,
    pub abi: AbiDocument,
    /// Serialized ABI document
    pub abi_json: String,
    pub dispatchers: Vec<GeneratedDispatcher>,
    /// Formatted compilation unit with dispatchers
    pub source: String,
    /// Read-only violations tolerated by [`Policy::Lenient`]
    pub violations: Vec<Violation>,
}

impl Artifacts {
    /// Write ABI document and generated source to the requested paths.
    ///
    /// Files that already have the same contents are not touched. Both files are staged before
    /// either of them is replaced, so a failure to produce one of them leaves the other untouched.
    pub fn write(&self, abi_path: Option<&Path>, source_path: Option<&Path>) -> anyhow::Result<()> {
        let mut staged = Vec::with_capacity(2);
        if let Some(abi_path) = abi_path {
            staged.extend(
                stage_if_changed(abi_path, &self.abi_json).context("Failed to write ABI")?,
            );
        }
        if let Some(source_path) = source_path {
            staged.extend(
                stage_if_changed(source_path, &self.source)
                    .context("Failed to write generated dispatchers")?,
            );
        }

        for file in staged {
            file.commit()?;
        }

        Ok(())
    }
}

/// Run all stages for the contract described by `graph`.
///
/// Read-only operations are verified when `call_graph` is provided. Nothing is written to disk,
/// so a failure of any stage leaves no partial outputs behind.
pub fn generate<G>(
    graph: &G,
    call_graph: Option<&CallGraph>,
    options: GenerateOptions,
) -> anyhow::Result<Artifacts>
where
    G: DeclarationGraph,
{
    let GenerateOptions {
        collector,
        codegen,
        read_only_policy,
        embed_abi,
    } = options;
    let contract = collector.contract.clone();

    let (collected, abi) = ab_contracts_abigen::generate(graph, collector)
        .with_context(|| format!("Failed to generate ABI of contract `{contract}`"))?;
    if abi.is_empty() {
        warn!(%contract, "Contract has no externally visible interface");
    }

    let violations = match call_graph {
        Some(call_graph) => ReadOnlyAnalyzer::default()
            .with_policy(read_only_policy)
            .enforce(&collected.operations, call_graph)
            .context("Read-only verification failed")?,
        None => {
            if collected.operations.iter().any(|operation| operation.read_only) {
                debug!(%contract, "No call graph provided, read-only operations are not verified");
            }
            Vec::new()
        }
    };

    let abi_json = abi
        .to_json_pretty()
        .context("Failed to serialize ABI document")?;

    let mut generator =
        DispatchGenerator::new(codegen).context("Failed to create dispatch generator")?;
    for operation in &collected.operations {
        generator.generate(operation).with_context(|| {
            format!(
                "Failed to generate dispatcher of {} `{}`",
                operation.role.tag(),
                operation.name
            )
        })?;
    }
    let dispatchers = generator.dispatchers().to_vec();
    let source = generator
        .finish(embed_abi.then_some(abi_json.as_str()))
        .context("Failed to produce dispatchers source")?;

    info!(
        %contract,
        version = %abi.version,
        operations = %collected.operations.len(),
        tables = %collected.tables.len(),
        dispatchers = %dispatchers.len(),
        violations = %violations.len(),
        "Interface generated"
    );

    Ok(Artifacts {
        collected,
        abi,
        abi_json,
        dispatchers,
        source,
        violations,
    })
}
