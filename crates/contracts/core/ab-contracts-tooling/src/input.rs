//! Inputs produced by the compiler front end

use ab_contracts_abigen::RicardianInputs;
use ab_contracts_declarations::{CallGraph, Declarations};
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

fn load_json<T>(path: &Path, what: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read {what} from `{}`", path.display()))?;
    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse {what} from `{}`", path.display()))?;

    debug!(path = %path.display(), %what, "Loaded");

    Ok(value)
}

/// Load declaration graph from JSON file
pub fn load_declarations(path: &Path) -> anyhow::Result<Declarations> {
    load_json(path, "declaration graph")
}

/// Load call graph from JSON file
pub fn load_call_graph(path: &Path) -> anyhow::Result<CallGraph> {
    load_json(path, "call graph")
}

/// Load ricardian contracts and clauses from JSON file
pub fn load_ricardian(path: &Path) -> anyhow::Result<RicardianInputs> {
    load_json(path, "ricardian contracts")
}
