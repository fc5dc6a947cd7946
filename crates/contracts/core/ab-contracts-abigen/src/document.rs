//! ABI document assembly and serialization

#[cfg(test)]
mod tests;

use crate::error::AbigenError;
use crate::resolver::is_builtin_type;
use crate::schema::{AbiVersion, FieldDef, RicardianClause, Schema};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

/// Comment embedded into every generated document
pub const GENERATED_COMMENT: &str = "This file was generated with eosio-abigen. DO NOT EDIT ";

/// Struct entry
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbiStruct {
    pub name: String,
    /// Base struct name, empty if none
    pub base: String,
    pub fields: Vec<FieldDef>,
}

/// Type alias entry
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbiTypedef {
    pub new_type_name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Action entry
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbiAction {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub ricardian_contract: String,
}

/// Synchronous call entry
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbiCall {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Table entry
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbiTable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub index_type: String,
    pub key_names: Vec<String>,
    pub key_types: Vec<String>,
}

/// Variant entry
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbiVariant {
    pub name: String,
    pub types: Vec<String>,
}

/// Result type of an action or call
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbiResult {
    pub name: String,
    pub result_type: String,
}

/// Final ABI document.
///
/// Field order is the order of keys in the serialized form.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbiDocument {
    #[serde(rename = "____comment")]
    pub comment: String,
    pub version: String,
    pub structs: Vec<AbiStruct>,
    pub types: Vec<AbiTypedef>,
    pub actions: Vec<AbiAction>,
    /// Present starting with ABI version 1.3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calls: Option<Vec<AbiCall>>,
    /// Present starting with ABI version 1.3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_results: Option<Vec<AbiResult>>,
    pub tables: Vec<AbiTable>,
    pub ricardian_clauses: Vec<RicardianClause>,
    pub variants: Vec<AbiVariant>,
    pub abi_extensions: Vec<serde_json::Value>,
    /// Present starting with ABI version 1.2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_results: Option<Vec<AbiResult>>,
}

impl AbiDocument {
    /// Serialize with 4 spaces indentation
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut output = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut output, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(output).expect("serde_json only ever emits valid UTF-8; qed"))
    }

    /// Whether document describes nothing at all
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
            && self.types.is_empty()
            && self.actions.is_empty()
            && self.calls.as_ref().is_none_or(Vec::is_empty)
            && self.tables.is_empty()
            && self.ricardian_clauses.is_empty()
            && self.variants.is_empty()
    }
}

/// Strip array, optional, binary extension and fixed size array suffixes
pub fn root_type_name(type_name: &str) -> &str {
    let mut name = type_name;
    loop {
        if let Some(stripped) = name
            .strip_suffix('?')
            .or_else(|| name.strip_suffix('$'))
            .or_else(|| name.strip_suffix("[]"))
        {
            name = stripped;
            continue;
        }
        if let Some(stripped) = name.strip_suffix(']')
            && let Some((element, size)) = stripped.rsplit_once('[')
            && !size.is_empty()
            && size.bytes().all(|byte| byte.is_ascii_digit())
        {
            name = element;
            continue;
        }

        return name;
    }
}

/// Set of type names transitively reachable from the document's roots
#[derive(Debug, Default)]
struct Reachable<'a> {
    structs: BTreeSet<&'a str>,
    typedefs: BTreeSet<&'a str>,
    variants: BTreeSet<&'a str>,
}

impl<'a> Reachable<'a> {
    fn compute<I>(schema: &'a Schema, roots: I) -> Result<Self, AbigenError>
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let mut reachable = Self::default();
        let mut queue = roots.into_iter().collect::<VecDeque<_>>();

        while let Some((type_name, referenced_by)) = queue.pop_front() {
            let name = root_type_name(type_name);
            if is_builtin_type(name) {
                continue;
            }

            if let Some((name, definition)) = schema.structs.get_key_value(name) {
                if reachable.structs.insert(name) {
                    if let Some(base) = &definition.base {
                        queue.push_back((base.as_str(), name.clone()));
                    }
                    for field in &definition.fields {
                        queue.push_back((
                            field.type_name.as_str(),
                            format!("{name}.{}", field.name),
                        ));
                    }
                }
            } else if let Some((name, target)) = schema.typedefs.get_key_value(name) {
                if reachable.typedefs.insert(name) {
                    queue.push_back((target.as_str(), name.clone()));
                }
            } else if let Some((name, types)) = schema.variants.get_key_value(name) {
                if reachable.variants.insert(name) {
                    for branch in types {
                        queue.push_back((branch.as_str(), name.clone()));
                    }
                }
            } else {
                return Err(AbigenError::DanglingType {
                    type_name: type_name.to_string(),
                    referenced_by,
                });
            }
        }

        Ok(reachable)
    }
}

/// Assemble final document from the schema.
///
/// Only structs, typedefs and variants transitively reachable from actions, calls, tables and
/// results are emitted, every name the document references is defined.
pub fn assemble(schema: &Schema) -> Result<AbiDocument, AbigenError> {
    let mut version = schema.version;
    if !schema.calls.is_empty() {
        version.set_min(AbiVersion::SYNC_CALLS);
    }

    let tables = schema.effective_tables();

    let roots = schema
        .actions
        .values()
        .map(|action| (action.type_name.as_str(), format!("action {}", action.name)))
        .chain(
            schema
                .calls
                .values()
                .map(|call| (call.type_name.as_str(), format!("call {}", call.name))),
        )
        .chain(
            tables
                .values()
                .copied()
                .map(|table| (table.type_name.as_str(), format!("table {}", table.name))),
        )
        .chain(
            schema
                .action_results()
                .map(|(name, result)| (result, format!("result of action {name}"))),
        )
        .chain(
            schema
                .call_results()
                .map(|(name, result)| (result, format!("result of call {name}"))),
        )
        .collect::<Vec<_>>();
    let reachable = Reachable::compute(schema, roots)?;

    for name in schema.structs.keys() {
        if !reachable.structs.contains(name.as_str()) {
            debug!(%name, "Dropping unreachable struct");
        }
    }
    for name in schema.typedefs.keys() {
        if !reachable.typedefs.contains(name.as_str()) {
            debug!(%name, "Dropping unreachable type alias");
        }
    }

    let structs = schema
        .structs
        .values()
        .filter(|definition| reachable.structs.contains(definition.name.as_str()))
        .map(|definition| AbiStruct {
            name: definition.name.clone(),
            base: definition.base.clone().unwrap_or_default(),
            fields: definition.fields.clone(),
        })
        .collect();
    let types = schema
        .typedefs
        .iter()
        .filter(|(name, _)| reachable.typedefs.contains(name.as_str()))
        .map(|(name, target)| AbiTypedef {
            new_type_name: name.clone(),
            type_name: target.clone(),
        })
        .collect();
    let variants = schema
        .variants
        .iter()
        .filter(|(name, _)| reachable.variants.contains(name.as_str()))
        .map(|(name, types)| AbiVariant {
            name: name.clone(),
            types: types.clone(),
        })
        .collect();

    let actions = schema
        .actions
        .values()
        .map(|action| AbiAction {
            name: action.name.clone(),
            type_name: action.type_name.clone(),
            ricardian_contract: action.ricardian_contract.clone(),
        })
        .collect();
    let to_results = |results: Vec<(&str, &str)>| {
        results
            .into_iter()
            .map(|(name, result_type)| AbiResult {
                name: name.to_string(),
                result_type: result_type.to_string(),
            })
            .collect::<Vec<_>>()
    };
    let (calls, call_results) = if version.supports_calls() {
        let calls = schema
            .calls
            .values()
            .map(|call| AbiCall {
                name: call.name.clone(),
                type_name: call.type_name.clone(),
            })
            .collect();
        (
            Some(calls),
            Some(to_results(schema.call_results().collect())),
        )
    } else {
        (None, None)
    };
    let action_results = version
        .supports_action_results()
        .then(|| to_results(schema.action_results().collect()));

    let tables = tables
        .into_values()
        .map(|table| AbiTable {
            name: table.name.clone(),
            type_name: table.type_name.clone(),
            index_type: table.index_type.clone(),
            key_names: Vec::new(),
            key_types: Vec::new(),
        })
        .collect();

    Ok(AbiDocument {
        comment: GENERATED_COMMENT.to_string(),
        version: version.to_string(),
        structs,
        types,
        actions,
        calls,
        call_results,
        tables,
        ricardian_clauses: schema.ricardian_clauses.clone(),
        variants,
        abi_extensions: Vec::new(),
        action_results,
    })
}
