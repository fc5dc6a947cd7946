//! Schema accumulated while collecting a contract's interface

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// ABI version, only ever raised during a run
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AbiVersion {
    pub major: u16,
    pub minor: u16,
}

impl fmt::Display for AbiVersion {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.{}", Self::NAMESPACE, self.major, self.minor)
    }
}

impl Default for AbiVersion {
    #[inline]
    fn default() -> Self {
        Self::BASE
    }
}

impl AbiVersion {
    /// Namespace prefix of the version string
    pub const NAMESPACE: &'static str = "eosio::abi";
    /// Version every document starts with, supports action results
    pub const BASE: Self = Self { major: 1, minor: 2 };
    /// Version supporting synchronous calls and table row bitsets
    pub const SYNC_CALLS: Self = Self { major: 1, minor: 3 };

    /// Raise version to at least `other`, never lowers it
    #[inline]
    pub fn set_min(&mut self, other: Self) {
        if other > *self {
            *self = other;
        }
    }

    /// Whether `calls` and `call_results` sections are supported
    #[inline]
    pub fn supports_calls(&self) -> bool {
        *self >= Self::SYNC_CALLS
    }

    /// Whether `action_results` section is supported
    #[inline]
    pub fn supports_action_results(&self) -> bool {
        *self >= Self::BASE
    }
}

/// Field of a struct
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl FieldDef {
    /// Create new field definition
    pub fn new<N, T>(name: N, type_name: T) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Struct definition
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct StructDef {
    pub name: String,
    pub base: Option<String>,
    /// Fields in declaration order
    pub fields: Vec<FieldDef>,
}

/// Identity of the method implementing an operation
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MethodIdentity {
    /// Qualified name of the declaring class
    pub class: String,
    /// Method name, `None` for operations declared as annotated records
    pub method: Option<String>,
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{}::{method}", self.class),
            None => f.write_str(&self.class),
        }
    }
}

/// Action entry
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActionDef {
    pub name: String,
    /// Argument struct name
    pub type_name: String,
    pub ricardian_contract: String,
    pub method: MethodIdentity,
    /// Resolved result type name, `None` for void
    pub result: Option<String>,
}

/// Synchronous call entry
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CallDef {
    pub name: String,
    /// Argument struct name
    pub type_name: String,
    /// Function selector derived from the call name
    pub id: u64,
    pub method: MethodIdentity,
    /// Resolved result type name, `None` for void
    pub result: Option<String>,
}

/// Table entry
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TableDef {
    pub name: String,
    /// Record type name
    pub type_name: String,
    pub index_type: String,
}

/// Documentation clause attached to the ABI
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RicardianClause {
    pub id: String,
    pub body: String,
}

/// Accumulated schema.
///
/// All containers are ordered by name for deterministic emission, struct fields keep declaration
/// order.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Schema {
    pub version: AbiVersion,
    pub structs: BTreeMap<String, StructDef>,
    /// Alias name -> underlying resolved type name
    pub typedefs: BTreeMap<String, String>,
    /// Variant name -> ordered branch type names
    pub variants: BTreeMap<String, Vec<String>>,
    pub actions: BTreeMap<String, ActionDef>,
    pub calls: BTreeMap<String, CallDef>,
    /// Tables declared by index bindings
    pub tables: BTreeMap<String, TableDef>,
    /// Tables declared by annotated records, subject to coalescing with [`Self::tables`]
    pub record_tables: BTreeMap<String, TableDef>,
    pub ricardian_clauses: Vec<RicardianClause>,
}

impl Schema {
    /// Action results: action name -> result type name
    pub fn action_results(&self) -> impl Iterator<Item = (&str, &str)> {
        self.actions.values().filter_map(|action| {
            action
                .result
                .as_deref()
                .map(|result| (action.name.as_str(), result))
        })
    }

    /// Call results: call name -> result type name
    pub fn call_results(&self) -> impl Iterator<Item = (&str, &str)> {
        self.calls.values().filter_map(|call| {
            call.result
                .as_deref()
                .map(|result| (call.name.as_str(), result))
        })
    }

    /// Tables that end up in the document.
    ///
    /// Every index binding produces a table. A table declared by annotating a record is only
    /// emitted when no index binding stores the same record type.
    pub fn effective_tables(&self) -> BTreeMap<&str, &TableDef> {
        let mut tables = self
            .tables
            .values()
            .map(|table| (table.name.as_str(), table))
            .collect::<BTreeMap<_, _>>();

        for table in self.record_tables.values() {
            let bound = self
                .tables
                .values()
                .any(|bound| bound.type_name == table.type_name);
            if !bound {
                tables.entry(table.name.as_str()).or_insert(table);
            }
        }

        tables
    }
}
