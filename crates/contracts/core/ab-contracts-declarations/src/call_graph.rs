//! Call graph computed by the front end, consumed by the read-only analyzer

use crate::SourceLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variable or field a function value can be stored in
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Binding {
    /// Local variable of the function
    Local(String),
    /// Data member of a record, qualified with the record
    Field(String),
    /// Global variable
    Global(String),
}

/// Single call-relevant statement of a function body, in program order
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// Direct call of a named function
    Call { callee: String },
    /// Call through a function value stored in a binding
    IndirectCall { through: Binding },
    /// Assignment of a function value to a binding, `None` when the assigned value is not a known
    /// function
    Assign {
        target: Binding,
        #[serde(default)]
        function: Option<String>,
    },
}

/// Body of a function
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FunctionBody {
    #[serde(default)]
    pub location: SourceLocation,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

/// Initial value of a global variable or in-class field initializer
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    pub target: Binding,
    pub function: String,
}

/// Call graph of a compilation unit.
///
/// Functions are keyed by their fully qualified name, methods are `Class::method`. Functions not
/// present in the graph are treated as opaque leaves (host primitives, library functions).
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CallGraph {
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionBody>,
    #[serde(default)]
    pub initializers: Vec<Initializer>,
}

impl CallGraph {
    /// Add a function body, replacing an existing one with the same name
    pub fn insert<N>(&mut self, name: N, statements: Vec<Statement>) -> &mut Self
    where
        N: Into<String>,
    {
        self.functions.insert(
            name.into(),
            FunctionBody {
                location: SourceLocation::default(),
                statements,
            },
        );
        self
    }

    /// Add an initializer of a global variable or field
    pub fn initialize<F>(&mut self, target: Binding, function: F) -> &mut Self
    where
        F: Into<String>,
    {
        self.initializers.push(Initializer {
            target,
            function: function.into(),
        });
        self
    }
}
