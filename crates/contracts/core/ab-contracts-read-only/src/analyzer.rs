#[cfg(test)]
mod tests;

use crate::error::ReadOnlyError;
use crate::indirect::{IndirectCallResolver, LastAssignment};
use ab_contracts_abigen::{Operation, OperationRole};
use ab_contracts_declarations::{CallGraph, SourceLocation, Statement};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use tracing::{debug, warn};

/// Host primitives that modify blockchain state
pub const DEFAULT_MUTATING_PRIMITIVES: &[&str] = &[
    "db_store_i64",
    "db_update_i64",
    "db_remove_i64",
    "db_idx64_store",
    "db_idx64_update",
    "db_idx64_remove",
    "db_idx128_store",
    "db_idx128_update",
    "db_idx128_remove",
    "db_idx256_store",
    "db_idx256_update",
    "db_idx256_remove",
    "db_idx_double_store",
    "db_idx_double_update",
    "db_idx_double_remove",
    "db_idx_long_double_store",
    "db_idx_long_double_update",
    "db_idx_long_double_remove",
    "kv_set",
    "kv_erase",
    "send_inline",
    "send_context_free_inline",
    "send_deferred",
    "cancel_deferred",
    "set_resource_limits",
    "set_wasm_parameters_packed",
    "set_resource_management_parameters_packed",
    "set_proposed_producers",
    "set_proposed_producers_ex",
    "set_blockchain_parameters_packed",
    "set_parameters_packed",
    "set_kv_parameters_packed",
    "set_privileged",
    "preactivate_feature",
];

/// What to do when a read-only operation reaches a state-modifying primitive
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum Policy {
    /// Violation is an error
    #[default]
    Strict,
    /// Violation is reported as a warning
    Lenient,
}

/// Read-only operation reaching a state-modifying primitive
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Violation {
    /// External operation name
    pub operation: String,
    pub role: OperationRole,
    /// Function that calls the primitive
    pub function: String,
    pub primitive: String,
    /// Functions from the operation's method to `function`, inclusive
    pub path: Vec<String>,
    pub location: SourceLocation,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Read-only {} `{}` at {} calls state-modifying `{}`",
            self.role.tag(),
            self.operation,
            self.location,
            self.primitive
        )?;
        if self.path.len() > 1 {
            write!(f, " via {}", self.path.join(" -> "))?;
        }
        Ok(())
    }
}

/// Checks that operations marked read-only never reach state-modifying host primitives through
/// the call graph
#[derive(Debug)]
pub struct ReadOnlyAnalyzer<R = LastAssignment> {
    resolver: R,
    mutating: BTreeSet<String>,
    policy: Policy,
}

impl Default for ReadOnlyAnalyzer {
    #[inline]
    fn default() -> Self {
        Self::new(LastAssignment)
    }
}

impl<R> ReadOnlyAnalyzer<R>
where
    R: IndirectCallResolver,
{
    /// Create new analyzer with default mutating primitives and strict policy
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            mutating: DEFAULT_MUTATING_PRIMITIVES
                .iter()
                .map(|primitive| primitive.to_string())
                .collect(),
            policy: Policy::default(),
        }
    }

    /// Set policy
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the set of state-modifying primitives
    pub fn with_mutating_primitives<I, S>(mut self, primitives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mutating = primitives.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Primitive name if `callee` is state-modifying, qualified names match by last segment
    fn mutating_primitive<'a>(&self, callee: &'a str) -> Option<&'a str> {
        if self.mutating.contains(callee) {
            return Some(callee);
        }
        let unqualified = callee.rsplit("::").next()?;
        self.mutating.contains(unqualified).then_some(unqualified)
    }

    /// Find violations of all read-only operations, at most one per operation
    pub fn check(&self, operations: &[Operation], call_graph: &CallGraph) -> Vec<Violation> {
        operations
            .iter()
            .filter(|operation| operation.read_only)
            .filter_map(|operation| self.check_operation(operation, call_graph))
            .collect()
    }

    /// Like [`Self::check()`], but applies policy: with [`Policy::Strict`] the first violation is
    /// returned as an error, with [`Policy::Lenient`] violations are logged as warnings and
    /// returned
    pub fn enforce(
        &self,
        operations: &[Operation],
        call_graph: &CallGraph,
    ) -> Result<Vec<Violation>, ReadOnlyError> {
        let violations = self.check(operations, call_graph);

        match self.policy {
            Policy::Strict => {
                if let Some(violation) = violations.first() {
                    return Err(ReadOnlyError::MutatingCall {
                        violation: violation.clone(),
                        total: violations.len(),
                    });
                }
            }
            Policy::Lenient => {
                for violation in &violations {
                    warn!(%violation, "Read-only violation");
                }
            }
        }

        Ok(violations)
    }

    /// Breadth-first search from the operation's method, so the reported path is the shortest one
    fn check_operation(&self, operation: &Operation, call_graph: &CallGraph) -> Option<Violation> {
        let root = operation.function();
        let mut visited = HashSet::from([root.clone()]);
        let mut queue = VecDeque::from([vec![root]]);

        while let Some(path) = queue.pop_front() {
            let Some(function) = path.last() else {
                continue;
            };
            let Some(body) = call_graph.functions.get(function) else {
                debug!(%function, "Function without body, treating as leaf");
                continue;
            };

            for (position, statement) in body.statements.iter().enumerate() {
                let callee = match statement {
                    Statement::Call { callee } => callee.clone(),
                    Statement::IndirectCall { through } => {
                        match self
                            .resolver
                            .resolve(call_graph, function, position, through)
                        {
                            Some(callee) => callee,
                            None => {
                                debug!(%function, ?through, "Unresolved indirect call");
                                continue;
                            }
                        }
                    }
                    Statement::Assign { .. } => {
                        continue;
                    }
                };

                if let Some(primitive) = self.mutating_primitive(&callee) {
                    let location = if body.location.file.is_empty() {
                        operation.location.clone()
                    } else {
                        body.location.clone()
                    };
                    return Some(Violation {
                        operation: operation.name.clone(),
                        role: operation.role,
                        function: function.clone(),
                        primitive: primitive.to_string(),
                        path,
                        location,
                    });
                }

                if call_graph.functions.contains_key(&callee) && visited.insert(callee.clone()) {
                    let mut next = path.clone();
                    next.push(callee);
                    queue.push_back(next);
                }
            }
        }

        None
    }
}
