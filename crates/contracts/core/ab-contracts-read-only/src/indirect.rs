#[cfg(test)]
mod tests;

use ab_contracts_declarations::{Binding, CallGraph, Statement};
use std::fmt;

/// Strategy for finding the function invoked through a function value
pub trait IndirectCallResolver: fmt::Debug {
    /// Function called through `binding` by statement number `position` of function `function`,
    /// `None` if it is not known
    fn resolve(
        &self,
        call_graph: &CallGraph,
        function: &str,
        position: usize,
        binding: &Binding,
    ) -> Option<String>;
}

/// Resolves indirect call to the last function assigned to the binding earlier in the same
/// function, falling back to the initializer of a field or global variable.
///
/// Assignment of an unknown value clears the binding.
#[derive(Debug, Default, Copy, Clone)]
pub struct LastAssignment;

impl IndirectCallResolver for LastAssignment {
    fn resolve(
        &self,
        call_graph: &CallGraph,
        function: &str,
        position: usize,
        binding: &Binding,
    ) -> Option<String> {
        let statements = call_graph
            .functions
            .get(function)
            .map(|body| &body.statements[..position.min(body.statements.len())])
            .unwrap_or_default();

        for statement in statements.iter().rev() {
            if let Statement::Assign { target, function } = statement
                && target == binding
            {
                return function.clone();
            }
        }

        match binding {
            Binding::Local(_) => None,
            Binding::Field(_) | Binding::Global(_) => call_graph
                .initializers
                .iter()
                .rev()
                .find(|initializer| &initializer.target == binding)
                .map(|initializer| initializer.function.clone()),
        }
    }
}
