//! Read-only capability interface over the declaration graph

#[cfg(test)]
mod tests;

use crate::decls::{AliasDecl, Declaration, MethodDecl, RecordDecl};
use crate::types::{TemplateArgument, TypeDescriptor};
use crate::{DeclId, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Narrow read-only view of a front end's declaration graph.
///
/// Only [`Self::type_descriptor()`], [`Self::declaration()`], [`Self::types()`] and
/// [`Self::declarations()`] need to be implemented, everything else is derived from them.
pub trait DeclarationGraph {
    /// Descriptor of a type
    fn type_descriptor(&self, type_id: TypeId) -> Option<&TypeDescriptor>;

    /// Declaration by its identity
    fn declaration(&self, decl_id: DeclId) -> Option<&Declaration>;

    /// All types known to the graph, in a deterministic order
    fn types(&self) -> impl Iterator<Item = (TypeId, &TypeDescriptor)>;

    /// All declarations known to the graph, in a deterministic order
    fn declarations(&self) -> impl Iterator<Item = (DeclId, &Declaration)>;

    /// Record declaration by its identity
    fn record(&self, decl_id: DeclId) -> Option<&RecordDecl> {
        match self.declaration(decl_id)? {
            Declaration::Record(record) => Some(record),
            Declaration::Method(_) | Declaration::Alias(_) => None,
        }
    }

    /// Method declaration by its identity
    fn method(&self, decl_id: DeclId) -> Option<&MethodDecl> {
        match self.declaration(decl_id)? {
            Declaration::Method(method) => Some(method),
            Declaration::Record(_) | Declaration::Alias(_) => None,
        }
    }

    /// Alias declaration by its identity
    fn alias(&self, decl_id: DeclId) -> Option<&AliasDecl> {
        match self.declaration(decl_id)? {
            Declaration::Alias(alias) => Some(alias),
            Declaration::Record(_) | Declaration::Method(_) => None,
        }
    }

    /// Strip pointer/reference/cv wrappers.
    ///
    /// Stops at `type_id` itself when references form a cycle, see
    /// [`Self::try_strip_references()`].
    fn strip_references(&self, type_id: TypeId) -> TypeId {
        self.try_strip_references(type_id).unwrap_or(type_id)
    }

    /// Strip pointer/reference/cv wrappers, returns `None` when references form a cycle
    fn try_strip_references(&self, type_id: TypeId) -> Option<TypeId> {
        follow_chain(self, type_id, false)
    }

    /// Strip references and desugar aliases down to the underlying type.
    ///
    /// Stops at `type_id` itself when references and aliases form a cycle, see
    /// [`Self::try_desugar()`].
    fn desugar(&self, type_id: TypeId) -> TypeId {
        self.try_desugar(type_id).unwrap_or(type_id)
    }

    /// Strip references and desugar aliases, returns `None` when they form a cycle
    fn try_desugar(&self, type_id: TypeId) -> Option<TypeId> {
        follow_chain(self, type_id, true)
    }

    /// Record behind a type, looking through references and aliases
    fn as_record(&self, type_id: TypeId) -> Option<(DeclId, &RecordDecl)> {
        let decl_id = match self.type_descriptor(self.desugar(type_id))? {
            TypeDescriptor::Record { decl } => *decl,
            TypeDescriptor::Template {
                decl: Some(decl), ..
            } => *decl,
            _ => {
                return None;
            }
        };
        self.record(decl_id).map(|record| (decl_id, record))
    }

    /// Template name and arguments, looking through references (but not aliases)
    fn template(&self, type_id: TypeId) -> Option<(&str, &[TemplateArgument])> {
        match self.type_descriptor(self.strip_references(type_id))? {
            TypeDescriptor::Template {
                name, arguments, ..
            } => Some((name.as_str(), arguments.as_slice())),
            _ => None,
        }
    }

    /// Type argument of a template instantiation at `index`
    fn type_argument(&self, type_id: TypeId, index: usize) -> Option<TypeId> {
        self.template(type_id)?.1.get(index)?.as_type()
    }

    /// Constant argument of a template instantiation at `index`
    fn value_argument(&self, type_id: TypeId, index: usize) -> Option<u64> {
        self.template(type_id)?.1.get(index)?.as_value()
    }

    /// Human-readable spelling of a type for diagnostics
    fn display_type(&self, type_id: TypeId) -> String {
        display_type(self, type_id, &mut Vec::new())
    }
}

/// Follows references (and aliases if `through_aliases` is set) until some other type is reached.
///
/// Returns `None` if a type repeats before that.
fn follow_chain<G>(graph: &G, mut type_id: TypeId, through_aliases: bool) -> Option<TypeId>
where
    G: DeclarationGraph + ?Sized,
{
    let mut visited = BTreeSet::new();
    loop {
        let next = match graph.type_descriptor(type_id) {
            Some(TypeDescriptor::Reference { target }) => *target,
            Some(TypeDescriptor::Alias { decl }) if through_aliases => match graph.alias(*decl) {
                Some(alias) => alias.target,
                None => {
                    return Some(type_id);
                }
            },
            _ => {
                return Some(type_id);
            }
        };
        if !visited.insert(type_id) {
            return None;
        }
        type_id = next;
    }
}

/// `visiting` holds types whose spelling is being built, a type that reaches itself is spelled as
/// its identity
fn display_type<G>(graph: &G, type_id: TypeId, visiting: &mut Vec<TypeId>) -> String
where
    G: DeclarationGraph + ?Sized,
{
    let Some(descriptor) = graph.type_descriptor(type_id) else {
        return type_id.to_string();
    };
    if visiting.contains(&type_id) {
        return type_id.to_string();
    }

    visiting.push(type_id);
    let spelling = match descriptor {
        TypeDescriptor::Primitive { name } => name.clone(),
        TypeDescriptor::Alias { decl } => graph
            .alias(*decl)
            .map_or_else(|| decl.to_string(), |alias| alias.name.clone()),
        TypeDescriptor::Record { decl } => graph
            .record(*decl)
            .map_or_else(|| decl.to_string(), |record| record.qualified_name.clone()),
        TypeDescriptor::Template {
            name, arguments, ..
        } => {
            let arguments = arguments
                .iter()
                .map(|argument| match argument {
                    TemplateArgument::Type(type_id) => display_type(graph, *type_id, visiting),
                    TemplateArgument::Value(value) => value.to_string(),
                })
                .collect::<Vec<_>>();
            format!("{name}<{}>", arguments.join(", "))
        }
        TypeDescriptor::Reference { target } => {
            format!("&{}", display_type(graph, *target, visiting))
        }
    };
    visiting.pop();

    spelling
}

/// In-memory declaration graph.
///
/// [`TypeId`] and [`DeclId`] are indices into `types` and `declarations` respectively. This is the
/// format front ends hand over to the tooling as JSON.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl DeclarationGraph for Declarations {
    #[inline]
    fn type_descriptor(&self, type_id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(type_id.0 as usize)
    }

    #[inline]
    fn declaration(&self, decl_id: DeclId) -> Option<&Declaration> {
        self.declarations.get(decl_id.0 as usize)
    }

    fn types(&self) -> impl Iterator<Item = (TypeId, &TypeDescriptor)> {
        (0u32..)
            .zip(&self.types)
            .map(|(index, descriptor)| (TypeId(index), descriptor))
    }

    fn declarations(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        (0u32..)
            .zip(&self.declarations)
            .map(|(index, declaration)| (DeclId(index), declaration))
    }
}
