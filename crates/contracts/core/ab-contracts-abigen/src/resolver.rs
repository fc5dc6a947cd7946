//! Type resolver and registry.
//!
//! Maps types of the declaration graph to ABI type names, registering struct, typedef and variant
//! definitions they depend on the first time a type is seen. Every type is resolved at most once,
//! resolved names are memoized in an explicit identity-keyed map, which also makes recursive types
//! (a record reaching itself through a container or an alias) terminate. Types that reach
//! themselves without passing through a record have no ABI spelling and are rejected.

mod builtins;
#[cfg(test)]
mod tests;

use crate::error::ResolveError;
use crate::schema::{AbiVersion, FieldDef, MethodIdentity, Schema, StructDef};
pub use builtins::is_builtin_type;
use ab_contracts_declarations::types::unqualified_name;
use ab_contracts_declarations::{
    AliasDecl, DeclarationGraph, RecordDecl, TemplateArgument, TypeDescriptor, TypeId,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Field that is rewritten into a list of `extension` structs
pub const TRANSACTION_EXTENSIONS_FIELD: &str = "transaction_extensions";
/// Name of the synthesized extension struct
pub const EXTENSION_STRUCT: &str = "extension";
/// Name of the synthesized header struct prepended to call arguments
pub const CALL_DATA_HEADER_STRUCT: &str = "call_data_header";

/// Where a registered ABI name came from
#[derive(Debug, Clone, Eq, PartialEq)]
enum Origin {
    /// Declared type of the source program
    Declared(TypeId),
    /// Structural type whose name is derived from its components
    Synthesized,
    /// Argument struct of an operation
    Operation(String),
}

impl Origin {
    fn conflicts_with(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Declared(a), Self::Declared(b)) => a != b,
            (Self::Operation(a), Self::Operation(b)) => a != b,
            _ => false,
        }
    }
}

#[derive(Debug)]
struct Registration {
    origin: Origin,
    /// Human-readable description of the registering type for diagnostics
    description: String,
}

/// Linear containers that map to a suffixed element type
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Linear {
    Sequence(&'static str),
    Optional,
}

impl Linear {
    fn container(self) -> &'static str {
        match self {
            Self::Sequence(container) => container,
            Self::Optional => "optional",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Sequence(_) => "[]",
            Self::Optional => "?",
        }
    }
}

/// Classified type shape
#[derive(Debug)]
enum Shape<'g> {
    Builtin(&'static str),
    Alias(&'g AliasDecl),
    Record(&'g RecordDecl),
    Linear { kind: Linear, element: TypeId },
    Bytes,
    BinaryExtension(TypeId),
    Ignore(TypeId),
    Map { key: TypeId, value: TypeId },
    Pair { first: TypeId, second: TypeId },
    Tuple(Vec<TypeId>),
    Array { element: TypeId, len: u64 },
    Variant(Vec<TypeId>),
    UserTemplate {
        name: &'g str,
        arguments: &'g [TemplateArgument],
        record: &'g RecordDecl,
    },
}

impl Shape<'_> {
    /// Containers whose ABI name is a suffixed element name and thus can't be nested directly
    fn is_suffixed(&self) -> bool {
        matches!(
            self,
            Self::Linear { .. } | Self::Map { .. } | Self::Array { .. }
        )
    }

    fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Linear { .. }
                | Self::Map { .. }
                | Self::Pair { .. }
                | Self::Tuple(_)
                | Self::Array { .. }
                | Self::Variant(_)
        )
    }

    fn type_arguments(&self) -> Vec<TypeId> {
        match self {
            Self::Linear { element, .. } | Self::Array { element, .. } => vec![*element],
            Self::Map { key, value } => vec![*key, *value],
            Self::Pair { first, second } => vec![*first, *second],
            Self::Tuple(components) | Self::Variant(components) => components.clone(),
            _ => Vec::new(),
        }
    }
}

/// Type resolver owning the schema registry of one run
#[derive(Debug)]
pub struct TypeResolver<'g, G> {
    graph: &'g G,
    schema: Schema,
    evaluated: BTreeMap<TypeId, String>,
    /// Types whose resolution has started but not finished yet
    in_progress: BTreeSet<TypeId>,
    registrations: BTreeMap<String, Registration>,
}

impl<'g, G> TypeResolver<'g, G>
where
    G: DeclarationGraph,
{
    /// Create resolver with an empty schema
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            schema: Schema::default(),
            evaluated: BTreeMap::new(),
            in_progress: BTreeSet::new(),
            registrations: BTreeMap::new(),
        }
    }

    /// Declaration graph types are resolved against
    #[inline]
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// Schema accumulated so far
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Mutable access to the schema for entries that are not types (actions, tables, etc.)
    #[inline]
    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    /// Finish resolution and return accumulated schema
    #[inline]
    pub fn into_schema(self) -> Schema {
        self.schema
    }

    /// Resolve a type into its ABI name, registering definitions it depends on.
    ///
    /// Resolving the same type again returns the same name and registers nothing.
    pub fn resolve(&mut self, type_id: TypeId) -> Result<String, ResolveError> {
        let type_id = self.graph.strip_references(type_id);
        if let Some(name) = self.evaluated.get(&type_id) {
            return Ok(name.clone());
        }

        // Records and aliases are memoized before their dependencies, so only structural types
        // can be re-entered here
        if !self.in_progress.insert(type_id) {
            return Err(self.cyclic(type_id));
        }
        let result = self.resolve_uncached(type_id);
        self.in_progress.remove(&type_id);
        result
    }

    fn resolve_uncached(&mut self, type_id: TypeId) -> Result<String, ResolveError> {
        let shape = self.classify(type_id)?;

        if self.is_explicit_nested(&shape)? {
            let name = self.nested_definition(type_id, &shape, 0)?;
            trace!(%type_id, %name, "Resolved explicitly nested container");
            self.evaluated.insert(type_id, name.clone());
            return Ok(name);
        }

        let name = match shape {
            Shape::Builtin(name) => {
                if name == builtins::BITSET {
                    self.schema.version.set_min(AbiVersion::SYNC_CALLS);
                }
                name.to_string()
            }
            Shape::Alias(alias) => {
                if self.graph.try_desugar(type_id).is_none() {
                    return Err(self.cyclic(type_id));
                }
                let name = alias.name.clone();
                self.evaluated.insert(type_id, name.clone());
                let target = self.resolve(alias.target)?;
                self.register_typedef(&name, target, Origin::Declared(type_id), type_id)?;
                name
            }
            Shape::Record(record) => {
                let name = record.name.clone();
                self.evaluated.insert(type_id, name.clone());
                self.register_record(type_id, record, name.clone())?;
                name
            }
            Shape::UserTemplate {
                name,
                arguments,
                record,
            } => {
                let mut components = vec![unqualified_name(name).to_string()];
                for argument in arguments {
                    components.push(match argument {
                        TemplateArgument::Type(argument) => self.resolve(*argument)?,
                        TemplateArgument::Value(value) => value.to_string(),
                    });
                }
                let name = components.join("_");
                self.evaluated.insert(type_id, name.clone());
                self.register_record(type_id, record, name.clone())?;
                name
            }
            Shape::Linear { kind, element } => {
                format!("{}{}", self.resolve(element)?, kind.suffix())
            }
            Shape::Bytes => "bytes".to_string(),
            Shape::BinaryExtension(element) => format!("{}$", self.resolve(element)?),
            Shape::Ignore(element) => self.resolve(element)?,
            Shape::Map { key, value } => {
                let key = self.resolve(key)?;
                let value = self.resolve(value)?;
                format!("{}[]", self.register_pair(key, value)?)
            }
            Shape::Pair { first, second } => {
                let first = self.resolve(first)?;
                let second = self.resolve(second)?;
                self.register_pair(first, second)?
            }
            Shape::Tuple(components) => {
                let components = self.resolve_all(&components)?;
                self.register_tuple(components)?
            }
            Shape::Array { element, len } => format!("{}[{len}]", self.resolve(element)?),
            Shape::Variant(branches) => {
                let branches = self.resolve_all(&branches)?;
                self.register_variant(branches)?
            }
        };

        trace!(%type_id, %name, "Resolved type");
        self.evaluated.insert(type_id, name.clone());
        Ok(name)
    }

    fn cyclic(&self, type_id: TypeId) -> ResolveError {
        ResolveError::CyclicType {
            type_name: self.graph.display_type(type_id),
        }
    }

    fn resolve_all(&mut self, type_ids: &[TypeId]) -> Result<Vec<String>, ResolveError> {
        type_ids
            .iter()
            .map(|&type_id| self.resolve(type_id))
            .collect()
    }

    /// Register argument struct of an operation implemented by `method`
    pub fn register_operation_struct(
        &mut self,
        definition: StructDef,
        method: &MethodIdentity,
    ) -> Result<(), ResolveError> {
        let method = method.to_string();
        self.register_struct(definition, Origin::Operation(method.clone()), method)
    }

    /// Register `call_data_header` struct, a no-op if it is already registered
    pub fn register_call_data_header(&mut self) -> Result<(), ResolveError> {
        self.register_struct(
            StructDef {
                name: CALL_DATA_HEADER_STRUCT.to_string(),
                base: None,
                fields: vec![
                    FieldDef::new("version", "uint32"),
                    FieldDef::new("func_name", "uint64"),
                ],
            },
            Origin::Synthesized,
            CALL_DATA_HEADER_STRUCT.to_string(),
        )
    }

    fn classify(&self, type_id: TypeId) -> Result<Shape<'g>, ResolveError> {
        let graph = self.graph;
        let descriptor = graph
            .type_descriptor(type_id)
            .ok_or(ResolveError::UnknownType { type_id })?;

        let (name, arguments, decl) = match descriptor {
            TypeDescriptor::Primitive { name } => {
                return builtins::builtin_name(name).map(Shape::Builtin).ok_or_else(|| {
                    ResolveError::UnsupportedType {
                        type_name: name.clone(),
                    }
                });
            }
            TypeDescriptor::Alias { decl } => {
                return graph
                    .alias(*decl)
                    .map(Shape::Alias)
                    .ok_or(ResolveError::UnknownDeclaration { decl_id: *decl });
            }
            TypeDescriptor::Record { decl } => {
                return graph
                    .record(*decl)
                    .map(Shape::Record)
                    .ok_or(ResolveError::UnknownDeclaration { decl_id: *decl });
            }
            TypeDescriptor::Reference { .. } => {
                let target = graph
                    .try_strip_references(type_id)
                    .ok_or_else(|| self.cyclic(type_id))?;
                return self.classify(target);
            }
            TypeDescriptor::Template {
                name,
                arguments,
                decl,
            } => (name.as_str(), arguments.as_slice(), *decl),
        };

        let type_argument = |index: usize| {
            arguments
                .get(index)
                .and_then(TemplateArgument::as_type)
                .ok_or_else(|| ResolveError::MissingTemplateArgument {
                    template: graph.display_type(type_id),
                    index,
                })
        };
        let all_type_arguments = || {
            (0..arguments.len())
                .map(type_argument)
                .collect::<Result<Vec<_>, _>>()
        };

        let shape = match unqualified_name(name) {
            "vector" | "Vec" => {
                let element = type_argument(0)?;
                if self.is_byte(element) {
                    Shape::Bytes
                } else {
                    Shape::Linear {
                        kind: Linear::Sequence("vector"),
                        element,
                    }
                }
            }
            "set" | "BTreeSet" | "HashSet" => Shape::Linear {
                kind: Linear::Sequence("set"),
                element: type_argument(0)?,
            },
            "deque" | "VecDeque" => Shape::Linear {
                kind: Linear::Sequence("deque"),
                element: type_argument(0)?,
            },
            "list" | "LinkedList" => Shape::Linear {
                kind: Linear::Sequence("list"),
                element: type_argument(0)?,
            },
            "optional" | "Option" => Shape::Linear {
                kind: Linear::Optional,
                element: type_argument(0)?,
            },
            "binary_extension" => Shape::BinaryExtension(type_argument(0)?),
            "ignore" | "ignore_wrapper" => Shape::Ignore(type_argument(0)?),
            "map" | "BTreeMap" | "HashMap" => Shape::Map {
                key: type_argument(0)?,
                value: type_argument(1)?,
            },
            "pair" => Shape::Pair {
                first: type_argument(0)?,
                second: type_argument(1)?,
            },
            "tuple" => Shape::Tuple(all_type_arguments()?),
            "variant" => Shape::Variant(all_type_arguments()?),
            "array" => Shape::Array {
                element: type_argument(0)?,
                len: arguments.get(1).and_then(TemplateArgument::as_value).ok_or_else(|| {
                    ResolveError::MissingTemplateArgument {
                        template: graph.display_type(type_id),
                        index: 1,
                    }
                })?,
            },
            _ => {
                let record = decl.and_then(|decl| graph.record(decl)).ok_or_else(|| {
                    ResolveError::UnsupportedType {
                        type_name: graph.display_type(type_id),
                    }
                })?;
                Shape::UserTemplate {
                    name,
                    arguments,
                    record,
                }
            }
        };

        Ok(shape)
    }

    /// Single byte primitives turn sequences into `bytes`
    fn is_byte(&self, type_id: TypeId) -> bool {
        match self
            .graph
            .type_descriptor(self.graph.strip_references(type_id))
        {
            Some(TypeDescriptor::Primitive { name }) => {
                matches!(builtins::builtin_name(name), Some("int8" | "uint8"))
            }
            _ => false,
        }
    }

    /// A container is explicitly nested when one of its arguments is itself a container whose ABI
    /// name is a suffixed element name (`T[]`, `T?`, `T[N]`)
    fn is_explicit_nested(&self, shape: &Shape<'g>) -> Result<bool, ResolveError> {
        if !shape.is_container() {
            return Ok(false);
        }

        for argument in shape.type_arguments() {
            let argument = self.graph.strip_references(argument);
            if self.classify(argument)?.is_suffixed() {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Definition of one level of an explicitly nested container.
    ///
    /// Container arguments are flattened depth-first into `B_<container>_<arguments>_E` aliases,
    /// one typedef per nesting level, so that nested containers never collapse into the name of
    /// their unnested counterpart.
    fn nested_definition(
        &mut self,
        type_id: TypeId,
        shape: &Shape<'g>,
        depth: usize,
    ) -> Result<String, ResolveError> {
        let (_, definition) = self.nested_level(type_id, shape, depth)?;
        Ok(definition)
    }

    /// Returns alias name and definition of a nesting level
    fn nested_level(
        &mut self,
        type_id: TypeId,
        shape: &Shape<'g>,
        depth: usize,
    ) -> Result<(String, String), ResolveError> {
        let level = match shape {
            Shape::Linear { kind, element } => {
                let inner = self.nested_component(*element, depth)?;
                (
                    format!("B_{}_{inner}_E", kind.container()),
                    format!("{inner}{}", kind.suffix()),
                )
            }
            Shape::Map { key, value } => {
                let key = self.nested_component(*key, depth)?;
                let value = self.nested_component(*value, depth)?;
                let alias = format!("B_map_{key}_{value}_E");
                (alias, format!("{}[]", self.register_pair(key, value)?))
            }
            Shape::Pair { first, second } => {
                let first = self.nested_component(*first, depth)?;
                let second = self.nested_component(*second, depth)?;
                let alias = format!("B_pair_{first}_{second}_E");
                (alias, self.register_pair(first, second)?)
            }
            Shape::Tuple(components) => {
                let components = self.nested_components(components, depth)?;
                let alias = format!("B_tuple_{}_E", components.join("_"));
                (alias, self.register_tuple(components)?)
            }
            Shape::Array { element, len } => {
                let inner = self.nested_component(*element, depth)?;
                (format!("B_array_{inner}_{len}_E"), format!("{inner}[{len}]"))
            }
            Shape::Variant(branches) => {
                let branches = self.nested_components(branches, depth)?;
                let alias = format!("B_variant_{}_E", branches.join("_"));
                (alias, self.register_variant(branches)?)
            }
            _ => {
                return Err(ResolveError::UnsupportedType {
                    type_name: self.graph.display_type(type_id),
                });
            }
        };

        Ok(level)
    }

    fn nested_components(
        &mut self,
        type_ids: &[TypeId],
        depth: usize,
    ) -> Result<Vec<String>, ResolveError> {
        type_ids
            .iter()
            .map(|&type_id| self.nested_component(type_id, depth))
            .collect()
    }

    /// Name of a component of a nested container: containers become level aliases, everything
    /// else is resolved normally
    fn nested_component(&mut self, type_id: TypeId, depth: usize) -> Result<String, ResolveError> {
        let type_id = self.graph.strip_references(type_id);
        let shape = self.classify(type_id)?;
        if !shape.is_container() {
            return self.resolve(type_id);
        }

        if !self.in_progress.insert(type_id) {
            return Err(self.cyclic(type_id));
        }
        let level = self.nested_level(type_id, &shape, depth + 1);
        self.in_progress.remove(&type_id);
        let (alias, definition) = level?;
        self.register_typedef(&alias, definition, Origin::Synthesized, type_id)?;
        Ok(alias)
    }

    fn register_record(
        &mut self,
        type_id: TypeId,
        record: &RecordDecl,
        name: String,
    ) -> Result<(), ResolveError> {
        let base = match record.bases.as_slice() {
            [base] => Some(self.resolve(*base)?),
            _ => None,
        };

        let mut fields = Vec::with_capacity(record.fields.len());
        for field in &record.fields {
            let type_name = if field.name == TRANSACTION_EXTENSIONS_FIELD {
                self.register_extension()?;
                format!("{EXTENSION_STRUCT}[]")
            } else {
                self.resolve(field.ty)?
            };
            fields.push(FieldDef::new(field.name.clone(), type_name));
        }

        let description = self.graph.display_type(type_id);
        self.register_struct(
            StructDef { name, base, fields },
            Origin::Declared(type_id),
            description,
        )
    }

    fn register_extension(&mut self) -> Result<(), ResolveError> {
        self.register_struct(
            StructDef {
                name: EXTENSION_STRUCT.to_string(),
                base: None,
                fields: vec![
                    FieldDef::new("type", "uint16"),
                    FieldDef::new("data", "bytes"),
                ],
            },
            Origin::Synthesized,
            EXTENSION_STRUCT.to_string(),
        )
    }

    fn register_pair(&mut self, first: String, second: String) -> Result<String, ResolveError> {
        let name = format!("pair_{first}_{second}");
        self.register_struct(
            StructDef {
                name: name.clone(),
                base: None,
                fields: vec![
                    FieldDef::new("first", first),
                    FieldDef::new("second", second),
                ],
            },
            Origin::Synthesized,
            name.clone(),
        )?;
        Ok(name)
    }

    fn register_tuple(&mut self, components: Vec<String>) -> Result<String, ResolveError> {
        let name = format!("tuple_{}", components.join("_"));
        let fields = components
            .into_iter()
            .enumerate()
            .map(|(index, component)| FieldDef::new(format!("field_{index}"), component))
            .collect();
        self.register_struct(
            StructDef {
                name: name.clone(),
                base: None,
                fields,
            },
            Origin::Synthesized,
            name.clone(),
        )?;
        Ok(name)
    }

    fn register_variant(&mut self, branches: Vec<String>) -> Result<String, ResolveError> {
        let name = format!("variant_{}", branches.join("_"));
        if let Some(existing) = self.registrations.get(&name) {
            if self.schema.variants.get(&name) != Some(&branches) {
                return Err(ResolveError::NameCollision {
                    name: name.clone(),
                    existing: existing.description.clone(),
                    new: name,
                });
            }
            return Ok(name);
        }

        trace!(%name, ?branches, "Registered variant");
        self.registrations.insert(
            name.clone(),
            Registration {
                origin: Origin::Synthesized,
                description: name.clone(),
            },
        );
        self.schema.variants.insert(name.clone(), branches);
        Ok(name)
    }

    fn register_typedef(
        &mut self,
        name: &str,
        target: String,
        origin: Origin,
        type_id: TypeId,
    ) -> Result<(), ResolveError> {
        let description = match origin {
            Origin::Synthesized => name.to_string(),
            Origin::Declared(_) | Origin::Operation(_) => self.graph.display_type(type_id),
        };

        if let Some(existing) = self.registrations.get(name) {
            if existing.origin.conflicts_with(&origin)
                || self.schema.typedefs.get(name) != Some(&target)
            {
                return Err(ResolveError::NameCollision {
                    name: name.to_string(),
                    existing: existing.description.clone(),
                    new: description,
                });
            }
            return Ok(());
        }

        trace!(%name, %target, "Registered typedef");
        self.registrations.insert(
            name.to_string(),
            Registration {
                origin,
                description,
            },
        );
        self.schema.typedefs.insert(name.to_string(), target);
        Ok(())
    }

    fn register_struct(
        &mut self,
        definition: StructDef,
        origin: Origin,
        description: String,
    ) -> Result<(), ResolveError> {
        if let Some(existing) = self.registrations.get(&definition.name) {
            if existing.origin.conflicts_with(&origin)
                || self.schema.structs.get(&definition.name) != Some(&definition)
            {
                return Err(ResolveError::NameCollision {
                    name: definition.name,
                    existing: existing.description.clone(),
                    new: description,
                });
            }
            return Ok(());
        }

        trace!(name = %definition.name, base = ?definition.base, "Registered struct");
        self.registrations.insert(
            definition.name.clone(),
            Registration {
                origin,
                description,
            },
        );
        self.schema
            .structs
            .insert(definition.name.clone(), definition);
        Ok(())
    }
}
