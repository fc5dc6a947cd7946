//! Declaration collector.
//!
//! Walks the declaration graph of one contract, discovers annotated operations (actions, calls,
//! notification handlers) and table bindings, validates their annotations and feeds all types
//! they use into [`TypeResolver`].


use crate::error::{AbigenError, DeclarationError};
use crate::name::{identifier_to_id, name_to_string, validate_identifier, validate_name};
use crate::operation::{Operation, OperationParameter, OperationRole, TableBinding};
use crate::resolver::TypeResolver;
use crate::schema::{
    AbiVersion, ActionDef, CallDef, FieldDef, MethodIdentity, RicardianClause, Schema, StructDef,
    TableDef,
};
use ab_contracts_declarations::types::unqualified_name;
use ab_contracts_declarations::{
    DeclId, Declaration, DeclarationGraph, MethodDecl, RecordDecl, SourceLocation, Tags,
    TypeDescriptor, TypeId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

/// Index type of every emitted table
pub const TABLE_INDEX_TYPE: &str = "i64";

/// Human-readable documentation attached to the ABI
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RicardianInputs {
    /// Action name -> ricardian contract body
    #[serde(default)]
    pub contracts: BTreeMap<String, String>,
    #[serde(default)]
    pub clauses: Vec<RicardianClause>,
}

/// Options of [`Collector`]
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// External name of the contract to collect
    pub contract: String,
    /// Qualified name of the base class every contract class must derive from
    pub base_contract: String,
    /// Unqualified names of index templates that bind a record to a table
    pub index_templates: Vec<String>,
    pub ricardian: RicardianInputs,
    /// Don't warn about actions without ricardian contract
    pub suppress_ricardian_warnings: bool,
}

impl CollectorOptions {
    /// Default options for contract with external name `contract`
    pub fn new<C>(contract: C) -> Self
    where
        C: Into<String>,
    {
        Self {
            contract: contract.into(),
            base_contract: "eosio::contract".to_string(),
            index_templates: vec!["multi_index".to_string(), "singleton".to_string()],
            ricardian: RicardianInputs::default(),
            suppress_ricardian_warnings: false,
        }
    }
}

/// Result of collection
#[derive(Debug, Clone)]
pub struct Collected {
    /// Operations in declaration order
    pub operations: Vec<Operation>,
    pub tables: Vec<TableBinding>,
    /// Draft schema, not yet filtered for reachability
    pub schema: Schema,
}

/// Roles a set of annotations assigns to a method
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
struct Roles {
    action: bool,
    call: bool,
    notify: bool,
}

impl Roles {
    fn of(tags: &Tags) -> Self {
        Self {
            action: tags.action.is_some(),
            call: tags.call.is_some(),
            notify: tags.notify.is_some(),
        }
    }

    fn is_empty(&self) -> bool {
        !(self.action || self.call || self.notify)
    }

    fn is_subset_of(&self, other: &Self) -> bool {
        (!self.action || other.action)
            && (!self.call || other.call)
            && (!self.notify || other.notify)
    }
}

type SeenKey = (OperationRole, DeclId, String);

/// First declaration of an operation
#[derive(Debug)]
struct SeenOperation {
    parameter_types: Vec<TypeId>,
    declaration: String,
    location: SourceLocation,
}

/// Declaration collector for a single contract
#[derive(Debug)]
pub struct Collector<'g, G> {
    graph: &'g G,
    options: CollectorOptions,
    resolver: TypeResolver<'g, G>,
    record_types: HashMap<DeclId, TypeId>,
    operations: Vec<Operation>,
    tables: Vec<TableBinding>,
    /// Operations collected so far
    seen: HashMap<SeenKey, SeenOperation>,
    /// Where actions and calls of the schema were declared, by role and external name
    declared_at: HashMap<(OperationRole, String), SourceLocation>,
    call_ids: BTreeMap<u64, String>,
}

impl<'g, G> Collector<'g, G>
where
    G: DeclarationGraph,
{
    /// Create new collector
    pub fn new(graph: &'g G, options: CollectorOptions) -> Self {
        let record_types = graph
            .types()
            .filter_map(|(type_id, descriptor)| match descriptor {
                TypeDescriptor::Record { decl } => Some((*decl, type_id)),
                _ => None,
            })
            .collect();

        Self {
            graph,
            options,
            resolver: TypeResolver::new(graph),
            record_types,
            operations: Vec::new(),
            tables: Vec::new(),
            seen: HashMap::new(),
            declared_at: HashMap::new(),
            call_ids: BTreeMap::new(),
        }
    }

    /// Collect operations, table bindings and the draft schema
    pub fn collect(mut self) -> Result<Collected, AbigenError> {
        let graph = self.graph;
        let (contract_id, contract) = self.find_contract()?;
        debug!(
            contract = %self.options.contract,
            class = %contract.qualified_name,
            "Found contract class"
        );

        for (decl_id, declaration) in graph.declarations() {
            match declaration {
                Declaration::Method(method) => {
                    if self.method_contract(method).as_deref()
                        == Some(self.options.contract.as_str())
                    {
                        self.collect_method(decl_id, method)?;
                    }
                }
                Declaration::Record(record) => {
                    let tagged = record.tags.action.is_some()
                        || record.tags.call.is_some()
                        || record.tags.table.is_some();
                    if tagged
                        && self.record_contract(record).as_deref()
                            == Some(self.options.contract.as_str())
                    {
                        self.collect_record(decl_id, record)?;
                    }
                }
                Declaration::Alias(_) => {}
            }
        }

        for (type_id, descriptor) in graph.types() {
            if let TypeDescriptor::Template { name, .. } = descriptor
                && self
                    .options
                    .index_templates
                    .iter()
                    .any(|index| index == unqualified_name(name))
            {
                self.collect_index_binding(type_id, contract_id, contract)?;
            }
        }

        let mut schema = self.resolver.into_schema();
        schema.ricardian_clauses = self.options.ricardian.clauses.clone();

        Ok(Collected {
            operations: self.operations,
            tables: self.tables,
            schema,
        })
    }

    fn find_contract(&self) -> Result<(DeclId, &'g RecordDecl), DeclarationError> {
        let graph = self.graph;
        for (decl_id, declaration) in graph.declarations() {
            let Declaration::Record(record) = declaration else {
                continue;
            };
            let Some(tag) = &record.tags.contract else {
                continue;
            };
            let name = if tag.is_empty() { &record.name } else { tag };
            if name != &self.options.contract {
                continue;
            }
            if !self.derives_base_contract(record) {
                debug!(
                    class = %record.qualified_name,
                    "Class is tagged as contract, but doesn't derive from base contract, ignoring"
                );
                continue;
            }

            return Ok((decl_id, record));
        }

        Err(DeclarationError::ContractNotFound {
            contract: self.options.contract.clone(),
        })
    }

    fn derives_base_contract(&self, record: &RecordDecl) -> bool {
        let base_contract = self.options.base_contract.trim_start_matches("::");
        record.bases.iter().any(|&base| {
            self.graph.as_record(base).is_some_and(|(_, base)| {
                base.qualified_name.trim_start_matches("::") == base_contract
            })
        })
    }

    /// Contract a record belongs to: its own annotation or the closest enclosing class's
    fn record_contract(&self, record: &RecordDecl) -> Option<String> {
        let mut visited = BTreeSet::new();
        let mut current = Some(record);
        while let Some(record) = current {
            if let Some(tag) = &record.tags.contract {
                return Some(if tag.is_empty() {
                    record.name.clone()
                } else {
                    tag.clone()
                });
            }
            current = record
                .parent
                .filter(|&parent| visited.insert(parent))
                .and_then(|parent| self.graph.record(parent));
        }

        None
    }

    fn method_contract(&self, method: &MethodDecl) -> Option<String> {
        let parent = self.graph.record(method.parent);
        match &method.tags.contract {
            Some(tag) if !tag.is_empty() => Some(tag.clone()),
            Some(_) => parent.map(|parent| parent.name.clone()),
            None => parent.and_then(|parent| self.record_contract(parent)),
        }
    }

    /// Merge annotations of all declarations of a method, rejecting contradicting ones
    fn merged_tags(
        &self,
        method: &MethodDecl,
        declaration: &str,
    ) -> Result<Tags, DeclarationError> {
        let conflict = |location: &SourceLocation, reason| DeclarationError::ConflictingTags {
            declaration: declaration.to_string(),
            location: location.clone(),
            reason,
        };

        let mut merged = method.tags.clone();
        let mut merged_roles = Roles::of(&method.tags);

        for redeclaration in &method.redeclarations {
            let tags = &redeclaration.tags;
            let roles = Roles::of(tags);
            if !roles.is_empty()
                && !merged_roles.is_empty()
                && !roles.is_subset_of(&merged_roles)
                && !merged_roles.is_subset_of(&roles)
            {
                return Err(conflict(
                    &redeclaration.location,
                    "declarations disagree on whether this is an action, call or notification \
                    handler",
                ));
            }

            for (merged, tag) in [
                (&mut merged.action, &tags.action),
                (&mut merged.call, &tags.call),
                (&mut merged.notify, &tags.notify),
                (&mut merged.contract, &tags.contract),
            ] {
                match (merged.as_deref(), tag.as_deref()) {
                    (_, None) => {}
                    (None | Some(""), Some(_)) => {
                        merged.clone_from(tag);
                    }
                    (Some(existing), Some(new)) => {
                        if !new.is_empty() && existing != new {
                            return Err(conflict(
                                &redeclaration.location,
                                "declarations use different external names",
                            ));
                        }
                    }
                }
            }
            merged.read_only |= tags.read_only;
            merged_roles = Roles::of(&merged);
        }

        if merged_roles.notify && (merged_roles.action || merged_roles.call) {
            return Err(conflict(
                &method.location,
                "notification handler can't be an action or call at the same time",
            ));
        }
        if merged.read_only && !(merged_roles.action || merged_roles.call) {
            return Err(conflict(
                &method.location,
                "read-only annotation requires action or call annotation",
            ));
        }

        Ok(merged)
    }

    fn resolve_for(
        &mut self,
        type_id: TypeId,
        declaration: &str,
        location: &SourceLocation,
    ) -> Result<String, AbigenError> {
        self.resolver
            .resolve(type_id)
            .map_err(|source| AbigenError::Resolution {
                declaration: declaration.to_string(),
                location: location.clone(),
                source,
            })
    }

    fn collect_method(
        &mut self,
        method_id: DeclId,
        method: &'g MethodDecl,
    ) -> Result<(), AbigenError> {
        let graph = self.graph;
        let class = graph
            .record(method.parent)
            .ok_or_else(|| AbigenError::Resolution {
                declaration: method.name.clone(),
                location: method.location.clone(),
                source: crate::error::ResolveError::UnknownDeclaration {
                    decl_id: method.parent,
                },
            })?;
        let identity = MethodIdentity {
            class: class.qualified_name.clone(),
            method: Some(method.name.clone()),
        };
        let declaration = identity.to_string();

        let tags = self.merged_tags(method, &declaration)?;
        if !tags.has_role() {
            return Ok(());
        }

        let mut parameters = Vec::with_capacity(method.parameters.len());
        for parameter in &method.parameters {
            parameters.push(OperationParameter {
                name: parameter.name.clone(),
                ty: parameter.ty,
                spelling: parameter.spelling.clone(),
                type_name: self.resolve_for(parameter.ty, &declaration, &method.location)?,
            });
        }
        let result = method
            .result
            .map(|result| self.resolve_for(result, &declaration, &method.location))
            .transpose()?;

        let operation = Operation {
            role: OperationRole::Action,
            name: String::new(),
            method: method_id,
            method_name: method.name.clone(),
            class: method.parent,
            class_name: class.name.clone(),
            class_path: class.qualified_name.clone(),
            parameters,
            result,
            read_only: tags.read_only,
            derives_base_contract: self.derives_base_contract(class),
            location: method.location.clone(),
        };

        if let Some(action) = &tags.action {
            let name = if action.is_empty() { &method.name } else { action };
            self.add_action(
                Operation {
                    role: OperationRole::Action,
                    name: name.clone(),
                    ..operation.clone()
                },
                &identity,
            )?;
        }
        if let Some(call) = &tags.call {
            let name = if call.is_empty() { &method.name } else { call };
            let struct_name = if tags.action.is_some() {
                format!("{}_call", method.name)
            } else {
                method.name.clone()
            };
            self.add_call(
                Operation {
                    role: OperationRole::Call,
                    name: name.clone(),
                    ..operation.clone()
                },
                &identity,
                struct_name,
            )?;
        }
        if let Some(target) = &tags.notify {
            self.add_notify(Operation {
                role: OperationRole::Notify,
                name: target.clone(),
                ..operation
            })?;
        }

        Ok(())
    }

    /// Returns `false` if the same operation was already collected
    fn check_duplicate(
        &mut self,
        operation: &Operation,
        declaration: &str,
    ) -> Result<bool, DeclarationError> {
        let key = (operation.role, operation.class, operation.method_name.clone());
        let parameter_types = operation
            .parameters
            .iter()
            .map(|parameter| parameter.ty)
            .collect::<Vec<_>>();

        match self.seen.get(&key) {
            Some(seen) if seen.parameter_types == parameter_types => {
                debug!(
                    %declaration,
                    role = %operation.role,
                    "Operation already collected, skipping"
                );
                Ok(false)
            }
            Some(seen) => Err(DeclarationError::DuplicateOperation {
                role: operation.role,
                name: operation.name.clone(),
                declaration: declaration.to_string(),
                location: operation.location.clone(),
                previous: seen.declaration.clone(),
                previous_location: seen.location.clone(),
            }),
            None => {
                self.seen.insert(
                    key,
                    SeenOperation {
                        parameter_types,
                        declaration: declaration.to_string(),
                        location: operation.location.clone(),
                    },
                );
                Ok(true)
            }
        }
    }

    fn previous_location(&self, role: OperationRole, name: &str) -> SourceLocation {
        self.declared_at
            .get(&(role, name.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn argument_fields(operation: &Operation) -> Vec<FieldDef> {
        operation
            .parameters
            .iter()
            .map(|parameter| FieldDef::new(parameter.name.clone(), parameter.type_name.clone()))
            .collect()
    }

    fn add_action(
        &mut self,
        operation: Operation,
        identity: &MethodIdentity,
    ) -> Result<(), AbigenError> {
        let declaration = identity.to_string();
        validate_name(&operation.name).map_err(|source| DeclarationError::InvalidName {
            what: "action",
            name: operation.name.clone(),
            declaration: declaration.clone(),
            location: operation.location.clone(),
            source,
        })?;

        if !self.check_duplicate(&operation, &declaration)? {
            return Ok(());
        }

        if let Some(existing) = self.resolver.schema().actions.get(&operation.name) {
            return Err(DeclarationError::DuplicateOperation {
                role: OperationRole::Action,
                name: operation.name.clone(),
                declaration,
                location: operation.location.clone(),
                previous: existing.method.to_string(),
                previous_location: self.previous_location(OperationRole::Action, &operation.name),
            }
            .into());
        }

        self.resolver
            .register_operation_struct(
                StructDef {
                    name: operation.method_name.clone(),
                    base: None,
                    fields: Self::argument_fields(&operation),
                },
                identity,
            )
            .map_err(|source| AbigenError::Resolution {
                declaration: declaration.clone(),
                location: operation.location.clone(),
                source,
            })?;

        let ricardian_contract = self.ricardian_contract(&operation.name);
        debug!(
            action = %operation.name,
            %declaration,
            read_only = operation.read_only,
            "Collected action"
        );
        self.declared_at.insert(
            (OperationRole::Action, operation.name.clone()),
            operation.location.clone(),
        );
        self.resolver.schema_mut().actions.insert(
            operation.name.clone(),
            ActionDef {
                name: operation.name.clone(),
                type_name: operation.method_name.clone(),
                ricardian_contract,
                method: identity.clone(),
                result: operation.result.clone(),
            },
        );
        self.operations.push(operation);

        Ok(())
    }

    fn add_call(
        &mut self,
        operation: Operation,
        identity: &MethodIdentity,
        struct_name: String,
    ) -> Result<(), AbigenError> {
        let declaration = identity.to_string();
        validate_identifier(&operation.name).map_err(|source| DeclarationError::InvalidName {
            what: "call",
            name: operation.name.clone(),
            declaration: declaration.clone(),
            location: operation.location.clone(),
            source,
        })?;

        if !self.check_duplicate(&operation, &declaration)? {
            return Ok(());
        }

        if let Some(existing) = self.resolver.schema().calls.get(&operation.name) {
            return Err(DeclarationError::DuplicateOperation {
                role: OperationRole::Call,
                name: operation.name.clone(),
                declaration,
                location: operation.location.clone(),
                previous: existing.method.to_string(),
                previous_location: self.previous_location(OperationRole::Call, &operation.name),
            }
            .into());
        }

        let id = self.register_call_id(&operation.name, &operation.location)?;

        let mut fields = vec![FieldDef::new("header", crate::resolver::CALL_DATA_HEADER_STRUCT)];
        fields.extend(Self::argument_fields(&operation));
        let resolution_error = |source| AbigenError::Resolution {
            declaration: declaration.clone(),
            location: operation.location.clone(),
            source,
        };
        self.resolver
            .register_call_data_header()
            .map_err(resolution_error)?;
        self.resolver
            .register_operation_struct(
                StructDef {
                    name: struct_name.clone(),
                    base: None,
                    fields,
                },
                identity,
            )
            .map_err(resolution_error)?;

        debug!(call = %operation.name, %declaration, id, "Collected call");
        self.declared_at.insert(
            (OperationRole::Call, operation.name.clone()),
            operation.location.clone(),
        );
        let schema = self.resolver.schema_mut();
        schema.version.set_min(AbiVersion::SYNC_CALLS);
        schema.calls.insert(
            operation.name.clone(),
            CallDef {
                name: operation.name.clone(),
                type_name: struct_name,
                id,
                method: identity.clone(),
                result: operation.result.clone(),
            },
        );
        self.operations.push(operation);

        Ok(())
    }

    fn register_call_id(
        &mut self,
        name: &str,
        location: &SourceLocation,
    ) -> Result<u64, DeclarationError> {
        let id = identifier_to_id(name);
        match self.call_ids.get(&id) {
            Some(other) if other != name => Err(DeclarationError::CallIdConflict {
                name: name.to_string(),
                other: other.clone(),
                id,
                location: location.clone(),
            }),
            Some(_) => Ok(id),
            None => {
                self.call_ids.insert(id, name.to_string());
                Ok(id)
            }
        }
    }

    fn add_notify(&mut self, operation: Operation) -> Result<(), AbigenError> {
        let declaration = format!("{}::{}", operation.class_path, operation.method_name);
        let valid = operation
            .name
            .split_once("::")
            .is_some_and(|(code, action)| {
                (code == "*" || (!code.is_empty() && validate_name(code).is_ok()))
                    && !action.is_empty()
                    && validate_name(action).is_ok()
            });
        if !valid {
            return Err(DeclarationError::InvalidNotifyTarget {
                target: operation.name.clone(),
                declaration,
                location: operation.location.clone(),
            }
            .into());
        }

        if !self.check_duplicate(&operation, &declaration)? {
            return Ok(());
        }

        debug!(target = %operation.name, %declaration, "Collected notification handler");
        self.operations.push(operation);
        Ok(())
    }

    fn ricardian_contract(&self, action: &str) -> String {
        match self.options.ricardian.contracts.get(action) {
            Some(contract) if !contract.is_empty() => contract.clone(),
            _ => {
                if !self.options.suppress_ricardian_warnings {
                    warn!(%action, "Action does not have a ricardian contract");
                }
                String::new()
            }
        }
    }

    fn record_type(&self, decl_id: DeclId, record: &RecordDecl) -> Result<TypeId, AbigenError> {
        self.record_types
            .get(&decl_id)
            .copied()
            .ok_or_else(|| AbigenError::Resolution {
                declaration: record.qualified_name.clone(),
                location: record.location.clone(),
                source: crate::error::ResolveError::UnknownDeclaration { decl_id },
            })
    }

    /// Actions, calls and tables declared by annotating a record
    fn collect_record(
        &mut self,
        decl_id: DeclId,
        record: &'g RecordDecl,
    ) -> Result<(), AbigenError> {
        let declaration = record.qualified_name.clone();
        let record_type = self.record_type(decl_id, record)?;
        let type_name = self.resolve_for(record_type, &declaration, &record.location)?;
        let identity = MethodIdentity {
            class: record.qualified_name.clone(),
            method: None,
        };
        let invalid_name = |what, name: &str, source| DeclarationError::InvalidName {
            what,
            name: name.to_string(),
            declaration: declaration.clone(),
            location: record.location.clone(),
            source,
        };

        if let Some(action) = &record.tags.action {
            let name = if action.is_empty() { &record.name } else { action };
            validate_name(name).map_err(|source| invalid_name("action", name, source))?;
            if let Some(existing) = self.resolver.schema().actions.get(name) {
                if existing.method != identity {
                    return Err(DeclarationError::DuplicateOperation {
                        role: OperationRole::Action,
                        name: name.clone(),
                        declaration: declaration.clone(),
                        location: record.location.clone(),
                        previous: existing.method.to_string(),
                        previous_location: self.previous_location(OperationRole::Action, name),
                    }
                    .into());
                }
            } else {
                debug!(action = %name, %declaration, "Collected action record");
                self.declared_at.insert(
                    (OperationRole::Action, name.clone()),
                    record.location.clone(),
                );
                let ricardian_contract = self.ricardian_contract(name);
                self.resolver.schema_mut().actions.insert(
                    name.clone(),
                    ActionDef {
                        name: name.clone(),
                        type_name: type_name.clone(),
                        ricardian_contract,
                        method: identity.clone(),
                        result: None,
                    },
                );
            }
        }

        if let Some(call) = &record.tags.call {
            let name = if call.is_empty() { &record.name } else { call };
            validate_identifier(name).map_err(|source| invalid_name("call", name, source))?;
            if let Some(existing) = self.resolver.schema().calls.get(name) {
                if existing.method != identity {
                    return Err(DeclarationError::DuplicateOperation {
                        role: OperationRole::Call,
                        name: name.clone(),
                        declaration: declaration.clone(),
                        location: record.location.clone(),
                        previous: existing.method.to_string(),
                        previous_location: self.previous_location(OperationRole::Call, name),
                    }
                    .into());
                }
            } else {
                let id = self.register_call_id(name, &record.location)?;
                debug!(call = %name, %declaration, id, "Collected call record");
                self.declared_at.insert(
                    (OperationRole::Call, name.clone()),
                    record.location.clone(),
                );
                let schema = self.resolver.schema_mut();
                schema.version.set_min(AbiVersion::SYNC_CALLS);
                schema.calls.insert(
                    name.clone(),
                    CallDef {
                        name: name.clone(),
                        type_name: type_name.clone(),
                        id,
                        method: identity.clone(),
                        result: None,
                    },
                );
            }
        }

        if let Some(table) = &record.tags.table {
            let name = if table.is_empty() {
                &record.name
            } else {
                validate_name(table).map_err(|source| invalid_name("table", table, source))?;
                table
            };
            let existing = self.resolver.schema().record_tables.get(name);
            if let Some(existing) = existing
                && existing.type_name != type_name
            {
                return Err(DeclarationError::DuplicateTable {
                    name: name.clone(),
                    declaration,
                    location: record.location.clone(),
                    existing: existing.type_name.clone(),
                }
                .into());
            }
            debug!(table = %name, %declaration, "Collected table record");
            self.resolver.schema_mut().record_tables.insert(
                name.clone(),
                TableDef {
                    name: name.clone(),
                    type_name,
                    index_type: TABLE_INDEX_TYPE.to_string(),
                },
            );
        }

        Ok(())
    }

    /// Declaration in the contract class that introduces index binding `binding`: a member alias
    /// (directly or through a chain of aliases) or a data member of that type
    fn binding_in_contract(
        &self,
        binding: TypeId,
        contract: &RecordDecl,
    ) -> Option<SourceLocation> {
        let graph = self.graph;
        let reaches = |mut type_id: TypeId| {
            let mut visited = BTreeSet::new();
            loop {
                type_id = graph.strip_references(type_id);
                if type_id == binding {
                    return true;
                }
                if !visited.insert(type_id) {
                    return false;
                }
                match graph.type_descriptor(type_id) {
                    Some(TypeDescriptor::Alias { decl }) => match graph.alias(*decl) {
                        Some(alias) => {
                            type_id = alias.target;
                        }
                        None => {
                            return false;
                        }
                    },
                    _ => {
                        return false;
                    }
                }
            }
        };

        contract
            .members
            .iter()
            .filter_map(|&member| graph.alias(member))
            .find(|alias| reaches(alias.target))
            .map(|alias| alias.location.clone())
            .or_else(|| {
                contract
                    .fields
                    .iter()
                    .find(|field| reaches(field.ty))
                    .map(|field| field.location.clone())
            })
    }

    fn collect_index_binding(
        &mut self,
        binding: TypeId,
        contract_id: DeclId,
        contract: &RecordDecl,
    ) -> Result<(), AbigenError> {
        let graph = self.graph;
        let binding_location = self.binding_in_contract(binding, contract);
        let malformed = || DeclarationError::MalformedIndexBinding {
            binding: graph.display_type(binding),
            location: binding_location
                .clone()
                .unwrap_or_else(|| contract.location.clone()),
        };
        let table_value = graph.value_argument(binding, 0).ok_or_else(malformed)?;
        let record_type = graph.type_argument(binding, 1).ok_or_else(malformed)?;
        let (record_id, record) = graph.as_record(record_type).ok_or_else(malformed)?;

        let record_contract = self.record_contract(record);
        let location = match binding_location {
            Some(location) => {
                if let Some(owner) = record_contract
                    && owner != self.options.contract
                {
                    return Err(DeclarationError::ForeignRecord {
                        record: record.qualified_name.clone(),
                        owner,
                        contract: self.options.contract.clone(),
                        location: record.location.clone(),
                    }
                    .into());
                }
                location
            }
            None => {
                if record.tags.table.is_none()
                    || record_contract.as_deref() != Some(self.options.contract.as_str())
                {
                    debug!(
                        binding = %graph.display_type(binding),
                        %contract_id,
                        "Index binding doesn't belong to the contract, ignoring"
                    );
                    return Ok(());
                }
                record.location.clone()
            }
        };

        let name = name_to_string(table_value);
        let declaration = graph.display_type(binding);
        let type_name = self.resolve_for(record_type, &declaration, &location)?;

        if let Some(existing) = self.resolver.schema().tables.get(&name) {
            if existing.type_name != type_name {
                return Err(DeclarationError::DuplicateTable {
                    name,
                    declaration,
                    location,
                    existing: existing.type_name.clone(),
                }
                .into());
            }
            return Ok(());
        }

        debug!(table = %name, record = %type_name, "Collected index binding");
        self.resolver.schema_mut().tables.insert(
            name.clone(),
            TableDef {
                name: name.clone(),
                type_name: type_name.clone(),
                index_type: TABLE_INDEX_TYPE.to_string(),
            },
        );
        self.tables.push(TableBinding {
            name,
            record: record_id,
            type_name,
            index: unqualified_name(graph.template(binding).map_or("", |(name, _)| name))
                .to_string(),
            location,
        });

        Ok(())
    }
}
