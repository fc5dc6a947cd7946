//! Programmatic construction of [`Declarations`]

use crate::decls::{
    AliasDecl, Declaration, FieldDecl, MethodDecl, ParameterDecl, RecordDecl, Redeclaration, Tags,
};
use crate::graph::Declarations;
use crate::types::{TemplateArgument, TypeDescriptor};
use crate::{DeclId, SourceLocation, TypeId};
use std::collections::HashMap;

/// Builder for [`Declarations`].
///
/// Type descriptors are interned the same way a front end canonicalizes types: requesting the same
/// primitive or template instantiation twice returns the same [`TypeId`].
#[derive(Debug, Default)]
pub struct DeclarationsBuilder {
    declarations: Declarations,
    interned: HashMap<TypeDescriptor, TypeId>,
}

impl DeclarationsBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, descriptor: TypeDescriptor) -> TypeId {
        if let Some(type_id) = self.interned.get(&descriptor) {
            return *type_id;
        }

        let type_id = TypeId(self.declarations.types.len() as u32);
        self.declarations.types.push(descriptor.clone());
        self.interned.insert(descriptor, type_id);
        type_id
    }

    fn push_declaration(&mut self, declaration: Declaration) -> DeclId {
        let decl_id = DeclId(self.declarations.declarations.len() as u32);
        self.declarations.declarations.push(declaration);
        decl_id
    }

    fn add_member(&mut self, parent: Option<DeclId>, member: DeclId) {
        if let Some(parent) = parent
            && let Some(Declaration::Record(record)) =
                self.declarations.declarations.get_mut(parent.0 as usize)
        {
            record.members.push(member);
        }
    }

    /// Built-in type by its source spelling
    pub fn primitive(&mut self, name: &str) -> TypeId {
        self.intern(TypeDescriptor::Primitive {
            name: name.to_string(),
        })
    }

    /// Template instantiation with type arguments only
    pub fn template(&mut self, name: &str, arguments: &[TypeId]) -> TypeId {
        let arguments = arguments
            .iter()
            .copied()
            .map(TemplateArgument::Type)
            .collect();
        self.template_with(name, arguments, None)
    }

    /// Template instantiation with arbitrary arguments and optional instantiated record
    pub fn template_with(
        &mut self,
        name: &str,
        arguments: Vec<TemplateArgument>,
        decl: Option<DeclId>,
    ) -> TypeId {
        self.intern(TypeDescriptor::Template {
            name: name.to_string(),
            arguments,
            decl,
        })
    }

    /// Pointer/reference wrapper around `target`
    pub fn reference(&mut self, target: TypeId) -> TypeId {
        self.intern(TypeDescriptor::Reference { target })
    }

    /// Declare a record, returns its declaration and the type naming it
    pub fn record(&mut self, qualified_name: &str) -> (DeclId, TypeId) {
        self.nested_record(qualified_name, None)
    }

    /// Declare a record nested in `parent`
    pub fn nested_record(
        &mut self,
        qualified_name: &str,
        parent: Option<DeclId>,
    ) -> (DeclId, TypeId) {
        let name = crate::types::unqualified_name(qualified_name).to_string();
        let decl_id = self.push_declaration(Declaration::Record(RecordDecl {
            name,
            qualified_name: qualified_name.to_string(),
            location: SourceLocation::default(),
            parent,
            bases: Vec::new(),
            fields: Vec::new(),
            members: Vec::new(),
            tags: Tags::default(),
        }));
        self.add_member(parent, decl_id);
        let type_id = self.intern(TypeDescriptor::Record { decl: decl_id });
        (decl_id, type_id)
    }

    /// Mutable access to a record declared earlier.
    ///
    /// # Panics
    /// If `decl_id` doesn't refer to a record.
    pub fn record_mut(&mut self, decl_id: DeclId) -> &mut RecordDecl {
        match self.declarations.declarations.get_mut(decl_id.0 as usize) {
            Some(Declaration::Record(record)) => record,
            _ => panic!("{decl_id} is not a record declaration"),
        }
    }

    /// Append a data member to a record
    pub fn field(&mut self, record: DeclId, name: &str, ty: TypeId) -> &mut Self {
        self.record_mut(record).fields.push(FieldDecl {
            name: name.to_string(),
            ty,
            location: SourceLocation::default(),
        });
        self
    }

    /// Append a direct base class to a record
    pub fn base(&mut self, record: DeclId, base: TypeId) -> &mut Self {
        self.record_mut(record).bases.push(base);
        self
    }

    /// Declare an alias, optionally as a member of `parent`
    pub fn alias(&mut self, name: &str, target: TypeId, parent: Option<DeclId>) -> TypeId {
        let decl_id = self.push_declaration(Declaration::Alias(AliasDecl {
            name: name.to_string(),
            parent,
            target,
            location: SourceLocation::default(),
        }));
        self.add_member(parent, decl_id);
        self.intern(TypeDescriptor::Alias { decl: decl_id })
    }

    /// Start declaring a method of `parent`
    pub fn method(&mut self, parent: DeclId, name: &str) -> MethodBuilder<'_> {
        MethodBuilder {
            builder: self,
            method: MethodDecl {
                name: name.to_string(),
                parent,
                location: SourceLocation::default(),
                parameters: Vec::new(),
                result: None,
                tags: Tags::default(),
                redeclarations: Vec::new(),
            },
        }
    }

    /// Finish building
    pub fn build(self) -> Declarations {
        self.declarations
    }
}

/// Builder of a single method, created by [`DeclarationsBuilder::method()`]
#[derive(Debug)]
#[must_use = "Method is only added to the graph once `finish()` is called"]
pub struct MethodBuilder<'a> {
    builder: &'a mut DeclarationsBuilder,
    method: MethodDecl,
}

impl MethodBuilder<'_> {
    /// Append a parameter
    pub fn param(mut self, name: &str, ty: TypeId, spelling: &str) -> Self {
        self.method.parameters.push(ParameterDecl {
            name: name.to_string(),
            ty,
            spelling: spelling.to_string(),
        });
        self
    }

    /// Set non-void return type
    pub fn result(mut self, ty: TypeId) -> Self {
        self.method.result = Some(ty);
        self
    }

    /// Set annotations
    pub fn tags(mut self, tags: Tags) -> Self {
        self.method.tags = tags;
        self
    }

    /// Tag as action, empty name means method name
    pub fn action(mut self, name: &str) -> Self {
        self.method.tags.action = Some(name.to_string());
        self
    }

    /// Tag as synchronous call, empty name means method name
    pub fn call(mut self, name: &str) -> Self {
        self.method.tags.call = Some(name.to_string());
        self
    }

    /// Tag as notification handler for `code::action`
    pub fn notify(mut self, target: &str) -> Self {
        self.method.tags.notify = Some(target.to_string());
        self
    }

    /// Tag as read-only
    pub fn read_only(mut self) -> Self {
        self.method.tags.read_only = true;
        self
    }

    /// Set source location
    pub fn location(mut self, location: SourceLocation) -> Self {
        self.method.location = location;
        self
    }

    /// Add another declaration of the same method with its own annotations
    pub fn redeclaration(mut self, location: SourceLocation, tags: Tags) -> Self {
        self.method
            .redeclarations
            .push(Redeclaration { location, tags });
        self
    }

    /// Add the method to the graph and to its parent's members
    pub fn finish(self) -> DeclId {
        let parent = self.method.parent;
        let decl_id = self
            .builder
            .push_declaration(Declaration::Method(self.method));
        self.builder.add_member(Some(parent), decl_id);
        decl_id
    }
}
