use crate::{
    AliasDecl, CallGraph, DeclId, Declaration, DeclarationGraph, Declarations, DeclarationsBuilder,
    SourceLocation, Statement, TemplateArgument, TypeDescriptor, TypeId,
};

#[test]
fn interning() {
    let mut builder = DeclarationsBuilder::new();
    let u64_a = builder.primitive("uint64_t");
    let u64_b = builder.primitive("uint64_t");
    let string = builder.primitive("std::string");
    assert_eq!(u64_a, u64_b);
    assert_ne!(u64_a, string);

    let vector_a = builder.template("std::vector", &[u64_a]);
    let vector_b = builder.template("std::vector", &[u64_b]);
    let vector_string = builder.template("std::vector", &[string]);
    assert_eq!(vector_a, vector_b);
    assert_ne!(vector_a, vector_string);

    // Distinct records with the same name are distinct types
    let (_, first) = builder.record("a::point");
    let (_, second) = builder.record("b::point");
    assert_ne!(first, second);
}

#[test]
fn desugar_and_records() {
    let mut builder = DeclarationsBuilder::new();
    let (contract, contract_type) = builder.record("token::token");
    let (account, account_type) = builder.nested_record("token::token::account", Some(contract));
    let alias = builder.alias("account_alias", account_type, Some(contract));
    let reference = builder.reference(alias);
    let name = builder.primitive("eosio::name");
    let method = builder
        .method(contract, "transfer")
        .param("from", name, "eosio::name")
        .action("")
        .finish();
    let graph = builder.build();

    assert_eq!(graph.desugar(reference), account_type);
    assert_eq!(graph.strip_references(reference), alias);
    let (decl_id, record) = graph.as_record(reference).unwrap();
    assert_eq!(decl_id, account);
    assert_eq!(record.name, "account");
    assert_eq!(record.parent, Some(contract));
    assert!(graph.as_record(name).is_none());
    assert_eq!(graph.display_type(reference), "&account_alias");
    assert_eq!(graph.display_type(contract_type), "token::token");

    // Nested record, alias and method were all registered as members, in order
    let contract_record = graph.record(contract).unwrap();
    assert_eq!(contract_record.members.len(), 3);
    assert_eq!(contract_record.members[0], account);
    assert_eq!(contract_record.members[2], method);
    assert_eq!(graph.method(method).unwrap().parameters[0].name, "from");
    assert!(graph.record(method).is_none());
}

fn alias(name: &str, target: u32) -> Declaration {
    Declaration::Alias(AliasDecl {
        name: name.to_string(),
        parent: None,
        target: TypeId(target),
        location: SourceLocation::default(),
    })
}

#[test]
fn cyclic_types_terminate() {
    let self_reference = Declarations {
        types: vec![TypeDescriptor::Reference { target: TypeId(0) }],
        declarations: Vec::new(),
    };
    assert_eq!(self_reference.try_strip_references(TypeId(0)), None);
    assert_eq!(self_reference.strip_references(TypeId(0)), TypeId(0));
    assert_eq!(self_reference.try_desugar(TypeId(0)), None);
    assert_eq!(self_reference.desugar(TypeId(0)), TypeId(0));
    assert!(self_reference.as_record(TypeId(0)).is_none());
    assert!(self_reference.template(TypeId(0)).is_none());
    assert_eq!(self_reference.display_type(TypeId(0)), "&type#0");

    // `a` and `b` alias each other through a reference
    let mutual_aliases = Declarations {
        types: vec![
            TypeDescriptor::Alias { decl: DeclId(0) },
            TypeDescriptor::Alias { decl: DeclId(1) },
            TypeDescriptor::Reference { target: TypeId(0) },
            TypeDescriptor::Template {
                name: "std::vector".to_string(),
                arguments: vec![TemplateArgument::Type(TypeId(3))],
                decl: None,
            },
        ],
        declarations: vec![alias("a", 1), alias("b", 2)],
    };
    assert_eq!(
        mutual_aliases.try_strip_references(TypeId(2)),
        Some(TypeId(0))
    );
    assert_eq!(mutual_aliases.try_desugar(TypeId(0)), None);
    assert_eq!(mutual_aliases.try_desugar(TypeId(2)), None);
    assert_eq!(mutual_aliases.desugar(TypeId(1)), TypeId(1));
    assert!(mutual_aliases.as_record(TypeId(1)).is_none());
    assert_eq!(mutual_aliases.display_type(TypeId(2)), "&a");
    // Template that is its own argument
    assert_eq!(
        mutual_aliases.display_type(TypeId(3)),
        "std::vector<type#3>"
    );
}

#[test]
fn template_arguments() {
    let mut builder = DeclarationsBuilder::new();
    let (_, row) = builder.record("row");
    let table = builder.template_with(
        "eosio::multi_index",
        vec![TemplateArgument::Value(42), TemplateArgument::Type(row)],
        None,
    );
    let graph = builder.build();

    assert_eq!(graph.value_argument(table, 0), Some(42));
    assert_eq!(graph.type_argument(table, 0), None);
    assert_eq!(graph.type_argument(table, 1), Some(row));
    assert_eq!(graph.display_type(table), "eosio::multi_index<42, row>");
}

#[test]
fn deserialize_from_front_end_json() {
    let json = r#"{
        "types": [
            { "kind": "primitive", "name": "int32_t" },
            { "kind": "record", "decl": 0 },
            { "kind": "template", "name": "std::vector", "arguments": [{ "type": 0 }] }
        ],
        "declarations": [
            {
                "kind": "record",
                "name": "point",
                "qualified_name": "geo::point",
                "fields": [
                    { "name": "x", "type": 0 },
                    { "name": "rest", "type": 2 }
                ],
                "tags": { "table": "" }
            }
        ]
    }"#;
    let graph = serde_json::from_str::<Declarations>(json).unwrap();

    let (_, record) = graph.as_record(crate::TypeId(1)).unwrap();
    assert_eq!(record.qualified_name, "geo::point");
    assert_eq!(record.fields.len(), 2);
    assert_eq!(record.tags.table.as_deref(), Some(""));
    assert!(!record.tags.read_only);
    assert_eq!(
        graph.type_descriptor(crate::TypeId(2)),
        Some(&TypeDescriptor::Template {
            name: "std::vector".to_string(),
            arguments: vec![TemplateArgument::Type(crate::TypeId(0))],
            decl: None,
        })
    );
}

#[test]
fn deserialize_call_graph() {
    let json = r#"{
        "functions": {
            "token::get": {
                "statements": [
                    {
                        "kind": "assign",
                        "target": { "kind": "local", "name": "f" },
                        "function": "db_store_i64"
                    },
                    { "kind": "indirect_call", "through": { "kind": "local", "name": "f" } },
                    { "kind": "call", "callee": "printf" }
                ]
            }
        }
    }"#;
    let call_graph = serde_json::from_str::<CallGraph>(json).unwrap();
    let body = &call_graph.functions["token::get"];
    assert_eq!(body.statements.len(), 3);
    assert_eq!(
        body.statements[2],
        Statement::Call {
            callee: "printf".to_string()
        }
    );
}
