use crate::error::ResolveError;
use crate::resolver::TypeResolver;
use crate::schema::{AbiVersion, FieldDef, StructDef};
use ab_contracts_declarations::{
    AliasDecl, DeclId, Declaration, Declarations, DeclarationsBuilder, SourceLocation,
    TemplateArgument, TypeDescriptor, TypeId,
};

fn fields(pairs: &[(&str, &str)]) -> Vec<FieldDef> {
    pairs
        .iter()
        .map(|(name, type_name)| FieldDef::new(*name, *type_name))
        .collect()
}

#[test]
fn primitives() {
    let mut builder = DeclarationsBuilder::new();
    let spellings = [
        ("uint64_t", "uint64"),
        ("u64", "uint64"),
        ("eosio::name", "name"),
        ("std::string", "string"),
        ("String", "string"),
        ("unsigned char", "uint8"),
        ("double", "float64"),
        ("eosio::block_timestamp", "block_timestamp_type"),
        ("eosio::asset", "asset"),
    ]
    .map(|(spelling, expected)| (builder.primitive(spelling), expected));
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    for (type_id, expected) in spellings {
        assert_eq!(resolver.resolve(type_id).unwrap(), expected);
    }
    assert!(resolver.schema().structs.is_empty());
    assert!(resolver.schema().typedefs.is_empty());
    assert_eq!(resolver.schema().version, AbiVersion::BASE);
}

#[test]
fn unsupported_primitive() {
    let mut builder = DeclarationsBuilder::new();
    let function_pointer = builder.primitive("void (*)(int)");
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(
        resolver.resolve(function_pointer),
        Err(ResolveError::UnsupportedType {
            type_name: "void (*)(int)".to_string()
        })
    );
}

#[test]
fn record_fields_keep_declaration_order() {
    let mut builder = DeclarationsBuilder::new();
    let int32 = builder.primitive("int32_t");
    let string = builder.primitive("std::string");
    let (record, record_type) = builder.record("demo::record");
    builder.field(record, "b", string).field(record, "a", int32);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(record_type).unwrap(), "record");
    assert_eq!(
        resolver.schema().structs["record"],
        StructDef {
            name: "record".to_string(),
            base: None,
            fields: fields(&[("b", "string"), ("a", "int32")]),
        }
    );
}

#[test]
fn idempotent_resolution() {
    let mut builder = DeclarationsBuilder::new();
    let uint64 = builder.primitive("uint64_t");
    let (inner, inner_type) = builder.record("inner");
    builder.field(inner, "value", uint64);
    // Diamond: two fields reach `inner`, one of them through a reference
    let (outer, outer_type) = builder.record("outer");
    let inner_ref = builder.reference(inner_type);
    builder
        .field(outer, "left", inner_type)
        .field(outer, "right", inner_ref);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(outer_type).unwrap(), "outer");
    let schema = resolver.schema().clone();
    assert_eq!(resolver.resolve(outer_type).unwrap(), "outer");
    assert_eq!(resolver.resolve(inner_ref).unwrap(), "inner");
    assert_eq!(resolver.schema(), &schema);
    assert_eq!(schema.structs.len(), 2);
}

#[test]
fn recursive_record() {
    let mut builder = DeclarationsBuilder::new();
    let (node, node_type) = builder.record("node");
    let children = builder.template("std::vector", &[node_type]);
    builder.field(node, "children", children);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(node_type).unwrap(), "node");
    assert_eq!(
        resolver.schema().structs["node"].fields,
        fields(&[("children", "node[]")])
    );
}

#[test]
fn single_base_only() {
    let mut builder = DeclarationsBuilder::new();
    let uint8 = builder.primitive("uint8_t");
    let (base, base_type) = builder.record("base");
    builder.field(base, "flag", uint8);
    let (other, other_type) = builder.record("other");
    builder.field(other, "flag", uint8);
    let (single, single_type) = builder.record("single");
    builder.base(single, base_type);
    let (double, double_type) = builder.record("double");
    builder.base(double, base_type).base(double, other_type);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    resolver.resolve(single_type).unwrap();
    resolver.resolve(double_type).unwrap();
    let schema = resolver.schema();
    assert_eq!(schema.structs["single"].base.as_deref(), Some("base"));
    assert!(schema.structs.contains_key("base"));
    assert_eq!(schema.structs["double"].base, None);
    assert!(!schema.structs.contains_key("other"));
}

#[test]
fn containers() {
    let mut builder = DeclarationsBuilder::new();
    let int32 = builder.primitive("int32_t");
    let uint8 = builder.primitive("uint8_t");
    let name = builder.primitive("eosio::name");
    let sequence = builder.template("std::vector", &[int32]);
    let set = builder.template("std::set", &[name]);
    let optional = builder.template("std::optional", &[int32]);
    let extension = builder.template("eosio::binary_extension", &[int32]);
    let ignored = builder.template("eosio::ignore", &[name]);
    let bytes = builder.template("std::vector", &[uint8]);
    let map = builder.template("std::map", &[name, int32]);
    let pair = builder.template("std::pair", &[int32, name]);
    let tuple = builder.template("std::tuple", &[int32, name, int32]);
    let variant = builder.template("std::variant", &[int32, name]);
    let array = builder.template_with(
        "std::array",
        vec![TemplateArgument::Type(int32), TemplateArgument::Value(4)],
        None,
    );
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(sequence).unwrap(), "int32[]");
    assert_eq!(resolver.resolve(set).unwrap(), "name[]");
    assert_eq!(resolver.resolve(optional).unwrap(), "int32?");
    assert_eq!(resolver.resolve(extension).unwrap(), "int32$");
    assert_eq!(resolver.resolve(ignored).unwrap(), "name");
    assert_eq!(resolver.resolve(bytes).unwrap(), "bytes");
    assert_eq!(resolver.resolve(map).unwrap(), "pair_name_int32[]");
    assert_eq!(resolver.resolve(pair).unwrap(), "pair_int32_name");
    assert_eq!(resolver.resolve(tuple).unwrap(), "tuple_int32_name_int32");
    assert_eq!(resolver.resolve(variant).unwrap(), "variant_int32_name");
    assert_eq!(resolver.resolve(array).unwrap(), "int32[4]");

    let schema = resolver.schema();
    assert_eq!(
        schema.structs["pair_name_int32"].fields,
        fields(&[("first", "name"), ("second", "int32")])
    );
    assert_eq!(
        schema.structs["tuple_int32_name_int32"].fields,
        fields(&[("field_0", "int32"), ("field_1", "name"), ("field_2", "int32")])
    );
    assert_eq!(
        schema.variants["variant_int32_name"],
        vec!["int32".to_string(), "name".to_string()]
    );
    // Single-argument containers are structural markers, not named types
    assert_eq!(schema.structs.len(), 3);
    assert!(schema.typedefs.is_empty());
}

#[test]
fn rust_spellings() {
    let mut builder = DeclarationsBuilder::new();
    let uint64 = builder.primitive("u64");
    let string = builder.primitive("String");
    let sequence = builder.template("Vec", &[uint64]);
    let optional = builder.template("Option", &[string]);
    let map = builder.template("std::collections::BTreeMap", &[string, uint64]);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(sequence).unwrap(), "uint64[]");
    assert_eq!(resolver.resolve(optional).unwrap(), "string?");
    assert_eq!(resolver.resolve(map).unwrap(), "pair_string_uint64[]");
}

#[test]
fn nested_containers() {
    let mut builder = DeclarationsBuilder::new();
    let int32 = builder.primitive("int32_t");
    let plain = builder.template("std::vector", &[int32]);
    let optional = builder.template("std::optional", &[int32]);
    let nested = builder.template("std::vector", &[optional]);
    // Same shape spelled through a different front end instantiation
    let nested_again = builder.template("Vec", &[optional]);
    let deep = builder.template("std::vector", &[nested]);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(plain).unwrap(), "int32[]");
    assert_eq!(resolver.resolve(nested).unwrap(), "B_optional_int32_E[]");
    assert_eq!(resolver.resolve(nested).unwrap(), "B_optional_int32_E[]");
    assert_eq!(
        resolver.resolve(nested_again).unwrap(),
        "B_optional_int32_E[]"
    );
    assert_eq!(
        resolver.resolve(deep).unwrap(),
        "B_vector_B_optional_int32_E_E[]"
    );

    let typedefs = &resolver.schema().typedefs;
    assert_eq!(typedefs.len(), 2);
    assert_eq!(typedefs["B_optional_int32_E"], "int32?");
    assert_eq!(typedefs["B_vector_B_optional_int32_E_E"], "B_optional_int32_E[]");
}

#[test]
fn nested_map() {
    let mut builder = DeclarationsBuilder::new();
    let name = builder.primitive("eosio::name");
    let uint64 = builder.primitive("uint64_t");
    let amounts = builder.template("std::vector", &[uint64]);
    let map = builder.template("std::map", &[name, amounts]);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(
        resolver.resolve(map).unwrap(),
        "pair_name_B_vector_uint64_E[]"
    );
    let schema = resolver.schema();
    assert_eq!(schema.typedefs["B_vector_uint64_E"], "uint64[]");
    assert_eq!(
        schema.structs["pair_name_B_vector_uint64_E"].fields,
        fields(&[("first", "name"), ("second", "B_vector_uint64_E")])
    );
}

#[test]
fn aliases() {
    let mut builder = DeclarationsBuilder::new();
    let uint64 = builder.primitive("uint64_t");
    let (record, record_type) = builder.record("balance");
    let amount = builder.alias("amount_t", uint64, None);
    builder.field(record, "amount", amount);
    let balance_alias = builder.alias("balance_alias", record_type, None);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(balance_alias).unwrap(), "balance_alias");
    let schema = resolver.schema();
    assert_eq!(schema.typedefs["balance_alias"], "balance");
    assert_eq!(schema.typedefs["amount_t"], "uint64");
    assert_eq!(
        schema.structs["balance"].fields,
        fields(&[("amount", "amount_t")])
    );
}

#[test]
fn user_template() {
    let mut builder = DeclarationsBuilder::new();
    let uint64 = builder.primitive("uint64_t");
    let (wrapper, _) = builder.record("wrapper");
    builder.field(wrapper, "value", uint64);
    let instance = builder.template_with(
        "demo::wrapper",
        vec![TemplateArgument::Type(uint64)],
        Some(wrapper),
    );
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(instance).unwrap(), "wrapper_uint64");
    assert_eq!(
        resolver.schema().structs["wrapper_uint64"].fields,
        fields(&[("value", "uint64")])
    );
}

#[test]
fn transaction_extensions() {
    let mut builder = DeclarationsBuilder::new();
    let uint32 = builder.primitive("uint32_t");
    let opaque = builder.primitive("extensions_type");
    let (record, record_type) = builder.record("transaction_header");
    builder
        .field(record, "expiration", uint32)
        .field(record, "transaction_extensions", opaque);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    resolver.resolve(record_type).unwrap();
    let schema = resolver.schema();
    assert_eq!(
        schema.structs["transaction_header"].fields,
        fields(&[
            ("expiration", "uint32"),
            ("transaction_extensions", "extension[]")
        ])
    );
    assert_eq!(
        schema.structs["extension"].fields,
        fields(&[("type", "uint16"), ("data", "bytes")])
    );
}

#[test]
fn bitset_raises_version() {
    let mut builder = DeclarationsBuilder::new();
    let bitset = builder.primitive("eosio::bitset");
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(bitset).unwrap(), "bitset");
    assert_eq!(resolver.schema().version, AbiVersion::SYNC_CALLS);
}

#[test]
fn name_collision() {
    let mut builder = DeclarationsBuilder::new();
    let int32 = builder.primitive("int32_t");
    let (first, first_type) = builder.record("a::point");
    builder.field(first, "x", int32);
    let (second, second_type) = builder.record("b::point");
    builder.field(second, "x", int32);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    resolver.resolve(first_type).unwrap();
    assert_eq!(
        resolver.resolve(second_type),
        Err(ResolveError::NameCollision {
            name: "point".to_string(),
            existing: "a::point".to_string(),
            new: "b::point".to_string(),
        })
    );
}

#[test]
fn missing_template_argument() {
    let mut builder = DeclarationsBuilder::new();
    let int32 = builder.primitive("int32_t");
    let broken_map = builder.template("std::map", &[int32]);
    let graph = builder.build();

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(
        resolver.resolve(broken_map),
        Err(ResolveError::MissingTemplateArgument {
            template: "std::map<int32_t>".to_string(),
            index: 1,
        })
    );
}

#[test]
fn cyclic_types() {
    let cyclic = |type_name: &str| {
        Err(ResolveError::CyclicType {
            type_name: type_name.to_string(),
        })
    };
    let alias = |name: &str, target: u32| {
        Declaration::Alias(AliasDecl {
            name: name.to_string(),
            parent: None,
            target: TypeId(target),
            location: SourceLocation::default(),
        })
    };
    let graph = Declarations {
        types: vec![
            TypeDescriptor::Reference { target: TypeId(0) },
            TypeDescriptor::Alias { decl: DeclId(0) },
            TypeDescriptor::Alias { decl: DeclId(1) },
            TypeDescriptor::Reference { target: TypeId(1) },
            TypeDescriptor::Template {
                name: "std::vector".to_string(),
                arguments: vec![TemplateArgument::Type(TypeId(4))],
                decl: None,
            },
            TypeDescriptor::Template {
                name: "std::pair".to_string(),
                arguments: vec![
                    TemplateArgument::Type(TypeId(5)),
                    TemplateArgument::Type(TypeId(6)),
                ],
                decl: None,
            },
            TypeDescriptor::Primitive {
                name: "uint64_t".to_string(),
            },
        ],
        declarations: vec![alias("first", 2), alias("second", 3)],
    };

    let mut resolver = TypeResolver::new(&graph);
    assert_eq!(resolver.resolve(TypeId(0)), cyclic("&type#0"));
    assert_eq!(resolver.resolve(TypeId(1)), cyclic("first"));
    assert_eq!(resolver.resolve(TypeId(3)), cyclic("first"));
    assert_eq!(resolver.resolve(TypeId(4)), cyclic("std::vector<type#4>"));
    assert_eq!(
        resolver.resolve(TypeId(5)),
        cyclic("std::pair<type#5, uint64_t>")
    );

    // Failed resolutions leave the resolver usable
    assert_eq!(resolver.resolve(TypeId(6)).unwrap(), "uint64");
    assert!(resolver.schema().typedefs.is_empty());
    assert!(resolver.schema().structs.is_empty());
}
