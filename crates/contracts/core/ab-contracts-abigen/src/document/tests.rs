use crate::document::{GENERATED_COMMENT, assemble, root_type_name};
use crate::error::AbigenError;
use crate::schema::{
    AbiVersion, ActionDef, CallDef, FieldDef, MethodIdentity, Schema, StructDef, TableDef,
};

fn method(name: &str) -> MethodIdentity {
    MethodIdentity {
        class: "demo::token".to_string(),
        method: Some(name.to_string()),
    }
}

fn add_struct(schema: &mut Schema, name: &str, base: Option<&str>, fields: &[(&str, &str)]) {
    schema.structs.insert(
        name.to_string(),
        StructDef {
            name: name.to_string(),
            base: base.map(str::to_string),
            fields: fields
                .iter()
                .map(|(name, type_name)| FieldDef::new(*name, *type_name))
                .collect(),
        },
    );
}

fn add_action(schema: &mut Schema, name: &str, result: Option<&str>) {
    schema.actions.insert(
        name.to_string(),
        ActionDef {
            name: name.to_string(),
            type_name: name.to_string(),
            ricardian_contract: String::new(),
            method: method(name),
            result: result.map(str::to_string),
        },
    );
}

fn table(name: &str, type_name: &str) -> TableDef {
    TableDef {
        name: name.to_string(),
        type_name: type_name.to_string(),
        index_type: "i64".to_string(),
    }
}

#[test]
fn suffixes() {
    assert_eq!(root_type_name("int32"), "int32");
    assert_eq!(root_type_name("account[]"), "account");
    assert_eq!(root_type_name("account?"), "account");
    assert_eq!(root_type_name("account$"), "account");
    assert_eq!(root_type_name("account[4]"), "account");
    assert_eq!(root_type_name("account[4][]?"), "account");
    assert_eq!(root_type_name("pair_name_int32[]"), "pair_name_int32");
}

#[test]
fn transfer_document() {
    let mut schema = Schema::default();
    add_struct(
        &mut schema,
        "transfer",
        None,
        &[
            ("from", "name"),
            ("to", "name"),
            ("quantity", "asset"),
            ("memo", "string"),
        ],
    );
    add_action(&mut schema, "transfer", None);

    let document = assemble(&schema).unwrap();
    let json = serde_json::to_value(&document).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "____comment": GENERATED_COMMENT,
            "version": "eosio::abi/1.2",
            "structs": [{
                "name": "transfer",
                "base": "",
                "fields": [
                    {"name": "from", "type": "name"},
                    {"name": "to", "type": "name"},
                    {"name": "quantity", "type": "asset"},
                    {"name": "memo", "type": "string"},
                ],
            }],
            "types": [],
            "actions": [{"name": "transfer", "type": "transfer", "ricardian_contract": ""}],
            "tables": [],
            "ricardian_clauses": [],
            "variants": [],
            "abi_extensions": [],
            "action_results": [],
        })
    );
}

#[test]
fn key_order() {
    let mut schema = Schema::default();
    add_struct(&mut schema, "getbal", None, &[]);
    add_action(&mut schema, "getbal", None);
    schema.calls.insert(
        "getbal".to_string(),
        CallDef {
            name: "getbal".to_string(),
            type_name: "getbal".to_string(),
            id: 1,
            method: method("getbal"),
            result: Some("uint64".to_string()),
        },
    );

    let json = assemble(&schema).unwrap().to_json_pretty().unwrap();
    let keys = [
        "\"____comment\"",
        "\"version\"",
        "\"structs\"",
        "\"types\"",
        "\"actions\"",
        "\"calls\"",
        "\"call_results\"",
        "\"tables\"",
        "\"ricardian_clauses\"",
        "\"variants\"",
        "\"abi_extensions\"",
        "\"action_results\"",
    ]
    .map(|key| json.find(key).unwrap());
    assert!(keys.is_sorted(), "{json}");
    assert!(json.contains("\"version\": \"eosio::abi/1.3\""), "{json}");
    assert!(json.starts_with("{\n    \"____comment\""), "{json}");
}

#[test]
fn calls_absent_below_sync_calls_version() {
    let mut schema = Schema::default();
    add_struct(&mut schema, "open", None, &[]);
    add_action(&mut schema, "open", None);

    let document = assemble(&schema).unwrap();
    assert_eq!(document.version, AbiVersion::BASE.to_string());
    assert!(document.calls.is_none());
    assert!(document.call_results.is_none());
    assert_eq!(document.action_results, Some(Vec::new()));
}

#[test]
fn orphans_are_dropped() {
    let mut schema = Schema::default();
    add_struct(&mut schema, "open", None, &[("owner", "owner_t"), ("data", "payload[]")]);
    add_struct(&mut schema, "payload", Some("header"), &[("value", "variant_int32_note")]);
    add_struct(&mut schema, "header", None, &[]);
    add_struct(&mut schema, "note", None, &[]);
    add_struct(&mut schema, "orphan", None, &[("value", "orphan_t")]);
    schema
        .typedefs
        .insert("owner_t".to_string(), "name".to_string());
    schema
        .typedefs
        .insert("orphan_t".to_string(), "uint64".to_string());
    schema.variants.insert(
        "variant_int32_note".to_string(),
        vec!["int32".to_string(), "note".to_string()],
    );
    add_action(&mut schema, "open", None);

    let document = assemble(&schema).unwrap();

    assert_eq!(
        document
            .structs
            .iter()
            .map(|definition| definition.name.as_str())
            .collect::<Vec<_>>(),
        ["header", "note", "open", "payload"]
    );
    assert_eq!(document.types.len(), 1);
    assert_eq!(document.types[0].new_type_name, "owner_t");
    assert_eq!(document.variants.len(), 1);
    assert_eq!(document.structs[3].base, "header");
}

#[test]
fn results_and_tables_are_roots() {
    let mut schema = Schema::default();
    add_struct(&mut schema, "open", None, &[]);
    add_struct(&mut schema, "balance", None, &[("amount", "asset")]);
    add_struct(&mut schema, "account", None, &[("balance", "asset")]);
    add_struct(&mut schema, "stat", None, &[("supply", "asset")]);
    add_action(&mut schema, "open", Some("balance"));
    schema
        .tables
        .insert("accounts".to_string(), table("accounts", "account"));
    // Coalesced with the index binding above
    schema
        .record_tables
        .insert("account".to_string(), table("account", "account"));
    schema
        .record_tables
        .insert("stat".to_string(), table("stat", "stat"));

    let document = assemble(&schema).unwrap();

    assert_eq!(document.structs.len(), 4);
    assert_eq!(
        document
            .tables
            .iter()
            .map(|table| (table.name.as_str(), table.type_name.as_str()))
            .collect::<Vec<_>>(),
        [("accounts", "account"), ("stat", "stat")]
    );
    assert_eq!(document.action_results.unwrap()[0].result_type, "balance");
}

#[test]
fn dangling_type() {
    let mut schema = Schema::default();
    add_struct(&mut schema, "open", None, &[("owner", "missing[]")]);
    add_action(&mut schema, "open", None);

    assert_eq!(
        assemble(&schema).unwrap_err(),
        AbigenError::DanglingType {
            type_name: "missing[]".to_string(),
            referenced_by: "open.owner".to_string(),
        }
    );
}

#[test]
fn deterministic() {
    let mut schema = Schema::default();
    for name in ["open", "close", "transfer"] {
        add_struct(&mut schema, name, None, &[("owner", "name")]);
        add_action(&mut schema, name, None);
    }

    let first = assemble(&schema).unwrap().to_json_pretty().unwrap();
    let second = assemble(&schema.clone()).unwrap().to_json_pretty().unwrap();
    assert_eq!(first, second);
}
