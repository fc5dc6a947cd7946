use crate::analyzer::{Policy, ReadOnlyAnalyzer};
use crate::error::ReadOnlyError;
use ab_contracts_abigen::{Operation, OperationRole};
use ab_contracts_declarations::{
    Binding, CallGraph, DeclId, FunctionBody, SourceLocation, Statement,
};

fn operation(method_name: &str, read_only: bool) -> Operation {
    Operation {
        role: OperationRole::Action,
        name: method_name.to_string(),
        method: DeclId(10),
        method_name: method_name.to_string(),
        class: DeclId(1),
        class_name: "token".to_string(),
        class_path: "token".to_string(),
        parameters: Vec::new(),
        result: None,
        read_only,
        derives_base_contract: true,
        location: SourceLocation::new("token.cpp", 12, 5),
    }
}

fn call(callee: &str) -> Statement {
    Statement::Call {
        callee: callee.to_string(),
    }
}

#[test]
fn direct_violation() {
    let mut call_graph = CallGraph::default();
    call_graph
        .insert("token::get", vec![call("token::helper"), call("eosio::print")])
        .insert("token::helper", vec![call("token::save")])
        .insert(
            "token::save",
            vec![call("eosio::internal_use_do_not_use::db_store_i64")],
        );

    let analyzer = ReadOnlyAnalyzer::default();
    let violations = analyzer.check(&[operation("get", true)], &call_graph);
    assert_eq!(violations.len(), 1);

    let violation = &violations[0];
    assert_eq!(violation.operation, "get");
    assert_eq!(violation.function, "token::save");
    assert_eq!(violation.primitive, "db_store_i64");
    assert_eq!(
        violation.path,
        vec!["token::get", "token::helper", "token::save"]
    );
    assert_eq!(violation.location, SourceLocation::new("token.cpp", 12, 5));
    assert_eq!(
        violation.to_string(),
        "Read-only action `get` at token.cpp:12:5 calls state-modifying `db_store_i64` via \
        token::get -> token::helper -> token::save"
    );
}

#[test]
fn clean_and_non_read_only_operations() {
    let mut call_graph = CallGraph::default();
    call_graph
        .insert("token::get", vec![call("token::helper")])
        .insert("token::helper", vec![call("token::get"), call("eosio::print")])
        .insert("token::set", vec![call("db_store_i64")]);

    let analyzer = ReadOnlyAnalyzer::default();
    // Recursion terminates, mutation in non-read-only operation is fine
    assert!(
        analyzer
            .check(
                &[operation("get", true), operation("set", false)],
                &call_graph
            )
            .is_empty()
    );
    // Operation without body is opaque
    assert!(
        analyzer
            .check(&[operation("missing", true)], &call_graph)
            .is_empty()
    );
}

#[test]
fn violation_through_function_value() {
    let handler = Binding::Local("handler".to_string());
    let mut call_graph = CallGraph::default();
    call_graph
        .insert(
            "token::get",
            vec![
                Statement::Assign {
                    target: handler.clone(),
                    function: Some("token::save".to_string()),
                },
                Statement::IndirectCall {
                    through: handler.clone(),
                },
            ],
        )
        .insert(
            "token::peek",
            vec![
                Statement::Assign {
                    target: handler.clone(),
                    function: Some("token::save".to_string()),
                },
                Statement::Assign {
                    target: handler.clone(),
                    function: None,
                },
                Statement::IndirectCall {
                    through: handler.clone(),
                },
            ],
        );
    call_graph.functions.insert(
        "token::save".to_string(),
        FunctionBody {
            location: SourceLocation::new("token.cpp", 40, 1),
            statements: vec![call("kv_set")],
        },
    );

    let violations = ReadOnlyAnalyzer::default().check(
        &[operation("get", true), operation("peek", true)],
        &call_graph,
    );
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].operation, "get");
    assert_eq!(violations[0].primitive, "kv_set");
    assert_eq!(violations[0].path, vec!["token::get", "token::save"]);
    assert_eq!(violations[0].location, SourceLocation::new("token.cpp", 40, 1));
}

#[test]
fn violation_through_initializer() {
    let field = Binding::Field("token::handler".to_string());
    let mut call_graph = CallGraph::default();
    call_graph
        .insert(
            "token::get",
            vec![Statement::IndirectCall {
                through: field.clone(),
            }],
        )
        .initialize(field, "send_inline");

    let violations = ReadOnlyAnalyzer::default().check(&[operation("get", true)], &call_graph);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].primitive, "send_inline");
    assert_eq!(violations[0].path, vec!["token::get"]);
    assert_eq!(
        violations[0].to_string(),
        "Read-only action `get` at token.cpp:12:5 calls state-modifying `send_inline`"
    );
}

#[test]
fn custom_primitives() {
    let mut call_graph = CallGraph::default();
    call_graph.insert("token::get", vec![call("db_store_i64"), call("host::mutate")]);

    let violations = ReadOnlyAnalyzer::default()
        .with_mutating_primitives(["mutate"])
        .check(&[operation("get", true)], &call_graph);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].primitive, "mutate");
}

#[test]
fn policies() {
    let mut call_graph = CallGraph::default();
    call_graph
        .insert("token::get", vec![call("db_remove_i64")])
        .insert("token::peek", vec![call("db_update_i64")]);
    let operations = [operation("get", true), operation("peek", true)];

    let strict = ReadOnlyAnalyzer::default();
    assert_eq!(strict.policy(), Policy::Strict);
    match strict.enforce(&operations, &call_graph) {
        Err(ReadOnlyError::MutatingCall { violation, total }) => {
            assert_eq!(violation.operation, "get");
            assert_eq!(total, 2);
        }
        result => panic!("Unexpected result {result:?}"),
    }

    let violations = ReadOnlyAnalyzer::default()
        .with_policy(Policy::Lenient)
        .enforce(&operations, &call_graph)
        .unwrap();
    assert_eq!(violations.len(), 2);
}
