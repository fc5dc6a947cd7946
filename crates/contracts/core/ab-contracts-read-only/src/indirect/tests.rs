use crate::indirect::{IndirectCallResolver, LastAssignment};
use ab_contracts_declarations::{Binding, CallGraph, Statement};

fn assign(target: Binding, function: Option<&str>) -> Statement {
    Statement::Assign {
        target,
        function: function.map(str::to_string),
    }
}

#[test]
fn last_assignment_wins() {
    let handler = Binding::Local("handler".to_string());
    let mut call_graph = CallGraph::default();
    call_graph.insert(
        "token::get",
        vec![
            assign(handler.clone(), Some("token::log")),
            Statement::IndirectCall {
                through: handler.clone(),
            },
            assign(handler.clone(), Some("token::save")),
            Statement::IndirectCall {
                through: handler.clone(),
            },
            assign(handler.clone(), None),
            Statement::IndirectCall {
                through: handler.clone(),
            },
        ],
    );

    let resolve = |position| LastAssignment.resolve(&call_graph, "token::get", position, &handler);
    assert_eq!(resolve(1).as_deref(), Some("token::log"));
    assert_eq!(resolve(3).as_deref(), Some("token::save"));
    // Unknown value assigned
    assert_eq!(resolve(5), None);
    // Nothing assigned yet
    assert_eq!(resolve(0), None);
}

#[test]
fn initializers() {
    let field = Binding::Field("token::handler".to_string());
    let global = Binding::Global("handler".to_string());
    let mut call_graph = CallGraph::default();
    call_graph
        .insert(
            "token::get",
            vec![
                Statement::IndirectCall {
                    through: field.clone(),
                },
                assign(global.clone(), Some("token::log")),
                Statement::IndirectCall {
                    through: global.clone(),
                },
            ],
        )
        .initialize(field.clone(), "token::save")
        .initialize(global.clone(), "token::save");

    assert_eq!(
        LastAssignment
            .resolve(&call_graph, "token::get", 0, &field)
            .as_deref(),
        Some("token::save")
    );
    assert_eq!(
        LastAssignment
            .resolve(&call_graph, "token::get", 2, &global)
            .as_deref(),
        Some("token::log")
    );
    // Locals never fall back to initializers
    assert_eq!(
        LastAssignment.resolve(
            &call_graph,
            "token::get",
            0,
            &Binding::Local("token::handler".to_string())
        ),
        None
    );
}
