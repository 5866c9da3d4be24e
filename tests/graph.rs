//! Tests for loading flow definitions into typed graphs.
mod common;
use common::{definition, edge, node, text_message};
use roteiro::graph::{InputKind, MediaKind, ValidationKind};
use roteiro::prelude::*;
use serde_json::json;

fn load(nodes: Vec<FlowNodeDefinition>, edges: Vec<FlowEdgeDefinition>) -> Result<FlowGraph, FlowLoadError> {
    FlowGraph::builder(definition(nodes, edges)).build()
}

#[test]
fn test_load_typed_nodes() {
    let graph = load(
        vec![
            node("s", "start", json!(null)),
            node(
                "q",
                "question",
                json!({ "questionText": "CPF?", "variableName": "cpf", "inputKind": "document-a" }),
            ),
            node(
                "img",
                "message",
                json!({ "mediaKind": "image", "mediaRef": "https://cdn/x.png", "caption": "Menu" }),
            ),
        ],
        vec![edge("s", "q", None), edge("q", "img", None)],
    )
    .unwrap();

    assert_eq!(graph.start_node_id(), "s");
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.id(), Some("test-flow"));

    match &graph.node("q").unwrap().kind {
        NodeKind::Question(config) => {
            assert_eq!(config.input_kind, InputKind::DocumentA);
            assert_eq!(config.effective_validation(), ValidationKind::DocumentA);
            assert!(!config.use_validation_error_edge);
        }
        other => panic!("expected a question node, got {:?}", other),
    }
    match &graph.node("img").unwrap().kind {
        NodeKind::Message(config) => assert_eq!(config.media_kind, MediaKind::Image),
        other => panic!("expected a message node, got {:?}", other),
    }
}

#[test]
fn test_missing_and_multiple_start_nodes() {
    let err = load(vec![node("m", "message", text_message("hi"))], vec![]).unwrap_err();
    assert!(matches!(err, FlowLoadError::MissingStartNode));

    let err = load(
        vec![node("a", "start", json!(null)), node("b", "startNode", json!(null))],
        vec![],
    )
    .unwrap_err();
    assert!(matches!(err, FlowLoadError::MultipleStartNodes { ref first, ref second } if first == "a" && second == "b"));
}

#[test]
fn test_unknown_type_and_invalid_config() {
    let err = load(
        vec![node("s", "start", json!(null)), node("x", "carousel", json!({}))],
        vec![],
    )
    .unwrap_err();
    assert!(matches!(err, FlowLoadError::InvalidNodeType { ref type_name, .. } if type_name == "carousel"));

    // A question without a variable name is rejected at load time.
    let err = load(
        vec![
            node("s", "start", json!(null)),
            node("q", "question", json!({ "questionText": "Nome?" })),
        ],
        vec![],
    )
    .unwrap_err();
    match err {
        FlowLoadError::InvalidNodeConfig { node_id, message, .. } => {
            assert_eq!(node_id, "q");
            assert!(message.contains("variableName"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_schedule_with_mixed_worked_day_flags_is_rejected() {
    let err = load(
        vec![
            node("s", "start", json!(null)),
            node(
                "h",
                "scheduleCheck",
                json!({ "entries": [
                    { "weekday": "monday", "start": "08:00", "end": "12:00" },
                    { "weekday": "monday", "start": "13:00", "end": "18:00", "workedDay": false }
                ]}),
            ),
        ],
        vec![],
    )
    .unwrap_err();
    assert!(matches!(err, FlowLoadError::InvalidNodeConfig { ref node_id, .. } if node_id == "h"));
}

#[test]
fn test_edge_to_unknown_node() {
    let err = load(
        vec![node("s", "start", json!(null))],
        vec![edge("s", "ghost", None)],
    )
    .unwrap_err();
    assert!(matches!(err, FlowLoadError::NodeNotFound { ref missing_node_id, .. } if missing_node_id == "ghost"));
}

#[test]
fn test_duplicate_handle_is_rejected_after_normalization() {
    // `None` and an empty handle both normalize to "default".
    let err = load(
        vec![
            node("s", "start", json!(null)),
            node("a", "end", json!(null)),
            node("b", "end", json!(null)),
        ],
        vec![edge("s", "a", None), edge("s", "b", Some(""))],
    )
    .unwrap_err();
    assert!(matches!(err, FlowLoadError::DuplicateHandle { ref handle, .. } if handle == "default"));
}

#[test]
fn test_edges_out_of_terminal_nodes() {
    let nodes = || {
        vec![
            node("s", "start", json!(null)),
            node("queue", "queue", json!({ "queueId": 3 })),
            node("after", "message", text_message("never sent")),
        ]
    };
    let edges = || vec![edge("s", "queue", None), edge("queue", "after", None)];

    let err = load(nodes(), edges()).unwrap_err();
    assert!(matches!(err, FlowLoadError::EdgeFromTerminalNode { ref node_id, .. } if node_id == "queue"));

    let graph = FlowGraph::builder(definition(nodes(), edges()))
        .allow_terminal_edges(true)
        .build()
        .unwrap();
    assert!(graph.outgoing("queue").is_empty());
    assert_eq!(graph.outgoing("s").len(), 1);
}

#[test]
fn test_type_mapping_and_aliases() {
    let graph = FlowGraph::builder(definition(
        vec![
            node("s", "startNode", json!(null)),
            node("w", "webhook", json!({ "url": "https://api.example.com" })),
            node("bubble", "textBubble", text_message("hi")),
        ],
        vec![],
    ))
    .with_type_mapping("textBubble", "message")
    .with_type_mapping("ignored", "notAType")
    .build()
    .unwrap();

    assert!(matches!(graph.node("w").unwrap().kind, NodeKind::Api(_)));
    assert!(matches!(graph.node("bubble").unwrap().kind, NodeKind::Message(_)));
}

#[test]
fn test_config_accepts_numeric_ids_and_json_bodies() {
    let graph = load(
        vec![
            node("s", "start", json!(null)),
            node(
                "m",
                "menu",
                json!({ "title": "Escolha", "options": [{ "id": 7, "text": "Sete" }] }),
            ),
            node(
                "api",
                "api",
                json!({ "method": "post", "url": "https://x", "body": { "a": 1 } }),
            ),
        ],
        vec![],
    )
    .unwrap();

    match &graph.node("m").unwrap().kind {
        NodeKind::Menu(config) => assert_eq!(config.options[0].id, "7"),
        other => panic!("expected a menu, got {:?}", other),
    }
    match &graph.node("api").unwrap().kind {
        NodeKind::Api(config) => assert_eq!(config.body.as_deref(), Some(r#"{"a":1}"#)),
        other => panic!("expected an api node, got {:?}", other),
    }
}

#[test]
fn test_from_json_with_canonical_field_names() {
    let json = r#"{
        "id": "welcome",
        "nodes": [
            { "id": "s", "type": "start" },
            { "id": "m", "type": "message", "config": { "messageBody": "Olá" } }
        ],
        "edges": [
            { "id": "e1", "sourceNodeId": "s", "targetNodeId": "m", "sourceHandle": "default" }
        ]
    }"#;
    let graph = FlowGraph::from_json(json).unwrap();
    assert_eq!(graph.id(), Some("welcome"));
    assert_eq!(graph.outgoing("s")[0].target, "m");

    assert!(matches!(
        FlowGraph::from_json("{ not json"),
        Err(FlowLoadError::JsonParseError(_))
    ));
}

#[test]
fn test_prelude_result_takes_an_explicit_error_type() -> Result<()> {
    let json = r#"{
        "nodes": [{ "id": "s", "type": "start" }],
        "edges": []
    }"#;
    let loaded: Result<FlowGraph, FlowLoadError> = FlowGraph::from_json(json);
    let graph = loaded?;
    assert_eq!(graph.start_node_id(), "s");

    let rejected: Result<FlowGraph, FlowLoadError> = FlowGraph::from_json("[]");
    assert!(rejected.is_err());
    Ok(())
}

#[test]
fn test_null_condition_values_load_but_null_ids_do_not() {
    let graph = load(
        vec![
            node("s", "start", json!(null)),
            node(
                "c",
                "conditional",
                json!({
                    "variableName": "x",
                    "defaultValue": null,
                    "conditions": [{ "id": 1, "operator": "==", "value": null }]
                }),
            ),
        ],
        vec![edge("s", "c", None)],
    )
    .unwrap();
    match &graph.node("c").unwrap().kind {
        NodeKind::Conditional(config) => {
            assert_eq!(config.default_value, "");
            assert_eq!(config.conditions[0].id, "1");
            assert_eq!(config.conditions[0].value, "");
        }
        other => panic!("expected a conditional, got {:?}", other),
    }

    let rejected = load(
        vec![
            node("s", "start", json!(null)),
            node(
                "c",
                "conditional",
                json!({ "variableName": "x", "conditions": [{ "id": null, "operator": "==" }] }),
            ),
        ],
        vec![edge("s", "c", None)],
    );
    assert!(matches!(rejected, Err(FlowLoadError::InvalidNodeConfig { .. })));
}
