//! Integration tests for roteiro
//!
//! End-to-end tests that load JSON flows, persist runs between replies, and talk to a
//! real SQLite database.
//!
mod common;
use common::*;
use roteiro::error::FlowConversionError;
use roteiro::prelude::*;
use roteiro::transport::SqliteClient;
use serde_json::json;

const SUPPORT_FLOW_JSON: &str = r#"{
    "id": "support",
    "nodes": [
        { "id": "start", "type": "start" },
        { "id": "welcome", "type": "message", "config": { "messageBody": "Bem-vindo ao suporte!" } },
        { "id": "menu", "type": "menu", "config": {
            "title": "Como podemos ajudar?",
            "options": [{ "id": 1, "text": "Pedido" }, { "id": 2, "text": "Atendente" }],
            "footer": "Responda com o número"
        } },
        { "id": "ask-doc", "type": "question", "config": {
            "questionText": "Informe seu CPF",
            "variableName": "cpf",
            "inputKind": "document-a",
            "validationMessage": "CPF inválido"
        } },
        { "id": "lookup", "type": "database", "config": {
            "databaseType": "sqlite",
            "operation": "query",
            "query": "SELECT name, tier FROM customers WHERE document = ?1",
            "params": ["${cpf}"],
            "responseVariable": "customer",
            "errorVariable": "dbError"
        } },
        { "id": "greet", "type": "message", "config": { "messageBody": "Olá ${customer.0.name}!" } },
        { "id": "tier", "type": "conditional", "config": {
            "variableName": "customer.0.tier",
            "conditions": [{ "id": "gold", "operator": "==", "value": "gold" }]
        } },
        { "id": "priority", "type": "queue", "config": { "queueId": 1, "queueName": "Prioritário" } },
        { "id": "regular", "type": "queue", "config": { "queueId": 2 } },
        { "id": "sorry", "type": "message", "config": { "messageBody": "Sistema indisponível" } },
        { "id": "human", "type": "attendant", "config": { "userId": 7, "userName": "Bia" } }
    ],
    "edges": [
        { "id": "e1", "source": "start", "target": "welcome" },
        { "id": "e2", "source": "welcome", "target": "menu" },
        { "id": "e3", "source": "menu", "target": "ask-doc", "sourceHandle": "option-1" },
        { "id": "e4", "source": "menu", "target": "human", "sourceHandle": "option-2" },
        { "id": "e5", "source": "ask-doc", "target": "lookup" },
        { "id": "e6", "source": "lookup", "target": "greet", "sourceHandle": "success" },
        { "id": "e7", "source": "lookup", "target": "sorry", "sourceHandle": "error" },
        { "id": "e8", "source": "greet", "target": "tier" },
        { "id": "e9", "source": "tier", "target": "priority", "sourceHandle": "condition-gold" },
        { "id": "e10", "source": "tier", "target": "regular", "sourceHandle": "default" }
    ]
}"#;

fn customers_db() -> SqliteClient {
    let connection = rusqlite::Connection::open_in_memory().expect("Failed to open SQLite");
    connection
        .execute_batch(
            "CREATE TABLE customers (document TEXT PRIMARY KEY, name TEXT NOT NULL, tier TEXT NOT NULL);
             INSERT INTO customers VALUES ('529.982.247-25', 'Ana', 'gold');
             INSERT INTO customers VALUES ('111.444.777-35', 'Caio', 'silver');",
        )
        .expect("Failed to seed customers");
    SqliteClient::from_connection(connection)
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_support_flow_end_to_end() {
        let graph = FlowGraph::from_json(SUPPORT_FLOW_JSON).expect("Failed to load flow");
        let runner = FlowRunner::builder(&graph)
            .with_database_client(Box::new(customers_db()))
            .build();

        let output = runner.start();
        assert_eq!(sent_texts(&output.actions), vec!["Bem-vindo ao suporte!"]);
        assert_eq!(asked_texts(&output.actions), vec!["Como podemos ajudar?"]);

        let output = runner
            .resume(output.state, RunInput::reply("1"))
            .expect("Run should be awaiting the menu");
        assert_eq!(asked_texts(&output.actions), vec!["Informe seu CPF"]);

        let output = runner
            .resume(output.state, RunInput::reply("123"))
            .expect("Run should be awaiting the document");
        assert_eq!(sent_texts(&output.actions), vec!["CPF inválido"]);
        assert!(output.state.is_awaiting_input());

        let output = runner
            .resume(output.state, RunInput::reply("529.982.247-25"))
            .expect("Run should still be awaiting the document");
        assert_eq!(sent_texts(&output.actions), vec!["Olá Ana!"]);
        assert_eq!(output.state.status, RunStatus::Completed);
        assert_eq!(
            output.state.visited_path,
            vec!["start", "welcome", "menu", "ask-doc", "lookup", "greet", "tier", "priority"]
        );
        assert!(matches!(
            output.actions.last(),
            Some(Action::Transfer { node_id, .. }) if node_id == "priority"
        ));
    }

    #[test]
    fn test_regular_customer_takes_default_queue() {
        let graph = FlowGraph::from_json(SUPPORT_FLOW_JSON).expect("Failed to load flow");
        let runner = FlowRunner::builder(&graph)
            .with_database_client(Box::new(customers_db()))
            .build();

        let mut state = runner.start().state;
        for reply in ["Pedido", "111.444.777-35"] {
            state = runner
                .resume(state, RunInput::reply(reply))
                .expect("Run should be awaiting input")
                .state;
        }
        assert_eq!(state.current_node_id, "regular");
        assert_eq!(state.variables.resolve("customer.0.name"), Some(&Value::Text("Caio".to_string())));
    }

    #[test]
    fn test_sql_error_takes_error_edge() {
        let graph = FlowGraph::from_json(SUPPORT_FLOW_JSON).expect("Failed to load flow");
        // No customers table.
        let runner = FlowRunner::builder(&graph)
            .with_database_client(Box::new(SqliteClient::open_in_memory().expect("Failed to open SQLite")))
            .build();

        let mut state = runner.start().state;
        state = runner.resume(state, RunInput::reply("1")).unwrap().state;
        let output = runner
            .resume(state, RunInput::reply("529.982.247-25"))
            .unwrap();

        assert_eq!(sent_texts(&output.actions), vec!["Sistema indisponível"]);
        assert!(output.state.variables.get_text("dbError").contains("no such table"));
    }

    #[test]
    fn test_sql_statement_reports_affected_rows() {
        let graph = graph(
            vec![
                node("start", "start", json!(null)),
                node(
                    "save",
                    "database",
                    json!({
                        "databaseType": "relational",
                        "operation": "query",
                        "query": "INSERT INTO visits (who) VALUES (?1)",
                        "params": ["${name}"],
                        "responseVariable": "saved"
                    }),
                ),
            ],
            vec![edge("start", "save", None)],
        );
        let connection = rusqlite::Connection::open_in_memory().unwrap();
        connection
            .execute_batch("CREATE TABLE visits (who TEXT)")
            .unwrap();
        let runner = FlowRunner::builder(&graph)
            .with_database_client(Box::new(SqliteClient::from_connection(connection)))
            .build();

        let mut vars = VariableStore::new();
        vars.set("name", "Robert'); DROP TABLE visits;--");
        let output = runner.start_with_variables(vars);

        assert_eq!(output.state.status, RunStatus::Completed);
        assert_eq!(
            output.state.variables.resolve("saved.affectedRows"),
            Some(&Value::Number(1.0))
        );
    }

    #[test]
    fn test_snapshot_survives_restart() {
        let graph = create_menu_flow();
        let runner = FlowRunner::new(&graph);
        let output = runner.start();

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("run.bin");
        let path = path.to_str().unwrap();

        let snapshot = RunSnapshot::new(graph.id().map(str::to_string), output.state);
        snapshot.save(path).expect("Failed to save snapshot");

        let restored = RunSnapshot::from_file(path).expect("Failed to load snapshot");
        assert_eq!(restored, snapshot);
        assert_eq!(restored.flow_id.as_deref(), Some("test-flow"));

        let output = runner
            .resume(restored.state, RunInput::reply("Sim"))
            .expect("Restored run should be awaiting input");
        assert_eq!(sent_texts(&output.actions), vec!["Ótimo!"]);
    }

    #[test]
    fn test_snapshot_keeps_structured_variables() {
        let mut vars = VariableStore::new();
        vars.set("order", Value::from(json!({ "id": 981, "items": ["café", null, true] })));
        let state = RunState::new("m", vars);

        let bytes = RunSnapshot::new(None, state.clone())
            .to_bytes()
            .expect("Failed to encode snapshot");
        let decoded = RunSnapshot::from_bytes(&bytes).expect("Failed to decode snapshot");
        assert_eq!(decoded.state, state);
    }

    #[test]
    fn test_corrupt_snapshot_is_rejected() {
        assert!(matches!(
            RunSnapshot::from_bytes(&[0xff, 0x00, 0x13]),
            Err(SnapshotError::Decode(_))
        ));

        let mut snapshot = RunSnapshot::new(None, RunState::new("start", VariableStore::new()));
        snapshot.version = 99;
        let bytes = snapshot.to_bytes().unwrap();
        assert!(matches!(
            RunSnapshot::from_bytes(&bytes),
            Err(SnapshotError::Decode(message)) if message.contains("99")
        ));

        assert!(matches!(
            RunSnapshot::from_file("/nonexistent/run.bin"),
            Err(SnapshotError::Io { .. })
        ));
    }

    #[test]
    fn test_transcript_formatting() {
        let graph = create_menu_flow();
        let runner = FlowRunner::new(&graph);
        let output = runner.start();

        assert_eq!(
            TranscriptFormatter::format_actions(&output.actions),
            "?? ask: Deseja continuar?\n   1. Sim\n   2. Não"
        );
        assert_eq!(
            TranscriptFormatter::format_status(&output.state),
            "awaiting input at 'm'"
        );

        let output = runner.resume(output.state, RunInput::reply("2")).unwrap();
        assert_eq!(
            TranscriptFormatter::format_actions(&output.actions),
            "-> send text: Até logo"
        );
        assert_eq!(TranscriptFormatter::format_path(&output.state), "start -> m -> no");
        assert_eq!(TranscriptFormatter::format_status(&output.state), "completed");
    }

    #[test]
    fn test_actions_serialize_for_the_messaging_layer() {
        let graph = create_menu_flow();
        let output = FlowRunner::new(&graph).start();
        let json = serde_json::to_value(&output.actions).unwrap();

        assert_eq!(
            json,
            json!([{
                "type": "askQuestion",
                "nodeId": "m",
                "text": "Deseja continuar?",
                "options": [{ "id": "1", "text": "Sim" }, { "id": "2", "text": "Não" }],
                "footer": null
            }])
        );
    }

    struct Canvas {
        blocks: Vec<(&'static str, &'static str, serde_json::Value)>,
        links: Vec<(&'static str, &'static str)>,
    }

    impl IntoFlow for Canvas {
        fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
            if self.blocks.is_empty() {
                return Err(FlowConversionError::ValidationError("empty canvas".to_string()));
            }
            Ok(FlowDefinition {
                id: Some("canvas".to_string()),
                nodes: self
                    .blocks
                    .into_iter()
                    .map(|(id, kind, data)| FlowNodeDefinition::new(id, kind, data))
                    .collect(),
                edges: self
                    .links
                    .into_iter()
                    .enumerate()
                    .map(|(i, (from, to))| FlowEdgeDefinition::new(format!("l{}", i), from, to, None))
                    .collect(),
            })
        }
    }

    #[test]
    fn test_custom_editor_format() {
        let graph = FlowGraph::from_flow(Canvas {
            blocks: vec![
                ("s", "start", json!(null)),
                ("hi", "message", json!({ "text": "Oi!" })),
            ],
            links: vec![("s", "hi")],
        })
        .expect("Failed to load canvas");
        let output = FlowRunner::new(&graph).start();
        assert_eq!(sent_texts(&output.actions), vec!["Oi!"]);

        let err = FlowGraph::from_flow(Canvas {
            blocks: vec![],
            links: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, FlowLoadError::ConversionError(ref message) if message.contains("empty canvas")));
    }
}
