//! Common test utilities for building flows and fake collaborators.
use roteiro::error::CallError;
use roteiro::prelude::*;
use roteiro::transport::{DatabaseRequest, HttpRequest, HttpResponse};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Shorthand for a node definition.
#[allow(dead_code)]
pub fn node(id: &str, node_type: &str, config: serde_json::Value) -> FlowNodeDefinition {
    FlowNodeDefinition::new(id, node_type, config)
}

/// Shorthand for an edge definition. The edge id is derived from its endpoints.
#[allow(dead_code)]
pub fn edge(source: &str, target: &str, handle: Option<&str>) -> FlowEdgeDefinition {
    let id = format!("{}->{}:{}", source, target, handle.unwrap_or("default"));
    FlowEdgeDefinition::new(id, source, target, handle)
}

#[allow(dead_code)]
pub fn definition(nodes: Vec<FlowNodeDefinition>, edges: Vec<FlowEdgeDefinition>) -> FlowDefinition {
    FlowDefinition {
        id: Some("test-flow".to_string()),
        nodes,
        edges,
    }
}

/// Builds a graph with default loader settings, panicking on invalid input.
#[allow(dead_code)]
pub fn graph(nodes: Vec<FlowNodeDefinition>, edges: Vec<FlowEdgeDefinition>) -> FlowGraph {
    FlowGraph::builder(definition(nodes, edges))
        .build()
        .expect("test flow should load")
}

#[allow(dead_code)]
pub fn text_message(body: &str) -> serde_json::Value {
    json!({ "messageBody": body })
}

/// Start -> menu "m" with options 1 "Sim" and 2 "Não", each leading to its own message.
#[allow(dead_code)]
pub fn create_menu_flow() -> FlowGraph {
    graph(
        vec![
            node("start", "start", json!(null)),
            node(
                "m",
                "menu",
                json!({
                    "title": "Deseja continuar?",
                    "options": [{ "id": 1, "text": "Sim" }, { "id": 2, "text": "Não" }],
                    "variableName": "choice"
                }),
            ),
            node("yes", "message", text_message("Ótimo!")),
            node("no", "message", text_message("Até logo")),
            node("fallback", "message", text_message("Não entendi")),
        ],
        vec![
            edge("start", "m", None),
            edge("m", "yes", Some("option-1")),
            edge("m", "no", Some("option-2")),
            edge("m", "fallback", Some("default")),
        ],
    )
}

/// Start -> question "q" (config as given) -> message "done".
#[allow(dead_code)]
pub fn create_question_flow(question: serde_json::Value) -> FlowGraph {
    graph(
        vec![
            node("start", "start", json!(null)),
            node("q", "question", question),
            node("done", "message", text_message("Obrigado, ${answer}")),
        ],
        vec![edge("start", "q", None), edge("q", "done", None)],
    )
}

/// Start -> api "call" with success and optional error branches.
#[allow(dead_code)]
pub fn create_api_flow(api: serde_json::Value, with_error_edge: bool) -> FlowGraph {
    let mut edges = vec![
        edge("start", "call", None),
        edge("call", "ok", Some("success")),
    ];
    if with_error_edge {
        edges.push(edge("call", "oops", Some("error")));
    }
    graph(
        vec![
            node("start", "start", json!(null)),
            node("call", "api", api),
            node("ok", "message", text_message("Pedido ${order.id} confirmado")),
            node("oops", "message", text_message("Serviço indisponível")),
        ],
        edges,
    )
}

/// The texts of every `SendMessage` text action, in order.
#[allow(dead_code)]
pub fn sent_texts(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::SendMessage {
                message: roteiro::runner::OutboundMessage::Text { body },
                ..
            } => Some(body.clone()),
            _ => None,
        })
        .collect()
}

/// The texts of every `AskQuestion` action, in order.
#[allow(dead_code)]
pub fn asked_texts(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::AskQuestion { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// An HTTP client that replays scripted results and records every request.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct ScriptedHttpClient {
    script: Arc<Mutex<VecDeque<Result<HttpResponse, CallError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    cancel_on_call: Option<CancelToken>,
}

#[allow(dead_code)]
impl ScriptedHttpClient {
    pub fn new(script: Vec<Result<HttpResponse, CallError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Self::default()
        }
    }

    /// Triggers `token` while the first request is in flight.
    pub fn cancelling(mut self, token: CancelToken) -> Self {
        self.cancel_on_call = Some(token);
        self
    }

    pub fn ok(status: u16, body: &str) -> Result<HttpResponse, CallError> {
        Ok(HttpResponse {
            status,
            body: body.to_string(),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, CallError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CallError::Transport("script exhausted".to_string())))
    }
}

/// A database client that records requests and answers with a fixed result.
#[derive(Clone)]
#[allow(dead_code)]
pub struct RecordingDatabaseClient {
    result: Result<serde_json::Value, CallError>,
    requests: Arc<Mutex<Vec<DatabaseRequest>>>,
}

#[allow(dead_code)]
impl RecordingDatabaseClient {
    pub fn new(result: Result<serde_json::Value, CallError>) -> Self {
        Self {
            result,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<DatabaseRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl DatabaseClient for RecordingDatabaseClient {
    fn execute(
        &self,
        request: &DatabaseRequest,
        _timeout_ms: u64,
    ) -> Result<serde_json::Value, CallError> {
        self.requests.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}
