use crate::error::FlowLoadError;
use serde::{Deserialize, Serialize};

/// The complete, canonical definition of a conversation flow, ready for loading.
/// This is the target structure for any custom editor format conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowDefinition {
    #[serde(default)]
    pub id: Option<String>,
    pub nodes: Vec<FlowNodeDefinition>,
    #[serde(default)]
    pub edges: Vec<FlowEdgeDefinition>,
}

/// A single node as authored in the editor. `config` is left untyped here and is
/// checked against the node type when the graph is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNodeDefinition {
    pub id: String,
    #[serde(alias = "type")]
    pub node_type: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// A connection between two nodes. `source_handle` of `None` is read as `"default"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdgeDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "sourceNodeId")]
    pub source: String,
    #[serde(alias = "targetNodeId")]
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
}

impl FlowDefinition {
    /// Parses the canonical JSON representation of a flow.
    pub fn from_json(json: &str) -> Result<Self, FlowLoadError> {
        serde_json::from_str(json).map_err(|e| FlowLoadError::JsonParseError(e.to_string()))
    }
}

impl FlowNodeDefinition {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            config,
        }
    }
}

impl FlowEdgeDefinition {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: source_handle.map(str::to_string),
        }
    }
}
