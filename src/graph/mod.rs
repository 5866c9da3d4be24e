use crate::error::FlowLoadError;
use crate::flow::{FlowDefinition, IntoFlow};
use ahash::AHashMap;

mod builder;
pub mod node;
mod parsing;
mod serde_ext;

pub use builder::FlowGraphBuilder;
pub use node::*;

/// A routed connection between two nodes, with its handle already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub handle: String,
}

/// A validated, typed flow ready to be run.
///
/// Built once from a `FlowDefinition`; every node config has been checked and every
/// edge points at a node that exists. A graph is immutable and can be shared by any
/// number of concurrent runs.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    id: Option<String>,
    nodes: AHashMap<String, FlowNode>,
    outgoing: AHashMap<String, Vec<Edge>>,
    start_node_id: String,
}

impl FlowGraph {
    pub fn builder(definition: FlowDefinition) -> FlowGraphBuilder {
        FlowGraphBuilder::new(definition)
    }

    /// Loads a graph from the canonical JSON representation with default settings.
    pub fn from_json(json: &str) -> Result<Self, FlowLoadError> {
        Self::builder(FlowDefinition::from_json(json)?).build()
    }

    /// Loads a graph from any custom format that knows how to become a flow definition.
    pub fn from_flow<F: IntoFlow>(flow: F) -> Result<Self, FlowLoadError> {
        let definition = flow
            .into_flow()
            .map_err(|e| FlowLoadError::ConversionError(e.to_string()))?;
        Self::builder(definition).build()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn start_node_id(&self) -> &str {
        &self.start_node_id
    }

    pub fn node(&self, node_id: &str) -> Option<&FlowNode> {
        self.nodes.get(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Outgoing edges of a node, in authoring order.
    pub fn outgoing(&self, node_id: &str) -> &[Edge] {
        self.outgoing.get(node_id).map_or(&[], Vec::as_slice)
    }

    /// Whether the node has an edge on exactly this handle (no fallback).
    pub fn has_handle(&self, node_id: &str, handle: &str) -> bool {
        self.outgoing(node_id).iter().any(|e| e.handle == handle)
    }
}
