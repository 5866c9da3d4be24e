use super::node::FlowNode;
use super::parsing::{is_known_tag, parse_node_kind};
use super::{Edge, FlowGraph};
use crate::error::FlowLoadError;
use crate::flow::FlowDefinition;
use crate::router::DEFAULT_HANDLE;
use ahash::{AHashMap, AHashSet};
use tracing::{debug, warn};

/// Configures how a `FlowDefinition` is loaded into a `FlowGraph`.
pub struct FlowGraphBuilder {
    definition: FlowDefinition,
    type_mappings: AHashMap<String, String>,
    allow_terminal_edges: bool,
}

impl FlowGraphBuilder {
    pub fn new(definition: FlowDefinition) -> Self {
        Self {
            definition,
            type_mappings: AHashMap::new(),
            allow_terminal_edges: false,
        }
    }

    /// Lets an editor-specific type tag stand for one of the engine's tags.
    /// Mappings onto unknown tags are ignored.
    pub fn with_type_mapping(mut self, user_type_name: &str, engine_type_name: &str) -> Self {
        if is_known_tag(engine_type_name) {
            self.type_mappings
                .insert(user_type_name.to_string(), engine_type_name.to_string());
        } else {
            warn!(
                user_type_name,
                engine_type_name, "Ignoring type mapping onto an unknown node type"
            );
        }
        self
    }

    /// When set, edges wired out of terminal nodes are dropped instead of rejected.
    pub fn allow_terminal_edges(mut self, allow: bool) -> Self {
        self.allow_terminal_edges = allow;
        self
    }

    pub fn build(self) -> Result<FlowGraph, FlowLoadError> {
        let FlowDefinition { id, nodes, edges } = self.definition;

        let mut node_map: AHashMap<String, FlowNode> = AHashMap::with_capacity(nodes.len());
        let mut start_node_id: Option<String> = None;

        for node in nodes {
            let tag = self
                .type_mappings
                .get(&node.node_type)
                .map(String::as_str)
                .unwrap_or(&node.node_type);

            let kind = match parse_node_kind(tag, &node.config) {
                Some(Ok(kind)) => kind,
                Some(Err(message)) => {
                    return Err(FlowLoadError::InvalidNodeConfig {
                        node_id: node.id,
                        type_name: node.node_type,
                        message,
                    });
                }
                None => {
                    return Err(FlowLoadError::InvalidNodeType {
                        node_id: node.id,
                        type_name: node.node_type,
                    });
                }
            };

            if matches!(kind, super::NodeKind::Start) {
                if let Some(first) = &start_node_id {
                    return Err(FlowLoadError::MultipleStartNodes {
                        first: first.clone(),
                        second: node.id,
                    });
                }
                start_node_id = Some(node.id.clone());
            }

            if node_map.contains_key(&node.id) {
                return Err(FlowLoadError::DuplicateNodeId(node.id));
            }
            node_map.insert(node.id.clone(), FlowNode { id: node.id, kind });
        }

        let start_node_id = start_node_id.ok_or(FlowLoadError::MissingStartNode)?;

        let mut outgoing: AHashMap<String, Vec<Edge>> = AHashMap::new();
        let mut seen_handles: AHashSet<(String, String)> = AHashSet::new();

        for edge in edges {
            for endpoint in [&edge.source, &edge.target] {
                if !node_map.contains_key(endpoint) {
                    return Err(FlowLoadError::NodeNotFound {
                        edge_id: edge.id.clone(),
                        missing_node_id: endpoint.clone(),
                    });
                }
            }

            let source_is_terminal = node_map
                .get(&edge.source)
                .is_some_and(|n| n.kind.is_terminal());
            if source_is_terminal {
                if !self.allow_terminal_edges {
                    return Err(FlowLoadError::EdgeFromTerminalNode {
                        edge_id: edge.id,
                        node_id: edge.source,
                    });
                }
                warn!(
                    edge_id = %edge.id,
                    node_id = %edge.source,
                    "Dropping edge wired out of a terminal node"
                );
                continue;
            }

            let handle = match edge.source_handle.as_deref().map(str::trim) {
                None | Some("") => DEFAULT_HANDLE.to_string(),
                Some(handle) => handle.to_string(),
            };

            if !seen_handles.insert((edge.source.clone(), handle.clone())) {
                return Err(FlowLoadError::DuplicateHandle {
                    node_id: edge.source,
                    handle,
                });
            }

            outgoing.entry(edge.source.clone()).or_default().push(Edge {
                id: edge.id,
                source: edge.source,
                target: edge.target,
                handle,
            });
        }

        debug!(
            nodes = node_map.len(),
            edges = outgoing.values().map(Vec::len).sum::<usize>(),
            start = %start_node_id,
            "Flow graph loaded"
        );

        Ok(FlowGraph {
            id,
            nodes: node_map,
            outgoing,
            start_node_id,
        })
    }
}
