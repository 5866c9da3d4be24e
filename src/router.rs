//! Edge selection after a node has produced its outcome.

use crate::graph::{Edge, FlowGraph};
use itertools::Itertools;
use tracing::debug;

pub const DEFAULT_HANDLE: &str = "default";
pub const SUCCESS_HANDLE: &str = "success";
pub const ERROR_HANDLE: &str = "error";
pub const VALIDATION_ERROR_HANDLE: &str = "validation-error";
pub const TIMEOUT_HANDLE: &str = "timeout";
pub const INSIDE_HANDLE: &str = "inside";
pub const OUTSIDE_HANDLE: &str = "outside";

pub fn option_handle(option_id: &str) -> String {
    format!("option-{option_id}")
}

pub fn condition_handle(condition_id: &str) -> String {
    format!("condition-{condition_id}")
}

/// Where the run goes after a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'g> {
    Next(&'g Edge),
    Finished(RouteEnd),
}

/// Why routing ended the run. Both cases complete the run normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEnd {
    /// The node has no outgoing edges at all.
    NoOutgoingEdges,
    /// The node has edges, but none matches the handle, `"default"`, or a lone edge.
    NoMatchingEdge,
}

/// Picks the edge to follow from `node_id` for `handle`:
///
/// 1. the edge on exactly `handle`;
/// 2. otherwise the `"default"` edge;
/// 3. otherwise the node's only outgoing edge, whatever its handle.
pub fn select_edge<'g>(graph: &'g FlowGraph, node_id: &str, handle: &str) -> Route<'g> {
    let outgoing = graph.outgoing(node_id);
    if outgoing.is_empty() {
        return Route::Finished(RouteEnd::NoOutgoingEdges);
    }

    if let Some(edge) = outgoing.iter().find(|e| e.handle == handle) {
        return Route::Next(edge);
    }

    if handle != DEFAULT_HANDLE {
        if let Some(edge) = outgoing.iter().find(|e| e.handle == DEFAULT_HANDLE) {
            debug!(node_id, handle, "No edge on handle, falling back to default");
            return Route::Next(edge);
        }
    }

    match outgoing.iter().exactly_one() {
        Ok(edge) => {
            debug!(
                node_id,
                handle,
                edge_handle = %edge.handle,
                "Falling back to the only outgoing edge"
            );
            Route::Next(edge)
        }
        Err(_) => Route::Finished(RouteEnd::NoMatchingEdge),
    }
}
