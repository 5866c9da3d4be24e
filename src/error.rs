use thiserror::Error;

/// Errors that can occur while turning a `FlowDefinition` into a `FlowGraph`.
#[derive(Error, Debug, Clone)]
pub enum FlowLoadError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Failed to convert flow: {0}")]
    ConversionError(String),

    #[error("Flow has no start node")]
    MissingStartNode,

    #[error("Flow has more than one start node: '{first}' and '{second}'")]
    MultipleStartNodes { first: String, second: String },

    #[error("Node id '{0}' is used by more than one node")]
    DuplicateNodeId(String),

    #[error("Node '{node_id}' has an unregistered or invalid node type: '{type_name}'")]
    InvalidNodeType { node_id: String, type_name: String },

    #[error("Node '{node_id}' of type '{type_name}' has an invalid configuration: {message}")]
    InvalidNodeConfig {
        node_id: String,
        type_name: String,
        message: String,
    },

    #[error("Edge '{edge_id}' references node '{missing_node_id}', which is not in the flow")]
    NodeNotFound {
        edge_id: String,
        missing_node_id: String,
    },

    #[error("Node '{node_id}' has more than one outgoing edge on handle '{handle}'")]
    DuplicateHandle { node_id: String, handle: String },

    #[error("Edge '{edge_id}' leaves terminal node '{node_id}', which never follows an edge")]
    EdgeFromTerminalNode { edge_id: String, node_id: String },
}

/// Errors raised to the caller of the runner. Conversation-level failures are
/// reported through `RunStatus::Failed` instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error("Run is not awaiting input (status: {status})")]
    NotAwaitingInput { status: String },
}

/// Failures from the HTTP and database collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Call returned non-success status {status}")]
    Status { status: u16, body: String },

    #[error("Call timed out after {0} ms")]
    Timeout(u64),

    #[error("Malformed request payload: {0}")]
    MalformedPayload(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

impl CallError {
    /// The HTTP status attached to this failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            CallError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether another attempt could succeed. Configuration problems are not retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CallError::Transport(_) | CallError::Status { .. } | CallError::Timeout(_)
        )
    }
}

/// Errors that can occur while persisting or restoring a run snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot encoding failed: {0}")]
    Encode(String),

    #[error("Snapshot decoding failed: {0}")]
    Decode(String),

    #[error("Snapshot file '{path}' could not be accessed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when converting a custom editor format into a `FlowDefinition`.
#[derive(Error, Debug, Clone)]
pub enum FlowConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}
