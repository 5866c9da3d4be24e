use crate::graph::InputKind;
use crate::variables::VariableStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything the engine needs to continue a conversation later.
///
/// A `RunState` is owned by exactly one conversation and mutated only by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub current_node_id: String,
    pub visited_path: Vec<String>,
    pub variables: VariableStore,
    pub status: RunStatus,
}

impl RunState {
    pub fn new(start_node_id: impl Into<String>, variables: VariableStore) -> Self {
        Self {
            current_node_id: start_node_id.into(),
            visited_path: Vec::new(),
            variables,
            status: RunStatus::Running,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, RunStatus::Completed | RunStatus::Failed(_))
    }

    pub fn is_awaiting_input(&self) -> bool {
        matches!(self.status, RunStatus::AwaitingInput(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    AwaitingInput(ExpectedInput),
    Completed,
    Failed(FailureReason),
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => f.write_str("running"),
            RunStatus::AwaitingInput(_) => f.write_str("awaiting input"),
            RunStatus::Completed => f.write_str("completed"),
            RunStatus::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

/// What a suspended run is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedInput {
    /// An answer to a Question node of the given input kind.
    Answer(InputKind),
    /// A pick from a Menu node.
    MenuChoice,
}

/// Why a run ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    ExternalCallFailed { node_id: String, message: String },
    Cancelled,
    NodeNotFound { node_id: String },
    StepLimitExceeded { limit: usize },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ExternalCallFailed { node_id, message } => {
                write!(f, "external call at '{}' failed: {}", node_id, message)
            }
            FailureReason::Cancelled => f.write_str("cancelled"),
            FailureReason::NodeNotFound { node_id } => {
                write!(f, "node '{}' is not in the flow", node_id)
            }
            FailureReason::StepLimitExceeded { limit } => {
                write!(f, "more than {} nodes visited without waiting for input", limit)
            }
        }
    }
}
