use super::state::{ExpectedInput, FailureReason};

/// What a node handler decided. The runner turns it into routing or a status change.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Follow the edge for this handle.
    Advance(String),
    /// Stop and wait for the contact.
    Suspend(ExpectedInput),
    /// End the run here without following any edge.
    Terminate(Termination),
}

impl Outcome {
    pub fn advance(handle: impl Into<String>) -> Self {
        Outcome::Advance(handle.into())
    }

    pub fn completed() -> Self {
        Outcome::Terminate(Termination::Completed)
    }

    pub fn failed(reason: FailureReason) -> Self {
        Outcome::Terminate(Termination::Failed(reason))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    Completed,
    Failed(FailureReason),
}
