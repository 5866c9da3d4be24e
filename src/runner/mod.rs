//! The flow runner: drives node handlers and the edge router until the run
//! suspends, completes, or fails.
//!
//! Suspension is explicit. `start` and `resume` take a `RunState` by value and return
//! the updated state together with the actions produced on the way, so a run can be
//! persisted between replies and picked up by another process.

mod action;
mod cancel;
mod config;
mod input;
mod outcome;
mod state;

pub use action::*;
pub use cancel::CancelToken;
pub use config::EngineConfig;
pub use input::*;
pub use outcome::*;
pub use state::*;

use crate::error::RunError;
use crate::graph::FlowGraph;
use crate::handlers::{self, NodeContext};
use crate::router::{self, Route, RouteEnd};
use crate::transport::{Clock, DatabaseClient, HttpClient, SystemClock};
use crate::variables::VariableStore;
use tracing::{debug, info, warn};

/// Collaborators reachable from node handlers.
pub(crate) struct Services {
    pub http: Option<Box<dyn HttpClient>>,
    pub database: Option<Box<dyn DatabaseClient>>,
    pub clock: Box<dyn Clock>,
}

/// The result of one `start`/`resume` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub actions: Vec<Action>,
    pub state: RunState,
}

enum Step {
    Enter,
    Resume(RunInput),
}

/// Executes runs over one immutable `FlowGraph`.
///
/// A runner holds no per-conversation state, so one instance can serve any number of
/// runs, one call at a time per run.
pub struct FlowRunner<'g> {
    graph: &'g FlowGraph,
    config: EngineConfig,
    services: Services,
}

pub struct FlowRunnerBuilder<'g> {
    graph: &'g FlowGraph,
    config: EngineConfig,
    http: Option<Box<dyn HttpClient>>,
    database: Option<Box<dyn DatabaseClient>>,
    clock: Box<dyn Clock>,
}

impl<'g> FlowRunnerBuilder<'g> {
    fn new(graph: &'g FlowGraph) -> Self {
        Self {
            graph,
            config: EngineConfig::default(),
            http: None,
            database: None,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_http_client(mut self, client: Box<dyn HttpClient>) -> Self {
        self.http = Some(client);
        self
    }

    pub fn with_database_client(mut self, client: Box<dyn DatabaseClient>) -> Self {
        self.database = Some(client);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> FlowRunner<'g> {
        FlowRunner {
            graph: self.graph,
            config: self.config,
            services: Services {
                http: self.http,
                database: self.database,
                clock: self.clock,
            },
        }
    }
}

impl<'g> FlowRunner<'g> {
    pub fn builder(graph: &'g FlowGraph) -> FlowRunnerBuilder<'g> {
        FlowRunnerBuilder::new(graph)
    }

    /// A runner with default limits, no HTTP or database client, and the system clock.
    pub fn new(graph: &'g FlowGraph) -> Self {
        Self::builder(graph).build()
    }

    pub fn graph(&self) -> &'g FlowGraph {
        self.graph
    }

    /// Starts a fresh run at the Start node.
    pub fn start(&self) -> RunOutput {
        self.start_with_variables(VariableStore::new())
    }

    /// Starts a fresh run with pre-seeded variables, e.g. those carried over by a
    /// Switch-flow node of another graph.
    pub fn start_with_variables(&self, variables: VariableStore) -> RunOutput {
        self.start_cancellable(variables, &CancelToken::new())
    }

    pub fn start_cancellable(&self, variables: VariableStore, cancel: &CancelToken) -> RunOutput {
        let state = RunState::new(self.graph.start_node_id(), variables);
        info!(flow_id = ?self.graph.id(), "Starting run");
        self.drive(state, Step::Enter, cancel)
    }

    /// Feeds a reply (or a timeout) to a run suspended at a Question or Menu node.
    pub fn resume(&self, state: RunState, input: RunInput) -> Result<RunOutput, RunError> {
        self.resume_cancellable(state, input, &CancelToken::new())
    }

    pub fn resume_cancellable(
        &self,
        mut state: RunState,
        input: RunInput,
        cancel: &CancelToken,
    ) -> Result<RunOutput, RunError> {
        if !state.is_awaiting_input() {
            return Err(RunError::NotAwaitingInput {
                status: state.status.to_string(),
            });
        }
        state.status = RunStatus::Running;
        Ok(self.drive(state, Step::Resume(input), cancel))
    }

    /// Cancels a run between calls. Finished runs are returned unchanged.
    pub fn cancel(&self, mut state: RunState) -> RunOutput {
        if !state.is_finished() {
            info!(node_id = %state.current_node_id, "Run cancelled");
            state.status = RunStatus::Failed(FailureReason::Cancelled);
        }
        RunOutput {
            actions: Vec::new(),
            state,
        }
    }

    fn drive(&self, mut state: RunState, first: Step, cancel: &CancelToken) -> RunOutput {
        let mut actions = Vec::new();
        let mut step = first;
        let mut visits = 0usize;

        loop {
            if cancel.is_cancelled() {
                state.status = self.fail(&state, FailureReason::Cancelled);
                break;
            }

            let Some(node) = self.graph.node(&state.current_node_id) else {
                let reason = FailureReason::NodeNotFound {
                    node_id: state.current_node_id.clone(),
                };
                state.status = self.fail(&state, reason);
                break;
            };

            if matches!(step, Step::Enter) {
                if visits >= self.config.max_steps {
                    let reason = FailureReason::StepLimitExceeded {
                        limit: self.config.max_steps,
                    };
                    state.status = self.fail(&state, reason);
                    break;
                }
                visits += 1;
                state.visited_path.push(node.id.clone());
            }

            let mark = actions.len();
            let mut ctx = NodeContext {
                graph: self.graph,
                node_id: &node.id,
                variables: &mut state.variables,
                actions: &mut actions,
                services: &self.services,
                config: &self.config,
                cancel,
            };
            let outcome = match std::mem::replace(&mut step, Step::Enter) {
                Step::Enter => {
                    debug!(node_id = %node.id, kind = node.kind.tag(), "Entering node");
                    handlers::enter(&mut ctx, node)
                }
                Step::Resume(input) => {
                    debug!(node_id = %node.id, kind = node.kind.tag(), "Resuming node");
                    handlers::resume(&mut ctx, node, input)
                }
            };

            if cancel.is_cancelled() {
                actions.truncate(mark);
                state.status = self.fail(&state, FailureReason::Cancelled);
                break;
            }

            match outcome {
                Outcome::Advance(handle) => match router::select_edge(self.graph, &node.id, &handle) {
                    Route::Next(edge) => {
                        debug!(from = %edge.source, to = %edge.target, handle = %edge.handle, "Following edge");
                        state.current_node_id = edge.target.clone();
                    }
                    Route::Finished(RouteEnd::NoOutgoingEdges) => {
                        state.status = self.complete(&state);
                        break;
                    }
                    Route::Finished(RouteEnd::NoMatchingEdge) => {
                        warn!(node_id = %node.id, handle = %handle, "No edge matches handle; ending run");
                        actions.push(Action::Log {
                            level: LogLevel::Warn,
                            message: format!(
                                "node '{}' has no edge for '{}' and no default; conversation ended",
                                node.id, handle
                            ),
                        });
                        state.status = self.complete(&state);
                        break;
                    }
                },
                Outcome::Suspend(expected) => {
                    debug!(node_id = %node.id, ?expected, "Awaiting input");
                    state.status = RunStatus::AwaitingInput(expected);
                    break;
                }
                Outcome::Terminate(Termination::Completed) => {
                    state.status = self.complete(&state);
                    break;
                }
                Outcome::Terminate(Termination::Failed(reason)) => {
                    state.status = self.fail(&state, reason);
                    break;
                }
            }
        }

        RunOutput { actions, state }
    }

    fn complete(&self, state: &RunState) -> RunStatus {
        info!(node_id = %state.current_node_id, visited = state.visited_path.len(), "Run completed");
        RunStatus::Completed
    }

    fn fail(&self, state: &RunState, reason: FailureReason) -> RunStatus {
        info!(node_id = %state.current_node_id, reason = %reason, "Run failed");
        RunStatus::Failed(reason)
    }
}
