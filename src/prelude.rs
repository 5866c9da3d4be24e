//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the roteiro crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use roteiro::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let graph = FlowGraph::from_json(&std::fs::read_to_string("path/to/flow.json")?)?;
//! let runner = FlowRunner::builder(&graph)
//!     .with_config(EngineConfig::default())
//!     .with_http_client(Box::new(UreqHttpClient))
//!     .build();
//!
//! let output = runner.start();
//! let snapshot = RunSnapshot::new(graph.id().map(str::to_string), output.state);
//! snapshot.save("path/to/run.bin")?;
//! # Ok(())
//! # }
//! ```

// Flow loading
pub use crate::flow::{
    FlowDefinition, FlowEdgeDefinition, FlowNodeDefinition, IntoFlow, RunSnapshot,
};
pub use crate::graph::{FlowGraph, FlowNode, NodeKind};

// Running
pub use crate::runner::{
    Action, CancelToken, EngineConfig, FailureReason, FlowRunner, RunInput, RunOutput,
    RunState, RunStatus,
};
pub use crate::variables::{Value, VariableStore};

// Collaborators
pub use crate::transport::{Clock, DatabaseClient, HttpClient, SystemClock, UreqHttpClient};

// Error types
pub use crate::error::{CallError, FlowConversionError, FlowLoadError, RunError, SnapshotError};

// Transcript formatting
pub use crate::trace::TranscriptFormatter;

// Result type alias for convenience
pub type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;
