//! # Roteiro - Conversational Flow Execution Engine
//!
//! **Roteiro** runs user-authored chat automation flows: directed graphs of typed nodes
//! (messages, questions, menus, conditions, API calls, handoffs to humans) connected
//! by labeled edges. It walks the graph for one conversation at a time, collects and
//! validates the contact's answers, calls external systems, and tells its caller which
//! messages to send and where to hand the conversation off.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic. It operates on a canonical "flow definition" and
//! never talks to a messaging channel itself. The primary workflow is:
//!
//! 1.  **Load Your Flow**: Parse the canonical JSON with `FlowGraph::from_json`, or
//!     implement `IntoFlow` for your editor's export format.
//! 2.  **Build the Graph**: `FlowGraph::builder` validates every node config and edge
//!     once, at load time. Bad flows are rejected with a `FlowLoadError`.
//! 3.  **Run**: A `FlowRunner` starts a run and returns the `Action`s to deliver plus a
//!     `RunState`. When the run waits for the contact, persist the state and call
//!     `resume` with the reply later.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roteiro::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let flow_json = std::fs::read_to_string("flows/onboarding.json")?;
//!     let graph = FlowGraph::from_json(&flow_json)?;
//!     let runner = FlowRunner::new(&graph);
//!
//!     // Runs until the first question or the end of the flow.
//!     let output = runner.start();
//!     println!("{}", TranscriptFormatter::format_actions(&output.actions));
//!
//!     // Later, when the contact answers:
//!     if output.state.is_awaiting_input() {
//!         let output = runner.resume(output.state, RunInput::reply("Sim"))?;
//!         println!("{}", TranscriptFormatter::format_actions(&output.actions));
//!         println!("Status: {}", output.state.status);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod condition;
pub mod error;
pub mod flow;
pub mod graph;
mod handlers;
pub mod prelude;
pub mod router;
pub mod runner;
pub mod trace;
pub mod transport;
pub mod validators;
pub mod variables;
