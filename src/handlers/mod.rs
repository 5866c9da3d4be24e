//! One handler per node kind.
//!
//! `enter` runs when the runner arrives at a node and `resume` when a suspended node
//! receives the contact's reply. Both dispatch through a single `match` over
//! `NodeKind`, so adding a kind without a handler does not compile.

mod conditional;
mod external;
mod handoff;
mod menu;
mod message;
mod question;
mod schedule;

use crate::graph::{FlowGraph, FlowNode, NodeKind};
use crate::router::TIMEOUT_HANDLE;
use crate::runner::{
    Action, CancelToken, EngineConfig, LogLevel, Outcome, RunInput, Services,
};
use crate::variables::{VariableStore, substitute};
use tracing::{debug, warn};

/// What a handler may read and write while executing one node.
pub(crate) struct NodeContext<'a> {
    pub graph: &'a FlowGraph,
    pub node_id: &'a str,
    pub variables: &'a mut VariableStore,
    pub actions: &'a mut Vec<Action>,
    pub services: &'a Services,
    pub config: &'a EngineConfig,
    pub cancel: &'a CancelToken,
}

impl NodeContext<'_> {
    pub fn emit(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn log(&mut self, level: LogLevel, message: String) {
        self.actions.push(Action::Log { level, message });
    }

    /// Substitutes variables into a template and takes ownership of the result.
    pub fn render(&self, template: &str) -> String {
        substitute(template, self.variables).into_owned()
    }

    pub fn render_opt(&self, template: Option<&str>) -> Option<String> {
        template.map(|t| self.render(t))
    }

    /// Whether this node has an edge on exactly `handle`.
    pub fn has_handle(&self, handle: &str) -> bool {
        self.graph.has_handle(self.node_id, handle)
    }
}

pub(crate) fn enter(ctx: &mut NodeContext, node: &FlowNode) -> Outcome {
    match &node.kind {
        NodeKind::Start => handoff::start(),
        NodeKind::Message(config) => message::enter(ctx, config),
        NodeKind::Question(config) => question::enter(ctx, config),
        NodeKind::Menu(config) => menu::enter(ctx, config),
        NodeKind::Conditional(config) => conditional::enter(ctx, config),
        NodeKind::Tag(config) => handoff::tag(ctx, config),
        NodeKind::Api(config) => external::call_api(ctx, config),
        NodeKind::Database(config) => external::call_database(ctx, config),
        NodeKind::Queue(config) => handoff::queue(ctx, config),
        NodeKind::Attendant(config) => handoff::attendant(ctx, config),
        NodeKind::ScheduleCheck(config) => schedule::enter(ctx, config),
        NodeKind::SwitchFlow(config) => handoff::switch_flow(ctx, config),
        NodeKind::Appointment(config) => handoff::appointment(ctx, config),
        NodeKind::InternalNote(config) => handoff::internal_note(ctx, config),
        NodeKind::End => Outcome::completed(),
    }
}

pub(crate) fn resume(ctx: &mut NodeContext, node: &FlowNode, input: RunInput) -> Outcome {
    match (&node.kind, input) {
        (NodeKind::Question(_) | NodeKind::Menu(_), RunInput::Timeout) => on_timeout(ctx),
        (NodeKind::Question(config), RunInput::Reply { text, attachment }) => {
            question::resume(ctx, config, &text, attachment.as_ref())
        }
        (NodeKind::Menu(config), RunInput::Reply { text, .. }) => menu::resume(ctx, config, &text),
        (kind, _) => {
            // Only reachable with a hand-edited state; run the node as if just entered.
            warn!(node_id = ctx.node_id, kind = kind.tag(), "Input delivered to a node that does not wait for one");
            enter(ctx, node)
        }
    }
}

/// An unanswered Question or Menu. Only an explicit `"timeout"` edge is followed;
/// otherwise the conversation ends.
fn on_timeout(ctx: &mut NodeContext) -> Outcome {
    if ctx.has_handle(TIMEOUT_HANDLE) {
        debug!(node_id = ctx.node_id, "Timeout routed to timeout edge");
        return Outcome::advance(TIMEOUT_HANDLE);
    }
    let message = format!(
        "no reply at '{}' before the inactivity timeout; conversation ended",
        ctx.node_id
    );
    ctx.log(LogLevel::Info, message);
    Outcome::completed()
}
