use super::NodeContext;
use crate::graph::{ChoiceOption, MenuConfig};
use crate::router::{DEFAULT_HANDLE, option_handle};
use crate::runner::{Action, ExpectedInput, Outcome};
use tracing::debug;

pub(super) fn enter(ctx: &mut NodeContext, config: &MenuConfig) -> Outcome {
    let action = Action::AskQuestion {
        node_id: ctx.node_id.to_string(),
        text: ctx.render(&config.title),
        options: config.options.clone(),
        footer: ctx.render_opt(config.footer.as_deref()),
    };
    ctx.emit(action);
    Outcome::Suspend(ExpectedInput::MenuChoice)
}

/// A menu never dead-ends: an unknown reply takes the `"default"` edge.
pub(super) fn resume(ctx: &mut NodeContext, config: &MenuConfig, reply: &str) -> Outcome {
    match match_option(&config.options, reply) {
        Some(option) => {
            if let Some(name) = &config.variable_name {
                ctx.variables.set(name.as_str(), option.text.as_str());
            }
            Outcome::advance(option_handle(&option.id))
        }
        None => {
            debug!(node_id = ctx.node_id, reply, "Reply matches no menu option");
            Outcome::advance(DEFAULT_HANDLE)
        }
    }
}

/// Matches a reply against option texts (trimmed, case-insensitive), then against the
/// 1-based position of an option.
pub(super) fn match_option<'o>(options: &'o [ChoiceOption], reply: &str) -> Option<&'o ChoiceOption> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }

    let wanted = reply.to_lowercase();
    options
        .iter()
        .find(|option| option.text.trim().to_lowercase() == wanted)
        .or_else(|| {
            reply
                .parse::<usize>()
                .ok()
                .and_then(|position| position.checked_sub(1))
                .and_then(|index| options.get(index))
        })
}
