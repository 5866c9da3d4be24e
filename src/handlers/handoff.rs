use super::NodeContext;
use crate::graph::{
    AppointmentConfig, AttendantConfig, InternalNoteConfig, QueueConfig, SwitchFlowConfig,
    TagConfig, TagOperation,
};
use crate::router::DEFAULT_HANDLE;
use crate::runner::{Action, Outcome, TransferTarget};

pub(super) fn start() -> Outcome {
    Outcome::advance(DEFAULT_HANDLE)
}

pub(super) fn tag(ctx: &mut NodeContext, config: &TagConfig) -> Outcome {
    let tags = config.tags.clone();
    let (add, remove) = match config.operation {
        TagOperation::Add => (tags, Vec::new()),
        TagOperation::Remove => (Vec::new(), tags),
    };
    let node_id = ctx.node_id.to_string();
    ctx.emit(Action::UpdateTags {
        node_id,
        add,
        remove,
    });
    Outcome::advance(DEFAULT_HANDLE)
}

pub(super) fn internal_note(ctx: &mut NodeContext, config: &InternalNoteConfig) -> Outcome {
    let mut text = ctx.render(&config.text);
    if let Some(name) = &config.variable_name {
        let value = ctx.variables.get_text(name);
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&format!("{}: {}", name, value));
    }
    let node_id = ctx.node_id.to_string();
    ctx.emit(Action::InternalNote { node_id, text });
    Outcome::advance(DEFAULT_HANDLE)
}

// Everything below ends the run.

pub(super) fn queue(ctx: &mut NodeContext, config: &QueueConfig) -> Outcome {
    let node_id = ctx.node_id.to_string();
    ctx.emit(Action::Transfer {
        node_id,
        target: TransferTarget::Queue {
            queue_id: config.queue_id.clone(),
            queue_name: config.queue_name.clone(),
        },
    });
    Outcome::completed()
}

pub(super) fn attendant(ctx: &mut NodeContext, config: &AttendantConfig) -> Outcome {
    let node_id = ctx.node_id.to_string();
    ctx.emit(Action::Transfer {
        node_id,
        target: TransferTarget::User {
            user_id: config.user_id.clone(),
            user_name: config.user_name.clone(),
            queue_id: config.queue_id.clone(),
        },
    });
    Outcome::completed()
}

pub(super) fn switch_flow(ctx: &mut NodeContext, config: &SwitchFlowConfig) -> Outcome {
    let variables = config.carry_variables.then(|| ctx.variables.clone());
    let node_id = ctx.node_id.to_string();
    ctx.emit(Action::StartFlow {
        node_id,
        target_flow_id: config.target_flow_id.clone(),
        carry_variables: config.carry_variables,
        variables,
    });
    Outcome::completed()
}

pub(super) fn appointment(ctx: &mut NodeContext, config: &AppointmentConfig) -> Outcome {
    let message = ctx.render_opt(config.message.as_deref());
    let node_id = ctx.node_id.to_string();
    ctx.emit(Action::BookAppointment {
        node_id,
        calendar_id: config.calendar_id.clone(),
        service_id: config.service_id.clone(),
        message,
    });
    Outcome::completed()
}
