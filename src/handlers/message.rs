use super::NodeContext;
use crate::graph::{MediaKind, MessageConfig};
use crate::router::DEFAULT_HANDLE;
use crate::runner::{Action, OutboundMessage, Outcome};

pub(super) fn enter(ctx: &mut NodeContext, config: &MessageConfig) -> Outcome {
    let message = match config.media_kind {
        MediaKind::Text => OutboundMessage::Text {
            body: ctx.render(&config.message_body),
        },
        MediaKind::Location => OutboundMessage::Location {
            latitude: config.latitude.unwrap_or_default(),
            longitude: config.longitude.unwrap_or_default(),
            name: ctx.render_opt(config.location_name.as_deref()),
            address: ctx.render_opt(config.address.as_deref()),
        },
        media => OutboundMessage::Media {
            media,
            reference: ctx.render(config.media_ref.as_deref().unwrap_or_default()),
            caption: ctx
                .render_opt(config.caption.as_deref())
                .or_else(|| non_empty(ctx.render(&config.message_body))),
        },
    };

    let node_id = ctx.node_id.to_string();
    ctx.emit(Action::SendMessage { node_id, message });
    Outcome::advance(DEFAULT_HANDLE)
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}
