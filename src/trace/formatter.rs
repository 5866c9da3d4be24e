use crate::runner::{Action, LogLevel, OutboundMessage, RunState, RunStatus, TransferTarget};

/// Formats a run's actions and path into human-readable transcripts
pub struct TranscriptFormatter;

impl TranscriptFormatter {
    /// One line per action, in emission order.
    pub fn format_actions(actions: &[Action]) -> String {
        actions
            .iter()
            .map(Self::format_action)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The visited node ids joined by ` -> `.
    pub fn format_path(state: &RunState) -> String {
        state.visited_path.join(" -> ")
    }

    /// A one-line summary of where the run stands.
    pub fn format_status(state: &RunState) -> String {
        match &state.status {
            RunStatus::AwaitingInput(_) => {
                format!("awaiting input at '{}'", state.current_node_id)
            }
            status => status.to_string(),
        }
    }

    pub fn format_action(action: &Action) -> String {
        match action {
            Action::SendMessage { message, .. } => Self::format_message(message),
            Action::AskQuestion {
                text,
                options,
                footer,
                ..
            } => {
                let mut line = format!("?? ask: {}", text);
                for (position, option) in options.iter().enumerate() {
                    line.push_str(&format!("\n   {}. {}", position + 1, option.text));
                }
                if let Some(footer) = footer {
                    line.push_str(&format!("\n   ({})", footer));
                }
                line
            }
            Action::Transfer { target, .. } => match target {
                TransferTarget::Queue {
                    queue_id,
                    queue_name,
                } => match queue_name {
                    Some(name) => format!("=> transfer to queue {} ({})", queue_id, name),
                    None => format!("=> transfer to queue {}", queue_id),
                },
                TransferTarget::User {
                    user_id, user_name, ..
                } => match user_name {
                    Some(name) => format!("=> transfer to attendant {} ({})", user_id, name),
                    None => format!("=> transfer to attendant {}", user_id),
                },
            },
            Action::StartFlow {
                target_flow_id,
                carry_variables,
                ..
            } => {
                if *carry_variables {
                    format!("=> start flow {} (carrying variables)", target_flow_id)
                } else {
                    format!("=> start flow {}", target_flow_id)
                }
            }
            Action::UpdateTags { add, remove, .. } => {
                let mut parts = Vec::new();
                if !add.is_empty() {
                    parts.push(format!("+{}", add.join(" +")));
                }
                if !remove.is_empty() {
                    parts.push(format!("-{}", remove.join(" -")));
                }
                format!("## tags: {}", parts.join(" "))
            }
            Action::InternalNote { text, .. } => format!("## note: {}", text),
            Action::BookAppointment {
                calendar_id,
                message,
                ..
            } => {
                let calendar = calendar_id.as_deref().unwrap_or("default calendar");
                match message {
                    Some(message) => format!("=> book appointment on {}: {}", calendar, message),
                    None => format!("=> book appointment on {}", calendar),
                }
            }
            Action::Log { level, message } => match level {
                LogLevel::Info => format!("[info] {}", message),
                LogLevel::Warn => format!("[warn] {}", message),
            },
        }
    }

    fn format_message(message: &OutboundMessage) -> String {
        match message {
            OutboundMessage::Text { body } => format!("-> send text: {}", body),
            OutboundMessage::Media {
                media,
                reference,
                caption,
            } => {
                let kind = format!("{:?}", media).to_lowercase();
                match caption {
                    Some(caption) => format!("-> send {}: {} ({})", kind, reference, caption),
                    None => format!("-> send {}: {}", kind, reference),
                }
            }
            OutboundMessage::Location {
                latitude,
                longitude,
                name,
                ..
            } => match name {
                Some(name) => format!("-> send location: {} ({}, {})", name, latitude, longitude),
                None => format!("-> send location: {}, {}", latitude, longitude),
            },
        }
    }
}
