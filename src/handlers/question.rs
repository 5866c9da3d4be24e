use super::{NodeContext, menu};
use crate::graph::{InputKind, QuestionConfig, ValidationKind};
use crate::router::{DEFAULT_HANDLE, VALIDATION_ERROR_HANDLE, option_handle};
use crate::runner::{Action, Attachment, ExpectedInput, OutboundMessage, Outcome};
use crate::validators::{self, RegexPolicy};
use tracing::debug;

pub(super) fn enter(ctx: &mut NodeContext, config: &QuestionConfig) -> Outcome {
    ask(ctx, config);
    Outcome::Suspend(ExpectedInput::Answer(config.input_kind))
}

fn ask(ctx: &mut NodeContext, config: &QuestionConfig) {
    let options = if config.input_kind == InputKind::Options {
        config.options.clone()
    } else {
        Vec::new()
    };
    let action = Action::AskQuestion {
        node_id: ctx.node_id.to_string(),
        text: ctx.render(&config.question_text),
        options,
        footer: None,
    };
    ctx.emit(action);
}

pub(super) fn resume(
    ctx: &mut NodeContext,
    config: &QuestionConfig,
    reply: &str,
    attachment: Option<&Attachment>,
) -> Outcome {
    let answer = reply.trim();

    if config.input_kind == InputKind::Options {
        if let Some(option) = menu::match_option(&config.options, answer) {
            ctx.variables
                .set(config.variable_name.as_str(), option.text.as_str());
            return Outcome::advance(option_handle(&option.id));
        }
    }

    if accepts(config, answer, attachment) {
        match (config.input_kind, attachment) {
            (InputKind::Media, Some(file)) => ctx
                .variables
                .set(config.variable_name.as_str(), file.reference.as_str()),
            _ => ctx.variables.set(config.variable_name.as_str(), answer),
        }
        return Outcome::advance(DEFAULT_HANDLE);
    }

    debug!(node_id = ctx.node_id, validation = ?config.effective_validation(), "Answer rejected");
    if config.use_validation_error_edge && ctx.has_handle(VALIDATION_ERROR_HANDLE) {
        return Outcome::advance(VALIDATION_ERROR_HANDLE);
    }

    if let Some(message) = &config.validation_message {
        let action = Action::SendMessage {
            node_id: ctx.node_id.to_string(),
            message: OutboundMessage::Text {
                body: ctx.render(message),
            },
        };
        ctx.emit(action);
    }
    ask(ctx, config);
    Outcome::Suspend(ExpectedInput::Answer(config.input_kind))
}

fn accepts(config: &QuestionConfig, answer: &str, attachment: Option<&Attachment>) -> bool {
    if config.input_kind == InputKind::Media {
        if attachment.is_none() {
            return false;
        }
    } else if answer.is_empty() {
        return false;
    }

    match config.effective_validation() {
        ValidationKind::None => true,
        ValidationKind::Email => validators::is_valid_email(answer),
        ValidationKind::Phone => validators::is_valid_phone(answer),
        ValidationKind::Number => validators::is_valid_number(answer),
        ValidationKind::DocumentA => validators::is_valid_document_a(answer),
        ValidationKind::DocumentB => validators::is_valid_document_b(answer),
        ValidationKind::Regex => validators::regex_matches(
            config.validation_regex.as_deref().unwrap_or_default(),
            answer,
            RegexPolicy::FailOpen,
        ),
    }
}
