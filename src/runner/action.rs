use crate::graph::{ChoiceOption, MediaKind};
use crate::variables::VariableStore;
use serde::Serialize;

/// A side effect requested by the engine, delivered to the caller in visitation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    SendMessage {
        node_id: String,
        message: OutboundMessage,
    },
    #[serde(rename_all = "camelCase")]
    AskQuestion {
        node_id: String,
        text: String,
        options: Vec<ChoiceOption>,
        footer: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Transfer {
        node_id: String,
        target: TransferTarget,
    },
    #[serde(rename_all = "camelCase")]
    StartFlow {
        node_id: String,
        target_flow_id: String,
        carry_variables: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        variables: Option<VariableStore>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateTags {
        node_id: String,
        add: Vec<String>,
        remove: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    InternalNote { node_id: String, text: String },
    #[serde(rename_all = "camelCase")]
    BookAppointment {
        node_id: String,
        calendar_id: Option<String>,
        service_id: Option<String>,
        message: Option<String>,
    },
    Log { level: LogLevel, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutboundMessage {
    Text {
        body: String,
    },
    Media {
        media: MediaKind,
        reference: String,
        caption: Option<String>,
    },
    Location {
        latitude: f64,
        longitude: f64,
        name: Option<String>,
        address: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransferTarget {
    #[serde(rename_all = "camelCase")]
    Queue {
        queue_id: String,
        queue_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    User {
        user_id: String,
        user_name: Option<String>,
        queue_id: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
}
