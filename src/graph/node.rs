use super::serde_ext::{
    clock_time, opt_date, opt_string_or_json, opt_string_or_number, opt_weekday, string_number_or_null,
    string_or_number,
};
use crate::condition::Operator;
use ahash::AHashMap;
use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of a loaded flow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub kind: NodeKind,
}

/// Every node kind the engine knows how to run, each with its own typed config.
///
/// Terminal kinds (`Queue`, `Attendant`, `SwitchFlow`, `Appointment`, `End`) never own
/// outgoing edges in a `FlowGraph`.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Start,
    Message(MessageConfig),
    Question(QuestionConfig),
    Menu(MenuConfig),
    Conditional(ConditionalConfig),
    Tag(TagConfig),
    Api(ApiConfig),
    Database(DatabaseConfig),
    Queue(QueueConfig),
    Attendant(AttendantConfig),
    ScheduleCheck(ScheduleConfig),
    SwitchFlow(SwitchFlowConfig),
    Appointment(AppointmentConfig),
    InternalNote(InternalNoteConfig),
    End,
}

impl NodeKind {
    /// The canonical type tag of this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Message(_) => "message",
            NodeKind::Question(_) => "question",
            NodeKind::Menu(_) => "menu",
            NodeKind::Conditional(_) => "conditional",
            NodeKind::Tag(_) => "tag",
            NodeKind::Api(_) => "api",
            NodeKind::Database(_) => "database",
            NodeKind::Queue(_) => "queue",
            NodeKind::Attendant(_) => "attendant",
            NodeKind::ScheduleCheck(_) => "scheduleCheck",
            NodeKind::SwitchFlow(_) => "switchFlow",
            NodeKind::Appointment(_) => "appointment",
            NodeKind::InternalNote(_) => "internalNote",
            NodeKind::End => "end",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NodeKind::Queue(_)
                | NodeKind::Attendant(_)
                | NodeKind::SwitchFlow(_)
                | NodeKind::Appointment(_)
                | NodeKind::End
        )
    }
}

/// Shape checks a config must pass when the graph is loaded.
pub trait NodeConfig: DeserializeOwned {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

fn require(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("`{field}` is required"))
    } else {
        Ok(())
    }
}

/// One selectable option of a menu or options question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub text: String,
}

fn validate_options(options: &[ChoiceOption]) -> Result<(), String> {
    if options.is_empty() {
        return Err("at least one option is required".to_string());
    }
    let mut seen = AHashMap::new();
    for option in options {
        if seen.insert(option.id.as_str(), ()).is_some() {
            return Err(format!("option id `{}` is used more than once", option.id));
        }
    }
    Ok(())
}

// --- Message ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Text,
    Image,
    Audio,
    Video,
    Document,
    Location,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageConfig {
    #[serde(alias = "body", alias = "text")]
    pub message_body: String,
    #[serde(alias = "mediaType")]
    pub media_kind: MediaKind,
    #[serde(alias = "mediaUrl")]
    pub media_ref: Option<String>,
    pub caption: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
    pub address: Option<String>,
}

impl NodeConfig for MessageConfig {
    fn validate(&self) -> Result<(), String> {
        match self.media_kind {
            MediaKind::Text => require(&self.message_body, "messageBody"),
            MediaKind::Location => match (self.latitude, self.longitude) {
                (Some(_), Some(_)) => Ok(()),
                _ => Err("location messages need `latitude` and `longitude`".to_string()),
            },
            _ => require(self.media_ref.as_deref().unwrap_or(""), "mediaRef"),
        }
    }
}

// --- Question ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputKind {
    #[default]
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "document-a", alias = "documentA", alias = "cpf")]
    DocumentA,
    #[serde(rename = "document-b", alias = "documentB", alias = "cnpj")]
    DocumentB,
    #[serde(rename = "options")]
    Options,
    #[serde(rename = "media")]
    Media,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    None,
    Email,
    Phone,
    Number,
    #[serde(alias = "document-a", alias = "cpf")]
    DocumentA,
    #[serde(alias = "document-b", alias = "cnpj")]
    DocumentB,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionConfig {
    #[serde(alias = "text", alias = "question")]
    pub question_text: String,
    #[serde(alias = "variable")]
    pub variable_name: String,
    #[serde(alias = "inputType")]
    pub input_kind: InputKind,
    pub options: Vec<ChoiceOption>,
    #[serde(alias = "validation")]
    pub validation_kind: Option<ValidationKind>,
    pub validation_regex: Option<String>,
    pub use_validation_error_edge: bool,
    #[serde(alias = "errorMessage")]
    pub validation_message: Option<String>,
}

impl QuestionConfig {
    /// The validator to run: the explicit kind if set, otherwise the input kind's default.
    pub fn effective_validation(&self) -> ValidationKind {
        if let Some(kind) = self.validation_kind {
            return kind;
        }
        match self.input_kind {
            InputKind::Number => ValidationKind::Number,
            InputKind::Email => ValidationKind::Email,
            InputKind::Phone => ValidationKind::Phone,
            InputKind::DocumentA => ValidationKind::DocumentA,
            InputKind::DocumentB => ValidationKind::DocumentB,
            InputKind::Text | InputKind::Options | InputKind::Media => ValidationKind::None,
        }
    }
}

impl NodeConfig for QuestionConfig {
    fn validate(&self) -> Result<(), String> {
        require(&self.question_text, "questionText")?;
        require(&self.variable_name, "variableName")?;
        if self.input_kind == InputKind::Options {
            validate_options(&self.options)?;
        }
        if self.validation_kind == Some(ValidationKind::Regex) {
            require(
                self.validation_regex.as_deref().unwrap_or(""),
                "validationRegex",
            )?;
        }
        Ok(())
    }
}

// --- Menu ---

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuConfig {
    pub title: String,
    pub options: Vec<ChoiceOption>,
    pub footer: Option<String>,
    pub variable_name: Option<String>,
}

impl NodeConfig for MenuConfig {
    fn validate(&self) -> Result<(), String> {
        require(&self.title, "title")?;
        validate_options(&self.options)
    }
}

// --- Conditional ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub operator: Operator,
    #[serde(default, deserialize_with = "string_number_or_null")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionalConfig {
    #[serde(alias = "variable")]
    pub variable_name: String,
    #[serde(deserialize_with = "string_number_or_null")]
    pub default_value: String,
    pub conditions: Vec<Condition>,
}

impl NodeConfig for ConditionalConfig {
    fn validate(&self) -> Result<(), String> {
        require(&self.variable_name, "variableName")
    }
}

// --- Tag / Internal note ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagOperation {
    #[default]
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagConfig {
    pub tags: Vec<String>,
    #[serde(alias = "action")]
    pub operation: TagOperation,
}

impl NodeConfig for TagConfig {}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InternalNoteConfig {
    #[serde(alias = "note")]
    pub text: String,
    pub variable_name: Option<String>,
}

impl NodeConfig for InternalNoteConfig {}

// --- API / Webhook ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "delete")]
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuthConfig {
    Bearer { token: String },
    Basic { username: String, password: String },
    ApiKey { header: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConfig {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    #[serde(deserialize_with = "opt_string_or_json")]
    pub body: Option<String>,
    pub content_type: Option<String>,
    pub response_variable: Option<String>,
    pub status_variable: Option<String>,
    pub error_variable: Option<String>,
    #[serde(alias = "timeout")]
    pub timeout_ms: Option<u64>,
    pub retries: u32,
    #[serde(alias = "authConfig")]
    pub auth: Option<AuthConfig>,
}

impl NodeConfig for ApiConfig {
    fn validate(&self) -> Result<(), String> {
        require(&self.url, "url")
    }
}

// --- Database ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[serde(alias = "mongodb", alias = "mongo")]
    Document,
    #[serde(alias = "sql", alias = "sqlite", alias = "postgres", alias = "mysql")]
    Relational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatabaseOperation {
    Find,
    FindOne,
    Insert,
    Update,
    Delete,
    Query,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    pub database_type: DatabaseType,
    #[serde(default = "default_database_operation")]
    pub operation: DatabaseOperation,
    #[serde(default, alias = "table")]
    pub collection: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_json")]
    pub filter: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_json")]
    pub document: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub response_variable: Option<String>,
    #[serde(default)]
    pub error_variable: Option<String>,
    #[serde(default, alias = "timeout")]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub retries: u32,
}

fn default_database_operation() -> DatabaseOperation {
    DatabaseOperation::Find
}

impl NodeConfig for DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        match self.database_type {
            DatabaseType::Document => {
                if self.operation == DatabaseOperation::Query {
                    return Err("`query` is not a document store operation".to_string());
                }
                require(self.collection.as_deref().unwrap_or(""), "collection")
            }
            DatabaseType::Relational => {
                if self.operation != DatabaseOperation::Query {
                    return Err(format!(
                        "relational databases only support `query`, not `{:?}`",
                        self.operation
                    ));
                }
                require(self.query.as_deref().unwrap_or(""), "query")
            }
        }
    }
}

// --- Handoff kinds ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    #[serde(deserialize_with = "string_or_number")]
    pub queue_id: String,
    #[serde(default)]
    pub queue_name: Option<String>,
}

impl NodeConfig for QueueConfig {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendantConfig {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub queue_id: Option<String>,
}

impl NodeConfig for AttendantConfig {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchFlowConfig {
    #[serde(deserialize_with = "string_or_number", alias = "flowId")]
    pub target_flow_id: String,
    #[serde(default)]
    pub carry_variables: bool,
}

impl NodeConfig for SwitchFlowConfig {}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentConfig {
    #[serde(deserialize_with = "opt_string_or_number")]
    pub calendar_id: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub service_id: Option<String>,
    pub message: Option<String>,
}

impl NodeConfig for AppointmentConfig {}

// --- Schedule check ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    #[serde(default, deserialize_with = "opt_weekday")]
    pub weekday: Option<Weekday>,
    #[serde(default, deserialize_with = "opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "clock_time")]
    pub start: NaiveTime,
    #[serde(deserialize_with = "clock_time")]
    pub end: NaiveTime,
    #[serde(default = "worked_day_default")]
    pub worked_day: bool,
}

fn worked_day_default() -> bool {
    true
}

impl ScheduleEntry {
    /// Whether `time` falls in `[start, end)`. Windows with `end <= start` wrap past midnight.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start < self.end {
            self.start <= time && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleConfig {
    pub entries: Vec<ScheduleEntry>,
    pub variable_name: Option<String>,
}

impl NodeConfig for ScheduleConfig {
    fn validate(&self) -> Result<(), String> {
        let mut flags: AHashMap<String, bool> = AHashMap::new();
        for entry in &self.entries {
            let day = match (entry.date, entry.weekday) {
                (Some(date), _) => date.to_string(),
                (None, Some(weekday)) => weekday.to_string(),
                (None, None) => {
                    return Err("every schedule entry needs a `weekday` or a `date`".to_string());
                }
            };
            if let Some(previous) = flags.insert(day.clone(), entry.worked_day) {
                if previous != entry.worked_day {
                    return Err(format!(
                        "entries for `{day}` disagree on whether it is a worked day"
                    ));
                }
            }
        }
        Ok(())
    }
}
