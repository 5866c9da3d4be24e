use super::node::*;

/// Turns a node's untyped config into its typed form and runs the shape checks.
fn parse_config<C: NodeConfig>(config: &serde_json::Value) -> Result<C, String> {
    let raw = if config.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        config.clone()
    };
    let parsed: C = serde_json::from_value(raw).map_err(|e| e.to_string())?;
    parsed.validate()?;
    Ok(parsed)
}

/// Master macro to define the type tags of every node kind, how each tag is parsed,
/// and which tags are canonical.
macro_rules! define_node_kinds {
    (
        $( ([$($unit_tag:literal),+], $unit_variant:ident) ),* $(,)? ;
        $( ([$($tag:literal),+], $variant:ident, $config:ty) ),* $(,)?
    ) => {
        /// Parses a node kind from its type tag. Returns `None` for unknown tags.
        pub(super) fn parse_node_kind(
            tag: &str,
            config: &serde_json::Value,
        ) -> Option<Result<NodeKind, String>> {
            match tag {
                $( $($unit_tag)|+ => Some(Ok(NodeKind::$unit_variant)), )*
                $( $($tag)|+ => Some(parse_config::<$config>(config).map(NodeKind::$variant)), )*
                _ => None,
            }
        }

        /// Whether `name` is one of the tags the engine understands.
        pub(super) fn is_known_tag(name: &str) -> bool {
            matches!(name, $( $($unit_tag)|+ )|* | $( $($tag)|+ )|*)
        }
    };
}

define_node_kinds! {
    // Kinds without configuration
    (["start", "startNode"], Start),
    (["end", "endNode"], End),

    ; // Separator between unit kinds and configured kinds

    (["message", "messageNode"], Message, MessageConfig),
    (["question", "questionNode"], Question, QuestionConfig),
    (["menu", "menuNode"], Menu, MenuConfig),
    (["conditional", "condition", "conditionalNode"], Conditional, ConditionalConfig),
    (["tag", "tagNode"], Tag, TagConfig),
    (["api", "webhook", "apiNode", "webhookNode"], Api, ApiConfig),
    (["database", "databaseNode"], Database, DatabaseConfig),
    (["queue", "queueNode"], Queue, QueueConfig),
    (["attendant", "attendantNode"], Attendant, AttendantConfig),
    (["scheduleCheck", "schedule", "scheduleNode"], ScheduleCheck, ScheduleConfig),
    (["switchFlow", "flow", "switchFlowNode"], SwitchFlow, SwitchFlowConfig),
    (["appointment", "appointmentNode"], Appointment, AppointmentConfig),
    (["internalNote", "note", "internalNoteNode"], InternalNote, InternalNoteConfig),
}
