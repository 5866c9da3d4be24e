use super::NodeContext;
use crate::condition::evaluate_condition;
use crate::graph::ConditionalConfig;
use crate::router::{DEFAULT_HANDLE, condition_handle};
use crate::runner::Outcome;
use tracing::debug;

/// First matching condition wins; conditions are checked in authoring order.
pub(super) fn enter(ctx: &mut NodeContext, config: &ConditionalConfig) -> Outcome {
    let value = match ctx.variables.resolve(&config.variable_name) {
        Some(value) if !value.is_null() => value.to_string(),
        _ => config.default_value.clone(),
    };

    for condition in &config.conditions {
        let expected = ctx.render(&condition.value);
        if evaluate_condition(&value, condition.operator, &expected) {
            debug!(
                node_id = ctx.node_id,
                condition = %condition.id,
                operator = %condition.operator,
                "Condition matched"
            );
            return Outcome::advance(condition_handle(&condition.id));
        }
    }
    Outcome::advance(DEFAULT_HANDLE)
}
