use super::NodeContext;
use crate::graph::{ScheduleConfig, ScheduleEntry};
use crate::router::{INSIDE_HANDLE, OUTSIDE_HANDLE};
use crate::runner::Outcome;
use chrono::{Datelike, NaiveDateTime};
use tracing::debug;

pub(super) fn enter(ctx: &mut NodeContext, config: &ScheduleConfig) -> Outcome {
    let now = ctx.services.clock.now();
    let handle = evaluate(config, now);
    debug!(node_id = ctx.node_id, now = %now, handle, "Schedule evaluated");

    if let Some(name) = &config.variable_name {
        ctx.variables.set(name.as_str(), handle);
    }
    Outcome::advance(handle)
}

/// Resolves the schedule at `now` to `"inside"` or `"outside"`.
///
/// Date entries for today replace the weekday entries. On a day off the result is
/// inverted, so being inside its window means the business is closed.
fn evaluate(config: &ScheduleConfig, now: NaiveDateTime) -> &'static str {
    let today = now.date();
    let dated: Vec<&ScheduleEntry> = config
        .entries
        .iter()
        .filter(|entry| entry.date == Some(today))
        .collect();
    let applicable = if dated.is_empty() {
        config
            .entries
            .iter()
            .filter(|entry| entry.date.is_none() && entry.weekday == Some(today.weekday()))
            .collect()
    } else {
        dated
    };

    let Some(first) = applicable.first() else {
        return OUTSIDE_HANDLE;
    };
    let in_window = applicable.iter().any(|entry| entry.contains(now.time()));
    if in_window == first.worked_day {
        INSIDE_HANDLE
    } else {
        OUTSIDE_HANDLE
    }
}
