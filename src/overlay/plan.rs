//! Plan computation for `revos_overlay`.
//!
//! Two modifiers keep plans quiet when nothing really changed:
//!
//! - the `data` modifier keeps the prior JSON text when the configured text is
//!   semantically equal to it, so key reordering never produces a diff;
//! - computed-field preservation carries `organization_id`, `created_by` and
//!   the timestamps over from prior state when no user attribute changed.

use serde_json::{json, Value};

use super::state::OverlayState;
use crate::error::ProviderError;
use crate::semantic::json_equal;
use crate::types::{AttributeChange, PlanResult};

/// Plan value for `data` given its prior, configured and proposed values.
///
/// Returns the prior text when both prior and configured values are set and
/// semantically equal, otherwise the proposed value unchanged.
pub fn plan_data(
    prior: Option<&str>,
    config: Option<&str>,
    proposed: Option<String>,
) -> Option<String> {
    match (prior, config) {
        (Some(prior), Some(config)) if json_equal(prior, config) => Some(prior.to_string()),
        _ => proposed,
    }
}

/// Compare two optional strings, treating null and `""` as the same value.
pub fn string_equal_or_both_empty(a: Option<&str>, b: Option<&str>) -> bool {
    let a = a.unwrap_or_default();
    let b = b.unwrap_or_default();
    a == b
}

/// Compute the plan for an overlay.
///
/// `prior` is `None` on create; a null `proposed` means destroy.
pub fn plan(
    prior: Option<&Value>,
    proposed: &Value,
    config: &Value,
) -> Result<PlanResult, ProviderError> {
    let prior = match prior {
        Some(value) if !value.is_null() => Some(OverlayState::from_value(value)?),
        _ => None,
    };

    match prior {
        None => plan_create(proposed),
        Some(prior) if proposed.is_null() => Ok(PlanResult::with_changes(
            Value::Null,
            vec![AttributeChange::removed("id", json!(prior.id))],
        )),
        Some(prior) => plan_update(prior, proposed, config),
    }
}

fn plan_create(proposed: &Value) -> Result<PlanResult, ProviderError> {
    let proposed = OverlayState::from_value(proposed)?;
    let planned = OverlayState {
        name: proposed.name,
        description: proposed.description,
        data: proposed.data,
        ..OverlayState::default()
    };

    let changes = [
        ("name", &planned.name),
        ("description", &planned.description),
        ("data", &planned.data),
    ]
    .into_iter()
    .filter_map(|(path, value)| {
        value
            .as_ref()
            .map(|value| AttributeChange::added(path, json!(value)))
    })
    .collect();

    Ok(PlanResult::with_changes(planned.to_value()?, changes))
}

fn plan_update(
    prior: OverlayState,
    proposed: &Value,
    config: &Value,
) -> Result<PlanResult, ProviderError> {
    let proposed = OverlayState::from_value(proposed)?;
    let config_data = config.get("data").and_then(Value::as_str);

    let data = plan_data(prior.data.as_deref(), config_data, proposed.data);

    let name_unchanged = proposed.name == prior.name;
    let description_unchanged =
        string_equal_or_both_empty(proposed.description.as_deref(), prior.description.as_deref());
    let data_unchanged = match (data.as_deref(), prior.data.as_deref()) {
        (Some(planned), Some(prior)) => json_equal(planned, prior),
        _ => false,
    };

    if name_unchanged && description_unchanged && data_unchanged {
        return Ok(PlanResult::no_change(prior.to_value()?));
    }

    let mut changes = Vec::new();
    if !name_unchanged {
        changes.push(AttributeChange::modified(
            "name",
            json!(prior.name),
            json!(proposed.name),
        ));
    }
    if !description_unchanged {
        changes.push(AttributeChange::modified(
            "description",
            json!(prior.description),
            json!(proposed.description),
        ));
    }
    if !data_unchanged {
        changes.push(AttributeChange::modified(
            "data",
            json!(prior.data),
            json!(data),
        ));
    }

    let planned = OverlayState {
        id: prior.id,
        name: proposed.name,
        description: proposed.description,
        data,
        ..OverlayState::default()
    };

    Ok(PlanResult::with_changes(planned.to_value()?, changes))
}
