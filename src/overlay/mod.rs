//! The `revos_overlay` resource.
//!
//! Each handler takes the configured [`RevosClient`] explicitly and works on
//! the JSON state exchanged with the plugin host. Remote failures come back as
//! [`ProviderError`]s whose message names the failed action.

mod plan;
mod state;

pub use plan::{plan, plan_data, string_equal_or_both_empty};
pub use state::OverlayState;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::RevosClient;
use crate::error::{ClientError, ProviderError};
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::types::ImportedResource;
use crate::validation::validate;

/// Resource type name registered with the host.
pub const RESOURCE_TYPE: &str = "revos_overlay";

/// Schema of `revos_overlay`.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Manages a Revos Cube Overlay.")
        .with_attribute(
            "id",
            Attribute::computed_string().with_description("The ID of the overlay."),
        )
        .with_attribute(
            "name",
            Attribute::required_string()
                .with_description("The name of the overlay. Must be unique."),
        )
        .with_attribute(
            "description",
            Attribute::optional_string().with_description("The description of the overlay."),
        )
        .with_attribute(
            "organization_id",
            Attribute::computed_string()
                .with_description("The organization ID the overlay belongs to."),
        )
        .with_attribute(
            "data",
            Attribute::required_string()
                .with_description("The JSON string representation of the Cube definition."),
        )
        .with_attribute(
            "created_by",
            Attribute::computed_string().with_description("The user who created the overlay."),
        )
        .with_attribute(
            "created_at",
            Attribute::computed_string().with_description("The creation timestamp."),
        )
        .with_attribute(
            "updated_at",
            Attribute::computed_string().with_description("The last update timestamp."),
        )
}

/// Validate a resource block before planning.
pub fn validate_config(config: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = validate(&schema(), config);

    if let Some(Value::String(data)) = config.get("data") {
        if let Err(err) = serde_json::from_str::<Value>(data) {
            diagnostics.push(
                Diagnostic::error("Invalid JSON in data")
                    .with_detail(format!("Unable to parse data as JSON: {}", err))
                    .with_attribute("data"),
            );
        }
    }

    diagnostics
}

/// Create the overlay described by `planned`.
pub async fn create(client: &RevosClient, planned: Value) -> Result<Value, ProviderError> {
    let mut state = OverlayState::from_value(&planned)?;
    let payload = state.payload()?;

    let overlay = client
        .create_overlay(&payload)
        .await
        .map_err(|err| client_error("create", err))?;

    info!(id = %overlay.id, name = %overlay.name, "created overlay");
    state.id = Some(overlay.id.clone());
    state.apply_computed(&overlay);
    state.to_value()
}

/// Refresh `current` from the API. `None` means the overlay is gone.
pub async fn read(client: &RevosClient, current: Value) -> Result<Option<Value>, ProviderError> {
    let mut state = OverlayState::from_value(&current)?;
    let id = state.require_id()?.to_string();

    let overlay = match client.get_overlay(&id).await {
        Ok(overlay) => overlay,
        Err(err) if err.is_not_found() => {
            warn!(id = %id, "overlay not found, removing from state");
            return Ok(None);
        }
        Err(err) => return Err(client_error("read", err)),
    };

    debug!(id = %id, "refreshed overlay");
    state.refresh(&overlay)?;
    state.to_value().map(Some)
}

/// Push `planned` to the overlay identified by `prior`.
pub async fn update(
    client: &RevosClient,
    prior: Value,
    planned: Value,
) -> Result<Value, ProviderError> {
    let prior = OverlayState::from_value(&prior)?;
    let id = prior.require_id()?.to_string();

    let mut state = OverlayState::from_value(&planned)?;
    let payload = state.payload()?;

    let overlay = client
        .update_overlay(&id, &payload)
        .await
        .map_err(|err| client_error("update", err))?;

    info!(id = %id, "updated overlay");
    state.id = Some(id);
    state.apply_computed(&overlay);
    state.to_value()
}

/// Delete the overlay. An overlay that is already gone counts as deleted.
pub async fn delete(client: &RevosClient, current: Value) -> Result<(), ProviderError> {
    let state = OverlayState::from_value(&current)?;
    let id = state.require_id()?;

    match client.delete_overlay(id).await {
        Ok(()) => {
            info!(id = %id, "deleted overlay");
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            debug!(id = %id, "overlay already deleted");
            Ok(())
        }
        Err(err) => Err(client_error("delete", err)),
    }
}

/// Import an existing overlay by id, falling back to a lookup by name.
pub async fn import(client: &RevosClient, id: &str) -> Result<Vec<ImportedResource>, ProviderError> {
    let overlay = match client.get_overlay(id).await {
        Ok(overlay) => overlay,
        Err(by_id) => {
            debug!(id = %id, error = %by_id, "lookup by id failed, trying name");
            client.get_overlay_by_name(id).await.map_err(|err| {
                ProviderError::Client(format!(
                    "Unable to import overlay. Tried as ID and name, got error: {}",
                    err
                ))
            })?
        }
    };

    info!(id = %overlay.id, name = %overlay.name, "imported overlay");
    let state = OverlayState::from_remote(&overlay)?;
    Ok(vec![ImportedResource::new(RESOURCE_TYPE, state.to_value()?)])
}

fn client_error(action: &str, err: ClientError) -> ProviderError {
    ProviderError::from(err)
        .map_message(|msg| format!("Unable to {} overlay, got error: {}", action, msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_flags() {
        let schema = schema();
        assert!(schema.attributes["name"].flags.required);
        assert!(schema.attributes["data"].flags.required);
        assert!(schema.attributes["description"].flags.optional);
        let mut computed: Vec<_> = schema.computed_only().collect();
        computed.sort_unstable();
        assert_eq!(
            computed,
            vec!["created_at", "created_by", "id", "organization_id", "updated_at"]
        );
    }

    #[test]
    fn test_validate_config_ok() {
        let diagnostics = validate_config(&json!({
            "name": "sales",
            "description": null,
            "data": "{\"cubes\": []}"
        }));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_validate_config_invalid_data() {
        let diagnostics = validate_config(&json!({"name": "sales", "data": "{oops"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid JSON in data");
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("data"));
    }

    #[test]
    fn test_validate_config_missing_required() {
        let diagnostics = validate_config(&json!({"data": "{}"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("name"));
    }

    #[test]
    fn test_client_error_keeps_not_found() {
        let err = client_error("read", ClientError::Api { status: 404, body: "gone".into() });
        assert!(err.is_not_found());
        assert!(err.message().starts_with("Unable to read overlay, got error:"));

        let err = client_error("create", ClientError::Api { status: 500, body: "boom".into() });
        assert!(matches!(err, ProviderError::Client(_)));
        assert!(err.message().contains("500"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_json_before_any_request() {
        // Nothing listens on this port; reaching the network would fail differently.
        let client = RevosClient::new("http://127.0.0.1:9", "token").unwrap();
        let err = create(&client, json!({"name": "sales", "data": "not json"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_read_requires_id() {
        let client = RevosClient::new("http://127.0.0.1:9", "token").unwrap();
        let err = read(&client, json!({"name": "sales"})).await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }
}
