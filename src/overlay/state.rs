//! Tracked state of a `revos_overlay` resource.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{CubeOverlay, OverlayPayload};
use crate::error::ProviderError;
use crate::semantic::json_equal;

/// Local state of an overlay as exchanged with the plugin host.
///
/// `None` stands for null: unset for `description`, unknown for computed
/// attributes during a plan. `data` holds JSON text exactly as the user wrote
/// it, which may differ from the API's copy in key order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayState {
    /// Identifier assigned by the API.
    pub id: Option<String>,
    /// Overlay name.
    pub name: Option<String>,
    /// Description, null when unset.
    pub description: Option<String>,
    /// Owning organization.
    pub organization_id: Option<String>,
    /// Cube definition as JSON text.
    pub data: Option<String>,
    /// Creator.
    pub created_by: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// Last update timestamp.
    pub updated_at: Option<String>,
}

impl OverlayState {
    /// Decode state sent by the host. Null decodes to an empty state.
    pub fn from_value(value: &Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Encode state for the host.
    pub fn to_value(&self) -> Result<Value, ProviderError> {
        Ok(serde_json::to_value(self)?)
    }

    /// State for an overlay discovered remotely, as produced by import.
    pub fn from_remote(overlay: &CubeOverlay) -> Result<Self, ProviderError> {
        let mut state = Self {
            id: Some(overlay.id.clone()),
            data: Some(serde_json::to_string(&overlay.data)?),
            ..Self::default()
        };
        state.refresh_fields(overlay);
        Ok(state)
    }

    /// The remote id, required by every operation after create.
    pub fn require_id(&self) -> Result<&str, ProviderError> {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ProviderError::Validation(
                "overlay state has no id".to_string(),
            )),
        }
    }

    /// Build the create/update request body.
    ///
    /// Fails without touching the network when `data` is not valid JSON.
    pub fn payload(&self) -> Result<OverlayPayload, ProviderError> {
        let name = self
            .name
            .clone()
            .ok_or_else(|| ProviderError::Validation("name must be set".to_string()))?;
        let raw = self.data.as_deref().unwrap_or_default();
        let data = serde_json::from_str(raw)
            .map_err(|err| ProviderError::Validation(format!("Invalid JSON in data: {}", err)))?;

        Ok(OverlayPayload {
            name,
            description: self.description.clone().unwrap_or_default(),
            data,
        })
    }

    /// Copy the attributes the API computes from a create or update response.
    ///
    /// `data` is left alone: the planned text is kept even though the API
    /// returns the same document with a different key order.
    pub fn apply_computed(&mut self, overlay: &CubeOverlay) {
        self.organization_id = Some(overlay.organization_id.clone());
        self.created_by = Some(overlay.created_by.clone());
        self.created_at = Some(overlay.created_at.clone());
        self.updated_at = Some(overlay.updated_at.clone());
    }

    /// Refresh from a read of the remote overlay.
    ///
    /// `data` is only replaced when the remote document differs in value, so
    /// a re-serialized copy never shows up as drift.
    pub fn refresh(&mut self, overlay: &CubeOverlay) -> Result<(), ProviderError> {
        self.refresh_fields(overlay);

        let remote = serde_json::to_string(&overlay.data)?;
        let tracked = self.data.as_deref().unwrap_or_default();
        if !json_equal(tracked, &remote) {
            self.data = Some(remote);
        }
        Ok(())
    }

    fn refresh_fields(&mut self, overlay: &CubeOverlay) {
        self.name = Some(overlay.name.clone());
        self.description = if overlay.description.is_empty() {
            None
        } else {
            Some(overlay.description.clone())
        };
        self.apply_computed(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn remote() -> CubeOverlay {
        CubeOverlay {
            id: "ov-1".to_string(),
            name: "sales".to_string(),
            description: String::new(),
            organization_id: "org-1".to_string(),
            data: json!({"b": 2, "a": 1}),
            created_by: "user-1".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-02T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_round_trip_with_nulls() {
        let value = json!({
            "id": "ov-1",
            "name": "sales",
            "description": null,
            "data": "{\"a\":1}"
        });
        let state = OverlayState::from_value(&value).unwrap();
        assert_eq!(state.id.as_deref(), Some("ov-1"));
        assert!(state.description.is_none());

        let encoded = state.to_value().unwrap();
        assert_eq!(encoded["created_at"], Value::Null);
        assert_eq!(encoded["data"], "{\"a\":1}");
    }

    #[test]
    fn test_null_value_is_empty_state() {
        assert_eq!(OverlayState::from_value(&Value::Null).unwrap(), OverlayState::default());
    }

    #[test]
    fn test_payload_rejects_invalid_json() {
        let state = OverlayState {
            name: Some("sales".to_string()),
            data: Some("{not json".to_string()),
            ..Default::default()
        };
        let err = state.payload().unwrap_err();
        assert!(matches!(err, ProviderError::Validation(ref m) if m.starts_with("Invalid JSON in data")));
    }

    #[test]
    fn test_payload() {
        let state = OverlayState {
            name: Some("sales".to_string()),
            description: Some("Sales cubes".to_string()),
            data: Some(r#"{"a": [1, 2]}"#.to_string()),
            ..Default::default()
        };
        let payload = state.payload().unwrap();
        assert_eq!(payload.name, "sales");
        assert_eq!(payload.description, "Sales cubes");
        assert_eq!(payload.data, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_refresh_keeps_semantically_equal_data() {
        let mut state = OverlayState {
            id: Some("ov-1".to_string()),
            name: Some("old".to_string()),
            description: Some("desc".to_string()),
            data: Some(r#"{"a": 1, "b": 2}"#.to_string()),
            ..Default::default()
        };
        state.refresh(&remote()).unwrap();

        assert_eq!(state.data.as_deref(), Some(r#"{"a": 1, "b": 2}"#));
        assert_eq!(state.name.as_deref(), Some("sales"));
        assert!(state.description.is_none());
        assert_eq!(state.organization_id.as_deref(), Some("org-1"));
        assert_eq!(state.updated_at.as_deref(), Some("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn test_refresh_replaces_drifted_data() {
        let mut state = OverlayState {
            id: Some("ov-1".to_string()),
            data: Some(r#"{"a": 1}"#.to_string()),
            ..Default::default()
        };
        state.refresh(&remote()).unwrap();

        let data = state.data.unwrap();
        assert!(json_equal(&data, r#"{"a": 1, "b": 2}"#));
    }

    #[test]
    fn test_from_remote() {
        let state = OverlayState::from_remote(&remote()).unwrap();
        assert_eq!(state.id.as_deref(), Some("ov-1"));
        assert!(json_equal(state.data.as_deref().unwrap(), r#"{"a":1,"b":2}"#));
        assert!(!state.data.as_deref().unwrap().contains(' '));
        assert_eq!(state.created_by.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_require_id() {
        assert!(OverlayState::default().require_id().is_err());
        let state = OverlayState {
            id: Some("ov-1".to_string()),
            ..Default::default()
        };
        assert_eq!(state.require_id().unwrap(), "ov-1");
    }
}
