//! HTTP client for the Revos API.
//!
//! A thin wrapper over `reqwest` for the cube overlay endpoints. Every call is
//! a single request: there is no retry or backoff, and failures are returned
//! to the caller as [`ClientError`].

use std::time::Duration;

use reqwest::{header, Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::ClientError;

/// Request timeout applied to every API call.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Collection path for overlays.
const OVERLAYS_PATH: &str = "/cube-overlays";

/// A cube overlay as returned by the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CubeOverlay {
    /// Identifier assigned by the API.
    pub id: String,
    /// Unique overlay name.
    pub name: String,
    /// Free-form description, empty when unset.
    pub description: String,
    /// Owning organization.
    pub organization_id: String,
    /// Cube definition. Opaque to the provider.
    pub data: Value,
    /// User that created the overlay.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Request body for create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayPayload {
    /// Overlay name.
    pub name: String,
    /// Description, omitted from the body when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Parsed cube definition.
    pub data: Value,
}

/// Client for the Revos cube overlay endpoints.
///
/// Holds the endpoint and bearer token resolved at configuration time. It is
/// never mutated afterwards and is cheap to clone.
#[derive(Debug, Clone)]
pub struct RevosClient {
    http: Client,
    api_url: String,
    token: String,
}

impl RevosClient {
    /// Create a client for the given API URL and token.
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("revos-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_url = api_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            api_url,
            token: token.into(),
        })
    }

    /// The base URL requests are sent to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&OverlayPayload>,
    ) -> Result<String, ClientError> {
        let url = format!("{}{}", self.api_url, path);
        debug!(method = %method, path = %path, "Revos API request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.as_u16() >= 400 {
            warn!(method = %method, path = %path, status = status.as_u16(), "Revos API error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        trace!(status = status.as_u16(), bytes = text.len(), "Revos API response");
        Ok(text)
    }

    /// Fetch an overlay by id.
    pub async fn get_overlay(&self, id: &str) -> Result<CubeOverlay, ClientError> {
        let body = self
            .request(Method::GET, &format!("{}/{}", OVERLAYS_PATH, id), None)
            .await?;
        decode_overlay(&body)
    }

    /// Create an overlay.
    pub async fn create_overlay(&self, payload: &OverlayPayload) -> Result<CubeOverlay, ClientError> {
        let body = self
            .request(Method::POST, OVERLAYS_PATH, Some(payload))
            .await?;
        decode_overlay(&body)
    }

    /// Replace the name, description and data of an overlay.
    pub async fn update_overlay(
        &self,
        id: &str,
        payload: &OverlayPayload,
    ) -> Result<CubeOverlay, ClientError> {
        let body = self
            .request(
                Method::PATCH,
                &format!("{}/{}", OVERLAYS_PATH, id),
                Some(payload),
            )
            .await?;
        decode_overlay(&body)
    }

    /// Delete an overlay.
    pub async fn delete_overlay(&self, id: &str) -> Result<(), ClientError> {
        self.request(Method::DELETE, &format!("{}/{}", OVERLAYS_PATH, id), None)
            .await?;
        Ok(())
    }

    /// List all overlays visible to the token.
    pub async fn list_overlays(&self) -> Result<Vec<CubeOverlay>, ClientError> {
        let body = self.request(Method::GET, OVERLAYS_PATH, None).await?;
        decode_overlay_list(&body)
    }

    /// Find an overlay by exact name.
    pub async fn get_overlay_by_name(&self, name: &str) -> Result<CubeOverlay, ClientError> {
        self.list_overlays()
            .await?
            .into_iter()
            .find(|overlay| overlay.name == name)
            .ok_or_else(|| ClientError::NotFound(name.to_string()))
    }
}

/// Decode a single overlay, with or without a `{"data": ...}` envelope.
///
/// Overlays carry their own `data` member, so the envelope is only assumed
/// when the body has no string `id` of its own and `data` is an object with a
/// non-empty `id`.
fn decode_overlay(body: &str) -> Result<CubeOverlay, ClientError> {
    let value: Value = serde_json::from_str(body).map_err(|source| ClientError::Decode {
        what: "overlay",
        source,
    })?;

    let enveloped = !value.get("id").is_some_and(Value::is_string)
        && value
            .get("data")
            .and_then(|data| data.get("id"))
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());

    let overlay = if enveloped {
        value.get("data").cloned().unwrap_or(Value::Null)
    } else {
        value
    };

    serde_json::from_value(overlay).map_err(|source| ClientError::Decode {
        what: "overlay",
        source,
    })
}

/// Decode an overlay list, either `{"data": [...]}` or a bare array.
fn decode_overlay_list(body: &str) -> Result<Vec<CubeOverlay>, ClientError> {
    let mut value: Value = serde_json::from_str(body).map_err(|source| ClientError::Decode {
        what: "overlays",
        source,
    })?;

    if value.get("data").is_some_and(Value::is_array) {
        value = value["data"].take();
    }

    serde_json::from_value(value).map_err(|source| ClientError::Decode {
        what: "overlays",
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_bare_overlay() {
        let body = json!({
            "id": "ov-1",
            "name": "sales",
            "organizationId": "org-1",
            "data": {"measures": {"count": {"type": "count"}}},
            "createdBy": "user-1",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        })
        .to_string();

        let overlay = decode_overlay(&body).unwrap();
        assert_eq!(overlay.id, "ov-1");
        assert_eq!(overlay.organization_id, "org-1");
        assert_eq!(overlay.description, "");
        assert_eq!(overlay.data["measures"]["count"]["type"], "count");
    }

    #[test]
    fn test_decode_enveloped_overlay() {
        let body = json!({
            "data": {"id": "ov-2", "name": "ops", "data": {"a": 1}}
        })
        .to_string();

        let overlay = decode_overlay(&body).unwrap();
        assert_eq!(overlay.id, "ov-2");
        assert_eq!(overlay.data, json!({"a": 1}));
    }

    #[test]
    fn test_decode_bare_overlay_data_without_id_is_not_envelope() {
        let body = json!({"id": "ov-3", "name": "x", "data": {"cubes": []}}).to_string();
        let overlay = decode_overlay(&body).unwrap();
        assert_eq!(overlay.id, "ov-3");
        assert_eq!(overlay.data, json!({"cubes": []}));
    }

    #[test]
    fn test_decode_bare_overlay_data_with_own_id_is_not_envelope() {
        let body = json!({
            "id": "ov-1",
            "name": "sales",
            "organizationId": "org-1",
            "data": {"id": "cube-def-7", "cubes": []}
        })
        .to_string();

        let overlay = decode_overlay(&body).unwrap();
        assert_eq!(overlay.id, "ov-1");
        assert_eq!(overlay.name, "sales");
        assert_eq!(overlay.organization_id, "org-1");
        assert_eq!(overlay.data, json!({"id": "cube-def-7", "cubes": []}));
    }

    #[test]
    fn test_decode_missing_data_is_null() {
        let overlay = decode_overlay(r#"{"id": "ov-4", "name": "x"}"#).unwrap();
        assert_eq!(overlay.data, Value::Null);
    }

    #[test]
    fn test_decode_invalid_body() {
        let err = decode_overlay("<html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode { what: "overlay", .. }));
    }

    #[test]
    fn test_decode_overlay_list_shapes() {
        let wrapped = json!({"data": [{"id": "a", "name": "one"}, {"id": "b", "name": "two"}]});
        let list = decode_overlay_list(&wrapped.to_string()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].name, "two");

        let bare = json!([{"id": "c", "name": "three"}]);
        let list = decode_overlay_list(&bare.to_string()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "c");

        assert!(decode_overlay_list(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn test_payload_omits_empty_description() {
        let payload = OverlayPayload {
            name: "sales".to_string(),
            description: String::new(),
            data: json!({"a": 1}),
        };
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body, json!({"name": "sales", "data": {"a": 1}}));
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = RevosClient::new("https://api.revos.ai/", "token").unwrap();
        assert_eq!(client.api_url(), "https://api.revos.ai");
    }
}
