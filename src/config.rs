//! Provider configuration.
//!
//! The provider block takes two settings, the API endpoint and the bearer
//! token. Each falls back to an environment variable when it is not set
//! explicitly. Both are mandatory.

use std::fmt;

use serde_json::Value;

use crate::client::RevosClient;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Environment variable supplying the API URL.
pub const API_URL_ENV: &str = "REVOSAI_API_URL";

/// Environment variable supplying the bearer token.
pub const TOKEN_ENV: &str = "REVOSAI_TOKEN";

/// Resolved provider settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Base URL of the Revos API.
    pub api_url: String,
    /// Bearer token.
    pub token: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "api_url",
                Attribute::optional_string().with_description(format!(
                    "The URL of the Revos API. Defaults to {} environment variable.",
                    API_URL_ENV
                )),
            )
            .with_attribute(
                "token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "The authentication token. Defaults to {} environment variable.",
                        TOKEN_ENV
                    )),
            )
    }

    /// Resolve settings from the provider block, falling back to the process environment.
    pub fn from_config(config: &Value) -> Result<Self, Vec<Diagnostic>> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve settings from the provider block and an environment lookup.
    ///
    /// A non-null explicit value always wins over the environment, even when
    /// it is empty. Every missing setting is reported, not just the first.
    pub fn resolve<F>(config: &Value, env: F) -> Result<Self, Vec<Diagnostic>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |key: &str, var: &str| match config.get(key) {
            Some(Value::String(value)) => value.clone(),
            _ => env(var).unwrap_or_default(),
        };

        let api_url = setting("api_url", API_URL_ENV);
        let token = setting("token", TOKEN_ENV);

        let mut diagnostics = Vec::new();
        if api_url.is_empty() {
            diagnostics.push(
                Diagnostic::error("Missing API URL")
                    .with_detail(format!(
                        "API URL must be configured via provider block or {}",
                        API_URL_ENV
                    ))
                    .with_attribute("api_url"),
            );
        }
        if token.is_empty() {
            diagnostics.push(
                Diagnostic::error("Missing Token")
                    .with_detail(format!(
                        "Token must be configured via provider block or {}",
                        TOKEN_ENV
                    ))
                    .with_attribute("token"),
            );
        }

        if diagnostics.is_empty() {
            Ok(Self { api_url, token })
        } else {
            Err(diagnostics)
        }
    }

    /// Build an API client from these settings.
    pub fn client(&self) -> Result<RevosClient, crate::error::ClientError> {
        RevosClient::new(&self.api_url, &self.token)
    }
}
