//! Error types for the Revos provider.

use thiserror::Error;

/// Errors surfaced by provider operations to the plugin host.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// User-supplied input failed validation. No remote call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider is not configured, or its configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A call to the Revos API failed.
    #[error("Client error: {0}")]
    Client(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownResource(msg) => msg,
            Self::Client(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
        }
    }

    /// Whether this error means the remote object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Rewrite the message, keeping the variant.
    pub fn map_message<F>(self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        match self {
            Self::NotFound(msg) => Self::NotFound(f(&msg)),
            Self::Validation(msg) => Self::Validation(f(&msg)),
            Self::Configuration(msg) => Self::Configuration(f(&msg)),
            Self::UnknownResource(msg) => Self::UnknownResource(f(&msg)),
            Self::Client(msg) => Self::Client(f(&msg)),
            Self::Serialization(err) => Self::Serialization(err),
        }
    }
}

impl From<ClientError> for ProviderError {
    fn from(err: ClientError) -> Self {
        if err.is_not_found() {
            ProviderError::NotFound(err.to_string())
        } else {
            ProviderError::Client(err.to_string())
        }
    }
}

/// Errors returned by the Revos API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode {what}: {source}")]
    Decode {
        /// What was being decoded.
        what: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A lookup by name found no match.
    #[error("overlay with name {0:?} not found")]
    NotFound(String),
}

impl ClientError {
    /// HTTP status code of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error means the overlay does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || self.status() == Some(404)
    }
}
