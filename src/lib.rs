//! Revos provider plugin
//!
//! Manages Revos Cube Overlays (named JSON cube definitions layered over an
//! organization's base semantic model) through the Revos REST API.
//!
//! The crate is split into:
//!
//! - **semantic**: structural JSON equality, the rule that decides whether the
//!   user's `data` text and the API's copy are "the same"
//! - **client**: the REST client for `/cube-overlays`
//! - **config**: provider settings with environment fallback
//! - **overlay**: the `revos_overlay` resource (schema, plan, CRUD, import)
//! - **provider**: [`RevosProvider`], dispatching protocol calls to resources
//! - **server**: the gRPC plugin server and the [`ProviderService`] trait
//!
//! # Handshake Protocol
//!
//! When started via [`serve`], the provider prints a single line to stdout:
//!
//! ```text
//! HEMMER_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `HEMMER_PROVIDER|<protocol_version>|<address>`. Logs go to stderr.
//!
//! # Provider Protocol
//!
//! - **GetMetadata**: resource type names and capabilities
//! - **GetSchema**: provider block and resource schemas
//! - **ValidateProviderConfig** / **Configure**: provider settings
//! - **Stop**: graceful shutdown
//! - **ValidateResourceConfig**: resource block validation
//! - **Plan**: computes the change, suppressing diffs for semantically equal `data`
//! - **Create/Read/Update/Delete**: overlay lifecycle
//! - **ImportResourceState**: adopt an overlay by id or by name

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod overlay;
pub mod provider;
pub mod schema;
pub mod semantic;
pub mod server;
pub mod testing;
pub mod types;
pub mod validation;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

pub use client::{CubeOverlay, OverlayPayload, RevosClient};
pub use config::ProviderConfig;
pub use error::{ClientError, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::RevosProvider;
pub use schema::ProviderSchema;
pub use semantic::json_equal;
pub use server::{
    serve, serve_on, serve_on_with_options, serve_with_options, ProviderService, ServeOptions,
};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
    HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};
pub use validation::{validate, validate_result};
