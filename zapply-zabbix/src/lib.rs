//! Client core for a Zabbix-compatible monitoring server's JSON-RPC API.
//!
//! The crate covers the transport (envelope, authentication, call-id
//! bookkeeping), tolerant decoding of the server's inconsistently typed
//! fields, typed wrappers for the host, host group, template, and trigger
//! methods, and name to identifier resolution. One [`ApiClient`] instance
//! is safe to share across concurrent reconcilers.

pub mod api;
pub mod auth;
pub mod client;
mod codec;
pub mod error;
pub mod resolve;
pub mod types;

pub use api::HostParams;
pub use auth::{Credential, Warning};
pub use client::{ApiClient, ClientConfig, DEFAULT_TIMEOUT_SECS};
pub use error::{Error, Result};
