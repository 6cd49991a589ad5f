//! DoubleCloud infrastructure provider
//!
//! Translates declared configuration for DoubleCloud resources (networks,
//! network connections, ClickHouse and Kafka clusters, transfers) into calls
//! against the DoubleCloud management API and reflects remote state back.
//!
//! # Module Structure
//!
//! - [`api`] - authenticated client, wire messages and asynchronous operations
//! - [`framework`] - schema declaration, diagnostics and the handler traits
//! - [`resources`] / [`datasources`] - one handler per declared type
//! - [`poller`] - readiness polling used by the network connection accepter
//! - [`provider`] - provider root: configuration, client construction, registry
//! - [`server`] - the stdin/stdout host protocol the binary speaks

pub mod api;
pub mod config;
pub mod context;
pub mod datasources;
pub mod framework;
pub mod poller;
pub mod provider;
pub mod resources;
pub mod server;

/// Version injected at compile time via DC_PROVIDER_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("DC_PROVIDER_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Prefix of every resource and data source type name
pub const TYPE_PREFIX: &str = "doublecloud";
