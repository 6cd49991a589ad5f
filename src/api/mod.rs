//! DoubleCloud API interaction module
//!
//! This module provides the core functionality for talking to the DoubleCloud
//! management API: authentication, the HTTP transport, asynchronous operations,
//! paginated listings and the wire messages of each service family.
//!
//! # Module Structure
//!
//! - [`auth`] - IAM token and service-account key credentials
//! - [`client`] - Main client combining credentials, transport and endpoint
//! - [`http`] - JSON-over-HTTP utilities
//! - [`operation`] - Long-running operation handles and the blocking wait
//! - [`pager`] - Lazy paginated listings and lookup-by-name
//! - [`network`], [`clickhouse`], [`kafka`], [`transfer`] - per-service calls
//!
//! # Example
//!
//! ```ignore
//! use doublecloud_provider::api::{client::DcClient, network};
//!
//! async fn example(client: &DcClient) -> doublecloud_provider::api::Result<()> {
//!     let net = network::get_network(client, "net-id").await?;
//!     println!("{}", net.name);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod clickhouse;
pub mod client;
pub mod error;
pub mod http;
pub mod kafka;
pub mod network;
pub mod operation;
pub mod pager;
pub mod transfer;
pub mod wire;

pub use client::DcClient;
pub use error::{ApiError, Result};
