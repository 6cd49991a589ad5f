//! Managed resources
//!
//! Each resource keeps a typed model mirroring its schema, conversions between
//! that model and the API messages, and a handler implementing
//! [`Resource`](crate::framework::Resource).
//!
//! - [`network`] - `doublecloud_network`
//! - [`network_connection`] - `doublecloud_network_connection`
//! - [`network_connection_accepter`] - `doublecloud_network_connection_accepter`
//! - [`clickhouse`] - `doublecloud_clickhouse_cluster`
//! - [`kafka`] - `doublecloud_kafka_cluster`
//! - [`transfer_endpoint`] - `doublecloud_transfer_endpoint`
//! - [`transfer`] - `doublecloud_transfer`

pub mod clickhouse;
pub mod kafka;
pub mod network;
pub mod network_connection;
pub mod network_connection_accepter;
pub mod transfer;
pub mod transfer_endpoint;

use crate::api::client::Service;
use crate::api::operation::{wait_for_resource, wait_operation, Operation};
use crate::api::wire::{duration_from_wire, duration_to_wire, Access, CidrBlock};
use crate::api::{ApiError, DcClient};
use crate::context::OpContext;
use crate::framework::{
    format_duration, parse_duration, Attribute, AttributeType, Block, DiagResult, Diagnostics,
    ResourceFactory, Schema,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every resource type the provider serves
pub fn factories() -> Vec<ResourceFactory> {
    vec![
        network::NetworkResource::factory,
        network_connection::NetworkConnectionResource::factory,
        network_connection_accepter::AccepterResource::factory,
        clickhouse::ClickhouseClusterResource::factory,
        kafka::KafkaClusterResource::factory,
        transfer_endpoint::TransferEndpointResource::factory,
        transfer::TransferResource::factory,
    ]
}

// =============================================================================
// State helpers
// =============================================================================

/// Identifier from a state model, or a diagnostic when it is missing
pub(crate) fn require_id(id: &Option<String>) -> DiagResult<String> {
    match id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(Diagnostics::error(
            "Missing resource identifier",
            "the state has no id; import the resource or recreate it",
        )),
    }
}

/// Remote string for an optional attribute.
///
/// The API reports unset strings as empty; keep them unset unless the user
/// explicitly configured an empty value.
pub(crate) fn optional_string(prior: &Option<String>, remote: &str) -> Option<String> {
    if remote.is_empty() {
        prior.as_ref().filter(|p| p.is_empty()).cloned()
    } else {
        Some(remote.to_string())
    }
}

/// Remote string for a case-insensitive enum, keeping the configured spelling
pub(crate) fn keep_case(prior: &Option<String>, remote: &str) -> Option<String> {
    match prior {
        Some(p) if p.eq_ignore_ascii_case(remote) => Some(p.clone()),
        _ => optional_string(&None, remote),
    }
}

/// Configured duration (`"1h30m"`) converted to API form (`"5400s"`)
pub(crate) fn duration_to_api(
    attribute: &str,
    value: &Option<String>,
    diags: &mut Diagnostics,
) -> Option<String> {
    let raw = value.as_deref()?;
    match parse_duration(raw) {
        Ok(duration) => Some(duration_to_wire(duration)),
        Err(e) => {
            diags.add_attribute_error(attribute, "Invalid duration", e.to_string());
            None
        }
    }
}

/// API duration converted back, keeping the configured spelling when equal
pub(crate) fn duration_from_api(prior: &Option<String>, remote: &Option<String>) -> Option<String> {
    let remote = duration_from_wire(remote.as_deref()?)?;
    match prior.as_deref().map(parse_duration) {
        Some(Ok(configured)) if configured == remote => prior.clone(),
        _ => Some(format_duration(remote)),
    }
}

// =============================================================================
// Access block shared by clusters
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessModel {
    pub ipv4_cidr_blocks: Option<Vec<String>>,
    pub ipv6_cidr_blocks: Option<Vec<String>>,
    pub data_services: Option<Vec<String>>,
}

pub(crate) fn access_schema() -> Block {
    Block::optional(
        Schema::new("Network access rules")
            .attribute("ipv4_cidr_blocks", Attribute::optional(AttributeType::StringList))
            .attribute("ipv6_cidr_blocks", Attribute::optional(AttributeType::StringList))
            .attribute("data_services", Attribute::optional(AttributeType::StringList)),
    )
}

fn cidrs(values: &Option<Vec<String>>) -> Vec<CidrBlock> {
    values
        .iter()
        .flatten()
        .map(|value| CidrBlock {
            value: value.clone(),
            description: String::new(),
        })
        .collect()
}

fn cidr_values(prior: &Option<Vec<String>>, remote: &[CidrBlock]) -> Option<Vec<String>> {
    if remote.is_empty() && prior.is_none() {
        return None;
    }
    Some(remote.iter().map(|c| c.value.clone()).collect())
}

impl AccessModel {
    pub fn to_api(&self) -> Access {
        Access {
            ipv4_cidr_blocks: cidrs(&self.ipv4_cidr_blocks),
            ipv6_cidr_blocks: cidrs(&self.ipv6_cidr_blocks),
            data_services: self.data_services.clone().unwrap_or_default(),
        }
    }

    pub fn from_api(prior: Option<&AccessModel>, remote: &Access) -> Self {
        let empty = AccessModel::default();
        let prior = prior.unwrap_or(&empty);
        Self {
            ipv4_cidr_blocks: cidr_values(&prior.ipv4_cidr_blocks, &remote.ipv4_cidr_blocks),
            ipv6_cidr_blocks: cidr_values(&prior.ipv6_cidr_blocks, &remote.ipv6_cidr_blocks),
            data_services: if remote.data_services.is_empty() && prior.data_services.is_none() {
                None
            } else {
                Some(remote.data_services.clone())
            },
        }
    }
}

// =============================================================================
// Operation helpers
// =============================================================================

/// Wait for the operation returned by a mutating call
pub(crate) async fn wait(
    client: &DcClient,
    ctx: &OpContext,
    service: Service,
    action: &str,
    issued: Result<Operation, ApiError>,
) -> DiagResult<Operation> {
    let op = issued.map_err(|e| Diagnostics::api(action, e))?;
    wait_operation(client, ctx, service, op)
        .await
        .map_err(|e| Diagnostics::api(action, e))
}

/// Wait for a create operation and return the id of the new object.
///
/// When the API assigned an id up front, a failed wait still reports it
/// through [`created_partially`].
pub(crate) async fn wait_created(
    client: &DcClient,
    ctx: &OpContext,
    service: Service,
    action: &str,
    issued: Result<Operation, ApiError>,
    plan: &Value,
) -> DiagResult<String> {
    let op = issued.map_err(|e| Diagnostics::api(action, e))?;
    let assigned = op.resource_id.clone();
    wait_for_resource(client, ctx, service, op)
        .await
        .map_err(|e| created_partially(Diagnostics::api(action, e), plan, &assigned))
}

/// Attach `plan` with `id` filled in to the diagnostics of a step that failed
/// after the remote object was created
pub(crate) fn created_partially(diags: Diagnostics, plan: &Value, id: &str) -> Diagnostics {
    if id.is_empty() {
        return diags;
    }
    tracing::warn!("Object {} exists remotely but its create did not finish", id);
    let mut state = plan.clone();
    if let Value::Object(obj) = &mut state {
        obj.insert("id".to_string(), Value::String(id.to_string()));
    }
    diags.with_partial_state(state)
}

/// Wait for a delete operation; an object that is already gone counts as deleted
pub(crate) async fn wait_deleted(
    client: &DcClient,
    ctx: &OpContext,
    service: Service,
    action: &str,
    issued: Result<Operation, ApiError>,
) -> DiagResult<()> {
    let op = match issued {
        Ok(op) => op,
        Err(ApiError::NotFound(detail)) => {
            tracing::info!("Nothing to {}: {}", action, detail);
            return Ok(());
        }
        Err(e) => return Err(Diagnostics::api(action, e)),
    };
    match wait_operation(client, ctx, service, op).await {
        Ok(_) | Err(ApiError::NotFound(_)) => Ok(()),
        Err(e) => Err(Diagnostics::api(action, e)),
    }
}
