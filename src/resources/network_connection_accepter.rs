//! `doublecloud_network_connection_accepter`
//!
//! Waits for a peering connection created elsewhere to become active. The
//! connection itself is owned by another resource; this one only observes it.

use super::{optional_string, require_id};
use crate::api::network::{self as api, ConnectionInfo, NetworkConnection};
use crate::api::DcClient;
use crate::context::OpContext;
use crate::framework::{
    decode, encode, full_type_name, Attribute, AttributeType, DiagResult, Diagnostics, Resource,
    Schema,
};
use crate::poller::{wait_until_ready, PollError, DEFAULT_POLL_INTERVAL};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Deadline applied when the caller supplies none
pub const DEFAULT_ACCEPT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccepterModel {
    pub id: Option<String>,
    pub network_connection_id: Option<String>,
    pub status: Option<String>,
    pub peering_connection_id: Option<String>,
}

impl AccepterModel {
    fn apply_remote(&mut self, remote: &NetworkConnection) {
        self.id = Some(remote.id.clone());
        self.network_connection_id = Some(remote.id.clone());
        self.status = Some(remote.status.as_str().to_string());
        let peering = match &remote.connection_info {
            Some(ConnectionInfo::Aws(aws)) => aws.peering.peering_connection_id.as_str(),
            _ => "",
        };
        self.peering_connection_id = optional_string(&None, peering);
    }
}

pub fn schema() -> Schema {
    Schema::new("Waits until a network connection becomes active")
        .attribute("id", Attribute::id())
        .attribute(
            "network_connection_id",
            Attribute::required(AttributeType::String).requires_replace(),
        )
        .attribute("status", Attribute::computed(AttributeType::String))
        .attribute(
            "peering_connection_id",
            Attribute::computed(AttributeType::String).use_state_for_unknown(),
        )
}

pub struct AccepterResource {
    client: Arc<DcClient>,
    interval: Duration,
}

impl AccepterResource {
    pub fn new(client: Arc<DcClient>) -> Self {
        Self {
            client,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn factory(client: Arc<DcClient>) -> Arc<dyn Resource> {
        Arc::new(Self::new(client))
    }
}

fn poll_diagnostics(id: &str, err: PollError) -> Diagnostics {
    match err {
        PollError::Api(e) => Diagnostics::api("read network connection", e),
        PollError::Failed { reason } => Diagnostics::error(
            "Network connection failed",
            format!("network connection {} is in ERROR state: {}", id, reason),
        ),
        PollError::Cancelled(e) => Diagnostics::cancelled("accept network connection", e),
    }
}

#[async_trait]
impl Resource for AccepterResource {
    fn type_name(&self) -> String {
        full_type_name("network_connection_accepter")
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> DiagResult<Value> {
        let mut model: AccepterModel = decode(plan)?;
        let id = require_id(&model.network_connection_id)?;
        let ctx = ctx.with_default_timeout(DEFAULT_ACCEPT_TIMEOUT);
        tracing::info!("Waiting for network connection {} to become active", id);

        let ready = wait_until_ready(&ctx, self.interval, || {
            api::get_network_connection(&self.client, &id)
        })
        .await
        .map_err(|e| poll_diagnostics(&id, e))?;

        model.apply_remote(&ready);
        encode(&model)
    }

    async fn read(&self, _ctx: &OpContext, state: Value) -> DiagResult<Value> {
        let mut model: AccepterModel = decode(state)?;
        let id = model
            .network_connection_id
            .clone()
            .or_else(|| model.id.clone());
        let id = require_id(&id)?;
        let remote = api::get_network_connection(&self.client, &id)
            .await
            .map_err(|e| Diagnostics::api("read network connection", e))?;
        model.apply_remote(&remote);
        encode(&model)
    }

    async fn update(&self, _ctx: &OpContext, _prior: Value, _plan: Value) -> DiagResult<Value> {
        Err(Diagnostics::error(
            "Unsupported operation",
            "network connection accepters don't support updates",
        ))
    }

    async fn delete(&self, _ctx: &OpContext, state: Value) -> DiagResult<()> {
        let model: AccepterModel = decode(state)?;
        tracing::info!(
            "Forgetting accepter for network connection {}",
            model.id.as_deref().unwrap_or_default()
        );
        Ok(())
    }

    async fn import_state(&self, ctx: &OpContext, id: &str) -> DiagResult<Value> {
        self.read(ctx, json!({ "id": id, "network_connection_id": id })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::network::{AwsConnection, AwsPeering, ConnectionStatus};
    use crate::context::ContextError;

    #[test]
    fn test_apply_remote_reads_peering_id() {
        let mut model = AccepterModel::default();
        model.apply_remote(&NetworkConnection {
            id: "nc1".into(),
            status: ConnectionStatus::Active,
            connection_info: Some(ConnectionInfo::Aws(AwsConnection {
                peering: AwsPeering {
                    peering_connection_id: "pcx-1".into(),
                    ..Default::default()
                },
            })),
            ..Default::default()
        });
        assert_eq!(model.id.as_deref(), Some("nc1"));
        assert_eq!(model.status.as_deref(), Some("ACTIVE"));
        assert_eq!(model.peering_connection_id.as_deref(), Some("pcx-1"));
    }

    #[test]
    fn test_poll_diagnostics() {
        let failed = poll_diagnostics("nc1", PollError::Failed { reason: "THE reason".into() });
        assert!(failed.to_string().contains("THE reason"));

        let cancelled = poll_diagnostics("nc1", PollError::Cancelled(ContextError::DeadlineExceeded));
        assert!(cancelled.to_string().contains("context deadline exceeded"));
    }
}
