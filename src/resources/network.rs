//! `doublecloud_network`

use super::{created_partially, keep_case, optional_string, require_id, wait_created, wait_deleted};
use crate::api::client::Service;
use crate::api::network::{self as api, CreateNetworkRequest, Network};
use crate::api::DcClient;
use crate::context::OpContext;
use crate::framework::{
    decode, encode, full_type_name, Attribute, AttributeType, DiagResult, Diagnostics, Resource,
    Schema, Validator,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub const CLOUD_TYPES: &[&str] = &["aws", "gcp"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub region_id: Option<String>,
    pub cloud_type: Option<String>,
    pub ipv4_cidr_block: Option<String>,
    pub ipv6_cidr_block: Option<String>,
    pub description: Option<String>,
}

impl NetworkModel {
    pub fn to_create_request(&self) -> CreateNetworkRequest {
        CreateNetworkRequest {
            project_id: self.project_id.clone().unwrap_or_default(),
            cloud_type: self
                .cloud_type
                .as_deref()
                .unwrap_or_default()
                .to_ascii_lowercase(),
            region_id: self.region_id.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            ipv4_cidr_block: self.ipv4_cidr_block.clone().unwrap_or_default(),
        }
    }

    pub fn apply_remote(&mut self, remote: &Network) {
        self.id = Some(remote.id.clone());
        self.project_id = Some(remote.project_id.clone());
        self.name = Some(remote.name.clone());
        self.region_id = Some(remote.region_id.clone());
        self.cloud_type = keep_case(&self.cloud_type, &remote.cloud_type);
        self.ipv4_cidr_block = Some(remote.ipv4_cidr_block.clone());
        self.ipv6_cidr_block = optional_string(&None, &remote.ipv6_cidr_block);
        self.description = optional_string(&self.description, &remote.description);
    }
}

pub fn schema() -> Schema {
    Schema::new("Network hosting clusters in a cloud region")
        .attribute("id", Attribute::id())
        .attribute(
            "project_id",
            Attribute::required(AttributeType::String).requires_replace(),
        )
        .attribute("name", Attribute::required(AttributeType::String).requires_replace())
        .attribute(
            "region_id",
            Attribute::required(AttributeType::String).requires_replace(),
        )
        .attribute(
            "cloud_type",
            Attribute::required(AttributeType::String)
                .requires_replace()
                .validate(Validator::OneOfCaseInsensitive(CLOUD_TYPES)),
        )
        .attribute(
            "ipv4_cidr_block",
            Attribute::required(AttributeType::String)
                .requires_replace()
                .describe("IPv4 range of the network"),
        )
        .attribute(
            "ipv6_cidr_block",
            Attribute::computed(AttributeType::String).use_state_for_unknown(),
        )
        .attribute(
            "description",
            Attribute::optional(AttributeType::String).requires_replace(),
        )
}

pub struct NetworkResource {
    client: Arc<DcClient>,
}

impl NetworkResource {
    pub fn new(client: Arc<DcClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: Arc<DcClient>) -> Arc<dyn Resource> {
        Arc::new(Self::new(client))
    }

    async fn fetch(&self, mut model: NetworkModel, id: &str) -> DiagResult<Value> {
        let remote = api::get_network(&self.client, id)
            .await
            .map_err(|e| Diagnostics::api("read network", e))?;
        model.apply_remote(&remote);
        encode(&model)
    }
}

#[async_trait]
impl Resource for NetworkResource {
    fn type_name(&self) -> String {
        full_type_name("network")
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> DiagResult<Value> {
        let model: NetworkModel = decode(plan.clone())?;
        let request = model.to_create_request();
        tracing::info!("Creating network {:?} in {}", request.name, request.project_id);

        let issued = api::create_network(&self.client, &request).await;
        let id = wait_created(&self.client, ctx, Service::Network, "create network", issued, &plan).await?;
        self.fetch(model, &id)
            .await
            .map_err(|diags| created_partially(diags, &plan, &id))
    }

    async fn read(&self, _ctx: &OpContext, state: Value) -> DiagResult<Value> {
        let model: NetworkModel = decode(state)?;
        let id = require_id(&model.id)?;
        self.fetch(model, &id).await
    }

    async fn update(&self, _ctx: &OpContext, _prior: Value, _plan: Value) -> DiagResult<Value> {
        Err(Diagnostics::error(
            "Unsupported operation",
            "networks doesn't support updates",
        ))
    }

    async fn delete(&self, ctx: &OpContext, state: Value) -> DiagResult<()> {
        let model: NetworkModel = decode(state)?;
        let id = require_id(&model.id)?;
        tracing::info!("Deleting network {}", id);
        let issued = api::delete_network(&self.client, &id).await;
        wait_deleted(&self.client, ctx, Service::Network, "delete network", issued).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_lowercases_cloud_type() {
        let model: NetworkModel = decode(json!({
            "project_id": "p1", "name": "net", "region_id": "eu-central-1",
            "cloud_type": "AWS", "ipv4_cidr_block": "10.0.0.0/16"
        }))
        .unwrap();
        let request = model.to_create_request();
        assert_eq!(request.cloud_type, "aws");
        assert_eq!(request.description, "");
    }

    #[test]
    fn test_apply_remote_keeps_user_fields() {
        let mut model = NetworkModel {
            project_id: Some("p1".into()),
            name: Some("net".into()),
            region_id: Some("eu-central-1".into()),
            cloud_type: Some("AWS".into()),
            ipv4_cidr_block: Some("10.0.0.0/16".into()),
            ..Default::default()
        };
        let submitted = model.clone();
        model.apply_remote(&Network {
            id: "n1".into(),
            project_id: "p1".into(),
            cloud_type: "aws".into(),
            region_id: "eu-central-1".into(),
            name: "net".into(),
            ipv4_cidr_block: "10.0.0.0/16".into(),
            ipv6_cidr_block: "2a05:d014::/56".into(),
            ..Default::default()
        });
        assert_eq!(model.id.as_deref(), Some("n1"));
        assert_eq!(model.cloud_type, submitted.cloud_type);
        assert_eq!(model.description, None);
        assert_eq!(model.ipv6_cidr_block.as_deref(), Some("2a05:d014::/56"));
    }

    #[test]
    fn test_schema_rejects_unknown_cloud() {
        let diags = schema().validate(&json!({
            "project_id": "p1", "name": "net", "region_id": "r",
            "cloud_type": "azure", "ipv4_cidr_block": "10.0.0.0/16"
        }));
        assert!(diags.to_string().contains("cloud_type"));
    }
}
