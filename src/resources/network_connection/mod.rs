//! `doublecloud_network_connection`
//!
//! Peering between a DoubleCloud network and a customer VPC on AWS or Google
//! Cloud. The connection spec is a "one of" block: exactly one of `aws` and
//! `google` must be configured.

pub mod convert;
pub mod model;

use super::{created_partially, require_id, wait_created, wait_deleted};
use crate::api::client::Service;
use crate::api::network as api;
use crate::api::DcClient;
use crate::context::OpContext;
use crate::framework::{
    decode, encode, full_type_name, Attribute, AttributeType, Block, DiagResult, Diagnostics,
    Resource, Schema,
};
use async_trait::async_trait;
use model::NetworkConnectionModel;
use serde_json::Value;
use std::sync::Arc;

fn aws_schema() -> Schema {
    let replace = |attr: Attribute| attr.requires_replace();
    Schema::new("AWS VPC peering").block(
        "peering",
        Block::required(
            Schema::new("")
                .attribute("vpc_id", replace(Attribute::required(AttributeType::String)))
                .attribute("account_id", replace(Attribute::required(AttributeType::String)))
                .attribute("region_id", replace(Attribute::required(AttributeType::String)))
                .attribute("ipv4_cidr_block", replace(Attribute::required(AttributeType::String)))
                .attribute("ipv6_cidr_block", replace(Attribute::optional(AttributeType::String)))
                .attribute(
                    "peering_connection_id",
                    Attribute::computed(AttributeType::String).use_state_for_unknown(),
                )
                .attribute(
                    "managed_ipv4_cidr_block",
                    Attribute::computed(AttributeType::String).use_state_for_unknown(),
                )
                .attribute(
                    "managed_ipv6_cidr_block",
                    Attribute::computed(AttributeType::String).use_state_for_unknown(),
                ),
        ),
    )
}

fn google_schema() -> Schema {
    Schema::new("Google Cloud VPC peering")
        .attribute("name", Attribute::required(AttributeType::String).requires_replace())
        .attribute(
            "peer_network_url",
            Attribute::required(AttributeType::String).requires_replace(),
        )
        .attribute(
            "managed_ipv4_cidr_block",
            Attribute::computed(AttributeType::String).use_state_for_unknown(),
        )
}

pub fn schema() -> Schema {
    Schema::new("Peering connection between a network and an external VPC")
        .attribute("id", Attribute::id())
        .attribute(
            "network_id",
            Attribute::required(AttributeType::String).requires_replace(),
        )
        .attribute(
            "description",
            Attribute::optional(AttributeType::String).requires_replace(),
        )
        .attribute("status", Attribute::computed(AttributeType::String))
        .attribute("status_reason", Attribute::computed(AttributeType::String))
        .block(
            "connection_spec",
            Block::required(
                Schema::new("Exactly one of aws or google")
                    .block("aws", Block::optional(aws_schema()))
                    .block("google", Block::optional(google_schema())),
            ),
        )
}

pub struct NetworkConnectionResource {
    client: Arc<DcClient>,
}

impl NetworkConnectionResource {
    pub fn new(client: Arc<DcClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: Arc<DcClient>) -> Arc<dyn Resource> {
        Arc::new(Self::new(client))
    }

    async fn fetch(&self, mut model: NetworkConnectionModel, id: &str) -> DiagResult<Value> {
        let remote = api::get_network_connection(&self.client, id)
            .await
            .map_err(|e| Diagnostics::api("read network connection", e))?;
        model.apply_remote(&remote);
        encode(&model)
    }
}

#[async_trait]
impl Resource for NetworkConnectionResource {
    fn type_name(&self) -> String {
        full_type_name("network_connection")
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn validate_config(&self, config: &Value) -> Diagnostics {
        let model: NetworkConnectionModel = match decode(config.clone()) {
            Ok(model) => model,
            Err(diags) => return diags,
        };
        match model.connection_spec.as_ref().map(|spec| spec.to_api()) {
            Some(Err(diags)) => diags,
            _ => Diagnostics::new(),
        }
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> DiagResult<Value> {
        let model: NetworkConnectionModel = decode(plan.clone())?;
        let request = model.to_create_request()?;
        tracing::info!("Creating network connection for network {}", request.network_id);

        let issued = api::create_network_connection(&self.client, &request).await;
        let id = wait_created(
            &self.client,
            ctx,
            Service::Network,
            "create network connection",
            issued,
            &plan,
        )
        .await?;
        self.fetch(model, &id)
            .await
            .map_err(|diags| created_partially(diags, &plan, &id))
    }

    async fn read(&self, _ctx: &OpContext, state: Value) -> DiagResult<Value> {
        let model: NetworkConnectionModel = decode(state)?;
        let id = require_id(&model.id)?;
        self.fetch(model, &id).await
    }

    async fn update(&self, _ctx: &OpContext, _prior: Value, _plan: Value) -> DiagResult<Value> {
        Err(Diagnostics::error(
            "Unsupported operation",
            "network connections don't support updates",
        ))
    }

    async fn delete(&self, ctx: &OpContext, state: Value) -> DiagResult<()> {
        let model: NetworkConnectionModel = decode(state)?;
        let id = require_id(&model.id)?;
        tracing::info!("Deleting network connection {}", id);
        let issued = api::delete_network_connection(&self.client, &id).await;
        wait_deleted(
            &self.client,
            ctx,
            Service::Network,
            "delete network connection",
            issued,
        )
        .await
    }
}
