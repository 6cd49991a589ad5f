//! `doublecloud_kafka_cluster`

pub mod convert;
pub mod model;

use super::clickhouse::cluster_identity;
use super::{access_schema, created_partially, require_id, wait, wait_created, wait_deleted};
use crate::api::client::Service;
use crate::api::kafka as api;
use crate::api::DcClient;
use crate::context::OpContext;
use crate::framework::{
    decode, encode, full_type_name, Attribute, AttributeType, Block, DiagResult, Diagnostics,
    Resource, Schema, Validator,
};
use async_trait::async_trait;
use model::KafkaClusterModel;
use serde_json::Value;
use std::sync::Arc;

pub const COMPRESSION_TYPES: &[&str] = &[
    "COMPRESSION_TYPE_UNCOMPRESSED",
    "COMPRESSION_TYPE_ZSTD",
    "COMPRESSION_TYPE_LZ4",
    "COMPRESSION_TYPE_SNAPPY",
    "COMPRESSION_TYPE_GZIP",
    "COMPRESSION_TYPE_PRODUCER",
];

fn resources_schema() -> Block {
    Block::required(Schema::new("Cluster sizing").block(
        "kafka",
        Block::required(
            Schema::new("Kafka brokers")
                .attribute("resource_preset_id", Attribute::required(AttributeType::String))
                .attribute("disk_size", Attribute::required(AttributeType::Int64))
                .attribute(
                    "broker_count",
                    Attribute::optional_computed(AttributeType::Int64)
                        .validate(Validator::AtLeast(1)),
                )
                .attribute(
                    "zone_count",
                    Attribute::optional_computed(AttributeType::Int64)
                        .validate(Validator::AtLeast(1)),
                ),
        ),
    ))
}

fn config_schema() -> Block {
    let count = || Attribute::optional(AttributeType::Int64).validate(Validator::AtLeast(0));
    let duration = || Attribute::optional(AttributeType::String).validate(Validator::Duration);
    Block::optional(
        Schema::new("Broker settings")
            .attribute(
                "compression_type",
                Attribute::optional(AttributeType::String)
                    .validate(Validator::OneOfCaseInsensitive(COMPRESSION_TYPES)),
            )
            .attribute("log_flush_interval_messages", count())
            .attribute("log_flush_interval", duration())
            .attribute("log_retention_bytes", count())
            .attribute("log_retention", duration())
            .attribute("log_segment_bytes", count())
            .attribute("log_preallocate", Attribute::optional(AttributeType::Bool))
            .attribute("auto_create_topics_enable", Attribute::optional(AttributeType::Bool))
            .attribute("num_partitions", count())
            .attribute("default_replication_factor", count()),
    )
}

pub(crate) fn connection_info_schema() -> Block {
    Block::computed(
        Schema::new("Credentials and bootstrap servers")
            .attribute("connection_string", Attribute::computed(AttributeType::String))
            .attribute("user", Attribute::computed(AttributeType::String))
            .attribute("password", Attribute::computed(AttributeType::String).sensitive()),
    )
}

pub fn schema() -> Schema {
    cluster_identity("Managed Kafka cluster")
        .block("resources", resources_schema())
        .block(
            "schema_registry",
            Block::optional(
                Schema::new("Schema registry").attribute(
                    "enabled",
                    Attribute::optional(AttributeType::Bool).default(serde_json::json!(false)),
                ),
            ),
        )
        .block("config", config_schema())
        .block("access", access_schema())
        .block("connection_info", connection_info_schema())
}

pub struct KafkaClusterResource {
    client: Arc<DcClient>,
}

impl KafkaClusterResource {
    pub fn new(client: Arc<DcClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: Arc<DcClient>) -> Arc<dyn Resource> {
        Arc::new(Self::new(client))
    }

    async fn fetch(&self, mut model: KafkaClusterModel, id: &str) -> DiagResult<Value> {
        let remote = api::get_cluster(&self.client, id)
            .await
            .map_err(|e| Diagnostics::api("read kafka cluster", e))?;
        model.apply_remote(&remote);
        encode(&model)
    }
}

#[async_trait]
impl Resource for KafkaClusterResource {
    fn type_name(&self) -> String {
        full_type_name("kafka_cluster")
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn validate_config(&self, config: &Value) -> Diagnostics {
        match decode::<KafkaClusterModel>(config.clone()) {
            Ok(model) => model.to_create_request().err().unwrap_or_default(),
            Err(diags) => diags,
        }
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> DiagResult<Value> {
        let model: KafkaClusterModel = decode(plan.clone())?;
        let request = model.to_create_request()?;
        tracing::info!("Creating kafka cluster {:?} in {}", request.name, request.project_id);

        let issued = api::create_cluster(&self.client, &request).await;
        let id = wait_created(&self.client, ctx, Service::Kafka, "create kafka cluster", issued, &plan).await?;
        self.fetch(model, &id)
            .await
            .map_err(|diags| created_partially(diags, &plan, &id))
    }

    async fn read(&self, _ctx: &OpContext, state: Value) -> DiagResult<Value> {
        let model: KafkaClusterModel = decode(state)?;
        let id = require_id(&model.id)?;
        self.fetch(model, &id).await
    }

    async fn update(&self, ctx: &OpContext, prior: Value, plan: Value) -> DiagResult<Value> {
        let prior: KafkaClusterModel = decode(prior)?;
        let id = require_id(&prior.id)?;
        let model: KafkaClusterModel = decode(plan)?;
        let request = model.to_update_request()?;
        tracing::info!("Updating kafka cluster {}", id);

        let issued = api::update_cluster(&self.client, &id, &request).await;
        wait(&self.client, ctx, Service::Kafka, "update kafka cluster", issued).await?;
        self.fetch(model, &id).await
    }

    async fn delete(&self, ctx: &OpContext, state: Value) -> DiagResult<()> {
        let model: KafkaClusterModel = decode(state)?;
        let id = require_id(&model.id)?;
        tracing::info!("Deleting kafka cluster {}", id);
        let issued = api::delete_cluster(&self.client, &id).await;
        wait_deleted(&self.client, ctx, Service::Kafka, "delete kafka cluster", issued).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compression_type_case_insensitive() {
        let base = json!({
            "project_id": "p1", "name": "k", "region_id": "r", "cloud_type": "gcp",
            "resources": {"kafka": {"resource_preset_id": "s1-c2-m4", "disk_size": 1}},
        });
        let mut config = base.clone();
        config["config"] = json!({"compression_type": "compression_type_lz4"});
        assert!(schema().validate(&config).is_empty());

        config["config"] = json!({"compression_type": "brotli"});
        assert!(schema().validate(&config).has_errors());
    }

    #[test]
    fn test_schema_registry_defaults_to_disabled() {
        let plan = schema().plan(None, &json!({"schema_registry": {}}));
        assert_eq!(plan.planned_state["schema_registry"]["enabled"], false);
    }
}
