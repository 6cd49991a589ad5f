//! `doublecloud_clickhouse_cluster`

pub mod convert;
pub mod model;

use super::{access_schema, created_partially, require_id, wait, wait_created, wait_deleted};
use crate::api::clickhouse as api;
use crate::api::client::Service;
use crate::api::DcClient;
use crate::context::OpContext;
use crate::framework::{
    decode, encode, full_type_name, Attribute, AttributeType, Block, DiagResult, Diagnostics,
    Resource, Schema, Validator,
};
use crate::resources::network::CLOUD_TYPES;
use async_trait::async_trait;
use model::ClickhouseClusterModel;
use serde_json::Value;
use std::sync::Arc;

pub const LOG_LEVELS: &[&str] = &["TRACE", "DEBUG", "INFORMATION", "WARNING", "ERROR"];

/// Identity attributes shared by managed clusters
pub(crate) fn cluster_identity(description: &str) -> Schema {
    Schema::new(description)
        .attribute("id", Attribute::id())
        .attribute(
            "project_id",
            Attribute::required(AttributeType::String).requires_replace(),
        )
        .attribute("name", Attribute::required(AttributeType::String))
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
            "network_id",
            Attribute::optional_computed(AttributeType::String)
                .requires_replace()
                .use_state_for_unknown(),
        )
        .attribute("description", Attribute::optional(AttributeType::String))
        .attribute(
            "version",
            Attribute::optional_computed(AttributeType::String).use_state_for_unknown(),
        )
}

fn int(validator_min: i64) -> Attribute {
    Attribute::optional(AttributeType::Int64).validate(Validator::AtLeast(validator_min))
}

fn resources_schema() -> Block {
    Block::required(
        Schema::new("Cluster sizing")
            .block(
                "clickhouse",
                Block::required(
                    Schema::new("ClickHouse nodes")
                        .attribute(
                            "resource_preset_id",
                            Attribute::required(AttributeType::String),
                        )
                        .attribute("disk_size", Attribute::required(AttributeType::Int64))
                        .attribute(
                            "replica_count",
                            Attribute::optional_computed(AttributeType::Int64)
                                .validate(Validator::AtLeast(1)),
                        )
                        .attribute(
                            "shard_count",
                            Attribute::optional_computed(AttributeType::Int64)
                                .validate(Validator::AtLeast(1)),
                        ),
                ),
            )
            .block(
                "dedicated_keeper",
                Block::optional(
                    Schema::new("Dedicated ClickHouse Keeper nodes")
                        .attribute(
                            "resource_preset_id",
                            Attribute::required(AttributeType::String),
                        )
                        .attribute("disk_size", Attribute::required(AttributeType::Int64))
                        .attribute(
                            "replica_count",
                            Attribute::optional_computed(AttributeType::Int64)
                                .validate(Validator::AtLeast(1)),
                        ),
                ),
            ),
    )
}

fn config_schema() -> Block {
    Block::optional(
        Schema::new("Server settings")
            .attribute(
                "log_level",
                Attribute::optional(AttributeType::String).validate(Validator::OneOf(LOG_LEVELS)),
            )
            .attribute("max_connections", int(1))
            .attribute("max_concurrent_queries", int(1))
            .attribute(
                "keep_alive_timeout",
                Attribute::optional(AttributeType::String).validate(Validator::Duration),
            )
            .attribute("uncompressed_cache_size", int(0))
            .attribute("mark_cache_size", int(0))
            .attribute("query_log_retention_size", int(0))
            .attribute(
                "query_log_retention_time",
                Attribute::optional(AttributeType::String).validate(Validator::Duration),
            )
            .block(
                "merge_tree",
                Block::optional(
                    Schema::new("MergeTree engine settings")
                        .attribute("parts_to_delay_insert", int(0))
                        .attribute("parts_to_throw_insert", int(0))
                        .attribute("max_bytes_to_merge_at_max_space_in_pool", int(0))
                        .attribute("replicated_deduplication_window", int(0)),
                ),
            ),
    )
}

pub(crate) fn connection_info_schema() -> Block {
    let text = || Attribute::computed(AttributeType::String);
    let port = || Attribute::computed(AttributeType::Int64);
    Block::computed(
        Schema::new("Credentials and endpoints")
            .attribute("host", text())
            .attribute("user", text())
            .attribute("password", text().sensitive())
            .attribute("https_port", port())
            .attribute("tcp_port_secure", port())
            .attribute("native_protocol", text())
            .attribute("https_uri", text())
            .attribute("jdbc_uri", text())
            .attribute("odbc_uri", text()),
    )
}

pub fn schema() -> Schema {
    cluster_identity("Managed ClickHouse cluster")
        .block("resources", resources_schema())
        .block("config", config_schema())
        .block("access", access_schema())
        .block("connection_info", connection_info_schema())
}

pub struct ClickhouseClusterResource {
    client: Arc<DcClient>,
}

impl ClickhouseClusterResource {
    pub fn new(client: Arc<DcClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: Arc<DcClient>) -> Arc<dyn Resource> {
        Arc::new(Self::new(client))
    }

    async fn fetch(&self, mut model: ClickhouseClusterModel, id: &str) -> DiagResult<Value> {
        let remote = api::get_cluster(&self.client, id)
            .await
            .map_err(|e| Diagnostics::api("read clickhouse cluster", e))?;
        model.apply_remote(&remote);
        encode(&model)
    }
}

#[async_trait]
impl Resource for ClickhouseClusterResource {
    fn type_name(&self) -> String {
        full_type_name("clickhouse_cluster")
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn validate_config(&self, config: &Value) -> Diagnostics {
        match decode::<ClickhouseClusterModel>(config.clone()) {
            Ok(model) => model.to_create_request().err().unwrap_or_default(),
            Err(diags) => diags,
        }
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> DiagResult<Value> {
        let model: ClickhouseClusterModel = decode(plan.clone())?;
        let request = model.to_create_request()?;
        tracing::info!("Creating clickhouse cluster {:?} in {}", request.name, request.project_id);

        let issued = api::create_cluster(&self.client, &request).await;
        let id = wait_created(&self.client, ctx, Service::ClickHouse, "create clickhouse cluster", issued, &plan).await?;
        self.fetch(model, &id)
            .await
            .map_err(|diags| created_partially(diags, &plan, &id))
    }

    async fn read(&self, _ctx: &OpContext, state: Value) -> DiagResult<Value> {
        let model: ClickhouseClusterModel = decode(state)?;
        let id = require_id(&model.id)?;
        self.fetch(model, &id).await
    }

    async fn update(&self, ctx: &OpContext, prior: Value, plan: Value) -> DiagResult<Value> {
        let prior: ClickhouseClusterModel = decode(prior)?;
        let id = require_id(&prior.id)?;
        let model: ClickhouseClusterModel = decode(plan)?;
        let request = model.to_update_request()?;
        tracing::info!("Updating clickhouse cluster {}", id);

        let issued = api::update_cluster(&self.client, &id, &request).await;
        wait(&self.client, ctx, Service::ClickHouse, "update clickhouse cluster", issued).await?;
        self.fetch(model, &id).await
    }

    async fn delete(&self, ctx: &OpContext, state: Value) -> DiagResult<()> {
        let model: ClickhouseClusterModel = decode(state)?;
        let id = require_id(&model.id)?;
        tracing::info!("Deleting clickhouse cluster {}", id);
        let issued = api::delete_cluster(&self.client, &id).await;
        wait_deleted(&self.client, ctx, Service::ClickHouse, "delete clickhouse cluster", issued).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_validation_collects_config_errors() {
        let diags = schema().validate(&json!({
            "project_id": "p1", "name": "ch", "region_id": "eu-central-1", "cloud_type": "aws",
            "resources": {"clickhouse": {"resource_preset_id": "s1-c2-m4", "disk_size": 34359738368_i64}},
            "config": {"log_level": "VERBOSE", "keep_alive_timeout": "a while"}
        }));
        let rendered = diags.to_string();
        assert!(rendered.contains("config.log_level"));
        assert!(rendered.contains("config.keep_alive_timeout"));
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_connection_info_is_read_only() {
        let diags = schema().validate(&json!({
            "project_id": "p1", "name": "ch", "region_id": "r", "cloud_type": "aws",
            "resources": {"clickhouse": {"resource_preset_id": "s1-c2-m4", "disk_size": 1}},
            "connection_info": {"password": "x"}
        }));
        assert!(diags.to_string().contains("connection_info"));
    }

    #[test]
    fn test_password_is_sensitive() {
        assert!(schema()
            .sensitive_paths()
            .contains(&"connection_info.password".to_string()));
    }
}
