//! `doublecloud_transfer_endpoint`
//!
//! Source or target of a data transfer. `settings` holds exactly one endpoint
//! kind; passwords and keys are write-only and kept from prior state.

pub mod convert;
pub mod model;

use super::{created_partially, require_id, wait, wait_created, wait_deleted};
use crate::api::client::Service;
use crate::api::transfer as api;
use crate::api::DcClient;
use crate::context::OpContext;
use crate::framework::{
    decode, encode, full_type_name, Attribute, AttributeType, Block, DiagResult, Diagnostics,
    Resource, Schema,
};
use async_trait::async_trait;
use model::TransferEndpointModel;
use serde_json::Value;
use std::sync::Arc;

fn string() -> Attribute {
    Attribute::optional(AttributeType::String)
}

fn strings() -> Attribute {
    Attribute::optional(AttributeType::StringList)
}

fn on_premise_connection() -> Block {
    Block::required(
        Schema::new("Connection").block(
            "on_premise",
            Block::required(
                Schema::new("Self-managed database")
                    .attribute("hosts", Attribute::required(AttributeType::StringList))
                    .attribute("port", Attribute::required(AttributeType::Int64))
                    .attribute("ca_certificate", string()),
            ),
        ),
    )
}

fn credentials(schema: Schema) -> Schema {
    schema
        .attribute("database", Attribute::required(AttributeType::String))
        .attribute("user", Attribute::required(AttributeType::String))
        .attribute("password", string().sensitive())
}

fn clickhouse_connection() -> Block {
    Block::required(
        Schema::new("Exactly one of cluster_id or on_premise")
            .attribute("cluster_id", string())
            .block(
                "on_premise",
                Block::optional(
                    Schema::new("Self-managed ClickHouse")
                        .attribute("hosts", Attribute::required(AttributeType::StringList))
                        .attribute("http_port", Attribute::optional(AttributeType::Int64))
                        .attribute("native_port", Attribute::optional(AttributeType::Int64))
                        .attribute("ca_certificate", string()),
                ),
            ),
    )
}

fn kafka_source() -> Block {
    Block::optional(
        Schema::new("Kafka topic source")
            .attribute("topic_name", Attribute::required(AttributeType::String))
            .block(
                "connection",
                Block::required(
                    Schema::new("Exactly one of cluster_id or broker_urls")
                        .attribute("cluster_id", string())
                        .attribute("broker_urls", strings()),
                ),
            )
            .block(
                "auth",
                Block::required(
                    Schema::new("Exactly one of sasl or no_auth")
                        .block(
                            "sasl",
                            Block::optional(
                                Schema::new("SASL authentication")
                                    .attribute("user", Attribute::required(AttributeType::String))
                                    .attribute("password", string().sensitive())
                                    .attribute(
                                        "mechanism",
                                        Attribute::required(AttributeType::String),
                                    ),
                            ),
                        )
                        .block("no_auth", Block::optional(Schema::new("No authentication"))),
                ),
            ),
    )
}

fn s3_source() -> Block {
    let format = Schema::new("Exactly one of csv, parquet, avro or jsonl")
        .block(
            "csv",
            Block::optional(
                Schema::new("CSV objects")
                    .attribute("delimiter", string())
                    .attribute("quote_char", string())
                    .attribute("escape_char", string())
                    .attribute("encoding", string())
                    .attribute("double_quote", Attribute::optional(AttributeType::Bool))
                    .attribute("newlines_in_values", Attribute::optional(AttributeType::Bool))
                    .attribute("block_size", Attribute::optional(AttributeType::Int64)),
            ),
        )
        .block(
            "parquet",
            Block::optional(
                Schema::new("Parquet objects")
                    .attribute("buffer_size", Attribute::optional(AttributeType::Int64))
                    .attribute("columns", strings()),
            ),
        )
        .block("avro", Block::optional(Schema::new("Avro objects")))
        .block(
            "jsonl",
            Block::optional(
                Schema::new("JSON lines objects")
                    .attribute("newlines_in_values", Attribute::optional(AttributeType::Bool))
                    .attribute("unexpected_field_behavior", string())
                    .attribute("block_size", Attribute::optional(AttributeType::Int64)),
            ),
        );

    Block::optional(
        Schema::new("Objects in an S3-compatible bucket")
            .attribute("dataset", Attribute::required(AttributeType::String))
            .attribute("path_pattern", Attribute::required(AttributeType::String))
            .attribute("schema", string())
            .block("format", Block::required(format))
            .block(
                "provider",
                Block::required(
                    Schema::new("Bucket access")
                        .attribute("bucket", Attribute::required(AttributeType::String))
                        .attribute("aws_access_key_id", string())
                        .attribute("aws_secret_access_key", string().sensitive())
                        .attribute("endpoint", string())
                        .attribute("region", string()),
                ),
            ),
    )
}

fn settings_schema() -> Block {
    Block::required(
        Schema::new("Exactly one endpoint kind")
            .block(
                "postgres_source",
                Block::optional(
                    credentials(Schema::new("PostgreSQL source"))
                        .block("connection", on_premise_connection())
                        .attribute("include_tables", strings())
                        .attribute("exclude_tables", strings())
                        .attribute("service_schema", string())
                        .attribute("slot_byte_lag_limit", Attribute::optional(AttributeType::Int64)),
                ),
            )
            .block(
                "postgres_target",
                Block::optional(
                    credentials(Schema::new("PostgreSQL target"))
                        .block("connection", on_premise_connection())
                        .attribute("cleanup_policy", string()),
                ),
            )
            .block(
                "mysql_source",
                Block::optional(
                    credentials(Schema::new("MySQL source"))
                        .block("connection", on_premise_connection())
                        .attribute("include_tables_regex", strings())
                        .attribute("exclude_tables_regex", strings())
                        .attribute("timezone", string()),
                ),
            )
            .block(
                "clickhouse_source",
                Block::optional(
                    credentials(Schema::new("ClickHouse source"))
                        .block("connection", clickhouse_connection())
                        .attribute("include_tables", strings())
                        .attribute("exclude_tables", strings()),
                ),
            )
            .block(
                "clickhouse_target",
                Block::optional(
                    credentials(Schema::new("ClickHouse target"))
                        .block("connection", clickhouse_connection())
                        .attribute("clickhouse_cluster_name", string())
                        .attribute("cleanup_policy", string()),
                ),
            )
            .block("kafka_source", kafka_source())
            .block("s3_source", s3_source()),
    )
}

pub fn schema() -> Schema {
    Schema::new("Transfer source or target")
        .attribute("id", Attribute::id())
        .attribute(
            "project_id",
            Attribute::required(AttributeType::String).requires_replace(),
        )
        .attribute("name", Attribute::required(AttributeType::String))
        .attribute("description", string())
        .block("settings", settings_schema())
}

pub struct TransferEndpointResource {
    client: Arc<DcClient>,
}

impl TransferEndpointResource {
    pub fn new(client: Arc<DcClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: Arc<DcClient>) -> Arc<dyn Resource> {
        Arc::new(Self::new(client))
    }

    async fn fetch(&self, mut model: TransferEndpointModel, id: &str) -> DiagResult<Value> {
        let remote = api::get_endpoint(&self.client, id)
            .await
            .map_err(|e| Diagnostics::api("read transfer endpoint", e))?;
        model.apply_remote(&remote);
        encode(&model)
    }
}

#[async_trait]
impl Resource for TransferEndpointResource {
    fn type_name(&self) -> String {
        full_type_name("transfer_endpoint")
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn validate_config(&self, config: &Value) -> Diagnostics {
        match decode::<TransferEndpointModel>(config.clone()) {
            Ok(model) => model.to_create_request().err().unwrap_or_default(),
            Err(diags) => diags,
        }
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> DiagResult<Value> {
        let model: TransferEndpointModel = decode(plan.clone())?;
        let request = model.to_create_request()?;
        tracing::info!("Creating transfer endpoint {:?} in {}", request.name, request.project_id);

        let issued = api::create_endpoint(&self.client, &request).await;
        let id = wait_created(&self.client, ctx, Service::Transfer, "create transfer endpoint", issued, &plan).await?;
        self.fetch(model, &id)
            .await
            .map_err(|diags| created_partially(diags, &plan, &id))
    }

    async fn read(&self, _ctx: &OpContext, state: Value) -> DiagResult<Value> {
        let model: TransferEndpointModel = decode(state)?;
        let id = require_id(&model.id)?;
        self.fetch(model, &id).await
    }

    async fn update(&self, ctx: &OpContext, prior: Value, plan: Value) -> DiagResult<Value> {
        let prior: TransferEndpointModel = decode(prior)?;
        let id = require_id(&prior.id)?;
        let model: TransferEndpointModel = decode(plan)?;
        let request = model.to_update_request()?;
        tracing::info!("Updating transfer endpoint {}", id);

        let issued = api::update_endpoint(&self.client, &id, &request).await;
        wait(&self.client, ctx, Service::Transfer, "update transfer endpoint", issued).await?;
        self.fetch(model, &id).await
    }

    async fn delete(&self, ctx: &OpContext, state: Value) -> DiagResult<()> {
        let model: TransferEndpointModel = decode(state)?;
        let id = require_id(&model.id)?;
        tracing::info!("Deleting transfer endpoint {}", id);
        let issued = api::delete_endpoint(&self.client, &id).await;
        wait_deleted(&self.client, ctx, Service::Transfer, "delete transfer endpoint", issued).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::{test_client, DEFAULT_ENDPOINT};
    use serde_json::json;

    #[test]
    fn test_schema_accepts_s3_source() {
        let config = json!({
            "project_id": "p1",
            "name": "raw-events",
            "settings": {"s3_source": {
                "dataset": "events",
                "path_pattern": "events/*.jsonl",
                "format": {"jsonl": {"newlines_in_values": true}},
                "provider": {"bucket": "raw", "aws_secret_access_key": "k"}
            }}
        });
        assert!(schema().validate(&config).is_empty());
        let resource = TransferEndpointResource::new(Arc::new(test_client(DEFAULT_ENDPOINT)));
        assert!(resource.validate_config(&config).is_empty());
    }

    #[test]
    fn test_secrets_are_sensitive() {
        let paths = schema().sensitive_paths();
        assert!(paths.contains(&"settings.postgres_source.password".to_string()));
        assert!(paths.contains(&"settings.s3_source.provider.aws_secret_access_key".to_string()));
        assert!(paths.contains(&"settings.kafka_source.auth.sasl.password".to_string()));
    }
}
