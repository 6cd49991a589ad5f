//! Transfer service: endpoints and transfers

use super::client::DcClient;
use super::error::Result;
use super::operation::Operation;
use super::wire::{int64, opt_int64};
use serde::{Deserialize, Serialize};

// =============================================================================
// Endpoint settings
// =============================================================================

/// Write-only secret value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Secret {
    pub raw: String,
}

impl Secret {
    pub fn new(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(Self { raw: raw.to_string() })
        }
    }
}

/// Self-managed database reachable over the network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnPremise {
    pub hosts: Vec<String>,
    #[serde(with = "int64")]
    pub port: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ca_certificate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DbConnection {
    pub on_premise: OnPremise,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostgresSource {
    pub connection: DbConnection,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_schema: String,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub slot_byte_lag_limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostgresTarget {
    pub connection: DbConnection,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cleanup_policy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MysqlSource {
    pub connection: DbConnection,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    pub include_tables_regex: Vec<String>,
    pub exclude_tables_regex: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timezone: String,
}

/// ClickHouse connection: a managed cluster id or self-managed hosts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseConnection {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_premise: Option<ClickhouseOnPremise>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseOnPremise {
    pub hosts: Vec<String>,
    #[serde(with = "int64")]
    pub http_port: i64,
    #[serde(with = "int64")]
    pub native_port: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ca_certificate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseSource {
    pub connection: ClickhouseConnection,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseTarget {
    pub connection: ClickhouseConnection,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub clickhouse_cluster_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cleanup_policy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KafkaConnection {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_id: String,
    pub broker_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KafkaAuth {
    Sasl {
        user: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<Secret>,
        mechanism: String,
    },
    NoAuth {},
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaSource {
    #[serde(default)]
    pub connection: KafkaConnection,
    pub auth: KafkaAuth,
    #[serde(default)]
    pub topic_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsvFormat {
    pub delimiter: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub quote_char: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub escape_char: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encoding: String,
    pub double_quote: bool,
    pub newlines_in_values: bool,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub block_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParquetFormat {
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<i64>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonlFormat {
    pub newlines_in_values: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unexpected_field_behavior: String,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub block_size: Option<i64>,
}

/// Object format of an S3 source; exactly one variant on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum S3Format {
    Csv(CsvFormat),
    Parquet(ParquetFormat),
    Avro {},
    Jsonl(JsonlFormat),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct S3Provider {
    pub bucket: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub aws_access_key_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_secret_access_key: Option<Secret>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Source {
    #[serde(default)]
    pub dataset: String,
    #[serde(default)]
    pub path_pattern: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schema: String,
    pub format: S3Format,
    #[serde(default)]
    pub provider: S3Provider,
}

/// Endpoint settings; exactly one variant is present on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndpointSettings {
    PostgresSource(PostgresSource),
    PostgresTarget(PostgresTarget),
    MysqlSource(MysqlSource),
    ClickhouseSource(ClickhouseSource),
    ClickhouseTarget(ClickhouseTarget),
    KafkaSource(KafkaSource),
    S3Source(S3Source),
}

// =============================================================================
// Endpoints
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: Option<EndpointSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEndpointRequest {
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub settings: EndpointSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEndpointRequest {
    pub name: String,
    pub description: String,
    pub settings: EndpointSettings,
}

pub async fn create_endpoint(client: &DcClient, request: &CreateEndpointRequest) -> Result<Operation> {
    client.post(&client.transfer_url("endpoints"), request).await
}

pub async fn get_endpoint(client: &DcClient, id: &str) -> Result<Endpoint> {
    client.get(&client.transfer_url(&format!("endpoints/{}", id))).await
}

pub async fn update_endpoint(
    client: &DcClient,
    id: &str,
    request: &UpdateEndpointRequest,
) -> Result<Operation> {
    client
        .patch(&client.transfer_url(&format!("endpoints/{}", id)), request)
        .await
}

pub async fn delete_endpoint(client: &DcClient, id: &str) -> Result<Operation> {
    client.delete(&client.transfer_url(&format!("endpoints/{}", id))).await
}

// =============================================================================
// Transfers
// =============================================================================

/// Transfer states in which replication is running or starting
const ACTIVE_STATUSES: &[&str] = &[
    "TRANSFER_STATUS_ACTIVATING",
    "TRANSFER_STATUS_RUNNING",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transfer {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub transfer_type: String,
    pub status: String,
}

impl Transfer {
    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(&self.status.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub transfer_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransferRequest {
    pub name: String,
    pub description: String,
}

pub async fn create_transfer(client: &DcClient, request: &CreateTransferRequest) -> Result<Operation> {
    client.post(&client.transfer_url("transfers"), request).await
}

pub async fn get_transfer(client: &DcClient, id: &str) -> Result<Transfer> {
    client.get(&client.transfer_url(&format!("transfers/{}", id))).await
}

pub async fn update_transfer(
    client: &DcClient,
    id: &str,
    request: &UpdateTransferRequest,
) -> Result<Operation> {
    client
        .patch(&client.transfer_url(&format!("transfers/{}", id)), request)
        .await
}

pub async fn delete_transfer(client: &DcClient, id: &str) -> Result<Operation> {
    client.delete(&client.transfer_url(&format!("transfers/{}", id))).await
}

pub async fn activate_transfer(client: &DcClient, id: &str) -> Result<Operation> {
    client
        .post(&client.transfer_url(&format!("transfers/{}:activate", id)), &serde_json::json!({}))
        .await
}

pub async fn deactivate_transfer(client: &DcClient, id: &str) -> Result<Operation> {
    client
        .post(&client.transfer_url(&format!("transfers/{}:deactivate", id)), &serde_json::json!({}))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_s3_settings_wire_shape() {
        let settings = EndpointSettings::S3Source(S3Source {
            dataset: "events".into(),
            path_pattern: "*.avro".into(),
            schema: String::new(),
            format: S3Format::Avro {},
            provider: S3Provider {
                bucket: "raw".into(),
                ..Default::default()
            },
        });
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            json!({"s3Source": {
                "dataset": "events",
                "pathPattern": "*.avro",
                "format": {"avro": {}},
                "provider": {"bucket": "raw"}
            }})
        );
    }

    #[test]
    fn test_transfer_activity() {
        let mut t = Transfer {
            status: "TRANSFER_STATUS_RUNNING".into(),
            ..Default::default()
        };
        assert!(t.is_active());
        t.status = "TRANSFER_STATUS_STOPPED".into();
        assert!(!t.is_active());
    }
}
