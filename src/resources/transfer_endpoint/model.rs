use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferEndpointModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub settings: Option<SettingsModel>,
}

/// Holds exactly one endpoint kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsModel {
    pub postgres_source: Option<PostgresSourceModel>,
    pub postgres_target: Option<PostgresTargetModel>,
    pub mysql_source: Option<MysqlSourceModel>,
    pub clickhouse_source: Option<ClickhouseSourceModel>,
    pub clickhouse_target: Option<ClickhouseTargetModel>,
    pub kafka_source: Option<KafkaSourceModel>,
    pub s3_source: Option<S3SourceModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnPremiseModel {
    pub hosts: Option<Vec<String>>,
    pub port: Option<i64>,
    pub ca_certificate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConnectionModel {
    pub on_premise: Option<OnPremiseModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresSourceModel {
    pub connection: Option<DbConnectionModel>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub include_tables: Option<Vec<String>>,
    pub exclude_tables: Option<Vec<String>>,
    pub service_schema: Option<String>,
    pub slot_byte_lag_limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresTargetModel {
    pub connection: Option<DbConnectionModel>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub cleanup_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MysqlSourceModel {
    pub connection: Option<DbConnectionModel>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub include_tables_regex: Option<Vec<String>>,
    pub exclude_tables_regex: Option<Vec<String>>,
    pub timezone: Option<String>,
}

/// Holds exactly one of `cluster_id` or `on_premise`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickhouseConnectionModel {
    pub cluster_id: Option<String>,
    pub on_premise: Option<ClickhouseOnPremiseModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickhouseOnPremiseModel {
    pub hosts: Option<Vec<String>>,
    pub http_port: Option<i64>,
    pub native_port: Option<i64>,
    pub ca_certificate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickhouseSourceModel {
    pub connection: Option<ClickhouseConnectionModel>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub include_tables: Option<Vec<String>>,
    pub exclude_tables: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickhouseTargetModel {
    pub connection: Option<ClickhouseConnectionModel>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub clickhouse_cluster_name: Option<String>,
    pub cleanup_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConnectionModel {
    pub cluster_id: Option<String>,
    pub broker_urls: Option<Vec<String>>,
}

/// Holds exactly one of `sasl` or `no_auth`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaAuthModel {
    pub sasl: Option<SaslModel>,
    pub no_auth: Option<EmptyModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaslModel {
    pub user: Option<String>,
    pub password: Option<String>,
    pub mechanism: Option<String>,
}

/// Marker block without attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyModel {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaSourceModel {
    pub connection: Option<KafkaConnectionModel>,
    pub auth: Option<KafkaAuthModel>,
    pub topic_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3SourceModel {
    pub dataset: Option<String>,
    pub path_pattern: Option<String>,
    pub schema: Option<String>,
    pub format: Option<S3FormatModel>,
    pub provider: Option<S3ProviderModel>,
}

/// Holds exactly one of `csv`, `parquet`, `avro` or `jsonl`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3FormatModel {
    pub csv: Option<CsvModel>,
    pub parquet: Option<ParquetModel>,
    pub avro: Option<EmptyModel>,
    pub jsonl: Option<JsonlModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvModel {
    pub delimiter: Option<String>,
    pub quote_char: Option<String>,
    pub escape_char: Option<String>,
    pub encoding: Option<String>,
    pub double_quote: Option<bool>,
    pub newlines_in_values: Option<bool>,
    pub block_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParquetModel {
    pub buffer_size: Option<i64>,
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonlModel {
    pub newlines_in_values: Option<bool>,
    pub unexpected_field_behavior: Option<String>,
    pub block_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3ProviderModel {
    pub bucket: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
}
