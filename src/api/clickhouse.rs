//! ClickHouse service: managed ClickHouse clusters

use super::client::DcClient;
use super::error::Result;
use super::operation::Operation;
use super::pager::{Named, Pager};
use super::wire::{int64, opt_int64, Access};
use serde::{Deserialize, Serialize};

/// ClickHouse node group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseNodes {
    pub resource_preset_id: String,
    #[serde(with = "int64")]
    pub disk_size: i64,
    #[serde(with = "int64")]
    pub replica_count: i64,
    #[serde(with = "int64")]
    pub shard_count: i64,
}

/// Dedicated ClickHouse Keeper node group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeeperNodes {
    pub resource_preset_id: String,
    #[serde(with = "int64")]
    pub disk_size: i64,
    #[serde(with = "int64")]
    pub replica_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterResources {
    pub clickhouse: Option<ClickhouseNodes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedicated_keeper: Option<KeeperNodes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeTree {
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub parts_to_delay_insert: Option<i64>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub parts_to_throw_insert: Option<i64>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub max_bytes_to_merge_at_max_space_in_pool: Option<i64>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub replicated_deduplication_window: Option<i64>,
}

/// Server configuration knobs; durations are protobuf-JSON strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub max_concurrent_queries: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive_timeout: Option<String>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub uncompressed_cache_size: Option<i64>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub mark_cache_size: Option<i64>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub query_log_retention_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_log_retention_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_tree: Option<MergeTree>,
}

/// Credentials and endpoints, only present when requested with `sensitive=true`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionInfo {
    pub host: String,
    pub user: String,
    pub password: String,
    #[serde(with = "int64")]
    pub https_port: i64,
    #[serde(with = "int64")]
    pub tcp_port_secure: i64,
    pub native_protocol: String,
    pub https_uri: String,
    pub jdbc_uri: String,
    pub odbc_uri: String,
}

/// ClickHouse cluster as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cluster {
    pub id: String,
    pub project_id: String,
    pub cloud_type: String,
    pub region_id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub network_id: String,
    pub status: String,
    pub resources: Option<ClusterResources>,
    pub config: Option<ClickhouseConfig>,
    pub access: Option<Access>,
    pub connection_info: Option<ConnectionInfo>,
}

impl Named for Cluster {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterRequest {
    pub project_id: String,
    pub cloud_type: String,
    pub region_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub resources: ClusterResources,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ClickhouseConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClusterRequest {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub resources: ClusterResources,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ClickhouseConfig>,
}

pub async fn create_cluster(client: &DcClient, request: &CreateClusterRequest) -> Result<Operation> {
    client.post(&client.clickhouse_url("clusters"), request).await
}

/// Get a cluster including its connection credentials
pub async fn get_cluster(client: &DcClient, id: &str) -> Result<Cluster> {
    client
        .get(&client.clickhouse_url(&format!("clusters/{}?sensitive=true", id)))
        .await
}

pub async fn update_cluster(
    client: &DcClient,
    id: &str,
    request: &UpdateClusterRequest,
) -> Result<Operation> {
    client
        .patch(&client.clickhouse_url(&format!("clusters/{}", id)), request)
        .await
}

pub async fn delete_cluster(client: &DcClient, id: &str) -> Result<Operation> {
    client.delete(&client.clickhouse_url(&format!("clusters/{}", id))).await
}

pub fn list_clusters<'a>(client: &'a DcClient, project_id: &str) -> Pager<'a, Cluster> {
    Pager::new(client, client.clickhouse_url("clusters"), "clusters").param("projectId", project_id)
}
