use crate::resources::AccessModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickhouseClusterModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub region_id: Option<String>,
    pub cloud_type: Option<String>,
    pub network_id: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub resources: Option<ResourcesModel>,
    pub config: Option<ConfigModel>,
    pub access: Option<AccessModel>,
    pub connection_info: Option<ConnectionInfoModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesModel {
    pub clickhouse: Option<NodesModel>,
    pub dedicated_keeper: Option<KeeperModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesModel {
    pub resource_preset_id: Option<String>,
    pub disk_size: Option<i64>,
    pub replica_count: Option<i64>,
    pub shard_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperModel {
    pub resource_preset_id: Option<String>,
    pub disk_size: Option<i64>,
    pub replica_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigModel {
    pub log_level: Option<String>,
    pub max_connections: Option<i64>,
    pub max_concurrent_queries: Option<i64>,
    pub keep_alive_timeout: Option<String>,
    pub uncompressed_cache_size: Option<i64>,
    pub mark_cache_size: Option<i64>,
    pub query_log_retention_size: Option<i64>,
    pub query_log_retention_time: Option<String>,
    pub merge_tree: Option<MergeTreeModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeTreeModel {
    pub parts_to_delay_insert: Option<i64>,
    pub parts_to_throw_insert: Option<i64>,
    pub max_bytes_to_merge_at_max_space_in_pool: Option<i64>,
    pub replicated_deduplication_window: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionInfoModel {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub https_port: Option<i64>,
    pub tcp_port_secure: Option<i64>,
    pub native_protocol: Option<String>,
    pub https_uri: Option<String>,
    pub jdbc_uri: Option<String>,
    pub odbc_uri: Option<String>,
}
