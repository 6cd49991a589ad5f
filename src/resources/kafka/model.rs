use crate::resources::AccessModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaClusterModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub region_id: Option<String>,
    pub cloud_type: Option<String>,
    pub network_id: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub resources: Option<ResourcesModel>,
    pub schema_registry: Option<SchemaRegistryModel>,
    pub config: Option<ConfigModel>,
    pub access: Option<AccessModel>,
    pub connection_info: Option<ConnectionInfoModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesModel {
    pub kafka: Option<BrokersModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokersModel {
    pub resource_preset_id: Option<String>,
    pub disk_size: Option<i64>,
    pub broker_count: Option<i64>,
    pub zone_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaRegistryModel {
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigModel {
    pub compression_type: Option<String>,
    pub log_flush_interval_messages: Option<i64>,
    pub log_flush_interval: Option<String>,
    pub log_retention_bytes: Option<i64>,
    pub log_retention: Option<String>,
    pub log_segment_bytes: Option<i64>,
    pub log_preallocate: Option<bool>,
    pub auto_create_topics_enable: Option<bool>,
    pub num_partitions: Option<i64>,
    pub default_replication_factor: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionInfoModel {
    pub connection_string: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}
