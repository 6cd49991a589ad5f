//! Kafka service: managed Kafka clusters

use super::client::DcClient;
use super::error::Result;
use super::operation::Operation;
use super::pager::{Named, Pager};
use super::wire::{int64, opt_int64, Access};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KafkaNodes {
    pub resource_preset_id: String,
    #[serde(with = "int64")]
    pub disk_size: i64,
    #[serde(with = "int64")]
    pub broker_count: i64,
    #[serde(with = "int64")]
    pub zone_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterResources {
    pub kafka: Option<KafkaNodes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaRegistry {
    pub enabled: bool,
}

/// Broker configuration; durations are protobuf-JSON strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KafkaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_type: Option<String>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub log_flush_interval_messages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_flush_interval: Option<String>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub log_retention_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_retention: Option<String>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub log_segment_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_preallocate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_create_topics_enable: Option<bool>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub num_partitions: Option<i64>,
    #[serde(with = "opt_int64", skip_serializing_if = "Option::is_none")]
    pub default_replication_factor: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionInfo {
    pub connection_string: String,
    pub user: String,
    pub password: String,
}

/// Kafka cluster as returned by the API
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
    pub schema_registry_config: Option<SchemaRegistry>,
    pub config: Option<KafkaConfig>,
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
    pub schema_registry_config: Option<SchemaRegistry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<KafkaConfig>,
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
    pub schema_registry_config: Option<SchemaRegistry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<KafkaConfig>,
}

pub async fn create_cluster(client: &DcClient, request: &CreateClusterRequest) -> Result<Operation> {
    client.post(&client.kafka_url("clusters"), request).await
}

/// Get a cluster including its connection credentials
pub async fn get_cluster(client: &DcClient, id: &str) -> Result<Cluster> {
    client
        .get(&client.kafka_url(&format!("clusters/{}?sensitive=true", id)))
        .await
}

pub async fn update_cluster(
    client: &DcClient,
    id: &str,
    request: &UpdateClusterRequest,
) -> Result<Operation> {
    client
        .patch(&client.kafka_url(&format!("clusters/{}", id)), request)
        .await
}

pub async fn delete_cluster(client: &DcClient, id: &str) -> Result<Operation> {
    client.delete(&client.kafka_url(&format!("clusters/{}", id))).await
}

pub fn list_clusters<'a>(client: &'a DcClient, project_id: &str) -> Pager<'a, Cluster> {
    Pager::new(client, client.kafka_url("clusters"), "clusters").param("projectId", project_id)
}
