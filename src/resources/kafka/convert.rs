//! Model <-> API conversions for Kafka clusters

use super::model::{
    BrokersModel, ConfigModel, ConnectionInfoModel, KafkaClusterModel, ResourcesModel,
    SchemaRegistryModel,
};
use crate::api::kafka::{
    Cluster, ClusterResources, ConnectionInfo, CreateClusterRequest, KafkaConfig, KafkaNodes,
    SchemaRegistry, UpdateClusterRequest,
};
use crate::framework::{DiagResult, Diagnostics};
use crate::resources::{
    duration_from_api, duration_to_api, keep_case, optional_string, AccessModel,
};

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn tracked<T: Clone>(prior: &Option<T>, remote: &Option<T>) -> Option<T> {
    prior.as_ref().and(remote.clone())
}

pub fn resources_to_api(
    resources: &Option<ResourcesModel>,
    diags: &mut Diagnostics,
) -> ClusterResources {
    let kafka = match resources.as_ref().map(|r| &r.kafka) {
        None => {
            diags.add_attribute_error(
                "resources",
                "Missing required block",
                "the resources block is mandatory",
            );
            None
        }
        Some(None) => {
            diags.add_attribute_error(
                "resources.kafka",
                "Missing required block",
                "the kafka resources block is mandatory",
            );
            None
        }
        Some(Some(brokers)) => Some(KafkaNodes {
            resource_preset_id: text(&brokers.resource_preset_id),
            disk_size: brokers.disk_size.unwrap_or_default(),
            broker_count: brokers.broker_count.unwrap_or(1),
            zone_count: brokers.zone_count.unwrap_or(1),
        }),
    };
    ClusterResources { kafka }
}

pub fn config_to_api(config: &ConfigModel, diags: &mut Diagnostics) -> KafkaConfig {
    KafkaConfig {
        // Accepted in any case, sent in the API's spelling
        compression_type: config.compression_type.as_ref().map(|c| c.to_ascii_uppercase()),
        log_flush_interval_messages: config.log_flush_interval_messages,
        log_flush_interval: duration_to_api(
            "config.log_flush_interval",
            &config.log_flush_interval,
            diags,
        ),
        log_retention_bytes: config.log_retention_bytes,
        log_retention: duration_to_api("config.log_retention", &config.log_retention, diags),
        log_segment_bytes: config.log_segment_bytes,
        log_preallocate: config.log_preallocate,
        auto_create_topics_enable: config.auto_create_topics_enable,
        num_partitions: config.num_partitions,
        default_replication_factor: config.default_replication_factor,
    }
}

fn config_from_api(prior: &ConfigModel, remote: &KafkaConfig) -> ConfigModel {
    ConfigModel {
        compression_type: match (&prior.compression_type, &remote.compression_type) {
            (Some(_), Some(r)) => keep_case(&prior.compression_type, r),
            _ => None,
        },
        log_flush_interval_messages: tracked(
            &prior.log_flush_interval_messages,
            &remote.log_flush_interval_messages,
        ),
        log_flush_interval: prior
            .log_flush_interval
            .as_ref()
            .and(duration_from_api(&prior.log_flush_interval, &remote.log_flush_interval)),
        log_retention_bytes: tracked(&prior.log_retention_bytes, &remote.log_retention_bytes),
        log_retention: prior
            .log_retention
            .as_ref()
            .and(duration_from_api(&prior.log_retention, &remote.log_retention)),
        log_segment_bytes: tracked(&prior.log_segment_bytes, &remote.log_segment_bytes),
        log_preallocate: tracked(&prior.log_preallocate, &remote.log_preallocate),
        auto_create_topics_enable: tracked(
            &prior.auto_create_topics_enable,
            &remote.auto_create_topics_enable,
        ),
        num_partitions: tracked(&prior.num_partitions, &remote.num_partitions),
        default_replication_factor: tracked(
            &prior.default_replication_factor,
            &remote.default_replication_factor,
        ),
    }
}

impl KafkaClusterModel {
    fn schema_registry_to_api(&self) -> Option<SchemaRegistry> {
        self.schema_registry.as_ref().map(|sr| SchemaRegistry {
            enabled: sr.enabled.unwrap_or(false),
        })
    }

    pub fn to_create_request(&self) -> DiagResult<CreateClusterRequest> {
        let mut diags = Diagnostics::new();
        let resources = resources_to_api(&self.resources, &mut diags);
        let config = self.config.as_ref().map(|c| config_to_api(c, &mut diags));
        diags.into_result()?;

        Ok(CreateClusterRequest {
            project_id: text(&self.project_id),
            cloud_type: text(&self.cloud_type).to_ascii_lowercase(),
            region_id: text(&self.region_id),
            name: text(&self.name),
            description: text(&self.description),
            version: text(&self.version),
            resources,
            network_id: text(&self.network_id),
            schema_registry_config: self.schema_registry_to_api(),
            access: self.access.as_ref().map(AccessModel::to_api),
            config,
        })
    }

    pub fn to_update_request(&self) -> DiagResult<UpdateClusterRequest> {
        let mut diags = Diagnostics::new();
        let resources = resources_to_api(&self.resources, &mut diags);
        let config = self.config.as_ref().map(|c| config_to_api(c, &mut diags));
        diags.into_result()?;

        Ok(UpdateClusterRequest {
            name: text(&self.name),
            description: text(&self.description),
            version: text(&self.version),
            resources,
            schema_registry_config: self.schema_registry_to_api(),
            access: self.access.as_ref().map(AccessModel::to_api),
            config,
        })
    }

    pub fn apply_remote(&mut self, remote: &Cluster) {
        self.id = Some(remote.id.clone());
        self.project_id = Some(remote.project_id.clone());
        self.name = Some(remote.name.clone());
        self.region_id = Some(remote.region_id.clone());
        self.cloud_type = keep_case(&self.cloud_type, &remote.cloud_type);
        self.network_id = optional_string(&self.network_id, &remote.network_id);
        self.description = optional_string(&self.description, &remote.description);
        self.version = optional_string(&self.version, &remote.version);

        if let Some(kafka) = remote.resources.as_ref().and_then(|r| r.kafka.as_ref()) {
            self.resources = Some(ResourcesModel {
                kafka: Some(BrokersModel {
                    resource_preset_id: Some(kafka.resource_preset_id.clone()),
                    disk_size: Some(kafka.disk_size),
                    broker_count: Some(kafka.broker_count),
                    zone_count: Some(kafka.zone_count),
                }),
            });
        }

        if let Some(sr) = &remote.schema_registry_config {
            if self.schema_registry.is_some() || sr.enabled {
                self.schema_registry = Some(SchemaRegistryModel {
                    enabled: Some(sr.enabled),
                });
            }
        }

        self.config = match (&self.config, &remote.config) {
            (Some(prior), Some(remote)) => Some(config_from_api(prior, remote)),
            (Some(_), None) => Some(ConfigModel::default()),
            (None, _) => None,
        };
        if let (Some(prior), Some(access)) = (&self.access, &remote.access) {
            self.access = Some(AccessModel::from_api(Some(prior), access));
        }
        self.connection_info = remote.connection_info.as_ref().map(connection_info_from_api);
    }
}

pub(crate) fn connection_info_from_api(info: &ConnectionInfo) -> ConnectionInfoModel {
    ConnectionInfoModel {
        connection_string: Some(info.connection_string.clone()),
        user: Some(info.user.clone()),
        password: Some(info.password.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted() -> KafkaClusterModel {
        KafkaClusterModel {
            project_id: Some("p1".into()),
            name: Some("events".into()),
            region_id: Some("eu-central-1".into()),
            cloud_type: Some("aws".into()),
            resources: Some(ResourcesModel {
                kafka: Some(BrokersModel {
                    resource_preset_id: Some("s1-c2-m4".into()),
                    disk_size: Some(34359738368),
                    broker_count: Some(1),
                    zone_count: Some(1),
                }),
            }),
            schema_registry: Some(SchemaRegistryModel { enabled: Some(false) }),
            config: Some(ConfigModel {
                compression_type: Some("compression_type_zstd".into()),
                log_retention: Some("168h".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_kafka_block_rejected() {
        let model = KafkaClusterModel {
            resources: Some(ResourcesModel { kafka: None }),
            ..submitted()
        };
        let err = model.to_create_request().unwrap_err();
        assert!(err.to_string().contains("resources.kafka"));
    }

    #[test]
    fn test_compression_sent_uppercase() {
        let request = submitted().to_create_request().unwrap();
        let config = request.config.unwrap();
        assert_eq!(config.compression_type.as_deref(), Some("COMPRESSION_TYPE_ZSTD"));
        assert_eq!(config.log_retention.as_deref(), Some("604800s"));
    }

    #[test]
    fn test_round_trip_preserves_user_fields() {
        let model = submitted();
        let request = model.to_create_request().unwrap();
        let remote = Cluster {
            id: "k1".into(),
            project_id: request.project_id.clone(),
            cloud_type: request.cloud_type.clone(),
            region_id: request.region_id.clone(),
            name: request.name.clone(),
            resources: Some(request.resources.clone()),
            schema_registry_config: request.schema_registry_config.clone(),
            config: request.config.clone(),
            connection_info: Some(ConnectionInfo {
                connection_string: "k1.at.double.cloud:9091".into(),
                user: "admin".into(),
                password: "secret".into(),
            }),
            ..Default::default()
        };
        let mut read = model.clone();
        read.apply_remote(&remote);
        assert_eq!(read.resources, model.resources);
        assert_eq!(read.schema_registry, model.schema_registry);
        assert_eq!(read.config, model.config);
        assert_eq!(read.connection_info.unwrap().user.as_deref(), Some("admin"));
    }
}
