//! Model <-> API conversions for ClickHouse clusters

use super::model::{
    ClickhouseClusterModel, ConfigModel, ConnectionInfoModel, KeeperModel, MergeTreeModel,
    NodesModel, ResourcesModel,
};
use crate::api::clickhouse::{
    ClickhouseConfig, ClickhouseNodes, Cluster, ClusterResources, ConnectionInfo,
    CreateClusterRequest, KeeperNodes, MergeTree, UpdateClusterRequest,
};
use crate::framework::{DiagResult, Diagnostics};
use crate::resources::{
    duration_from_api, duration_to_api, keep_case, optional_string, AccessModel,
};

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Keep a remote value only for fields the configuration manages
fn tracked<T: Clone>(prior: &Option<T>, remote: &Option<T>) -> Option<T> {
    prior.as_ref().and(remote.clone())
}

pub fn resources_to_api(
    resources: &Option<ResourcesModel>,
    diags: &mut Diagnostics,
) -> ClusterResources {
    let Some(resources) = resources else {
        diags.add_attribute_error(
            "resources",
            "Missing required block",
            "the resources block is mandatory",
        );
        return ClusterResources::default();
    };

    let clickhouse = match &resources.clickhouse {
        Some(nodes) => Some(ClickhouseNodes {
            resource_preset_id: text(&nodes.resource_preset_id),
            disk_size: nodes.disk_size.unwrap_or_default(),
            replica_count: nodes.replica_count.unwrap_or(1),
            shard_count: nodes.shard_count.unwrap_or(1),
        }),
        None => {
            diags.add_attribute_error(
                "resources.clickhouse",
                "Missing required block",
                "the clickhouse resources block is mandatory",
            );
            None
        }
    };

    ClusterResources {
        clickhouse,
        dedicated_keeper: resources.dedicated_keeper.as_ref().map(|keeper| KeeperNodes {
            resource_preset_id: text(&keeper.resource_preset_id),
            disk_size: keeper.disk_size.unwrap_or_default(),
            replica_count: keeper.replica_count.unwrap_or(1),
        }),
    }
}

pub fn config_to_api(config: &ConfigModel, diags: &mut Diagnostics) -> ClickhouseConfig {
    ClickhouseConfig {
        log_level: config.log_level.clone(),
        max_connections: config.max_connections,
        max_concurrent_queries: config.max_concurrent_queries,
        keep_alive_timeout: duration_to_api(
            "config.keep_alive_timeout",
            &config.keep_alive_timeout,
            diags,
        ),
        uncompressed_cache_size: config.uncompressed_cache_size,
        mark_cache_size: config.mark_cache_size,
        query_log_retention_size: config.query_log_retention_size,
        query_log_retention_time: duration_to_api(
            "config.query_log_retention_time",
            &config.query_log_retention_time,
            diags,
        ),
        merge_tree: config.merge_tree.as_ref().map(|mt| MergeTree {
            parts_to_delay_insert: mt.parts_to_delay_insert,
            parts_to_throw_insert: mt.parts_to_throw_insert,
            max_bytes_to_merge_at_max_space_in_pool: mt.max_bytes_to_merge_at_max_space_in_pool,
            replicated_deduplication_window: mt.replicated_deduplication_window,
        }),
    }
}

fn resources_from_api(prior: Option<&ResourcesModel>, remote: &ClusterResources) -> ResourcesModel {
    let prior_keeper = prior.and_then(|r| r.dedicated_keeper.as_ref());
    ResourcesModel {
        clickhouse: remote.clickhouse.as_ref().map(|nodes| NodesModel {
            resource_preset_id: Some(nodes.resource_preset_id.clone()),
            disk_size: Some(nodes.disk_size),
            replica_count: Some(nodes.replica_count),
            shard_count: Some(nodes.shard_count),
        }),
        dedicated_keeper: remote
            .dedicated_keeper
            .as_ref()
            .filter(|k| prior_keeper.is_some() || !k.resource_preset_id.is_empty())
            .map(|keeper| KeeperModel {
                resource_preset_id: Some(keeper.resource_preset_id.clone()),
                disk_size: Some(keeper.disk_size),
                replica_count: Some(keeper.replica_count),
            }),
    }
}

fn config_from_api(prior: &ConfigModel, remote: &ClickhouseConfig) -> ConfigModel {
    ConfigModel {
        log_level: tracked(&prior.log_level, &remote.log_level),
        max_connections: tracked(&prior.max_connections, &remote.max_connections),
        max_concurrent_queries: tracked(&prior.max_concurrent_queries, &remote.max_concurrent_queries),
        keep_alive_timeout: prior
            .keep_alive_timeout
            .as_ref()
            .and(duration_from_api(&prior.keep_alive_timeout, &remote.keep_alive_timeout)),
        uncompressed_cache_size: tracked(&prior.uncompressed_cache_size, &remote.uncompressed_cache_size),
        mark_cache_size: tracked(&prior.mark_cache_size, &remote.mark_cache_size),
        query_log_retention_size: tracked(
            &prior.query_log_retention_size,
            &remote.query_log_retention_size,
        ),
        query_log_retention_time: prior.query_log_retention_time.as_ref().and(duration_from_api(
            &prior.query_log_retention_time,
            &remote.query_log_retention_time,
        )),
        merge_tree: match (&prior.merge_tree, &remote.merge_tree) {
            (Some(p), Some(r)) => Some(MergeTreeModel {
                parts_to_delay_insert: tracked(&p.parts_to_delay_insert, &r.parts_to_delay_insert),
                parts_to_throw_insert: tracked(&p.parts_to_throw_insert, &r.parts_to_throw_insert),
                max_bytes_to_merge_at_max_space_in_pool: tracked(
                    &p.max_bytes_to_merge_at_max_space_in_pool,
                    &r.max_bytes_to_merge_at_max_space_in_pool,
                ),
                replicated_deduplication_window: tracked(
                    &p.replicated_deduplication_window,
                    &r.replicated_deduplication_window,
                ),
            }),
            _ => None,
        },
    }
}

pub(crate) fn connection_info_from_api(remote: &ConnectionInfo) -> ConnectionInfoModel {
    ConnectionInfoModel {
        host: Some(remote.host.clone()),
        user: Some(remote.user.clone()),
        password: Some(remote.password.clone()),
        https_port: Some(remote.https_port),
        tcp_port_secure: Some(remote.tcp_port_secure),
        native_protocol: Some(remote.native_protocol.clone()),
        https_uri: Some(remote.https_uri.clone()),
        jdbc_uri: Some(remote.jdbc_uri.clone()),
        odbc_uri: Some(remote.odbc_uri.clone()),
    }
}

impl ClickhouseClusterModel {
    /// Build the create request, collecting every conversion problem
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

        if let Some(resources) = &remote.resources {
            self.resources = Some(resources_from_api(self.resources.as_ref(), resources));
        }
        self.config = match (&self.config, &remote.config) {
            (Some(prior), Some(remote)) => Some(config_from_api(prior, remote)),
            (Some(_), None) => Some(ConfigModel::default()),
            (None, _) => None,
        };
        if let Some(access) = &remote.access {
            if self.access.is_some() {
                self.access = Some(AccessModel::from_api(self.access.as_ref(), access));
            }
        }
        self.connection_info = remote.connection_info.as_ref().map(connection_info_from_api);
    }
}
