//! `doublecloud_clickhouse` data source

use super::{lookup_schema, Lookup};
use crate::api::clickhouse::{self as api, Cluster};
use crate::api::pager::find_id_by_name;
use crate::api::DcClient;
use crate::context::OpContext;
use crate::framework::{
    decode, encode, full_type_name, Attribute, AttributeType, DataSource, DiagResult, Diagnostics,
    Schema,
};
use crate::resources::clickhouse::connection_info_schema;
use crate::resources::clickhouse::convert::connection_info_from_api;
use crate::resources::clickhouse::model::ConnectionInfoModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickhouseDataModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub project_id: Option<String>,
    pub region_id: Option<String>,
    pub cloud_type: Option<String>,
    pub network_id: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub connection_info: Option<ConnectionInfoModel>,
}

impl From<&Cluster> for ClickhouseDataModel {
    fn from(remote: &Cluster) -> Self {
        Self {
            id: Some(remote.id.clone()),
            name: Some(remote.name.clone()),
            project_id: Some(remote.project_id.clone()),
            region_id: Some(remote.region_id.clone()),
            cloud_type: Some(remote.cloud_type.clone()),
            network_id: Some(remote.network_id.clone()),
            version: Some(remote.version.clone()),
            description: Some(remote.description.clone()),
            connection_info: remote.connection_info.as_ref().map(connection_info_from_api),
        }
    }
}

pub fn schema() -> Schema {
    let computed = || Attribute::computed(AttributeType::String);
    lookup_schema("Existing ClickHouse cluster, looked up by id or by name")
        .attribute("region_id", computed())
        .attribute("cloud_type", computed())
        .attribute("network_id", computed())
        .attribute("version", computed())
        .attribute("description", computed())
        .block("connection_info", connection_info_schema())
}

pub struct ClickhouseDataSource {
    client: Arc<DcClient>,
}

impl ClickhouseDataSource {
    pub fn new(client: Arc<DcClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: Arc<DcClient>) -> Arc<dyn DataSource> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl DataSource for ClickhouseDataSource {
    fn type_name(&self) -> String {
        full_type_name("clickhouse")
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn read(&self, _ctx: &OpContext, config: Value) -> DiagResult<Value> {
        let config: ClickhouseDataModel = decode(config)?;
        let id = match Lookup::from_config(&config.id, &config.name, &config.project_id)? {
            Lookup::Id(id) => id,
            Lookup::Name { project_id, name } => {
                find_id_by_name(api::list_clusters(&self.client, &project_id), &name)
                    .await
                    .map_err(|e| Diagnostics::api("look up clickhouse cluster", e))?
            }
        };

        tracing::debug!("Reading clickhouse cluster {}", id);
        let remote = api::get_cluster(&self.client, &id)
            .await
            .map_err(|e| Diagnostics::api("read clickhouse cluster", e))?;
        encode(&ClickhouseDataModel::from(&remote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::clickhouse::ConnectionInfo;

    #[test]
    fn test_password_is_sensitive() {
        assert!(schema()
            .sensitive_paths()
            .contains(&"connection_info.password".to_string()));
    }

    #[test]
    fn test_model_from_cluster() {
        let cluster = Cluster {
            id: "chcabc".into(),
            name: "analytics".into(),
            version: "23.8".into(),
            connection_info: Some(ConnectionInfo {
                host: "rw.chcabc.at.double.cloud".into(),
                https_port: 8443,
                ..Default::default()
            }),
            ..Default::default()
        };
        let model = ClickhouseDataModel::from(&cluster);
        let info = model.connection_info.unwrap();
        assert_eq!(info.host.as_deref(), Some("rw.chcabc.at.double.cloud"));
        assert_eq!(info.https_port, Some(8443));
        assert_eq!(model.version.as_deref(), Some("23.8"));
    }
}
