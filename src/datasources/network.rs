//! `doublecloud_network` data source

use super::{lookup_schema, Lookup};
use crate::api::network::{self as api, Network};
use crate::api::pager::find_id_by_name;
use crate::api::DcClient;
use crate::context::OpContext;
use crate::framework::{
    decode, encode, full_type_name, Attribute, AttributeType, DataSource, DiagResult, Diagnostics,
    Schema,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkDataModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub project_id: Option<String>,
    pub region_id: Option<String>,
    pub cloud_type: Option<String>,
    pub ipv4_cidr_block: Option<String>,
    pub ipv6_cidr_block: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl From<&Network> for NetworkDataModel {
    fn from(remote: &Network) -> Self {
        Self {
            id: Some(remote.id.clone()),
            name: Some(remote.name.clone()),
            project_id: Some(remote.project_id.clone()),
            region_id: Some(remote.region_id.clone()),
            cloud_type: Some(remote.cloud_type.clone()),
            ipv4_cidr_block: Some(remote.ipv4_cidr_block.clone()),
            ipv6_cidr_block: Some(remote.ipv6_cidr_block.clone()),
            description: Some(remote.description.clone()),
            status: Some(remote.status.clone()),
        }
    }
}

pub fn schema() -> Schema {
    let computed = || Attribute::computed(AttributeType::String);
    lookup_schema("Existing network, looked up by id or by name")
        .attribute("region_id", computed())
        .attribute("cloud_type", computed())
        .attribute("ipv4_cidr_block", computed())
        .attribute("ipv6_cidr_block", computed())
        .attribute("description", computed())
        .attribute("status", computed())
}

pub struct NetworkDataSource {
    client: Arc<DcClient>,
}

impl NetworkDataSource {
    pub fn new(client: Arc<DcClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: Arc<DcClient>) -> Arc<dyn DataSource> {
        Arc::new(Self::new(client))
    }
}

#[async_trait]
impl DataSource for NetworkDataSource {
    fn type_name(&self) -> String {
        full_type_name("network")
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn read(&self, _ctx: &OpContext, config: Value) -> DiagResult<Value> {
        let config: NetworkDataModel = decode(config)?;
        let id = match Lookup::from_config(&config.id, &config.name, &config.project_id)? {
            Lookup::Id(id) => id,
            Lookup::Name { project_id, name } => {
                find_id_by_name(api::list_networks(&self.client, &project_id), &name)
                    .await
                    .map_err(|e| Diagnostics::api("look up network", e))?
            }
        };

        tracing::debug!("Reading network {}", id);
        let remote = api::get_network(&self.client, &id)
            .await
            .map_err(|e| Diagnostics::api("read network", e))?;
        encode(&NetworkDataModel::from(&remote))
    }
}
