//! Provider root
//!
//! Owns the registry of resource and data-source factories. Configuration
//! resolves credentials, builds one shared [`DcClient`] and instantiates every
//! handler around it.

use crate::api::auth::Credentials;
use crate::api::client::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT};
use crate::api::http::DcHttpClient;
use crate::api::DcClient;
use crate::config::{self, ProviderConfig};
use crate::framework::{
    decode, DataSource, DataSourceFactory, DiagResult, Diagnostics, Resource, ResourceFactory,
};
use crate::{datasources, resources};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Factory registry, usable before configuration
pub struct Provider {
    resources: Vec<ResourceFactory>,
    data_sources: Vec<DataSourceFactory>,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        Self {
            resources: resources::factories(),
            data_sources: datasources::factories(),
        }
    }

    /// Provider, resource and data-source schemas keyed by type name
    pub fn schema_document(&self) -> DiagResult<Value> {
        // Handlers are only asked for their names and schemas here
        let http = DcHttpClient::new(DEFAULT_REQUEST_TIMEOUT)
            .map_err(|e| Diagnostics::error("Failed to create HTTP client", e.to_string()))?;
        let detached = Arc::new(DcClient::new(DEFAULT_ENDPOINT, Credentials::static_token(""), http));
        let configured = self.instantiate(detached);

        let mut resource_schemas = Map::new();
        for (name, resource) in &configured.resources {
            resource_schemas.insert(name.clone(), to_value(&resource.schema())?);
        }
        let mut data_source_schemas = Map::new();
        for (name, data_source) in &configured.data_sources {
            data_source_schemas.insert(name.clone(), to_value(&data_source.schema())?);
        }

        Ok(json!({
            "provider": to_value(&config::schema())?,
            "resource_schemas": resource_schemas,
            "data_source_schemas": data_source_schemas,
        }))
    }

    /// Validate the provider block and resolve it against the process environment
    pub fn configure(&self, config: Value) -> DiagResult<ConfiguredProvider> {
        self.configure_with_env(config, |name| std::env::var(name).ok())
    }

    pub fn configure_with_env<F>(&self, config: Value, env: F) -> DiagResult<ConfiguredProvider>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = if config.is_null() { json!({}) } else { config };
        config::schema().validate(&config).into_result()?;
        let config: ProviderConfig = decode(config)?;
        let client = config.resolve(env)?.build_client()?;
        Ok(self.instantiate(client))
    }

    /// Build every handler around `client`
    pub fn instantiate(&self, client: Arc<DcClient>) -> ConfiguredProvider {
        let resources = self
            .resources
            .iter()
            .map(|factory| factory(client.clone()))
            .map(|r| (r.type_name(), r))
            .collect::<BTreeMap<_, _>>();
        let data_sources = self
            .data_sources
            .iter()
            .map(|factory| factory(client.clone()))
            .map(|d| (d.type_name(), d))
            .collect::<BTreeMap<_, _>>();

        tracing::info!(
            "Provider configured with {} resources and {} data sources",
            resources.len(),
            data_sources.len()
        );
        ConfiguredProvider {
            client,
            resources,
            data_sources,
        }
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> DiagResult<Value> {
    serde_json::to_value(value).map_err(|e| Diagnostics::error("Failed to encode schema", e.to_string()))
}

/// Handlers sharing one configured client
pub struct ConfiguredProvider {
    pub client: Arc<DcClient>,
    resources: BTreeMap<String, Arc<dyn Resource>>,
    data_sources: BTreeMap<String, Arc<dyn DataSource>>,
}

impl ConfiguredProvider {
    pub fn resource(&self, type_name: &str) -> DiagResult<Arc<dyn Resource>> {
        self.resources.get(type_name).cloned().ok_or_else(|| {
            Diagnostics::error(
                "Unknown resource type",
                format!("{:?} is not a resource type of this provider", type_name),
            )
        })
    }

    pub fn data_source(&self, type_name: &str) -> DiagResult<Arc<dyn DataSource>> {
        self.data_sources.get(type_name).cloned().ok_or_else(|| {
            Diagnostics::error(
                "Unknown data source type",
                format!("{:?} is not a data source type of this provider", type_name),
            )
        })
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }
}
