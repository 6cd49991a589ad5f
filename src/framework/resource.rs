//! Lifecycle contracts for resources and data sources
//!
//! State crosses the plugin boundary as JSON objects shaped by the handler's
//! [`Schema`]. Handlers decode that JSON into their typed model, talk to the
//! remote API and encode the resulting model back.

use super::diag::Diagnostics;
use super::schema::Schema;
use crate::api::DcClient;
use crate::context::OpContext;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Result of a lifecycle call
pub type DiagResult<T> = std::result::Result<T, Diagnostics>;

/// Managed resource handler
#[async_trait]
pub trait Resource: Send + Sync {
    /// Full type name, e.g. `doublecloud_network`
    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    /// Checks the schema cannot express, such as "exactly one of" blocks
    fn validate_config(&self, _config: &Value) -> Diagnostics {
        Diagnostics::new()
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> DiagResult<Value>;

    async fn read(&self, ctx: &OpContext, state: Value) -> DiagResult<Value>;

    async fn update(&self, ctx: &OpContext, prior: Value, plan: Value) -> DiagResult<Value>;

    async fn delete(&self, ctx: &OpContext, state: Value) -> DiagResult<()>;

    /// Adopt an existing remote object by identifier
    async fn import_state(&self, ctx: &OpContext, id: &str) -> DiagResult<Value> {
        self.read(ctx, json!({ "id": id })).await
    }
}

/// Read-only lookup handler
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> String;

    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &OpContext, config: Value) -> DiagResult<Value>;
}

/// Builds a resource handler around the configured client
pub type ResourceFactory = fn(Arc<DcClient>) -> Arc<dyn Resource>;

/// Builds a data-source handler around the configured client
pub type DataSourceFactory = fn(Arc<DcClient>) -> Arc<dyn DataSource>;

/// Decode boundary JSON into a typed model
pub fn decode<M: DeserializeOwned>(value: Value) -> DiagResult<M> {
    serde_json::from_value(value)
        .map_err(|e| Diagnostics::error("Invalid state or configuration", e.to_string()))
}

/// Encode a typed model back into boundary JSON
pub fn encode<M: Serialize>(model: &M) -> DiagResult<Value> {
    serde_json::to_value(model)
        .map_err(|e| Diagnostics::error("Failed to encode state", e.to_string()))
}

/// Prefix a short resource name with the provider's type prefix
pub fn full_type_name(name: &str) -> String {
    format!("{}_{}", crate::TYPE_PREFIX, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct Model {
        id: Option<String>,
        size: Option<i64>,
    }

    #[test]
    fn test_decode_tolerates_nulls_and_missing() {
        let model: Model = decode(json!({"id": null})).unwrap();
        assert_eq!(model, Model::default());
    }

    #[test]
    fn test_decode_reports_type_errors() {
        let err = decode::<Model>(json!({"size": "big"})).unwrap_err();
        assert!(err.has_errors());
        assert!(err.to_string().starts_with("Invalid state or configuration"));
    }

    #[test]
    fn test_full_type_name() {
        assert_eq!(full_type_name("network"), "doublecloud_network");
    }
}
