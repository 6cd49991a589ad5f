//! `doublecloud_transfer`
//!
//! A replication job between two transfer endpoints. `activated` drives the
//! remote activate / deactivate calls.

use super::{created_partially, optional_string, require_id, wait, wait_created, wait_deleted};
use crate::api::client::Service;
use crate::api::transfer::{self as api, CreateTransferRequest, Transfer, UpdateTransferRequest};
use crate::api::{ApiError, DcClient};
use crate::context::OpContext;
use crate::framework::{
    decode, encode, full_type_name, Attribute, AttributeType, DiagResult, Diagnostics, Resource,
    Schema, Validator,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const TRANSFER_TYPES: &[&str] = &["SNAPSHOT_ONLY", "INCREMENT_ONLY", "SNAPSHOT_AND_INCREMENT"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub transfer_type: Option<String>,
    pub activated: Option<bool>,
    pub status: Option<String>,
}

impl TransferModel {
    pub fn to_create_request(&self) -> CreateTransferRequest {
        CreateTransferRequest {
            project_id: self.project_id.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            source_id: self.source.clone().unwrap_or_default(),
            target_id: self.target.clone().unwrap_or_default(),
            transfer_type: self.transfer_type.clone().unwrap_or_default(),
        }
    }

    pub fn to_update_request(&self) -> UpdateTransferRequest {
        UpdateTransferRequest {
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
        }
    }

    pub fn wants_active(&self) -> bool {
        self.activated.unwrap_or(false)
    }

    pub fn apply_remote(&mut self, remote: &Transfer) {
        self.id = Some(remote.id.clone());
        self.project_id = Some(remote.project_id.clone());
        self.name = Some(remote.name.clone());
        self.description = optional_string(&self.description, &remote.description);
        self.source = Some(remote.source_id.clone());
        self.target = Some(remote.target_id.clone());
        self.transfer_type = Some(remote.transfer_type.clone());
        // Finished snapshot transfers stop on their own; keep the configured intent
        self.activated = Some(self.activated.unwrap_or_else(|| remote.is_active()));
        self.status = Some(remote.status.clone());
    }
}

pub fn schema() -> Schema {
    Schema::new("Data transfer between two endpoints")
        .attribute("id", Attribute::id())
        .attribute(
            "project_id",
            Attribute::required(AttributeType::String).requires_replace(),
        )
        .attribute("name", Attribute::required(AttributeType::String))
        .attribute("description", Attribute::optional(AttributeType::String))
        .attribute(
            "source",
            Attribute::required(AttributeType::String)
                .requires_replace()
                .describe("Source endpoint id"),
        )
        .attribute(
            "target",
            Attribute::required(AttributeType::String)
                .requires_replace()
                .describe("Target endpoint id"),
        )
        .attribute(
            "type",
            Attribute::required(AttributeType::String)
                .requires_replace()
                .validate(Validator::OneOf(TRANSFER_TYPES)),
        )
        .attribute(
            "activated",
            Attribute::optional(AttributeType::Bool).default(json!(false)),
        )
        .attribute("status", Attribute::computed(AttributeType::String))
}

pub struct TransferResource {
    client: Arc<DcClient>,
}

impl TransferResource {
    pub fn new(client: Arc<DcClient>) -> Self {
        Self { client }
    }

    pub fn factory(client: Arc<DcClient>) -> Arc<dyn Resource> {
        Arc::new(Self::new(client))
    }

    async fn fetch(&self, mut model: TransferModel, id: &str) -> DiagResult<Value> {
        let remote = api::get_transfer(&self.client, id)
            .await
            .map_err(|e| Diagnostics::api("read transfer", e))?;
        model.apply_remote(&remote);
        encode(&model)
    }

    async fn set_active(&self, ctx: &OpContext, id: &str, active: bool) -> DiagResult<()> {
        if active {
            tracing::info!("Activating transfer {}", id);
            let issued = api::activate_transfer(&self.client, id).await;
            wait(&self.client, ctx, Service::Transfer, "activate transfer", issued).await?;
        } else {
            tracing::info!("Deactivating transfer {}", id);
            let issued = api::deactivate_transfer(&self.client, id).await;
            wait(&self.client, ctx, Service::Transfer, "deactivate transfer", issued).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for TransferResource {
    fn type_name(&self) -> String {
        full_type_name("transfer")
    }

    fn schema(&self) -> Schema {
        schema()
    }

    fn validate_config(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let snapshot = config.get("type").and_then(Value::as_str) == Some("SNAPSHOT_ONLY");
        if snapshot && config.get("activated") == Some(&json!(true)) {
            diags.add_warning(
                "Snapshot transfer stops on its own",
                "a SNAPSHOT_ONLY transfer finishes after one copy; activated stays true in state while the remote status reports it done",
            );
        }
        diags
    }

    async fn create(&self, ctx: &OpContext, plan: Value) -> DiagResult<Value> {
        let model: TransferModel = decode(plan.clone())?;
        let request = model.to_create_request();
        tracing::info!("Creating transfer {:?} in {}", request.name, request.project_id);

        let issued = api::create_transfer(&self.client, &request).await;
        let id = wait_created(&self.client, ctx, Service::Transfer, "create transfer", issued, &plan).await?;
        let finished = async {
            if model.wants_active() {
                self.set_active(ctx, &id, true).await?;
            }
            self.fetch(model, &id).await
        };
        finished
            .await
            .map_err(|diags| created_partially(diags, &plan, &id))
    }

    async fn read(&self, _ctx: &OpContext, state: Value) -> DiagResult<Value> {
        let model: TransferModel = decode(state)?;
        let id = require_id(&model.id)?;
        self.fetch(model, &id).await
    }

    async fn update(&self, ctx: &OpContext, prior: Value, plan: Value) -> DiagResult<Value> {
        let prior: TransferModel = decode(prior)?;
        let id = require_id(&prior.id)?;
        let model: TransferModel = decode(plan)?;
        tracing::info!("Updating transfer {}", id);

        let issued = api::update_transfer(&self.client, &id, &model.to_update_request()).await;
        wait(&self.client, ctx, Service::Transfer, "update transfer", issued).await?;

        if prior.wants_active() != model.wants_active() {
            self.set_active(ctx, &id, model.wants_active()).await?;
        }
        self.fetch(model, &id).await
    }

    async fn delete(&self, ctx: &OpContext, state: Value) -> DiagResult<()> {
        let model: TransferModel = decode(state)?;
        let id = require_id(&model.id)?;

        match api::get_transfer(&self.client, &id).await {
            Ok(remote) if remote.is_active() => self.set_active(ctx, &id, false).await?,
            Ok(_) => {}
            Err(ApiError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(Diagnostics::api("read transfer", e)),
        }

        tracing::info!("Deleting transfer {}", id);
        let issued = api::delete_transfer(&self.client, &id).await;
        wait_deleted(&self.client, ctx, Service::Transfer, "delete transfer", issued).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_is_renamed() {
        let model: TransferModel = decode(json!({"type": "SNAPSHOT_ONLY", "activated": true})).unwrap();
        assert_eq!(model.transfer_type.as_deref(), Some("SNAPSHOT_ONLY"));
        assert!(model.wants_active());
        assert_eq!(encode(&model).unwrap()["type"], "SNAPSHOT_ONLY");
    }

    #[test]
    fn test_activated_snapshot_warns() {
        let resource = TransferResource::new(Arc::new(crate::api::client::test_client("http://127.0.0.1:9")));
        let diags = resource.validate_config(&json!({"type": "SNAPSHOT_ONLY", "activated": true}));
        assert_eq!(diags.len(), 1);
        assert!(!diags.has_errors());

        let diags = resource.validate_config(&json!({"type": "SNAPSHOT_AND_INCREMENT", "activated": true}));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_activated_defaults_to_false() {
        let plan = schema().plan(None, &json!({"project_id": "p", "name": "t", "source": "s", "target": "d", "type": "SNAPSHOT_ONLY"}));
        assert_eq!(plan.planned_state["activated"], false);
    }

    #[test]
    fn test_import_infers_activation_from_status() {
        let mut model = TransferModel::default();
        model.apply_remote(&Transfer {
            id: "t1".into(),
            status: "TRANSFER_STATUS_RUNNING".into(),
            ..Default::default()
        });
        assert_eq!(model.activated, Some(true));

        let mut model = TransferModel {
            activated: Some(true),
            ..Default::default()
        };
        model.apply_remote(&Transfer {
            id: "t1".into(),
            status: "TRANSFER_STATUS_DONE".into(),
            ..Default::default()
        });
        assert_eq!(model.activated, Some(true));
    }
}
