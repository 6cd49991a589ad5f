//! Asynchronous operations
//!
//! Every mutating call returns an [`Operation`] handle. [`wait_operation`]
//! blocks until the handle reports `STATUS_DONE`, honouring the caller's
//! [`OpContext`].

use super::client::{DcClient, Service};
use super::error::{ApiError, Result};
use crate::context::OpContext;
use serde::{Deserialize, Serialize};

/// Operation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperationStatus {
    #[serde(rename = "STATUS_PENDING")]
    #[default]
    Pending,
    #[serde(rename = "STATUS_RUNNING")]
    Running,
    #[serde(rename = "STATUS_DONE")]
    Done,
    #[serde(rename = "STATUS_INVALID")]
    Invalid,
    #[serde(other)]
    Unspecified,
}

/// Error attached to a finished operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// Long-running operation handle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: OperationStatus,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub project_id: String,
}

impl Operation {
    pub fn is_done(&self) -> bool {
        self.status == OperationStatus::Done
    }
}

/// Fetch the current state of an operation
pub async fn get_operation(client: &DcClient, service: Service, id: &str) -> Result<Operation> {
    let url = client.service_url(service, &format!("operations/{}", id));
    client.get(&url).await
}

/// Block until `op` completes.
///
/// Returns the finished operation, or [`ApiError::Operation`] when it finished
/// with an error, or [`ApiError::Cancelled`] when `ctx` stops first.
pub async fn wait_operation(
    client: &DcClient,
    ctx: &OpContext,
    service: Service,
    op: Operation,
) -> Result<Operation> {
    let mut op = op;
    loop {
        if op.is_done() {
            if let Some(error) = op.error.as_ref().filter(|e| e.code != 0 || !e.message.is_empty()) {
                return Err(ApiError::Operation {
                    id: op.id.clone(),
                    message: error.message.clone(),
                });
            }
            tracing::debug!("Operation {} done ({})", op.id, op.description);
            return Ok(op);
        }

        tracing::debug!("Operation {} still {:?}, waiting", op.id, op.status);
        ctx.sleep(client.poll_interval).await?;
        op = get_operation(client, service, &op.id).await?;
    }
}

/// Wait for `op` and return the id of the resource it created
pub async fn wait_for_resource(
    client: &DcClient,
    ctx: &OpContext,
    service: Service,
    op: Operation,
) -> Result<String> {
    let done = wait_operation(client, ctx, service, op).await?;
    if done.resource_id.is_empty() {
        return Err(ApiError::MissingResourceId { id: done.id });
    }
    Ok(done.resource_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_client;
    use crate::context::ContextError;
    use crate::framework::Diagnostics;
    use std::time::Duration;

    fn running(id: &str) -> Operation {
        Operation {
            id: id.to_string(),
            status: OperationStatus::Running,
            ..Default::default()
        }
    }

    #[test]
    fn test_operation_decoding() {
        let op: Operation = serde_json::from_str(
            r#"{"id":"op1","status":"STATUS_DONE","resourceId":"net1","projectId":"p1","createdAt":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(op.is_done());
        assert_eq!(op.resource_id, "net1");
        assert!(op.error.is_none());
    }

    #[test]
    fn test_unknown_status_is_not_done() {
        let op: Operation = serde_json::from_str(r#"{"id":"op1","status":"STATUS_SOMETHING"}"#).unwrap();
        assert_eq!(op.status, OperationStatus::Unspecified);
        assert!(!op.is_done());
    }

    #[tokio::test]
    async fn test_finished_with_error() {
        let client = test_client("http://127.0.0.1:9");
        let op = Operation {
            id: "op1".into(),
            status: OperationStatus::Done,
            error: Some(OperationError {
                code: 9,
                message: "quota exceeded".into(),
            }),
            ..Default::default()
        };
        let err = wait_operation(&client, &OpContext::background(), Service::Network, op)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Operation { ref message, .. } if message == "quota exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wait_stops_polling() {
        // Unroutable endpoint: any status fetch would fail with a transport error
        let client = test_client("http://127.0.0.1:9");
        let ctx = OpContext::background();
        ctx.cancel();

        let err = wait_operation(&client, &ctx, Service::Network, running("op1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled(ContextError::Canceled)));

        let diags = Diagnostics::api("create network", err);
        assert!(diags.to_string().starts_with("Interrupted while waiting to create network"));
        assert!(diags.to_string().contains("context canceled"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses_before_next_poll() {
        let client = test_client("http://127.0.0.1:9").with_poll_interval(Duration::from_secs(30));
        let ctx = OpContext::background().with_timeout(Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        let err = wait_operation(&client, &ctx, Service::Kafka, running("op1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled(ContextError::DeadlineExceeded)));
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
