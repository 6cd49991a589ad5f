//! Readiness polling
//!
//! Waiting for a remotely provisioned object is split in two: a pure
//! [`Readiness::step`] decision over the latest observed record, and
//! [`wait_until_ready`], which fetches, decides and sleeps until the decision
//! is terminal or the [`OpContext`] stops.

use crate::api::network::{ConnectionStatus, NetworkConnection};
use crate::api::ApiError;
use crate::context::{ContextError, OpContext};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Interval between readiness checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Decision taken after observing a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    KeepWaiting,
    Succeeded,
    Failed(String),
}

/// Records whose status can be polled to a terminal state
pub trait Readiness {
    fn step(&self) -> Step;
}

impl Readiness for NetworkConnection {
    fn step(&self) -> Step {
        match self.status {
            ConnectionStatus::Active => Step::Succeeded,
            ConnectionStatus::Error => Step::Failed(self.status_reason.clone()),
            // Unrecognised statuses are treated as still converging
            _ => Step::KeepWaiting,
        }
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("reached a failed state: {reason}")]
    Failed { reason: String },
    #[error("stopped waiting: {0}")]
    Cancelled(#[from] ContextError),
}

/// Poll `get` until the returned record reaches a terminal state.
///
/// Errors from `get` abort immediately without retry. There is no retry cap:
/// only the context's deadline bounds the total wait.
pub async fn wait_until_ready<T, F, Fut>(
    ctx: &OpContext,
    interval: Duration,
    mut get: F,
) -> Result<T, PollError>
where
    T: Readiness,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u32 = 0;
    loop {
        if let Some(err) = ctx.err() {
            return Err(PollError::Cancelled(err));
        }

        attempt += 1;
        let record = get().await?;
        match record.step() {
            Step::Succeeded => {
                tracing::debug!("Ready after {} checks", attempt);
                return Ok(record);
            }
            Step::Failed(reason) => return Err(PollError::Failed { reason }),
            Step::KeepWaiting => {
                tracing::debug!("Not ready after {} checks, retrying in {:?}", attempt, interval);
            }
        }

        tokio::select! {
            biased;
            err = ctx.done() => return Err(PollError::Cancelled(err)),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn connection(status: ConnectionStatus, reason: &str) -> NetworkConnection {
        NetworkConnection {
            id: "nc1".into(),
            status,
            status_reason: reason.into(),
            ..Default::default()
        }
    }

    /// Mocked "get" returning the scripted records in order
    fn scripted(
        records: Vec<NetworkConnection>,
    ) -> (
        Arc<AtomicUsize>,
        impl FnMut() -> std::future::Ready<Result<NetworkConnection, ApiError>>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let queue = Arc::new(Mutex::new(VecDeque::from(records)));
        let counter = calls.clone();
        let get = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let next = queue.lock().unwrap().pop_front();
            std::future::ready(next.ok_or_else(|| ApiError::NotFound("script exhausted".into())))
        };
        (calls, get)
    }

    #[test]
    fn test_step_decisions() {
        assert_eq!(connection(ConnectionStatus::Creating, "").step(), Step::KeepWaiting);
        assert_eq!(connection(ConnectionStatus::Deleting, "").step(), Step::KeepWaiting);
        assert_eq!(connection(ConnectionStatus::Unknown, "").step(), Step::KeepWaiting);
        assert_eq!(connection(ConnectionStatus::Active, "").step(), Step::Succeeded);
        assert_eq!(
            connection(ConnectionStatus::Error, "quota").step(),
            Step::Failed("quota".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_first_terminal_state() {
        let (calls, get) = scripted(vec![
            connection(ConnectionStatus::Creating, ""),
            connection(ConnectionStatus::Active, ""),
            connection(ConnectionStatus::Active, ""),
        ]);
        let ctx = OpContext::background();
        let ready = wait_until_ready(&ctx, DEFAULT_POLL_INTERVAL, get).await.unwrap();
        assert_eq!(ready.status, ConnectionStatus::Active);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_carries_reason_verbatim() {
        let (_, get) = scripted(vec![
            connection(ConnectionStatus::Creating, ""),
            connection(ConnectionStatus::Error, "THE reason"),
        ]);
        let ctx = OpContext::background();
        let err = wait_until_ready(&ctx, DEFAULT_POLL_INTERVAL, get).await.unwrap_err();
        assert!(matches!(err, PollError::Failed { .. }));
        assert!(err.to_string().contains("THE reason"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_further_calls() {
        let (calls, get) = scripted(vec![
            connection(ConnectionStatus::Creating, ""),
            connection(ConnectionStatus::Active, ""),
        ]);
        let ctx = OpContext::background();
        let canceller = ctx.clone();
        let get = {
            let mut get = get;
            move || {
                let fut = get();
                canceller.cancel();
                fut
            }
        };
        let err = wait_until_ready(&ctx, DEFAULT_POLL_INTERVAL, get).await.unwrap_err();
        assert!(err.to_string().contains("context canceled"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_wait() {
        let ctx = OpContext::background().with_timeout(Duration::from_secs(3));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let get = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok::<_, ApiError>(connection(ConnectionStatus::Creating, "")))
        };
        let err = wait_until_ready(&ctx, DEFAULT_POLL_INTERVAL, get).await.unwrap_err();
        assert!(matches!(err, PollError::Cancelled(ContextError::DeadlineExceeded)));
        assert!(calls.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_error_is_not_retried() {
        let (calls, get) = scripted(vec![]);
        let ctx = OpContext::background();
        let err = wait_until_ready(&ctx, DEFAULT_POLL_INTERVAL, get).await.unwrap_err();
        assert!(matches!(err, PollError::Api(ApiError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
