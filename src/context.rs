//! Operation context
//!
//! Every lifecycle call runs under an [`OpContext`]: a cancellation token plus
//! an optional deadline. Waiting code (operation waits, the readiness poller)
//! races its sleeps against [`OpContext::done`].

use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a context stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation and deadline carried by a lifecycle call
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    /// Root context: never expires, cancelled only explicitly
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child context that also expires after `timeout`.
    /// The earlier of the parent's and the new deadline wins.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Derive a child context with a timeout only if none is set yet
    pub fn with_default_timeout(&self, timeout: Duration) -> Self {
        if self.deadline.is_some() {
            self.clone()
        } else {
            self.with_timeout(timeout)
        }
    }

    /// Derive a child context that can be cancelled independently
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The error the context has already stopped with, if any
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline elapses
    pub async fn done(&self) -> ContextError {
        if let Some(err) = self.err() {
            return err;
        }
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => ContextError::Canceled,
                    _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ContextError::Canceled
            }
        }
    }

    /// Sleep for `interval` unless the context stops first
    pub async fn sleep(&self, interval: Duration) -> Result<(), ContextError> {
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            _ = tokio::time::sleep(interval) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_is_reported() {
        let ctx = OpContext::background();
        assert_eq!(ctx.err(), None);
        ctx.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Canceled));
        assert_eq!(ctx.done().await, ContextError::Canceled);
    }

    #[tokio::test]
    async fn test_parent_cancel_reaches_child() {
        let parent = OpContext::background();
        let child = parent.with_timeout(Duration::from_secs(60));
        parent.cancel();
        assert_eq!(child.err(), Some(ContextError::Canceled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses_during_sleep() {
        let ctx = OpContext::background().with_timeout(Duration::from_secs(5));
        let result = ctx.sleep(Duration::from_secs(10)).await;
        assert_eq!(result, Err(ContextError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_before_deadline() {
        let ctx = OpContext::background().with_timeout(Duration::from_secs(5));
        assert_eq!(ctx.sleep(Duration::from_secs(1)).await, Ok(()));
    }

    #[tokio::test]
    async fn test_earlier_deadline_is_kept() {
        let outer = OpContext::background().with_timeout(Duration::from_secs(1));
        let inner = outer.with_timeout(Duration::from_secs(3600));
        assert_eq!(inner.deadline(), outer.deadline());
        let defaulted = outer.with_default_timeout(Duration::from_secs(3600));
        assert_eq!(defaulted.deadline(), outer.deadline());
    }
}
