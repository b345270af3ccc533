use std::{future::Future, time::Duration};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::EngineError;

/// Cancellation and deadline for a single operation.
///
/// Every storage and CA call an operation makes goes through
/// [`RequestContext::run`], so cancelling the token or passing the deadline
/// stops the operation at its next suspension point.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail fast if the context is already done.
    pub fn check(&self) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(EngineError::DeadlineExceeded);
        }
        Ok(())
    }

    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, EngineError> {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(EngineError::Cancelled),
            _ = deadline => Err(EngineError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_to_completion() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.run(async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn cancelled_context_never_polls_the_future() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = RequestContext::new().with_cancellation(token);

        let polled = std::sync::atomic::AtomicBool::new(false);
        let err = ctx
            .run(async { polled.store(true, std::sync::atomic::Ordering::SeqCst) })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_slow_calls() {
        let ctx = RequestContext::new().with_timeout(Duration::from_secs(1));

        let err = ctx
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DeadlineExceeded));
    }
}
