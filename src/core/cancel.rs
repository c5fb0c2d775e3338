//! Cooperative cancellation for swarm runs
//!
//! A token is cloned into every turn. Cancelling it wakes every pending
//! `cancelled()` future, which the router and agents race against their
//! in-flight completion and tool calls.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once `cancel()` has been called on any clone
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives in `self`, so `wait_for` cannot observe a closed channel here.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_cancel_wakes_waiters() {
        let token = CancellationToken::new();
        let waiter = token.clone();

        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();

        assert!(timeout(Duration::from_secs(1), handle).await.is_ok());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_uncancelled_token_stays_pending() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(timeout(Duration::from_millis(50), token.cancelled())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_cancel_before_wait_resolves_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(timeout(Duration::from_millis(50), token.cancelled())
            .await
            .is_ok());
    }
}
