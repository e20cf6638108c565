//! Per-dispatch completion barrier.

use std::sync::Arc;
use tokio::sync::watch;

/// Counts down as parties arrive; waiters wake once every party has arrived.
///
/// Each dispatch owns its own barrier, so unrelated dispatches never share
/// a counter.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    remaining: Arc<watch::Sender<usize>>,
    parties: usize,
}

impl CompletionBarrier {
    pub fn new(parties: usize) -> Self {
        let (tx, _) = watch::channel(parties);
        Self {
            remaining: Arc::new(tx),
            parties,
        }
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Parties that have not arrived yet.
    pub fn remaining(&self) -> usize {
        *self.remaining.borrow()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Signals that one party is done. Extra arrivals are ignored.
    pub fn arrive(&self) {
        self.remaining.send_modify(|n| *n = n.saturating_sub(1));
    }

    /// Waits until every party has arrived.
    pub async fn wait(&self) {
        let mut rx = self.remaining.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_waits_for_all_parties() {
        let barrier = CompletionBarrier::new(2);
        barrier.arrive();
        assert_eq!(barrier.remaining(), 1);

        let waiter = barrier.clone();
        let handle = tokio::spawn(async move { waiter.wait().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        barrier.arrive();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(barrier.is_complete());
    }

    #[tokio::test]
    async fn test_extra_arrivals_saturate() {
        let barrier = CompletionBarrier::new(1);
        barrier.arrive();
        barrier.arrive();
        assert_eq!(barrier.remaining(), 0);
        barrier.wait().await;
    }

    #[tokio::test]
    async fn test_barriers_are_independent() {
        let first = CompletionBarrier::new(2);
        let second = CompletionBarrier::new(2);
        first.arrive();
        first.arrive();
        assert!(first.is_complete());
        assert_eq!(second.remaining(), 2);
    }
}
