//! Cancellation signal shared by every suspension point of the pipeline.
//!
//! A [`CancelToken`] is cheap to clone; all clones observe the same signal.
//! Generators, encoder invocations and the orchestrator workers race their
//! work against [`CancelToken::cancelled`].

use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once cancellation has been signalled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as any clone of the token, so this only
        // returns on a real signal.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
