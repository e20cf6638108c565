//! Generation stage workers.
//!
//! Each role has one worker task owning its back-end and serving requests in
//! arrival order. Serving one request at a time matters for the visual
//! back-end, whose push must not interleave with another unit's capture.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::generator::{GenerationError, GenerationRequest, GeneratorRole, UnitGenerator};

use super::barrier::CompletionBarrier;
use super::types::OrchestratorError;

/// Work item of a generation stage.
#[derive(Debug)]
pub enum StageMessage {
    /// Generate one unit and answer on `reply`.
    Generate {
        request: GenerationRequest,
        cancel: CancelToken,
        reply: oneshot::Sender<Result<Vec<u8>, GenerationError>>,
    },
    /// Arrive at `barrier` once everything queued before this message is done.
    Drain { barrier: CompletionBarrier },
}

/// Handle to a stage worker, usable wherever a [`UnitGenerator`] is expected.
#[derive(Debug, Clone)]
pub struct StageGenerator {
    role: GeneratorRole,
    name: String,
    tx: mpsc::Sender<StageMessage>,
}

impl StageGenerator {
    /// Sends a drain marker behind every request queued so far.
    pub async fn drain(&self, barrier: CompletionBarrier) -> Result<(), OrchestratorError> {
        self.tx
            .send(StageMessage::Drain { barrier })
            .await
            .map_err(|_| OrchestratorError::StageClosed(self.role))
    }
}

#[async_trait]
impl UnitGenerator for StageGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> GeneratorRole {
        self.role
    }

    async fn generate(
        &self,
        cancel: &CancelToken,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::cancelled());
        }

        let (reply, response) = oneshot::channel();
        let message = StageMessage::Generate {
            request: request.clone(),
            cancel: cancel.clone(),
            reply,
        };
        self.tx.send(message).await.map_err(|_| {
            GenerationError::transient(format!("{} generation stage is closed", self.role))
        })?;

        tokio::select! {
            _ = cancel.cancelled() => Err(GenerationError::cancelled()),
            result = response => result.unwrap_or_else(|_| {
                Err(GenerationError::transient(format!(
                    "{} generation stage dropped the request",
                    self.role
                )))
            }),
        }
    }
}

/// Spawns the worker serving `generator` and returns its handle.
pub(crate) fn spawn_stage<G>(
    generator: Arc<G>,
    capacity: usize,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> (StageGenerator, JoinHandle<()>)
where
    G: UnitGenerator + 'static,
{
    let role = generator.role();
    let name = format!("{}-stage({})", role, generator.name());
    let (tx, mut rx) = mpsc::channel::<StageMessage>(capacity);

    let handle = tokio::spawn(async move {
        info!(role = %role, backend = generator.name(), "Generation stage started");
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                message = rx.recv() => match message {
                    Some(StageMessage::Generate { request, cancel, reply }) => {
                        // The caller gave up (e.g. its sibling call failed).
                        if reply.is_closed() || cancel.is_cancelled() {
                            debug!(
                                role = %role,
                                node = %request.node_key,
                                unit = request.unit_index,
                                "Skipping abandoned request"
                            );
                            continue;
                        }
                        let result = generator.generate(&cancel, &request).await;
                        let _ = reply.send(result);
                    }
                    Some(StageMessage::Drain { barrier }) => barrier.arrive(),
                    None => break,
                },
            }
        }
        info!(role = %role, "Generation stage stopped");
    });

    (StageGenerator { role, name, tx }, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RenderKind;
    use crate::generator::GenerationErrorKind;
    use crate::testing::MockGenerator;
    use std::time::Duration;

    fn request(node: &str, index: usize) -> GenerationRequest {
        GenerationRequest {
            node_key: node.to_string(),
            unit_index: index,
            text: format!("unit {}", index),
            revealed: String::new(),
            render_kind: RenderKind::PostBody,
            author: String::new(),
            score: 0,
            title: None,
        }
    }

    #[tokio::test]
    async fn test_stage_forwards_to_backend() {
        let (shutdown_tx, _) = broadcast::channel(1);
        let backend = Arc::new(MockGenerator::new(GeneratorRole::Audio));
        let (stage, _handle) = spawn_stage(Arc::clone(&backend), 8, shutdown_tx.subscribe());

        let bytes = stage
            .generate(&CancelToken::new(), &request("p1", 0))
            .await
            .unwrap();
        assert_eq!(bytes, b"audio:p1:0:unit 0".to_vec());
        assert_eq!(stage.role(), GeneratorRole::Audio);
        assert_eq!(backend.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_drain_arrives_after_queued_work() {
        let (shutdown_tx, _) = broadcast::channel(1);
        let backend = Arc::new(MockGenerator::new(GeneratorRole::Visual));
        backend.set_delay(Duration::from_millis(30)).await;
        let (stage, _handle) = spawn_stage(Arc::clone(&backend), 8, shutdown_tx.subscribe());

        let cancel = CancelToken::new();
        let first = {
            let stage = stage.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { stage.generate(&cancel, &request("p1", 0)).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        let barrier = CompletionBarrier::new(1);
        stage.drain(barrier.clone()).await.unwrap();
        barrier.wait().await;

        // The request queued before the marker has been served.
        assert_eq!(backend.call_count().await, 1);
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_errors_are_forwarded() {
        let (shutdown_tx, _) = broadcast::channel(1);
        let backend = Arc::new(MockGenerator::new(GeneratorRole::Audio));
        backend.fail_on("p1", 0, GenerationErrorKind::Quota).await;
        let (stage, _handle) = spawn_stage(Arc::clone(&backend), 8, shutdown_tx.subscribe());

        let err = stage
            .generate(&CancelToken::new(), &request("p1", 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Quota);
    }

    #[tokio::test]
    async fn test_closed_stage() {
        let (shutdown_tx, _) = broadcast::channel(1);
        let backend = Arc::new(MockGenerator::new(GeneratorRole::Audio));
        let (stage, handle) = spawn_stage(backend, 8, shutdown_tx.subscribe());
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();

        let err = stage
            .generate(&CancelToken::new(), &request("p1", 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Transient);
        assert!(matches!(
            stage.drain(CompletionBarrier::new(1)).await,
            Err(OrchestratorError::StageClosed(GeneratorRole::Audio))
        ));
    }
}
