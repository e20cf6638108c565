//! Mock unit generator for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::cancel::CancelToken;
use crate::generator::{
    GenerationError, GenerationErrorKind, GenerationRequest, GeneratorRole, UnitGenerator,
};

/// Mock implementation of the UnitGenerator trait.
///
/// Provides controllable behavior for testing:
/// - Records every request for assertions
/// - Fails chosen units of chosen nodes
/// - Simulates back-end latency (cancellable)
///
/// Successful calls return `"{role}:{node_key}:{unit_index}:{text}"` as bytes,
/// which makes generated clips easy to trace through assembly.
///
/// # Example
///
/// ```rust,ignore
/// use tales_core::testing::MockGenerator;
///
/// let visual = MockGenerator::new(GeneratorRole::Visual);
/// visual.fail_on("p1/c1", 0, GenerationErrorKind::RenderingFailed).await;
///
/// let requests = visual.recorded_requests().await;
/// ```
#[derive(Debug, Clone)]
pub struct MockGenerator {
    role: GeneratorRole,
    /// Requests received, in call order.
    requests: Arc<RwLock<Vec<GenerationRequest>>>,
    /// Scripted failures keyed by (node key, unit index).
    failures: Arc<RwLock<HashMap<(String, usize), GenerationErrorKind>>>,
    /// Simulated latency per call.
    delay: Arc<RwLock<Duration>>,
}

impl MockGenerator {
    /// Create a new mock generator for `role`.
    pub fn new(role: GeneratorRole) -> Self {
        Self {
            role,
            requests: Arc::new(RwLock::new(Vec::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Make the call for `unit_index` of the node at `node_key` fail with `kind`.
    pub async fn fail_on(&self, node_key: &str, unit_index: usize, kind: GenerationErrorKind) {
        self.failures
            .write()
            .await
            .insert((node_key.to_string(), unit_index), kind);
    }

    /// Set the simulated latency of every call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<GenerationRequest> {
        self.requests.read().await.clone()
    }

    /// Node keys in the order their first unit was requested.
    pub async fn recorded_nodes(&self) -> Vec<String> {
        let mut nodes: Vec<String> = Vec::new();
        for request in self.requests.read().await.iter() {
            if nodes.last() != Some(&request.node_key) {
                nodes.push(request.node_key.clone());
            }
        }
        nodes
    }

    /// Get the number of calls received.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Output produced for a successful call.
    pub fn output_for(role: GeneratorRole, request: &GenerationRequest) -> Vec<u8> {
        format!(
            "{}:{}:{}:{}",
            role, request.node_key, request.unit_index, request.text
        )
        .into_bytes()
    }
}

#[async_trait]
impl UnitGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
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
        self.requests.write().await.push(request.clone());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(GenerationError::cancelled()),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let scripted = self
            .failures
            .read()
            .await
            .get(&(request.node_key.clone(), request.unit_index))
            .copied();
        if let Some(kind) = scripted {
            return Err(GenerationError::new(
                kind,
                format!("scripted failure for {}#{}", request.node_key, request.unit_index),
            ));
        }

        Ok(Self::output_for(self.role, request))
    }
}
