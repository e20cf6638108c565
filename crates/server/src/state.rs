use std::sync::Arc;
use tales_core::{Orchestrator, RenderPayload};
use tokio::sync::RwLock;

use crate::render::PageRenderer;

/// Shared application state
#[derive(Default)]
pub struct AppState {
    /// Payload shown by the render page, replaced on every push.
    current: RwLock<Option<RenderPayload>>,
    renderer: PageRenderer,
    orchestrator: Option<Arc<Orchestrator>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renderer(mut self, renderer: PageRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_orchestrator(mut self, orchestrator: Arc<Orchestrator>) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    /// Replaces the payload shown by the render page.
    pub async fn push(&self, payload: RenderPayload) {
        *self.current.write().await = Some(payload);
    }

    /// The last pushed payload, if any.
    pub async fn current(&self) -> Option<RenderPayload> {
        self.current.read().await.clone()
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    pub fn orchestrator(&self) -> Option<&Arc<Orchestrator>> {
        self.orchestrator.as_ref()
    }
}
