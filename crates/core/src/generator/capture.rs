//! Visual back-end: pushes the unit to the render server, then screenshots it
//! with a headless browser.

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::content::RenderKind;
use crate::process::{run_cancellable, ProcessError};

use super::config::CaptureConfig;
use super::error::GenerationError;
use super::speech::classify_status;
use super::traits::UnitGenerator;
use super::types::{GenerationRequest, GeneratorRole, RenderPayload};

/// Screenshot generator driven by a headless chromium.
pub struct CaptureGenerator {
    client: Client,
    config: CaptureConfig,
}

impl CaptureGenerator {
    pub fn new(config: CaptureConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.render_url.trim_end_matches('/')
    }

    fn push_url(&self) -> String {
        format!("{}/push", self.base_url())
    }

    fn page_url(&self, kind: RenderKind) -> String {
        format!(
            "{}/render?kind={}",
            self.base_url(),
            urlencoding::encode(kind.as_str())
        )
    }

    fn build_capture_args(&self, kind: RenderKind, output_path: &Path) -> Vec<String> {
        let mut args = vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            format!("--window-size={},{}", self.config.window_width, self.config.window_height),
            format!("--screenshot={}", output_path.to_string_lossy()),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(self.page_url(kind));
        args
    }

    async fn push(&self, payload: &RenderPayload) -> Result<(), GenerationError> {
        let response = self
            .client
            .post(self.push_url())
            .json(payload)
            .send()
            .await
            .map_err(|e| GenerationError::transient(format!("render server push failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }
        Ok(())
    }

    async fn capture(
        &self,
        cancel: &CancelToken,
        kind: RenderKind,
    ) -> Result<Vec<u8>, GenerationError> {
        tokio::fs::create_dir_all(&self.config.scratch_dir)
            .await
            .map_err(|e| {
                GenerationError::rendering_failed(format!(
                    "failed to create scratch dir {}: {}",
                    self.config.scratch_dir.display(),
                    e
                ))
            })?;
        let output_path = self
            .config
            .scratch_dir
            .join(format!("{}.png", Uuid::new_v4()));

        let result = self.run_browser(cancel, kind, &output_path).await;
        if let Err(e) = tokio::fs::remove_file(&output_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %output_path.display(), error = %e, "Failed to remove screenshot");
            }
        }
        result
    }

    async fn run_browser(
        &self,
        cancel: &CancelToken,
        kind: RenderKind,
        output_path: &Path,
    ) -> Result<Vec<u8>, GenerationError> {
        let args = self.build_capture_args(kind, output_path);
        let limit = Duration::from_secs(self.config.timeout_secs);
        let output = run_cancellable(&self.config.program, &args, cancel, limit)
            .await
            .map_err(|e| match e {
                ProcessError::Cancelled => GenerationError::cancelled(),
                ProcessError::TimedOut(limit) => GenerationError::transient(format!(
                    "capture timed out after {} seconds",
                    limit.as_secs()
                )),
                ProcessError::NotFound(path) => GenerationError::rendering_failed(format!(
                    "browser not found at path: {}",
                    path.display()
                )),
                ProcessError::Io(e) => GenerationError::rendering_failed(e.to_string()),
            })?;

        if !output.status.success() {
            return Err(GenerationError::rendering_failed(format!(
                "browser exited with code {:?}: {}",
                output.status.code(),
                output.stderr_tail().unwrap_or_default()
            )));
        }

        let bytes = tokio::fs::read(output_path).await.map_err(|e| {
            GenerationError::rendering_failed(format!("screenshot not written: {}", e))
        })?;
        if bytes.is_empty() {
            return Err(GenerationError::rendering_failed("screenshot is empty"));
        }
        Ok(bytes)
    }
}

#[async_trait]
impl UnitGenerator for CaptureGenerator {
    fn name(&self) -> &str {
        "headless-capture"
    }

    fn role(&self) -> GeneratorRole {
        GeneratorRole::Visual
    }

    async fn generate(
        &self,
        cancel: &CancelToken,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>, GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::cancelled());
        }
        debug!(
            node = %request.node_key,
            unit = request.unit_index,
            kind = %request.render_kind,
            "Capturing unit"
        );

        let payload = request.render_payload();
        tokio::select! {
            _ = cancel.cancelled() => return Err(GenerationError::cancelled()),
            pushed = self.push(&payload) => pushed?,
        }
        self.capture(cancel, request.render_kind).await
    }
}
