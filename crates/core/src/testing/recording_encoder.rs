//! Recording encoder for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::assembler::{parse_manifest, AssemblyError, EncodeMode, MediaEncoder};
use crate::cancel::CancelToken;

/// An encoder invocation captured by [`RecordingEncoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderCall {
    Mux {
        image: PathBuf,
        audio: PathBuf,
        output: PathBuf,
    },
    Concat {
        manifest: PathBuf,
        /// Inputs as listed in the manifest at call time.
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
}

/// Fake encoder that records invocations instead of encoding.
///
/// Outputs are marker files so the data flow stays observable:
/// - mux writes the image bytes followed by a newline
/// - concat writes the bytes of every listed input, in manifest order
///
/// With [`MockGenerator`](super::MockGenerator) outputs, a final artifact
/// therefore reads as one line per unit in presentation order.
#[derive(Debug, Clone, Default)]
pub struct RecordingEncoder {
    calls: Arc<RwLock<Vec<EncoderCall>>>,
    failing_outputs: Arc<RwLock<HashSet<PathBuf>>>,
    /// Simulated latency of invocations writing a given output.
    slow_outputs: Arc<RwLock<HashMap<PathBuf, Duration>>>,
}

impl RecordingEncoder {
    /// Create a new recording encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any invocation writing `output` fail.
    pub async fn fail_output(&self, output: impl Into<PathBuf>) {
        self.failing_outputs.write().await.insert(output.into());
    }

    /// Make any invocation writing `output` take `delay` (cancellable).
    pub async fn delay_output(&self, output: impl Into<PathBuf>, delay: Duration) {
        self.slow_outputs.write().await.insert(output.into(), delay);
    }

    /// Get all recorded invocations.
    pub async fn calls(&self) -> Vec<EncoderCall> {
        self.calls.read().await.clone()
    }

    /// Get the number of mux invocations.
    pub async fn mux_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, EncoderCall::Mux { .. }))
            .count()
    }

    /// Inputs and output of every concat invocation, in call order.
    pub async fn concat_inputs(&self) -> Vec<(Vec<PathBuf>, PathBuf)> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                EncoderCall::Concat { inputs, output, .. } => {
                    Some((inputs.clone(), output.clone()))
                }
                EncoderCall::Mux { .. } => None,
            })
            .collect()
    }

    /// Inputs of the concat that produced `output`, if any.
    pub async fn concat_inputs_for(&self, output: &Path) -> Option<Vec<PathBuf>> {
        self.concat_inputs()
            .await
            .into_iter()
            .find(|(_, o)| o == output)
            .map(|(inputs, _)| inputs)
    }

    async fn apply_script(
        &self,
        cancel: &CancelToken,
        mode: EncodeMode,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        let delay = self.slow_outputs.read().await.get(output).copied();
        if let Some(delay) = delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(AssemblyError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if self.failing_outputs.read().await.contains(output) {
            return Err(AssemblyError::encoder_failed(
                mode,
                Some(1),
                Some(format!("scripted failure for {}", output.display())),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaEncoder for RecordingEncoder {
    fn name(&self) -> &str {
        "recording"
    }

    async fn mux(
        &self,
        cancel: &CancelToken,
        image: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        if cancel.is_cancelled() {
            return Err(AssemblyError::Cancelled);
        }
        self.calls.write().await.push(EncoderCall::Mux {
            image: image.to_path_buf(),
            audio: audio.to_path_buf(),
            output: output.to_path_buf(),
        });
        self.apply_script(cancel, EncodeMode::Mux, output).await?;

        let mut marker = tokio::fs::read(image).await?;
        marker.push(b'\n');
        tokio::fs::write(output, marker).await?;
        Ok(())
    }

    async fn concat(
        &self,
        cancel: &CancelToken,
        manifest: &Path,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        if cancel.is_cancelled() {
            return Err(AssemblyError::Cancelled);
        }
        let inputs = parse_manifest(&tokio::fs::read_to_string(manifest).await?);
        self.calls.write().await.push(EncoderCall::Concat {
            manifest: manifest.to_path_buf(),
            inputs: inputs.clone(),
            output: output.to_path_buf(),
        });
        self.apply_script(cancel, EncodeMode::Concat, output).await?;

        let mut joined = Vec::new();
        for input in &inputs {
            joined.extend(tokio::fs::read(input).await?);
        }
        tokio::fs::write(output, joined).await?;
        Ok(())
    }
}
