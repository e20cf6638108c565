//! Turns clips into segments and segments into artifacts.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::metrics;
use crate::processor::Clip;
use crate::staging::NodeStaging;

use super::encoder::{EncodeMode, MediaEncoder};
use super::error::AssemblyError;
use super::manifest::render_manifest;

/// Drives a [`MediaEncoder`] over staging paths.
pub struct Assembler<E> {
    encoder: Arc<E>,
}

impl<E> Clone for Assembler<E> {
    fn clone(&self) -> Self {
        Self {
            encoder: Arc::clone(&self.encoder),
        }
    }
}

impl<E: MediaEncoder> Assembler<E> {
    pub fn new(encoder: E) -> Self {
        Self::from_shared(Arc::new(encoder))
    }

    pub fn from_shared(encoder: Arc<E>) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Writes the clip's image and audio into the node's staging directory
    /// and muxes them into the unit segment. Returns the segment path.
    pub async fn mux_unit(
        &self,
        cancel: &CancelToken,
        clip: &Clip,
        staging: &NodeStaging,
    ) -> Result<PathBuf, AssemblyError> {
        let image = staging.unit_image(clip.index);
        let audio = staging.unit_audio(clip.index);
        let segment = staging.unit_segment(clip.index);

        write_input(&image, &clip.visual).await?;
        write_input(&audio, &clip.audio).await?;

        self.observe(EncodeMode::Mux, self.encoder.mux(cancel, &image, &audio, &segment))
            .await?;
        Ok(segment)
    }

    /// Concatenates `ordered` into `output`, listing them in `manifest` in
    /// exactly the given order. A single input is concatenated as well.
    pub async fn concat(
        &self,
        cancel: &CancelToken,
        ordered: &[PathBuf],
        manifest: &Path,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        if ordered.is_empty() {
            return Err(AssemblyError::EmptyInput);
        }

        let contents = render_manifest(ordered).map_err(|source| AssemblyError::Manifest {
            path: manifest.to_path_buf(),
            source,
        })?;
        tokio::fs::write(manifest, contents)
            .await
            .map_err(|source| AssemblyError::Manifest {
                path: manifest.to_path_buf(),
                source,
            })?;

        self.observe(EncodeMode::Concat, self.encoder.concat(cancel, manifest, output))
            .await
    }

    /// Muxes every clip in unit order and joins the segments into the
    /// node's own artifact.
    pub async fn assemble_node(
        &self,
        cancel: &CancelToken,
        staging: &NodeStaging,
        clips: &[Clip],
    ) -> Result<PathBuf, AssemblyError> {
        if clips.is_empty() {
            return Err(AssemblyError::EmptyInput);
        }

        let mut segments = Vec::with_capacity(clips.len());
        for clip in clips {
            segments.push(self.mux_unit(cancel, clip, staging).await?);
        }

        let own = staging.own_artifact();
        self.concat(cancel, &segments, &staging.manifest(), &own)
            .await?;
        debug!(node = %staging.path(), segments = segments.len(), "Own artifact assembled");
        Ok(own)
    }

    async fn observe<F>(&self, mode: EncodeMode, call: F) -> Result<(), AssemblyError>
    where
        F: std::future::Future<Output = Result<(), AssemblyError>>,
    {
        let start = Instant::now();
        let result = call.await;
        metrics::ENCODER_DURATION
            .with_label_values(&[mode.as_str()])
            .observe(start.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { "success" } else { "failed" };
        metrics::ENCODER_INVOCATIONS
            .with_label_values(&[mode.as_str(), outcome])
            .inc();
        result
    }
}

async fn write_input(path: &Path, bytes: &[u8]) -> Result<(), AssemblyError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| AssemblyError::WriteInput {
            path: path.to_path_buf(),
            source,
        })
}
