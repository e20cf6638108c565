//! FFmpeg-based encoder implementation.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::process::{run_cancellable, ProcessError};

use super::config::EncoderConfig;
use super::encoder::{EncodeMode, MediaEncoder};
use super::error::AssemblyError;

/// FFmpeg-based encoder implementation.
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    /// Creates a new FFmpeg encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Scale-down-and-letterbox filter for the configured frame size.
    fn scale_filter(&self) -> String {
        let (w, h) = (self.config.width, self.config.height);
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:{}",
            self.config.pad_color
        )
    }

    /// Builds ffmpeg arguments turning a still image plus narration into a segment.
    fn build_mux_args(&self, image: &Path, audio: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            "-loop".to_string(),
            "1".to_string(),
            "-framerate".to_string(),
            self.config.framerate.to_string(),
            "-i".to_string(),
            image.to_string_lossy().to_string(),
            "-i".to_string(),
            audio.to_string_lossy().to_string(),
            "-c:v".to_string(),
            self.config.video_codec.clone(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-tune".to_string(),
            self.config.tune.clone(),
            "-crf".to_string(),
            self.config.crf.to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            "-shortest".to_string(),
            "-pix_fmt".to_string(),
            self.config.pix_fmt.clone(),
            "-vf".to_string(),
            self.scale_filter(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Builds ffmpeg arguments for a stream-copy concatenation.
    fn build_concat_args(&self, manifest: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            manifest.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    async fn run(
        &self,
        mode: EncodeMode,
        cancel: &CancelToken,
        args: Vec<String>,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        debug!(mode = %mode, args = ?args, "Running ffmpeg");

        let limit = Duration::from_secs(self.config.timeout_secs);
        let result = run_cancellable(&self.config.ffmpeg_path, &args, cancel, limit)
            .await
            .map_err(|e| match e {
                ProcessError::NotFound(path) => AssemblyError::EncoderNotFound { path },
                ProcessError::Io(e) => AssemblyError::Io(e),
                ProcessError::TimedOut(_) => AssemblyError::Timeout {
                    mode,
                    timeout_secs: self.config.timeout_secs,
                },
                ProcessError::Cancelled => AssemblyError::Cancelled,
            })?;

        if !result.status.success() {
            return Err(AssemblyError::encoder_failed(
                mode,
                result.status.code(),
                result.stderr_tail(),
            ));
        }

        tokio::fs::metadata(output)
            .await
            .map_err(|_| AssemblyError::OutputMissing {
                mode,
                path: output.to_path_buf(),
            })?;
        Ok(())
    }
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn mux(
        &self,
        cancel: &CancelToken,
        image: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        let args = self.build_mux_args(image, audio, output);
        self.run(EncodeMode::Mux, cancel, args, output).await
    }

    async fn concat(
        &self,
        cancel: &CancelToken,
        manifest: &Path,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        let args = self.build_concat_args(manifest, output);
        self.run(EncodeMode::Concat, cancel, args, output).await
    }
}
