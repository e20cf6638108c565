//! Error types for the assembler module.

use std::path::PathBuf;
use thiserror::Error;

use crate::staging::StagingError;

use super::encoder::EncodeMode;

/// Errors that can occur while assembling media.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Encoder binary not found.
    #[error("Encoder not found at path: {path}")]
    EncoderNotFound { path: PathBuf },

    /// Encoder exited unsuccessfully.
    #[error("Encoder {mode} failed with exit code {code:?}")]
    EncoderFailed {
        mode: EncodeMode,
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// Encoder ran longer than allowed.
    #[error("Encoder {mode} timed out after {timeout_secs} seconds")]
    Timeout { mode: EncodeMode, timeout_secs: u64 },

    /// Encoder reported success but left no output.
    #[error("Encoder {mode} produced no output at {path}")]
    OutputMissing { mode: EncodeMode, path: PathBuf },

    /// The manifest could not be written.
    #[error("Failed to write manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Clip bytes could not be written to staging.
    #[error("Failed to write encoder input {path}: {source}")]
    WriteInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nothing to assemble.
    #[error("Nothing to assemble")]
    EmptyInput,

    /// The staging directory could not be prepared.
    #[error(transparent)]
    Staging(#[from] StagingError),

    /// I/O error while driving the encoder.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cancel token fired.
    #[error("Assembly cancelled")]
    Cancelled,
}

impl AssemblyError {
    /// Creates a new encoder failure with optional stderr output.
    pub fn encoder_failed(mode: EncodeMode, code: Option<i32>, stderr: Option<String>) -> Self {
        Self::EncoderFailed { mode, code, stderr }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
