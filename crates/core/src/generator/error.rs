//! Error types for unit generation.

use std::fmt;

use thiserror::Error;

/// Why a generation call produced no bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationErrorKind {
    /// Network hiccup, timeout or 5xx; the same call may succeed later.
    Transient,
    /// The back-end refused the call because a usage limit was hit.
    Quota,
    /// The back-end ran but could not produce a usable artifact.
    RenderingFailed,
    /// The supplied cancel token fired.
    Cancelled,
}

impl GenerationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Quota => "quota",
            Self::RenderingFailed => "rendering-failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed generation call. Never accompanied by partial bytes.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Transient, message)
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Quota, message)
    }

    pub fn rendering_failed(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::RenderingFailed, message)
    }

    pub fn cancelled() -> Self {
        Self::new(GenerationErrorKind::Cancelled, "generation cancelled")
    }

    /// Whether a back-end-level retry could plausibly succeed.
    ///
    /// The pipeline itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            GenerationErrorKind::Transient | GenerationErrorKind::Quota
        )
    }
}
