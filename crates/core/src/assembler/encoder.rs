//! The external encoder abstraction.

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::cancel::CancelToken;

use super::error::AssemblyError;

/// The two encoder invocations the assembler needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodeMode {
    Mux,
    Concat,
}

impl EncodeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mux => "mux",
            Self::Concat => "concat",
        }
    }
}

impl fmt::Display for EncodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for media encoder implementations.
///
/// Both calls must abort when `cancel` fires.
#[async_trait]
pub trait MediaEncoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Combines a still image and an audio track into a video segment.
    async fn mux(
        &self,
        cancel: &CancelToken,
        image: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<(), AssemblyError>;

    /// Joins the files listed in `manifest`, in order, without transcoding.
    async fn concat(
        &self,
        cancel: &CancelToken,
        manifest: &Path,
        output: &Path,
    ) -> Result<(), AssemblyError>;
}

#[async_trait]
impl<E: MediaEncoder + ?Sized> MediaEncoder for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn mux(
        &self,
        cancel: &CancelToken,
        image: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        (**self).mux(cancel, image, audio, output).await
    }

    async fn concat(
        &self,
        cancel: &CancelToken,
        manifest: &Path,
        output: &Path,
    ) -> Result<(), AssemblyError> {
        (**self).concat(cancel, manifest, output).await
    }
}
