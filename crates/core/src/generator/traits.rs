//! Trait definitions for the generator module.

use async_trait::async_trait;
use std::sync::Arc;

use crate::cancel::CancelToken;

use super::error::GenerationError;
use super::types::{GenerationRequest, GeneratorRole};

/// A back-end that turns one unit of text into an encoded byte buffer.
///
/// Every call is a single attempt; a failure is surfaced immediately.
/// Implementations must return [`GenerationError`] with kind `Cancelled`
/// once `cancel` fires instead of finishing the call.
#[async_trait]
pub trait UnitGenerator: Send + Sync {
    /// Returns the name of this generator implementation.
    fn name(&self) -> &str;

    /// The role this generator fills.
    fn role(&self) -> GeneratorRole;

    /// Produces the encoded artifact (speech or image) for one unit.
    async fn generate(
        &self,
        cancel: &CancelToken,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>, GenerationError>;
}

#[async_trait]
impl<G: UnitGenerator + ?Sized> UnitGenerator for Arc<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn role(&self) -> GeneratorRole {
        (**self).role()
    }

    async fn generate(
        &self,
        cancel: &CancelToken,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>, GenerationError> {
        (**self).generate(cancel, request).await
    }
}
