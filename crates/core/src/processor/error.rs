//! Error types for the processor module.

use thiserror::Error;

use crate::content::NodePath;
use crate::generator::{GenerationError, GenerationErrorKind, GeneratorRole};

/// A node's unit sequence could not be completed.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A generator failed for one unit; clips of earlier units were discarded.
    #[error("{role} generation failed for unit {unit_index} of {path}: {source}")]
    Generation {
        path: NodePath,
        unit_index: usize,
        role: GeneratorRole,
        #[source]
        source: GenerationError,
    },

    /// Neither title nor body yielded a narratable unit.
    #[error("node {path} has no narratable text")]
    NoUnits { path: NodePath },

    /// A pre-generated clip set was requested for a node that was never generated.
    #[error("no clips were generated for node {path}")]
    NotGenerated { path: NodePath },
}

impl NodeError {
    /// Namespaced id of the failed node.
    pub fn path(&self) -> &NodePath {
        match self {
            Self::Generation { path, .. } => path,
            Self::NoUnits { path } => path,
            Self::NotGenerated { path } => path,
        }
    }

    /// Whether the failure came from the cancel token rather than a back-end.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Generation { source, .. } if source.kind == GenerationErrorKind::Cancelled
        )
    }
}
