//! Error types for the splicer module.

use thiserror::Error;

use crate::assembler::AssemblyError;
use crate::content::NodePath;
use crate::processor::NodeError;

/// Why a node could not be finalized.
#[derive(Debug, Error)]
pub enum SpliceError {
    /// The node's clips could not be generated.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// Assembling the own or final artifact failed.
    #[error("assembly of {path} failed: {source}")]
    Assembly {
        path: NodePath,
        #[source]
        source: AssemblyError,
    },
}

impl SpliceError {
    pub fn path(&self) -> &NodePath {
        match self {
            Self::Node(e) => e.path(),
            Self::Assembly { path, .. } => path,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Node(e) => e.is_cancelled(),
            Self::Assembly { source, .. } => source.is_cancelled(),
        }
    }

    /// Stage label used in metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Node(_) => "generate",
            Self::Assembly { .. } => "assemble",
        }
    }
}
