//! Types for the orchestrator module.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::content::NodePath;
use crate::generator::GeneratorRole;

/// Errors returned by the orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The orchestrator has been shut down.
    #[error("Orchestrator is not running")]
    NotRunning,

    /// A generation stage worker is gone.
    #[error("{0} generation stage is closed")]
    StageClosed(GeneratorRole),

    /// The splice worker is gone.
    #[error("Splice worker unavailable: {0}")]
    Splice(String),

    /// The dispatch was cancelled before it reached the splice worker.
    #[error("Dispatch cancelled")]
    Cancelled,
}

/// Outcome of one root dispatch, emitted by the splice worker.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// Id of the root node as received.
    pub root_id: String,
    /// Finished file, when the root was finalized and placed.
    pub artifact: Option<PathBuf>,
    /// Namespaced ids of failed nodes with their reasons.
    pub failed: Vec<(NodePath, String)>,
    /// Nodes finalized in this tree.
    pub finalized_nodes: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Current orchestrator status.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    /// Whether the orchestrator accepts new dispatches.
    pub running: bool,
    /// Dispatches accepted but not yet reported.
    pub in_flight: u64,
    /// Dispatches whose root artifact was placed.
    pub finalized: u64,
    /// Dispatches that produced no artifact.
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialization() {
        let now = Utc::now();
        let report = DispatchReport {
            root_id: "p1".to_string(),
            artifact: Some(PathBuf::from("/finished/p1.mkv")),
            failed: vec![(NodePath::root("p1").child("c1"), "boom".to_string())],
            finalized_nodes: 1,
            started_at: now,
            finished_at: now,
        };
        assert!(report.is_success());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["root_id"], "p1");
        assert_eq!(json["failed"][0][1], "boom");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            OrchestratorError::StageClosed(GeneratorRole::Visual).to_string(),
            "visual generation stage is closed"
        );
    }
}
