//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the orchestrator and its workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Capacity of the queue feeding content trees into the orchestrator.
    #[serde(default = "default_input_capacity")]
    pub input_queue_capacity: usize,

    /// Capacity of each generation stage queue.
    #[serde(default = "default_stage_capacity")]
    pub stage_queue_capacity: usize,

    /// Root trees generating at the same time.
    /// Splicing is always one tree at a time.
    #[serde(default = "default_max_dispatches")]
    pub max_concurrent_dispatches: usize,
}

fn default_input_capacity() -> usize {
    16
}

fn default_stage_capacity() -> usize {
    64
}

fn default_max_dispatches() -> usize {
    2
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            input_queue_capacity: default_input_capacity(),
            stage_queue_capacity: default_stage_capacity(),
            max_concurrent_dispatches: default_max_dispatches(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.input_queue_capacity, 16);
        assert_eq!(config.stage_queue_capacity, 64);
        assert_eq!(config.max_concurrent_dispatches, 2);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: OrchestratorConfig = toml::from_str("max_concurrent_dispatches = 4").unwrap();
        assert_eq!(config.max_concurrent_dispatches, 4);
        assert_eq!(config.stage_queue_capacity, 64);
    }
}
