//! Pipeline orchestrator.
//!
//! The orchestrator wires the stages together:
//! - **Generation**: one worker per role (audio, visual), requests served in order
//! - **Barrier**: each dispatch waits for both stages to drain its work
//! - **Splicing**: one worker assembling trees children-first and placing the result

mod barrier;
mod clips;
mod config;
mod runner;
mod stage;
mod types;

pub use barrier::CompletionBarrier;
pub use clips::GeneratedClips;
pub use config::OrchestratorConfig;
pub use runner::Orchestrator;
pub use stage::{StageGenerator, StageMessage};
pub use types::{DispatchReport, OrchestratorError, OrchestratorStatus};
