//! Per-node generation.
//!
//! A node's text is planned into ordered units, each of which is sent to the
//! audio and visual generators. The resulting [`Clip`]s are handed to the
//! assembler; a failing unit fails the whole node and nothing else.

mod error;
mod node;
mod plan;
mod types;

pub use error::NodeError;
pub use node::{ClipSource, NodeProcessor};
pub use plan::plan_units;
pub use types::Clip;
