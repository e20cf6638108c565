//! On-disk staging namespace partitioned by namespaced node id.

mod area;
mod config;
mod error;

pub use area::{NodeStaging, StagingArea};
pub use config::StagingConfig;
pub use error::StagingError;
