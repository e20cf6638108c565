//! Configuration for staging and finished output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::splicer::ConcatOrder;

use super::area::StagingArea;

/// Where intermediate and finished artifacts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Root of the per-node staging directories.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Directory receiving one finished file per root node.
    #[serde(default = "default_finished_dir")]
    pub finished_dir: PathBuf,

    /// Order of a node's own artifact relative to its children.
    #[serde(default)]
    pub concat_order: ConcatOrder,

    /// Leave staging directories in place (debugging aid).
    #[serde(default)]
    pub keep_staging: bool,
}

fn default_root() -> PathBuf {
    std::env::temp_dir().join("tales-staging")
}

fn default_finished_dir() -> PathBuf {
    PathBuf::from("finished")
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            finished_dir: default_finished_dir(),
            concat_order: ConcatOrder::default(),
            keep_staging: false,
        }
    }
}

impl StagingConfig {
    /// Staging area rooted at `root` producing `extension` containers.
    pub fn area(&self, extension: &str) -> StagingArea {
        StagingArea::new(self.root.clone(), extension)
    }
}
