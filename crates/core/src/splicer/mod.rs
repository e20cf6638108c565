//! Recursive, children-first assembly of a content tree.

mod error;
mod tree;
mod types;

pub use error::SpliceError;
pub use tree::TreeSplicer;
pub use types::{ConcatOrder, NodeOutcome, SpliceReport, SpliceState};
