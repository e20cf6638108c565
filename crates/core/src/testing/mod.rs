//! Testing utilities and mock implementations.
//!
//! This module provides fakes for the two external seams of the pipeline,
//! generation back-ends and the media encoder, so the whole tree pipeline can
//! run in tests without network services or ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use tales_core::testing::{fixtures, MockGenerator, RecordingEncoder};
//!
//! let audio = MockGenerator::new(GeneratorRole::Audio);
//! let visual = MockGenerator::new(GeneratorRole::Visual);
//! let encoder = RecordingEncoder::new();
//!
//! let tree = fixtures::post_with_reply();
//! // Drive a TreeSplicer, then inspect encoder.concat_inputs()...
//! ```

mod mock_generator;
mod recording_encoder;

pub use mock_generator::MockGenerator;
pub use recording_encoder::{EncoderCall, RecordingEncoder};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::content::ContentNode;

    /// `p1` ("Title", "One. Two.") with a single reply `c1` ("Reply one.").
    pub fn post_with_reply() -> ContentNode {
        ContentNode::new("p1", "One. Two.")
            .with_title("Title")
            .with_author("op", 120)
            .with_child(ContentNode::new("c1", "Reply one.").with_author("replier", 7))
    }

    /// A root `id` with a one-sentence comment per entry of `children`.
    pub fn post_with_children(id: &str, children: &[&str]) -> ContentNode {
        children.iter().fold(
            ContentNode::new(id, "Post body.").with_title(format!("{} title", id)),
            |node, child| node.with_child(ContentNode::new(*child, format!("Reply {}.", child))),
        )
    }

    /// A chain `ids[0] -> ids[1] -> ...`, each with a one-sentence body.
    pub fn chain(ids: &[&str]) -> ContentNode {
        let mut node: Option<ContentNode> = None;
        for id in ids.iter().rev() {
            let mut current = ContentNode::new(*id, format!("Text of {}.", id));
            if let Some(child) = node.take() {
                current = current.with_child(child);
            }
            node = Some(current);
        }
        node.unwrap_or_else(|| ContentNode::new("empty", ""))
    }
}
