//! Clips generated ahead of splicing.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::content::{ContentNode, NodePath};
use crate::generator::UnitGenerator;
use crate::processor::{Clip, ClipSource, NodeError, NodeProcessor};

/// Per-node generation results of one tree, keyed by namespaced id.
///
/// Each entry is handed out once: the splicer takes ownership of a node's
/// clips when it assembles that node.
#[derive(Debug, Default)]
pub struct GeneratedClips {
    nodes: Mutex<HashMap<NodePath, Result<Vec<Clip>, NodeError>>>,
}

impl GeneratedClips {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `processor` over every node of `root`, parents before children.
    ///
    /// A failed node does not stop generation of the rest of the tree.
    pub async fn generate<A, V>(
        processor: &NodeProcessor<A, V>,
        cancel: &CancelToken,
        root: &ContentNode,
    ) -> Self
    where
        A: UnitGenerator,
        V: UnitGenerator,
    {
        let mut nodes = HashMap::with_capacity(root.subtree_len());
        let mut stack = vec![(NodePath::root(&root.id), root)];

        while let Some((path, node)) = stack.pop() {
            let child_paths = path.children(&node.children);
            for (child_path, child) in child_paths.into_iter().zip(&node.children).rev() {
                stack.push((child_path, child));
            }
            let result = processor.process(cancel, &path, node).await;
            if let Err(e) = &result {
                debug!(node = %path, error = %e, "Node generation failed");
            }
            nodes.insert(path, result);
        }

        Self {
            nodes: Mutex::new(nodes),
        }
    }

    /// Nodes still holding a result.
    pub async fn len(&self) -> usize {
        self.nodes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.lock().await.is_empty()
    }

    pub async fn failed_count(&self) -> usize {
        self.nodes
            .lock()
            .await
            .values()
            .filter(|r| r.is_err())
            .count()
    }
}

#[async_trait]
impl ClipSource for GeneratedClips {
    async fn clips(
        &self,
        _cancel: &CancelToken,
        path: &NodePath,
        _node: &ContentNode,
    ) -> Result<Vec<Clip>, NodeError> {
        self.nodes
            .lock()
            .await
            .remove(path)
            .unwrap_or_else(|| Err(NodeError::NotGenerated { path: path.clone() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GenerationErrorKind, GeneratorRole};
    use crate::testing::{fixtures, MockGenerator};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_generates_tree_in_pre_order() {
        let audio = Arc::new(MockGenerator::new(GeneratorRole::Audio));
        let visual = Arc::new(MockGenerator::new(GeneratorRole::Visual));
        let processor = NodeProcessor::from_shared(Arc::clone(&audio), visual);
        let tree = fixtures::post_with_children("p1", &["a", "b"]);

        let clips = GeneratedClips::generate(&processor, &CancelToken::new(), &tree).await;

        assert_eq!(clips.len().await, 3);
        assert_eq!(audio.recorded_nodes().await, vec!["p1", "p1/a", "p1/b"]);
    }

    #[tokio::test]
    async fn test_failed_node_is_kept_and_taken_once() {
        let audio = Arc::new(MockGenerator::new(GeneratorRole::Audio));
        let visual = Arc::new(MockGenerator::new(GeneratorRole::Visual));
        audio.fail_on("p1/c1", 0, GenerationErrorKind::Transient).await;
        let processor = NodeProcessor::from_shared(audio, visual);
        let tree = fixtures::post_with_reply();
        let cancel = CancelToken::new();

        let clips = GeneratedClips::generate(&processor, &cancel, &tree).await;
        assert_eq!(clips.failed_count().await, 1);

        let root = NodePath::root("p1");
        let child = root.child("c1");
        assert_eq!(clips.clips(&cancel, &root, &tree).await.unwrap().len(), 3);
        assert!(matches!(
            clips.clips(&cancel, &child, &tree.children[0]).await,
            Err(NodeError::Generation { .. })
        ));
        assert!(matches!(
            clips.clips(&cancel, &root, &tree).await,
            Err(NodeError::NotGenerated { .. })
        ));
    }
}
