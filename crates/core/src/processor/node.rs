//! Drives both generators over the units of a single node.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::content::{ContentNode, NodePath, TextUnit};
use crate::generator::{GenerationRequest, GeneratorRole, UnitGenerator};
use crate::metrics;

use super::error::NodeError;
use super::plan::plan_units;
use super::types::Clip;

/// Supplies the clips of a node to the tree splicer.
#[async_trait]
pub trait ClipSource: Send + Sync {
    /// Returns the clips for `node`, in unit order, or the reason the node failed.
    async fn clips(
        &self,
        cancel: &CancelToken,
        path: &NodePath,
        node: &ContentNode,
    ) -> Result<Vec<Clip>, NodeError>;
}

/// Converts one content node into its ordered clips.
///
/// Units run strictly one after another; the audio and visual calls of a
/// single unit run concurrently. The first failure abandons the node and
/// drops every clip produced so far.
pub struct NodeProcessor<A, V> {
    audio: Arc<A>,
    visual: Arc<V>,
}

impl<A, V> Clone for NodeProcessor<A, V> {
    fn clone(&self) -> Self {
        Self {
            audio: Arc::clone(&self.audio),
            visual: Arc::clone(&self.visual),
        }
    }
}

impl<A: UnitGenerator, V: UnitGenerator> NodeProcessor<A, V> {
    pub fn new(audio: A, visual: V) -> Self {
        Self::from_shared(Arc::new(audio), Arc::new(visual))
    }

    pub fn from_shared(audio: Arc<A>, visual: Arc<V>) -> Self {
        Self { audio, visual }
    }

    /// Ordered units of `node`; nothing is generated.
    pub fn plan(&self, path: &NodePath, node: &ContentNode) -> Vec<TextUnit> {
        plan_units(path, node)
    }

    /// Generates a clip per unit of `node`.
    pub async fn process(
        &self,
        cancel: &CancelToken,
        path: &NodePath,
        node: &ContentNode,
    ) -> Result<Vec<Clip>, NodeError> {
        let units = self.plan(path, node);
        if units.is_empty() {
            metrics::NODES_TOTAL
                .with_label_values(&["generate", "failed"])
                .inc();
            return Err(NodeError::NoUnits { path: path.clone() });
        }

        let key = path.key();
        let title = node
            .title_text()
            .filter(|_| path.is_root())
            .map(str::to_string);
        let mut clips = Vec::with_capacity(units.len());
        for unit in units {
            let request = GenerationRequest {
                node_key: key.clone(),
                unit_index: unit.index,
                text: unit.text,
                revealed: unit.revealed,
                render_kind: unit.render_kind,
                author: node.author.clone(),
                score: node.score,
                title: title.clone(),
            };

            let generated = tokio::try_join!(
                self.generate_one(&*self.audio, GeneratorRole::Audio, cancel, path, &request),
                self.generate_one(&*self.visual, GeneratorRole::Visual, cancel, path, &request),
            );
            match generated {
                Ok((audio, visual)) => clips.push(Clip::new(request.unit_index, visual, audio)),
                Err(e) => {
                    debug!(
                        node = %path,
                        discarded = clips.len(),
                        "Discarding clips of failed node"
                    );
                    metrics::NODES_TOTAL
                        .with_label_values(&["generate", "failed"])
                        .inc();
                    return Err(e);
                }
            }
        }

        metrics::NODES_TOTAL
            .with_label_values(&["generate", "success"])
            .inc();
        debug!(node = %path, units = clips.len(), "Node generated");
        Ok(clips)
    }

    async fn generate_one<G: UnitGenerator + ?Sized>(
        &self,
        generator: &G,
        role: GeneratorRole,
        cancel: &CancelToken,
        path: &NodePath,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>, NodeError> {
        let start = Instant::now();
        let result = generator.generate(cancel, request).await;
        metrics::GENERATION_DURATION
            .with_label_values(&[role.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(bytes) => {
                metrics::UNITS_GENERATED
                    .with_label_values(&[role.as_str(), "success"])
                    .inc();
                Ok(bytes)
            }
            Err(source) => {
                metrics::UNITS_GENERATED
                    .with_label_values(&[role.as_str(), source.kind.as_str()])
                    .inc();
                Err(NodeError::Generation {
                    path: path.clone(),
                    unit_index: request.unit_index,
                    role,
                    source,
                })
            }
        }
    }
}

#[async_trait]
impl<A: UnitGenerator, V: UnitGenerator> ClipSource for NodeProcessor<A, V> {
    async fn clips(
        &self,
        cancel: &CancelToken,
        path: &NodePath,
        node: &ContentNode,
    ) -> Result<Vec<Clip>, NodeError> {
        self.process(cancel, path, node).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RenderKind;
    use crate::generator::GenerationErrorKind;
    use crate::testing::MockGenerator;

    fn processor() -> (
        NodeProcessor<MockGenerator, MockGenerator>,
        Arc<MockGenerator>,
        Arc<MockGenerator>,
    ) {
        let audio = Arc::new(MockGenerator::new(GeneratorRole::Audio));
        let visual = Arc::new(MockGenerator::new(GeneratorRole::Visual));
        (
            NodeProcessor::from_shared(Arc::clone(&audio), Arc::clone(&visual)),
            audio,
            visual,
        )
    }

    #[tokio::test]
    async fn test_process_generates_clip_per_unit_in_order() {
        let (processor, audio, visual) = processor();
        let node = ContentNode::new("p1", "One. Two.").with_title("Title");
        let path = NodePath::root("p1");

        let clips = processor
            .process(&CancelToken::new(), &path, &node)
            .await
            .unwrap();

        assert_eq!(clips.len(), 3);
        let indexes: Vec<usize> = clips.iter().map(|c| c.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(clips[1].audio, b"audio:p1:1:One.".to_vec());

        let seen: Vec<String> = audio
            .recorded_requests()
            .await
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(seen, vec!["Title", "One.", "Two."]);

        let kinds: Vec<RenderKind> = visual
            .recorded_requests()
            .await
            .into_iter()
            .map(|r| r.render_kind)
            .collect();
        assert_eq!(
            kinds,
            vec![RenderKind::PostTitle, RenderKind::PostBody, RenderKind::PostBody]
        );
    }

    #[tokio::test]
    async fn test_failure_discards_node_and_stops() {
        let (processor, audio, visual) = processor();
        visual.fail_on("p1", 2, GenerationErrorKind::RenderingFailed).await;
        let node = ContentNode::new("p1", "A. B. C. D. E.");
        let path = NodePath::root("p1");

        let err = processor
            .process(&CancelToken::new(), &path, &node)
            .await
            .unwrap_err();

        match err {
            NodeError::Generation {
                unit_index, role, ..
            } => {
                assert_eq!(unit_index, 2);
                assert_eq!(role, GeneratorRole::Visual);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Units after the failing one are never requested.
        let requested: Vec<usize> = audio
            .recorded_requests()
            .await
            .into_iter()
            .map(|r| r.unit_index)
            .collect();
        assert!(requested.iter().all(|&i| i <= 2));
    }

    #[tokio::test]
    async fn test_empty_node_fails_with_no_units() {
        let (processor, audio, _) = processor();
        let node = ContentNode::new("c1", "   ");
        let err = processor
            .process(&CancelToken::new(), &NodePath::root("c1"), &node)
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::NoUnits { .. }));
        assert_eq!(audio.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_fails_node() {
        let (processor, _, _) = processor();
        let token = CancelToken::new();
        token.cancel();
        let err = processor
            .process(&token, &NodePath::root("p1"), &ContentNode::new("p1", "Hi."))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_request_carries_node_metadata() {
        let (processor, _, visual) = processor();
        let node = ContentNode::new("c1", "Reply.").with_author("someone", 12);
        processor
            .process(&CancelToken::new(), &NodePath::root("p1").child("c1"), &node)
            .await
            .unwrap();

        let requests = visual.recorded_requests().await;
        assert_eq!(requests[0].author, "someone");
        assert_eq!(requests[0].score, 12);
        assert_eq!(requests[0].node_key, "p1/c1");
        assert_eq!(requests[0].render_kind, RenderKind::Comment);
    }
}
