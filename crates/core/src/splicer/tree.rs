//! Post-order splicing of a content tree into one artifact.

use futures::future::{BoxFuture, FutureExt};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::assembler::{Assembler, AssemblyError, MediaEncoder};
use crate::cancel::CancelToken;
use crate::content::{ContentNode, NodePath};
use crate::metrics;
use crate::processor::ClipSource;
use crate::staging::{NodeStaging, StagingArea};

use super::error::SpliceError;
use super::types::{ConcatOrder, NodeOutcome, SpliceReport, SpliceState};

/// Builds each node's final artifact from its own clips and its children's
/// final artifacts, children first.
///
/// A failed child is left out of its parent. A node whose own content fails
/// is failed as a whole, children included. Staging of every visited node is
/// removed once the node reaches a terminal state, unless `keep_staging` is set.
pub struct TreeSplicer<S, E> {
    source: S,
    assembler: Assembler<E>,
    staging: StagingArea,
    order: ConcatOrder,
    keep_staging: bool,
}

impl<S: ClipSource, E: MediaEncoder> TreeSplicer<S, E> {
    pub fn new(source: S, assembler: Assembler<E>, staging: StagingArea) -> Self {
        Self {
            source,
            assembler,
            staging,
            order: ConcatOrder::default(),
            keep_staging: false,
        }
    }

    pub fn with_order(mut self, order: ConcatOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_keep_staging(mut self, keep: bool) -> Self {
        self.keep_staging = keep;
        self
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Splices the tree rooted at `root`.
    ///
    /// On success the report carries the root's final artifact, which still
    /// lives in staging; the caller moves it to its destination.
    pub async fn splice_root(&self, cancel: &CancelToken, root: &ContentNode) -> SpliceReport {
        let path = NodePath::root(&root.id);
        let mut report = SpliceReport::default();

        match self.splice(cancel, path.clone(), root, &mut report).await {
            Ok(artifact) => {
                info!(
                    root = %path,
                    nodes = report.finalized_count(),
                    failed = report.failed().len(),
                    "Tree spliced"
                );
                report.final_artifact = Some(artifact);
            }
            Err(e) => {
                warn!(root = %path, error = %e, "Tree failed");
                let staging = self.staging.node(&path);
                if let Err(e) = self.staging.discard_final(&staging).await {
                    warn!(root = %path, error = %e, "Failed to discard partial artifact");
                }
            }
        }
        report
    }

    /// Splices the node at `path`, recursing into its children first.
    pub fn splice<'a>(
        &'a self,
        cancel: &'a CancelToken,
        path: NodePath,
        node: &'a ContentNode,
        report: &'a mut SpliceReport,
    ) -> BoxFuture<'a, Result<PathBuf, SpliceError>> {
        async move {
            let mut state = SpliceState::Pending;

            let mut child_finals = Vec::with_capacity(node.children.len());
            let child_paths = path.children(&node.children);
            for (child_path, child) in child_paths.into_iter().zip(&node.children) {
                match self.splice(cancel, child_path.clone(), child, report).await {
                    Ok(artifact) => child_finals.push(artifact),
                    Err(_) => {
                        debug!(parent = %path, child = %child_path, "Omitting failed child");
                    }
                }
            }
            advance(&path, &mut state, SpliceState::ChildrenDone);

            let staging = self.staging.node(&path);
            let result = self
                .finalize(cancel, &path, node, &staging, &mut state, child_finals)
                .await;

            if !self.keep_staging {
                self.staging.cleanup_logged(&staging).await;
            }

            match &result {
                Ok(_) => {
                    advance(&path, &mut state, SpliceState::Finalized);
                    metrics::NODES_TOTAL
                        .with_label_values(&["splice", "success"])
                        .inc();
                    report.nodes.push(NodeOutcome {
                        path,
                        state,
                        error: None,
                    });
                }
                Err(e) => {
                    advance(&path, &mut state, SpliceState::Failed);
                    metrics::NODES_TOTAL
                        .with_label_values(&[e.stage(), "failed"])
                        .inc();
                    warn!(node = %path, error = %e, "Node failed");
                    report.nodes.push(NodeOutcome {
                        path,
                        state,
                        error: Some(e.to_string()),
                    });
                }
            }
            result
        }
        .boxed()
    }

    async fn finalize(
        &self,
        cancel: &CancelToken,
        path: &NodePath,
        node: &ContentNode,
        staging: &NodeStaging,
        state: &mut SpliceState,
        child_finals: Vec<PathBuf>,
    ) -> Result<PathBuf, SpliceError> {
        let clips = self.source.clips(cancel, path, node).await?;

        let assembly_error = |source: AssemblyError| SpliceError::Assembly {
            path: path.clone(),
            source,
        };
        self.staging
            .prepare(staging)
            .await
            .map_err(|e| assembly_error(e.into()))?;
        let own = self
            .assembler
            .assemble_node(cancel, staging, &clips)
            .await
            .map_err(assembly_error)?;
        drop(clips);
        advance(path, state, SpliceState::OwnAssembled);

        let ordered = self.order.arrange(own, child_finals);
        self.assembler
            .concat(
                cancel,
                &ordered,
                staging.final_manifest(),
                staging.final_artifact(),
            )
            .await
            .map_err(assembly_error)?;

        debug!(node = %path, inputs = ordered.len(), "Final artifact assembled");
        Ok(staging.final_artifact().to_path_buf())
    }
}

fn advance(path: &NodePath, state: &mut SpliceState, next: SpliceState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid splice transition {} -> {} for {}",
        state,
        next,
        path
    );
    *state = next;
}
