//! Types for the splicer module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::content::NodePath;

/// Order of the inputs of a node's final artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcatOrder {
    /// Own artifact, then each child's final artifact in child order.
    #[default]
    OwnFirst,
    /// The `OwnFirst` list reversed: children last-to-first, own artifact last.
    Reversed,
}

impl ConcatOrder {
    pub fn arrange(&self, own: PathBuf, children: Vec<PathBuf>) -> Vec<PathBuf> {
        let mut ordered = Vec::with_capacity(children.len() + 1);
        ordered.push(own);
        ordered.extend(children);
        if *self == Self::Reversed {
            ordered.reverse();
        }
        ordered
    }
}

/// Progress of a single node through splicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpliceState {
    Pending,
    ChildrenDone,
    OwnAssembled,
    Finalized,
    Failed,
}

impl SpliceState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }

    /// Whether moving from `self` to `next` follows the node lifecycle.
    pub fn can_transition_to(&self, next: SpliceState) -> bool {
        use SpliceState::*;
        matches!(
            (self, next),
            (Pending, ChildrenDone)
                | (ChildrenDone, OwnAssembled)
                | (OwnAssembled, Finalized)
                | (Pending | ChildrenDone | OwnAssembled, Failed)
        )
    }
}

impl fmt::Display for SpliceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::ChildrenDone => "children_done",
            Self::OwnAssembled => "own_assembled",
            Self::Finalized => "finalized",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Terminal record of one visited node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeOutcome {
    pub path: NodePath,
    pub state: SpliceState,
    /// Failure reason when `state` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of splicing one tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpliceReport {
    /// Visited nodes in post-order (children before parents).
    pub nodes: Vec<NodeOutcome>,
    /// Final artifact of the root, still in staging.
    pub final_artifact: Option<PathBuf>,
}

impl SpliceReport {
    pub fn state_of(&self, path: &NodePath) -> Option<SpliceState> {
        self.nodes.iter().find(|n| &n.path == path).map(|n| n.state)
    }

    /// Failed nodes with their reasons, in post-order.
    pub fn failed(&self) -> Vec<(NodePath, String)> {
        self.nodes
            .iter()
            .filter(|n| n.state == SpliceState::Failed)
            .map(|n| (n.path.clone(), n.error.clone().unwrap_or_default()))
            .collect()
    }

    pub fn finalized_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.state == SpliceState::Finalized)
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.final_artifact.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_own_first_order() {
        let ordered = ConcatOrder::OwnFirst.arrange(PathBuf::from("O"), paths(&["A", "B"]));
        assert_eq!(ordered, paths(&["O", "A", "B"]));
    }

    #[test]
    fn test_reversed_order() {
        let ordered = ConcatOrder::Reversed.arrange(PathBuf::from("O"), paths(&["A", "B"]));
        assert_eq!(ordered, paths(&["B", "A", "O"]));
    }

    #[test]
    fn test_default_is_own_first() {
        assert_eq!(ConcatOrder::default(), ConcatOrder::OwnFirst);
        let order: ConcatOrder = serde_json::from_str("\"reversed\"").unwrap();
        assert_eq!(order, ConcatOrder::Reversed);
    }

    #[test]
    fn test_state_transitions() {
        use SpliceState::*;
        assert!(Pending.can_transition_to(ChildrenDone));
        assert!(ChildrenDone.can_transition_to(OwnAssembled));
        assert!(OwnAssembled.can_transition_to(Finalized));
        assert!(ChildrenDone.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Finalized));
        assert!(!Finalized.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Pending));
        assert!(Finalized.is_terminal());
        assert!(!OwnAssembled.is_terminal());
    }
}
