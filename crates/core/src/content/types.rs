//! Types for the content tree.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Separator between segments of a namespaced node id.
pub const PATH_SEPARATOR: char = '/';

/// Errors that can occur while loading content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Content directory could not be read.
    #[error("failed to read content directory {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A content file could not be read.
    #[error("failed to read content file {file}: {source}")]
    ReadFile {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// A content file is not a valid node tree.
    #[error("failed to parse content file {file}: {reason}")]
    Parse { file: String, reason: String },
}

/// One text-bearing element of the tree (a post or a reply).
///
/// Nodes are immutable once built. The pipeline never rewrites `id`;
/// nested identity is carried separately by [`NodePath`].
///
/// Files exported with `username`/`text`/`comments` field names load too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "username")]
    pub author: String,
    #[serde(default)]
    pub score: i64,
    /// Only meaningful on root-level nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, alias = "text")]
    pub body: String,
    /// Presentation order.
    #[serde(default, alias = "comments", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Creates a node with the given id and body and no children.
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: String::new(),
            score: 0,
            title: None,
            body: body.into(),
            children: Vec::new(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets author and score.
    pub fn with_author(mut self, author: impl Into<String>, score: i64) -> Self {
        self.author = author.into();
        self.score = score;
        self
    }

    /// Appends a child.
    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Title, if present and not blank.
    pub fn title_text(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(ContentNode::subtree_len).sum::<usize>()
    }
}

/// Fully-qualified identity of a node: its id prefixed by every ancestor id.
///
/// A path is derived purely from the tree shape, so descending the same tree
/// twice always yields the same paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// Path of a root-level node.
    pub fn root(id: &str) -> Self {
        Self {
            segments: vec![Self::sanitize_segment(id)],
        }
    }

    /// Path of a child of the node at `self`.
    pub fn child(&self, id: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Self::sanitize_segment(id));
        Self { segments }
    }

    /// Paths of `children` of the node at `self`, in presentation order.
    ///
    /// Siblings whose ids sanitize to the same segment still get distinct
    /// paths: the first keeps the plain segment, later ones take a `~{n}`
    /// suffix.
    pub fn children(&self, children: &[ContentNode]) -> Vec<NodePath> {
        let mut taken = HashSet::with_capacity(children.len());
        children
            .iter()
            .map(|child| {
                let segment = Self::sanitize_segment(&child.id);
                let mut candidate = segment.clone();
                let mut n = 0;
                while !taken.insert(candidate.clone()) {
                    n += 1;
                    candidate = format!("{}~{}", segment, n);
                }
                if n > 0 {
                    warn!(
                        parent = %self,
                        id = %child.id,
                        segment = %candidate,
                        "Duplicate sibling id"
                    );
                }
                let mut segments = self.segments.clone();
                segments.push(candidate);
                Self { segments }
            })
            .collect()
    }

    /// Whether this path names a root-level node.
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Nesting depth; roots are at depth 0.
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    /// Id of the root this path descends from.
    pub fn root_id(&self) -> &str {
        &self.segments[0]
    }

    /// The node's own (sanitized) id.
    pub fn leaf_id(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Path segments from root to leaf.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The joined key, e.g. `p1/c1`.
    pub fn key(&self) -> String {
        self.segments.join(&PATH_SEPARATOR.to_string())
    }

    /// Makes an id usable as a single path component.
    fn sanitize_segment(id: &str) -> String {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return "_".to_string();
        }
        let mut out: String = trimmed
            .chars()
            .map(|c| match c {
                '/' | '\\' | '\0' => '_',
                c => c,
            })
            .collect();
        if out.starts_with('.') {
            out.replace_range(0..1, "_");
        }
        out
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Selects which view template the visual back-end renders a unit with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderKind {
    PostTitle,
    PostBody,
    Comment,
}

impl RenderKind {
    /// Kind for a body unit of the node at `path`.
    pub fn for_body(path: &NodePath) -> Self {
        if path.is_root() {
            Self::PostBody
        } else {
            Self::Comment
        }
    }

    /// Wire name, e.g. `post-title`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostTitle => "post-title",
            Self::PostBody => "post-body",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RenderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post-title" => Ok(Self::PostTitle),
            "post-body" => Ok(Self::PostBody),
            "comment" => Ok(Self::Comment),
            other => Err(format!("unknown render kind: {}", other)),
        }
    }
}

/// A single narratable sentence or line of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// 0-based position within the node; also the staging file stem.
    pub index: usize,
    pub text: String,
    pub render_kind: RenderKind,
    /// Text revealed on screen once this unit is read.
    pub revealed: String,
}
