//! Request and payload types for the generator module.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::RenderKind;

/// The two generation roles fed from every unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorRole {
    Audio,
    Visual,
}

impl GeneratorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Visual => "visual",
        }
    }
}

impl fmt::Display for GeneratorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a back-end needs for one call.
///
/// Built fresh per unit, so generators hold no per-call state and can be
/// shared across concurrent calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Namespaced id of the node the unit belongs to.
    pub node_key: String,
    pub unit_index: usize,
    /// Text to narrate.
    pub text: String,
    /// Text shown on screen at this point of the node.
    pub revealed: String,
    pub render_kind: RenderKind,
    pub author: String,
    pub score: i64,
    pub title: Option<String>,
}

impl GenerationRequest {
    /// Payload the visual back-end pushes to the render server.
    pub fn render_payload(&self) -> RenderPayload {
        RenderPayload {
            kind: self.render_kind,
            author: self.author.clone(),
            score: self.score,
            title: self.title.clone(),
            text: self.text.clone(),
            revealed: self.revealed.clone(),
        }
    }
}

/// Data handed to the render page before each capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPayload {
    pub kind: RenderKind,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub revealed: String,
}
