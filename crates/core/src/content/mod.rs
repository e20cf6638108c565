//! Content tree model and text preparation.
//!
//! A [`ContentNode`] tree is what the pipeline narrates: a root post and
//! its nested replies. Node identity inside the tree is carried by
//! [`NodePath`], built from ancestor ids during descent, never by mutating
//! the node itself.
//!
//! Text preparation happens in two steps:
//! - [`sanitize_text`]: decode HTML entities and strip markdown
//! - [`split_sentences`]: cut the sanitized text into narration units

mod loader;
mod sanitize;
mod tokenize;
mod types;

pub use loader::{load_directory, load_file};
pub use sanitize::{decode_entities, sanitize_text, strip_markdown};
pub use tokenize::split_sentences;
pub use types::{ContentError, ContentNode, NodePath, RenderKind, TextUnit, PATH_SEPARATOR};
