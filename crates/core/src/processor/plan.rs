//! Splits a node into its ordered narratable units.

use crate::content::{sanitize_text, split_sentences, ContentNode, NodePath, RenderKind, TextUnit};

/// Builds the unit sequence for `node` placed at `path`.
///
/// A non-blank title on a root node becomes unit 0 (`post-title`); titles
/// below the root are ignored. Body sentences follow,
/// rendered as `post-body` on the root and `comment` below it. Each body unit
/// carries the body text revealed so far; line breaks of the source survive
/// in that accumulated text.
pub fn plan_units(path: &NodePath, node: &ContentNode) -> Vec<TextUnit> {
    let mut units = Vec::new();

    if let Some(title) = node.title_text().filter(|_| path.is_root()) {
        let title = sanitize_text(title).lines().collect::<Vec<_>>().join(" ");
        if !title.is_empty() {
            units.push(TextUnit {
                index: 0,
                text: title.clone(),
                render_kind: RenderKind::PostTitle,
                revealed: title,
            });
        }
    }

    let kind = RenderKind::for_body(path);
    let body = sanitize_text(&node.body);
    let mut revealed = String::new();

    for line in body.lines() {
        for (position, sentence) in split_sentences(line).into_iter().enumerate() {
            if !revealed.is_empty() {
                revealed.push(if position == 0 { '\n' } else { ' ' });
            }
            revealed.push_str(&sentence);
            units.push(TextUnit {
                index: units.len(),
                text: sentence,
                render_kind: kind,
                revealed: revealed.clone(),
            });
        }
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(units: &[TextUnit]) -> Vec<&str> {
        units.iter().map(|u| u.text.as_str()).collect()
    }

    #[test]
    fn test_root_with_title() {
        let node = ContentNode::new("p1", "One. Two.").with_title("Title");
        let units = plan_units(&NodePath::root("p1"), &node);

        assert_eq!(texts(&units), vec!["Title", "One.", "Two."]);
        assert_eq!(units[0].render_kind, RenderKind::PostTitle);
        assert_eq!(units[1].render_kind, RenderKind::PostBody);
        assert_eq!(units[2].render_kind, RenderKind::PostBody);
        let indexes: Vec<usize> = units.iter().map(|u| u.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn test_comment_kind_below_root() {
        let node = ContentNode::new("c1", "Reply one.");
        let units = plan_units(&NodePath::root("p1").child("c1"), &node);

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].render_kind, RenderKind::Comment);
        assert_eq!(units[0].index, 0);
    }

    #[test]
    fn test_title_below_root_is_ignored() {
        let node = ContentNode::new("c1", "Reply one.").with_title("Stray title");
        let units = plan_units(&NodePath::root("p1").child("c1"), &node);

        assert_eq!(texts(&units), vec!["Reply one."]);
        assert_eq!(units[0].render_kind, RenderKind::Comment);
        assert_eq!(units[0].index, 0);
    }

    #[test]
    fn test_blank_title_emits_no_unit() {
        let node = ContentNode::new("p1", "Body.").with_title("   ");
        let units = plan_units(&NodePath::root("p1"), &node);
        assert_eq!(texts(&units), vec!["Body."]);
    }

    #[test]
    fn test_revealed_accumulates() {
        let node = ContentNode::new("p1", "One. Two.\nThree.").with_title("Title");
        let units = plan_units(&NodePath::root("p1"), &node);

        assert_eq!(units[0].revealed, "Title");
        assert_eq!(units[1].revealed, "One.");
        assert_eq!(units[2].revealed, "One. Two.");
        assert_eq!(units[3].revealed, "One. Two.\nThree.");
    }

    #[test]
    fn test_markdown_only_body_yields_nothing() {
        let node = ContentNode::new("c1", "---\n\n   ");
        assert!(plan_units(&NodePath::root("c1"), &node).is_empty());
    }
}
