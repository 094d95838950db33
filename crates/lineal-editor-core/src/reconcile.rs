//! Keyed reconciliation of line nodes against the buffer.
//!
//! Line nodes are stamped with the `LineId` of the buffer line they render
//! and a hash of their rendered content:
//! - Nodes whose id is still in the buffer are kept, moved into position if
//!   needed, and re-rendered only when the hash changed or their text no
//!   longer matches the buffer
//! - Buffer lines without a node get a new node at the right position
//! - Nodes whose id is gone (or that carry no id) are removed
//!
//! The gutter is rebuilt afterwards from the measured line heights.

use std::collections::{HashMap, HashSet};

use crate::platform::{RenderSurface, SurfaceError};
use crate::render::{LineContext, LineRenderer, render_line};
use crate::text::{LineBuffer, LineId};
use crate::types::LogicalSelection;

/// What a reconciliation pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Existing nodes left untouched.
    pub kept: usize,
    /// Existing nodes whose content was replaced.
    pub updated: usize,
    pub created: usize,
    pub removed: usize,
}

impl ReconcileStats {
    /// Whether the pass changed any line node.
    pub fn is_noop(&self) -> bool {
        self.updated == 0 && self.created == 0 && self.removed == 0
    }
}

/// Bring the surface's line nodes in line with `buffer`.
pub fn reconcile_lines<S: RenderSurface + ?Sized>(
    surface: &mut S,
    buffer: &LineBuffer,
    renderer: Option<&dyn LineRenderer>,
    selection: Option<LogicalSelection>,
) -> Result<ReconcileStats, SurfaceError> {
    let mut stats = ReconcileStats::default();
    let live: HashSet<LineId> = buffer.lines().map(|(id, _)| id).collect();

    // Pool existing nodes by id. Unknown, missing and duplicate ids go.
    let mut pool: HashMap<LineId, S::Node> = HashMap::new();
    for node in surface.line_nodes() {
        match surface.line_id_of(&node) {
            Some(id) if live.contains(&id) && !pool.contains_key(&id) => {
                pool.insert(id, node);
            }
            _ => {
                surface.remove_line(&node)?;
                stats.removed += 1;
            }
        }
    }

    let mut cursor = surface.line_nodes().into_iter().next();

    for (index, (id, text)) in buffer.lines().enumerate() {
        let ctx = LineContext { index, selection };
        let content = render_line(renderer, text, &ctx);
        let hash = content.content_hash();

        match pool.remove(&id) {
            Some(node) => {
                if cursor.as_ref() == Some(&node) {
                    cursor = surface.next_line_node(&node);
                } else {
                    tracing::trace!(target: "lineal::reconcile", %id, index, "moving line node");
                    surface.move_line(&node, cursor.as_ref())?;
                }

                let unchanged = surface.content_hash_of(&node) == Some(hash)
                    && surface.line_text(&node).as_deref() == Some(content.plain_text().as_str());
                if unchanged {
                    stats.kept += 1;
                } else {
                    surface.update_line(&node, &content, hash)?;
                    stats.updated += 1;
                }
            }
            None => {
                surface.create_line(id, &content, hash, cursor.as_ref())?;
                stats.created += 1;
            }
        }
    }

    let heights: Vec<f64> = surface
        .line_nodes()
        .iter()
        .map(|node| surface.line_height(node))
        .collect();
    surface.rebuild_gutter(&heights)?;

    tracing::trace!(
        target: "lineal::reconcile",
        kept = stats.kept,
        updated = stats.updated,
        created = stats.created,
        removed = stats.removed,
        "reconciled lines"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::memory::MemoryDom;
    use crate::render::{LineContent, RenderNode};

    fn build(dom: &mut MemoryDom, buffer: &LineBuffer) -> ReconcileStats {
        reconcile_lines(dom, buffer, None, None).unwrap()
    }

    #[test]
    fn test_initial_build_creates_every_line() {
        let mut dom = MemoryDom::new();
        let buffer = LineBuffer::from_text("abc\n\ndef");
        let stats = build(&mut dom, &buffer);
        assert_eq!(stats.created, 3);
        insta::assert_snapshot!(dom.dump(), @r"
abc
<br>
def
");
    }

    #[test]
    fn test_second_build_is_a_noop() {
        let mut dom = MemoryDom::new();
        let buffer = LineBuffer::from_text("one\ntwo\nthree");
        build(&mut dom, &buffer);
        let before = dom.line_nodes();
        let stats = build(&mut dom, &buffer);
        assert!(stats.is_noop());
        assert_eq!(stats.kept, 3);
        assert_eq!(dom.line_nodes(), before);
        assert_eq!(dom.line_texts(), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_insert_keeps_existing_nodes() {
        let mut dom = MemoryDom::new();
        let mut buffer = LineBuffer::from_text("a\nb\nc");
        build(&mut dom, &buffer);
        let before = dom.line_nodes();

        buffer.new_line(0);
        let stats = build(&mut dom, &buffer);
        assert_eq!(
            stats,
            ReconcileStats {
                kept: 3,
                updated: 0,
                created: 1,
                removed: 0,
            }
        );
        let after = dom.line_nodes();
        assert_eq!(after.len(), 4);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[1]);
        assert_eq!(after[3], before[2]);
    }

    #[test]
    fn test_edit_and_remove() {
        let mut dom = MemoryDom::new();
        let mut buffer = LineBuffer::from_text("a\nb\nc");
        build(&mut dom, &buffer);

        buffer.insert_text(2, 1, "!");
        buffer.remove_line(0);
        let stats = build(&mut dom, &buffer);
        assert_eq!(
            stats,
            ReconcileStats {
                kept: 1,
                updated: 1,
                created: 0,
                removed: 1,
            }
        );
        assert_eq!(dom.line_texts(), vec!["b", "c!"]);
    }

    #[test]
    fn test_replaced_document_rebuilds_all() {
        let mut dom = MemoryDom::new();
        let mut buffer = LineBuffer::from_text("a\nb");
        build(&mut dom, &buffer);
        buffer.set_text("a\nb");
        let stats = build(&mut dom, &buffer);
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.created, 2);
    }

    #[test]
    fn test_duplicate_ids_are_dropped() {
        let mut dom = MemoryDom::new();
        let buffer = LineBuffer::from_text("x");
        let id = buffer.line_id(0).unwrap();
        let content = LineContent::from("x");
        let hash = content.content_hash();
        dom.create_line(id, &content, hash, None).unwrap();
        dom.create_line(id, &content, hash, None).unwrap();

        let stats = build(&mut dom, &buffer);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.kept, 1);
        assert_eq!(dom.line_texts(), vec!["x"]);
    }

    #[test]
    fn test_renderer_output_is_materialised() {
        let mut dom = MemoryDom::new();
        let buffer = LineBuffer::from_text("let x\n");
        let renderer = |text: &str, ctx: &LineContext| {
            if ctx.index == 0 {
                LineContent::Nodes(vec![
                    RenderNode::span(Some("kw"), &text[..3]),
                    RenderNode::text(&text[3..]),
                ])
            } else {
                LineContent::from(text)
            }
        };
        reconcile_lines(&mut dom, &buffer, Some(&renderer), None).unwrap();
        insta::assert_snapshot!(dom.dump(), @r#"
<span class="kw">let</span> x
<br>
"#);
    }

    #[test]
    fn test_gutter_follows_line_heights() {
        let config = EditorConfig {
            wrap: true,
            ..EditorConfig::default()
        };
        let mut dom = MemoryDom::with_config(&config).with_wrap_columns(4);
        let buffer = LineBuffer::from_text("abcdefghij\nab\n");
        build(&mut dom, &buffer);
        insta::assert_snapshot!(dom.gutter_dump(), @"1:48 2:16 3:16");

        dom.set_wrap(false).unwrap();
        build(&mut dom, &buffer);
        insta::assert_snapshot!(dom.gutter_dump(), @"1:16 2:16 3:16");
    }
}
