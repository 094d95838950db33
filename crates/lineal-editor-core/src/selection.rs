//! Selection tracking and the generic `SelectionPort` plumbing.
//!
//! `read_selection` and `write_selection` are the only places that translate
//! between native points and logical tuples. Surfaces implement
//! `SelectionPort` by delegating to them.

use crate::config::FocusLine;
use crate::mapper::{column_at, line_index, owning_line, position_at};
use crate::platform::{NativeSelection, ScrollMetrics, SurfaceError};
use crate::types::{DomPoint, LogicalSelection};

/// Caches the last observed logical selection.
#[derive(Clone, Debug, Default)]
pub struct SelectionTracker {
    current: Option<LogicalSelection>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached tuple. Never recomputed from the surface.
    pub fn get(&self) -> Option<LogicalSelection> {
        self.current
    }

    /// Record `selection`. Returns `true` only if it differs from the cache.
    pub fn observe(&mut self, selection: LogicalSelection) -> bool {
        if self.current == Some(selection) {
            return false;
        }
        self.current = Some(selection);
        true
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Resolve a native point to its line node, treating a point on the root
/// as "before line `offset`".
fn resolve_line<T: NativeSelection + ?Sized>(tree: &T, point: &DomPoint<T::Node>) -> Option<T::Node> {
    if tree.is_root(&point.node) {
        return tree
            .line_node(point.offset)
            .or_else(|| point.offset.checked_sub(1).and_then(|i| tree.line_node(i)));
    }
    owning_line(tree, &point.node)
}

/// Derive the logical selection from the surface's native selection.
///
/// The start comes from the anchor, the end column from the focus. The end
/// line follows [`NativeSelection::focus_line`]: with `FocusLine::Anchor`
/// the focus is measured against the anchor's line.
pub fn read_selection<T: NativeSelection + ?Sized>(tree: &T) -> Option<LogicalSelection> {
    let (anchor, focus) = tree.native_points()?;
    let anchor_line = resolve_line(tree, &anchor)?;
    let start_line = line_index(tree, &anchor_line);
    let start_col = column_at(tree, &anchor_line, &anchor.node, anchor.offset);

    let end_line_node = match tree.focus_line() {
        FocusLine::Anchor => anchor_line,
        FocusLine::Focus => resolve_line(tree, &focus).unwrap_or(anchor_line),
    };
    let end_line = line_index(tree, &end_line_node);
    let end_col = column_at(tree, &end_line_node, &focus.node, focus.offset);

    Some(LogicalSelection {
        start_line,
        start_col,
        end_line,
        end_col,
    })
}

/// Place the native selection at `selection`.
///
/// A start line that no longer exists leaves the native selection alone.
/// An unmappable start column falls back to the start of the line, and the
/// end is then dropped. The end is also dropped when collapsed or unmappable.
pub fn write_selection<T: NativeSelection + ?Sized>(
    tree: &mut T,
    selection: &LogicalSelection,
) -> Result<(), SurfaceError> {
    let Some(start_line) = tree.line_node(selection.start_line) else {
        tracing::warn!(
            target: "lineal::selection",
            line = selection.start_line,
            "no line node for selection, leaving native selection"
        );
        return Ok(());
    };

    let (start, end) = match position_at(&*tree, &start_line, selection.start_col) {
        Some(start) => {
            let end = if selection.is_collapsed() {
                None
            } else {
                tree.line_node(selection.end_line)
                    .and_then(|line| position_at(&*tree, &line, selection.end_col))
            };
            (start, end)
        }
        None => {
            tracing::trace!(
                target: "lineal::selection",
                line = selection.start_line,
                col = selection.start_col,
                "start unmappable, selecting line start"
            );
            (DomPoint::new(start_line, 0), None)
        }
    };

    tree.select_points(start, end)?;

    if let Some(left) = tree.scroll_metrics().and_then(|m| horizontal_scroll_target(&m)) {
        tracing::trace!(target: "lineal::selection", left, "scrolling caret into view");
        tree.set_scroll_left(left);
    }
    Ok(())
}

/// New `scroll_left` needed to bring the caret into view, if it is clipped.
pub fn horizontal_scroll_target(metrics: &ScrollMetrics) -> Option<f64> {
    if metrics.caret_x > metrics.scroll_left + metrics.viewport_width {
        Some(metrics.caret_x - metrics.viewport_width)
    } else if metrics.caret_x < metrics.scroll_left {
        Some(metrics.caret_x)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::memory::MemoryDom;
    use crate::platform::{RenderSurface, SelectionPort};
    use crate::render::{LineContent, RenderNode};
    use crate::text::LineId;

    fn dom(lines: &[&str], config: &EditorConfig) -> MemoryDom {
        let mut dom = MemoryDom::with_config(config);
        for (i, text) in lines.iter().enumerate() {
            let content = LineContent::from(*text);
            let hash = content.content_hash();
            dom.create_line(LineId::from_raw(i as u64), &content, hash, None)
                .unwrap();
        }
        dom
    }

    #[test]
    fn test_tracker_deduplicates() {
        let mut tracker = SelectionTracker::new();
        assert!(tracker.observe(LogicalSelection::caret(0, 1)));
        assert!(!tracker.observe(LogicalSelection::caret(0, 1)));
        assert!(tracker.observe(LogicalSelection::caret(0, 2)));
        assert_eq!(tracker.get(), Some(LogicalSelection::caret(0, 2)));
    }

    #[test]
    fn test_write_then_read_every_position() {
        let mut dom = dom(&["abc", "", "héllo"], &EditorConfig::default());
        for (line, len) in [(0, 3), (1, 0), (2, 5)] {
            for col in 0..=len {
                let caret = LogicalSelection::caret(line, col);
                dom.write(&caret).unwrap();
                assert_eq!(dom.read(), Some(caret));
            }
        }
    }

    #[test]
    fn test_unmappable_start_falls_back_to_line_start() {
        let mut dom = dom(&["abc"], &EditorConfig::default());
        dom.write(&LogicalSelection::caret(0, 10)).unwrap();
        assert_eq!(dom.read(), Some(LogicalSelection::caret(0, 0)));
    }

    #[test]
    fn test_missing_line_leaves_selection() {
        let mut dom = dom(&["abc"], &EditorConfig::default());
        dom.write(&LogicalSelection::caret(0, 2)).unwrap();
        dom.write(&LogicalSelection::caret(3, 0)).unwrap();
        assert_eq!(dom.read(), Some(LogicalSelection::caret(0, 2)));

        let mut empty = MemoryDom::new();
        empty.write(&LogicalSelection::caret(0, 0)).unwrap();
        assert_eq!(empty.read(), None);
    }

    #[test]
    fn test_range_within_line() {
        let mut dom = dom(&["abcdef"], &EditorConfig::default());
        let range = LogicalSelection {
            start_line: 0,
            start_col: 1,
            end_line: 0,
            end_col: 4,
        };
        dom.write(&range).unwrap();
        assert_eq!(dom.read(), Some(range));
    }

    #[test]
    fn test_multi_line_end_uses_anchor_line_by_default() {
        // The end line is resolved against the anchor's line, so a focus on
        // another line reads back as column 0 of the start line.
        let mut dom = dom(&["abc", "def", "ghi"], &EditorConfig::default());
        let range = LogicalSelection {
            start_line: 0,
            start_col: 1,
            end_line: 2,
            end_col: 2,
        };
        dom.write(&range).unwrap();
        assert_eq!(
            dom.read(),
            Some(LogicalSelection {
                start_line: 0,
                start_col: 1,
                end_line: 0,
                end_col: 0,
            })
        );
    }

    #[test]
    fn test_multi_line_end_with_focus_lookup() {
        let config = EditorConfig {
            focus_line: FocusLine::Focus,
            ..EditorConfig::default()
        };
        let mut dom = dom(&["abc", "def", "ghi"], &config);
        let range = LogicalSelection {
            start_line: 0,
            start_col: 1,
            end_line: 2,
            end_col: 2,
        };
        dom.write(&range).unwrap();
        assert_eq!(dom.read(), Some(range));
    }

    #[test]
    fn test_point_on_root_maps_to_line_start() {
        let mut dom = dom(&["abc", "def"], &EditorConfig::default());
        let root = dom.root();
        dom.set_native_selection(DomPoint::new(root, 1), DomPoint::new(root, 1));
        assert_eq!(dom.read(), Some(LogicalSelection::caret(1, 0)));
    }

    #[test]
    fn test_selection_skips_widget() {
        let mut dom = MemoryDom::new();
        let content = LineContent::Nodes(vec![
            RenderNode::text("ab"),
            RenderNode::widget("i", Some("hint"), "xyz"),
            RenderNode::text("cd"),
        ]);
        let hash = content.content_hash();
        dom.create_line(LineId::from_raw(0), &content, hash, None)
            .unwrap();
        dom.write(&LogicalSelection::caret(0, 3)).unwrap();
        assert_eq!(dom.read(), Some(LogicalSelection::caret(0, 3)));
    }

    #[test]
    fn test_horizontal_scroll_target() {
        let visible = ScrollMetrics {
            caret_x: 50.0,
            scroll_left: 0.0,
            viewport_width: 100.0,
        };
        assert_eq!(horizontal_scroll_target(&visible), None);

        let right = ScrollMetrics {
            caret_x: 250.0,
            ..visible
        };
        assert_eq!(horizontal_scroll_target(&right), Some(150.0));

        let left = ScrollMetrics {
            caret_x: 20.0,
            scroll_left: 80.0,
            viewport_width: 100.0,
        };
        assert_eq!(horizontal_scroll_target(&left), Some(20.0));
    }

    #[test]
    fn test_write_scrolls_clipped_caret() {
        let mut dom = dom(&["abcdefghijklmnopqrstuvwxyz"], &EditorConfig::default())
            .with_viewport(100.0, 10.0);
        dom.write(&LogicalSelection::caret(0, 20)).unwrap();
        assert_eq!(dom.scroll_left(), 100.0);
        dom.write(&LogicalSelection::caret(0, 2)).unwrap();
        assert_eq!(dom.scroll_left(), 20.0);
    }
}
