//! DOM position ↔ logical column conversion.
//!
//! Both directions walk the direct children of a line node in order. Text
//! nodes and inline elements carry editable text; everything else (breaks,
//! widgets) is skipped and contributes no columns.

use crate::platform::{DomTree, NodeKind};
use crate::types::DomPoint;

/// Walk up from `node` to the line node that owns it.
///
/// Returns `None` when the walk reaches the editor root or leaves the tree
/// (a node outside the editor, or a detached one).
pub fn owning_line<T: DomTree + ?Sized>(tree: &T, node: &T::Node) -> Option<T::Node> {
    let mut current = node.clone();
    loop {
        if tree.is_line(&current) {
            return Some(current);
        }
        if tree.is_root(&current) {
            return None;
        }
        current = tree.parent(&current)?;
    }
}

/// Index of a line node, counted as previous line-node siblings.
pub fn line_index<T: DomTree + ?Sized>(tree: &T, line: &T::Node) -> usize {
    let mut index = 0;
    let mut current = tree.previous_sibling(line);
    while let Some(node) = current {
        if tree.is_line(&node) {
            index += 1;
        }
        current = tree.previous_sibling(&node);
    }
    index
}

/// Column of the native point `(target, offset)` within `line`.
///
/// Returns 0 when `target` is not inside any content-bearing child, which
/// includes a point on the line node itself.
pub fn column_at<T: DomTree + ?Sized>(
    tree: &T,
    line: &T::Node,
    target: &T::Node,
    offset: usize,
) -> usize {
    let mut pos = 0;
    for child in tree.children(line) {
        if tree.kind(&child) == NodeKind::Other {
            continue;
        }
        if child == *target || tree.contains(&child, target) {
            let column = pos + tree.to_char_offset(target, offset);
            tracing::trace!(target: "lineal::mapper", pos, offset, column, "column_at");
            return column;
        }
        pos += tree.text_len(&child);
    }
    tracing::trace!(target: "lineal::mapper", offset, "column_at: target not in line");
    0
}

/// Native point for column `col` of `line`.
///
/// Ties at a child boundary resolve to the end of the earlier child. Returns
/// `None` when `col` is past the line's editable content; callers fall back
/// to the start of the line.
pub fn position_at<T: DomTree + ?Sized>(
    tree: &T,
    line: &T::Node,
    col: usize,
) -> Option<DomPoint<T::Node>> {
    let mut remaining = col;
    for child in tree.children(line) {
        let text_node = match tree.kind(&child) {
            NodeKind::Text => child,
            NodeKind::Inline => match tree.first_child(&child) {
                Some(inner) => inner,
                None => continue,
            },
            NodeKind::Other => continue,
        };
        let len = tree.text_len(&text_node);
        if remaining > len {
            remaining -= len;
            continue;
        }
        let offset = tree.to_dom_offset(&text_node, remaining);
        return Some(DomPoint::new(text_node, offset));
    }
    tracing::trace!(target: "lineal::mapper", col, "position_at: column past content");
    None
}
