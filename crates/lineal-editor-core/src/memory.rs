//! In-memory editing surface.
//!
//! `MemoryDom` is a small arena-backed node tree that implements every
//! surface trait. It lets the editor run headless: reconciliation, coordinate
//! mapping and selection all go through the same generic code paths as in a
//! browser. Offsets are chars, so no UTF-16 conversion happens here.

use smol_str::SmolStr;

use crate::config::{EditorConfig, FocusLine};
use crate::mapper::{column_at, owning_line};
use crate::platform::{
    DomTree, NativeSelection, NodeKind, RenderSurface, ScrollMetrics, SelectionPort, SurfaceError,
};
use crate::render::{LineContent, RenderNode};
use crate::selection::{read_selection, write_selection};
use crate::text::LineId;
use crate::types::{DomPoint, LogicalSelection};

/// Height of one unwrapped line, in pixels.
pub const LINE_HEIGHT: f64 = 16.0;

/// Handle to a node in a `MemoryDom`.
///
/// Nodes dropped by re-rendering or line removal are released and their
/// slots reused, so a handle must not outlive the node it names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
enum NodeData {
    Free,
    Root,
    Line { id: LineId, hash: u64 },
    Text(String),
    Element {
        tag: SmolStr,
        class: Option<SmolStr>,
        editable: bool,
    },
}

#[derive(Clone, Debug)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// One numbered gutter entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GutterEntry {
    pub number: usize,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Viewport {
    width: f64,
    char_width: f64,
    scroll_left: f64,
}

/// Arena-backed node tree with a selection, gutter and optional viewport.
#[derive(Clone, Debug)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: NodeId,
    gutter: Vec<GutterEntry>,
    wrap: bool,
    wrap_columns: Option<usize>,
    focus_line: FocusLine,
    selection: Option<(DomPoint<NodeId>, DomPoint<NodeId>)>,
    viewport: Option<Viewport>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
            }],
            free: Vec::new(),
            root: NodeId(0),
            gutter: Vec::new(),
            wrap: false,
            wrap_columns: None,
            focus_line: FocusLine::default(),
            selection: None,
            viewport: None,
        }
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            wrap: config.wrap,
            focus_line: config.focus_line,
            ..Self::new()
        }
    }

    /// Simulate soft wrapping at `columns` chars per visual row.
    pub fn with_wrap_columns(mut self, columns: usize) -> Self {
        self.wrap_columns = Some(columns.max(1));
        self
    }

    /// Give the surface a horizontal viewport so caret scrolling applies.
    pub fn with_viewport(mut self, width: f64, char_width: f64) -> Self {
        self.viewport = Some(Viewport {
            width,
            char_width,
            scroll_left: 0.0,
        });
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrap
    }

    pub fn scroll_left(&self) -> f64 {
        self.viewport.map_or(0.0, |v| v.scroll_left)
    }

    /// Gutter as `number:height` pairs, for snapshots.
    pub fn gutter_dump(&self) -> String {
        self.gutter
            .iter()
            .map(|e| format!("{}:{}", e.number, e.height))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Editable text of each line node, widgets excluded.
    pub fn line_texts(&self) -> Vec<String> {
        self.node(self.root)
            .children
            .iter()
            .map(|&line| self.editable_text(line))
            .collect()
    }

    /// One line per line node, with elements written as markup.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, &line) in self.node(self.root).children.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for &child in &self.node(line).children {
                self.dump_node(child, &mut out);
            }
        }
        out
    }

    /// Number of arena slots, live or free.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes currently in use, detached ones included.
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Set the native selection directly, as a user gesture would.
    pub fn set_native_selection(&mut self, anchor: DomPoint<NodeId>, focus: DomPoint<NodeId>) {
        self.selection = Some((anchor, focus));
    }

    pub fn clear_native_selection(&mut self) {
        self.selection = None;
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Free `id` and its whole subtree. The caller detaches it first.
    ///
    /// A native selection inside the subtree is dropped, the way a browser
    /// collapses a range whose nodes leave the document.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.0];
            stack.append(&mut node.children);
            node.parent = None;
            node.data = NodeData::Free;
            self.free.push(id);
        }
        let stale = self.selection.as_ref().is_some_and(|(anchor, focus)| {
            self.is_free(anchor.node) || self.is_free(focus.node)
        });
        if stale {
            tracing::trace!(target: "lineal::memory", "selection nodes released");
            self.selection = None;
        }
    }

    fn is_free(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0).map(|n| &n.data), None | Some(NodeData::Free))
    }

    fn is_attached_line(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.parent == Some(self.root))
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn insert_line_before(&mut self, line: NodeId, before: Option<&NodeId>) -> Result<(), SurfaceError> {
        let index = match before {
            Some(&before) => self
                .node(self.root)
                .children
                .iter()
                .position(|&c| c == before)
                .ok_or_else(|| SurfaceError(format!("{before:?} is not a line node")))?,
            None => self.node(self.root).children.len(),
        };
        self.nodes[line.0].parent = Some(self.root);
        let root = self.root;
        self.nodes[root.0].children.insert(index, line);
        Ok(())
    }

    fn fill_line(&mut self, line: NodeId, content: &LineContent) {
        for child in std::mem::take(&mut self.nodes[line.0].children) {
            self.release(child);
        }
        for render_node in content.clone().into_nodes() {
            let child = match render_node {
                RenderNode::Text { text } => self.alloc(NodeData::Text(text)),
                RenderNode::Span { class, text } => {
                    let span = self.alloc(NodeData::Element {
                        tag: SmolStr::new_static("span"),
                        class,
                        editable: true,
                    });
                    let inner = self.alloc(NodeData::Text(text));
                    self.append(span, inner);
                    span
                }
                RenderNode::Break => self.alloc(NodeData::Element {
                    tag: SmolStr::new_static("br"),
                    class: None,
                    editable: false,
                }),
                RenderNode::Widget { tag, class, text } => {
                    let widget = self.alloc(NodeData::Element {
                        tag,
                        class,
                        editable: false,
                    });
                    if !text.is_empty() {
                        let inner = self.alloc(NodeData::Text(text));
                        self.append(widget, inner);
                    }
                    widget
                }
            };
            self.append(line, child);
        }
    }

    fn editable_text(&self, id: NodeId) -> String {
        let node = self.node(id);
        match &node.data {
            NodeData::Text(text) => text.clone(),
            NodeData::Element { editable: false, .. } => String::new(),
            _ => node.children.iter().map(|&c| self.editable_text(c)).collect(),
        }
    }

    fn dump_node(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { tag, class, .. } => {
                out.push('<');
                out.push_str(tag);
                if let Some(class) = class {
                    out.push_str(&format!(" class=\"{class}\""));
                }
                out.push('>');
                if tag.as_str() != "br" {
                    for &child in &node.children {
                        self.dump_node(child, out);
                    }
                    out.push_str(&format!("</{tag}>"));
                }
            }
            NodeData::Free | NodeData::Root | NodeData::Line { .. } => {
                for &child in &node.children {
                    self.dump_node(child, out);
                }
            }
        }
    }
}

impl DomTree for MemoryDom {
    type Node = NodeId;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn previous_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.node(parent).children;
        let index = siblings.iter().position(|c| c == node)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn kind(&self, node: &NodeId) -> NodeKind {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Text(_)) => NodeKind::Text,
            Some(NodeData::Element { editable: true, .. }) => NodeKind::Inline,
            _ => NodeKind::Other,
        }
    }

    fn text_len(&self, node: &NodeId) -> usize {
        match self.nodes.get(node.0) {
            Some(Node {
                data: NodeData::Text(text),
                ..
            }) => text.chars().count(),
            Some(n) => n.children.iter().map(|c| self.text_len(c)).sum(),
            None => 0,
        }
    }

    fn contains(&self, node: &NodeId, descendant: &NodeId) -> bool {
        let mut current = Some(*descendant);
        while let Some(id) = current {
            if id == *node {
                return true;
            }
            current = self.parent(&id);
        }
        false
    }

    fn is_line(&self, node: &NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| {
            matches!(n.data, NodeData::Line { .. }) && n.parent == Some(self.root)
        })
    }

    fn is_root(&self, node: &NodeId) -> bool {
        *node == self.root
    }

    /// Element offsets are child indices; count the editable text before them.
    fn to_char_offset(&self, node: &NodeId, offset: usize) -> usize {
        match self.kind(node) {
            NodeKind::Text => offset,
            _ => self
                .children(node)
                .iter()
                .take(offset)
                .filter(|c| self.kind(c) != NodeKind::Other)
                .map(|c| self.text_len(c))
                .sum(),
        }
    }
}

impl RenderSurface for MemoryDom {
    fn line_nodes(&self) -> Vec<NodeId> {
        self.node(self.root).children.clone()
    }

    fn next_line_node(&self, node: &NodeId) -> Option<NodeId> {
        let lines = &self.node(self.root).children;
        let index = lines.iter().position(|c| c == node)?;
        lines.get(index + 1).copied()
    }

    fn line_id_of(&self, node: &NodeId) -> Option<LineId> {
        match self.nodes.get(node.0)?.data {
            NodeData::Line { id, .. } => Some(id),
            _ => None,
        }
    }

    fn content_hash_of(&self, node: &NodeId) -> Option<u64> {
        match self.nodes.get(node.0)?.data {
            NodeData::Line { hash, .. } => Some(hash),
            _ => None,
        }
    }

    fn create_line(
        &mut self,
        id: LineId,
        content: &LineContent,
        hash: u64,
        before: Option<&NodeId>,
    ) -> Result<NodeId, SurfaceError> {
        let line = self.alloc(NodeData::Line { id, hash });
        self.fill_line(line, content);
        self.insert_line_before(line, before)?;
        Ok(line)
    }

    fn move_line(&mut self, node: &NodeId, before: Option<&NodeId>) -> Result<(), SurfaceError> {
        if !self.is_attached_line(*node) {
            return Err(SurfaceError(format!("{node:?} is not a line node")));
        }
        self.detach(*node);
        self.insert_line_before(*node, before)
    }

    fn update_line(
        &mut self,
        node: &NodeId,
        content: &LineContent,
        hash: u64,
    ) -> Result<(), SurfaceError> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.data) {
            Some(NodeData::Line { hash: stamped, .. }) => *stamped = hash,
            _ => return Err(SurfaceError(format!("{node:?} is not a line node"))),
        }
        self.fill_line(*node, content);
        Ok(())
    }

    fn remove_line(&mut self, node: &NodeId) -> Result<(), SurfaceError> {
        if !self.is_attached_line(*node) {
            return Err(SurfaceError(format!("{node:?} is not a line node")));
        }
        self.detach(*node);
        self.release(*node);
        Ok(())
    }

    fn line_text(&self, node: &NodeId) -> Option<String> {
        match self.nodes.get(node.0)?.data {
            NodeData::Line { .. } => Some(self.editable_text(*node)),
            _ => None,
        }
    }

    fn line_height(&self, node: &NodeId) -> f64 {
        let rows = match (self.wrap, self.wrap_columns) {
            (true, Some(columns)) => self.text_len(node).div_ceil(columns).max(1),
            _ => 1,
        };
        LINE_HEIGHT * rows as f64
    }

    fn rebuild_gutter(&mut self, heights: &[f64]) -> Result<(), SurfaceError> {
        self.gutter = heights
            .iter()
            .enumerate()
            .map(|(i, &height)| GutterEntry {
                number: i + 1,
                height,
            })
            .collect();
        Ok(())
    }

    fn set_wrap(&mut self, wrap: bool) -> Result<(), SurfaceError> {
        self.wrap = wrap;
        Ok(())
    }
}

impl NativeSelection for MemoryDom {
    fn line_node(&self, index: usize) -> Option<NodeId> {
        self.node(self.root).children.get(index).copied()
    }

    fn native_points(&self) -> Option<(DomPoint<NodeId>, DomPoint<NodeId>)> {
        self.selection.clone()
    }

    fn select_points(
        &mut self,
        start: DomPoint<NodeId>,
        end: Option<DomPoint<NodeId>>,
    ) -> Result<(), SurfaceError> {
        if self.is_free(start.node) {
            return Err(SurfaceError(format!("{:?} does not exist", start.node)));
        }
        let end = end.unwrap_or_else(|| start.clone());
        self.selection = Some((start, end));
        Ok(())
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        let viewport = self.viewport?;
        let (_, focus) = self.selection.as_ref()?;
        let line = owning_line(self, &focus.node)?;
        let col = column_at(self, &line, &focus.node, focus.offset);
        Some(ScrollMetrics {
            caret_x: col as f64 * viewport.char_width,
            scroll_left: viewport.scroll_left,
            viewport_width: viewport.width,
        })
    }

    fn set_scroll_left(&mut self, left: f64) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.scroll_left = left.max(0.0);
        }
    }

    fn focus_line(&self) -> FocusLine {
        self.focus_line
    }
}

impl SelectionPort for MemoryDom {
    fn read(&self) -> Option<LogicalSelection> {
        read_selection(self)
    }

    fn write(&mut self, selection: &LogicalSelection) -> Result<(), SurfaceError> {
        write_selection(self, selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile_lines;
    use crate::text::LineBuffer;

    #[test]
    fn test_widget_text_is_not_editable() {
        let mut dom = MemoryDom::new();
        let content = LineContent::Nodes(vec![
            RenderNode::text("ab"),
            RenderNode::widget("div", Some("line-warning"), "careful"),
        ]);
        dom.create_line(LineId::from_raw(0), &content, 0, None)
            .unwrap();
        assert_eq!(dom.line_texts(), vec!["ab"]);
        assert_eq!(dom.dump(), "ab<div class=\"line-warning\">careful</div>");
    }

    #[test]
    fn test_move_and_remove_require_attached_lines() {
        let mut dom = MemoryDom::new();
        let a = dom
            .create_line(LineId::from_raw(0), &LineContent::from("a"), 0, None)
            .unwrap();
        let b = dom
            .create_line(LineId::from_raw(1), &LineContent::from("b"), 0, None)
            .unwrap();
        dom.move_line(&b, Some(&a)).unwrap();
        assert_eq!(dom.line_texts(), vec!["b", "a"]);

        let a_text = dom.children(&a)[0];
        dom.remove_line(&a).unwrap();
        assert!(dom.remove_line(&a).is_err());
        assert!(dom.move_line(&a, None).is_err());
        // A released node is no longer part of any line.
        assert_eq!(owning_line(&dom, &a_text), None);
    }

    #[test]
    fn test_released_slots_are_reused() {
        let mut dom = MemoryDom::new();
        let content = LineContent::Nodes(vec![
            RenderNode::text("ab"),
            RenderNode::widget("i", Some("hint"), "..."),
        ]);
        let line = dom
            .create_line(LineId::from_raw(0), &content, 1, None)
            .unwrap();
        let arena = dom.arena_len();
        for hash in 2..50 {
            dom.update_line(&line, &content, hash).unwrap();
        }
        assert_eq!(dom.arena_len(), arena);

        dom.remove_line(&line).unwrap();
        assert_eq!(dom.live_nodes(), 1);
        dom.create_line(LineId::from_raw(1), &content, 1, None)
            .unwrap();
        assert_eq!(dom.arena_len(), arena);
    }

    #[test]
    fn test_selection_in_released_nodes_is_dropped() {
        let mut dom = MemoryDom::new();
        let line = dom
            .create_line(LineId::from_raw(0), &LineContent::from("abc"), 1, None)
            .unwrap();
        let text = dom.children(&line)[0];
        dom.set_native_selection(DomPoint::new(text, 1), DomPoint::new(text, 1));
        dom.update_line(&line, &LineContent::from("abcd"), 2).unwrap();
        assert_eq!(dom.native_points(), None);
    }

    #[test]
    fn test_natively_edited_line_is_repaired() {
        let mut dom = MemoryDom::new();
        let buffer = LineBuffer::from_text("abc
def");
        reconcile_lines(&mut dom, &buffer, None, None).unwrap();

        // Mutate a text node directly, as composition input would.
        let line = dom.line_nodes()[1];
        let text = dom.children(&line)[0];
        dom.nodes[text.0].data = NodeData::Text("dXef".into());
        assert_eq!(dom.line_texts(), vec!["abc", "dXef"]);

        let stats = reconcile_lines(&mut dom, &buffer, None, None).unwrap();
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.kept, 1);
        assert_eq!(dom.line_nodes()[1], line);
        assert_eq!(dom.line_texts(), vec!["abc", "def"]);
    }

    #[test]
    fn test_element_offset_counts_preceding_text() {
        let mut dom = MemoryDom::new();
        let content = LineContent::Nodes(vec![
            RenderNode::text("ab"),
            RenderNode::widget("i", None, "zz"),
            RenderNode::text("cd"),
        ]);
        let line = dom
            .create_line(LineId::from_raw(0), &content, 0, None)
            .unwrap();
        assert_eq!(dom.to_char_offset(&line, 0), 0);
        assert_eq!(dom.to_char_offset(&line, 2), 2);
        assert_eq!(dom.to_char_offset(&line, 3), 4);
    }
}
