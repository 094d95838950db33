//! Platform abstraction traits for the editing surface.
//!
//! The editor never touches a DOM directly. It works against these traits,
//! which the browser crate implements over `web_sys` and `MemoryDom`
//! implements in memory for headless use and tests.

use std::fmt::Debug;

use crate::config::FocusLine;
use crate::render::LineContent;
use crate::text::LineId;
use crate::types::{DomPoint, LogicalSelection};

/// Error type for surface operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError(pub String);

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SurfaceError {}

impl From<&str> for SurfaceError {
    fn from(s: &str) -> Self {
        SurfaceError(s.to_string())
    }
}

impl From<String> for SurfaceError {
    fn from(s: String) -> Self {
        SurfaceError(s)
    }
}

/// Coarse node classification used by the position mapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A text node. Its length counts towards the column.
    Text,
    /// An inline element whose first child holds editable text.
    Inline,
    /// Anything else (breaks, widgets). Contributes nothing to columns.
    Other,
}

/// Read-only view of a node tree.
pub trait DomTree {
    type Node: Clone + PartialEq + Debug;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node> {
        self.children(node).into_iter().next()
    }

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// Length of the node's text content, in chars.
    fn text_len(&self, node: &Self::Node) -> usize;

    /// Whether `descendant` is `node` or lies inside it.
    fn contains(&self, node: &Self::Node, descendant: &Self::Node) -> bool;

    /// Whether the node is a line node (a direct child of the root).
    fn is_line(&self, node: &Self::Node) -> bool;

    /// Whether the node is the editor root.
    fn is_root(&self, node: &Self::Node) -> bool;

    /// Convert a native offset within `node` to chars.
    ///
    /// Surfaces whose native offsets are already chars keep the default.
    fn to_char_offset(&self, _node: &Self::Node, offset: usize) -> usize {
        offset
    }

    /// Convert a char offset within text node `node` to a native offset.
    fn to_dom_offset(&self, _node: &Self::Node, offset: usize) -> usize {
        offset
    }
}

/// Mutable line-node operations used by reconciliation.
pub trait RenderSurface: DomTree {
    /// Current line nodes in document order.
    fn line_nodes(&self) -> Vec<Self::Node>;

    fn next_line_node(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Buffer line id stamped on a line node, if any.
    fn line_id_of(&self, node: &Self::Node) -> Option<LineId>;

    /// Content hash stamped on a line node, if any.
    fn content_hash_of(&self, node: &Self::Node) -> Option<u64>;

    /// Create a line node and insert it before `before` (or at the end).
    fn create_line(
        &mut self,
        id: LineId,
        content: &LineContent,
        hash: u64,
        before: Option<&Self::Node>,
    ) -> Result<Self::Node, SurfaceError>;

    /// Move an existing line node before `before` (or to the end).
    fn move_line(&mut self, node: &Self::Node, before: Option<&Self::Node>)
    -> Result<(), SurfaceError>;

    /// Replace a line node's children and restamp its hash.
    fn update_line(
        &mut self,
        node: &Self::Node,
        content: &LineContent,
        hash: u64,
    ) -> Result<(), SurfaceError>;

    fn remove_line(&mut self, node: &Self::Node) -> Result<(), SurfaceError>;

    /// Editable text currently under a line node, widgets excluded.
    ///
    /// Reflects the live tree, including mutations made behind the
    /// editor's back.
    fn line_text(&self, node: &Self::Node) -> Option<String>;

    /// Rendered height of a line node in pixels.
    fn line_height(&self, node: &Self::Node) -> f64;

    /// Replace the gutter with one entry per line, sized to `heights`.
    fn rebuild_gutter(&mut self, heights: &[f64]) -> Result<(), SurfaceError>;

    /// Toggle soft wrapping.
    fn set_wrap(&mut self, wrap: bool) -> Result<(), SurfaceError>;
}

/// Horizontal scroll state around the caret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    /// Caret x coordinate in scroll-content space.
    pub caret_x: f64,
    pub scroll_left: f64,
    pub viewport_width: f64,
}

/// Access to the surface's native selection.
pub trait NativeSelection: DomTree {
    /// The line node at `index`, if present.
    fn line_node(&self, index: usize) -> Option<Self::Node>;

    /// Native `(anchor, focus)` points, if a selection exists in the surface.
    fn native_points(&self) -> Option<(DomPoint<Self::Node>, DomPoint<Self::Node>)>;

    /// Place the native selection. `None` for `end` collapses it at `start`.
    fn select_points(
        &mut self,
        start: DomPoint<Self::Node>,
        end: Option<DomPoint<Self::Node>>,
    ) -> Result<(), SurfaceError>;

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        None
    }

    fn set_scroll_left(&mut self, _left: f64) {}

    /// Which node the end line of a selection is resolved against.
    fn focus_line(&self) -> FocusLine {
        FocusLine::Anchor
    }
}

/// Read and write the selection in logical coordinates.
///
/// The editor only uses this port; how the tuple maps onto native points is
/// the adapter's business.
pub trait SelectionPort {
    fn read(&self) -> Option<LogicalSelection>;
    fn write(&mut self, selection: &LogicalSelection) -> Result<(), SurfaceError>;
}
