//! Browser implementation of the editing surface.
//!
//! Layout created by [`BrowserSurface::mount`]:
//!
//! ```text
//! container
//! └── div.lineal.container
//!     ├── style
//!     ├── div.gutter > pre.gutter-content > div (one per line)
//!     └── pre.editor[contenteditable]
//!         └── div.line[data-line-id][data-hash] (one per buffer line)
//! ```
//!
//! DOM text offsets are UTF-16 code units; the trait conversions translate
//! them to the char columns the core works in.

use lineal_editor_core::{
    DomPoint, DomTree, EditorConfig, FocusLine, LineContent, LineId, LogicalSelection,
    NativeSelection, NodeKind, RenderNode, RenderSurface, ScrollMetrics, SelectionPort,
    SurfaceError, char_to_utf16_offset, read_selection, utf16_to_char_offset, write_selection,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Node};

use crate::style::{
    EDITOR_CLASS, EDITOR_CSS, GUTTER_CLASS, GUTTER_CONTENT_CLASS, HASH_ATTR, LINE_CLASS,
    LINE_ID_ATTR, WRAP_CLASS, WRAPPER_CLASS,
};

fn js_err(context: &str, err: JsValue) -> SurfaceError {
    SurfaceError(format!("{context}: {err:?}"))
}

/// A mounted editor element tree.
pub struct BrowserSurface {
    document: Document,
    wrapper: HtmlElement,
    gutter: Option<HtmlElement>,
    root: HtmlElement,
    focus_line: FocusLine,
}

impl BrowserSurface {
    /// Build the editor layout inside `container`.
    pub fn mount(container: &HtmlElement, config: &EditorConfig) -> Result<Self, SurfaceError> {
        let document = container
            .owner_document()
            .ok_or_else(|| SurfaceError::from("container has no owner document"))?;

        let wrapper = create_html(&document, "div")?;
        wrapper.set_class_name(WRAPPER_CLASS);

        let style = document
            .create_element("style")
            .map_err(|e| js_err("create style", e))?;
        style.set_text_content(Some(EDITOR_CSS));
        append(&wrapper, &style)?;

        let gutter = if config.gutter {
            let gutter_box = create_html(&document, "div")?;
            gutter_box.set_class_name(GUTTER_CLASS);
            let gutter = create_html(&document, "pre")?;
            gutter.set_class_name(GUTTER_CONTENT_CLASS);
            append(&gutter_box, &gutter)?;
            append(&wrapper, &gutter_box)?;
            Some(gutter)
        } else {
            None
        };

        let root = create_html(&document, "pre")?;
        root.set_class_name(EDITOR_CLASS);
        root.set_content_editable("true");
        root.set_spellcheck(false);
        append(&wrapper, &root)?;

        append(container, &wrapper)?;
        tracing::debug!(target: "lineal::browser", gutter = config.gutter, "surface mounted");

        Ok(Self {
            document,
            wrapper,
            gutter,
            root,
            focus_line: config.focus_line,
        })
    }

    /// The contenteditable element holding the line nodes.
    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    /// The element that gets one entry per line.
    pub fn gutter(&self) -> Option<&HtmlElement> {
        self.gutter.as_ref()
    }

    /// The outer element appended to the host container.
    pub fn wrapper(&self) -> &HtmlElement {
        &self.wrapper
    }

    /// Keep the gutter aligned with the editor's vertical scroll.
    pub fn sync_gutter_scroll(&self) {
        if let Some(gutter) = &self.gutter {
            let top = format!("{}px", -self.root.scroll_top());
            if let Err(err) = gutter.style().set_property("top", &top) {
                tracing::warn!(target: "lineal::browser", ?err, "failed to move gutter");
            }
        }
    }

    /// Remove the whole layout from the host container.
    pub fn unmount(&self) {
        self.wrapper.remove();
        tracing::debug!(target: "lineal::browser", "surface unmounted");
    }

    fn as_element(node: &Node) -> Option<&Element> {
        node.dyn_ref::<Element>()
    }

    fn root_node(&self) -> &Node {
        self.root.as_ref()
    }

    fn fill(&self, line: &Element, content: &LineContent) -> Result<(), SurfaceError> {
        line.set_text_content(None);
        for render_node in content.clone().into_nodes() {
            let node: Node = match render_node {
                RenderNode::Text { text } => self.document.create_text_node(&text).into(),
                RenderNode::Span { class, text } => {
                    let span = self.create("span")?;
                    if let Some(class) = class {
                        span.set_class_name(&class);
                    }
                    span.set_text_content(Some(&text));
                    span.into()
                }
                RenderNode::Break => self.create("br")?.into(),
                RenderNode::Widget { tag, class, text } => {
                    let widget = self.create(&tag)?;
                    if let Some(class) = class {
                        widget.set_class_name(&class);
                    }
                    widget
                        .set_attribute("contenteditable", "false")
                        .map_err(|e| js_err("set contenteditable", e))?;
                    if !text.is_empty() {
                        widget.set_text_content(Some(&text));
                    }
                    widget.into()
                }
            };
            line.append_child(&node)
                .map_err(|e| js_err("append line child", e))?;
        }
        Ok(())
    }

    fn create(&self, tag: &str) -> Result<Element, SurfaceError> {
        self.document
            .create_element(tag)
            .map_err(|e| js_err("create element", e))
    }

    fn stamp_hash(line: &Element, hash: u64) -> Result<(), SurfaceError> {
        line.set_attribute(HASH_ATTR, &format!("{hash:x}"))
            .map_err(|e| js_err("set hash", e))
    }
}

fn create_html(document: &Document, tag: &str) -> Result<HtmlElement, SurfaceError> {
    document
        .create_element(tag)
        .map_err(|e| js_err("create element", e))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| SurfaceError(format!("<{tag}> is not an HtmlElement")))
}

fn append(parent: &Node, child: &Node) -> Result<(), SurfaceError> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|e| js_err("append child", e))
}

impl DomTree for BrowserSurface {
    type Node = Node;

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn previous_sibling(&self, node: &Node) -> Option<Node> {
        node.previous_sibling()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.get(i)).collect()
    }

    fn first_child(&self, node: &Node) -> Option<Node> {
        node.first_child()
    }

    fn kind(&self, node: &Node) -> NodeKind {
        if node.node_type() == Node::TEXT_NODE {
            return NodeKind::Text;
        }
        match Self::as_element(node) {
            Some(el) if el.tag_name() == "BR" => NodeKind::Other,
            Some(el) if el.get_attribute("contenteditable").as_deref() == Some("false") => {
                NodeKind::Other
            }
            Some(_) => NodeKind::Inline,
            None => NodeKind::Other,
        }
    }

    fn text_len(&self, node: &Node) -> usize {
        node.text_content().map_or(0, |text| text.chars().count())
    }

    fn contains(&self, node: &Node, descendant: &Node) -> bool {
        node.contains(Some(descendant))
    }

    fn is_line(&self, node: &Node) -> bool {
        Self::as_element(node).is_some_and(|el| el.class_list().contains(LINE_CLASS))
            && node.parent_node().as_ref() == Some(self.root_node())
    }

    fn is_root(&self, node: &Node) -> bool {
        node == self.root_node()
    }

    fn to_char_offset(&self, node: &Node, offset: usize) -> usize {
        if node.node_type() == Node::TEXT_NODE {
            let text = node.text_content().unwrap_or_default();
            return utf16_to_char_offset(&text, offset);
        }
        // Element offsets are child indices.
        self.children(node)
            .iter()
            .take(offset)
            .filter(|child| self.kind(child) != NodeKind::Other)
            .map(|child| self.text_len(child))
            .sum()
    }

    fn to_dom_offset(&self, node: &Node, offset: usize) -> usize {
        let text = node.text_content().unwrap_or_default();
        char_to_utf16_offset(&text, offset)
    }
}

impl RenderSurface for BrowserSurface {
    fn line_nodes(&self) -> Vec<Node> {
        let children = self.root.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .filter(|el| el.class_list().contains(LINE_CLASS))
            .map(Node::from)
            .collect()
    }

    fn next_line_node(&self, node: &Node) -> Option<Node> {
        let mut next = node.next_sibling();
        while let Some(candidate) = next {
            if self.is_line(&candidate) {
                return Some(candidate);
            }
            next = candidate.next_sibling();
        }
        None
    }

    fn line_id_of(&self, node: &Node) -> Option<LineId> {
        Self::as_element(node)?
            .get_attribute(LINE_ID_ATTR)?
            .parse()
            .ok()
    }

    fn content_hash_of(&self, node: &Node) -> Option<u64> {
        let hash = Self::as_element(node)?.get_attribute(HASH_ATTR)?;
        u64::from_str_radix(&hash, 16).ok()
    }

    fn create_line(
        &mut self,
        id: LineId,
        content: &LineContent,
        hash: u64,
        before: Option<&Node>,
    ) -> Result<Node, SurfaceError> {
        let line = self.create("div")?;
        line.set_class_name(LINE_CLASS);
        line.set_attribute(LINE_ID_ATTR, &id.to_string())
            .map_err(|e| js_err("set line id", e))?;
        Self::stamp_hash(&line, hash)?;
        self.fill(&line, content)?;
        let node: Node = line.into();
        self.root
            .insert_before(&node, before)
            .map_err(|e| js_err("insert line", e))?;
        Ok(node)
    }

    fn move_line(&mut self, node: &Node, before: Option<&Node>) -> Result<(), SurfaceError> {
        self.root
            .insert_before(node, before)
            .map(|_| ())
            .map_err(|e| js_err("move line", e))
    }

    fn update_line(
        &mut self,
        node: &Node,
        content: &LineContent,
        hash: u64,
    ) -> Result<(), SurfaceError> {
        let line = Self::as_element(node)
            .ok_or_else(|| SurfaceError::from("line is not an element"))?;
        self.fill(line, content)?;
        Self::stamp_hash(line, hash)
    }

    fn remove_line(&mut self, node: &Node) -> Result<(), SurfaceError> {
        self.root
            .remove_child(node)
            .map(|_| ())
            .map_err(|e| js_err("remove line", e))
    }

    fn line_text(&self, node: &Node) -> Option<String> {
        Self::as_element(node)?;
        Some(
            self.children(node)
                .iter()
                .filter(|child| self.kind(child) != NodeKind::Other)
                .filter_map(|child| child.text_content())
                .collect(),
        )
    }

    fn line_height(&self, node: &Node) -> f64 {
        Self::as_element(node).map_or(0.0, |el| el.get_bounding_client_rect().height())
    }

    fn rebuild_gutter(&mut self, heights: &[f64]) -> Result<(), SurfaceError> {
        let Some(gutter) = &self.gutter else {
            return Ok(());
        };
        gutter.set_text_content(None);
        for (i, height) in heights.iter().enumerate() {
            let entry = create_html(&self.document, "div")?;
            entry.set_text_content(Some(&(i + 1).to_string()));
            entry
                .style()
                .set_property("height", &format!("{height}px"))
                .map_err(|e| js_err("set gutter height", e))?;
            append(gutter, &entry)?;
        }
        Ok(())
    }

    fn set_wrap(&mut self, wrap: bool) -> Result<(), SurfaceError> {
        self.root
            .class_list()
            .toggle_with_force(WRAP_CLASS, wrap)
            .map(|_| ())
            .map_err(|e| js_err("toggle wrap", e))
    }
}

impl NativeSelection for BrowserSurface {
    fn line_node(&self, index: usize) -> Option<Node> {
        self.line_nodes().into_iter().nth(index)
    }

    fn native_points(&self) -> Option<(DomPoint<Node>, DomPoint<Node>)> {
        let selection = gloo_utils::window().get_selection().ok()??;
        let anchor = selection.anchor_node()?;
        let focus = selection.focus_node()?;
        Some((
            DomPoint::new(anchor, selection.anchor_offset() as usize),
            DomPoint::new(focus, selection.focus_offset() as usize),
        ))
    }

    fn select_points(
        &mut self,
        start: DomPoint<Node>,
        end: Option<DomPoint<Node>>,
    ) -> Result<(), SurfaceError> {
        let selection = gloo_utils::window()
            .get_selection()
            .map_err(|e| js_err("get selection", e))?
            .ok_or_else(|| SurfaceError::from("no selection object"))?;
        match end {
            Some(end) => selection.set_base_and_extent(
                &start.node,
                start.offset as u32,
                &end.node,
                end.offset as u32,
            ),
            None => selection.collapse_with_offset(Some(&start.node), start.offset as u32),
        }
        .map_err(|e| js_err("select", e))
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        let selection = gloo_utils::window().get_selection().ok()??;
        if selection.range_count() == 0 {
            return None;
        }
        let range = selection.get_range_at(0).ok()?;
        let caret = range.get_bounding_client_rect();
        let bounds = self.root.get_bounding_client_rect();
        let scroll_left = f64::from(self.root.scroll_left());
        Some(ScrollMetrics {
            caret_x: caret.left() - bounds.left() + scroll_left,
            scroll_left,
            viewport_width: f64::from(self.root.client_width()),
        })
    }

    fn set_scroll_left(&mut self, left: f64) {
        self.root.set_scroll_left(left.round() as i32);
    }

    fn focus_line(&self) -> FocusLine {
        self.focus_line
    }
}

impl SelectionPort for BrowserSurface {
    fn read(&self) -> Option<LogicalSelection> {
        read_selection(self)
    }

    fn write(&mut self, selection: &LogicalSelection) -> Result<(), SurfaceError> {
        write_selection(self, selection)
    }
}

impl Drop for BrowserSurface {
    fn drop(&mut self) {
        if self.wrapper.is_connected() {
            self.unmount();
        }
    }
}
