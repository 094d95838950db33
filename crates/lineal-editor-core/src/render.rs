//! Per-line render output.
//!
//! A line renderer turns one buffer line into the content of its line node:
//! either plain text or a short list of inline nodes. Renderers never see
//! the DOM; the surface materialises whatever they return.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Deserialize;
use smol_str::SmolStr;

use crate::types::LogicalSelection;

/// One inline piece of a rendered line.
///
/// Only `Text` and `Span` contribute to column counting. `Widget` content is
/// decoration that the caret skips over; `Break` keeps empty lines tall.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderNode {
    /// A bare text node.
    Text { text: String },
    /// An inline element wrapping a single text node.
    Span {
        #[serde(default)]
        class: Option<SmolStr>,
        text: String,
    },
    /// A line break element used as a placeholder in empty lines.
    Break,
    /// Non-editable decoration.
    Widget {
        tag: SmolStr,
        #[serde(default)]
        class: Option<SmolStr>,
        #[serde(default)]
        text: String,
    },
}

impl RenderNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn span(class: Option<&str>, text: impl Into<String>) -> Self {
        Self::Span {
            class: class.map(SmolStr::new),
            text: text.into(),
        }
    }

    pub fn widget(tag: &str, class: Option<&str>, text: impl Into<String>) -> Self {
        Self::Widget {
            tag: SmolStr::new(tag),
            class: class.map(SmolStr::new),
            text: text.into(),
        }
    }

    /// Text this node contributes to the line's columns.
    pub fn editable_text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Span { text, .. } => text,
            Self::Break | Self::Widget { .. } => "",
        }
    }
}

/// What a renderer produced for one line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LineContent {
    Text(String),
    Nodes(Vec<RenderNode>),
}

impl LineContent {
    /// Normalise into a node list. An empty line becomes a single `Break`.
    pub fn into_nodes(self) -> Vec<RenderNode> {
        let nodes = match self {
            Self::Text(text) if text.is_empty() => Vec::new(),
            Self::Text(text) => vec![RenderNode::Text { text }],
            Self::Nodes(nodes) => nodes,
        };
        if nodes.is_empty() {
            vec![RenderNode::Break]
        } else {
            nodes
        }
    }

    /// Concatenated editable text, ignoring widgets and breaks.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Nodes(nodes) => nodes.iter().map(RenderNode::editable_text).collect(),
        }
    }

    /// Hash used to skip re-rendering unchanged line nodes.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.clone().into_nodes().hash(&mut hasher);
        hasher.finish()
    }
}

impl From<String> for LineContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for LineContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<RenderNode>> for LineContent {
    fn from(nodes: Vec<RenderNode>) -> Self {
        Self::Nodes(nodes)
    }
}

/// Context passed to a renderer alongside the line text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineContext {
    /// Index of the line being rendered.
    pub index: usize,
    /// Current logical selection, if one has been observed.
    pub selection: Option<LogicalSelection>,
}

/// Produces the content of a single line node.
pub trait LineRenderer {
    fn render(&self, text: &str, ctx: &LineContext) -> LineContent;
}

impl<F> LineRenderer for F
where
    F: Fn(&str, &LineContext) -> LineContent,
{
    fn render(&self, text: &str, ctx: &LineContext) -> LineContent {
        self(text, ctx)
    }
}

/// Render a line with `renderer`, or as plain text if none is installed.
pub fn render_line(renderer: Option<&dyn LineRenderer>, text: &str, ctx: &LineContext) -> LineContent {
    match renderer {
        Some(renderer) => renderer.render(text, ctx),
        None => LineContent::Text(text.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_becomes_break() {
        assert_eq!(LineContent::from("").into_nodes(), vec![RenderNode::Break]);
        assert_eq!(LineContent::Nodes(vec![]).into_nodes(), vec![RenderNode::Break]);
    }

    #[test]
    fn test_plain_text_skips_widgets() {
        let content = LineContent::Nodes(vec![
            RenderNode::text("ab"),
            RenderNode::widget("i", Some("hint"), "type here"),
            RenderNode::span(Some("kw"), "cd"),
        ]);
        assert_eq!(content.plain_text(), "abcd");
    }

    #[test]
    fn test_hash_tracks_content() {
        let a = LineContent::from("abc");
        let b = LineContent::Nodes(vec![RenderNode::text("abc")]);
        let c = LineContent::from("abd");
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn test_closure_renderer() {
        let upper = |text: &str, _: &LineContext| LineContent::Text(text.to_uppercase());
        let ctx = LineContext {
            index: 0,
            selection: None,
        };
        assert_eq!(render_line(Some(&upper), "ab", &ctx), LineContent::from("AB"));
        assert_eq!(render_line(None, "ab", &ctx), LineContent::from("ab"));
    }
}
