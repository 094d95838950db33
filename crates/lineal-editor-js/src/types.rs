//! Types exposed to JavaScript via wasm-bindgen.

// `Tsify` derive emits `Self::Anchor` (wasm-bindgen associated type), which is
// ambiguous with the `JsFocusLine::Anchor` variant.
#![allow(ambiguous_associated_items)]

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use lineal_editor_core::{EditorConfig, FocusLine, LogicalSelection, RenderNode};

/// Logical selection as seen from JavaScript.
///
/// Lines and columns are zero-based; columns count Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsSelection {
    pub start_line_number: usize,
    pub start_line_column_number: usize,
    pub end_line_number: usize,
    pub end_column_number: usize,
}

impl From<LogicalSelection> for JsSelection {
    fn from(s: LogicalSelection) -> Self {
        Self {
            start_line_number: s.start_line,
            start_line_column_number: s.start_col,
            end_line_number: s.end_line,
            end_column_number: s.end_col,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "lowercase")]
pub enum JsFocusLine {
    #[default]
    Anchor,
    Focus,
}

impl From<JsFocusLine> for FocusLine {
    fn from(f: JsFocusLine) -> Self {
        match f {
            JsFocusLine::Anchor => FocusLine::Anchor,
            JsFocusLine::Focus => FocusLine::Focus,
        }
    }
}

/// Options accepted by `new JsEditor(config)`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsEditorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gutter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_line: Option<JsFocusLine>,
    /// `trace`, `debug`, `info`, `warn` or `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl JsEditorConfig {
    pub fn to_editor_config(&self) -> EditorConfig {
        let defaults = EditorConfig::default();
        EditorConfig {
            wrap: self.wrap.unwrap_or(defaults.wrap),
            gutter: self.gutter.unwrap_or(defaults.gutter),
            focus_line: self.focus_line.map_or(defaults.focus_line, Into::into),
            log_level: self.log_level.clone(),
        }
    }
}

/// A node descriptor returned by a JS renderer function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JsRenderNode {
    Text {
        text: String,
    },
    Span {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        class: Option<String>,
        text: String,
    },
    Break,
    Widget {
        tag: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        class: Option<String>,
        #[serde(default)]
        text: String,
    },
}

impl From<JsRenderNode> for RenderNode {
    fn from(node: JsRenderNode) -> Self {
        match node {
            JsRenderNode::Text { text } => RenderNode::text(text),
            JsRenderNode::Span { class, text } => RenderNode::span(class.as_deref(), text),
            JsRenderNode::Break => RenderNode::Break,
            JsRenderNode::Widget { tag, class, text } => {
                RenderNode::widget(&tag, class.as_deref(), text)
            }
        }
    }
}
