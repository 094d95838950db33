//! Editor configuration.
//!
//! Hosts pass a plain object (camelCase keys) which is decoded with serde.
//! Every field has a default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

/// Which owning line the focus side of a selection is resolved against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusLine {
    /// Resolve the end line from the anchor node's owning line.
    ///
    /// A selection that spans several lines therefore reports the anchor's
    /// line as its end line. Kept as the default until the intended
    /// semantics are confirmed.
    #[default]
    Anchor,
    /// Resolve the end line from the focus node's own owning line.
    Focus,
}

/// Per-editor configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Soft-wrap long lines.
    pub wrap: bool,
    /// Render the line-number gutter.
    pub gutter: bool,
    /// End-of-selection line lookup.
    pub focus_line: FocusLine,
    /// Maximum tracing level for the console logger (`trace` .. `error`).
    pub log_level: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            wrap: false,
            gutter: true,
            focus_line: FocusLine::Anchor,
            log_level: None,
        }
    }
}
