//! Ghost-text hint at the caret, plus flagged-term warnings.

use crate::editor::EditorOps;
use crate::error::EditorError;
use crate::plugin::Plugin;
use crate::render::{LineContent, LineContext, RenderNode};

/// Class of the inline hint widget.
pub const HINT_CLASS: &str = "hint";
/// Class of the per-line warning widget.
pub const WARNING_CLASS: &str = "line-warning";
const WARNING_TEXT: &str = "This line contains a flagged term";

/// Plain-text renderer with an inline hint.
///
/// Attributes:
/// - `hint`: text shown after the caret while the selection is collapsed
/// - `flag`: comma-separated terms; lines containing one get a warning
#[derive(Debug, Default)]
pub struct HintOverlay {
    hint: Option<String>,
    flagged: Vec<String>,
}

impl HintOverlay {
    pub const NAME: &'static str = "plain-text";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn flagged(&self) -> &[String] {
        &self.flagged
    }

    fn install(&self, editor: &mut dyn EditorOps) -> Result<(), EditorError> {
        let hint = self.hint.clone();
        let flagged = self.flagged.clone();
        editor.set_renderer(Some(Box::new(move |text: &str, ctx: &LineContext| {
            render_with_hint(text, ctx, hint.as_deref(), &flagged)
        })))
    }
}

impl Plugin for HintOverlay {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn mount(&mut self, editor: &mut dyn EditorOps) -> Result<(), EditorError> {
        self.install(editor)
    }

    fn selection_changed(&mut self, editor: &mut dyn EditorOps) -> Result<(), EditorError> {
        if self.hint.is_some() {
            editor.build_lines()?;
            editor.reselect()?;
        }
        Ok(())
    }

    fn attribute_changed(
        &mut self,
        editor: &mut dyn EditorOps,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), EditorError> {
        match name {
            "hint" => {
                self.hint = value.filter(|v| !v.is_empty()).map(str::to_owned);
            }
            "flag" => {
                self.flagged = value
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|term| !term.is_empty())
                    .map(str::to_owned)
                    .collect();
            }
            _ => return Ok(()),
        }
        tracing::debug!(target: "lineal::hint", name, ?value, "attribute changed");
        self.install(editor)?;
        editor.reselect()
    }
}

/// Render one line with the hint inserted at a collapsed caret on it.
///
/// The caret column is clamped to the line so a stale selection cannot
/// split inside a char.
pub fn render_with_hint(
    text: &str,
    ctx: &LineContext,
    hint: Option<&str>,
    flagged: &[String],
) -> LineContent {
    let mut nodes = Vec::with_capacity(3);
    let caret = ctx
        .selection
        .filter(|s| s.is_collapsed() && s.start_line == ctx.index);

    match (hint, caret) {
        (Some(hint), Some(caret)) => {
            let at = text
                .char_indices()
                .nth(caret.start_col)
                .map_or(text.len(), |(byte, _)| byte);
            let (before, after) = text.split_at(at);
            if !before.is_empty() {
                nodes.push(RenderNode::text(before));
            }
            nodes.push(RenderNode::widget("i", Some(HINT_CLASS), hint));
            if !after.is_empty() {
                nodes.push(RenderNode::text(after));
            }
        }
        _ if text.is_empty() => nodes.push(RenderNode::Break),
        _ => nodes.push(RenderNode::text(text)),
    }

    if flagged.iter().any(|term| text.contains(term.as_str())) {
        nodes.push(RenderNode::widget("div", Some(WARNING_CLASS), WARNING_TEXT));
    }
    LineContent::Nodes(nodes)
}
