//! Translates input categories into buffer operations.

use crate::actions::{InputEvent, InputType};
use crate::editor::EditorOps;
use crate::error::EditorError;
use crate::plugin::Plugin;

/// Edit-command plugin: text insertion, backspace and paragraph breaks.
///
/// Every other input category is ignored. The editor has already cancelled
/// the native mutation, so ignored input simply does nothing.
#[derive(Debug, Default)]
pub struct BasicEdit;

impl BasicEdit {
    pub const NAME: &'static str = "basic-edit";

    pub fn new() -> Self {
        Self
    }
}

impl Plugin for BasicEdit {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn before_input(
        &mut self,
        editor: &mut dyn EditorOps,
        event: &InputEvent,
    ) -> Result<bool, EditorError> {
        let Some(selection) = editor.get_selection() else {
            tracing::trace!(target: "lineal::basic_edit", "no selection, ignoring input");
            return Ok(false);
        };
        let (line, col) = (selection.start_line, selection.start_col);

        // The cached selection can lag behind a document replacement.
        let Some(line_len) = editor.line_content(line).map(|l| l.chars().count()) else {
            tracing::warn!(target: "lineal::basic_edit", line, "selection outside document");
            return Ok(false);
        };
        if col > line_len {
            tracing::warn!(target: "lineal::basic_edit", line, col, line_len, "selection past line end");
            return Ok(false);
        }

        match event.input_type {
            InputType::InsertText => {
                let data = event.data.as_deref().unwrap_or_default();
                if data.contains(['\n', '\r']) {
                    tracing::warn!(target: "lineal::basic_edit", "line break in inserted text ignored");
                    return Ok(true);
                }
                editor.insert_text(line, col, data)?;
                editor.set_selection(line, col + data.chars().count(), None)?;
                Ok(true)
            }
            InputType::DeleteContentBackward if col > 0 => {
                editor.remove_text(line, col - 1, line, col)?;
                editor.set_selection(line, col - 1, None)?;
                Ok(true)
            }
            InputType::DeleteContentBackward if line > 0 => {
                let current = editor.line_content(line).unwrap_or_default().to_owned();
                let previous_len = editor
                    .line_content(line - 1)
                    .map_or(0, |l| l.chars().count());
                editor.remove_line(line)?;
                editor.insert_text(line - 1, previous_len, &current)?;
                editor.set_selection(line - 1, previous_len, None)?;
                Ok(true)
            }
            InputType::InsertParagraph => {
                editor.new_line(line)?;
                editor.set_selection(line + 1, 0, None)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
