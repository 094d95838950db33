//! Platform-agnostic input events.

/// Semantic input categories, after the W3C Input Events `inputType` values.
///
/// Only the categories the editor distinguishes get their own variant; the
/// rest are kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    /// Insert typed text.
    InsertText,
    /// Insert a paragraph break (Enter).
    InsertParagraph,
    /// Insert a line break (Shift+Enter).
    InsertLineBreak,
    InsertFromPaste,
    InsertFromDrop,
    /// IME composition. Passed through to the browser.
    InsertCompositionText,
    /// Backspace.
    DeleteContentBackward,
    /// Delete key.
    DeleteContentForward,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteByCut,
    HistoryUndo,
    HistoryRedo,
    /// Unrecognized input type.
    Unknown(String),
}

impl InputType {
    /// Parse a W3C `inputType` string.
    pub fn from_input_type(s: &str) -> Self {
        match s {
            "insertText" => Self::InsertText,
            "insertParagraph" => Self::InsertParagraph,
            "insertLineBreak" => Self::InsertLineBreak,
            "insertFromPaste" => Self::InsertFromPaste,
            "insertFromDrop" => Self::InsertFromDrop,
            "insertCompositionText" => Self::InsertCompositionText,
            "deleteContentBackward" => Self::DeleteContentBackward,
            "deleteContentForward" => Self::DeleteContentForward,
            "deleteWordBackward" => Self::DeleteWordBackward,
            "deleteWordForward" => Self::DeleteWordForward,
            "deleteByCut" => Self::DeleteByCut,
            "historyUndo" => Self::HistoryUndo,
            "historyRedo" => Self::HistoryRedo,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// A pre-mutation edit notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub input_type: InputType,
    /// Text carried by the event, if any.
    pub data: Option<String>,
}

impl InputEvent {
    pub fn new(input_type: InputType, data: Option<String>) -> Self {
        Self { input_type, data }
    }

    pub fn insert_text(data: impl Into<String>) -> Self {
        Self::new(InputType::InsertText, Some(data.into()))
    }

    pub fn delete_backward() -> Self {
        Self::new(InputType::DeleteContentBackward, None)
    }

    pub fn paragraph() -> Self {
        Self::new(InputType::InsertParagraph, None)
    }
}

/// What the host should do with the native `beforeinput` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeforeInputResult {
    /// Prevent the native mutation.
    Handled,
    /// Let the browser apply it.
    PassThrough,
}
