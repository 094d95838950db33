//! Error types for editor and plugin operations.

use smol_str::SmolStr;
use thiserror::Error;

use crate::editor::EditorId;
use crate::platform::SurfaceError;

/// Errors that can occur while wiring editors and plugins together.
///
/// Buffer operations never return these: out-of-range indices are a caller
/// contract violation and panic instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EditorError {
    /// A plugin was attached to an editor that is not registered (or was dropped).
    #[error("no owning editor found for {0}")]
    NoOwningEditor(EditorId),

    /// A plugin name was defined twice in the same registry.
    #[error("plugin `{0}` is already registered")]
    DuplicateRegistration(SmolStr),

    /// No factory is registered under this plugin name.
    #[error("unknown plugin `{0}`")]
    UnknownPlugin(SmolStr),

    /// No plugin with this name is attached to the editor.
    #[error("plugin `{0}` is not attached")]
    NotAttached(SmolStr),

    /// The editor is already mutably borrowed (re-entrant call from a handler).
    #[error("editor {0} is busy")]
    Busy(EditorId),

    /// The rendering surface rejected an operation.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
