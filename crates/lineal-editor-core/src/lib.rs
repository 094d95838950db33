//! lineal-editor-core: Pure Rust editor logic without DOM dependencies.
//!
//! This crate provides:
//! - `LineBuffer` - ordered lines with stable `LineId` handles
//! - `mapper` - DOM position ↔ logical `(line, column)` conversion, generic over `DomTree`
//! - `reconcile` - keyed line-node reconciliation and gutter rebuild
//! - `selection` - selection tracking and the `SelectionPort` adapters
//! - `Editor<S>` - the editor, generic over its rendering surface
//! - `plugin` / `plugins` - explicit plugin association and the built-in plugins
//! - `MemoryDom` - an in-memory surface for headless use and tests

pub mod actions;
pub mod config;
pub mod editor;
pub mod error;
pub mod mapper;
pub mod memory;
pub mod platform;
pub mod plugin;
pub mod plugins;
pub mod reconcile;
pub mod render;
pub mod selection;
pub mod text;
pub mod types;

pub use actions::{BeforeInputResult, InputEvent, InputType};
pub use config::{EditorConfig, FocusLine};
pub use editor::{Editor, EditorId, EditorOps};
pub use error::EditorError;
pub use mapper::{column_at, line_index, owning_line, position_at};
pub use memory::{GutterEntry, LINE_HEIGHT, MemoryDom, NodeId};
pub use platform::{
    DomTree, NativeSelection, NodeKind, RenderSurface, ScrollMetrics, SelectionPort, SurfaceError,
};
pub use plugin::{Plugin, PluginBus, PluginRegistry};
pub use plugins::{BasicEdit, HintOverlay, render_with_hint};
pub use reconcile::{ReconcileStats, reconcile_lines};
pub use render::{LineContent, LineContext, LineRenderer, RenderNode, render_line};
pub use selection::{SelectionTracker, horizontal_scroll_target, read_selection, write_selection};
pub use smol_str::SmolStr;
pub use text::{LineBuffer, LineId, char_to_utf16_offset, utf16_to_char_offset};
pub use types::{DomPoint, LogicalPosition, LogicalSelection};
