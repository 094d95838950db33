//! Browser DOM layer for the lineal editor.
//!
//! This crate implements the core surface traits over a real DOM and wires
//! browser events to an `Editor<BrowserSurface>`. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `surface`: mounted element tree, line nodes, gutter and native selection
//! - `events`: `beforeinput` → `InputEvent` conversion
//! - `listeners`: `selectionchange`, `beforeinput` and scroll listeners
//! - `style`: stylesheet and class names
//!
//! # Re-exports
//!
//! This crate re-exports `lineal-editor-core` for convenience, so consumers
//! only need to depend on `lineal-editor-browser`.

// Re-export core crate
pub use lineal_editor_core;
pub use lineal_editor_core::*;

pub mod events;
pub mod listeners;
pub mod style;
pub mod surface;

pub use events::{get_data_from_event, input_event_from_dom, is_composing};
pub use listeners::EditorListeners;
pub use surface::BrowserSurface;

/// Editor over a mounted browser surface.
pub type BrowserEditor = Editor<BrowserSurface>;
