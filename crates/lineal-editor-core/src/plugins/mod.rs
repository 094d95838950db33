//! Built-in plugins.

mod basic_edit;
mod hint;

pub use basic_edit::BasicEdit;
pub use hint::{HintOverlay, render_with_hint};
