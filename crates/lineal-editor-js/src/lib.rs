//! WASM bindings for the lineal editor.
//!
//! Provides an embeddable line editor for JavaScript/TypeScript apps:
//!
//! ```js
//! const editor = new JsEditor({ value: "hello", wrap: true });
//! editor.mount(document.getElementById("host"));
//! editor.attachPlugin("basic-edit");
//! host.addEventListener("selectchange", (e) => console.log(e.detail));
//! ```

mod editor;
mod logging;
mod types;

pub use editor::*;
pub use logging::*;
pub use types::*;

use std::cell::RefCell;

use lineal_editor_browser::{BrowserSurface, EditorId, PluginBus, PluginRegistry};
use wasm_bindgen::prelude::*;

thread_local! {
    /// Plugin factories, defined once per module instance.
    static REGISTRY: PluginRegistry = PluginRegistry::with_builtins();
    /// Mounted editors, by id.
    static BUS: RefCell<PluginBus<BrowserSurface>> = RefCell::new(PluginBus::new());
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Names of the plugins that can be attached.
#[wasm_bindgen(js_name = pluginNames)]
pub fn plugin_names() -> Vec<String> {
    REGISTRY.with(|registry| registry.names().into_iter().map(String::from).collect())
}

/// Attach the plugin registered as `name` to the mounted editor `editor_id`.
///
/// Throws if no mounted editor has that id or the plugin name is unknown.
#[wasm_bindgen(js_name = attachPlugin)]
pub fn attach_plugin(editor_id: &str, name: &str) -> Result<(), JsError> {
    let id: EditorId = editor_id
        .parse()
        .map_err(|e| JsError::new(&format!("Invalid editor id {editor_id:?}: {e}")))?;
    let plugin = REGISTRY.with(|registry| registry.create(name)).map_err(to_js)?;
    BUS.with(|bus| bus.borrow().attach(id, plugin)).map_err(to_js)
}

pub(crate) fn to_js(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}
