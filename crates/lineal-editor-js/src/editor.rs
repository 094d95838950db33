//! JsEditor - the main editor wrapper for JavaScript.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, HtmlElement};

use lineal_editor_browser::{
    BrowserEditor, BrowserSurface, EditorConfig, EditorListeners, EditorOps, LineContent,
    LineContext, LineRenderer, LogicalPosition, LogicalSelection,
};

use crate::types::{JsEditorConfig, JsRenderNode, JsSelection};
use crate::{BUS, REGISTRY, init_logging, to_js};

/// Name of the event dispatched on the container when the selection changes.
pub const SELECT_CHANGE_EVENT: &str = "selectchange";

struct Mounted {
    editor: Rc<RefCell<BrowserEditor>>,
    _listeners: EditorListeners,
}

/// The editor instance exposed to JavaScript.
///
/// Holds the document while unmounted; `mount` renders it into a container
/// and from then on every operation goes through the live editor.
#[wasm_bindgen]
pub struct JsEditor {
    config: EditorConfig,
    value: String,
    renderer: Option<js_sys::Function>,
    plugins: Vec<String>,
    attributes: Vec<(String, String, Option<String>)>,
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an unmounted editor. `config` is an optional `JsEditorConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditor, JsError> {
        let config: JsEditorConfig = if config.is_undefined() || config.is_null() {
            JsEditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
        };
        if config.log_level.is_some() {
            init_logging(config.log_level.clone());
        }

        Ok(Self {
            config: config.to_editor_config(),
            value: config.value.unwrap_or_default(),
            renderer: None,
            plugins: Vec::new(),
            attributes: Vec::new(),
            mounted: None,
        })
    }

    // === Mounting ===

    /// Render the editor into `container`.
    ///
    /// Plugins and the renderer set before mounting are applied now.
    #[wasm_bindgen]
    pub fn mount(&mut self, container: HtmlElement) -> Result<(), JsError> {
        if self.mounted.is_some() {
            return Err(JsError::new("Editor is already mounted"));
        }

        let surface = BrowserSurface::mount(&container, &self.config).map_err(to_js)?;
        let mut editor =
            BrowserEditor::new(surface, self.config.clone(), &self.value).map_err(to_js)?;
        editor.on_select_change(select_change_dispatcher(container));

        if let Some(func) = &self.renderer {
            editor
                .set_renderer(Some(js_renderer(func.clone())))
                .map_err(to_js)?;
        }
        for name in &self.plugins {
            let plugin = REGISTRY.with(|registry| registry.create(name)).map_err(to_js)?;
            editor.attach(plugin).map_err(to_js)?;
        }
        for (plugin, name, value) in &self.attributes {
            editor
                .set_plugin_attribute(plugin, name, value.as_deref())
                .map_err(to_js)?;
        }

        let id = editor.id();
        let editor = Rc::new(RefCell::new(editor));
        let listeners = EditorListeners::install(&editor).map_err(to_js)?;
        BUS.with(|bus| bus.borrow_mut().register(id, &editor));
        tracing::debug!(target: "lineal::js", %id, "editor mounted");

        self.mounted = Some(Mounted {
            editor,
            _listeners: listeners,
        });
        Ok(())
    }

    /// Check if the editor is mounted.
    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Remove the editor from its container, keeping the document.
    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        let Some(mounted) = self.mounted.take() else {
            return;
        };
        let Ok(editor) = mounted.editor.try_borrow() else {
            tracing::warn!(target: "lineal::js", "unmount while editor is busy");
            return;
        };
        self.value = editor.value();
        let id = editor.id();
        drop(editor);
        drop(mounted);
        BUS.with(|bus| {
            let mut bus = bus.borrow_mut();
            bus.unregister(id);
            bus.prune();
        });
        tracing::debug!(target: "lineal::js", %id, "editor unmounted");
    }

    /// Id of the mounted editor, for `attachPlugin(editorId, name)`.
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> Option<String> {
        let mounted = self.mounted.as_ref()?;
        let editor = mounted.editor.try_borrow().ok()?;
        Some(editor.id().to_string())
    }

    // === Content ===

    #[wasm_bindgen(getter)]
    pub fn value(&self) -> Result<String, JsError> {
        if self.mounted.is_none() {
            return Ok(self.value.clone());
        }
        Ok(self.editor()?.value())
    }

    /// Replace the whole document.
    #[wasm_bindgen(setter)]
    pub fn set_value(&mut self, value: &str) -> Result<(), JsError> {
        if self.mounted.is_none() {
            self.value = value.to_owned();
            return Ok(());
        }
        self.editor_mut()?.set_value(value).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn wrap(&self) -> bool {
        self.config.wrap
    }

    #[wasm_bindgen(setter)]
    pub fn set_wrap(&mut self, wrap: bool) -> Result<(), JsError> {
        self.config.wrap = wrap;
        if self.mounted.is_none() {
            return Ok(());
        }
        self.editor_mut()?.set_wrap(wrap).map_err(to_js)
    }

    #[wasm_bindgen(js_name = getLineContent)]
    pub fn get_line_content(&self, line: usize) -> Result<Option<String>, JsError> {
        Ok(self.editor()?.line_content(line).map(str::to_owned))
    }

    #[wasm_bindgen(js_name = lineCount)]
    pub fn line_count(&self) -> Result<usize, JsError> {
        Ok(self.editor()?.line_count())
    }

    // === Selection ===

    /// The last observed selection (a `JsSelection`), or `undefined`.
    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> Result<JsValue, JsError> {
        let selection = self.editor()?.get_selection().map(JsSelection::from);
        serde_wasm_bindgen::to_value(&selection)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    /// Select from `(line, col)` to `(endLine, endCol)`, or place a caret.
    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(
        &mut self,
        line: usize,
        col: usize,
        end_line: Option<usize>,
        end_col: Option<usize>,
    ) -> Result<(), JsError> {
        let end = match (end_line, end_col) {
            (None, None) => None,
            (end_line, end_col) => Some(LogicalPosition::new(
                end_line.unwrap_or(line),
                end_col.unwrap_or(col),
            )),
        };
        self.editor_mut()?
            .set_selection(line, col, end)
            .map_err(to_js)
    }

    /// Re-apply the cached selection after the DOM was rebuilt.
    #[wasm_bindgen]
    pub fn reselect(&mut self) -> Result<(), JsError> {
        self.editor_mut()?.reselect().map_err(to_js)
    }

    // === Buffer operations ===

    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&mut self, line: usize, col: usize, text: &str) -> Result<(), JsError> {
        if text.contains(['\n', '\r']) {
            return Err(JsError::new("Inserted text must not contain line breaks"));
        }
        let mut editor = self.editor_mut()?;
        check_column(&*editor, line, col)?;
        editor.insert_text(line, col, text).map_err(to_js)
    }

    /// Remove `[x1, x2)` on line `y1`. Ranges spanning lines are ignored.
    #[wasm_bindgen(js_name = removeText)]
    pub fn remove_text(&mut self, y1: usize, x1: usize, y2: usize, x2: usize) -> Result<(), JsError> {
        let mut editor = self.editor_mut()?;
        if y1 == y2 {
            check_column(&*editor, y1, x2)?;
            if x1 > x2 {
                return Err(JsError::new(&format!("Invalid range {x1}..{x2}")));
            }
        }
        editor.remove_text(y1, x1, y2, x2).map_err(to_js)
    }

    #[wasm_bindgen(js_name = removeLine)]
    pub fn remove_line(&mut self, line: usize) -> Result<(), JsError> {
        let mut editor = self.editor_mut()?;
        check_line(&*editor, line)?;
        editor.remove_line(line).map_err(to_js)
    }

    /// Insert an empty line after `line`.
    #[wasm_bindgen(js_name = newLine)]
    pub fn new_line(&mut self, line: usize) -> Result<(), JsError> {
        let mut editor = self.editor_mut()?;
        check_line(&*editor, line)?;
        editor.new_line(line).map_err(to_js)
    }

    // === Rendering ===

    /// Install a line renderer, or clear it with `undefined`.
    ///
    /// The function is called as `fn(text, index, selection)` and returns
    /// either a string or an array of `JsRenderNode`.
    #[wasm_bindgen]
    pub fn renderer(&mut self, func: Option<js_sys::Function>) -> Result<(), JsError> {
        self.renderer = func.clone();
        if self.mounted.is_none() {
            return Ok(());
        }
        self.editor_mut()?
            .set_renderer(func.map(js_renderer))
            .map_err(to_js)
    }

    /// Reconcile the line nodes with the buffer.
    #[wasm_bindgen(js_name = buildLines)]
    pub fn build_lines(&mut self) -> Result<(), JsError> {
        let stats = self.editor_mut()?.build_lines().map_err(to_js)?;
        tracing::trace!(target: "lineal::js", ?stats, "buildLines");
        Ok(())
    }

    // === Plugins ===

    /// Attach a registered plugin to this editor.
    #[wasm_bindgen(js_name = attachPlugin)]
    pub fn attach_plugin(&mut self, name: &str) -> Result<(), JsError> {
        let plugin = REGISTRY.with(|registry| registry.create(name)).map_err(to_js)?;
        if self.mounted.is_some() {
            self.editor_mut()?.attach(plugin).map_err(to_js)?;
        }
        self.plugins.push(name.to_owned());
        Ok(())
    }

    /// Set (or remove, with `undefined`) an attribute on an attached plugin.
    #[wasm_bindgen(js_name = setPluginAttribute)]
    pub fn set_plugin_attribute(
        &mut self,
        plugin: &str,
        name: &str,
        value: Option<String>,
    ) -> Result<(), JsError> {
        if self.mounted.is_some() {
            self.editor_mut()?
                .set_plugin_attribute(plugin, name, value.as_deref())
                .map_err(to_js)?;
        } else if !self.plugins.iter().any(|p| p == plugin) {
            return Err(JsError::new(&format!("Plugin {plugin:?} is not attached")));
        }
        self.attributes.retain(|(p, n, _)| !(p == plugin && n == name));
        self.attributes.push((plugin.to_owned(), name.to_owned(), value));
        Ok(())
    }
}

impl JsEditor {
    fn mounted(&self) -> Result<&Mounted, JsError> {
        self.mounted
            .as_ref()
            .ok_or_else(|| JsError::new("Editor is not mounted"))
    }

    fn editor(&self) -> Result<Ref<'_, BrowserEditor>, JsError> {
        self.mounted()?
            .editor
            .try_borrow()
            .map_err(|_| JsError::new("Editor is busy"))
    }

    fn editor_mut(&self) -> Result<RefMut<'_, BrowserEditor>, JsError> {
        self.mounted()?
            .editor
            .try_borrow_mut()
            .map_err(|_| JsError::new("Editor is busy"))
    }
}

impl Drop for JsEditor {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn check_line(editor: &BrowserEditor, line: usize) -> Result<(), JsError> {
    if line < editor.line_count() {
        Ok(())
    } else {
        Err(JsError::new(&format!(
            "Line {line} out of range (document has {} lines)",
            editor.line_count()
        )))
    }
}

fn check_column(editor: &BrowserEditor, line: usize, col: usize) -> Result<(), JsError> {
    check_line(editor, line)?;
    let len = editor
        .line_content(line)
        .map_or(0, |text| text.chars().count());
    if col <= len {
        Ok(())
    } else {
        Err(JsError::new(&format!(
            "Column {col} out of range (line {line} has {len} characters)"
        )))
    }
}

/// Dispatch `selectchange` on `container` for every genuine selection change.
///
/// The event is queued rather than dispatched inline: listeners may call
/// back into the editor, which is still borrowed while it notifies.
fn select_change_dispatcher(container: HtmlElement) -> impl FnMut(&LogicalSelection) + 'static {
    move |selection| {
        let detail = match serde_wasm_bindgen::to_value(&JsSelection::from(*selection)) {
            Ok(detail) => detail,
            Err(err) => {
                tracing::warn!(target: "lineal::js", %err, "failed to serialize selection");
                return;
            }
        };
        let container = container.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let init = CustomEventInit::new();
            init.set_bubbles(false);
            init.set_detail(&detail);
            match CustomEvent::new_with_event_init_dict(SELECT_CHANGE_EVENT, &init) {
                Ok(event) => {
                    let _ = container.dispatch_event(&event);
                }
                Err(err) => {
                    tracing::warn!(target: "lineal::js", ?err, "failed to create selectchange event");
                }
            }
        });
    }
}

/// Adapt a JS function into a line renderer.
///
/// A throwing function, or one returning something unrecognised, falls back
/// to the raw line text.
fn js_renderer(func: js_sys::Function) -> Box<dyn LineRenderer> {
    Box::new(move |text: &str, ctx: &LineContext| {
        let selection = ctx
            .selection
            .map(JsSelection::from)
            .and_then(|s| serde_wasm_bindgen::to_value(&s).ok())
            .unwrap_or(JsValue::UNDEFINED);
        let index = JsValue::from(ctx.index as u32);
        match func.call3(&JsValue::NULL, &JsValue::from_str(text), &index, &selection) {
            Ok(result) => content_from_js(text, result),
            Err(err) => {
                tracing::warn!(target: "lineal::js", line = ctx.index, ?err, "renderer threw");
                LineContent::Text(text.to_owned())
            }
        }
    })
}

fn content_from_js(text: &str, value: JsValue) -> LineContent {
    if let Some(rendered) = value.as_string() {
        return LineContent::Text(rendered);
    }
    if value.is_undefined() || value.is_null() {
        return LineContent::Text(text.to_owned());
    }
    match serde_wasm_bindgen::from_value::<Vec<JsRenderNode>>(value) {
        Ok(nodes) => LineContent::Nodes(nodes.into_iter().map(Into::into).collect()),
        Err(err) => {
            tracing::warn!(target: "lineal::js", %err, "renderer returned invalid nodes");
            LineContent::Text(text.to_owned())
        }
    }
}
