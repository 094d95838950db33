//! Plugin trait, factory registry and editor association.
//!
//! A plugin belongs to exactly one editor. The association is explicit:
//! hosts hand the plugin to a specific editor (directly, or by `EditorId`
//! through a `PluginBus`). There is no discovery through the DOM.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use smol_str::SmolStr;

use crate::actions::InputEvent;
use crate::editor::{Editor, EditorId, EditorOps};
use crate::error::EditorError;
use crate::platform::{RenderSurface, SelectionPort};
use crate::plugins::{BasicEdit, HintOverlay};

/// A behavior unit attached to one editor.
///
/// Plugins only reach the editor through [`EditorOps`].
pub trait Plugin {
    /// Registry name, e.g. `"basic-edit"`.
    fn name(&self) -> &str;

    /// Called once when attached, before the plugin starts receiving events.
    /// An error aborts the attachment.
    fn mount(&mut self, _editor: &mut dyn EditorOps) -> Result<(), EditorError> {
        Ok(())
    }

    /// Offered every `beforeinput`. Return `true` to stop later plugins
    /// from seeing the event.
    fn before_input(
        &mut self,
        _editor: &mut dyn EditorOps,
        _event: &InputEvent,
    ) -> Result<bool, EditorError> {
        Ok(false)
    }

    /// The logical selection changed.
    fn selection_changed(&mut self, _editor: &mut dyn EditorOps) -> Result<(), EditorError> {
        Ok(())
    }

    /// A host-facing attribute changed. `None` means removed.
    fn attribute_changed(
        &mut self,
        _editor: &mut dyn EditorOps,
        _name: &str,
        _value: Option<&str>,
    ) -> Result<(), EditorError> {
        Ok(())
    }
}

type PluginFactory = Box<dyn Fn() -> Box<dyn Plugin>>;

/// Name → factory table, filled once at start-up.
#[derive(Default)]
pub struct PluginRegistry {
    factories: HashMap<SmolStr, PluginFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with `basic-edit` and `plain-text` defined.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(BasicEdit::NAME, || Box::new(BasicEdit::new()));
        registry.insert(HintOverlay::NAME, || Box::new(HintOverlay::new()));
        registry
    }

    /// Define a plugin. A name can only be defined once.
    pub fn define<F>(&mut self, name: &str, factory: F) -> Result<(), EditorError>
    where
        F: Fn() -> Box<dyn Plugin> + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(EditorError::DuplicateRegistration(SmolStr::new(name)));
        }
        self.insert(name, factory);
        Ok(())
    }

    /// Instantiate the plugin registered as `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Plugin>, EditorError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| EditorError::UnknownPlugin(SmolStr::new(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<SmolStr> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    fn insert<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Plugin> + 'static,
    {
        tracing::debug!(target: "lineal::plugin", name, "defining plugin");
        self.factories.insert(SmolStr::new(name), Box::new(factory));
    }
}

/// Editors by id, for attaching plugins from outside the editor's owner.
///
/// Holds weak handles: a dropped editor simply stops resolving.
pub struct PluginBus<S> {
    editors: HashMap<EditorId, Weak<RefCell<Editor<S>>>>,
}

impl<S> Default for PluginBus<S> {
    fn default() -> Self {
        Self {
            editors: HashMap::new(),
        }
    }
}

impl<S: RenderSurface + SelectionPort> PluginBus<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: EditorId, editor: &Rc<RefCell<Editor<S>>>) {
        tracing::debug!(target: "lineal::plugin", %id, "registering editor");
        self.editors.insert(id, Rc::downgrade(editor));
    }

    pub fn unregister(&mut self, id: EditorId) -> bool {
        self.editors.remove(&id).is_some()
    }

    /// The live editor registered under `id`.
    pub fn resolve(&self, id: EditorId) -> Option<Rc<RefCell<Editor<S>>>> {
        self.editors.get(&id).and_then(Weak::upgrade)
    }

    /// Attach `plugin` to the editor registered under `id`.
    ///
    /// Fails with `NoOwningEditor` if no live editor has that id. Nothing is
    /// attached on failure.
    pub fn attach(&self, id: EditorId, plugin: Box<dyn Plugin>) -> Result<(), EditorError> {
        let Some(editor) = self.resolve(id) else {
            tracing::error!(target: "lineal::plugin", %id, plugin = plugin.name(), "no owning editor");
            return Err(EditorError::NoOwningEditor(id));
        };
        let mut editor = editor.try_borrow_mut().map_err(|_| EditorError::Busy(id))?;
        editor.attach(plugin)
    }

    /// Forget editors that have been dropped.
    pub fn prune(&mut self) {
        self.editors.retain(|_, editor| editor.strong_count() > 0);
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}
