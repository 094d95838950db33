//! DOM listeners feeding a mounted editor.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::{EventListener, EventListenerOptions};
use lineal_editor_core::{BeforeInputResult, Editor, EditorOps, SurfaceError};
use wasm_bindgen::JsCast;

use crate::events::{input_event_from_dom, is_composing};
use crate::surface::BrowserSurface;

/// The listeners installed for one editor. Dropping this removes them.
///
/// Handlers hold the editor weakly, so the listeners never keep a
/// discarded editor alive.
pub struct EditorListeners {
    _selection: EventListener,
    _before_input: EventListener,
    _scroll: EventListener,
}

impl EditorListeners {
    pub fn install(editor: &Rc<RefCell<Editor<BrowserSurface>>>) -> Result<Self, SurfaceError> {
        let (document, root) = {
            let editor = editor
                .try_borrow()
                .map_err(|_| SurfaceError::from("editor is busy"))?;
            let root = editor.surface().root().clone();
            let document = root
                .owner_document()
                .ok_or_else(|| SurfaceError::from("editor root has no owner document"))?;
            (document, root)
        };

        let weak = Rc::downgrade(editor);
        let selection = EventListener::new(&document, "selectionchange", move |_| {
            with_editor(&weak, "selectionchange", |editor| {
                editor.handle_selection_change();
            });
        });

        let weak = Rc::downgrade(editor);
        let before_input = EventListener::new_with_options(
            &root,
            "beforeinput",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(input) = event.dyn_ref::<web_sys::InputEvent>() else {
                    event.prevent_default();
                    return;
                };
                let result = if is_composing(input) {
                    tracing::debug!(target: "lineal::browser", "composition input passed through");
                    BeforeInputResult::PassThrough
                } else {
                    let input = input_event_from_dom(input);
                    with_editor(&weak, "beforeinput", |editor| editor.handle_before_input(&input))
                        .unwrap_or(BeforeInputResult::Handled)
                };
                // Native mutations never reach the DOM; the buffer is the
                // source of truth.
                if result == BeforeInputResult::Handled {
                    event.prevent_default();
                }
            },
        );

        let weak = Rc::downgrade(editor);
        let scroll = EventListener::new(&root, "scroll", move |_| {
            with_editor(&weak, "scroll", |editor| editor.surface().sync_gutter_scroll());
        });

        tracing::debug!(target: "lineal::browser", id = %editor.borrow().id(), "listeners installed");
        Ok(Self {
            _selection: selection,
            _before_input: before_input,
            _scroll: scroll,
        })
    }
}

/// Run `f` on the editor unless it is gone or already borrowed.
///
/// Selection changes fire synchronously while the editor writes the native
/// selection itself; those re-entrant events are skipped.
fn with_editor<R>(
    editor: &Weak<RefCell<Editor<BrowserSurface>>>,
    event: &str,
    f: impl FnOnce(&mut Editor<BrowserSurface>) -> R,
) -> Option<R> {
    let editor = editor.upgrade()?;
    match editor.try_borrow_mut() {
        Ok(mut editor) => Some(f(&mut editor)),
        Err(_) => {
            tracing::trace!(target: "lineal::browser", event, "editor busy, skipping");
            None
        }
    }
}
