//! The editor: buffer, surface, renderer, selection and plugins.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::actions::{BeforeInputResult, InputEvent, InputType};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::platform::{RenderSurface, SelectionPort};
use crate::plugin::Plugin;
use crate::reconcile::{ReconcileStats, reconcile_lines};
use crate::render::LineRenderer;
use crate::selection::SelectionTracker;
use crate::text::LineBuffer;
use crate::types::{LogicalPosition, LogicalSelection};

/// Upper bound on selection notification rounds per flush.
///
/// Plugins may move the selection from inside `selection_changed`, which
/// queues another round.
const MAX_NOTIFY_ROUNDS: usize = 8;

static NEXT_EDITOR_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique editor handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(u64);

impl EditorId {
    fn next() -> Self {
        Self(NEXT_EDITOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lineal-{}", self.0)
    }
}

impl FromStr for EditorId {
    type Err = std::num::ParseIntError;

    /// Accepts both `lineal-7` and `7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("lineal-").unwrap_or(s).parse().map(Self)
    }
}

/// The editor's public operation surface.
///
/// This is everything plugins and hosts may do to an editor. Buffer
/// operations rebuild the line nodes before returning.
pub trait EditorOps {
    fn id(&self) -> EditorId;

    /// The cached logical selection.
    fn get_selection(&self) -> Option<LogicalSelection>;

    /// Select from `(line, col)` to `end`, or place a caret if `end` is `None`.
    fn set_selection(
        &mut self,
        line: usize,
        col: usize,
        end: Option<LogicalPosition>,
    ) -> Result<(), EditorError>;

    /// Re-apply the cached selection to the surface.
    fn reselect(&mut self) -> Result<(), EditorError>;

    fn insert_text(&mut self, line: usize, col: usize, text: &str) -> Result<(), EditorError>;

    fn remove_text(
        &mut self,
        y1: usize,
        x1: usize,
        y2: usize,
        x2: usize,
    ) -> Result<(), EditorError>;

    fn remove_line(&mut self, y: usize) -> Result<(), EditorError>;

    fn new_line(&mut self, y: usize) -> Result<(), EditorError>;

    fn line_content(&self, y: usize) -> Option<&str>;

    fn line_count(&self) -> usize;

    /// Install (or clear) the line renderer and rebuild.
    fn set_renderer(&mut self, renderer: Option<Box<dyn LineRenderer>>) -> Result<(), EditorError>;

    /// Reconcile line nodes with the buffer.
    fn build_lines(&mut self) -> Result<ReconcileStats, EditorError>;
}

type SelectCallback = Box<dyn FnMut(&LogicalSelection)>;

/// A line editor over a rendering surface `S`.
pub struct Editor<S> {
    id: EditorId,
    config: EditorConfig,
    buffer: LineBuffer,
    surface: S,
    renderer: Option<Box<dyn LineRenderer>>,
    tracker: SelectionTracker,
    plugins: Vec<Box<dyn Plugin>>,
    on_select_change: Option<SelectCallback>,
    notify_pending: bool,
    dispatching: bool,
}

impl<S: RenderSurface + SelectionPort> Editor<S> {
    /// Create an editor holding `text` and render it onto `surface`.
    pub fn new(mut surface: S, config: EditorConfig, text: &str) -> Result<Self, EditorError> {
        surface.set_wrap(config.wrap)?;
        let mut editor = Self {
            id: EditorId::next(),
            config,
            buffer: LineBuffer::from_text(text),
            surface,
            renderer: None,
            tracker: SelectionTracker::new(),
            plugins: Vec::new(),
            on_select_change: None,
            notify_pending: false,
            dispatching: false,
        };
        editor.build_lines()?;
        tracing::debug!(target: "lineal::editor", id = %editor.id, lines = editor.buffer.len_lines(), "editor created");
        Ok(editor)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Full document text.
    pub fn value(&self) -> String {
        self.buffer.text()
    }

    /// Replace the document and rebuild.
    pub fn set_value(&mut self, text: &str) -> Result<(), EditorError> {
        self.buffer.set_text(text);
        self.build_lines()?;
        Ok(())
    }

    pub fn wrap(&self) -> bool {
        self.config.wrap
    }

    pub fn set_wrap(&mut self, wrap: bool) -> Result<(), EditorError> {
        self.config.wrap = wrap;
        self.surface.set_wrap(wrap)?;
        self.build_lines()?;
        Ok(())
    }

    /// Called on every genuine selection change, before plugins are told.
    pub fn on_select_change(&mut self, callback: impl FnMut(&LogicalSelection) + 'static) {
        self.on_select_change = Some(Box::new(callback));
    }

    /// Mount `plugin` and start dispatching to it.
    ///
    /// If mounting fails the plugin is dropped and nothing is attached.
    pub fn attach(&mut self, mut plugin: Box<dyn Plugin>) -> Result<(), EditorError> {
        plugin.mount(self)?;
        tracing::debug!(target: "lineal::editor", id = %self.id, plugin = plugin.name(), "plugin attached");
        self.plugins.push(plugin);
        self.flush_notifications();
        Ok(())
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Forward an attribute change to the first attached plugin named `plugin`.
    pub fn set_plugin_attribute(
        &mut self,
        plugin: &str,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), EditorError> {
        let index = self
            .plugins
            .iter()
            .position(|p| p.name() == plugin)
            .ok_or_else(|| EditorError::NotAttached(plugin.into()))?;
        let result = self.with_plugins(|editor, plugins| {
            plugins[index].attribute_changed(editor, name, value)
        });
        self.flush_notifications();
        result
    }

    /// Handle a native pre-mutation edit notification.
    ///
    /// Plugins see the event in attachment order until one consumes it, and
    /// the native mutation is cancelled. Composition input is not handled
    /// and passes through untouched; the next build repairs its line.
    pub fn handle_before_input(&mut self, event: &InputEvent) -> BeforeInputResult {
        tracing::debug!(target: "lineal::editor", input_type = ?event.input_type, "beforeinput");
        if event.input_type == InputType::InsertCompositionText {
            return BeforeInputResult::PassThrough;
        }
        self.with_plugins(|editor, plugins| {
            for plugin in plugins.iter_mut() {
                match plugin.before_input(editor, event) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(err) => {
                        tracing::warn!(target: "lineal::editor", plugin = plugin.name(), %err, "before_input failed");
                    }
                }
            }
        });
        self.flush_notifications();
        BeforeInputResult::Handled
    }

    /// Re-read the native selection. Returns `true` on a genuine change.
    pub fn handle_selection_change(&mut self) -> bool {
        let Some(selection) = self.surface.read() else {
            return false;
        };
        let changed = self.observe(selection);
        if changed {
            self.flush_notifications();
        }
        changed
    }

    fn observe(&mut self, selection: LogicalSelection) -> bool {
        let changed = self.tracker.observe(selection);
        if changed {
            tracing::trace!(target: "lineal::editor", ?selection, "selection changed");
            self.notify_pending = true;
        }
        changed
    }

    /// Run `f` with the plugin list taken out of the editor.
    ///
    /// Plugins attached while `f` runs are kept, after the existing ones.
    fn with_plugins<R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut Vec<Box<dyn Plugin>>) -> R,
    ) -> R {
        let mut plugins = std::mem::take(&mut self.plugins);
        let was_dispatching = std::mem::replace(&mut self.dispatching, true);
        let result = f(self, &mut plugins);
        self.dispatching = was_dispatching;
        plugins.append(&mut self.plugins);
        self.plugins = plugins;
        result
    }

    fn flush_notifications(&mut self) {
        if self.dispatching {
            return;
        }
        let mut rounds = 0;
        while self.notify_pending && rounds < MAX_NOTIFY_ROUNDS {
            self.notify_pending = false;
            rounds += 1;
            let Some(selection) = self.tracker.get() else {
                break;
            };
            if let Some(callback) = self.on_select_change.as_mut() {
                callback(&selection);
            }
            self.with_plugins(|editor, plugins| {
                for plugin in plugins.iter_mut() {
                    if let Err(err) = plugin.selection_changed(editor) {
                        tracing::warn!(target: "lineal::editor", plugin = plugin.name(), %err, "selection_changed failed");
                    }
                }
            });
        }
        if self.notify_pending {
            tracing::warn!(target: "lineal::editor", "selection notifications did not settle");
            self.notify_pending = false;
        }
    }
}

impl<S: RenderSurface + SelectionPort> EditorOps for Editor<S> {
    fn id(&self) -> EditorId {
        self.id
    }

    fn get_selection(&self) -> Option<LogicalSelection> {
        self.tracker.get()
    }

    fn set_selection(
        &mut self,
        line: usize,
        col: usize,
        end: Option<LogicalPosition>,
    ) -> Result<(), EditorError> {
        let start = LogicalPosition::new(line, col);
        let requested = LogicalSelection::new(start, end.unwrap_or(start));
        self.surface.write(&requested)?;
        // Observe now so reads see it before the native notification arrives.
        let observed = self.surface.read().unwrap_or(requested);
        self.observe(observed);
        self.flush_notifications();
        Ok(())
    }

    fn reselect(&mut self) -> Result<(), EditorError> {
        if let Some(selection) = self.tracker.get() {
            self.surface.write(&selection)?;
        }
        Ok(())
    }

    fn insert_text(&mut self, line: usize, col: usize, text: &str) -> Result<(), EditorError> {
        self.buffer.insert_text(line, col, text);
        self.build_lines()?;
        Ok(())
    }

    fn remove_text(
        &mut self,
        y1: usize,
        x1: usize,
        y2: usize,
        x2: usize,
    ) -> Result<(), EditorError> {
        self.buffer.remove_text(y1, x1, y2, x2);
        self.build_lines()?;
        Ok(())
    }

    fn remove_line(&mut self, y: usize) -> Result<(), EditorError> {
        self.buffer.remove_line(y);
        self.build_lines()?;
        Ok(())
    }

    fn new_line(&mut self, y: usize) -> Result<(), EditorError> {
        self.buffer.new_line(y);
        self.build_lines()?;
        Ok(())
    }

    fn line_content(&self, y: usize) -> Option<&str> {
        self.buffer.line(y)
    }

    fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    fn set_renderer(&mut self, renderer: Option<Box<dyn LineRenderer>>) -> Result<(), EditorError> {
        self.renderer = renderer;
        self.build_lines()?;
        Ok(())
    }

    fn build_lines(&mut self) -> Result<ReconcileStats, EditorError> {
        let stats = reconcile_lines(
            &mut self.surface,
            &self.buffer,
            self.renderer.as_deref(),
            self.tracker.get(),
        )?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::memory::MemoryDom;
    use crate::platform::DomTree;
    use crate::plugins::BasicEdit;
    use crate::render::{LineContent, LineContext};
    use crate::types::DomPoint;

    fn new_editor(text: &str) -> Editor<MemoryDom> {
        let mut editor = Editor::new(MemoryDom::new(), EditorConfig::default(), text).unwrap();
        editor.attach(Box::new(BasicEdit::new())).unwrap();
        editor
    }

    fn lines(editor: &Editor<MemoryDom>) -> Vec<String> {
        editor.surface().line_texts()
    }

    #[test]
    fn test_value_round_trip() {
        let mut editor = new_editor("abc\ndef");
        assert_eq!(editor.value(), "abc\ndef");
        editor.set_value("x\n\ny").unwrap();
        assert_eq!(editor.line_count(), 3);
        assert_eq!(lines(&editor), vec!["x", "", "y"]);
    }

    #[test]
    fn test_set_selection_is_visible_immediately() {
        let mut editor = new_editor("abc\n\nhéllo");
        for (line, len) in [(0, 3), (1, 0), (2, 5)] {
            for col in 0..=len {
                editor.set_selection(line, col, None).unwrap();
                assert_eq!(editor.get_selection(), Some(LogicalSelection::caret(line, col)));
            }
        }
    }

    #[test]
    fn test_insert_text_scenario() {
        let mut editor = new_editor("abc\ndef");
        editor.insert_text(0, 3, " xyz").unwrap();
        assert_eq!(lines(&editor), vec!["abc xyz", "def"]);
    }

    #[test]
    fn test_typing_moves_caret_by_chars() {
        let mut editor = new_editor("ac");
        editor.set_selection(0, 1, None).unwrap();
        editor.handle_before_input(&InputEvent::insert_text("bé"));
        assert_eq!(editor.value(), "abéc");
        assert_eq!(editor.get_selection(), Some(LogicalSelection::caret(0, 3)));
    }

    #[test]
    fn test_backspace_within_line() {
        let mut editor = new_editor("abc");
        editor.set_selection(0, 2, None).unwrap();
        assert_eq!(
            editor.handle_before_input(&InputEvent::delete_backward()),
            BeforeInputResult::Handled
        );
        assert_eq!(editor.value(), "ac");
        assert_eq!(editor.get_selection(), Some(LogicalSelection::caret(0, 1)));
    }

    #[test]
    fn test_backspace_merges_lines() {
        let mut editor = new_editor("ab\ncd");
        editor.set_selection(1, 0, None).unwrap();
        editor.handle_before_input(&InputEvent::delete_backward());
        assert_eq!(lines(&editor), vec!["abcd"]);
        assert_eq!(editor.get_selection(), Some(LogicalSelection::caret(0, 2)));
    }

    #[test]
    fn test_backspace_at_document_start_is_noop() {
        let mut editor = new_editor("ab");
        editor.set_selection(0, 0, None).unwrap();
        editor.handle_before_input(&InputEvent::delete_backward());
        assert_eq!(editor.value(), "ab");
        assert_eq!(editor.get_selection(), Some(LogicalSelection::caret(0, 0)));
    }

    #[test]
    fn test_paragraph_does_not_split() {
        let mut editor = new_editor("a");
        editor.set_selection(0, 1, None).unwrap();
        editor.handle_before_input(&InputEvent::paragraph());
        assert_eq!(lines(&editor), vec!["a", ""]);
        assert_eq!(editor.get_selection(), Some(LogicalSelection::caret(1, 0)));

        // Mid-line: the tail stays on the original line.
        let mut editor = new_editor("abc");
        editor.set_selection(0, 1, None).unwrap();
        editor.handle_before_input(&InputEvent::paragraph());
        assert_eq!(lines(&editor), vec!["abc", ""]);
    }

    #[test]
    fn test_unhandled_input_is_still_cancelled() {
        let mut editor = new_editor("abc");
        editor.set_selection(0, 1, None).unwrap();
        let event = InputEvent::new(InputType::HistoryUndo, None);
        assert_eq!(editor.handle_before_input(&event), BeforeInputResult::Handled);
        assert_eq!(editor.value(), "abc");
    }

    #[test]
    fn test_removing_last_line_empties_editor() {
        let mut editor = new_editor("only");
        editor.set_selection(0, 2, None).unwrap();
        editor.remove_line(0).unwrap();
        assert_eq!(editor.line_count(), 0);
        assert_eq!(editor.value(), "");
        assert!(editor.surface().line_nodes().is_empty());
        assert_eq!(editor.surface().gutter_dump(), "");

        // Nothing to edit and nothing to select, but nothing fails either.
        editor.reselect().unwrap();
        editor.handle_before_input(&InputEvent::insert_text("x"));
        editor.handle_before_input(&InputEvent::delete_backward());
        assert_eq!(editor.line_count(), 0);

        editor.set_value("back").unwrap();
        assert_eq!(lines(&editor), vec!["back"]);
    }

    #[test]
    fn test_reselect_after_document_shrinks() {
        let mut editor = new_editor("a\nb\nc");
        editor.set_selection(2, 0, None).unwrap();
        editor.set_value("x").unwrap();
        editor.reselect().unwrap();
        // The cached selection is kept; only the native write is skipped.
        assert_eq!(editor.get_selection(), Some(LogicalSelection::caret(2, 0)));
    }

    #[test]
    fn test_composition_passes_through() {
        let mut editor = new_editor("abc");
        editor.set_selection(0, 1, None).unwrap();
        let event = InputEvent::new(InputType::InsertCompositionText, Some("k".into()));
        assert_eq!(editor.handle_before_input(&event), BeforeInputResult::PassThrough);
        assert_eq!(editor.value(), "abc");
    }

    #[test]
    fn test_select_change_fires_once_per_change() {
        let mut editor = new_editor("abc");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        editor.on_select_change(move |sel| sink.borrow_mut().push(*sel));

        editor.set_selection(0, 1, None).unwrap();
        editor.set_selection(0, 1, None).unwrap();
        assert!(!editor.handle_selection_change());
        editor.set_selection(0, 2, None).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![LogicalSelection::caret(0, 1), LogicalSelection::caret(0, 2)]
        );
    }

    #[test]
    fn test_native_selection_change_is_read_back() {
        let mut editor = new_editor("abc\ndef");
        let line = editor.surface().line_nodes()[1];
        let text = editor.surface().children(&line)[0];
        editor
            .surface_mut()
            .set_native_selection(DomPoint::new(text, 2), DomPoint::new(text, 3));
        assert!(editor.handle_selection_change());
        assert_eq!(
            editor.get_selection(),
            Some(LogicalSelection {
                start_line: 1,
                start_col: 2,
                end_line: 1,
                end_col: 3,
            })
        );
    }

    #[test]
    fn test_selection_outside_editor_is_ignored() {
        let mut editor = new_editor("abc");
        editor.surface_mut().clear_native_selection();
        assert!(!editor.handle_selection_change());
        assert_eq!(editor.get_selection(), None);
    }

    #[test]
    fn test_renderer_and_wrap() {
        let mut editor = new_editor("ab\ncd");
        editor
            .set_renderer(Some(Box::new(|text: &str, _: &LineContext| {
                LineContent::Text(text.to_uppercase())
            })))
            .unwrap();
        assert_eq!(lines(&editor), vec!["AB", "CD"]);
        assert_eq!(editor.value(), "ab\ncd");

        editor.set_wrap(true).unwrap();
        assert!(editor.surface().is_wrapped());
        assert!(editor.wrap());
    }

    #[test]
    fn test_build_lines_is_idempotent() {
        let mut editor = new_editor("one\ntwo");
        let stats = editor.build_lines().unwrap();
        assert!(stats.is_noop());
        assert_eq!(editor.line_count(), 2);
        assert_eq!(editor.value(), "one\ntwo");
    }

    #[test]
    fn test_unknown_plugin_attribute() {
        let mut editor = new_editor("abc");
        assert!(matches!(
            editor.set_plugin_attribute("plain-text", "hint", Some("x")),
            Err(EditorError::NotAttached(_))
        ));
    }

    #[test]
    fn test_editor_ids() {
        let a = new_editor("");
        let b = new_editor("");
        assert_ne!(a.id(), b.id());
        let parsed: EditorId = a.id().to_string().parse().unwrap();
        assert_eq!(parsed, a.id());
    }
}
