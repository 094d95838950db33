//! WASM browser tests for lineal-editor-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use lineal_editor_browser::{
    BrowserEditor, BrowserSurface, DomTree, EditorConfig, EditorOps, InputType, LogicalPosition,
    LogicalSelection, RenderSurface, SelectionPort,
};

fn container() -> web_sys::HtmlElement {
    let document = gloo_utils::document();
    let container = document
        .create_element("div")
        .unwrap()
        .dyn_into::<web_sys::HtmlElement>()
        .unwrap();
    document.body().unwrap().append_child(&container).unwrap();
    container
}

fn make_editor(text: &str, config: EditorConfig) -> (web_sys::HtmlElement, BrowserEditor) {
    let container = container();
    let surface = BrowserSurface::mount(&container, &config).unwrap();
    let editor = BrowserEditor::new(surface, config, text).unwrap();
    (container, editor)
}

// === Mounting ===

#[wasm_bindgen_test]
fn test_mount_builds_layout() {
    let (container, editor) = make_editor("abc\n\ndef", EditorConfig::default());
    assert!(container.query_selector(".lineal.container").unwrap().is_some());
    assert!(container.query_selector("pre.editor").unwrap().is_some());
    assert_eq!(editor.surface().root().get_attribute("contenteditable").as_deref(), Some("true"));

    let lines = editor.surface().line_nodes();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].text_content().as_deref(), Some("abc"));
    assert_eq!(lines[1].text_content().as_deref(), Some(""));
    assert_eq!(editor.surface().gutter().unwrap().child_element_count(), 3);
}

#[wasm_bindgen_test]
fn test_mount_without_gutter() {
    let config = EditorConfig {
        gutter: false,
        ..EditorConfig::default()
    };
    let (container, editor) = make_editor("abc", config);
    assert!(editor.surface().gutter().is_none());
    assert!(container.query_selector(".gutter").unwrap().is_none());
}

#[wasm_bindgen_test]
fn test_drop_unmounts() {
    let (container, editor) = make_editor("abc", EditorConfig::default());
    drop(editor);
    assert!(container.query_selector(".lineal").unwrap().is_none());
}

#[wasm_bindgen_test]
fn test_wrap_toggles_class() {
    let (_container, mut editor) = make_editor("abc", EditorConfig::default());
    assert!(!editor.surface().root().class_list().contains("wrap"));
    editor.set_wrap(true).unwrap();
    assert!(editor.surface().root().class_list().contains("wrap"));
}

// === Reconciliation ===

#[wasm_bindgen_test]
fn test_untouched_lines_keep_their_nodes() {
    let (_container, mut editor) = make_editor("one\ntwo\nthree", EditorConfig::default());
    let before = editor.surface().line_nodes();

    editor.insert_text(1, 3, "!").unwrap();
    let after = editor.surface().line_nodes();
    assert_eq!(after.len(), 3);
    assert!(before[0].is_same_node(Some(&after[0])));
    assert!(before[1].is_same_node(Some(&after[1])));
    assert!(before[2].is_same_node(Some(&after[2])));
    assert_eq!(after[1].text_content().as_deref(), Some("two!"));

    editor.new_line(0).unwrap();
    let inserted = editor.surface().line_nodes();
    assert_eq!(inserted.len(), 4);
    assert!(before[0].is_same_node(Some(&inserted[0])));
    assert!(before[1].is_same_node(Some(&inserted[2])));
}

// === Selection ===

#[wasm_bindgen_test]
fn test_selection_round_trip() {
    let (_container, mut editor) = make_editor("abc\ndef", EditorConfig::default());
    editor.surface().root().focus().unwrap();

    editor.set_selection(1, 2, None).unwrap();
    assert_eq!(editor.get_selection(), Some(LogicalSelection::caret(1, 2)));
    assert_eq!(editor.surface().read(), Some(LogicalSelection::caret(1, 2)));
}

#[wasm_bindgen_test]
fn test_range_on_one_line() {
    let (_container, mut editor) = make_editor("abcdef", EditorConfig::default());
    editor
        .set_selection(0, 1, Some(LogicalPosition::new(0, 4)))
        .unwrap();
    let selection = editor.get_selection().unwrap();
    assert_eq!((selection.start_col, selection.end_col), (1, 4));
}

#[wasm_bindgen_test]
fn test_emoji_columns_map_to_utf16() {
    let (_container, mut editor) = make_editor("a😀b", EditorConfig::default());
    editor.set_selection(0, 2, None).unwrap();

    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    // 'a' is one code unit, the emoji two.
    assert_eq!(selection.anchor_offset(), 3);
    assert_eq!(editor.get_selection(), Some(LogicalSelection::caret(0, 2)));

    let text = editor.surface().line_nodes()[0].first_child().unwrap();
    assert_eq!(editor.surface().to_char_offset(&text, 3), 2);
    assert_eq!(editor.surface().text_len(&text), 3);
}

// === Input ===

#[wasm_bindgen_test]
fn test_before_input_edits_buffer() {
    use lineal_editor_browser::{BasicEdit, InputEvent};

    let (_container, mut editor) = make_editor("ab", EditorConfig::default());
    editor.attach(Box::new(BasicEdit::new())).unwrap();
    editor.set_selection(0, 1, None).unwrap();

    editor.handle_before_input(&InputEvent::insert_text("x"));
    assert_eq!(editor.value(), "axb");
    assert_eq!(
        editor.surface().line_nodes()[0].text_content().as_deref(),
        Some("axb")
    );

    editor.handle_before_input(&InputEvent::new(InputType::InsertParagraph, None));
    assert_eq!(editor.line_count(), 2);
}

// === Gutter ===

#[wasm_bindgen_test]
fn test_gutter_follows_line_count() {
    let (_container, mut editor) = make_editor("a", EditorConfig::default());
    editor.new_line(0).unwrap();
    editor.new_line(1).unwrap();
    let gutter = editor.surface().gutter().unwrap();
    assert_eq!(gutter.child_element_count(), 3);
    assert_eq!(gutter.last_element_child().unwrap().text_content().as_deref(), Some("3"));

    editor.remove_line(2).unwrap();
    assert_eq!(editor.surface().gutter().unwrap().child_element_count(), 2);
}
