//! Stylesheet and class names for the mounted editor.
//!
//! Every mount gets its own `<style>` element inside the wrapper, scoped by
//! the `lineal` class so several editors can share a page.

/// Wrapper around gutter and editor.
pub const WRAPPER_CLASS: &str = "lineal container";
pub const GUTTER_CLASS: &str = "gutter";
pub const GUTTER_CONTENT_CLASS: &str = "gutter-content";
pub const EDITOR_CLASS: &str = "editor";
/// Line node class. Line nodes are the only children of the editor element.
pub const LINE_CLASS: &str = "line";
/// Toggled on the editor element for soft wrapping.
pub const WRAP_CLASS: &str = "wrap";

/// Attribute holding the buffer line id of a line node.
pub const LINE_ID_ATTR: &str = "data-line-id";
/// Attribute holding the hex content hash of a line node.
pub const HASH_ATTR: &str = "data-hash";

pub const EDITOR_CSS: &str = r#"
.lineal.container {
  display: flex;
  width: 100%;
  height: 100%;
  background: #eee;
}

.lineal .gutter {
  flex-grow: 0;
  flex-shrink: 0;
  position: relative;
  width: 20px;
  background: #ccc;
  overflow: hidden;
}

.lineal .gutter-content {
  padding: 0;
  padding-right: 5px;
  text-align: right;
  margin: 0;
  width: 15px;
  position: absolute;
}

.lineal .editor {
  padding: 0;
  margin: 0;
  flex-grow: 1;
  outline: 0;
  overflow-x: auto;
  overflow-y: auto;
}

.lineal .editor.wrap {
  word-wrap: break-word;
  white-space: pre-wrap;
  overflow-x: hidden;
  overflow-y: auto;
}

.lineal .hint {
  color: blue;
  display: inline;
  user-select: none;
}

.lineal .line-warning {
  user-select: none;
  padding: 5px;
  margin: 2px;
  font-size: 10px;
  color: white;
  background: red;
  border-radius: 4px;
}
"#;
