//! Logical coordinates and DOM points.

/// A `(line, column)` position in the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LogicalPosition {
    pub line: usize,
    pub col: usize,
}

impl LogicalPosition {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Logical selection derived from the native selection.
///
/// The start comes from the anchor side and the end from the focus side.
/// No ordering is imposed: the start may come after the end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LogicalSelection {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl LogicalSelection {
    pub fn new(start: LogicalPosition, end: LogicalPosition) -> Self {
        Self {
            start_line: start.line,
            start_col: start.col,
            end_line: end.line,
            end_col: end.col,
        }
    }

    /// A collapsed selection (caret).
    pub fn caret(line: usize, col: usize) -> Self {
        Self::new(LogicalPosition::new(line, col), LogicalPosition::new(line, col))
    }

    pub fn start(&self) -> LogicalPosition {
        LogicalPosition::new(self.start_line, self.start_col)
    }

    pub fn end(&self) -> LogicalPosition {
        LogicalPosition::new(self.end_line, self.end_col)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start_line == self.end_line && self.start_col == self.end_col
    }
}

/// A native selection endpoint: a node and an offset within it.
///
/// For text nodes the offset is in the surface's native units (UTF-16 in a
/// browser); for elements it is a child index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomPoint<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> DomPoint<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}
