//! Core types used throughout the project.

use tower_lsp::lsp_types;

/// A range in a document, in LSP coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, salsa::Update)]
pub struct SourceRange {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl From<lsp_types::Range> for SourceRange {
    fn from(range: lsp_types::Range) -> Self {
        Self { start: range.start.into(), end: range.end.into() }
    }
}

impl From<SourceRange> for lsp_types::Range {
    fn from(range: SourceRange) -> Self {
        Self { start: range.start.into(), end: range.end.into() }
    }
}

/// A position in a document (0-indexed line, UTF-16 character offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, salsa::Update)]
pub struct SourcePosition {
    pub line: u32,
    pub character: u32,
}

impl From<lsp_types::Position> for SourcePosition {
    fn from(position: lsp_types::Position) -> Self {
        Self { line: position.line, character: position.character }
    }
}

impl From<SourcePosition> for lsp_types::Position {
    fn from(position: SourcePosition) -> Self {
        Self { line: position.line, character: position.character }
    }
}

impl SourceRange {
    /// Checks if a position is within this range.
    #[must_use]
    pub const fn contains(&self, position: SourcePosition) -> bool {
        if position.line < self.start.line {
            return false;
        }
        if position.line == self.start.line && position.character < self.start.character {
            return false;
        }
        if position.line > self.end.line {
            return false;
        }
        if position.line == self.end.line && position.character > self.end.character {
            return false;
        }
        true
    }
}

/// Half-open byte range `[start, end)` into a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, salsa::Update)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Converts between byte offsets and LSP positions for one text.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset of the first character of every line.
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    /// Position of a byte offset. Offsets past the end clamp to the end.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn position(&self, offset: usize) -> SourcePosition {
        let offset = offset.min(self.text.len());
        let line = self.line_starts.partition_point(|&start| start <= offset).saturating_sub(1);
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let character = self
            .text
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().map(char::len_utf16).sum::<usize>());
        SourcePosition { line: line as u32, character: character as u32 }
    }

    /// Byte offset of a position, or `None` if the line does not exist.
    #[must_use]
    pub fn offset(&self, position: SourcePosition) -> Option<usize> {
        let line_start = *self.line_starts.get(position.line as usize)?;
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .map_or(self.text.len(), |next| next.saturating_sub(1));
        let line = self.text.get(line_start..line_end)?;
        let line = line.strip_suffix('\r').unwrap_or(line);

        let mut units = 0usize;
        for (index, ch) in line.char_indices() {
            if units >= position.character as usize {
                return Some(line_start + index);
            }
            units += ch.len_utf16();
        }
        Some(line_start + line.len())
    }

    #[must_use]
    pub fn range(&self, span: ByteSpan) -> SourceRange {
        SourceRange { start: self.position(span.start), end: self.position(span.end) }
    }

    /// Range covering the whole text.
    #[must_use]
    pub fn full_range(&self) -> SourceRange {
        self.range(ByteSpan::new(0, self.text.len()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    const fn pos(line: u32, character: u32) -> SourcePosition {
        SourcePosition { line, character }
    }

    const fn range(start_line: u32, start_char: u32, end_line: u32, end_char: u32) -> SourceRange {
        SourceRange { start: pos(start_line, start_char), end: pos(end_line, end_char) }
    }

    #[rstest]
    #[case::before_start_line(pos(0, 5), range(1, 5, 2, 10), false)]
    #[case::before_start_char(pos(1, 4), range(1, 5, 2, 10), false)]
    #[case::at_start(pos(1, 5), range(1, 5, 2, 10), true)]
    #[case::middle_line(pos(1, 10), range(1, 5, 2, 10), true)]
    #[case::at_end(pos(2, 10), range(1, 5, 2, 10), true)]
    #[case::after_end_char(pos(2, 11), range(1, 5, 2, 10), false)]
    #[case::after_end_line(pos(3, 0), range(1, 5, 2, 10), false)]
    fn test_contains(
        #[case] position: SourcePosition,
        #[case] range: SourceRange,
        #[case] expected: bool,
    ) {
        assert_that!(range.contains(position), eq(expected));
    }

    #[rstest]
    #[case::start(0, pos(0, 0))]
    #[case::first_line(3, pos(0, 3))]
    #[case::newline_char(5, pos(0, 5))]
    #[case::second_line_start(6, pos(1, 0))]
    #[case::past_end(100, pos(2, 3))]
    fn test_line_index_position(#[case] offset: usize, #[case] expected: SourcePosition) {
        let index = LineIndex::new("hello\nworld\nabc");
        assert_that!(index.position(offset), eq(expected));
    }

    #[googletest::test]
    fn test_line_index_counts_utf16_units() {
        // "æ" is 2 bytes / 1 UTF-16 unit, "𝄞" is 4 bytes / 2 UTF-16 units
        let text = "æ𝄞x";
        let index = LineIndex::new(text);

        expect_that!(index.position(2), eq(pos(0, 1)));
        expect_that!(index.position(6), eq(pos(0, 3)));
        expect_that!(index.offset(pos(0, 3)), some(eq(6)));
    }

    #[googletest::test]
    fn test_line_index_offset_round_trip() {
        let text = "<TS>\n  <context>\n</TS>";
        let index = LineIndex::new(text);

        for offset in [0, 4, 5, 7, 16, 17, text.len()] {
            expect_that!(index.offset(index.position(offset)), some(eq(offset)));
        }
        expect_that!(index.offset(pos(9, 0)), none());
    }

    #[rstest]
    #[case::inside(pos(0, 1), 1)]
    #[case::past_line_end(pos(0, 10), 2)]
    #[case::last_line(pos(1, 5), 6)]
    fn test_line_index_offset_on_crlf(#[case] position: SourcePosition, #[case] expected: usize) {
        let index = LineIndex::new("ab\r\ncd");
        assert_eq!(index.offset(position), Some(expected));
    }
}
