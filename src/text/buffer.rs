use super::position::{Position, Range};
use crate::error::{HighlightError, HighlightResult};

/// Compute line start offsets for efficient position mapping
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut line_starts = vec![0];
    let mut offset = 0;

    for ch in text.chars() {
        offset += ch.len_utf8();
        if ch == '\n' {
            line_starts.push(offset);
        }
    }

    line_starts
}

/// A text replacement applied to a [`TextBuffer`].
///
/// `old_range` is expressed in the coordinates of the buffer before the change,
/// `new_range` in the coordinates after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub old_range: Range,
    pub new_range: Range,
    pub old_text: String,
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
}

impl TextChange {
    /// Convert to the tree-sitter edit descriptor
    pub fn input_edit(&self) -> tree_sitter::InputEdit {
        tree_sitter::InputEdit {
            start_byte: self.start_byte,
            old_end_byte: self.old_end_byte,
            new_end_byte: self.new_end_byte,
            start_position: self.old_range.start.into(),
            old_end_position: self.old_range.end.into(),
            new_end_position: self.new_range.end.into(),
        }
    }
}

/// Owned document text with a line table.
///
/// Columns are byte offsets within a row. A trailing `\n` starts a new, empty row.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    line_starts: Vec<usize>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position just past the last character
    pub fn end_position(&self) -> Position {
        let last_row = self.line_count() - 1;
        Position::new(last_row, self.line_length_for_row(last_row))
    }

    /// Whole-buffer range
    pub fn range(&self) -> Range {
        Range::new(Position::ZERO, self.end_position())
    }

    /// Length of `row` in bytes, excluding its line terminator. Rows past the
    /// end have length 0.
    pub fn line_length_for_row(&self, row: usize) -> usize {
        self.line_for_row(row).map(str::len).unwrap_or(0)
    }

    /// Text of `row` without its line terminator
    pub fn line_for_row(&self, row: usize) -> Option<&str> {
        let start = *self.line_starts.get(row)?;
        let end = match self.line_starts.get(row + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        };
        let line = &self.text[start..end];
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// Clamp a position to the nearest valid location in the buffer
    pub fn clip_position(&self, position: Position) -> Position {
        let last_row = self.line_count() - 1;
        if position.row > last_row {
            return self.end_position();
        }
        let mut column = position.column.min(self.line_length_for_row(position.row));
        if let Some(line) = self.line_for_row(position.row) {
            while column > 0 && !line.is_char_boundary(column) {
                column -= 1;
            }
        }
        Position::new(position.row, column)
    }

    /// Byte offset of a position, or `None` if it lies outside the buffer
    pub fn byte_offset(&self, position: Position) -> Option<usize> {
        let line_start = *self.line_starts.get(position.row)?;
        if position.column > self.line_length_for_row(position.row) {
            return None;
        }
        let offset = line_start + position.column;
        self.text.is_char_boundary(offset).then_some(offset)
    }

    /// Position of a byte offset (clamped to the buffer end)
    pub fn position_for_byte(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let row = match self.line_starts.binary_search(&offset) {
            Ok(row) => row,
            Err(row) => row.saturating_sub(1),
        };
        Position::new(row, offset - self.line_starts[row])
    }

    /// Replace `range` with `new_text`.
    ///
    /// Fails with a contract violation when the range is inverted or lies
    /// outside the buffer; the buffer is left unchanged in that case.
    pub fn apply_change(&mut self, range: Range, new_text: &str) -> HighlightResult<TextChange> {
        if range.start > range.end {
            return Err(HighlightError::contract_violation(format!(
                "edit range {range} is inverted"
            )));
        }
        let start_byte = self.byte_offset(range.start).ok_or_else(|| {
            HighlightError::contract_violation(format!(
                "edit start {} lies outside the buffer",
                range.start
            ))
        })?;
        let old_end_byte = self.byte_offset(range.end).ok_or_else(|| {
            HighlightError::contract_violation(format!(
                "edit end {} lies outside the buffer",
                range.end
            ))
        })?;

        let old_text = self.text[start_byte..old_end_byte].to_string();
        self.text.replace_range(start_byte..old_end_byte, new_text);
        self.line_starts = compute_line_starts(&self.text);

        let new_end_byte = start_byte + new_text.len();
        let new_end = self.position_for_byte(new_end_byte);

        Ok(TextChange {
            old_range: range,
            new_range: Range::new(range.start, new_end),
            old_text,
            start_byte,
            old_end_byte,
            new_end_byte,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_lengths_ignore_terminators() {
        let buffer = TextBuffer::new("fn main() {\r\n    x\n}");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line_length_for_row(0), 11);
        assert_eq!(buffer.line_length_for_row(1), 5);
        assert_eq!(buffer.line_length_for_row(2), 1);
        assert_eq!(buffer.line_length_for_row(9), 0);
    }

    #[test]
    fn test_clip_position_clamps_row_and_column() {
        let buffer = TextBuffer::new("abc\nde");
        assert_eq!(buffer.clip_position(Position::new(0, 10)), Position::new(0, 3));
        assert_eq!(buffer.clip_position(Position::new(5, 0)), Position::new(1, 2));
    }

    #[test]
    fn test_clip_position_respects_char_boundaries() {
        let buffer = TextBuffer::new("あい");
        // Column 4 falls inside the second hiragana (bytes 3..6)
        assert_eq!(buffer.clip_position(Position::new(0, 4)), Position::new(0, 3));
    }

    #[test]
    fn test_byte_offset_and_back() {
        let buffer = TextBuffer::new("let x = 1;\nx;\n");
        assert_eq!(buffer.byte_offset(Position::new(1, 1)), Some(12));
        assert_eq!(buffer.position_for_byte(12), Position::new(1, 1));
        assert_eq!(buffer.byte_offset(Position::new(1, 9)), None);
    }

    #[test]
    fn test_apply_change_reports_old_and_new_ranges() {
        let mut buffer = TextBuffer::new("let x = 1;\nx;\n");
        let change = buffer
            .apply_change(Range::new(Position::new(0, 4), Position::new(0, 5)), "value\nmore")
            .unwrap();

        assert_eq!(buffer.text(), "let value\nmore = 1;\nx;\n");
        assert_eq!(change.old_text, "x");
        assert_eq!(change.start_byte, 4);
        assert_eq!(change.old_end_byte, 5);
        assert_eq!(change.new_end_byte, 14);
        assert_eq!(change.new_range.end, Position::new(1, 4));

        let edit = change.input_edit();
        assert_eq!(edit.old_end_position, tree_sitter::Point::new(0, 5));
        assert_eq!(edit.new_end_position, tree_sitter::Point::new(1, 4));
    }

    #[test]
    fn test_apply_change_rejects_out_of_bounds() {
        let mut buffer = TextBuffer::new("abc");
        let result = buffer.apply_change(Range::new(Position::new(0, 1), Position::new(3, 0)), "");
        assert!(matches!(
            result,
            Err(HighlightError::ContractViolation { .. })
        ));
        assert_eq!(buffer.text(), "abc");
    }
}
