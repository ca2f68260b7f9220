//! Fold range construction from folds-query nodes.

use tree_sitter::Node;

use crate::text::{Position, Range, TextBuffer};

/// Fold for `node`: from the end of its first row to the start of its last
/// child, so the closing delimiter stays visible.
///
/// Nodes without children, or whose last child starts on the first row, do
/// not fold.
pub fn foldable_range(node: &Node<'_>, buffer: &TextBuffer) -> Option<Range> {
    let last_child = node.child(node.child_count().checked_sub(1)? as _)?;
    let row = node.start_position().row;
    let start = Position::new(row, buffer.line_length_for_row(row));
    let end = Position::from(last_child.start_position());
    (end > start).then(|| Range::new(start, end))
}

/// Whether a fold starting at `column` belongs to indent `level`
pub fn is_at_indent_level(column: usize, level: usize, tab_length: usize) -> bool {
    let min_column = level.saturating_sub(1) * tab_length;
    let max_column = level * tab_length;
    // Level 0 has no lower bound
    (level == 0 || column > min_column) && column <= max_column
}

/// Indentation of `line` in units of `tab_length`.
///
/// Tabs advance to the next tab stop; the first other character ends the
/// indentation.
pub fn indent_level_for_line(line: &str, tab_length: usize) -> f64 {
    let tab_length = tab_length.max(1);
    let mut indent_length = 0;
    for ch in line.chars() {
        match ch {
            '\t' => indent_length += tab_length - (indent_length % tab_length),
            ' ' => indent_length += 1,
            _ => break,
        }
    }
    indent_length as f64 / tab_length as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_indent("fn main() {}", 2, 0.0)]
    #[case::spaces("    let x = 1;", 2, 2.0)]
    #[case::partial_level("   x", 2, 1.5)]
    #[case::tab_to_stop("\tx", 4, 1.0)]
    #[case::space_then_tab(" \tx", 4, 1.0)]
    #[case::blank_line("", 2, 0.0)]
    fn test_indent_level_for_line(#[case] line: &str, #[case] tab_length: usize, #[case] expected: f64) {
        assert_eq!(indent_level_for_line(line, tab_length), expected);
    }

    #[rstest]
    #[case::first_level(2, 1, true)]
    #[case::too_deep_for_first(3, 1, false)]
    #[case::second_level(4, 2, true)]
    #[case::lower_bound_exclusive(2, 2, false)]
    fn test_is_at_indent_level(#[case] column: usize, #[case] level: usize, #[case] expected: bool) {
        assert_eq!(is_at_indent_level(column, level, 2), expected);
    }

    #[test]
    fn test_foldable_range_spans_to_last_child() {
        let source = "fn main() {\n    let x = 1;\n}\n";
        let language: tree_sitter::Language = tree_sitter_rust::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let buffer = TextBuffer::new(source);

        let function = tree.root_node().child(0).unwrap();
        let block = function.child_by_field_name("body").unwrap();
        assert_eq!(
            foldable_range(&block, &buffer),
            Some(Range::new(Position::new(0, 11), Position::new(2, 0)))
        );

        // `main` has no children
        let name = function.child_by_field_name("name").unwrap();
        assert_eq!(foldable_range(&name, &buffer), None);
    }
}
