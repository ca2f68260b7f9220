use std::cmp::Ordering;
use std::fmt;
use tree_sitter::Point;

/// A (row, column) location in a document.
///
/// Columns are byte offsets within the row, the same unit tree-sitter uses for
/// [`Point`]. Positions order lexicographically: first by row, then by column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    /// Start of the document
    pub const ZERO: Position = Position { row: 0, column: 0 };

    /// End-of-document sentinel; greater than every real position
    pub const MAX: Position = Position {
        row: usize::MAX,
        column: usize::MAX,
    };

    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// First column of `row`
    pub const fn row_start(row: usize) -> Self {
        Self { row, column: 0 }
    }

    pub fn is_max(&self) -> bool {
        *self == Self::MAX
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            write!(f, "(∞, ∞)")
        } else {
            write!(f, "({}, {})", self.row, self.column)
        }
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self::new(point.row, point.column)
    }
}

impl From<Position> for Point {
    fn from(position: Position) -> Self {
        Point::new(position.row, position.column)
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, column): (usize, usize)) -> Self {
        Self::new(row, column)
    }
}

/// Half-open span `[start, end)` between two positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `position` lies inside the range, end inclusive
    pub fn contains_inclusive(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Widen to whole rows: `[start.row, 0)` up to the start of the row after `end`
    pub fn to_row_span(&self) -> Range {
        let end_row = if self.end.is_max() {
            usize::MAX
        } else {
            self.end.row.saturating_add(1)
        };
        Range::new(Position::row_start(self.start.row), Position::row_start(end_row))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {})", self.start, self.end)
    }
}

impl From<tree_sitter::Range> for Range {
    fn from(range: tree_sitter::Range) -> Self {
        Self::new(range.start_point.into(), range.end_point.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::same_row((0, 3), (0, 4), Ordering::Less)]
    #[case::row_dominates((0, 99), (1, 0), Ordering::Less)]
    #[case::equal((2, 5), (2, 5), Ordering::Equal)]
    #[case::later_row((3, 0), (2, 80), Ordering::Greater)]
    fn test_position_ordering(
        #[case] a: (usize, usize),
        #[case] b: (usize, usize),
        #[case] expected: Ordering,
    ) {
        assert_eq!(Position::from(a).cmp(&Position::from(b)), expected);
    }

    #[test]
    fn test_max_sentinel_is_greatest() {
        assert!(Position::new(usize::MAX, 0) < Position::MAX);
        assert!(Position::new(1_000_000, 1_000_000) < Position::MAX);
        assert!(Position::MAX.is_max());
    }

    #[test]
    fn test_point_round_trip_keeps_coordinates() {
        let point = Point::new(4, 7);
        let position = Position::from(point);
        assert_eq!(position, Position::new(4, 7));
        assert_eq!(Point::from(position), point);
    }

    #[test]
    fn test_row_span_covers_following_row_start() {
        let range = Range::new(Position::new(2, 5), Position::new(3, 1));
        let span = range.to_row_span();
        assert_eq!(span.start, Position::new(2, 0));
        assert_eq!(span.end, Position::new(4, 0));
    }
}
