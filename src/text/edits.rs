use super::buffer::TextChange;
use super::position::{Position, Range};

/// Where a position ends up after an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shifted {
    /// Before the edit; unchanged
    Before(Position),
    /// Inside the replaced text; its content no longer exists
    Replaced,
    /// At or after the old end; moved along with its text
    After(Position),
}

/// Position mapping for a single edit, expressed in rows and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditShift {
    pub start: Position,
    pub old_end: Position,
    pub new_end: Position,
}

impl EditShift {
    pub fn new(start: Position, old_end: Position, new_end: Position) -> Self {
        Self {
            start,
            old_end,
            new_end,
        }
    }

    /// Check if this is a zero-length (insertion-only) edit
    pub fn is_insertion_only(&self) -> bool {
        self.start == self.old_end
    }

    /// Map a position from pre-edit to post-edit coordinates.
    ///
    /// A position at `start` of an insertion moves with the inserted text,
    /// since the token that started there now starts after it.
    pub fn shift(&self, position: Position) -> Shifted {
        if position.is_max() {
            return Shifted::After(position);
        }
        if position < self.start {
            return Shifted::Before(position);
        }
        if position < self.old_end {
            return Shifted::Replaced;
        }

        if position.row == self.old_end.row {
            Shifted::After(Position::new(
                self.new_end.row,
                self.new_end.column + (position.column - self.old_end.column),
            ))
        } else {
            let row = (position.row as i64 + self.row_delta()).max(0) as usize;
            Shifted::After(Position::new(row, position.column))
        }
    }

    /// Map a position, collapsing replaced positions onto the edit start
    pub fn shift_or_start(&self, position: Position) -> Position {
        match self.shift(position) {
            Shifted::Before(p) | Shifted::After(p) => p,
            Shifted::Replaced => self.start,
        }
    }

    pub fn shift_range(&self, range: Range) -> Range {
        Range::new(self.shift_or_start(range.start), self.shift_or_start(range.end))
    }

    fn row_delta(&self) -> i64 {
        self.new_end.row as i64 - self.old_end.row as i64
    }
}

impl From<&TextChange> for EditShift {
    fn from(change: &TextChange) -> Self {
        Self::new(change.old_range.start, change.old_range.end, change.new_range.end)
    }
}
