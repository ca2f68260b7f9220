use crate::boundary::BoundaryEntry;
use crate::mode::LanguageMode;
use crate::scope::ScopeId;
use crate::text::Position;

/// Pull cursor over scope boundaries, consumed by a renderer.
///
/// After `seek`, the cursor sits on the first boundary at or after the start
/// position. Each step exposes the scopes that close and then open there.
pub trait HighlightCursor {
    /// Position the cursor and return the scopes already open before `start`
    fn seek(&mut self, start: Position, end_row: usize) -> Vec<ScopeId>;

    /// Advance to the next boundary; `false` once past the last one
    fn move_to_successor(&mut self) -> bool;

    /// Current boundary, or [`Position::MAX`] when exhausted
    fn position(&self) -> Position;

    fn open_scope_ids(&self) -> Vec<ScopeId>;

    fn close_scope_ids(&self) -> Vec<ScopeId>;
}

/// Apply one boundary to a running open-scope stack.
///
/// Each close id removes its innermost occurrence only, so a scope opened
/// twice stays open until closed twice.
pub(crate) fn apply_boundary(open: &mut Vec<ScopeId>, entry: &BoundaryEntry) {
    for id in &entry.close_scope_ids {
        if let Some(index) = open.iter().rposition(|open_id| open_id == id) {
            open.remove(index);
        }
    }
    open.extend(entry.open_scope_ids.iter().copied());
}

/// Cursor over a ready language mode.
///
/// Holds the position of the current boundary rather than a borrow into the
/// index, so boundaries can be recomputed on `seek`.
pub struct HighlightIterator<'a> {
    mode: &'a mut LanguageMode,
    current: Option<Position>,
}

impl<'a> HighlightIterator<'a> {
    pub(crate) fn new(mode: &'a mut LanguageMode) -> Self {
        Self {
            mode,
            current: None,
        }
    }

    fn entry(&self) -> Option<&BoundaryEntry> {
        self.current.and_then(|position| self.mode.index().get(&position))
    }
}

impl HighlightCursor for HighlightIterator<'_> {
    fn seek(&mut self, start: Position, end_row: usize) -> Vec<ScopeId> {
        let end = Position::row_start(end_row.saturating_add(1));
        self.mode.update_boundaries(start, end);

        let index = self.mode.index();
        self.current = index.ceiling(start).position();

        let mut containing = Vec::new();
        for entry in index.iter().take_while(|entry| entry.position < start) {
            apply_boundary(&mut containing, entry);
        }
        containing
    }

    fn move_to_successor(&mut self) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        self.current = self.mode.index().higher(current).position();
        self.current.is_some()
    }

    fn position(&self) -> Position {
        self.current.unwrap_or(Position::MAX)
    }

    fn open_scope_ids(&self) -> Vec<ScopeId> {
        self.entry()
            .map(BoundaryEntry::unique_open_scope_ids)
            .unwrap_or_default()
    }

    fn close_scope_ids(&self) -> Vec<ScopeId> {
        self.entry()
            .map(BoundaryEntry::unique_close_scope_ids)
            .unwrap_or_default()
    }
}

/// Cursor for a mode whose grammar is not loaded yet
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHighlightIterator;

impl HighlightCursor for NullHighlightIterator {
    fn seek(&mut self, _start: Position, _end_row: usize) -> Vec<ScopeId> {
        Vec::new()
    }

    fn move_to_successor(&mut self) -> bool {
        false
    }

    fn position(&self) -> Position {
        Position::MAX
    }

    fn open_scope_ids(&self) -> Vec<ScopeId> {
        Vec::new()
    }

    fn close_scope_ids(&self) -> Vec<ScopeId> {
        Vec::new()
    }
}
