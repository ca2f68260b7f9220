//! Ordered index of boundary entries.
//!
//! Backed by a `BTreeMap`, so range deletion and walks in either direction
//! from an arbitrary key cost `O(log n)` per visited entry instead of a scan of
//! the whole document.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use super::entry::BoundaryEntry;
use crate::scope::ScopeId;
use crate::text::{EditShift, Position, Shifted};

#[derive(Debug, Clone, Default)]
pub struct BoundaryIndex {
    entries: BTreeMap<Position, BoundaryEntry>,
}

impl BoundaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, position: &Position) -> Option<&BoundaryEntry> {
        self.entries.get(position)
    }

    pub fn get_mut(&mut self, position: &Position) -> Option<&mut BoundaryEntry> {
        self.entries.get_mut(position)
    }

    /// Insert or replace the entry at `entry.position`
    pub fn insert(&mut self, entry: BoundaryEntry) -> Option<BoundaryEntry> {
        self.entries.insert(entry.position, entry)
    }

    /// Existing entry at `position`, or a new empty one
    pub fn get_or_insert(&mut self, position: Position) -> &mut BoundaryEntry {
        self.entries
            .entry(position)
            .or_insert_with(|| BoundaryEntry::new(position))
    }

    /// Delete every entry with a key in `[from, to]`, both ends inclusive.
    ///
    /// Returns the close ids of the last removed entry, or an empty list when
    /// nothing was removed.
    pub fn remove_range(&mut self, from: Position, to: Position) -> Vec<ScopeId> {
        if from > to {
            return Vec::new();
        }

        let keys: Vec<Position> = self.entries.range(from..=to).map(|(key, _)| *key).collect();
        let mut carry = Vec::new();
        for key in keys {
            if let Some(entry) = self.entries.remove(&key) {
                carry = entry.close_scope_ids;
            }
        }
        carry
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &BoundaryEntry> {
        self.entries.values()
    }

    /// Entries with keys in `[from, to)`
    pub fn range(&self, from: Position, to: Position) -> impl Iterator<Item = &BoundaryEntry> {
        let to = to.max(from);
        self.entries.range(from..to).map(|(_, entry)| entry)
    }

    /// Cursor at the first entry `>= position`
    pub fn ceiling(&self, position: Position) -> Cursor<'_> {
        let current = self.entries.range(position..).next().map(|(key, _)| *key);
        Cursor::new(self, current)
    }

    /// Cursor at the last entry `<= position`
    pub fn floor(&self, position: Position) -> Cursor<'_> {
        let current = self
            .entries
            .range(..=position)
            .next_back()
            .map(|(key, _)| *key);
        Cursor::new(self, current)
    }

    /// Cursor at the last entry `< position`
    pub fn lower(&self, position: Position) -> Cursor<'_> {
        let current = self
            .entries
            .range(..position)
            .next_back()
            .map(|(key, _)| *key);
        Cursor::new(self, current)
    }

    /// Cursor at the first entry `> position`
    pub fn higher(&self, position: Position) -> Cursor<'_> {
        let current = self
            .entries
            .range((Excluded(position), Unbounded))
            .next()
            .map(|(key, _)| *key);
        Cursor::new(self, current)
    }

    /// Walk backwards through the scopes enclosing `position` looking for an
    /// entry that satisfies `predicate`.
    ///
    /// Starts at the entry just before `position`. A closed inner scope is
    /// skipped as a whole by resuming just before its opening entry. The walk
    /// stops at the first outermost (depth 1) scope opening it meets.
    pub fn find_in_current_scope<F>(&self, position: Position, predicate: F) -> Option<&BoundaryEntry>
    where
        F: Fn(&BoundaryEntry) -> bool,
    {
        let mut cursor = self.lower(position);
        while let Some(entry) = cursor.entry() {
            if predicate(entry) {
                return Some(entry);
            }

            if let Some(open) = entry.scope_open
                && open.depth == 1
            {
                return None;
            }

            match entry.scope_close {
                Some(close) if close.partner < entry.position => {
                    cursor = self.lower(close.partner);
                }
                _ => {
                    cursor.move_prev();
                }
            }
        }
        None
    }

    /// Innermost lexical scope that encloses `position`, including a scope that
    /// opens exactly there
    pub fn enclosing_scope(&self, position: Position) -> Option<&BoundaryEntry> {
        if let Some(entry) = self.get(&position)
            && entry.scope_open.is_some()
        {
            return Some(entry);
        }
        self.find_in_current_scope(position, |entry| entry.scope_open.is_some())
    }

    /// Move entries so they keep following their text after an edit.
    ///
    /// Entries before the edit stay, entries inside the replaced text are
    /// dropped, entries at or after the old end are re-keyed. Cross references
    /// held by every entry are rewritten the same way. Returns the number of
    /// dropped entries.
    pub fn apply_edit(&mut self, shift: &EditShift) -> usize {
        let tail = self.entries.split_off(&shift.start);

        for entry in self.entries.values_mut() {
            entry.shift_references(shift);
        }

        let mut dropped = 0;
        for (key, entry) in tail {
            match shift.shift(key) {
                Shifted::Replaced => dropped += 1,
                Shifted::Before(position) | Shifted::After(position) => {
                    self.entries.insert(position, entry.shifted(shift, position));
                }
            }
        }

        log::trace!(
            target: "irodori::boundary",
            "Shifted index for edit {} -> {}, dropped {} entries",
            shift.start,
            shift.new_end,
            dropped
        );
        dropped
    }
}

/// Position-keyed cursor over a [`BoundaryIndex`].
///
/// The cursor holds a key, not a reference into the tree, and resolves it on
/// every access.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    index: &'a BoundaryIndex,
    current: Option<Position>,
}

impl<'a> Cursor<'a> {
    fn new(index: &'a BoundaryIndex, current: Option<Position>) -> Self {
        Self { index, current }
    }

    pub fn position(&self) -> Option<Position> {
        self.current
    }

    pub fn entry(&self) -> Option<&'a BoundaryEntry> {
        self.current.and_then(|key| self.index.entries.get(&key))
    }

    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    pub fn has_next(&self) -> bool {
        self.current
            .is_some_and(|key| !self.index.higher(key).is_end())
    }

    pub fn has_prev(&self) -> bool {
        self.current
            .is_some_and(|key| !self.index.lower(key).is_end())
    }

    /// Advance to the next entry, returning it
    pub fn move_next(&mut self) -> Option<&'a BoundaryEntry> {
        self.current = self
            .current
            .and_then(|key| self.index.higher(key).current);
        self.entry()
    }

    /// Step back to the previous entry, returning it
    pub fn move_prev(&mut self) -> Option<&'a BoundaryEntry> {
        self.current = self
            .current
            .and_then(|key| self.index.lower(key).current);
        self.entry()
    }
}
