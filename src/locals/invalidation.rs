use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::boundary::BoundaryIndex;
use crate::text::{EditShift, Position, Range};

/// Tracks identifier texts touched by edits and reports the references that
/// need re-highlighting.
///
/// Names are collected twice per edit: from the definition just before the
/// old end (what the name was) and, after reparsing, from the definition just
/// before the new end (what it became). References to either name inside the
/// enclosing lexical scope are reported on the next flush.
#[derive(Debug, Default)]
pub struct InvalidationTracker {
    touched: HashSet<String>,
    new_ranges: Vec<Range>,
}

impl InvalidationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the definition text ending at the edit's old end, if any.
    /// Must run before the index is shifted for the edit.
    pub fn before_edit(&mut self, index: &BoundaryIndex, old_end: Position) {
        if let Some(text) = definition_before(index, old_end) {
            log::trace!(target: "irodori::invalidation", "Edit touches definition {:?}", text);
            self.touched.insert(text);
        }
    }

    /// Record the post-edit range, moving earlier ranges along with the edit
    pub fn record_edit(&mut self, shift: &EditShift, new_range: Range) {
        for range in &mut self.new_ranges {
            *range = shift.shift_range(*range);
        }
        self.new_ranges.push(new_range);
    }

    pub fn has_pending(&self) -> bool {
        !self.new_ranges.is_empty() || !self.touched.is_empty()
    }

    pub fn pending_ranges(&self) -> &[Range] {
        &self.new_ranges
    }

    pub fn is_touched(&self, text: &str) -> bool {
        self.touched.contains(text)
    }

    /// Collect the ranges of references whose text was touched, then reset.
    ///
    /// For each edited range the innermost enclosing scope is walked from its
    /// opening to its closing entry. Every entry in between that starts a
    /// locals node, and is not itself a definition, is reported when the node
    /// text is one of the touched names.
    pub fn prepare_invalidations(&mut self, index: &BoundaryIndex) -> Vec<Range> {
        let mut parent_scopes: BTreeMap<Position, Position> = BTreeMap::new();

        for range in &self.new_ranges {
            if let Some(text) = definition_before(index, range.end) {
                self.touched.insert(text);
            }
            if let Some(scope) = index.enclosing_scope(range.start)
                && let Some(mark) = scope.scope_open
            {
                parent_scopes.insert(scope.position, mark.partner);
            }
        }

        let mut invalidated = BTreeSet::new();
        if !self.touched.is_empty() {
            for (from, to) in parent_scopes {
                for entry in index.range(from, to) {
                    if entry.is_definition() {
                        continue;
                    }
                    let Some(node) = entry.open_node.as_ref() else {
                        continue;
                    };
                    if self.touched.contains(&node.text) {
                        invalidated.insert(node.range);
                    }
                }
            }
        }

        if !invalidated.is_empty() {
            log::debug!(
                target: "irodori::invalidation",
                "Invalidating {} references for {:?}",
                invalidated.len(),
                self.touched
            );
        }

        self.touched.clear();
        self.new_ranges.clear();
        invalidated.into_iter().collect()
    }
}

fn definition_before(index: &BoundaryIndex, position: Position) -> Option<String> {
    index
        .lower(position)
        .entry()
        .and_then(|entry| entry.definition.clone())
}
