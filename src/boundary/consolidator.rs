//! Consolidation of raw syntax captures into boundary entries.
//!
//! A query over a dirty span yields many captures, often several per node and
//! several per position. They are folded into one open list and one close list
//! per position before anything touches the index.

use std::collections::{BTreeMap, HashMap};

use super::entry::BoundaryEntry;
use super::index::BoundaryIndex;
use crate::error::{HighlightError, HighlightResult};
use crate::scope::{ScopeId, ScopeRegistry};
use crate::text::{Position, Range};

/// Per-capture settings from `#set!` directives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureProperties {
    /// No later capture may add a scope to this exact range
    pub is_final: bool,
}

/// A validated syntax capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub name: String,
    pub range: Range,
    pub properties: CaptureProperties,
}

impl Capture {
    /// Validate raw capture data.
    ///
    /// Empty names and inverted ranges are rejected so they never reach the
    /// index.
    pub fn new(
        name: impl Into<String>,
        start: Position,
        end: Position,
        properties: CaptureProperties,
    ) -> HighlightResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(HighlightError::malformed_capture(format!(
                "capture at {start} has no name"
            )));
        }
        if start > end {
            return Err(HighlightError::malformed_capture(format!(
                "capture @{name} ends at {end} before it starts at {start}"
            )));
        }
        Ok(Self {
            name,
            range: Range::new(start, end),
            properties,
        })
    }
}

/// Settings recorded for one exact (start, end) range
#[derive(Debug, Clone, Copy, Default)]
struct RangeData {
    is_final: bool,
}

#[derive(Debug, Default)]
struct PendingBoundary {
    open: Vec<ScopeId>,
    close: Vec<ScopeId>,
}

/// Folds captures into per-position open/close lists
#[derive(Debug, Default)]
pub struct PositionAccumulator {
    boundaries: BTreeMap<Position, PendingBoundary>,
    range_data: HashMap<Range, RangeData>,
    first_capture_wins: bool,
}

impl PositionAccumulator {
    pub fn new(first_capture_wins: bool) -> Self {
        Self {
            first_capture_wins,
            ..Self::default()
        }
    }

    /// Record `id` opening at the capture's start and closing at its end.
    ///
    /// Returns `false` when an earlier capture claimed the exact range.
    pub fn store(&mut self, capture: &Capture, id: ScopeId) -> bool {
        let data = self.range_data.entry(capture.range).or_default();
        if data.is_final {
            return false;
        }
        if capture.properties.is_final || self.first_capture_wins {
            data.is_final = true;
        }

        // Callers enumerate outer captures before inner ones, so a later open
        // at the same point nests inside the earlier one.
        self.boundaries
            .entry(capture.range.start)
            .or_default()
            .open
            .push(id);

        // Narrower spans close before wider ones ending at the same point.
        self.boundaries
            .entry(capture.range.end)
            .or_default()
            .close
            .insert(0, id);
        true
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}

/// Summary of one consolidation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationStats {
    pub removed_carry: Vec<ScopeId>,
    pub stored: usize,
    pub skipped: usize,
    pub positions: usize,
}

/// Rebuild the boundary entries for the span `[from, to]` from `captures`.
///
/// Entries inside the span are replaced. Capture ends that fall outside it are
/// merged into whatever entry already exists there. A terminal entry at
/// [`Position::MAX`] closes the scopes that the last removed entry closed, or
/// nothing when the span runs to the end of the document.
pub fn consolidate(
    index: &mut BoundaryIndex,
    registry: &mut ScopeRegistry,
    from: Position,
    to: Position,
    captures: &[Capture],
    first_capture_wins: bool,
) -> ConsolidationStats {
    let removed = index.remove_range(from, to);
    // A span reaching the end sentinel removed the old terminal entry too;
    // nothing lies past it to carry
    let carry = if to.is_max() { Vec::new() } else { removed };

    let mut accumulator = PositionAccumulator::new(first_capture_wins);
    let mut stats = ConsolidationStats::default();
    for capture in captures {
        let id = registry.id_for(&capture.name);
        if accumulator.store(capture, id) {
            stats.stored += 1;
        } else {
            stats.skipped += 1;
        }
    }

    stats.positions = accumulator.len();
    for (position, pending) in accumulator.boundaries {
        if from <= position && position <= to {
            index.insert(BoundaryEntry::with_scopes(position, pending.close, pending.open));
        } else {
            let entry = index.get_or_insert(position);
            entry.merge_close(&pending.close);
            entry.merge_open(&pending.open);
        }
    }

    index.insert(BoundaryEntry::with_scopes(Position::MAX, carry.clone(), Vec::new()));
    stats.removed_carry = carry;

    log::trace!(
        target: "irodori::consolidate",
        "Consolidated {} captures into {} positions for {} - {} ({} skipped)",
        stats.stored,
        stats.positions,
        from,
        to,
        stats.skipped
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(name: &str, start: (usize, usize), end: (usize, usize)) -> Capture {
        Capture::new(name, start.into(), end.into(), CaptureProperties::default()).unwrap()
    }

    fn final_capture(name: &str, start: (usize, usize), end: (usize, usize)) -> Capture {
        Capture::new(
            name,
            start.into(),
            end.into(),
            CaptureProperties { is_final: true },
        )
        .unwrap()
    }

    fn names(registry: &ScopeRegistry, ids: &[ScopeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| registry.name_for(*id))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_malformed_captures_are_rejected() {
        let empty = Capture::new("", Position::ZERO, Position::new(0, 1), CaptureProperties::default());
        assert!(matches!(empty, Err(HighlightError::MalformedCapture { .. })));

        let inverted = Capture::new(
            "keyword",
            Position::new(0, 4),
            Position::new(0, 1),
            CaptureProperties::default(),
        );
        assert!(matches!(inverted, Err(HighlightError::MalformedCapture { .. })));
    }

    #[test]
    fn test_shared_positions_open_in_order_and_close_in_reverse() {
        let mut index = BoundaryIndex::new();
        let mut registry = ScopeRegistry::new();
        let captures = vec![
            capture("string", (0, 0), (0, 5)),
            capture("punctuation", (0, 0), (0, 1)),
            capture("escape", (0, 3), (0, 5)),
        ];

        consolidate(
            &mut index,
            &mut registry,
            Position::ZERO,
            Position::row_start(1),
            &captures,
            true,
        );

        let start = index.get(&Position::ZERO).unwrap();
        assert_eq!(names(&registry, &start.open_scope_ids), vec!["string", "punctuation"]);

        let end = index.get(&Position::new(0, 5)).unwrap();
        assert_eq!(names(&registry, &end.close_scope_ids), vec!["escape", "string"]);
    }

    #[test]
    fn test_first_capture_wins_for_exact_range() {
        let mut index = BoundaryIndex::new();
        let mut registry = ScopeRegistry::new();
        let captures = vec![
            capture("function", (0, 3), (0, 7)),
            capture("variable", (0, 3), (0, 7)),
        ];

        let stats = consolidate(
            &mut index,
            &mut registry,
            Position::ZERO,
            Position::row_start(1),
            &captures,
            true,
        );

        assert_eq!(stats.stored, 1);
        assert_eq!(stats.skipped, 1);
        let entry = index.get(&Position::new(0, 3)).unwrap();
        assert_eq!(names(&registry, &entry.open_scope_ids), vec!["function"]);
    }

    #[test]
    fn test_only_final_captures_block_when_layering_is_enabled() {
        let mut index = BoundaryIndex::new();
        let mut registry = ScopeRegistry::new();
        let captures = vec![
            capture("variable", (0, 0), (0, 3)),
            capture("constant", (0, 0), (0, 3)),
            final_capture("keyword", (1, 0), (1, 2)),
            capture("variable", (1, 0), (1, 2)),
        ];

        consolidate(
            &mut index,
            &mut registry,
            Position::ZERO,
            Position::row_start(2),
            &captures,
            false,
        );

        let layered = index.get(&Position::ZERO).unwrap();
        assert_eq!(names(&registry, &layered.open_scope_ids), vec!["variable", "constant"]);
        let exclusive = index.get(&Position::row_start(1)).unwrap();
        assert_eq!(names(&registry, &exclusive.open_scope_ids), vec!["keyword"]);
    }

    #[test]
    fn test_terminal_entry_closes_carried_scopes() {
        let mut index = BoundaryIndex::new();
        let mut registry = ScopeRegistry::new();
        let comment = registry.id_for("comment");
        index.insert(BoundaryEntry::with_scopes(Position::new(0, 0), vec![], vec![comment]));
        index.insert(BoundaryEntry::with_scopes(Position::new(0, 9), vec![comment], vec![]));

        let stats = consolidate(
            &mut index,
            &mut registry,
            Position::ZERO,
            Position::row_start(1),
            &[],
            true,
        );

        assert_eq!(stats.removed_carry, vec![comment]);
        let terminal = index.get(&Position::MAX).unwrap();
        assert_eq!(terminal.close_scope_ids, vec![comment]);
        assert!(terminal.open_scope_ids.is_empty());
    }

    #[test]
    fn test_span_to_document_end_resets_terminal_carry() {
        let mut index = BoundaryIndex::new();
        let mut registry = ScopeRegistry::new();
        let number = registry.id_for("constant.numeric");
        let captures = vec![capture("constant.numeric", (1, 4), (1, 5))];

        consolidate(&mut index, &mut registry, Position::ZERO, Position::MAX, &captures, true);
        consolidate(
            &mut index,
            &mut registry,
            Position::row_start(1),
            Position::row_start(2),
            &captures,
            true,
        );
        assert_eq!(index.get(&Position::MAX).unwrap().close_scope_ids, vec![number]);

        let stats = consolidate(&mut index, &mut registry, Position::ZERO, Position::MAX, &captures, true);
        assert!(stats.removed_carry.is_empty());
        assert!(index.get(&Position::MAX).unwrap().close_scope_ids.is_empty());
    }

    #[test]
    fn test_capture_ends_outside_span_merge_into_existing_entries() {
        let mut index = BoundaryIndex::new();
        let mut registry = ScopeRegistry::new();
        let block = registry.id_for("comment.block");
        let keyword = registry.id_for("keyword");
        // Row 3 already starts a keyword; the block comment ends there too
        index.insert(BoundaryEntry::with_scopes(Position::new(3, 0), vec![], vec![keyword]));

        let captures = vec![capture("comment.block", (0, 0), (3, 0))];
        consolidate(
            &mut index,
            &mut registry,
            Position::ZERO,
            Position::row_start(1),
            &captures,
            true,
        );
        // Running the same span again must not duplicate the merged close
        consolidate(
            &mut index,
            &mut registry,
            Position::ZERO,
            Position::row_start(1),
            &captures,
            true,
        );

        let merged = index.get(&Position::new(3, 0)).unwrap();
        assert_eq!(merged.close_scope_ids, vec![block]);
        assert_eq!(merged.open_scope_ids, vec![keyword]);
    }
}
