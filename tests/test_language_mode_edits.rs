//! Edits against a ready language mode: index shifting, lazy recomputation and
//! contract checks.

mod helpers;

use helpers::{changed_ranges, range, rust_mode, scopes_at};
use irodori::{HighlightError, HighlightEvent, Position};

/// Given: two functions on consecutive rows
/// When: a newline is inserted at the very start
/// Then: the second function's name boundary moves down a row before any
///       recomputation happens
#[test]
fn test_insertion_shifts_boundaries_with_their_text() {
    let mut mode = rust_mode("fn main() {}\nfn other() {}\n");
    let name_id = mode
        .index()
        .get(&Position::new(1, 3))
        .map(|entry| entry.open_scope_ids.clone())
        .expect("name boundary of `other`");

    mode.apply_edit(range((0, 0), (0, 0)), "\n").unwrap();

    assert_eq!(mode.text(), "\nfn main() {}\nfn other() {}\n");
    let shifted = mode.index().get(&Position::new(2, 3)).expect("shifted entry");
    assert_eq!(shifted.open_scope_ids, name_id);
    assert!(mode.index().get(&Position::new(1, 3)).is_some_and(|entry| {
        entry.open_scope_ids == name_id
    }));

    assert_eq!(
        scopes_at(&mut mode, 2, 4),
        ["source.rust", "entity.name.function"]
    );
}

#[test]
fn test_edit_changes_highlighting_after_query() {
    let mut mode = rust_mode("fn main() {\n    let x = 1;\n}\n");
    assert_eq!(
        scopes_at(&mut mode, 1, 12),
        ["source.rust", "constant.numeric"]
    );

    mode.apply_edit(range((1, 12), (1, 13)), "\"s\"").unwrap();

    assert_eq!(mode.buffer().line_for_row(1), Some("    let x = \"s\";"));
    assert_eq!(scopes_at(&mut mode, 1, 13), ["source.rust", "string.quoted"]);
    // Text after the edit on the same row keeps no stale scope
    assert_eq!(scopes_at(&mut mode, 1, 15), ["source.rust"]);
}

#[test]
fn test_multi_line_deletion_rekeys_following_rows() {
    let mut mode = rust_mode("fn a() {}\n// one\n// two\nfn b() {}\n");

    mode.apply_edit(range((1, 0), (3, 0)), "").unwrap();

    assert_eq!(mode.text(), "fn a() {}\nfn b() {}\n");
    assert_eq!(scopes_at(&mut mode, 1, 3), ["source.rust", "entity.name.function"]);
    assert_eq!(scopes_at(&mut mode, 1, 0), ["source.rust", "keyword.function"]);
}

#[test]
fn test_edit_reports_changed_rows() {
    let mut mode = rust_mode("fn main() {}\n");
    mode.drain_events();

    mode.apply_edit(range((0, 3), (0, 7)), "run").unwrap();

    let changed = changed_ranges(&mut mode);
    assert!(!changed.is_empty());
    assert!(changed.iter().all(|span| span.start.column == 0 && span.start.row == 0));
}

#[test]
fn test_out_of_bounds_edit_is_rejected() {
    let mut mode = rust_mode("fn main() {}\n");

    let result = mode.apply_edit(range((5, 0), (5, 1)), "x");
    assert!(matches!(result, Err(HighlightError::ContractViolation { .. })));
    assert_eq!(mode.text(), "fn main() {}\n");
}

#[test]
fn test_inverted_edit_is_rejected() {
    let mut mode = rust_mode("fn main() {}\n");
    let before = mode.index().len();

    let result = mode.apply_edit(range((0, 7), (0, 3)), "x");
    assert!(matches!(result, Err(HighlightError::ContractViolation { .. })));
    assert_eq!(mode.text(), "fn main() {}\n");
    assert_eq!(mode.index().len(), before);
}

#[test]
fn test_reload_rebuilds_after_edits() {
    let mut mode = rust_mode("fn main() {}\n");
    mode.apply_edit(range((0, 12), (0, 12)), " // done").unwrap();
    mode.drain_events();

    mode.reload().unwrap();

    let events = mode.drain_events();
    assert!(events.iter().any(|event| matches!(event, HighlightEvent::Changed { .. })));
    assert_eq!(scopes_at(&mut mode, 0, 15), ["source.rust", "comment.line"]);
}
