//! Runs grammar queries over a tree and converts the results into the
//! index's own capture types.

use tree_sitter::{Node, Point, Query, QueryCursor, StreamingIterator, Tree};

use super::query_predicates::PredicateFilter;
use crate::boundary::{Capture, CaptureProperties};
use crate::locals::{LocalCapture, LocalKind};
use crate::text::{Position, Range};

/// `#set! final` on a pattern keeps later captures off the same range
const FINAL_PROPERTY: &str = "final";

/// Clamp `range` to the tree and convert it for `QueryCursor::set_point_range`
fn point_range(tree: &Tree, range: Range) -> std::ops::Range<Point> {
    let root_end = Position::from(tree.root_node().end_position());
    let clamp = |position: Position| Point::from(position.min(root_end));
    clamp(range.start)..clamp(range.end)
}

fn is_final(query: &Query, pattern_index: usize, capture_index: u32) -> bool {
    query.property_settings(pattern_index).iter().any(|property| {
        property.key.as_ref() == FINAL_PROPERTY
            && property
                .capture_id
                .is_none_or(|id| id == capture_index as usize)
    })
}

/// Highlight captures intersecting `range`, in query-cursor order.
///
/// Captures whose name starts with `_` are private to the query and skipped.
pub fn syntax_captures(
    query: &Query,
    tree: &Tree,
    text: &str,
    range: Range,
    predicates: &mut PredicateFilter,
) -> Vec<Capture> {
    let names = query.capture_names();
    let mut cursor = QueryCursor::new();
    cursor.set_point_range(point_range(tree, range));

    let mut result = Vec::new();
    let mut captures = cursor.captures(query, tree.root_node(), text.as_bytes());
    while let Some((match_, index)) = captures.next() {
        let capture = &match_.captures[*index];
        let name = names[capture.index as usize];
        if name.starts_with('_') || !predicates.accepts(query, match_, capture, text) {
            continue;
        }

        let properties = CaptureProperties {
            is_final: is_final(query, match_.pattern_index, capture.index),
        };
        let node = capture.node;
        let validated = Capture::new(
            name,
            node.start_position().into(),
            node.end_position().into(),
            properties,
        );
        debug_assert!(validated.is_ok(), "malformed capture from query: {validated:?}");
        match validated {
            Ok(capture) => result.push(capture),
            Err(err) => log::error!(target: "irodori::capture", "{}", err),
        }
    }
    result
}

/// Locals captures intersecting `range`, classified by role
pub fn local_captures(
    query: &Query,
    tree: &Tree,
    text: &str,
    range: Range,
    predicates: &mut PredicateFilter,
) -> Vec<LocalCapture> {
    let names = query.capture_names();
    let mut cursor = QueryCursor::new();
    cursor.set_point_range(point_range(tree, range));

    let mut result = Vec::new();
    let mut captures = cursor.captures(query, tree.root_node(), text.as_bytes());
    while let Some((match_, index)) = captures.next() {
        let capture = &match_.captures[*index];
        let name = names[capture.index as usize];
        let Some(kind) = LocalKind::classify(name) else {
            log::debug!(target: "irodori::capture", "Ignoring locals capture @{}", name);
            continue;
        };
        if !predicates.accepts(query, match_, capture, text) {
            continue;
        }
        let node = capture.node;
        let node_text = node.utf8_text(text.as_bytes()).unwrap_or_default();
        result.push(LocalCapture::new(kind, node_range(&node), node_text));
    }
    result
}

/// Nodes captured by the folds query, optionally limited to `range`
pub fn fold_nodes<'tree>(
    query: &Query,
    tree: &'tree Tree,
    text: &str,
    range: Option<Range>,
) -> Vec<Node<'tree>> {
    let mut cursor = QueryCursor::new();
    if let Some(range) = range {
        cursor.set_point_range(point_range(tree, range));
    }

    let mut nodes = Vec::new();
    let mut captures = cursor.captures(query, tree.root_node(), text.as_bytes());
    while let Some((match_, index)) = captures.next() {
        nodes.push(match_.captures[*index].node);
    }
    nodes
}

pub fn node_range(node: &Node<'_>) -> Range {
    Range::new(node.start_position().into(), node.end_position().into())
}
