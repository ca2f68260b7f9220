//! Links local references to their definitions.
//!
//! Runs after syntax consolidation over the same span. Lexical scopes become
//! paired open/close marks on boundary entries, definitions gain the
//! `variable` pseudo-scope, and each reference copies the scope sets of the
//! nearest visible definition with the same text.

use std::collections::HashSet;

use crate::boundary::{BoundaryIndex, NodeSpan, ScopeMark};
use crate::scope::{ScopeId, VARIABLE_SCOPE_ID};
use crate::text::Range;

/// Role of a locals capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKind {
    Scope,
    Definition,
    Reference,
}

impl LocalKind {
    /// Classify a locals capture name.
    ///
    /// Sub-kinds such as `local.definition.var` count as definitions.
    pub fn classify(name: &str) -> Option<Self> {
        match name {
            "local.scope" => Some(Self::Scope),
            "local.reference" => Some(Self::Reference),
            "local.definition" => Some(Self::Definition),
            _ if name.starts_with("local.definition.") => Some(Self::Definition),
            _ => None,
        }
    }
}

/// A classified locals capture with the text of its node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCapture {
    pub kind: LocalKind,
    pub range: Range,
    pub text: String,
}

impl LocalCapture {
    pub fn new(kind: LocalKind, range: Range, text: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            text: text.into(),
        }
    }
}

/// Counters from one resolver pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub scopes: usize,
    pub definitions: usize,
    pub linked: usize,
    pub unresolved: usize,
    pub shadowed: usize,
}

/// Apply locals captures, in order, to the index
pub fn resolve(index: &mut BoundaryIndex, captures: &[LocalCapture]) -> ResolverStats {
    let definition_ranges: HashSet<Range> = captures
        .iter()
        .filter(|capture| capture.kind == LocalKind::Definition)
        .map(|capture| capture.range)
        .collect();

    let mut stats = ResolverStats::default();
    for capture in captures {
        // A definition and a reference on the same node: the definition wins
        if capture.kind == LocalKind::Reference && definition_ranges.contains(&capture.range) {
            stats.shadowed += 1;
            continue;
        }

        record_nodes(index, capture);

        match capture.kind {
            LocalKind::Scope => {
                apply_scope(index, capture.range);
                stats.scopes += 1;
            }
            LocalKind::Definition => {
                apply_definition(index, capture);
                stats.definitions += 1;
            }
            LocalKind::Reference => {
                if apply_reference(index, capture) {
                    stats.linked += 1;
                } else {
                    stats.unresolved += 1;
                }
            }
        }
    }

    log::trace!(
        target: "irodori::locals",
        "Resolved locals: {} scopes, {} definitions, {} linked, {} unresolved",
        stats.scopes,
        stats.definitions,
        stats.linked,
        stats.unresolved
    );
    stats
}

fn record_nodes(index: &mut BoundaryIndex, capture: &LocalCapture) {
    let span = NodeSpan {
        range: capture.range,
        text: capture.text.clone(),
    };

    let open = index.get_or_insert(capture.range.start);
    if open.open_node.is_none() {
        open.open_node = Some(span.clone());
    }

    let close = index.get_or_insert(capture.range.end);
    if close.close_node.is_none() {
        close.close_node = Some(span);
    }
}

fn apply_scope(index: &mut BoundaryIndex, range: Range) {
    let parent_depth = index
        .find_in_current_scope(range.start, |entry| entry.scope_open.is_some())
        .and_then(|entry| entry.scope_open)
        .map(|mark| mark.depth)
        .unwrap_or(0);
    let depth = parent_depth + 1;

    // Scopes sharing an endpoint keep the widest one, so a backward walk
    // that jumps over a closed scope skips all of them at once
    let open = index.get_or_insert(range.start);
    if open.scope_open.is_none_or(|mark| mark.partner < range.end) {
        open.scope_open = Some(ScopeMark {
            depth,
            partner: range.end,
        });
    }
    let close = index.get_or_insert(range.end);
    if close.scope_close.is_none_or(|mark| mark.partner > range.start) {
        close.scope_close = Some(ScopeMark {
            depth,
            partner: range.start,
        });
    }
}

fn apply_definition(index: &mut BoundaryIndex, capture: &LocalCapture) {
    let open = index.get_or_insert(capture.range.start);
    if !open.open_scope_ids.contains(&VARIABLE_SCOPE_ID) {
        open.open_scope_ids.push(VARIABLE_SCOPE_ID);
    }
    open.definition = Some(capture.text.clone());
    open.definition_close = Some(capture.range.end);

    let close = index.get_or_insert(capture.range.end);
    if !close.close_scope_ids.contains(&VARIABLE_SCOPE_ID) {
        close.close_scope_ids.insert(0, VARIABLE_SCOPE_ID);
    }
}

/// Returns whether a definition was found
fn apply_reference(index: &mut BoundaryIndex, capture: &LocalCapture) -> bool {
    if index
        .get(&capture.range.start)
        .is_some_and(|entry| entry.is_definition())
    {
        return false;
    }

    let Some(definition) = index.find_in_current_scope(capture.range.start, |entry| {
        entry.definition.as_deref() == Some(capture.text.as_str())
    }) else {
        log::trace!(
            target: "irodori::locals",
            "No definition for reference {:?} at {}",
            capture.text,
            capture.range.start
        );
        return false;
    };

    let definition_close = definition
        .definition_close
        .and_then(|position| index.get(&position))
        .map(|entry| entry.close_scope_ids.as_slice())
        .unwrap_or_default();
    let (token_open, token_close) = token_scopes(&definition.open_scope_ids, definition_close);

    let reference_close = index
        .get(&capture.range.end)
        .map(|entry| entry.close_scope_ids.clone())
        .unwrap_or_default();
    let reference_open = index
        .get(&capture.range.start)
        .map(|entry| entry.open_scope_ids.clone())
        .unwrap_or_default();
    let (own_open, own_close) = token_scopes(&reference_open, &reference_close);

    // Wider scopes sharing either endpoint stay; only the token's own ids swap
    let open = index.get_or_insert(capture.range.start);
    open.open_scope_ids.retain(|id| !own_open.contains(id));
    open.open_scope_ids.extend(token_open);

    let close = index.get_or_insert(capture.range.end);
    let rest = std::mem::take(&mut close.close_scope_ids);
    close.close_scope_ids = token_close
        .into_iter()
        .chain(rest.into_iter().filter(|id| !own_close.contains(id)))
        .collect();
    true
}

/// Ids that open at a token's start and close at its end, in open order and
/// in close order
fn token_scopes(open: &[ScopeId], close: &[ScopeId]) -> (Vec<ScopeId>, Vec<ScopeId>) {
    let opened = open.iter().copied().filter(|id| close.contains(id)).collect();
    let closed = close.iter().copied().filter(|id| open.contains(id)).collect();
    (opened, closed)
}
