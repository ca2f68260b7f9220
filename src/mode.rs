//! The language mode: one document, one grammar, one boundary index.
//!
//! Edits update the buffer and the parse tree immediately and shift the index
//! so persisted boundaries keep following their text. The affected rows are
//! only recorded as dirty; they are recomputed from the current tree the next
//! time a query touches the index.

use tree_sitter::{Node, Parser, Tree};

use crate::boundary::{BoundaryIndex, consolidate};
use crate::error::{HighlightError, HighlightResult};
use crate::events::{EventQueue, HighlightEvent};
use crate::highlight::iterator::apply_boundary;
use crate::highlight::{
    HighlightCursor, HighlightIterator, NullHighlightIterator, ScopeDescriptor, folds,
};
use crate::language::{
    Grammar, PendingGrammar, PredicateFilter, Readiness, fold_nodes, local_captures,
    syntax_captures,
};
use crate::locals::{InvalidationTracker, resolve};
use crate::scope::{ScopeId, ScopeRegistry};
use crate::text::{EditShift, Position, Range, TextBuffer};

pub struct LanguageMode {
    buffer: TextBuffer,
    scope_name: String,
    registry: ScopeRegistry,
    index: BoundaryIndex,
    tracker: InvalidationTracker,
    predicates: PredicateFilter,
    dirty: Vec<Range>,
    events: EventQueue,
    readiness: Readiness,
    pending: Option<PendingGrammar>,
    parser: Parser,
    tree: Option<Tree>,
    // Dropped after the parser and tree that point into its library
    grammar: Option<Grammar>,
}

impl LanguageMode {
    /// A mode that is still waiting for its grammar.
    ///
    /// `scope_name` is reported as the root scope until the grammar provides
    /// its own.
    pub fn new(text: impl Into<String>, scope_name: impl Into<String>) -> Self {
        Self {
            buffer: TextBuffer::new(text),
            scope_name: scope_name.into(),
            registry: ScopeRegistry::new(),
            index: BoundaryIndex::new(),
            tracker: InvalidationTracker::new(),
            predicates: PredicateFilter::new(),
            dirty: Vec::new(),
            events: EventQueue::new(),
            readiness: Readiness::Loading,
            pending: None,
            parser: Parser::new(),
            tree: None,
            grammar: None,
        }
    }

    /// A mode that is ready from the start
    pub fn with_grammar(text: impl Into<String>, grammar: Grammar) -> HighlightResult<Self> {
        let mut mode = Self::new(text, grammar.scope_name().to_string());
        mode.load(grammar)?;
        Ok(mode)
    }

    /// Hand over a grammar that is loading in the background
    pub fn attach_pending(&mut self, pending: PendingGrammar) {
        log::debug!(
            target: "irodori::mode",
            "Waiting for {} grammar",
            pending.language()
        );
        self.pending = Some(pending);
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Check the background load without blocking
    pub fn poll_ready(&mut self) -> &Readiness {
        if let Some(pending) = self.pending.as_mut()
            && let Some(result) = pending.try_take()
        {
            self.pending = None;
            self.settle(result);
        }
        &self.readiness
    }

    pub async fn wait_ready(&mut self) -> &Readiness {
        if let Some(pending) = self.pending.take() {
            let result = pending.wait().await;
            self.settle(result);
        }
        &self.readiness
    }

    /// Block until the background load settles. Must not be called from
    /// within an async runtime.
    pub fn block_until_ready(&mut self) -> &Readiness {
        if let Some(pending) = self.pending.take() {
            let result = pending.block();
            self.settle(result);
        }
        &self.readiness
    }

    fn settle(&mut self, result: HighlightResult<Grammar>) {
        let outcome = result.and_then(|grammar| self.load(grammar));
        if let Err(err) = outcome {
            log::error!(target: "irodori::mode", "{}", err);
            self.readiness = Readiness::Failed(err.to_string());
            self.events.push(HighlightEvent::load_failed(err.to_string()));
        }
    }

    /// Install `grammar`, parse the whole buffer and rebuild the index
    pub fn load(&mut self, grammar: Grammar) -> HighlightResult<()> {
        self.parser
            .set_language(grammar.language())
            .map_err(|e| HighlightError::language_load(grammar.name(), e.to_string()))?;
        self.scope_name = grammar.scope_name().to_string();
        self.grammar = Some(grammar);
        self.tree = None;
        self.readiness = Readiness::Ready;
        self.rebuild()?;
        self.events.push(HighlightEvent::Ready);
        Ok(())
    }

    /// Reparse from scratch and rebuild the whole index
    pub fn reload(&mut self) -> HighlightResult<()> {
        if !self.is_ready() {
            return Err(HighlightError::NotReady);
        }
        self.tree = None;
        self.rebuild()
    }

    fn rebuild(&mut self) -> HighlightResult<()> {
        let tree = self
            .parser
            .parse(self.buffer.text(), None)
            .ok_or_else(|| HighlightError::parse("parser returned no tree"))?;
        self.tree = Some(tree);
        self.index.clear();
        self.dirty.clear();
        self.tracker = InvalidationTracker::new();

        self.recompute(Range::new(Position::ZERO, Position::MAX));
        self.events.push(HighlightEvent::changed(self.buffer.range()));
        log::debug!(
            target: "irodori::mode",
            "Indexed {} boundaries for {}",
            self.index.len(),
            self.scope_name
        );
        Ok(())
    }

    /// Replace `range` with `new_text`.
    ///
    /// The buffer and tree are updated now; boundaries of the edited rows are
    /// recomputed by the next query. Before the grammar is ready only the
    /// buffer changes.
    pub fn apply_edit(&mut self, range: Range, new_text: &str) -> HighlightResult<()> {
        let change = self
            .buffer
            .apply_change(range, new_text)
            .inspect_err(|err| log::error!(target: "irodori::mode", "{}", err))?;
        if !self.is_ready() {
            return Ok(());
        }

        self.tracker.before_edit(&self.index, change.old_range.end);

        if let Some(tree) = self.tree.as_mut() {
            tree.edit(&change.input_edit());
        }
        let new_tree = self
            .parser
            .parse(self.buffer.text(), self.tree.as_ref())
            .ok_or_else(|| HighlightError::parse("parser returned no tree"))?;
        let old_tree = self.tree.replace(new_tree);

        let shift = EditShift::from(&change);
        self.index.apply_edit(&shift);
        for span in &mut self.dirty {
            *span = shift.shift_range(*span);
        }
        self.tracker.record_edit(&shift, change.new_range);
        let edited_rows = change.new_range.to_row_span();
        self.dirty.push(edited_rows);
        self.events.push(HighlightEvent::changed(edited_rows));

        if let (Some(old_tree), Some(new_tree)) = (old_tree.as_ref(), self.tree.as_ref()) {
            for changed in old_tree.changed_ranges(new_tree) {
                let span = Range::from(changed).to_row_span();
                self.dirty.push(span);
                self.events.push(HighlightEvent::changed(span));
            }
        }

        log::trace!(
            target: "irodori::mode",
            "Edit {} -> {}, {} dirty spans",
            change.old_range,
            change.new_range,
            self.dirty.len()
        );
        Ok(())
    }

    /// Recompute pending dirty spans and `[from, to]`, then report references
    /// invalidated by earlier edits
    pub fn update_boundaries(&mut self, from: Position, to: Position) {
        if !self.is_ready() {
            return;
        }

        let mut spans = std::mem::take(&mut self.dirty);
        spans.push(Range::new(from, to));
        for span in merge_spans(spans) {
            self.recompute(span);
        }

        if self.tracker.has_pending() {
            for range in self.tracker.prepare_invalidations(&self.index) {
                self.events.push(HighlightEvent::changed(range));
            }
        }
    }

    fn recompute(&mut self, span: Range) {
        let (Some(grammar), Some(tree)) = (self.grammar.as_ref(), self.tree.as_ref()) else {
            return;
        };
        let window = query_window(span);
        let text = self.buffer.text();

        let captures = syntax_captures(grammar.highlights(), tree, text, window, &mut self.predicates);
        consolidate(
            &mut self.index,
            &mut self.registry,
            span.start,
            span.end,
            &captures,
            grammar.first_capture_wins(),
        );

        if let Some(locals) = grammar.locals() {
            let local = local_captures(locals, tree, text, window, &mut self.predicates);
            resolve(&mut self.index, &local);
        }
    }

    /// Build a renderer cursor; a null cursor while the grammar is loading
    pub fn build_highlight_iterator(&mut self) -> Box<dyn HighlightCursor + '_> {
        if self.is_ready() {
            Box::new(HighlightIterator::new(self))
        } else {
            Box::new(NullHighlightIterator)
        }
    }

    /// Scope names open at `point`, root scope first.
    ///
    /// A point at the end of a non-empty line reports the character before it.
    pub fn scope_descriptor_for_position(&mut self, point: Position) -> ScopeDescriptor {
        if !self.is_ready() {
            return ScopeDescriptor::root(&self.scope_name);
        }
        let point = self.end_of_line_adjusted(point);
        self.update_boundaries(
            Position::row_start(point.row),
            Position::row_start(point.row + 1),
        );

        let mut open: Vec<ScopeId> = Vec::new();
        for entry in self.index.iter().take_while(|entry| entry.position <= point) {
            apply_boundary(&mut open, entry);
        }

        let mut scopes: Vec<String> = open
            .iter()
            .filter_map(|id| self.registry.name_for(*id))
            .map(str::to_string)
            .collect();
        if scopes.first() != Some(&self.scope_name) {
            scopes.insert(0, self.scope_name.clone());
        }
        ScopeDescriptor::new(scopes)
    }

    /// Node types containing `point` in the live tree, root scope first.
    ///
    /// Anonymous nodes are reported quoted, e.g. `"fn"`.
    pub fn syntax_tree_scope_descriptor_for_position(&self, point: Position) -> ScopeDescriptor {
        let mut scopes = vec![self.scope_name.clone()];
        if let Some(tree) = self.tree.as_ref()
            && self.is_ready()
        {
            let point = self.end_of_line_adjusted(point);
            collect_node_types(tree.root_node(), false, point, &mut scopes);
        }
        ScopeDescriptor::new(scopes)
    }

    fn end_of_line_adjusted(&self, point: Position) -> Position {
        let point = self.buffer.clip_position(point);
        if point.column > 0 && point.column == self.buffer.line_length_for_row(point.row) {
            self.buffer
                .clip_position(Position::new(point.row, point.column - 1))
        } else {
            point
        }
    }

    pub fn scope_for_id(&self, id: ScopeId) -> Option<&str> {
        self.registry.name_for(id)
    }

    pub fn class_name_for_scope_id(&self, id: ScopeId) -> Option<String> {
        self.registry.class_name_for(id)
    }

    fn fold_nodes_in(&self, range: Option<Range>) -> Vec<Node<'_>> {
        match (self.grammar.as_ref(), self.tree.as_ref()) {
            (Some(grammar), Some(tree)) if self.is_ready() => match grammar.folds() {
                Some(query) => fold_nodes(query, tree, self.buffer.text(), range),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    pub fn foldable_ranges(&self) -> Vec<Range> {
        self.fold_nodes_in(None)
            .iter()
            .filter_map(|node| folds::foldable_range(node, &self.buffer))
            .collect()
    }

    pub fn foldable_ranges_at_indent_level(&self, level: usize) -> Vec<Range> {
        let tab_length = self.tab_length();
        self.fold_nodes_in(None)
            .iter()
            .filter(|node| folds::is_at_indent_level(node.start_position().column, level, tab_length))
            .filter_map(|node| folds::foldable_range(node, &self.buffer))
            .collect()
    }

    pub fn foldable_range_containing_point(&self, point: Position) -> Option<Range> {
        self.folds_at_row(point.row)
            .first()
            .and_then(|node| folds::foldable_range(node, &self.buffer))
    }

    pub fn is_foldable_at_row(&self, row: usize) -> bool {
        !self.folds_at_row(row).is_empty()
    }

    fn folds_at_row(&self, row: usize) -> Vec<Node<'_>> {
        let rows = Range::new(Position::row_start(row), Position::row_start(row + 1));
        self.fold_nodes_in(Some(rows))
            .into_iter()
            .filter(|node| node.start_position().row == row)
            .collect()
    }

    pub fn indent_level_for_line(line: &str, tab_length: usize) -> f64 {
        folds::indent_level_for_line(line, tab_length)
    }

    pub fn indent_level_for_row(&self, row: usize) -> f64 {
        let line = self.buffer.line_for_row(row).unwrap_or("");
        folds::indent_level_for_line(line, self.tab_length())
    }

    fn tab_length(&self) -> usize {
        self.grammar
            .as_ref()
            .map(Grammar::tab_length)
            .unwrap_or(crate::config::DEFAULT_TAB_LENGTH)
    }

    pub fn drain_events(&mut self) -> Vec<HighlightEvent> {
        self.events.drain()
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    pub fn grammar(&self) -> Option<&Grammar> {
        self.grammar.as_ref()
    }

    pub fn index(&self) -> &BoundaryIndex {
        &self.index
    }

    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }
}

/// Query range for recomputing `span`.
///
/// Tree-sitter only yields nodes that overlap the range, so nodes ending at
/// `span.start` or starting at `span.end` would be missed. The window reaches
/// one row back and one column forward to catch them.
fn query_window(span: Range) -> Range {
    let start = Position::row_start(span.start.row.saturating_sub(1));
    let end = if span.end.is_max() {
        Position::MAX
    } else {
        Position::new(span.end.row, span.end.column.saturating_add(1))
    };
    Range::new(start, end)
}

/// Sort spans and merge the ones that overlap or touch
fn merge_spans(mut spans: Vec<Range>) -> Vec<Range> {
    spans.sort();
    let mut merged: Vec<Range> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

fn collect_node_types(node: Node<'_>, anonymous: bool, point: Position, scopes: &mut Vec<String>) {
    let start = Position::from(node.start_position());
    let end = Position::from(node.end_position());
    if start > point || end < point {
        return;
    }
    if anonymous {
        scopes.push(format!("\"{}\"", node.kind()));
    } else {
        scopes.push(node.kind().to_string());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_node_types(child, !child.is_named(), point, scopes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_spans_joins_touching_spans() {
        let row = |a: usize, b: usize| Range::new(Position::row_start(a), Position::row_start(b));
        assert_eq!(
            merge_spans(vec![row(4, 5), row(0, 1), row(1, 2), row(7, 9)]),
            vec![row(0, 2), row(4, 5), row(7, 9)]
        );
    }

    #[test]
    fn test_query_window_reaches_back_one_row() {
        let window = query_window(Range::new(Position::row_start(3), Position::row_start(4)));
        assert_eq!(window, Range::new(Position::row_start(2), Position::new(4, 1)));

        let whole = query_window(Range::new(Position::ZERO, Position::MAX));
        assert_eq!(whole.end, Position::MAX);
    }

    #[test]
    fn test_not_ready_mode_degrades() {
        let mut mode = LanguageMode::new("fn main() {}", "source.rust");
        assert_eq!(mode.readiness(), &Readiness::Loading);
        assert_eq!(
            mode.scope_descriptor_for_position(Position::new(0, 3)).scopes(),
            ["source.rust"]
        );
        assert!(mode.foldable_ranges().is_empty());
        assert!(!mode.is_foldable_at_row(0));

        let mut iterator = mode.build_highlight_iterator();
        assert!(iterator.seek(Position::ZERO, 0).is_empty());
        assert_eq!(iterator.position(), Position::MAX);
    }

    #[test]
    fn test_edits_before_ready_update_buffer_only() {
        let mut mode = LanguageMode::new("fn main() {}", "source.rust");
        mode.apply_edit(Range::new(Position::new(0, 3), Position::new(0, 7)), "run")
            .unwrap();
        assert_eq!(mode.text(), "fn run() {}");
        assert!(mode.index().is_empty());
        assert!(mode.tree().is_none());
    }

    #[test]
    fn test_reload_requires_grammar() {
        let mut mode = LanguageMode::new("", "source.rust");
        assert!(matches!(mode.reload(), Err(HighlightError::NotReady)));
    }
}
