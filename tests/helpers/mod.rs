//! Shared fixtures for integration tests: a statically linked Rust grammar
//! with small highlight, locals and folds queries.

#![allow(dead_code)]

use irodori::{Grammar, HighlightEvent, LanguageMode, Position, Range};

pub const HIGHLIGHTS: &str = r#"
(line_comment) @comment.line
(string_literal) @string.quoted
(integer_literal) @constant.numeric
"fn" @keyword.function
"let" @keyword.storage
(function_item name: (identifier) @entity.name.function)
(identifier) @variable.other
"#;

pub const LOCALS: &str = r#"
(function_item) @local.scope
(block) @local.scope
(let_declaration pattern: (identifier) @local.definition)
(parameter pattern: (identifier) @local.definition)
(identifier) @local.reference
"#;

pub const FOLDS: &str = r#"
(block) @fold
"#;

pub fn rust_grammar() -> Grammar {
    Grammar::new("rust", tree_sitter_rust::LANGUAGE.into(), HIGHLIGHTS)
        .and_then(|grammar| grammar.with_folds(FOLDS))
        .expect("test queries should compile")
}

pub fn rust_grammar_with_locals() -> Grammar {
    rust_grammar()
        .with_locals(LOCALS)
        .expect("locals query should compile")
}

pub fn rust_mode(text: &str) -> LanguageMode {
    LanguageMode::with_grammar(text, rust_grammar()).expect("mode should load")
}

pub fn rust_mode_with_locals(text: &str) -> LanguageMode {
    LanguageMode::with_grammar(text, rust_grammar_with_locals()).expect("mode should load")
}

pub fn scopes_at(mode: &mut LanguageMode, row: usize, column: usize) -> Vec<String> {
    mode.scope_descriptor_for_position(Position::new(row, column))
        .scopes()
        .to_vec()
}

/// Walk the highlight cursor over `start_row..=end_row` and render one line
/// per boundary
pub fn render_boundaries(mode: &mut LanguageMode, start_row: usize, end_row: usize) -> String {
    let mut raw = Vec::new();
    {
        let mut iterator = mode.build_highlight_iterator();
        iterator.seek(Position::row_start(start_row), end_row);
        while iterator.position().row <= end_row {
            raw.push((
                iterator.position(),
                iterator.close_scope_ids(),
                iterator.open_scope_ids(),
            ));
            if !iterator.move_to_successor() {
                break;
            }
        }
    }

    let names = |mode: &LanguageMode, ids: &[irodori::ScopeId]| {
        ids.iter()
            .filter_map(|id| mode.scope_for_id(*id))
            .collect::<Vec<_>>()
            .join(" ")
    };
    raw.iter()
        .map(|(position, close, open)| {
            format!(
                "{position} close [{}] open [{}]",
                names(mode, close),
                names(mode, open)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ranges of every `Changed` event drained from the mode
pub fn changed_ranges(mode: &mut LanguageMode) -> Vec<Range> {
    mode.drain_events()
        .into_iter()
        .filter_map(|event| match event {
            HighlightEvent::Changed { range } => Some(range),
            _ => None,
        })
        .collect()
}

pub fn range(start: (usize, usize), end: (usize, usize)) -> Range {
    Range::new(start.into(), end.into())
}
