use libloading::Library;
use tree_sitter::{Language, Query};

use super::parser_loader;
use super::query_loader;
use crate::config::{DEFAULT_TAB_LENGTH, LanguageConfig, QueryKind};
use crate::error::{HighlightError, HighlightResult};

/// A loaded language with its compiled queries.
///
/// Field order matters: the backing library is dropped after every query.
pub struct Grammar {
    name: String,
    scope_name: String,
    language: Language,
    highlights: Query,
    locals: Option<Query>,
    folds: Option<Query>,
    first_capture_wins: bool,
    tab_length: usize,
    _library: Option<Library>,
}

impl Grammar {
    /// Build a grammar from a statically linked language and a highlights query
    pub fn new(name: impl Into<String>, language: Language, highlights: &str) -> HighlightResult<Self> {
        let name = name.into();
        let highlights = query_loader::parse_query(&language, highlights)?;
        Ok(Self {
            scope_name: format!("source.{name}"),
            name,
            language,
            highlights,
            locals: None,
            folds: None,
            first_capture_wins: true,
            tab_length: DEFAULT_TAB_LENGTH,
            _library: None,
        })
    }

    pub fn with_locals(mut self, source: &str) -> HighlightResult<Self> {
        self.locals = Some(query_loader::parse_query(&self.language, source)?);
        Ok(self)
    }

    pub fn with_folds(mut self, source: &str) -> HighlightResult<Self> {
        self.folds = Some(query_loader::parse_query(&self.language, source)?);
        Ok(self)
    }

    pub fn with_scope_name(mut self, scope_name: impl Into<String>) -> Self {
        self.scope_name = scope_name.into();
        self
    }

    pub fn with_first_capture_wins(mut self, first_capture_wins: bool) -> Self {
        self.first_capture_wins = first_capture_wins;
        self
    }

    pub fn with_tab_length(mut self, tab_length: usize) -> Self {
        self.tab_length = tab_length.max(1);
        self
    }

    /// Load the grammar library and queries described by `config`.
    ///
    /// Missing locals or folds queries are not an error; a missing
    /// highlights query is.
    pub fn load(name: &str, config: &LanguageConfig, search_paths: &[String]) -> HighlightResult<Self> {
        let library_path =
            query_loader::resolve_library_path(config.library.as_deref(), name, search_paths)
                .ok_or_else(|| {
                    HighlightError::language_load(name, "no parser library found in search paths")
                })?;

        let loaded = parser_loader::load_language(&library_path, name, config.symbol.as_deref())
            .map_err(|e| HighlightError::language_load(name, e.to_string()))?;
        let (language, library) = loaded.into_parts();

        let highlights = query_loader::resolve_query_source(
            config.query_items(QueryKind::Highlights),
            search_paths,
            name,
            QueryKind::Highlights,
        )?
        .ok_or_else(|| HighlightError::query(format!("No highlights query for {name}")))?;

        let mut grammar = Self::new(name, language, &highlights)?
            .with_scope_name(config.scope_name_for(name))
            .with_first_capture_wins(config.first_capture_wins())
            .with_tab_length(config.tab_length());
        grammar._library = Some(library);

        let optional_query = |kind: QueryKind| -> HighlightResult<Option<String>> {
            let source =
                query_loader::resolve_query_source(config.query_items(kind), search_paths, name, kind)?;
            if source.is_none() {
                log::debug!(target: "irodori::language", "No {} for {}", kind.file_name(), name);
            }
            Ok(source)
        };
        if let Some(source) = optional_query(QueryKind::Locals)? {
            grammar = grammar.with_locals(&source)?;
        }
        if let Some(source) = optional_query(QueryKind::Folds)? {
            grammar = grammar.with_folds(&source)?;
        }

        log::info!(
            target: "irodori::language",
            "Loaded {} from {} ({} highlight patterns)",
            name,
            library_path,
            grammar.highlights.pattern_count()
        );
        Ok(grammar)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn highlights(&self) -> &Query {
        &self.highlights
    }

    pub fn locals(&self) -> Option<&Query> {
        self.locals.as_ref()
    }

    pub fn folds(&self) -> Option<&Query> {
        self.folds.as_ref()
    }

    pub fn first_capture_wins(&self) -> bool {
        self.first_capture_wins
    }

    pub fn tab_length(&self) -> usize {
        self.tab_length
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("scope_name", &self.scope_name)
            .field("locals", &self.locals.is_some())
            .field("folds", &self.folds.is_some())
            .field("first_capture_wins", &self.first_capture_wins)
            .finish_non_exhaustive()
    }
}
