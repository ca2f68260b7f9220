use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default tab width used by indent-level fold filtering
pub const DEFAULT_TAB_LENGTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QueryItem {
    #[serde(flatten)]
    pub source: QuerySource,
}

impl QueryItem {
    pub fn inline(query: impl Into<String>) -> Self {
        Self {
            source: QuerySource::Query {
                query: query.into(),
            },
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            source: QuerySource::Path { path: path.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum QuerySource {
    Path { path: String },
    Query { query: String },
}

/// Query files a language mode consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Highlights,
    Locals,
    Folds,
}

impl QueryKind {
    /// File name under `queries/<language>/`
    pub fn file_name(&self) -> &'static str {
        match self {
            QueryKind::Highlights => "highlights.scm",
            QueryKind::Locals => "locals.scm",
            QueryKind::Folds => "folds.scm",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Path to the compiled grammar; searched under `<search path>/parser/` when absent
    pub library: Option<String>,
    /// Exported language function; `tree_sitter_<language>` when absent
    pub symbol: Option<String>,
    /// Root scope reported first by every scope descriptor
    pub scope_name: Option<String>,
    pub filetypes: Vec<String>,
    /// Highlight query; `queries/<language>/highlights.scm` when empty
    pub highlights: Vec<QueryItem>,
    pub locals: Option<Vec<QueryItem>>,
    pub folds: Option<Vec<QueryItem>>,
    /// Drop later captures whose range exactly matches an earlier one
    pub first_capture_wins: Option<bool>,
    pub tab_length: Option<usize>,
}

impl LanguageConfig {
    pub fn scope_name_for(&self, language: &str) -> String {
        self.scope_name
            .clone()
            .unwrap_or_else(|| format!("source.{language}"))
    }

    pub fn first_capture_wins(&self) -> bool {
        self.first_capture_wins.unwrap_or(true)
    }

    pub fn tab_length(&self) -> usize {
        self.tab_length.unwrap_or(DEFAULT_TAB_LENGTH)
    }

    pub fn query_items(&self, kind: QueryKind) -> Option<&[QueryItem]> {
        match kind {
            QueryKind::Highlights if !self.highlights.is_empty() => Some(&self.highlights),
            QueryKind::Highlights => None,
            QueryKind::Locals => self.locals.as_deref(),
            QueryKind::Folds => self.folds.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub search_paths: Option<Vec<String>>,
    pub languages: HashMap<String, LanguageConfig>,
}

impl Settings {
    /// Configured search paths followed by the platform data directory
    pub fn effective_search_paths(&self) -> Vec<String> {
        let mut paths = self.search_paths.clone().unwrap_or_default();
        if let Some(default) = default_data_dir() {
            let default = default.to_string_lossy().into_owned();
            if !paths.contains(&default) {
                paths.push(default);
            }
        }
        paths
    }

    /// Find the language whose filetypes include the file's extension
    pub fn language_for_path(&self, path: &Path) -> Option<(&str, &LanguageConfig)> {
        let extension = path.extension()?.to_str()?;
        let mut matches: Vec<_> = self
            .languages
            .iter()
            .filter(|(_, config)| config.filetypes.iter().any(|ft| ft == extension))
            .collect();
        // Deterministic pick when several languages claim an extension
        matches.sort_by(|a, b| a.0.cmp(b.0));
        matches
            .into_iter()
            .next()
            .map(|(name, config)| (name.as_str(), config))
    }
}

/// Platform data directory for grammars and queries, e.g. `~/.local/share/irodori`
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("irodori"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_language_config_from_toml() {
        let settings: Settings = toml::from_str(
            r#"
            search_paths = ["/opt/grammars"]

            [languages.rust]
            library = "/opt/grammars/parser/rust.so"
            filetypes = ["rs"]
            highlights = [{ path = "/opt/queries/rust/highlights.scm" }, { query = "(identifier) @variable" }]
            locals = [{ query = "(block) @local.scope" }]
            first_capture_wins = false
            tab_length = 4
            "#,
        )
        .unwrap();

        let rust = &settings.languages["rust"];
        assert_eq!(rust.library.as_deref(), Some("/opt/grammars/parser/rust.so"));
        assert_eq!(rust.highlights.len(), 2);
        assert_eq!(rust.highlights[1], QueryItem::inline("(identifier) @variable"));
        assert!(!rust.first_capture_wins());
        assert_eq!(rust.tab_length(), 4);
        assert_eq!(rust.scope_name_for("rust"), "source.rust");
        assert!(rust.query_items(QueryKind::Folds).is_none());
    }

    #[test]
    fn test_defaults_apply_to_missing_fields() {
        let config = LanguageConfig::default();
        assert!(config.first_capture_wins());
        assert_eq!(config.tab_length(), DEFAULT_TAB_LENGTH);
        assert!(config.query_items(QueryKind::Highlights).is_none());
    }

    #[test]
    fn test_language_for_path_matches_extension() {
        let mut settings = Settings::default();
        settings.languages.insert(
            "rust".into(),
            LanguageConfig {
                filetypes: vec!["rs".into()],
                ..Default::default()
            },
        );

        let (name, _) = settings.language_for_path(Path::new("src/main.rs")).unwrap();
        assert_eq!(name, "rust");
        assert!(settings.language_for_path(Path::new("README.md")).is_none());
    }
}
