use crate::config::{QueryItem, QueryKind, QuerySource};
use crate::error::{HighlightError, HighlightResult};
use path_clean::PathClean;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Query};

/// Library extensions probed under `<base>/parser/`, in order
const LIBRARY_EXTENSIONS: [&str; 3] = ["so", "dylib", "dll"];

/// Parents named by a leading `; inherits: a,b` line
pub fn parse_inherits_directive(content: &str) -> Vec<String> {
    let first_line = content.lines().next().unwrap_or("");
    match first_line.strip_prefix("; inherits:") {
        Some(rest) => rest
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => Vec::new(),
    }
}

/// Concatenate configured query items, reading path items from disk
pub fn read_query_items(items: &[QueryItem]) -> HighlightResult<String> {
    let mut combined = String::new();
    for item in items {
        match &item.source {
            QuerySource::Path { path } => {
                let normalized = PathBuf::from(path).clean();
                let content = fs::read_to_string(&normalized).map_err(|e| {
                    HighlightError::query(format!(
                        "Failed to read query file {}: {e}",
                        normalized.display()
                    ))
                })?;
                combined.push_str(&content);
            }
            QuerySource::Query { query } => combined.push_str(query),
        }
        combined.push('\n');
    }
    Ok(combined)
}

/// First `<base>/queries/<language>/<file>` that exists
pub fn find_query_file(search_paths: &[String], language: &str, kind: QueryKind) -> Option<PathBuf> {
    search_paths
        .iter()
        .map(|base| {
            Path::new(base)
                .join("queries")
                .join(language)
                .join(kind.file_name())
                .clean()
        })
        .find(|candidate| candidate.exists())
}

/// Read a query from the search paths, prepending inherited parents.
///
/// Returns `Ok(None)` when no file exists for the language.
pub fn read_query_file(
    search_paths: &[String],
    language: &str,
    kind: QueryKind,
) -> HighlightResult<Option<String>> {
    let mut visiting = Vec::new();
    read_with_inheritance(search_paths, language, kind, &mut visiting)
}

fn read_with_inheritance(
    search_paths: &[String],
    language: &str,
    kind: QueryKind,
    visiting: &mut Vec<String>,
) -> HighlightResult<Option<String>> {
    if visiting.iter().any(|seen| seen == language) {
        return Err(HighlightError::query(format!(
            "Circular query inheritance: {} -> {language}",
            visiting.join(" -> ")
        )));
    }
    let Some(path) = find_query_file(search_paths, language, kind) else {
        return Ok(None);
    };
    let content = fs::read_to_string(&path).map_err(|e| {
        HighlightError::query(format!("Failed to read query file {}: {e}", path.display()))
    })?;

    let parents = parse_inherits_directive(&content);
    if parents.is_empty() {
        return Ok(Some(content));
    }

    visiting.push(language.to_string());
    let mut combined = String::new();
    for parent in &parents {
        match read_with_inheritance(search_paths, parent, kind, visiting)? {
            Some(parent_content) => {
                combined.push_str(&parent_content);
                combined.push('\n');
            }
            None => log::warn!(
                target: "irodori::query",
                "{} query for {} inherits missing language {}",
                kind.file_name(),
                language,
                parent
            ),
        }
    }
    visiting.pop();

    // Drop the directive line itself
    combined.extend(content.lines().skip(1).flat_map(|line| [line, "\n"]));
    Ok(Some(combined))
}

/// Query source for `kind`: configured items first, then the search paths
pub fn resolve_query_source(
    items: Option<&[QueryItem]>,
    search_paths: &[String],
    language: &str,
    kind: QueryKind,
) -> HighlightResult<Option<String>> {
    match items {
        Some(items) => read_query_items(items).map(Some),
        None => read_query_file(search_paths, language, kind),
    }
}

pub fn parse_query(language: &Language, source: &str) -> HighlightResult<Query> {
    Query::new(language, source).map_err(|e| HighlightError::query(format!("Failed to parse query: {e}")))
}

/// Resolve the grammar library for `language`.
///
/// An explicit path wins; otherwise `<base>/parser/<language>.{so,dylib,dll}`
/// is probed in each search path.
pub fn resolve_library_path(
    library: Option<&str>,
    language: &str,
    search_paths: &[String],
) -> Option<String> {
    if let Some(lib) = library {
        return Some(PathBuf::from(lib).clean().to_string_lossy().into_owned());
    }

    search_paths
        .iter()
        .flat_map(|base| {
            LIBRARY_EXTENSIONS.iter().map(move |ext| {
                PathBuf::from(base)
                    .join("parser")
                    .join(format!("{language}.{ext}"))
                    .clean()
            })
        })
        .find(|candidate| candidate.exists())
        .map(|path| path.to_string_lossy().into_owned())
}
