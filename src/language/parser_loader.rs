use libloading::{Library, Symbol};
use thiserror::Error;
use tree_sitter::Language;

#[derive(Debug, Error)]
pub enum ParserLoadError {
    #[error("Failed to load library: {0}")]
    Library(#[from] libloading::Error),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),
}

/// A tree-sitter language together with the shared library that backs it.
///
/// The `Language` points into the library's static data, so the library must
/// outlive every parser, tree, and query built from it.
pub struct LoadedLanguage {
    language: Language,
    library: Library,
}

impl LoadedLanguage {
    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn into_parts(self) -> (Language, Library) {
        (self.language, self.library)
    }
}

impl std::fmt::Debug for LoadedLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedLanguage")
            .field("abi_version", &self.language.abi_version())
            .finish_non_exhaustive()
    }
}

/// Exported language function name for `language` by tree-sitter convention
pub fn default_symbol(language: &str) -> String {
    format!("tree_sitter_{}", language.replace('-', "_"))
}

/// Load a tree-sitter language from a dynamic library.
///
/// `symbol` overrides the exported function name when the grammar does not
/// follow the `tree_sitter_<language>` convention.
pub fn load_language(
    path: &str,
    language: &str,
    symbol: Option<&str>,
) -> Result<LoadedLanguage, ParserLoadError> {
    let func_name = symbol
        .map(str::to_string)
        .unwrap_or_else(|| default_symbol(language));

    log::debug!(
        target: "irodori::language",
        "Loading {} from {} via {}",
        language,
        path,
        func_name
    );

    let library = unsafe { Library::new(path)? };

    let language = {
        let language_fn: Symbol<unsafe extern "C" fn() -> Language> = unsafe {
            library
                .get(func_name.as_bytes())
                .map_err(|_| ParserLoadError::SymbolNotFound(func_name.clone()))?
        };
        unsafe { language_fn() }
    };

    Ok(LoadedLanguage { language, library })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_symbol_follows_convention() {
        assert_eq!(default_symbol("rust"), "tree_sitter_rust");
        assert_eq!(default_symbol("c-sharp"), "tree_sitter_c_sharp");
    }

    #[test]
    fn test_missing_library_is_reported() {
        let err = load_language("/nonexistent/parser/rust.so", "rust", None).unwrap_err();
        assert!(matches!(err, ParserLoadError::Library(_)));
        assert!(err.to_string().starts_with("Failed to load library"));
    }

    #[test]
    fn test_error_display() {
        let err = ParserLoadError::SymbolNotFound("tree_sitter_rust".to_string());
        assert_eq!(err.to_string(), "Symbol not found: tree_sitter_rust");
    }
}
