pub mod captures;
pub mod grammar;
pub mod parser_loader;
pub mod query_loader;
pub mod query_predicates;
pub mod readiness;

pub use captures::{fold_nodes, local_captures, node_range, syntax_captures};
pub use grammar::Grammar;
pub use parser_loader::{LoadedLanguage, ParserLoadError, load_language};
pub use query_predicates::PredicateFilter;
pub use readiness::{GrammarLoader, PendingGrammar, Readiness};
