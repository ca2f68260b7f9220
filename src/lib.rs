pub mod boundary;
pub mod config;
pub mod error;
pub mod events;
pub mod highlight;
pub mod language;
pub mod locals;
pub mod mode;
pub mod scope;
pub mod text;

pub use error::{HighlightError, HighlightResult};
pub use events::HighlightEvent;
pub use highlight::{HighlightCursor, ScopeDescriptor};
pub use language::{Grammar, GrammarLoader, Readiness};
pub use mode::LanguageMode;
pub use scope::{ScopeId, ScopeRegistry};
pub use text::{Position, Range};
