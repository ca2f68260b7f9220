//! Boundary index: where scopes open and close.
//!
//! - `entry`: per-position scope events and lexical metadata
//! - `index`: ordered storage, cursors and the backward scope-chain search
//! - `consolidator`: turns raw captures into entries for a dirty span

pub mod consolidator;
pub mod entry;
pub mod index;

pub use consolidator::{Capture, CaptureProperties, ConsolidationStats, consolidate};
pub use entry::{BoundaryEntry, NodeSpan, ScopeMark, ScopeRole};
pub use index::{BoundaryIndex, Cursor};
