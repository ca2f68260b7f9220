//! Read side of the index: the renderer cursor, scope descriptors and folds.

pub mod descriptor;
pub mod folds;
pub mod iterator;

pub use descriptor::ScopeDescriptor;
pub use folds::{foldable_range, indent_level_for_line, is_at_indent_level};
pub use iterator::{HighlightCursor, HighlightIterator, NullHighlightIterator};
