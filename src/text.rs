//! Text primitives.
//!
//! This module provides the document-side types the index is built on:
//! - Ordered (row, column) positions and ranges
//! - An owned text buffer with a line table
//! - Position shifting for edits

pub mod buffer;
pub mod edits;
pub mod position;

pub use buffer::{TextBuffer, TextChange, compute_line_starts};
pub use edits::{EditShift, Shifted};
pub use position::{Position, Range};
