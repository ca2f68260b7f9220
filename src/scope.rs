//! Scope identifiers and their names.

pub mod registry;

pub use registry::{ScopeId, ScopeRegistry, VARIABLE_SCOPE_ID, VARIABLE_SCOPE_NAME};
