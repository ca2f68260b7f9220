//! Lexical scope resolution and reference invalidation.

pub mod invalidation;
pub mod resolver;

pub use invalidation::InvalidationTracker;
pub use resolver::{LocalCapture, LocalKind, ResolverStats, resolve};
