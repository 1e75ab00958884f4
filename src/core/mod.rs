//! Cross-cutting compiler machinery: errors, the issue collector, the
//! auto-wiring resolver, the per-pass type cache, source extension points
//! and diagnostic rendering.

pub mod autowire;
pub mod compile_context;
pub mod error;
pub mod issues;
pub mod output;
pub mod sources;
pub mod types;
