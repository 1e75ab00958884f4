use std::io;
use thiserror::Error;

/// Programmatic failures of the compiler machinery itself.
///
/// Configuration-level problems (duplicate names, unresolved wiring, failed
/// type loads) never surface here — they flow through the pass-wide issue
/// collector so one pass reports the maximal diagnostic set.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Composition parse error: {0}")]
    ModelParseError(String),
    #[error("{0} does not carry link role {1}")]
    UnsupportedLink(String, &'static str),
    #[error("Validation error: {0}")]
    ValidationError(String),
}
