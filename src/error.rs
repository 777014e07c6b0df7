// error.rs
//
// Build-stage errors for the assembler and linker. Parse errors carry a
// source location; link errors do not (by the time linking runs, the
// offending construct may span several files).

use std::fmt;

/// A single location in a source file, attached to every parse error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.file, self.line)
    }
}

/// An error from the build half of the pipeline. Interpreter traps are a
/// separate channel (`exception::FailToInterpret`) since they are returned
/// by value from the hot loop rather than propagated as errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("Parse error at {location}: {message}")]
    Parse { location: Location, message: String },
    #[error("Link error: {0}")]
    Link(String),
}

impl BuildError {
    pub fn parse(message: impl Into<String>, location: Location) -> Self {
        BuildError::Parse { location, message: message.into() }
    }

    pub fn link(message: impl Into<String>) -> Self {
        BuildError::Link(message.into())
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
