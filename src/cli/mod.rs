//! CLI support for arlington-predicates
//!
//! Provides programmatic access to the `arlpred` commands so they can be
//! embedded in other grammar tooling.

mod check;
mod convert;
mod validate;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::json_to_object;
pub use validate::{ValidateOptions, ValidateSummary, execute_validate};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Predicate does not parse
    Parse(crate::ParseError),
    /// Bad `--pdf-version`
    Version(crate::VersionError),
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// Malformed grammar file
    Grammar { path: String, source: crate::GrammarError },
    /// No input provided
    NoInput,
    /// JSON that does not describe a PDF object
    InvalidObject(String),
    /// Number of grammar rows with invalid cells
    ValidationFailed(usize),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Parse error: {}", e),
            CliError::Version(e) => write!(f, "Invalid PDF version: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Grammar { path, source } => write!(f, "{}: {}", path, source),
            CliError::NoInput => write!(f, "No input provided. Pass the predicate as an argument or on stdin, and the object with --object."),
            CliError::InvalidObject(msg) => write!(f, "Invalid PDF object: {}", msg),
            CliError::ValidationFailed(n) => write!(f, "{} grammar row(s) failed validation", n),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Version(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Grammar { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<crate::ParseError> for CliError {
    fn from(e: crate::ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<crate::VersionError> for CliError {
    fn from(e: crate::VersionError) -> Self {
        CliError::Version(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
