//! CQL front-end diagnostics

use crate::{ErrorCode, SourceLocation, Span};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - elaboration of the library failed
    Error,
    /// Warning - potential issue but the library still elaborated
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Broad classification of a parsing error, independent of its [`ErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    /// Raised by the grammar/lexer collaborator.
    Syntax,
    /// Raised by the reference resolver, type system, or elaborator during
    /// semantic analysis (unknown identifier, overload mismatch, duplicate
    /// definition, conversion failure, and similar).
    Validation,
    /// A bug in the front-end itself, not attributable to the input.
    Internal,
    /// A feature the grammar recognizes but the elaborator does not
    /// implement (e.g. a context other than `Patient`).
    Unsupported,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorType::Syntax => write!(f, "syntax"),
            ErrorType::Validation => write!(f, "validation"),
            ErrorType::Internal => write!(f, "internal"),
            ErrorType::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A single diagnostic raised while parsing or elaborating a library.
///
/// `line` is 1-based and `column` is 0-based, matching the position
/// convention the grammar collaborator reports a node's start token in.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{error_type}: {message}")]
pub struct ParsingError {
    /// Human-readable message.
    pub message: String,
    /// 1-based line number.
    pub line: usize,
    /// 0-based column number.
    pub column: usize,
    /// Broad error classification.
    pub error_type: ErrorType,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Stable error code for documentation/tooling.
    pub code: ErrorCode,
    /// The underlying cause, if this diagnostic wraps another error.
    #[source]
    pub cause: Option<Box<ParsingError>>,
}

impl ParsingError {
    /// Build a new diagnostic at the origin (1,0); use [`Self::at`] or
    /// [`Self::at_span`] to attach a real position.
    pub fn new(
        code: ErrorCode,
        error_type: ErrorType,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            line: 1,
            column: 0,
            error_type,
            severity,
            code,
            cause: None,
        }
    }

    /// Attach a 1-based line and 0-based column.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Attach a position derived from a byte span and the originating
    /// source text. [`SourceLocation::from_span`] reports a 1-based column;
    /// it is converted to 0-based here to match the diagnostics contract.
    pub fn at_span(mut self, span: Span, source: &str) -> Self {
        let loc = SourceLocation::from_span(span, source);
        self.line = loc.line;
        self.column = loc.column.saturating_sub(1);
        self
    }

    /// Wrap an underlying cause for chaining.
    pub fn caused_by(mut self, cause: ParsingError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn syntax(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, ErrorType::Syntax, Severity::Error, message)
    }

    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, ErrorType::Validation, Severity::Error, message)
    }

    pub fn validation_warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, ErrorType::Validation, Severity::Warning, message)
    }

    pub fn unsupported(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, ErrorType::Unsupported, Severity::Error, message)
    }

    pub fn internal(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, ErrorType::Internal, Severity::Error, message)
    }

    /// `true` for diagnostics that fail the library as a whole.
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// All diagnostics accumulated while elaborating a single library.
///
/// Exposes the whole list for iteration and the first error-severity entry
/// for cause-chaining, per the diagnostics contract.
#[derive(Debug, Clone, Default, Error, Serialize, Deserialize)]
pub struct LibraryErrors {
    pub errors: Vec<ParsingError>,
}

impl fmt::Display for LibraryErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first() {
            Some(first) => write!(f, "{} (and {} more)", first, self.errors.len().saturating_sub(1)),
            None => write!(f, "no errors"),
        }
    }
}

impl LibraryErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParsingError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ParsingError>) {
        self.errors.extend(errors);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsingError> {
        self.errors.iter()
    }

    /// The first `Error`-severity diagnostic, used as the chained cause.
    pub fn first(&self) -> Option<&ParsingError> {
        self.errors
            .iter()
            .find(|e| e.severity == Severity::Error)
            .or_else(|| self.errors.first())
    }

    /// A library with any `Error`-severity diagnostic is a failure.
    pub fn has_fatal(&self) -> bool {
        self.errors.iter().any(ParsingError::is_fatal)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl IntoIterator for LibraryErrors {
    type Item = ParsingError;
    type IntoIter = std::vec::IntoIter<ParsingError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Diagnostics accumulated while resolving `ParseParameters` input.
#[derive(Debug, Clone, Default, Error, Serialize, Deserialize)]
pub struct ParameterErrors {
    pub errors: Vec<ParsingError>,
}

impl fmt::Display for ParameterErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first() {
            Some(first) => write!(f, "{} (and {} more)", first, self.errors.len().saturating_sub(1)),
            None => write!(f, "no errors"),
        }
    }
}

impl ParameterErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParsingError) {
        self.errors.push(error);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsingError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&ParsingError> {
        self.errors.first()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CQL0001;

    #[test]
    fn test_parsing_error_position() {
        let err = ParsingError::syntax(CQL0001, "unexpected '}'").at(3, 7);
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 7);
        assert_eq!(err.error_type, ErrorType::Syntax);
    }

    #[test]
    fn test_at_span_converts_to_zero_based_column() {
        let source = "define X: }";
        let err = ParsingError::syntax(CQL0001, "unexpected '}'").at_span(Span::single(10), source);
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 10);
    }

    #[test]
    fn test_library_errors_fatal() {
        let mut errors = LibraryErrors::new();
        errors.push(ParsingError::validation_warning(CQL0001, "minor"));
        assert!(!errors.has_fatal());
        errors.push(ParsingError::validation(CQL0001, "fatal"));
        assert!(errors.has_fatal());
        assert_eq!(errors.first().unwrap().message, "fatal");
    }
}
