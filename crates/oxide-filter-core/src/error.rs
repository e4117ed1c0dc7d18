//! Error types for condition building.

use thiserror::Error;

use crate::lexer::Span;
use crate::operation::Operation;
use crate::value::ValueType;

/// Errors raised while building a condition.
///
/// Only [`FilterError::TypeMismatch`] and [`FilterError::InvalidLiteral`]
/// describe bad data. Every other variant points at a configuration or
/// structural mistake and aborts the query under construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The value does not have the field's declared type.
    #[error(
        "type mismatch on `{field}` for `{operation}`: expected {expected}, found {found}"
    )]
    TypeMismatch {
        field: &'static str,
        operation: Operation,
        expected: ValueType,
        found: String,
    },

    /// A renderer refused a correctly typed value.
    #[error("rendering `{operation}` on `{field}` failed: {message}")]
    Render {
        field: &'static str,
        operation: Operation,
        message: String,
    },

    /// The field reference does not point into the bound model instance.
    #[error("field reference does not belong to the model")]
    FieldNotFound,

    /// No field carries the given serialization tag.
    #[error("unknown field tag `{0}`")]
    UnknownTag(String),

    /// The field has no column in the columns storage.
    #[error("no column configured for `{0}`")]
    ColumnNotConfigured(&'static str),

    /// The column does not support the requested operation.
    #[error("operation `{operation}` is not registered on `{field}`")]
    OperationNotRegistered {
        field: &'static str,
        operation: Operation,
    },

    /// The textual operation code is not part of the vocabulary.
    #[error("unknown operation code `{0}`")]
    UnknownOperation(String),

    /// A textual segment is not of the form `tag:op:value`.
    #[error("malformed segment `{0}`")]
    MalformedSegment(String),

    /// A textual segment holds more than one condition.
    #[error("segment `{0}` contains more than one condition")]
    AmbiguousSegment(String),

    /// A raw textual value cannot be read as the field's declared type.
    #[error("invalid value `{raw}` for `{field}`: {reason}")]
    InvalidLiteral {
        field: &'static str,
        raw: String,
        reason: String,
    },

    /// The textual filter is structurally invalid.
    #[error("{message} at position {}..{}", .span.start, .span.end)]
    Syntax { message: String, span: Span },

    /// Groups in a textual filter are nested too deeply.
    #[error("groups nested deeper than {0} levels")]
    TooDeep(usize),

    /// A condition was started on a builder that already holds one.
    #[error("builder already holds a condition; connect with `and` or `or`")]
    AlreadyStarted,

    /// The condition is empty, ends at a connective or has an open group.
    #[error("condition is incomplete")]
    Incomplete,

    /// A previous step failed; the accumulated SQL is unusable.
    #[error("condition construction was aborted by an earlier error")]
    Aborted,
}

impl FilterError {
    /// Creates a syntax error.
    #[must_use]
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    /// Returns true for data errors the caller can fix by supplying another
    /// value.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. } | Self::InvalidLiteral { .. })
    }
}

/// Result type alias for condition building.
pub type Result<T> = std::result::Result<T, FilterError>;
