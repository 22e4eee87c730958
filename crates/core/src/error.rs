//! Error types for prism.

use crate::value::Value;
use alloc::string::String;
use core::fmt;

/// Result type alias for prism operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for prism operations.
///
/// Lookup misses are not errors; `get`/`at` style accessors return `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A view was built without a source collection.
    MissingCollection,
    /// A filter spec has the wrong shape.
    InvalidSpec {
        message: String,
    },
    /// Unique index violation in a base collection.
    UniqueConstraint {
        index: String,
        value: Value,
    },
    /// A lookup named an index that was never declared.
    IndexNotFound {
        index: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingCollection => {
                write!(f, "Invalid configuration: a view requires a source collection")
            }
            Error::InvalidSpec { message } => {
                write!(f, "Invalid filter spec: {}", message)
            }
            Error::UniqueConstraint { index, value } => {
                write!(f, "Unique constraint violation on index {}: {}", index, value)
            }
            Error::IndexNotFound { index } => {
                write!(f, "Index not found: {}", index)
            }
        }
    }
}

impl Error {
    /// Creates an invalid spec error.
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Error::InvalidSpec {
            message: message.into(),
        }
    }

    /// Creates a unique constraint error.
    pub fn unique_constraint(index: impl Into<String>, value: Value) -> Self {
        Error::UniqueConstraint {
            index: index.into(),
            value,
        }
    }

    /// Creates an index not found error.
    pub fn index_not_found(index: impl Into<String>) -> Self {
        Error::IndexNotFound {
            index: index.into(),
        }
    }

    /// Returns true for errors raised while configuring a view.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingCollection | Error::InvalidSpec { .. })
    }
}
