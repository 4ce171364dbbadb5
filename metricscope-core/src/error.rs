//! Error types for MetricScope core.

use std::{error::Error, fmt, io};

/// Error type for MetricScope core operations.
#[derive(Debug)]
pub enum MetricScopeError {
    /// A metric key that the registry does not recognise.
    UnknownMetric(String),
    /// A numeric value that is NaN, infinite, or out of its valid range.
    InvalidValue {
        /// Field or metric the value belongs to.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A trend was requested over a history with no snapshots.
    EmptyHistory,
    /// Backend payload missing a required field or not shaped as expected.
    MalformedSnapshot(String),
    /// An underlying I/O error.
    Io(io::Error),
}

impl MetricScopeError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MetricScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMetric(key) => write!(f, "unknown metric: {key}"),
            Self::InvalidValue { field, reason } => write!(f, "invalid value for {field}: {reason}"),
            Self::EmptyHistory => write!(f, "history contains no snapshots"),
            Self::MalformedSnapshot(message) => write!(f, "malformed snapshot: {message}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl Error for MetricScopeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MetricScopeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Convenience result type for MetricScope core.
pub type Result<T> = std::result::Result<T, MetricScopeError>;
