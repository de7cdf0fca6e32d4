//! Error types for the filterbridge crate.

use thiserror::Error;

use crate::comparator::Comparator;

/// Errors that can occur while encoding or decoding filter trees.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A function-backed wire leaf names a function other than `proximity`.
    ///
    /// This aborts the whole decode; no partial tree is produced.
    #[error("unsupported filter function in filter view: {name}")]
    UnsupportedFilterFunction { name: String },

    /// The parameters of a supported filter function have the wrong shape.
    #[error("invalid parameters for filter function '{function}': {reason}")]
    InvalidFunctionParams {
        function: &'static str,
        reason: String,
    },

    /// A UI leaf's value slot does not have the shape its comparator needs.
    #[error("comparator '{comparator}' expects a {expected} value")]
    MalformedValue {
        comparator: Comparator,
        expected: &'static str,
    },

    /// The tree is nested deeper than the configured limit.
    #[error("filter tree nesting exceeds the limit of {limit} levels")]
    DepthExceeded { limit: usize },

    /// JSON input could not be parsed into a filter tree or catalog.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for filterbridge operations.
pub type Result<T> = std::result::Result<T, FilterError>;
