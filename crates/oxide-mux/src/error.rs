//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum MuxError {
    /// The route pattern is malformed.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A named segment carries a regex constraint that does not compile.
    #[error("invalid constraint in segment {segment:?} of pattern {pattern:?}: {source}")]
    InvalidConstraint {
        pattern: String,
        segment: String,
        #[source]
        source: regex::Error,
    },

    /// A parameter was looked up that the matched route never bound.
    #[error("path parameter {0:?} is not bound for this request")]
    UnboundParam(String),

    /// Configuration could not be parsed.
    #[error("invalid router configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, MuxError>;
