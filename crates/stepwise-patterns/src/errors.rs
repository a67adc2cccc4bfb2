//! Error types shared by the pattern modules.

use thiserror::Error;

/// Errors surfaced while registering parameter types or compiling patterns.
///
/// # Examples
/// ```
/// use stepwise_patterns::PatternError;
///
/// let err = PatternError::EmptyToken;
/// assert_eq!(err.to_string(), "parameter type token must not be empty");
/// ```
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// A parameter type was registered with an empty token.
    #[error("parameter type token must not be empty")]
    EmptyToken,
    /// A parameter type was registered without any fragment.
    #[error("parameter type `{token}` needs at least one regex fragment")]
    NoFragments {
        /// Token that was being registered.
        token: String,
    },
    /// A parameter type fragment is not a valid regular expression.
    #[error("the regular expression for parameter type `{token}` doesn't compile: {fragment}")]
    InvalidFragment {
        /// Token that was being registered.
        token: String,
        /// Offending fragment.
        fragment: String,
        /// Underlying regex failure.
        #[source]
        source: regex::Error,
    },
    /// A step pattern candidate is not a valid regular expression.
    #[error("step pattern `{pattern}` doesn't compile: {source}")]
    InvalidPattern {
        /// Candidate pattern source.
        pattern: String,
        /// Underlying regex failure.
        #[source]
        source: regex::Error,
    },
}
