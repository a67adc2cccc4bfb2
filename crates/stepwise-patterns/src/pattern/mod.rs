//! Pattern lexing, compilation and outline-step rendering helpers.

mod example;
pub(crate) mod lexer;

use crate::errors::PatternError;
use regex::Regex;

pub use example::{RenderedStep, render_example_step};

/// Compile one candidate step pattern.
///
/// # Errors
/// Returns [`PatternError::InvalidPattern`] when `source` is not a valid
/// regular expression.
///
/// # Examples
/// ```
/// use stepwise_patterns::compile_pattern;
///
/// let regex = compile_pattern(r"I have (\d+) cats").expect("pattern compiles");
/// assert!(regex.is_match("I have 3 cats"));
/// assert!(compile_pattern("broken (").is_err());
/// ```
pub fn compile_pattern(source: &str) -> Result<Regex, PatternError> {
    Regex::new(source).map_err(|source_err| PatternError::InvalidPattern {
        pattern: source.to_string(),
        source: source_err,
    })
}
