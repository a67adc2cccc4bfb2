//! Step-pattern utilities shared by the stepwise runtime.
//!
//! The crate owns the parameter-type registry used to expand human-friendly
//! step patterns into regular expressions, the type sniffing applied to
//! scenario outline cells, capture extraction, and the specificity score used
//! to rank competing step definitions.

mod capture;
mod errors;
mod params;
mod pattern;
mod sniff;
mod specificity;

pub use capture::{captured_values, count_matches};
pub use errors::PatternError;
pub use params::{ParameterType, ParameterTypes};
pub use pattern::{RenderedStep, compile_pattern, render_example_step};
pub use sniff::{
    FLOAT_CELL_PATTERN, INTEGER_CELL_PATTERN, SIGNED_INTEGER_CELL_PATTERN, TEXT_CELL_PATTERN,
    sniff_cell_pattern,
};
pub use specificity::SpecificityScore;
