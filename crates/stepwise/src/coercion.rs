//! Conversion of captured text into typed handler arguments.
//!
//! Each handler parameter after the runner and context implements
//! [`FromCapture`], which names its [`ArgKind`] and parses a captured regex
//! group. In [`CoercionMode::Lenient`] a numeric capture that does not parse
//! falls back to zero with a warning; [`CoercionMode::Strict`] turns the same
//! situation into a [`CoercionError`].

use std::fmt;

use thiserror::Error;

/// Kinds of value a handler parameter can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Arbitrary text.
    Text,
    /// Any primitive integer type.
    Integer,
    /// `f32`.
    Float32,
    /// `f64`.
    Float64,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        })
    }
}

/// How numeric captures that fail to parse are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionMode {
    /// Substitute zero and log a warning.
    #[default]
    Lenient,
    /// Fail the step.
    Strict,
}

/// A captured value could not be converted to the declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert `{value}` to {target} ({kind}): {reason}")]
pub struct CoercionError {
    /// Captured text.
    pub value: String,
    /// Declared kind.
    pub kind: ArgKind,
    /// Name of the Rust parameter type.
    pub target: &'static str,
    /// Parser message.
    pub reason: String,
}

/// Types that can be built from a captured regex group.
pub trait FromCapture: Sized + 'static {
    /// Declared kind of the parameter.
    const KIND: ArgKind;

    /// Parse `raw`.
    ///
    /// # Errors
    /// Returns the parser's message when `raw` is not a valid value.
    fn parse_capture(raw: &str) -> Result<Self, String>;

    /// Value used when lenient coercion swallows a parse failure.
    fn fallback() -> Self;
}

impl FromCapture for String {
    const KIND: ArgKind = ArgKind::Text;

    fn parse_capture(raw: &str) -> Result<Self, String> {
        Ok(raw.to_owned())
    }

    fn fallback() -> Self {
        Self::new()
    }
}

macro_rules! impl_from_capture {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl FromCapture for $ty {
                const KIND: ArgKind = $kind;

                fn parse_capture(raw: &str) -> Result<Self, String> {
                    raw.parse::<$ty>().map_err(|err| err.to_string())
                }

                fn fallback() -> Self {
                    <$ty>::default()
                }
            }
        )+
    };
}

impl_from_capture!(ArgKind::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_from_capture!(ArgKind::Float32 => f32);
impl_from_capture!(ArgKind::Float64 => f64);

/// Convert `raw` into `T` according to `mode`.
///
/// # Errors
/// Returns [`CoercionError`] when `raw` does not parse and `mode` is
/// [`CoercionMode::Strict`].
///
/// # Examples
/// ```
/// use stepwise::coercion::{CoercionMode, coerce};
///
/// assert_eq!(coerce::<i64>("42", CoercionMode::Strict).ok(), Some(42));
/// assert_eq!(coerce::<i64>("x", CoercionMode::Lenient).ok(), Some(0));
/// assert!(coerce::<i64>("x", CoercionMode::Strict).is_err());
/// ```
pub fn coerce<T: FromCapture>(raw: &str, mode: CoercionMode) -> Result<T, CoercionError> {
    T::parse_capture(raw).or_else(|reason| {
        let err = CoercionError {
            value: raw.to_owned(),
            kind: T::KIND,
            target: std::any::type_name::<T>(),
            reason,
        };
        match mode {
            CoercionMode::Lenient => {
                log::warn!("{err}; using the default value instead");
                Ok(T::fallback())
            }
            CoercionMode::Strict => Err(err),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::logger;
    use rstest::rstest;

    #[rstest]
    fn parses_each_kind(_logger: ()) {
        assert_eq!(coerce::<String>("hi there", CoercionMode::Strict).ok(), Some("hi there".into()));
        assert_eq!(coerce::<u8>("7", CoercionMode::Strict).ok(), Some(7));
        assert_eq!(coerce::<i32>("-7", CoercionMode::Strict).ok(), Some(-7));
        assert_eq!(coerce::<f32>("1.5", CoercionMode::Strict).ok(), Some(1.5));
        assert_eq!(coerce::<f64>("-0.25", CoercionMode::Strict).ok(), Some(-0.25));
    }

    #[rstest]
    #[case("abc")]
    #[case("")]
    #[case("300")]
    fn lenient_mode_falls_back_to_zero(_logger: (), #[case] raw: &str) {
        assert_eq!(coerce::<u8>(raw, CoercionMode::Lenient).ok(), Some(0));
    }

    #[rstest]
    fn strict_mode_reports_the_failure(_logger: ()) {
        let Err(err) = coerce::<u16>("lots", CoercionMode::Strict) else {
            panic!("strict coercion should fail");
        };
        assert_eq!(err.kind, ArgKind::Integer);
        assert_eq!(err.value, "lots");
        assert_eq!(err.target, "u16");
        assert!(err.to_string().starts_with("cannot convert `lots` to u16 (integer)"));
    }

    #[test]
    fn declares_kinds() {
        assert_eq!(<String as FromCapture>::KIND, ArgKind::Text);
        assert_eq!(<usize as FromCapture>::KIND, ArgKind::Integer);
        assert_eq!(<f32 as FromCapture>::KIND, ArgKind::Float32);
        assert_eq!(<f64 as FromCapture>::KIND, ArgKind::Float64);
        assert_eq!(ArgKind::Float64.to_string(), "float64");
    }
}
