//! Type sniffing for scenario outline cells.
//!
//! When an outline step is rendered for an example row, each substituted cell
//! becomes a capture group in the derived pattern. The group is chosen from the
//! shape of the cell so numeric columns keep matching numbers only.

/// Capture group used for unsigned integer cells.
pub const INTEGER_CELL_PATTERN: &str = r"(\d+)";

/// Capture group used for integer cells with an explicit sign.
pub const SIGNED_INTEGER_CELL_PATTERN: &str = r"([-+]?\d+)";

/// Capture group used for decimal cells.
pub const FLOAT_CELL_PATTERN: &str = r"([+-]?(?:[0-9]*[.])?[0-9]+)";

/// Capture group used for every other cell.
pub const TEXT_CELL_PATTERN: &str = r"(.*)";

/// Pick the capture group that describes `cell`.
///
/// # Examples
/// ```
/// use stepwise_patterns::{
///     FLOAT_CELL_PATTERN, INTEGER_CELL_PATTERN, TEXT_CELL_PATTERN, sniff_cell_pattern,
/// };
///
/// assert_eq!(sniff_cell_pattern("42"), INTEGER_CELL_PATTERN);
/// assert_eq!(sniff_cell_pattern("4.2"), FLOAT_CELL_PATTERN);
/// assert_eq!(sniff_cell_pattern("forty two"), TEXT_CELL_PATTERN);
/// ```
#[must_use]
pub fn sniff_cell_pattern(cell: &str) -> &'static str {
    let (signed, unsigned) = cell
        .strip_prefix(['+', '-'])
        .map_or((false, cell), |rest| (true, rest));
    if is_digits(unsigned) {
        return if signed {
            SIGNED_INTEGER_CELL_PATTERN
        } else {
            INTEGER_CELL_PATTERN
        };
    }
    if is_decimal(unsigned) {
        return FLOAT_CELL_PATTERN;
    }
    TEXT_CELL_PATTERN
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

// `[0-9]*[.][0-9]+`, the only decimal shape the float group matches in full.
fn is_decimal(text: &str) -> bool {
    text.split_once('.')
        .is_some_and(|(whole, fraction)| (whole.is_empty() || is_digits(whole)) && is_digits(fraction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", INTEGER_CELL_PATTERN)]
    #[case("123", INTEGER_CELL_PATTERN)]
    #[case("-7", SIGNED_INTEGER_CELL_PATTERN)]
    #[case("+7", SIGNED_INTEGER_CELL_PATTERN)]
    #[case("1.5", FLOAT_CELL_PATTERN)]
    #[case(".5", FLOAT_CELL_PATTERN)]
    #[case("-0.25", FLOAT_CELL_PATTERN)]
    #[case("1.", TEXT_CELL_PATTERN)]
    #[case("1.2.3", TEXT_CELL_PATTERN)]
    #[case("-", TEXT_CELL_PATTERN)]
    #[case("", TEXT_CELL_PATTERN)]
    #[case("abc", TEXT_CELL_PATTERN)]
    #[case("1e5", TEXT_CELL_PATTERN)]
    fn sniffs_cell_shapes(#[case] cell: &str, #[case] expected: &str) {
        assert_eq!(sniff_cell_pattern(cell), expected);
    }

    #[rstest]
    #[case("42")]
    #[case("-3")]
    #[case("3.75")]
    #[case("free text")]
    fn sniffed_group_captures_the_whole_cell(#[case] cell: &str) {
        let source = format!("^{}$", sniff_cell_pattern(cell));
        let regex = regex::Regex::new(&source)
            .unwrap_or_else(|err| panic!("sniffed pattern must compile: {err}"));
        let Some(caps) = regex.captures(cell) else {
            panic!("sniffed pattern should match {cell:?}");
        };
        assert_eq!(caps.get(1).map(|m| m.as_str()), Some(cell));
    }
}
