//! Rendering of scenario outline steps against one example row.

use super::lexer::{Segment, segment};
use crate::sniff::sniff_cell_pattern;

/// An outline step with its placeholders filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStep {
    /// Step text with every `<header>` replaced by the row's cell.
    pub text: String,
    /// Regex source matching [`RenderedStep::text`], with literal text
    /// escaped and each substituted cell replaced by a sniffed capture group.
    pub pattern: String,
}

/// Substitute the cells of `row` into `template`.
///
/// `<header>` tokens are looked up by position in `headers`. Tokens whose
/// column is missing from `row` stay untouched in both the text and the
/// derived pattern.
///
/// # Examples
/// ```
/// use stepwise_patterns::render_example_step;
///
/// let headers = vec!["a".to_string(), "b".to_string()];
/// let row = vec!["1".to_string(), "two".to_string()];
/// let rendered = render_example_step("add <a> and <b>", &headers, &row);
/// assert_eq!(rendered.text, "add 1 and two");
/// assert_eq!(rendered.pattern, r"add (\d+) and (.*)");
/// ```
#[must_use]
pub fn render_example_step<H, C>(template: &str, headers: &[H], row: &[C]) -> RenderedStep
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    let tokens: Vec<String> = headers
        .iter()
        .map(|header| format!("<{}>", header.as_ref()))
        .collect();

    let mut text = String::with_capacity(template.len());
    let mut pattern = String::with_capacity(template.len() * 2);
    for piece in segment(template, &tokens) {
        match piece {
            Segment::Literal(literal) => {
                text.push_str(literal);
                pattern.push_str(&regex::escape(literal));
            }
            Segment::Token { index, text: token } => {
                let (shown, source) = row.get(index).map_or_else(
                    || (token, regex::escape(token)),
                    |cell| {
                        let cell = cell.as_ref();
                        (cell, sniff_cell_pattern(cell).to_string())
                    },
                );
                text.push_str(shown);
                pattern.push_str(&source);
            }
        }
    }
    RenderedStep { text, pattern }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniff::{FLOAT_CELL_PATTERN, TEXT_CELL_PATTERN};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn escapes_literal_regex_metacharacters() {
        let rendered = render_example_step("cost is $<price> (net)", &strings(&["price"]), &strings(&["2.5"]));
        assert_eq!(rendered.text, "cost is $2.5 (net)");
        assert_eq!(rendered.pattern, format!(r"cost is \${FLOAT_CELL_PATTERN} \(net\)"));
    }

    #[test]
    fn leaves_missing_cells_untouched() {
        let rendered = render_example_step("<a> then <b>", &strings(&["a", "b"]), &strings(&["x"]));
        assert_eq!(rendered.text, "x then <b>");
        assert_eq!(rendered.pattern, format!("{TEXT_CELL_PATTERN} then <b>"));
    }

    #[test]
    fn ignores_unknown_placeholders() {
        let rendered = render_example_step("<unknown>", &strings(&["a"]), &strings(&["1"]));
        assert_eq!(rendered.text, "<unknown>");
        assert_eq!(rendered.pattern, "<unknown>");
    }

    #[test]
    fn substitutes_repeated_placeholders() {
        let rendered = render_example_step("<n> + <n>", &strings(&["n"]), &strings(&["4"]));
        assert_eq!(rendered.text, "4 + 4");
        assert_eq!(rendered.pattern, r"(\d+) \+ (\d+)");
    }
}
