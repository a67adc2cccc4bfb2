//! Pattern specificity calculation for disambiguation.
//!
//! When several step definitions match a step equally often, the one whose
//! regular expression spells out more literal text is preferred. The score is
//! computed by walking the regex source and counting the characters that must
//! appear verbatim in a match.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Specificity score for a compiled step pattern.
///
/// # Ordering
///
/// Scores are compared by:
/// 1. More literal characters → more specific
/// 2. Fewer capture groups → more specific
///
/// # Examples
///
/// ```
/// use stepwise_patterns::SpecificityScore;
///
/// let specific = SpecificityScore::calculate("a 5 number");
/// let generic = SpecificityScore::calculate("a (.*) number");
/// assert!(specific > generic);
/// assert_eq!(generic.literal_chars, 9);
/// assert_eq!(generic.capture_groups, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecificityScore {
    /// Characters that must appear verbatim in any match.
    pub literal_chars: usize,
    /// Number of capturing groups in the pattern.
    pub capture_groups: usize,
}

impl SpecificityScore {
    /// Score the regex `source`.
    ///
    /// Escaped punctuation counts as literal text. Escape classes such as
    /// `\d`, character classes, quantifiers, anchors and group delimiters do
    /// not. Non-capturing groups and inline flags are not counted as captures.
    #[must_use]
    pub fn calculate(source: &str) -> Self {
        let mut score = Self::default();
        let mut chars = source.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => score.literal_chars += escape_weight(&mut chars),
                '[' => skip_class(&mut chars),
                '(' => {
                    if chars.peek() == Some(&'?') {
                        chars.next();
                        if group_is_named(&mut chars) {
                            score.capture_groups += 1;
                        }
                    } else {
                        score.capture_groups += 1;
                    }
                }
                '{' => {
                    if !skip_repetition(&mut chars) {
                        score.literal_chars += 1;
                    }
                }
                ')' | '|' | '.' | '^' | '$' | '*' | '+' | '?' => {}
                _ => score.literal_chars += 1,
            }
        }
        score
    }
}

fn escape_weight(chars: &mut Peekable<Chars<'_>>) -> usize {
    match chars.next() {
        Some(c) if c.is_ascii_punctuation() || c == ' ' => 1,
        Some('p' | 'P' | 'x' | 'u' | 'U') => {
            if chars.peek() == Some(&'{') {
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                }
            }
            0
        }
        _ => 0,
    }
}

fn skip_class(chars: &mut Peekable<Chars<'_>>) {
    let mut depth = 1usize;
    if chars.peek() == Some(&'^') {
        chars.next();
    }
    if chars.peek() == Some(&']') {
        chars.next();
    }
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
}

// Consumes the group prefix after `(?` and reports whether it opens a named
// capture: `(?P<name>` or `(?<name>`.
fn group_is_named(chars: &mut Peekable<Chars<'_>>) -> bool {
    if chars.peek() == Some(&'P') {
        chars.next();
    }
    if chars.peek() == Some(&'<') {
        for c in chars.by_ref() {
            if c == '>' {
                break;
            }
        }
        return true;
    }
    while let Some(&c) = chars.peek() {
        chars.next();
        if c == ':' || c == ')' {
            break;
        }
    }
    false
}

// Consumes a `{n}`, `{n,}` or `{n,m}` repetition. Returns false, consuming
// nothing, when the brace is literal.
fn skip_repetition(chars: &mut Peekable<Chars<'_>>) -> bool {
    let lookahead: String = chars.clone().take_while(|c| *c != '}').collect();
    let closed = chars.clone().nth(lookahead.chars().count()) == Some('}');
    let numeric = !lookahead.is_empty()
        && lookahead.chars().all(|c| c.is_ascii_digit() || c == ',')
        && lookahead.chars().next().is_some_and(|c| c.is_ascii_digit());
    if closed && numeric {
        for c in chars.by_ref() {
            if c == '}' {
                break;
            }
        }
        true
    } else {
        false
    }
}

impl Ord for SpecificityScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.literal_chars
            .cmp(&other.literal_chars)
            .then_with(|| other.capture_groups.cmp(&self.capture_groups))
    }
}

impl PartialOrd for SpecificityScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
