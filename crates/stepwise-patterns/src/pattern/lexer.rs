//! Splits pattern text into literal runs and known token occurrences.

/// One piece of a lexed pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Literal(&'a str),
    Token {
        /// Position of the matched token in the token list supplied to
        /// [`segment`].
        index: usize,
        text: &'a str,
    },
}

/// Split `raw` into literal runs and occurrences of `tokens`.
///
/// Occurrences never overlap: scanning from the left, the earliest token wins
/// and, at the same offset, the longest one. Empty tokens are ignored.
pub(crate) fn segment<'a, S: AsRef<str>>(raw: &'a str, tokens: &[S]) -> Vec<Segment<'a>> {
    let mut found: Vec<(usize, usize, usize)> = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        let token = token.as_ref();
        if token.is_empty() {
            continue;
        }
        for (start, matched) in raw.match_indices(token) {
            found.push((start, start + matched.len(), index));
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

    let mut segments = Vec::with_capacity(found.len().saturating_mul(2) + 1);
    let mut cursor = 0usize;
    for (start, end, index) in found {
        if start < cursor {
            continue;
        }
        if let Some(literal) = raw.get(cursor..start).filter(|text| !text.is_empty()) {
            segments.push(Segment::Literal(literal));
        }
        if let Some(text) = raw.get(start..end) {
            segments.push(Segment::Token { index, text });
        }
        cursor = end;
    }
    if let Some(rest) = raw.get(cursor..).filter(|text| !text.is_empty()) {
        segments.push(Segment::Literal(rest));
    }
    segments
}
