//! Parameter type registry.
//!
//! A parameter type binds a symbolic token such as `{int}` to one or more
//! regular-expression fragments. Step patterns written with tokens are
//! expanded into one regex candidate per combination of fragments, so a
//! pattern can be authored once and still match every accepted spelling.

use regex::Regex;

use crate::errors::PatternError;
use crate::pattern::lexer::{Segment, segment};

/// A token together with the fragments it expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterType {
    token: String,
    fragments: Vec<String>,
}

impl ParameterType {
    /// Token text as written in step patterns, for example `{int}`.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Regex fragments, in registration order.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

/// Ordered collection of [`ParameterType`]s.
///
/// The default registry ships `{int}`, `{float}`, `{word}` and `{text}`.
///
/// # Examples
/// ```
/// use stepwise_patterns::ParameterTypes;
///
/// let params = ParameterTypes::default();
/// let candidates = params.expand("I have {int} cats");
/// assert_eq!(candidates.len(), 2);
/// assert_eq!(candidates[0], r"I have \{int\} cats");
/// assert_eq!(candidates[1], r"I have (-?\d+) cats");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterTypes {
    entries: Vec<ParameterType>,
}

const BUILTINS: &[(&str, &[&str])] = &[
    ("{int}", &[r"(-?\d+)"]),
    ("{float}", &[r"([-+]?\d*\.?\d+)"]),
    ("{word}", &[r"(\w+)"]),
    ("{text}", &[r#""([^"]*)""#, r"'([^']*)'"]),
];

impl Default for ParameterTypes {
    fn default() -> Self {
        let entries = BUILTINS
            .iter()
            .map(|(token, fragments)| ParameterType {
                token: (*token).to_string(),
                fragments: fragments.iter().map(|f| (*f).to_string()).collect(),
            })
            .collect();
        Self { entries }
    }
}

impl ParameterTypes {
    /// Create a registry without the built-in tokens.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register `fragments` for `token`.
    ///
    /// Every fragment must compile on its own. Registering a token that is
    /// already known appends the new fragments to the existing ones.
    ///
    /// # Errors
    /// Returns [`PatternError::EmptyToken`] for an empty token,
    /// [`PatternError::NoFragments`] when `fragments` is empty and
    /// [`PatternError::InvalidFragment`] for the first fragment that fails to
    /// compile. Nothing is registered when an error is returned.
    pub fn register<T, I, F>(&mut self, token: T, fragments: I) -> Result<(), PatternError>
    where
        T: Into<String>,
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        let token = token.into();
        if token.is_empty() {
            return Err(PatternError::EmptyToken);
        }
        let fragments: Vec<String> = fragments.into_iter().map(Into::into).collect();
        if fragments.is_empty() {
            return Err(PatternError::NoFragments { token });
        }
        for fragment in &fragments {
            if let Err(source) = Regex::new(fragment) {
                return Err(PatternError::InvalidFragment {
                    token,
                    fragment: fragment.clone(),
                    source,
                });
            }
        }

        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.token == token) {
            entry.fragments.extend(fragments);
            return Ok(());
        }
        self.entries.push(ParameterType { token, fragments });
        Ok(())
    }

    /// Look up the entry registered for `token`.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&ParameterType> {
        self.entries.iter().find(|entry| entry.token == token)
    }

    /// Iterate over the registered entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterType> {
        self.entries.iter()
    }

    /// Number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no token is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand `raw` into its regex candidates.
    ///
    /// The first candidate is `raw` with every known token escaped so it only
    /// matches the token text itself. One further candidate follows for each
    /// combination of fragments over the distinct tokens present in `raw`.
    /// Text outside tokens is kept verbatim and may therefore contain regex
    /// syntax of its own.
    #[must_use]
    pub fn expand(&self, raw: &str) -> Vec<String> {
        let tokens: Vec<&str> = self.entries.iter().map(ParameterType::token).collect();
        let segments = segment(raw, &tokens);

        let mut present: Vec<usize> = segments
            .iter()
            .filter_map(|piece| match piece {
                Segment::Token { index, .. } => Some(*index),
                Segment::Literal(_) => None,
            })
            .collect();
        present.sort_unstable();
        present.dedup();

        let mut candidates = vec![render(&segments, &[])];
        if present.is_empty() {
            return candidates;
        }

        let mut combinations: Vec<Vec<(usize, &str)>> = vec![Vec::new()];
        for index in present {
            let Some(entry) = self.entries.get(index) else {
                continue;
            };
            combinations = combinations
                .into_iter()
                .flat_map(|chosen| {
                    entry.fragments.iter().map(move |fragment| {
                        let mut next = chosen.clone();
                        next.push((index, fragment.as_str()));
                        next
                    })
                })
                .collect();
        }
        candidates.extend(
            combinations
                .iter()
                .map(|chosen| render(&segments, chosen)),
        );
        candidates
    }
}

fn render(segments: &[Segment<'_>], chosen: &[(usize, &str)]) -> String {
    let mut out = String::new();
    for piece in segments {
        match piece {
            Segment::Literal(text) => out.push_str(text),
            Segment::Token { index, text } => {
                let fragment = chosen
                    .iter()
                    .find(|(token, _)| token == index)
                    .map_or_else(|| regex::escape(text), |(_, fragment)| (*fragment).to_string());
                out.push_str(&fragment);
            }
        }
    }
    out
}

impl<'a> IntoIterator for &'a ParameterTypes {
    type Item = &'a ParameterType;
    type IntoIter = std::slice::Iter<'a, ParameterType>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
