//! Regex capture helpers used during step resolution and invocation.

use regex::Regex;

/// Extract the capture groups of the first match of `re` in `text`.
///
/// Returns `None` when the pattern does not match. Capture group 0 (the full
/// match) is ignored so only user-defined groups contribute, and groups that
/// do not participate yield empty strings to keep positional alignment.
///
/// # Examples
/// ```
/// # use regex::Regex;
/// # use stepwise_patterns::captured_values;
/// let regex = Regex::new(r"(\d+)-(\w+)").expect("example regex compiles");
/// let values = captured_values(&regex, "id 42-answer").expect("text matches");
/// assert_eq!(values, vec!["42", "answer"]);
/// assert!(captured_values(&regex, "nope").is_none());
/// ```
#[must_use]
pub fn captured_values<'t>(re: &Regex, text: &'t str) -> Option<Vec<&'t str>> {
    let caps = re.captures(text)?;
    Some(
        caps.iter()
            .skip(1)
            .map(|capture| capture.map_or("", |m| m.as_str()))
            .collect(),
    )
}

/// Count the non-overlapping matches of `re` in `text`.
///
/// # Examples
/// ```
/// # use regex::Regex;
/// # use stepwise_patterns::count_matches;
/// let regex = Regex::new("ab").expect("example regex compiles");
/// assert_eq!(count_matches(&regex, "ab ab abab"), 4);
/// ```
#[must_use]
pub fn count_matches(re: &Regex, text: &str) -> usize {
    re.find_iter(text).count()
}
