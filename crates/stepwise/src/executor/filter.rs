//! Tag-based skip rules.

use crate::document::{Tag, normalise_tag};

/// Allow-list and ignore-list applied to features and scenarios.
///
/// Tags are normalised to a leading `@` and compared exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    allowed: Vec<String>,
    ignored: Vec<String>,
}

impl TagFilter {
    /// Build a filter from raw tag lists.
    #[must_use]
    pub fn new<A, I>(allowed: A, ignored: I) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            allowed: allowed.into_iter().map(|tag| normalise_tag(tag.as_ref())).collect(),
            ignored: ignored.into_iter().map(|tag| normalise_tag(tag.as_ref())).collect(),
        }
    }

    /// Tags a scenario needs one of, when non-empty.
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Tags that skip whatever carries them.
    #[must_use]
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Whether any of `tags` is ignored.
    #[must_use]
    pub fn is_ignored(&self, tags: &[Tag]) -> bool {
        tags.iter().any(|tag| self.ignored.contains(&tag.name))
    }

    /// Whether a scenario carrying `tags` must be skipped.
    #[must_use]
    pub fn skips_scenario(&self, tags: &[Tag]) -> bool {
        if self.is_ignored(tags) {
            return true;
        }
        !self.allowed.is_empty() && !tags.iter().any(|tag| self.allowed.contains(&tag.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(names: &[&str]) -> Vec<Tag> {
        names.iter().map(|name| Tag::new(name)).collect()
    }

    #[rstest]
    #[case(&[], &[], &["@a"], false)]
    #[case(&[], &["skip"], &["@skip"], true)]
    #[case(&[], &["@skip"], &["@other"], false)]
    #[case(&["@wip"], &[], &["@wip", "@x"], false)]
    #[case(&["wip"], &[], &["@x"], true)]
    #[case(&["@wip"], &["@wip"], &["@wip"], true)]
    #[case(&["@wip"], &[], &[], true)]
    fn applies_allow_and_ignore_lists(
        #[case] allowed: &[&str],
        #[case] ignored: &[&str],
        #[case] scenario_tags: &[&str],
        #[case] skipped: bool,
    ) {
        let filter = TagFilter::new(allowed, ignored);
        assert_eq!(filter.skips_scenario(&tags(scenario_tags)), skipped);
    }

    #[test]
    fn normalises_configured_tags() {
        let filter = TagFilter::new(["fast"], [" @slow "]);
        assert_eq!(filter.allowed(), ["@fast"]);
        assert_eq!(filter.ignored(), ["@slow"]);
        assert!(filter.is_ignored(&tags(&["slow"])));
    }
}
