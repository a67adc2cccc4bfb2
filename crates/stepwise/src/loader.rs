//! Feature file discovery and conversion into the document model.
//!
//! Files are found with a glob pattern and parsed with the `gherkin` crate.
//! Rules are flattened: each rule scenario joins the feature's scenario list,
//! inherits the rule tags and runs the rule background before its own steps.

use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use gherkin::GherkinEnv;
use thiserror::Error;

use crate::document::{Background, Examples, Feature, Scenario, Step, Tag};

/// Errors raised while finding or loading feature files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The glob pattern is malformed.
    #[error("invalid feature path pattern `{pattern}`: {source}")]
    Pattern {
        /// Pattern as configured.
        pattern: String,
        /// Glob parser error.
        #[source]
        source: glob::PatternError,
    },
    /// A directory could not be read while matching the pattern.
    #[error("cannot read {}: {}", .source.path().display(), .source.error())]
    Glob {
        /// Underlying I/O failure.
        #[source]
        source: glob::GlobError,
    },
    /// A matched path is not valid UTF-8.
    #[error("feature path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path {
        /// Offending path.
        path: PathBuf,
    },
    /// A feature file could not be read or parsed.
    #[error("cannot parse {path}: {message}")]
    Parse {
        /// File path, or `<inline>` for in-memory sources.
        path: Utf8PathBuf,
        /// Parser message.
        message: String,
    },
}

/// List the files matching `pattern`, sorted by path.
///
/// # Errors
/// Returns [`LoadError::Pattern`] for a malformed pattern,
/// [`LoadError::Glob`] when a directory cannot be read and
/// [`LoadError::NonUtf8Path`] for a path that is not UTF-8.
pub fn discover(pattern: &str) -> Result<Vec<Utf8PathBuf>, LoadError> {
    let entries = glob::glob(pattern).map_err(|source| LoadError::Pattern {
        pattern: pattern.to_owned(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| LoadError::Glob { source })?;
        let path = Utf8PathBuf::from_path_buf(path).map_err(|path| LoadError::NonUtf8Path { path })?;
        paths.push(path);
    }
    paths.sort();
    log::debug!("{} feature file(s) match `{pattern}`", paths.len());
    Ok(paths)
}

/// Read and convert the feature file at `path`.
///
/// # Errors
/// Returns [`LoadError::Parse`] when the file cannot be read or parsed.
pub fn load_feature(path: &Utf8Path) -> Result<Feature, LoadError> {
    let parsed = gherkin::Feature::parse_path(path, GherkinEnv::default()).map_err(|err| {
        LoadError::Parse {
            path: path.to_owned(),
            message: err.to_string(),
        }
    })?;
    Ok(convert(parsed).with_path(path))
}

/// Convert Gherkin `source` held in memory. `path` is recorded on the feature
/// when given.
///
/// # Errors
/// Returns [`LoadError::Parse`] when `source` is not valid Gherkin.
///
/// # Examples
/// ```
/// use stepwise::loader::parse_feature;
///
/// let feature = parse_feature(
///     "@pets\nFeature: Cats\n  Scenario: Counting\n    Given I have 3 cats\n",
///     None,
/// )
/// .expect("valid gherkin");
/// assert_eq!(feature.tags[0].name, "@pets");
/// let scenario = feature.scenarios().next().expect("one scenario");
/// assert_eq!(scenario.steps[0].text, "I have 3 cats");
/// assert_eq!(scenario.steps[0].line, 4);
/// ```
pub fn parse_feature(source: &str, path: Option<&Utf8Path>) -> Result<Feature, LoadError> {
    let parsed = gherkin::Feature::parse(source, GherkinEnv::default()).map_err(|err| {
        LoadError::Parse {
            path: path.map_or_else(|| Utf8PathBuf::from("<inline>"), Utf8Path::to_owned),
            message: err.to_string(),
        }
    })?;
    let mut feature = convert(parsed);
    feature.path = path.map(Utf8Path::to_owned);
    Ok(feature)
}

fn convert(parsed: gherkin::Feature) -> Feature {
    let mut feature = Feature::new(&parsed.keyword, parsed.name);
    feature.description = parsed.description;
    feature.line = parsed.position.line;
    feature.tags = parsed.tags.iter().map(|tag| Tag::new(tag).with_line(parsed.position.line)).collect();

    if let Some(background) = parsed.background {
        feature = feature.with_background(convert_background(background));
    }
    for scenario in parsed.scenarios {
        feature = feature.with_scenario(convert_scenario(scenario, &[], &[]));
    }
    for rule in parsed.rules {
        let rule_steps: Vec<Step> = rule
            .background
            .map(|background| background.steps.into_iter().map(convert_step).collect())
            .unwrap_or_default();
        for scenario in rule.scenarios {
            feature = feature.with_scenario(convert_scenario(scenario, &rule.tags, &rule_steps));
        }
    }
    feature
}

fn convert_background(background: gherkin::Background) -> Background {
    Background {
        keyword: background.keyword.trim().to_owned(),
        name: background.name,
        steps: background.steps.into_iter().map(convert_step).collect(),
        line: background.position.line,
    }
}

fn convert_scenario(scenario: gherkin::Scenario, inherited: &[String], prefix: &[Step]) -> Scenario {
    let line = scenario.position.line;
    let mut converted = Scenario::new(&scenario.keyword, scenario.name).with_line(line);
    converted.description = scenario.description;
    converted.tags = inherited
        .iter()
        .chain(scenario.tags.iter())
        .map(|tag| Tag::new(tag).with_line(line))
        .collect();
    converted.steps = prefix
        .iter()
        .cloned()
        .chain(scenario.steps.into_iter().map(convert_step))
        .collect();
    converted.examples = scenario.examples.into_iter().map(convert_examples).collect();
    converted
}

fn convert_step(step: gherkin::Step) -> Step {
    Step::new(&step.keyword, step.value).with_line(step.position.line)
}

fn convert_examples(examples: gherkin::Examples) -> Examples {
    let line = examples.position.line;
    let mut rows = examples.table.map(|table| table.rows).unwrap_or_default().into_iter();
    let mut converted = Examples::new(rows.next().unwrap_or_default());
    converted.rows = rows.collect();
    converted.name = examples.name.into();
    converted.tags = examples.tags.iter().map(|tag| Tag::new(tag).with_line(line)).collect();
    converted.line = line;
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const OUTLINE: &str = "\
Feature: Baskets

  Background:
    Given an empty basket

  Scenario Outline: Filling
    When I add <count> <fruit>
    Then the basket holds <count> items

    Examples: Small
      | count | fruit  |
      | 1     | apple  |
      | 2     | pears  |
";

    const RULES: &str = "\
Feature: Rules

  Rule: Discounts
    Background:
      Given a loyal customer

    @promo
    Scenario: Ten percent
      When they buy 10 items
";

    #[test]
    fn converts_backgrounds_and_outlines() {
        let Ok(feature) = parse_feature(OUTLINE, None) else {
            panic!("feature should parse");
        };
        assert_eq!(feature.keyword, "Feature");
        let Some(background) = feature.background() else {
            panic!("background expected");
        };
        assert_eq!(background.steps.len(), 1);
        let Some(scenario) = feature.scenarios().next() else {
            panic!("scenario expected");
        };
        assert!(scenario.is_outline());
        assert_eq!(scenario.id, "baskets;filling");
        let Some(examples) = scenario.examples.first() else {
            panic!("examples expected");
        };
        assert_eq!(examples.header, ["count", "fruit"]);
        assert_eq!(examples.rows.len(), 2);
        assert_eq!(examples.name.as_deref(), Some("Small"));
    }

    #[test]
    fn flattens_rules() {
        let Ok(feature) = parse_feature(RULES, None) else {
            panic!("feature should parse");
        };
        let scenarios: Vec<&Scenario> = feature.scenarios().collect();
        let [scenario] = scenarios.as_slice() else {
            panic!("one scenario expected");
        };
        let texts: Vec<&str> = scenario.steps.iter().map(|step| step.text.as_str()).collect();
        assert_eq!(texts, ["a loyal customer", "they buy 10 items"]);
        assert!(scenario.tags.iter().any(|tag| tag.name == "@promo"));
    }

    #[test]
    fn reports_parse_errors_with_the_path() {
        let Err(err) = parse_feature("this is not gherkin", Some(Utf8Path::new("bad.feature"))) else {
            panic!("parse should fail");
        };
        let LoadError::Parse { path, .. } = err else {
            panic!("parse error expected");
        };
        assert_eq!(path, "bad.feature");
    }

    #[test]
    fn discovers_and_loads_sorted_files() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("temp dir");
        };
        let Ok(root) = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()) else {
            panic!("temp dir should be UTF-8");
        };
        for name in ["b.feature", "a.feature"] {
            let written = fs::write(root.join(name), OUTLINE);
            assert!(written.is_ok());
        }
        let written = fs::write(root.join("notes.txt"), "ignored");
        assert!(written.is_ok());

        let Ok(paths) = discover(root.join("*.feature").as_str()) else {
            panic!("discovery should succeed");
        };
        let names: Vec<&str> = paths.iter().filter_map(|path| path.file_name()).collect();
        assert_eq!(names, ["a.feature", "b.feature"]);

        let Some(first) = paths.first() else {
            panic!("one path expected");
        };
        let Ok(feature) = load_feature(first) else {
            panic!("feature should load");
        };
        assert_eq!(feature.path.as_deref(), Some(first.as_path()));
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(matches!(discover("features/[*.feature"), Err(LoadError::Pattern { .. })));
    }
}
