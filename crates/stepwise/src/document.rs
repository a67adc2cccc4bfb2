//! Document model consumed by the executor.
//!
//! The types mirror the parts of a Gherkin document the engine needs. They are
//! produced by [`crate::loader`] from parsed feature files, or built directly
//! with the `with_*` builders when features are assembled in code.

use camino::Utf8PathBuf;

/// Normalise a tag to carry exactly one leading `@`.
///
/// # Examples
/// ```
/// use stepwise::document::normalise_tag;
///
/// assert_eq!(normalise_tag("slow"), "@slow");
/// assert_eq!(normalise_tag(" @slow "), "@slow");
/// ```
#[must_use]
pub fn normalise_tag(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('@') {
        trimmed.to_owned()
    } else {
        format!("@{trimmed}")
    }
}

/// A tag attached to a feature, scenario or examples block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Tag name, including the leading `@`.
    pub name: String,
    /// One-based source line, or 0 when unknown.
    pub line: usize,
}

impl Tag {
    /// Create a tag, adding the leading `@` when missing.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: normalise_tag(name),
            line: 0,
        }
    }

    /// Set the source line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

/// One step of a scenario or background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Keyword as written, without surrounding whitespace (`Given`, `And`).
    pub keyword: String,
    /// Step text. Inside an outline it may contain `<placeholder>` tokens.
    pub text: String,
    /// One-based source line, or 0 when unknown.
    pub line: usize,
}

impl Step {
    /// Create a step.
    #[must_use]
    pub fn new(keyword: &str, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.trim().to_owned(),
            text: text.into(),
            line: 0,
        }
    }

    /// Set the source line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Name of the reporting unit the step runs in.
    #[must_use]
    pub fn unit_name(&self) -> String {
        format!("{} {}", self.keyword, self.text)
    }
}

/// An examples block of a scenario outline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Examples {
    /// Optional block name.
    pub name: Option<String>,
    /// Tags attached to the block.
    pub tags: Vec<Tag>,
    /// Header row naming the placeholders.
    pub header: Vec<String>,
    /// Body rows.
    pub rows: Vec<Vec<String>>,
    /// One-based source line, or 0 when unknown.
    pub line: usize,
}

impl Examples {
    /// Create a block from its header row.
    #[must_use]
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append a body row.
    #[must_use]
    pub fn with_row<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }
}

/// A scenario or scenario outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Identifier of the form `feature-slug;scenario-slug`, assigned when the
    /// scenario is added to a [`Feature`].
    pub id: String,
    /// Keyword as written (`Scenario`, `Scenario Outline`, `Example`).
    pub keyword: String,
    /// Scenario name.
    pub name: String,
    /// Free-form description below the title.
    pub description: Option<String>,
    /// Scenario tags.
    pub tags: Vec<Tag>,
    /// One-based source line, or 0 when unknown.
    pub line: usize,
    /// Steps in document order.
    pub steps: Vec<Step>,
    /// Examples blocks. A scenario with at least one block is an outline.
    pub examples: Vec<Examples>,
}

impl Scenario {
    /// Create an empty scenario.
    #[must_use]
    pub fn new(keyword: &str, name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            keyword: keyword.trim().to_owned(),
            name: name.into(),
            description: None,
            tags: Vec::new(),
            line: 0,
            steps: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Append a step.
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(Tag::new(tag));
        self
    }

    /// Append an examples block.
    #[must_use]
    pub fn with_examples(mut self, examples: Examples) -> Self {
        self.examples.push(examples);
        self
    }

    /// Set the source line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Whether the scenario is an outline.
    #[must_use]
    pub fn is_outline(&self) -> bool {
        !self.examples.is_empty()
    }

    /// Name of the reporting unit the scenario runs in.
    #[must_use]
    pub fn unit_name(&self) -> String {
        format!("{} {}", self.keyword, self.name)
    }
}

/// Steps shared by every scenario of a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Background {
    /// Keyword as written.
    pub keyword: String,
    /// Optional name.
    pub name: String,
    /// Steps in document order.
    pub steps: Vec<Step>,
    /// One-based source line, or 0 when unknown.
    pub line: usize,
}

impl Background {
    /// Create an empty background.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keyword: "Background".to_owned(),
            name: String::new(),
            steps: Vec::new(),
            line: 0,
        }
    }

    /// Append a step.
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new()
    }
}

/// A direct child of a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureChild {
    /// Background steps.
    Background(Background),
    /// A scenario or outline.
    Scenario(Scenario),
}

/// A feature document.
///
/// # Examples
/// ```
/// use stepwise::document::{Feature, Scenario, Step};
///
/// let feature = Feature::new("Feature", "Cats")
///     .with_tag("pets")
///     .with_scenario(Scenario::new("Scenario", "Counting").with_step(Step::new("Given", "I have 3 cats")));
/// assert_eq!(feature.tags[0].name, "@pets");
/// assert_eq!(feature.scenarios().count(), 1);
/// assert_eq!(feature.scenarios().next().map(|s| s.id.as_str()), Some("cats;counting"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Keyword as written.
    pub keyword: String,
    /// Feature name.
    pub name: String,
    /// Free-form description below the title.
    pub description: Option<String>,
    /// Feature tags.
    pub tags: Vec<Tag>,
    /// One-based source line, or 0 when unknown.
    pub line: usize,
    /// File the feature was loaded from.
    pub path: Option<Utf8PathBuf>,
    /// Backgrounds and scenarios in document order.
    pub children: Vec<FeatureChild>,
}

impl Feature {
    /// Create an empty feature.
    #[must_use]
    pub fn new(keyword: &str, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.trim().to_owned(),
            name: name.into(),
            description: None,
            tags: Vec::new(),
            line: 0,
            path: None,
            children: Vec::new(),
        }
    }

    /// Append a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(Tag::new(tag));
        self
    }

    /// Set the background.
    #[must_use]
    pub fn with_background(mut self, background: Background) -> Self {
        self.children.push(FeatureChild::Background(background));
        self
    }

    /// Append a scenario, assigning its id when it has none.
    #[must_use]
    pub fn with_scenario(mut self, mut scenario: Scenario) -> Self {
        if scenario.id.is_empty() {
            scenario.id = format!("{};{}", slug(&self.name), slug(&scenario.name));
        }
        self.children.push(FeatureChild::Scenario(scenario));
        self
    }

    /// Set the source path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The first background, if any.
    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.children.iter().find_map(|child| match child {
            FeatureChild::Background(background) => Some(background),
            FeatureChild::Scenario(_) => None,
        })
    }

    /// Scenarios in document order.
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.children.iter().filter_map(|child| match child {
            FeatureChild::Scenario(scenario) => Some(scenario),
            FeatureChild::Background(_) => None,
        })
    }

    /// Name of the reporting unit the feature runs in.
    #[must_use]
    pub fn unit_name(&self) -> String {
        format!("{} {}", self.keyword, self.name)
    }
}

fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
