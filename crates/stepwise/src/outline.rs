//! Scenario outline expansion.
//!
//! Every body row of every `Examples` block becomes one [`ExampleRow`] whose
//! steps have their `<header>` placeholders substituted. When the substituted
//! text resolves, a pattern derived from the row is bound to the resolved
//! handler in the scenario's [`DerivedSteps`] overlay. Derived patterns escape
//! the literal text, replace each cell with a type-sniffed capture group and
//! are anchored at both ends, so they only ever match whole step texts.

use stepwise_patterns::{compile_pattern, render_example_step};

use crate::document::{Examples, Step};
use crate::registry::{DerivedSteps, StepDefinition};

/// One example row with its substituted steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRow {
    /// Name of the `Examples` block the row comes from.
    pub examples_name: Option<String>,
    /// Zero-based row index within its block.
    pub index: usize,
    /// Steps with placeholders replaced by the row's cells.
    pub steps: Vec<Step>,
}

impl ExampleRow {
    /// Host unit name for the row.
    #[must_use]
    pub fn unit_name(&self) -> String {
        self.examples_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map_or_else(
                || format!("Example #{}", self.index + 1),
                |name| format!("{name} #{}", self.index + 1),
            )
    }
}

/// Rows produced from one outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Rows in document order.
    pub rows: Vec<ExampleRow>,
}

impl Expansion {
    /// Whether the outline produced no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of substituted steps across rows.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.rows.iter().map(|row| row.steps.len()).sum()
    }
}

/// Expand `steps` once per body row of `examples`.
///
/// Steps whose substituted text does not resolve are kept as they are, so
/// running them reports the unresolved step.
///
/// # Examples
/// ```
/// use stepwise::document::{Examples, Step};
/// use stepwise::outline::expand_outline;
/// use stepwise::registry::{DerivedSteps, StepRegistry};
/// use stepwise::Context;
/// use stepwise_harness::HostRunner;
/// use stepwise_patterns::ParameterTypes;
///
/// let mut registry = StepRegistry::new();
/// registry
///     .register(
///         r"^add (\d+) and (\d+)$",
///         |_: &mut dyn HostRunner, _: &mut Context, _: u32, _: u32| {},
///         &ParameterTypes::default(),
///     )
///     .expect("valid registration");
///
/// let examples = Examples::new(["a", "b"]).with_row(["1", "2"]).with_row(["3", "4"]);
/// let mut overlay = DerivedSteps::new(&registry);
/// let expansion = expand_outline(&[Step::new("When", "add <a> and <b>")], &[examples], &mut overlay);
///
/// let texts: Vec<_> = expansion.rows.iter().map(|row| row.steps[0].text.as_str()).collect();
/// assert_eq!(texts, ["add 1 and 2", "add 3 and 4"]);
/// assert_eq!(overlay.derived_len(), 2);
/// ```
#[must_use]
pub fn expand_outline(
    steps: &[Step],
    examples: &[Examples],
    overlay: &mut DerivedSteps<'_>,
) -> Expansion {
    let mut rows = Vec::new();
    for block in examples {
        for (index, row) in block.rows.iter().enumerate() {
            let steps = steps
                .iter()
                .map(|step| substitute(step, &block.header, row, overlay))
                .collect();
            rows.push(ExampleRow {
                examples_name: block.name.clone(),
                index,
                steps,
            });
        }
    }
    Expansion { rows }
}

fn substitute(
    step: &Step,
    header: &[String],
    row: &[String],
    overlay: &mut DerivedSteps<'_>,
) -> Step {
    let rendered = render_example_step(&step.text, header, row);
    let Ok(resolved) = overlay.resolve(&rendered.text) else {
        log::debug!("outline step `{}` has no definition", rendered.text);
        return Step {
            keyword: step.keyword.clone(),
            text: rendered.text,
            line: step.line,
        };
    };
    let anchored = format!("^{}$", rendered.pattern);
    match compile_pattern(&anchored) {
        Ok(regex) => {
            let derived = StepDefinition::new(anchored, regex, resolved.handler().clone());
            if derived.group_count() == resolved.handler().arity() {
                overlay.add(derived);
            }
        }
        Err(err) => log::warn!("cannot derive a pattern for `{}`: {err}", rendered.text),
    }
    Step {
        keyword: step.keyword.clone(),
        text: rendered.text,
        line: step.line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;
    use crate::registry::StepRegistry;
    use rstest::rstest;
    use stepwise_harness::HostRunner;
    use stepwise_patterns::ParameterTypes;

    fn registry_with(pattern: &str) -> StepRegistry {
        let mut registry = StepRegistry::new();
        let Ok(()) = registry.register(
            pattern,
            |_: &mut dyn HostRunner, _: &mut Context, _: String| {},
            &ParameterTypes::default(),
        ) else {
            panic!("registration should succeed");
        };
        registry
    }

    #[test]
    fn zero_rows_yield_nothing() {
        let registry = registry_with("^I eat (.*)$");
        let mut overlay = DerivedSteps::new(&registry);
        let expansion = expand_outline(
            &[Step::new("When", "I eat <food>")],
            &[Examples::new(["food"])],
            &mut overlay,
        );
        assert!(expansion.is_empty());
        assert_eq!(expansion.step_count(), 0);
        assert_eq!(overlay.derived_len(), 0);
    }

    #[test]
    fn rows_follow_document_order_across_blocks() {
        let registry = registry_with("^I eat (.*)$");
        let mut overlay = DerivedSteps::new(&registry);
        let mut first = Examples::new(["food"]).with_row(["apples"]);
        first.name = Some("Fruit".into());
        let second = Examples::new(["food"]).with_row(["bread"]).with_row(["rice"]);
        let expansion = expand_outline(
            &[Step::new("When", "I eat <food>")],
            &[first, second],
            &mut overlay,
        );
        let texts: Vec<&str> = expansion
            .rows
            .iter()
            .flat_map(|row| row.steps.iter().map(|step| step.text.as_str()))
            .collect();
        assert_eq!(texts, ["I eat apples", "I eat bread", "I eat rice"]);
        let names: Vec<String> = expansion.rows.iter().map(ExampleRow::unit_name).collect();
        assert_eq!(names, ["Fruit #1", "Example #1", "Example #2"]);
    }

    #[test]
    fn unresolved_steps_are_kept() {
        let registry = registry_with("^I eat (.*)$");
        let mut overlay = DerivedSteps::new(&registry);
        let expansion = expand_outline(
            &[Step::new("Then", "I feel <mood>")],
            &[Examples::new(["mood"]).with_row(["full"])],
            &mut overlay,
        );
        assert_eq!(expansion.step_count(), 1);
        assert_eq!(overlay.derived_len(), 0);
        assert!(overlay.resolve("I feel full").is_err());
    }

    #[rstest]
    #[case("3", "I have 3 cats")]
    #[case("-3", "I have -3 cats")]
    #[case("two", "I have two cats")]
    fn derived_pattern_resolves_the_substituted_text(#[case] cell: &str, #[case] text: &str) {
        let registry = registry_with("^I have (.*) cats$");
        let mut overlay = DerivedSteps::new(&registry);
        let expansion = expand_outline(
            &[Step::new("Given", "I have <n> cats")],
            &[Examples::new(["n"]).with_row([cell])],
            &mut overlay,
        );
        assert_eq!(expansion.step_count(), 1);
        assert_eq!(overlay.derived_len(), 1);
        assert!(overlay.resolve(text).is_ok());
    }

    #[test]
    fn derived_patterns_match_whole_steps_only() {
        let params = ParameterTypes::default();
        let mut registry = StepRegistry::new();
        let Ok(()) = registry.register(
            r"^add (\d+)$",
            |_: &mut dyn HostRunner, _: &mut Context, _: u32| {},
            &params,
        ) else {
            panic!("registration should succeed");
        };
        let Ok(()) = registry.register(
            r"^add (\d+) then add (\d+)$",
            |_: &mut dyn HostRunner, _: &mut Context, _: u32, _: u32| {},
            &params,
        ) else {
            panic!("registration should succeed");
        };
        let mut overlay = DerivedSteps::new(&registry);
        let expansion = expand_outline(
            &[
                Step::new("When", "add <a>"),
                Step::new("And", "add <a> then add <b>"),
            ],
            &[Examples::new(["a", "b"]).with_row(["2", "3"])],
            &mut overlay,
        );
        assert_eq!(expansion.step_count(), 2);
        assert_eq!(overlay.derived_len(), 2);
        let Ok(definition) = overlay.resolve("add 2 then add 3") else {
            panic!("step should resolve");
        };
        assert_eq!(definition.handler().arity(), 2);
    }

    #[test]
    fn short_rows_leave_placeholders() {
        let registry = registry_with("^pair (.*)$");
        let mut overlay = DerivedSteps::new(&registry);
        let expansion = expand_outline(
            &[Step::new("Given", "pair <a> <b>")],
            &[Examples::new(["a", "b"]).with_row(["x"])],
            &mut overlay,
        );
        let Some(row) = expansion.rows.first() else {
            panic!("one row expected");
        };
        assert_eq!(row.steps.first().map(|step| step.text.as_str()), Some("pair x <b>"));
    }
}
