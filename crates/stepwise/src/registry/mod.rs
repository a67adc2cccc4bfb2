//! Step registration and lookup.
//!
//! A [`StepRegistry`] stores one [`StepDefinition`] per regex candidate of each
//! registered pattern. Resolution scans every definition whose regex matches
//! the step text and keeps the best one:
//!
//! 1. the greatest number of non-overlapping matches against the text;
//! 2. then the highest [`SpecificityScore`];
//! 3. then the earliest registration.

use regex::Regex;
use stepwise_patterns::{
    ParameterTypes, PatternError, SpecificityScore, captured_values, compile_pattern,
    count_matches,
};
use thiserror::Error;

use crate::handler::{Handler, StepHandler};

mod overlay;

pub use overlay::DerivedSteps;

/// Problems detected while configuring a suite.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A candidate regex of the pattern does not compile.
    #[error("the step function is incorrect: {source}")]
    Pattern {
        /// Pattern as registered.
        pattern: String,
        /// Compilation failure.
        #[source]
        source: PatternError,
    },
    /// The candidates' capture groups do not match the handler's arguments.
    #[error(
        "the step function for `{pattern}` takes {arity} argument(s) but its pattern captures {groups:?} group(s)"
    )]
    HandlerShape {
        /// Pattern as registered.
        pattern: String,
        /// Handler parameter count after the runner and context.
        arity: usize,
        /// Capture group counts of the candidates.
        groups: Vec<usize>,
    },
}

/// Step text with no matching definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// No definition matches.
    #[error("cannot find step definition for step: {text}")]
    NotFound {
        /// Step text that failed to resolve.
        text: String,
    },
}

/// A compiled step pattern bound to a handler.
///
/// Cloning is cheap: the handler is shared.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    source: String,
    regex: Regex,
    specificity: SpecificityScore,
    handler: Handler,
}

impl StepDefinition {
    /// Bind `regex` to `handler`. `source` is the pattern the regex came from.
    #[must_use]
    pub fn new(source: impl Into<String>, regex: Regex, handler: Handler) -> Self {
        let specificity = SpecificityScore::calculate(regex.as_str());
        Self {
            source: source.into(),
            regex,
            specificity,
            handler,
        }
    }

    /// Pattern as registered, before parameter-type expansion.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compiled candidate regex.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Shared handler.
    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Specificity of the candidate regex.
    #[must_use]
    pub fn specificity(&self) -> SpecificityScore {
        self.specificity
    }

    /// Captured groups of the first match in `text`, if it matches.
    #[must_use]
    pub fn captures<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        captured_values(&self.regex, text)
    }

    pub(crate) fn group_count(&self) -> usize {
        self.regex.captures_len().saturating_sub(1)
    }
}

/// Ordered collection of step definitions.
///
/// # Examples
/// ```
/// use stepwise::{Context, StepRegistry};
/// use stepwise_harness::HostRunner;
/// use stepwise_patterns::ParameterTypes;
///
/// let mut registry = StepRegistry::new();
/// let params = ParameterTypes::default();
/// registry
///     .register("a (.*) number", |_: &mut dyn HostRunner, _: &mut Context, _: String| {}, &params)
///     .expect("valid registration");
/// registry
///     .register("a 5 number", |_: &mut dyn HostRunner, _: &mut Context| {}, &params)
///     .expect("valid registration");
///
/// let definition = registry.resolve("a 5 number").expect("step resolves");
/// assert_eq!(definition.source(), "a 5 number");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    definitions: Vec<StepDefinition>,
}

impl StepRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every candidate `params` expands `pattern` into
    /// that captures as many groups as the handler declares arguments.
    ///
    /// # Errors
    /// Returns [`ConfigError::Pattern`] when a candidate does not compile and
    /// [`ConfigError::HandlerShape`] when no candidate fits the handler or a
    /// capturing candidate has the wrong group count. Nothing is registered
    /// when an error is returned.
    pub fn register<F, Args>(
        &mut self,
        pattern: &str,
        handler: F,
        params: &ParameterTypes,
    ) -> Result<(), ConfigError>
    where
        F: StepHandler<Args>,
        Args: 'static,
    {
        self.register_handler(pattern, Handler::new(handler), params)
    }

    /// Register an already erased handler. See [`StepRegistry::register`].
    ///
    /// # Errors
    /// As for [`StepRegistry::register`].
    pub fn register_handler(
        &mut self,
        pattern: &str,
        handler: Handler,
        params: &ParameterTypes,
    ) -> Result<(), ConfigError> {
        let regexes = params
            .expand(pattern)
            .iter()
            .map(|candidate| compile_pattern(candidate))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ConfigError::Pattern {
                pattern: pattern.to_owned(),
                source,
            })?;
        let definitions: Vec<StepDefinition> = regexes
            .into_iter()
            .map(|regex| StepDefinition::new(pattern, regex, handler.clone()))
            .collect();
        self.accept(pattern, &handler, definitions)
    }

    /// Register a precompiled regex.
    ///
    /// # Errors
    /// Returns [`ConfigError::HandlerShape`] when the regex does not capture
    /// exactly as many groups as the handler declares arguments.
    pub fn register_regex<F, Args>(&mut self, regex: Regex, handler: F) -> Result<(), ConfigError>
    where
        F: StepHandler<Args>,
        Args: 'static,
    {
        let handler = Handler::new(handler);
        let pattern = regex.as_str().to_owned();
        let definition = StepDefinition::new(pattern.clone(), regex, handler.clone());
        self.accept(&pattern, &handler, vec![definition])
    }

    /// Keep the candidates whose group count equals the handler's arity.
    ///
    /// Every expanded candidate has to fit the handler. The literal form that
    /// leads a tokenised pattern's candidates is dropped when it does not.
    fn accept(
        &mut self,
        pattern: &str,
        handler: &Handler,
        definitions: Vec<StepDefinition>,
    ) -> Result<(), ConfigError> {
        let arity = handler.arity();
        let literal_form = usize::from(definitions.len() > 1);
        let misfit = definitions
            .iter()
            .skip(literal_form)
            .any(|definition| definition.group_count() != arity);
        let fits = definitions.iter().any(|definition| definition.group_count() == arity);
        if misfit || !fits {
            return Err(ConfigError::HandlerShape {
                pattern: pattern.to_owned(),
                arity,
                groups: definitions.iter().map(StepDefinition::group_count).collect(),
            });
        }
        let candidates = definitions.len();
        let kept: Vec<StepDefinition> = definitions
            .into_iter()
            .filter(|definition| definition.group_count() == arity)
            .collect();
        log::debug!(
            "registered {} of {candidates} candidate(s) for `{pattern}`",
            kept.len()
        );
        self.definitions.extend(kept);
        Ok(())
    }

    /// Append a definition without validation.
    pub fn push(&mut self, definition: StepDefinition) {
        self.definitions.push(definition);
    }

    /// Resolve `text` to the best matching definition.
    ///
    /// # Errors
    /// Returns [`ResolveError::NotFound`] when no definition matches.
    pub fn resolve(&self, text: &str) -> Result<StepDefinition, ResolveError> {
        select(self.definitions.iter(), text)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &StepDefinition> {
        self.definitions.iter()
    }

    /// Number of stored definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no definition is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

pub(crate) fn select<'d>(
    definitions: impl Iterator<Item = &'d StepDefinition>,
    text: &str,
) -> Result<StepDefinition, ResolveError> {
    let mut best: Option<((usize, SpecificityScore), &StepDefinition)> = None;
    for definition in definitions {
        let count = count_matches(&definition.regex, text);
        if count == 0 {
            continue;
        }
        let rank = (count, definition.specificity);
        if best.as_ref().is_none_or(|(best_rank, _)| rank > *best_rank) {
            best = Some((rank, definition));
        }
    }
    best.map(|(_, definition)| definition.clone())
        .ok_or_else(|| ResolveError::NotFound {
            text: text.to_owned(),
        })
}
