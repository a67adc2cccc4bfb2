//! Suite configuration and the run entry points.
//!
//! A [`Suite`] collects parameter types and step definitions, then runs
//! feature files found on disk or features built in memory. Step
//! registration never fails on the spot: problems are collected and the
//! suite refuses to run while any are outstanding.

use std::sync::Arc;
use std::time::Instant;

use camino::Utf8Path;
use regex::Regex;
use stepwise_harness::HostRunner;
use stepwise_patterns::{ParameterTypes, PatternError};
use thiserror::Error;

use crate::coercion::CoercionMode;
use crate::config;
use crate::context::Context;
use crate::document::{Feature, normalise_tag};
use crate::executor::{Executor, TagFilter};
use crate::handler::StepHandler;
use crate::hooks::{HookPoint, Hooks};
use crate::loader::{self, LoadError};
use crate::registry::{ConfigError, StepRegistry};
use crate::reporting::{LoadFailure, RunReport};

/// Glob used when no features path is configured.
pub const DEFAULT_FEATURES_PATH: &str = "features/*.feature";

/// Errors that prevent a suite from running.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SuiteError {
    /// Step definitions were rejected at registration.
    #[error("the suite contains {} invalid step definition(s)", .0.len())]
    InvalidConfiguration(Vec<ConfigError>),
    /// The features path could not be searched.
    #[error(transparent)]
    Discovery(#[from] LoadError),
}

/// Options for a [`Suite`].
///
/// # Examples
/// ```
/// use stepwise::{Context, SuiteOptions};
/// use stepwise::coercion::CoercionMode;
/// use stepwise_harness::HostRunner;
///
/// let options = SuiteOptions::new()
///     .with_features_path("tests/features/*.feature")
///     .with_tags(["smoke"])
///     .with_ignored_tags(["@wip"])
///     .with_before_scenario(|_: &mut dyn HostRunner, ctx: &mut Context| ctx.set("ready", true))
///     .with_coercion(CoercionMode::Strict);
/// assert_eq!(options.tags(), ["@smoke"]);
/// assert_eq!(options.features_path(), "tests/features/*.feature");
/// ```
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    features_path: String,
    tags: Vec<String>,
    ignored_tags: Vec<String>,
    parallel: bool,
    hooks: Hooks,
    coercion: Option<CoercionMode>,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            features_path: DEFAULT_FEATURES_PATH.to_owned(),
            tags: Vec::new(),
            ignored_tags: Vec::new(),
            parallel: false,
            hooks: Hooks::default(),
            coercion: None,
        }
    }
}

impl SuiteOptions {
    /// Defaults: `features/*.feature`, no tag filters, no hooks, coercion mode
    /// from [`config::coercion_mode`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Glob pattern locating feature files.
    #[must_use]
    pub fn with_features_path(mut self, pattern: impl Into<String>) -> Self {
        self.features_path = pattern.into();
        self
    }

    /// Run only scenarios carrying at least one of `tags`.
    #[must_use]
    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.tags
            .extend(tags.into_iter().map(|tag| normalise_tag(tag.as_ref())));
        self
    }

    /// Skip features and scenarios carrying any of `tags`.
    #[must_use]
    pub fn with_ignored_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.ignored_tags
            .extend(tags.into_iter().map(|tag| normalise_tag(tag.as_ref())));
        self
    }

    /// Declare the suite unit parallel to the host.
    #[must_use]
    pub fn run_in_parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Run `hook` before the background of every scenario.
    #[must_use]
    pub fn with_before_scenario<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn HostRunner, &mut Context) + Send + Sync + 'static,
    {
        self.with_hook(HookPoint::BeforeScenario, hook)
    }

    /// Run `hook` after every scenario, including failed ones.
    #[must_use]
    pub fn with_after_scenario<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn HostRunner, &mut Context) + Send + Sync + 'static,
    {
        self.with_hook(HookPoint::AfterScenario, hook)
    }

    /// Run `hook` before every step.
    #[must_use]
    pub fn with_before_step<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn HostRunner, &mut Context) + Send + Sync + 'static,
    {
        self.with_hook(HookPoint::BeforeStep, hook)
    }

    /// Run `hook` after every step, including failed ones.
    #[must_use]
    pub fn with_after_step<F>(self, hook: F) -> Self
    where
        F: Fn(&mut dyn HostRunner, &mut Context) + Send + Sync + 'static,
    {
        self.with_hook(HookPoint::AfterStep, hook)
    }

    /// Use `mode` instead of the process-wide default.
    #[must_use]
    pub fn with_coercion(mut self, mode: CoercionMode) -> Self {
        self.coercion = Some(mode);
        self
    }

    fn with_hook<F>(mut self, point: HookPoint, hook: F) -> Self
    where
        F: Fn(&mut dyn HostRunner, &mut Context) + Send + Sync + 'static,
    {
        self.hooks.push(point, Arc::new(hook));
        self
    }

    /// Configured features glob.
    #[must_use]
    pub fn features_path(&self) -> &str {
        &self.features_path
    }

    /// Normalised allow-list.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Normalised ignore-list.
    #[must_use]
    pub fn ignored_tags(&self) -> &[String] {
        &self.ignored_tags
    }

    /// Whether the suite declares itself parallel.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Effective coercion mode.
    #[must_use]
    pub fn coercion(&self) -> CoercionMode {
        self.coercion.unwrap_or_else(config::coercion_mode)
    }
}

/// Step definitions, parameter types and options for one run.
///
/// # Examples
/// ```
/// use stepwise::{Context, Suite, SuiteOptions};
/// use stepwise::document::{Feature, Scenario, Step};
/// use stepwise_harness::{HostRunner, StdRunner};
///
/// let mut suite = Suite::new(SuiteOptions::new());
/// suite.add_step("I have {int} cats", |_: &mut dyn HostRunner, ctx: &mut Context, cats: i32| {
///     ctx.set("cats", cats);
/// });
///
/// let feature = Feature::new("Feature", "Cats")
///     .with_scenario(Scenario::new("Scenario", "Counting").with_step(Step::new("Given", "I have 3 cats")));
/// let mut runner = StdRunner::new("suite");
/// let report = suite.run_features(&mut runner, &[feature]).expect("valid suite");
/// assert!(!report.has_failures());
/// ```
#[derive(Debug)]
pub struct Suite {
    options: SuiteOptions,
    parameter_types: ParameterTypes,
    registry: StepRegistry,
    errors: Vec<ConfigError>,
}

impl Suite {
    /// Create a suite with the built-in parameter types.
    #[must_use]
    pub fn new(options: SuiteOptions) -> Self {
        Self {
            options,
            parameter_types: ParameterTypes::default(),
            registry: StepRegistry::new(),
            errors: Vec::new(),
        }
    }

    /// Register fragments for a parameter token, for use by later
    /// [`Suite::add_step`] calls.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the token is empty, no fragment is given
    /// or a fragment does not compile. Nothing is registered in that case.
    pub fn add_parameter_types<I, S>(&mut self, token: &str, fragments: I) -> Result<(), PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_types.register(token, fragments)
    }

    /// Register a step pattern. Errors are kept until [`Suite::run`].
    pub fn add_step<F, Args>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: StepHandler<Args>,
        Args: 'static,
    {
        let outcome = self.registry.register(pattern, handler, &self.parameter_types);
        self.keep_error(outcome)
    }

    /// Register a precompiled regex. Errors are kept until [`Suite::run`].
    pub fn add_regex_step<F, Args>(&mut self, regex: Regex, handler: F) -> &mut Self
    where
        F: StepHandler<Args>,
        Args: 'static,
    {
        let outcome = self.registry.register_regex(regex, handler);
        self.keep_error(outcome)
    }

    fn keep_error(&mut self, outcome: Result<(), ConfigError>) -> &mut Self {
        if let Err(err) = outcome {
            log::error!("{err}");
            self.errors.push(err);
        }
        self
    }

    /// Registration errors collected so far.
    #[must_use]
    pub fn config_errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// The suite's step registry.
    #[must_use]
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// The suite's options.
    #[must_use]
    pub fn options(&self) -> &SuiteOptions {
        &self.options
    }

    /// Discover, load and run the configured feature files.
    ///
    /// Files that fail to load are reported through `runner` and listed in
    /// [`RunReport::load_failures`]; the remaining files still run.
    ///
    /// # Errors
    /// Returns [`SuiteError::InvalidConfiguration`] when step registration
    /// failed and [`SuiteError::Discovery`] when the features path cannot be
    /// searched. No scenario runs in either case.
    pub fn run(&self, runner: &mut dyn HostRunner) -> Result<RunReport, SuiteError> {
        self.check_configuration(runner)?;
        let paths = loader::discover(&self.options.features_path).inspect_err(|err| {
            runner.error(&format!("cannot find feature files: {err}"));
        })?;
        self.execute(runner, paths.iter().map(|path| Source::Path(path.as_path())))
    }

    /// Run features that are already parsed.
    ///
    /// # Errors
    /// Returns [`SuiteError::InvalidConfiguration`] when step registration
    /// failed.
    pub fn run_features(
        &self,
        runner: &mut dyn HostRunner,
        features: &[Feature],
    ) -> Result<RunReport, SuiteError> {
        self.check_configuration(runner)?;
        self.execute(runner, features.iter().map(Source::Parsed))
    }

    fn check_configuration(&self, runner: &mut dyn HostRunner) -> Result<(), SuiteError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        for err in &self.errors {
            runner.error(&err.to_string());
        }
        runner.error("the test contains invalid step definitions");
        Err(SuiteError::InvalidConfiguration(self.errors.clone()))
    }

    fn execute<'f>(
        &self,
        runner: &mut dyn HostRunner,
        sources: impl Iterator<Item = Source<'f>>,
    ) -> Result<RunReport, SuiteError> {
        let started = Instant::now();
        if self.options.parallel {
            runner.declare_parallel();
        }
        let filter = TagFilter::new(&self.options.tags, &self.options.ignored_tags);
        let mode = self.options.coercion();
        let executor = Executor::new(&self.registry, &self.options.hooks, &filter, mode);

        let mut report = RunReport::default();
        for source in sources {
            match source {
                Source::Parsed(feature) => report.features.push(executor.run_feature(runner, feature)),
                Source::Path(path) => match loader::load_feature(path) {
                    Ok(feature) => report.features.push(executor.run_feature(runner, &feature)),
                    Err(err) => {
                        runner.error(&err.to_string());
                        report.load_failures.push(LoadFailure {
                            path: path.to_owned(),
                            message: err.to_string(),
                        });
                    }
                },
            }
        }
        report.duration = started.elapsed();
        let (passed, failed, skipped) = report.scenario_totals();
        log::info!("{passed} scenario(s) passed, {failed} failed, {skipped} skipped");
        Ok(report)
    }
}

enum Source<'f> {
    Parsed(&'f Feature),
    Path(&'f Utf8Path),
}
