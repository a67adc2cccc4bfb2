//! Core runtime for `stepwise`.
//!
//! The crate binds the steps of Gherkin scenarios to typed handler functions
//! and runs them inside the reporting units of a [`HostRunner`]. Step patterns
//! may use parameter tokens such as `{int}`; scenario outlines are expanded
//! row by row; hooks run around scenarios and steps; every run produces a
//! [`RunReport`].
//!
//! ```
//! use stepwise::{Context, Suite, SuiteOptions};
//! use stepwise::loader::parse_feature;
//! use stepwise_harness::{HostRunner, StdRunner};
//!
//! let feature = parse_feature(
//!     "Feature: Cats\n  Scenario: Adopting\n    Given I have 2 cats\n    When I adopt 1 more\n    Then I have 3 cats\n",
//!     None,
//! )
//! .expect("valid gherkin");
//!
//! let mut suite = Suite::new(SuiteOptions::new());
//! suite
//!     .add_step("I have {int} cats$", |runner: &mut dyn HostRunner, ctx: &mut Context, n: u32| {
//!         match ctx.get::<_, u32>(&"cats") {
//!             Some(&cats) if cats != n => runner.error(&format!("expected {n} cats, found {cats}")),
//!             Some(_) => {}
//!             None => ctx.set("cats", n),
//!         }
//!     })
//!     .add_step("I adopt {int} more", |_: &mut dyn HostRunner, ctx: &mut Context, n: u32| {
//!         let cats = ctx.get::<_, u32>(&"cats").copied().unwrap_or_default();
//!         ctx.set("cats", cats + n);
//!     });
//!
//! let mut runner = StdRunner::new("cats");
//! let report = suite.run_features(&mut runner, &[feature]).expect("valid suite");
//! assert!(!report.has_failures());
//! ```

pub use stepwise_harness::{HostRunner, RunnerExt, StdRunner, UnitStatus};
pub use stepwise_patterns::ParameterTypes;

pub mod coercion;
pub mod config;
pub mod context;
pub mod document;
pub mod executor;
pub mod handler;
pub mod hooks;
pub mod loader;
pub mod outline;
pub mod registry;
pub mod reporting;
pub mod suite;

pub use context::{Context, ContextError, ContextKey};
pub use document::{Feature, Scenario, Step};
pub use handler::{Handler, InvokeError, StepHandler};
pub use registry::{ConfigError, ResolveError, StepDefinition, StepRegistry};
pub use reporting::{RunReport, Status};
pub use suite::{Suite, SuiteError, SuiteOptions};

#[cfg(test)]
mod test_support;
