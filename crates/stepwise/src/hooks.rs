//! Before/after hooks for scenarios and steps.
//!
//! Hooks run in registration order. A panicking hook is reported as a failure
//! of the unit it runs in and the remaining hooks of the same list still run.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use stepwise_harness::{HostRunner, StepSignal, panic_message};

use crate::context::Context;

/// A hook function.
pub type Hook = Arc<dyn Fn(&mut dyn HostRunner, &mut Context) + Send + Sync>;

/// Where a hook list runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before the background of every scenario.
    BeforeScenario,
    /// After the body of every scenario.
    AfterScenario,
    /// Before every step is resolved.
    BeforeStep,
    /// After every step, even a failing one.
    AfterStep,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeforeScenario => "before-scenario",
            Self::AfterScenario => "after-scenario",
            Self::BeforeStep => "before-step",
            Self::AfterStep => "after-step",
        })
    }
}

/// The four hook lists of a suite.
#[derive(Clone, Default)]
pub struct Hooks {
    before_scenario: Vec<Hook>,
    after_scenario: Vec<Hook>,
    before_step: Vec<Hook>,
    after_step: Vec<Hook>,
}

impl Hooks {
    /// Append `hook` to the list for `point`.
    pub fn push(&mut self, point: HookPoint, hook: Hook) {
        self.list_mut(point).push(hook);
    }

    /// Hooks registered for `point`, in order.
    #[must_use]
    pub fn list(&self, point: HookPoint) -> &[Hook] {
        match point {
            HookPoint::BeforeScenario => &self.before_scenario,
            HookPoint::AfterScenario => &self.after_scenario,
            HookPoint::BeforeStep => &self.before_step,
            HookPoint::AfterStep => &self.after_step,
        }
    }

    fn list_mut(&mut self, point: HookPoint) -> &mut Vec<Hook> {
        match point {
            HookPoint::BeforeScenario => &mut self.before_scenario,
            HookPoint::AfterScenario => &mut self.after_scenario,
            HookPoint::BeforeStep => &mut self.before_step,
            HookPoint::AfterStep => &mut self.after_step,
        }
    }

    /// Run every hook registered for `point`.
    pub fn run(&self, point: HookPoint, runner: &mut dyn HostRunner, ctx: &mut Context) {
        for hook in self.list(point) {
            contain(runner, &point.to_string(), |runner| hook(runner, ctx));
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_scenario", &self.before_scenario.len())
            .field("after_scenario", &self.after_scenario.len())
            .field("before_step", &self.before_step.len())
            .field("after_step", &self.after_step.len())
            .finish()
    }
}

/// Run `body`, turning an unwind into a report on `runner`.
///
/// [`StepSignal`] payloads were already recorded by whoever raised them.
/// Any other panic is reported as an error prefixed with `origin`.
pub(crate) fn contain(
    runner: &mut dyn HostRunner,
    origin: &str,
    body: impl FnOnce(&mut dyn HostRunner),
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut *runner)));
    let Err(payload) = outcome else {
        return;
    };
    if let Some(signal) = StepSignal::from_payload(payload.as_ref()) {
        log::debug!("{origin} stopped: {}", signal.message());
        return;
    }
    runner.error(&format!("{origin} panicked: {}", panic_message(payload.as_ref())));
}
