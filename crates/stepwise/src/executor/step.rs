//! Execution of a single step inside its own host unit.

use std::time::Instant;

use stepwise_harness::{HostRunner, UnitStatus};

use super::Executor;
use crate::context::Context;
use crate::document::Step;
use crate::hooks::{HookPoint, contain};
use crate::registry::DerivedSteps;
use crate::reporting::{Status, StepRecord};

/// Forwards to the host while keeping the error messages of one unit.
pub(super) struct Tap<'r> {
    inner: &'r mut dyn HostRunner,
    errors: Vec<String>,
}

impl<'r> Tap<'r> {
    pub(super) fn new(inner: &'r mut dyn HostRunner) -> Self {
        Self {
            inner,
            errors: Vec::new(),
        }
    }

    pub(super) fn first_error(&self) -> Option<String> {
        self.errors.first().cloned()
    }
}

impl HostRunner for Tap<'_> {
    fn sub_unit(&mut self, name: &str, body: &mut dyn FnMut(&mut dyn HostRunner)) -> UnitStatus {
        self.inner.sub_unit(name, body)
    }

    fn status(&self) -> UnitStatus {
        self.inner.status()
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_owned());
        self.inner.error(message);
    }

    fn skip(&mut self, message: &str) {
        self.inner.skip(message);
    }

    fn log(&mut self, message: &str) {
        self.inner.log(message);
    }

    fn declare_parallel(&mut self) {
        self.inner.declare_parallel();
    }
}

/// What running one step produced.
pub(super) struct StepOutcome {
    pub(super) record: StepRecord,
    pub(super) unresolved: bool,
}

impl Executor<'_> {
    /// Run `step` in a sub-unit of `runner`: before-step hooks, resolution,
    /// invocation, then after-step hooks.
    pub(super) fn run_step(
        &self,
        runner: &mut dyn HostRunner,
        ctx: &mut Context,
        step: &Step,
        steps: &DerivedSteps<'_>,
        example: Option<&str>,
    ) -> StepOutcome {
        let started = Instant::now();
        let mut unresolved = false;
        let mut error = None;
        let status = runner.sub_unit(&step.unit_name(), &mut |unit| {
            let mut tap = Tap::new(unit);
            self.hooks.run(HookPoint::BeforeStep, &mut tap, ctx);
            if tap.status().is_skipped() {
                log::debug!("step `{}` skipped by a before-step hook", step.text);
            } else {
                match steps.resolve(&step.text) {
                    Ok(definition) => {
                        log::debug!("step `{}` resolved to `{}`", step.text, definition.source());
                        contain(&mut tap, "step", |unit| {
                            let args = definition.captures(&step.text).unwrap_or_default();
                            if let Err(err) = definition.handler().invoke(unit, ctx, &args, self.mode)
                            {
                                unit.error(&err.to_string());
                            }
                        });
                    }
                    Err(err) => {
                        log::warn!("{err}");
                        unresolved = true;
                        tap.error(&err.to_string());
                    }
                }
            }
            self.hooks.run(HookPoint::AfterStep, &mut tap, ctx);
            error = tap.first_error();
        });
        let status = Status::from(status);
        StepOutcome {
            record: StepRecord {
                keyword: step.keyword.clone(),
                text: step.text.clone(),
                line: step.line,
                example: example.map(str::to_owned),
                status,
                duration: started.elapsed(),
                error: error.filter(|_| status.is_failed()),
            },
            unresolved,
        }
    }
}

/// Record for a step that never ran.
pub(super) fn not_run(step: &Step, example: Option<&str>) -> StepRecord {
    StepRecord {
        keyword: step.keyword.clone(),
        text: step.text.clone(),
        line: step.line,
        example: example.map(str::to_owned),
        status: Status::Skipped,
        duration: std::time::Duration::ZERO,
        error: None,
    }
}
