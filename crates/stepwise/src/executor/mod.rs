//! Feature, scenario and step execution.
//!
//! Features run in order, each in its own host unit. Within a feature every
//! scenario is first checked against the [`TagFilter`]; a skipped scenario is
//! recorded without running any hook or handler. Executable scenarios get a
//! fresh [`Context`] shared by the scenario hooks and the background, while
//! the body (or each outline row) runs on a clone of it.

mod filter;
mod step;

use std::fmt;
use std::time::{Duration, Instant};

use stepwise_harness::{HostRunner, UnitStatus};

pub use filter::TagFilter;

use crate::coercion::CoercionMode;
use crate::context::Context;
use crate::document::{Background, Feature, FeatureChild, Scenario, Step};
use crate::hooks::{HookPoint, Hooks};
use crate::outline::expand_outline;
use crate::registry::{DerivedSteps, StepRegistry};
use crate::reporting::{FeatureRecord, ScenarioRecord, Status, StepRecord};
use step::{Tap, not_run};

/// Where a scenario is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioPhase {
    /// Not entered yet.
    NotStarted,
    /// Running before-scenario hooks and background steps.
    RunningBackground,
    /// Running the body or outline rows.
    RunningSteps,
    /// Body done; after-scenario hooks run from here.
    Completed,
}

impl fmt::Display for ScenarioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "not started",
            Self::RunningBackground => "running background",
            Self::RunningSteps => "running steps",
            Self::Completed => "completed",
        })
    }
}

/// Runs documents against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'s> {
    registry: &'s StepRegistry,
    hooks: &'s Hooks,
    filter: &'s TagFilter,
    mode: CoercionMode,
}

impl<'s> Executor<'s> {
    /// Bind the pieces a run needs.
    #[must_use]
    pub fn new(
        registry: &'s StepRegistry,
        hooks: &'s Hooks,
        filter: &'s TagFilter,
        mode: CoercionMode,
    ) -> Self {
        Self {
            registry,
            hooks,
            filter,
            mode,
        }
    }

    /// Run every scenario of `feature` inside a host unit named after it.
    pub fn run_feature(&self, runner: &mut dyn HostRunner, feature: &Feature) -> FeatureRecord {
        let started = Instant::now();
        if self.filter.is_ignored(&feature.tags) {
            runner.log(&format!("the feature ({}) is ignored", feature.name));
            return feature_record(feature, Status::Skipped, Duration::ZERO, skipped_scenarios(feature));
        }

        let mut scenarios = Vec::new();
        let outcome = runner.sub_unit(&feature.unit_name(), &mut |unit| {
            let mut background = None;
            for child in &feature.children {
                match child {
                    FeatureChild::Background(found) => background = Some(found),
                    FeatureChild::Scenario(scenario) => {
                        scenarios.push(self.run_scenario(unit, scenario, background));
                    }
                }
            }
        });

        let status = if outcome.is_failed() || scenarios.iter().any(|s| s.status.is_failed()) {
            Status::Failed
        } else if !scenarios.is_empty() && scenarios.iter().all(|s| s.status.is_skipped()) {
            Status::Skipped
        } else {
            Status::Passed
        };
        feature_record(feature, status, started.elapsed(), scenarios)
    }

    /// Run one scenario, or record it as skipped when the filter excludes it.
    pub fn run_scenario(
        &self,
        runner: &mut dyn HostRunner,
        scenario: &Scenario,
        background: Option<&Background>,
    ) -> ScenarioRecord {
        if self.filter.skips_scenario(&scenario.tags) {
            runner.log(&format!("Skipping scenario {}", scenario.name));
            let mut record = skipped_scenario(scenario, background);
            record.message = Some("excluded by tag filter".to_owned());
            return record;
        }

        let started = Instant::now();
        let mut background_records = Vec::new();
        let mut body_records = Vec::new();
        let mut hook_error = None;
        let outcome = runner.sub_unit(&scenario.unit_name(), &mut |unit| {
            let mut tracker = PhaseTracker::new(&scenario.name);
            let mut ctx = Context::new();

            tracker.enter(ScenarioPhase::RunningBackground);
            let mut tap = Tap::new(unit);
            self.hooks.run(HookPoint::BeforeScenario, &mut tap, &mut ctx);
            hook_error = tap.first_error();
            let mut halted = unit.status() != UnitStatus::Passed;
            if halted {
                log::debug!("{}: halted by a before-scenario hook", scenario.name);
            }
            let overlay = DerivedSteps::new(self.registry);
            if let Some(background) = background {
                let batch = StepBatch::new(&background.steps, &overlay, None);
                halted = self.run_steps(unit, &mut ctx, &batch, halted, &mut background_records);
            }

            tracker.enter(ScenarioPhase::RunningSteps);
            if scenario.is_outline() {
                self.run_outline(unit, &ctx, scenario, halted, &mut body_records);
            } else {
                let mut body = ctx.clone();
                let batch = StepBatch::new(&scenario.steps, &overlay, None);
                self.run_steps(unit, &mut body, &batch, halted, &mut body_records);
            }

            tracker.enter(ScenarioPhase::Completed);
            self.hooks.run(HookPoint::AfterScenario, unit, &mut ctx);
        });

        let mut steps = background_records.iter().chain(body_records.iter());
        let message = hook_error.or_else(|| steps.clone().find_map(|step| step.error.clone()));
        let every_step_skipped =
            steps.clone().next().is_some() && steps.all(|step| step.status.is_skipped());
        let status = if outcome.is_failed() {
            Status::Failed
        } else if outcome.is_skipped() || every_step_skipped {
            Status::Skipped
        } else {
            Status::Passed
        };
        ScenarioRecord {
            id: scenario.id.clone(),
            keyword: scenario.keyword.clone(),
            name: scenario.name.clone(),
            line: scenario.line,
            tags: tag_names(&scenario.tags),
            status,
            duration: started.elapsed(),
            background: background_records,
            steps: body_records,
            message,
        }
    }

    fn run_outline(
        &self,
        runner: &mut dyn HostRunner,
        ctx: &Context,
        scenario: &Scenario,
        mut halted: bool,
        records: &mut Vec<StepRecord>,
    ) {
        let mut overlay = DerivedSteps::new(self.registry);
        let expansion = expand_outline(&scenario.steps, &scenario.examples, &mut overlay);
        log::debug!(
            "{}: {} example row(s), {} derived pattern(s)",
            scenario.name,
            expansion.rows.len(),
            overlay.derived_len()
        );
        for row in &expansion.rows {
            let label = row.unit_name();
            if halted {
                records.extend(row.steps.iter().map(|step| not_run(step, Some(label.as_str()))));
                continue;
            }
            let mut row_ctx = ctx.clone();
            let batch = StepBatch::new(&row.steps, &overlay, Some(label.as_str()));
            runner.sub_unit(&label, &mut |unit| {
                halted = self.run_steps(unit, &mut row_ctx, &batch, false, records);
            });
        }
    }

    /// Run `steps` in order, returning whether the scenario has to stop.
    ///
    /// Once halted, remaining steps are recorded as skipped without running.
    fn run_steps(
        &self,
        runner: &mut dyn HostRunner,
        ctx: &mut Context,
        batch: &StepBatch<'_>,
        mut halted: bool,
        records: &mut Vec<StepRecord>,
    ) -> bool {
        for step in batch.steps {
            if halted {
                records.push(not_run(step, batch.example));
                continue;
            }
            let outcome = self.run_step(runner, ctx, step, batch.overlay, batch.example);
            halted = outcome.unresolved;
            records.push(outcome.record);
        }
        halted
    }
}

/// Steps sharing one resolver and example label.
struct StepBatch<'b> {
    steps: &'b [Step],
    overlay: &'b DerivedSteps<'b>,
    example: Option<&'b str>,
}

impl<'b> StepBatch<'b> {
    fn new(steps: &'b [Step], overlay: &'b DerivedSteps<'b>, example: Option<&'b str>) -> Self {
        Self {
            steps,
            overlay,
            example,
        }
    }
}

struct PhaseTracker<'n> {
    scenario: &'n str,
    phase: ScenarioPhase,
}

impl<'n> PhaseTracker<'n> {
    fn new(scenario: &'n str) -> Self {
        Self {
            scenario,
            phase: ScenarioPhase::NotStarted,
        }
    }

    fn enter(&mut self, next: ScenarioPhase) {
        log::debug!("{}: {} -> {next}", self.scenario, self.phase);
        self.phase = next;
    }
}

fn tag_names(tags: &[crate::document::Tag]) -> Vec<String> {
    tags.iter().map(|tag| tag.name.clone()).collect()
}

fn skipped_scenario(scenario: &Scenario, background: Option<&Background>) -> ScenarioRecord {
    let background_steps = background.map_or(&[][..], |background| background.steps.as_slice());
    ScenarioRecord {
        id: scenario.id.clone(),
        keyword: scenario.keyword.clone(),
        name: scenario.name.clone(),
        line: scenario.line,
        tags: tag_names(&scenario.tags),
        status: Status::Skipped,
        duration: Duration::ZERO,
        background: background_steps.iter().map(|step| not_run(step, None)).collect(),
        steps: scenario.steps.iter().map(|step| not_run(step, None)).collect(),
        message: None,
    }
}

fn skipped_scenarios(feature: &Feature) -> Vec<ScenarioRecord> {
    let mut background = None;
    let mut records = Vec::new();
    for child in &feature.children {
        match child {
            FeatureChild::Background(found) => background = Some(found),
            FeatureChild::Scenario(scenario) => {
                let mut record = skipped_scenario(scenario, background);
                record.message = Some("feature is ignored".to_owned());
                records.push(record);
            }
        }
    }
    records
}

fn feature_record(
    feature: &Feature,
    status: Status,
    duration: Duration,
    scenarios: Vec<ScenarioRecord>,
) -> FeatureRecord {
    FeatureRecord {
        keyword: feature.keyword.clone(),
        name: feature.name.clone(),
        path: feature.path.clone(),
        line: feature.line,
        tags: tag_names(&feature.tags),
        status,
        duration,
        scenarios,
    }
}
