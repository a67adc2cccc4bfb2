//! Outcome records produced by a suite run.
//!
//! A [`RunReport`] holds one [`FeatureRecord`] per feature, each holding one
//! [`ScenarioRecord`] per scenario, each holding one [`StepRecord`] per step.
//! Steps that never ran are still recorded, as skipped.

use std::fmt;
use std::time::Duration;

use camino::Utf8PathBuf;
use stepwise_harness::UnitStatus;

/// JSON rendering of a [`RunReport`].
#[cfg(feature = "json")]
pub mod json;

/// Outcome of a step, scenario or feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// Completed without failure.
    #[default]
    Passed,
    /// At least one failure was reported.
    Failed,
    /// Not executed, or skipped from inside.
    Skipped,
}

impl Status {
    /// Lowercase label, as used in serialized reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Whether the status is [`Status::Failed`].
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Whether the status is [`Status::Skipped`].
    #[must_use]
    pub const fn is_skipped(self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl From<UnitStatus> for Status {
    fn from(status: UnitStatus) -> Self {
        match status {
            UnitStatus::Passed => Self::Passed,
            UnitStatus::Failed => Self::Failed,
            UnitStatus::Skipped => Self::Skipped,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Keyword as written.
    pub keyword: String,
    /// Step text after outline substitution.
    pub text: String,
    /// One-based source line.
    pub line: usize,
    /// Example row the step belongs to, for outline steps.
    pub example: Option<String>,
    /// Outcome.
    pub status: Status,
    /// Time spent in the step unit.
    pub duration: Duration,
    /// Failure message, when the step failed.
    pub error: Option<String>,
}

/// Outcome of one scenario or outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRecord {
    /// Stable scenario id.
    pub id: String,
    /// Keyword as written.
    pub keyword: String,
    /// Scenario name.
    pub name: String,
    /// One-based source line.
    pub line: usize,
    /// Scenario tags, normalised.
    pub tags: Vec<String>,
    /// Outcome.
    pub status: Status,
    /// Time spent in the scenario unit.
    pub duration: Duration,
    /// Background steps run before the body.
    pub background: Vec<StepRecord>,
    /// Body steps; for outlines, the steps of every row in order.
    pub steps: Vec<StepRecord>,
    /// Why the scenario failed or was skipped, when known.
    pub message: Option<String>,
}

impl ScenarioRecord {
    /// Background and body steps, in execution order.
    pub fn all_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.background.iter().chain(self.steps.iter())
    }
}

/// Outcome of one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    /// Keyword as written.
    pub keyword: String,
    /// Feature name.
    pub name: String,
    /// Source file, when loaded from disk.
    pub path: Option<Utf8PathBuf>,
    /// One-based source line.
    pub line: usize,
    /// Feature tags, normalised.
    pub tags: Vec<String>,
    /// Outcome.
    pub status: Status,
    /// Time spent in the feature unit.
    pub duration: Duration,
    /// Scenario outcomes in document order.
    pub scenarios: Vec<ScenarioRecord>,
}

impl FeatureRecord {
    /// Whether any scenario failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.scenarios.iter().any(|scenario| scenario.status.is_failed())
    }
}

/// A feature file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// File path.
    pub path: Utf8PathBuf,
    /// Loader error message.
    pub message: String,
}

/// Everything a suite run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Feature outcomes in run order.
    pub features: Vec<FeatureRecord>,
    /// Files that failed to load.
    pub load_failures: Vec<LoadFailure>,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl RunReport {
    /// Whether any feature failed or any file failed to load.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.load_failures.is_empty() || self.features.iter().any(|f| f.status.is_failed())
    }

    /// Features whose status is failed.
    pub fn failed_features(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.features.iter().filter(|f| f.status.is_failed())
    }

    /// Every scenario record across features.
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.features.iter().flat_map(|f| f.scenarios.iter())
    }

    /// Count scenarios per status, as `(passed, failed, skipped)`.
    #[must_use]
    pub fn scenario_totals(&self) -> (usize, usize, usize) {
        self.scenarios()
            .fold((0, 0, 0), |(passed, failed, skipped), s| match s.status {
                Status::Passed => (passed + 1, failed, skipped),
                Status::Failed => (passed, failed + 1, skipped),
                Status::Skipped => (passed, failed, skipped + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scenario(name: &str, status: Status) -> ScenarioRecord {
        ScenarioRecord {
            id: format!("f;{name}"),
            keyword: "Scenario".into(),
            name: name.into(),
            line: 3,
            tags: Vec::new(),
            status,
            duration: Duration::ZERO,
            background: Vec::new(),
            steps: Vec::new(),
            message: None,
        }
    }

    fn feature(status: Status, scenarios: Vec<ScenarioRecord>) -> FeatureRecord {
        FeatureRecord {
            keyword: "Feature".into(),
            name: "f".into(),
            path: None,
            line: 1,
            tags: Vec::new(),
            status,
            duration: Duration::ZERO,
            scenarios,
        }
    }

    #[rstest]
    #[case(UnitStatus::Passed, Status::Passed, "passed")]
    #[case(UnitStatus::Failed, Status::Failed, "failed")]
    #[case(UnitStatus::Skipped, Status::Skipped, "skipped")]
    fn maps_unit_statuses(#[case] unit: UnitStatus, #[case] status: Status, #[case] label: &str) {
        assert_eq!(Status::from(unit), status);
        assert_eq!(status.label(), label);
    }

    #[test]
    fn totals_and_failures() {
        let report = RunReport {
            features: vec![
                feature(
                    Status::Failed,
                    vec![scenario("a", Status::Passed), scenario("b", Status::Failed)],
                ),
                feature(Status::Passed, vec![scenario("c", Status::Skipped)]),
            ],
            load_failures: Vec::new(),
            duration: Duration::ZERO,
        };
        assert!(report.has_failures());
        assert_eq!(report.failed_features().count(), 1);
        assert_eq!(report.scenario_totals(), (1, 1, 1));
        assert!(report.features.first().is_some_and(FeatureRecord::has_errors));
    }

    #[test]
    fn load_failures_count_as_failures() {
        let report = RunReport {
            load_failures: vec![LoadFailure {
                path: "features/broken.feature".into(),
                message: "unexpected token".into(),
            }],
            ..RunReport::default()
        };
        assert!(report.has_failures());
        assert_eq!(report.failed_features().count(), 0);
    }
}
