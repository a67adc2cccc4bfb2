//! JSON writer for run reports.
//!
//! Status labels are lowercase and durations are whole microseconds.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;

use super::{FeatureRecord, LoadFailure, RunReport, ScenarioRecord, StepRecord};

#[derive(Serialize)]
struct JsonReport<'a> {
    duration_us: u128,
    features: Vec<JsonFeature<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    load_failures: Vec<JsonLoadFailure<'a>>,
}

#[derive(Serialize)]
struct JsonFeature<'a> {
    keyword: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    line: usize,
    tags: &'a [String],
    status: &'static str,
    duration_us: u128,
    scenarios: Vec<JsonScenario<'a>>,
}

#[derive(Serialize)]
struct JsonScenario<'a> {
    id: &'a str,
    keyword: &'a str,
    name: &'a str,
    line: usize,
    tags: &'a [String],
    status: &'static str,
    duration_us: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    steps: Vec<JsonStep<'a>>,
}

#[derive(Serialize)]
struct JsonStep<'a> {
    keyword: &'a str,
    text: &'a str,
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<&'a str>,
    background: bool,
    status: &'static str,
    duration_us: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonLoadFailure<'a> {
    path: &'a str,
    message: &'a str,
}

fn micros(duration: Duration) -> u128 {
    duration.as_micros()
}

impl<'a> From<&'a RunReport> for JsonReport<'a> {
    fn from(report: &'a RunReport) -> Self {
        Self {
            duration_us: micros(report.duration),
            features: report.features.iter().map(JsonFeature::from).collect(),
            load_failures: report.load_failures.iter().map(JsonLoadFailure::from).collect(),
        }
    }
}

impl<'a> From<&'a FeatureRecord> for JsonFeature<'a> {
    fn from(feature: &'a FeatureRecord) -> Self {
        Self {
            keyword: &feature.keyword,
            name: &feature.name,
            path: feature.path.as_deref().map(camino::Utf8Path::as_str),
            line: feature.line,
            tags: &feature.tags,
            status: feature.status.label(),
            duration_us: micros(feature.duration),
            scenarios: feature.scenarios.iter().map(JsonScenario::from).collect(),
        }
    }
}

impl<'a> From<&'a ScenarioRecord> for JsonScenario<'a> {
    fn from(scenario: &'a ScenarioRecord) -> Self {
        let background = scenario.background.iter().map(|step| JsonStep::new(step, true));
        let body = scenario.steps.iter().map(|step| JsonStep::new(step, false));
        Self {
            id: &scenario.id,
            keyword: &scenario.keyword,
            name: &scenario.name,
            line: scenario.line,
            tags: &scenario.tags,
            status: scenario.status.label(),
            duration_us: micros(scenario.duration),
            message: scenario.message.as_deref(),
            steps: background.chain(body).collect(),
        }
    }
}

impl<'a> JsonStep<'a> {
    fn new(step: &'a StepRecord, background: bool) -> Self {
        Self {
            keyword: &step.keyword,
            text: &step.text,
            line: step.line,
            example: step.example.as_deref(),
            background,
            status: step.status.label(),
            duration_us: micros(step.duration),
            error: step.error.as_deref(),
        }
    }
}

impl<'a> From<&'a LoadFailure> for JsonLoadFailure<'a> {
    fn from(failure: &'a LoadFailure) -> Self {
        Self {
            path: failure.path.as_str(),
            message: &failure.message,
        }
    }
}

/// Serialize `report` into `writer`.
///
/// # Examples
/// ```rust
/// use stepwise::reporting::{json, RunReport};
///
/// let mut buffer = Vec::new();
/// json::write(&mut buffer, &RunReport::default()).unwrap();
/// assert_eq!(String::from_utf8(buffer).unwrap(), r#"{"duration_us":0,"features":[]}"#);
/// ```
///
/// # Errors
/// Returns an error when serialization or the writer fails.
pub fn write<W: Write>(writer: &mut W, report: &RunReport) -> serde_json::Result<()> {
    serde_json::to_writer(writer, &JsonReport::from(report))
}

/// Render `report` as a JSON string.
///
/// # Errors
/// Returns an error when serialization fails.
pub fn to_string(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string(&JsonReport::from(report))
}
