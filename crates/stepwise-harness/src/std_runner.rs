//! In-process host runner that records a tree of unit reports.

use std::panic::{self, AssertUnwindSafe};

use crate::host::{HostRunner, UnitStatus};
use crate::panic::panic_message;
use crate::signal::StepSignal;

/// A message attached to a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnitMessage {
    /// Informational output.
    Log(String),
    /// An error that marked the unit failed.
    Error(String),
    /// The reason the unit was skipped.
    Skip(String),
}

/// Recorded outcome of one unit and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// Unit name as passed to [`HostRunner::sub_unit`].
    pub name: String,
    /// Final status.
    pub status: UnitStatus,
    /// Messages in the order they were recorded.
    pub messages: Vec<UnitMessage>,
    /// Nested units in the order they ran.
    pub children: Vec<UnitReport>,
    /// Whether the unit declared its children parallelisable.
    pub parallel: bool,
}

impl UnitReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            status: UnitStatus::Passed,
            messages: Vec::new(),
            children: Vec::new(),
            parallel: false,
        }
    }

    /// Find a direct child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Error messages recorded on this unit.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(|message| match message {
            UnitMessage::Error(text) => Some(text.as_str()),
            UnitMessage::Log(_) | UnitMessage::Skip(_) => None,
        })
    }
}

/// Host runner that executes units synchronously on the calling thread.
///
/// Panics escaping a sub-unit body are caught and recorded as errors on that
/// sub-unit; a [`StepSignal`] payload is recognised and not reported twice.
/// Messages are forwarded to the `log` facade as they are recorded.
///
/// # Examples
///
/// ```
/// use stepwise_harness::{HostRunner, StdRunner, UnitStatus};
///
/// let mut runner = StdRunner::new("suite");
/// runner.sub_unit("broken", &mut |_: &mut dyn HostRunner| panic!("boom"));
/// runner.sub_unit("fine", &mut |_: &mut dyn HostRunner| {});
///
/// let report = runner.into_report();
/// assert_eq!(report.status, UnitStatus::Failed);
/// assert_eq!(report.children.len(), 2);
/// assert_eq!(report.children[1].status, UnitStatus::Passed);
/// ```
#[derive(Debug)]
pub struct StdRunner {
    report: UnitReport,
    failed: bool,
    skipped: bool,
}

impl StdRunner {
    /// Create a root unit called `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            report: UnitReport::new(name),
            failed: false,
            skipped: false,
        }
    }

    /// Report recorded so far.
    #[must_use]
    pub fn report(&self) -> &UnitReport {
        &self.report
    }

    /// Finish the unit and return its report.
    #[must_use]
    pub fn into_report(mut self) -> UnitReport {
        self.report.status = self.status();
        self.report
    }

    fn absorb_panic(&mut self, payload: &(dyn std::any::Any + Send)) {
        match StepSignal::from_payload(payload) {
            Some(StepSignal::Fatal(_)) => self.failed = true,
            Some(StepSignal::Skip(_)) => self.skipped = true,
            _ => self.error(&format!("panicked: {}", panic_message(payload))),
        }
    }
}

impl HostRunner for StdRunner {
    fn sub_unit(&mut self, name: &str, body: &mut dyn FnMut(&mut dyn HostRunner)) -> UnitStatus {
        let mut child = Self::new(name);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut child)));
        if let Err(payload) = outcome {
            child.absorb_panic(payload.as_ref());
        }
        let report = child.into_report();
        let status = report.status;
        log::debug!("{}: {}", report.name, status);
        if status.is_failed() {
            self.failed = true;
        }
        self.report.children.push(report);
        status
    }

    fn status(&self) -> UnitStatus {
        if self.failed {
            UnitStatus::Failed
        } else if self.skipped {
            UnitStatus::Skipped
        } else {
            UnitStatus::Passed
        }
    }

    fn error(&mut self, message: &str) {
        log::error!("{}: {message}", self.report.name);
        self.failed = true;
        self.report.messages.push(UnitMessage::Error(message.to_owned()));
    }

    fn skip(&mut self, message: &str) {
        log::info!("{}: skipped: {message}", self.report.name);
        self.skipped = true;
        self.report.messages.push(UnitMessage::Skip(message.to_owned()));
    }

    fn log(&mut self, message: &str) {
        log::info!("{}: {message}", self.report.name);
        self.report.messages.push(UnitMessage::Log(message.to_owned()));
    }

    fn declare_parallel(&mut self) {
        log::debug!("{}: children may run in parallel", self.report.name);
        self.report.parallel = true;
    }
}
