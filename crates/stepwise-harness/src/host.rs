//! The host runner capability trait.

use std::fmt;

/// Final state of a reporting unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitStatus {
    /// No failure or skip was recorded.
    #[default]
    Passed,
    /// The unit, or one of its children, recorded an error.
    Failed,
    /// The unit was skipped and recorded no error.
    Skipped,
}

impl UnitStatus {
    /// Lowercase label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Whether the unit failed.
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Whether the unit was skipped.
    #[must_use]
    pub const fn is_skipped(self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities the engine needs from a host test runner.
///
/// A runner represents one reporting unit. Nested units are opened with
/// [`HostRunner::sub_unit`]; the body receives the child unit's handle. A
/// failing child marks its parent failed but never aborts its siblings.
///
/// Failure dominates skip: a unit that recorded an error reports
/// [`UnitStatus::Failed`] even if it was later skipped.
///
/// # Examples
///
/// ```
/// use stepwise_harness::{HostRunner, StdRunner, UnitStatus};
///
/// let mut runner = StdRunner::new("suite");
/// let status = runner.sub_unit("child", &mut |unit: &mut dyn HostRunner| {
///     unit.log("working");
/// });
/// assert_eq!(status, UnitStatus::Passed);
/// ```
pub trait HostRunner {
    /// Run `body` inside a nested unit called `name` and return the nested
    /// unit's final status.
    fn sub_unit(&mut self, name: &str, body: &mut dyn FnMut(&mut dyn HostRunner)) -> UnitStatus;

    /// Current status of this unit.
    fn status(&self) -> UnitStatus;

    /// Record an error. The unit is marked failed and execution continues.
    fn error(&mut self, message: &str);

    /// Mark the unit skipped.
    fn skip(&mut self, message: &str);

    /// Attach an informational message to the unit.
    fn log(&mut self, message: &str);

    /// Tell the host that sibling units below this one may run concurrently.
    fn declare_parallel(&mut self);
}
