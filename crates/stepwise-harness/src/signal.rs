//! Control-flow signals raised from inside step handlers and hooks.
//!
//! [`RunnerExt::fatal`] and [`RunnerExt::skip_now`] record their message on the
//! current unit and then unwind with a [`StepSignal`] payload. Whoever runs the
//! handler catches the unwind and recognises the payload, so the step ends
//! immediately without the unwind being reported as an unexpected panic.

use std::any::Any;
use std::panic;

use crate::host::HostRunner;

/// Payload carried by the unwind started by [`RunnerExt::fatal`] or
/// [`RunnerExt::skip_now`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepSignal {
    /// Stop the current unit and mark it failed.
    Fatal(String),
    /// Stop the current unit and mark it skipped.
    Skip(String),
}

impl StepSignal {
    /// Message attached to the signal.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Fatal(message) | Self::Skip(message) => message,
        }
    }

    /// Unwind with this signal as the payload.
    ///
    /// The unwind bypasses the panic hook, so nothing is printed.
    #[track_caller]
    pub fn raise(self) -> ! {
        panic::resume_unwind(Box::new(self))
    }

    /// Recover a signal from a caught panic payload.
    #[must_use]
    pub fn from_payload(payload: &(dyn Any + Send)) -> Option<&Self> {
        payload.downcast_ref::<Self>()
    }
}

/// Early-exit helpers available on every [`HostRunner`].
///
/// # Examples
///
/// ```
/// use std::panic::{self, AssertUnwindSafe};
/// use stepwise_harness::{HostRunner, RunnerExt, StdRunner, StepSignal, UnitStatus};
///
/// let mut runner = StdRunner::new("step");
/// let caught = panic::catch_unwind(AssertUnwindSafe(|| {
///     runner.skip_now("not on this platform");
/// }));
/// let Err(payload) = caught else { unreachable!() };
/// assert!(matches!(StepSignal::from_payload(payload.as_ref()), Some(StepSignal::Skip(_))));
/// assert_eq!(runner.status(), UnitStatus::Skipped);
/// ```
pub trait RunnerExt: HostRunner {
    /// Record `message` as an error and stop the current unit.
    fn fatal(&mut self, message: impl Into<String>) -> ! {
        let message = message.into();
        self.error(&message);
        StepSignal::Fatal(message).raise()
    }

    /// Mark the current unit skipped and stop it.
    fn skip_now(&mut self, message: impl Into<String>) -> ! {
        let message = message.into();
        self.skip(&message);
        StepSignal::Skip(message).raise()
    }
}

impl<T: HostRunner + ?Sized> RunnerExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StdRunner, UnitStatus};
    use std::panic::AssertUnwindSafe;

    #[test]
    fn fatal_records_error_and_unwinds() {
        let mut runner = StdRunner::new("unit");
        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            let host: &mut dyn HostRunner = &mut runner;
            host.fatal("giving up");
        }));
        let Err(payload) = caught else {
            panic!("fatal should unwind");
        };
        assert_eq!(
            StepSignal::from_payload(payload.as_ref()),
            Some(&StepSignal::Fatal("giving up".into()))
        );
        assert_eq!(runner.status(), UnitStatus::Failed);
    }

    #[test]
    fn ordinary_payloads_are_not_signals() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert!(StepSignal::from_payload(payload.as_ref()).is_none());
    }
}
