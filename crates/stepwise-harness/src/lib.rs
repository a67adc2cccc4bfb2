//! Host test-runner contracts for `stepwise`.
//!
//! The execution engine never talks to a concrete test framework. It drives a
//! [`HostRunner`], which owns the hierarchy of reporting units (suite, feature,
//! scenario, step) and their pass/fail/skip state. [`StdRunner`] is the
//! in-process host used by default and by the test suites; other hosts can
//! implement the trait to map units onto their own reporting model.

mod host;
mod panic;
mod signal;
mod std_runner;

pub use host::{HostRunner, UnitStatus};
pub use panic::panic_message;
pub use signal::{RunnerExt, StepSignal};
pub use std_runner::{StdRunner, UnitMessage, UnitReport};
