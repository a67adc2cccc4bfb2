//! Helpers shared by the behavioural tests.

use std::sync::{Arc, Mutex, PoisonError};

use stepwise::{Context, HostRunner};

/// Ordered log of events observed by hooks and handlers.
#[derive(Clone, Default)]
pub struct Calls {
    events: Arc<Mutex<Vec<String>>>,
}

impl Calls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events().iter().filter(|seen| seen.as_str() == event).count()
    }

    /// A hook that records `label`.
    pub fn hook(&self, label: &'static str) -> impl Fn(&mut dyn HostRunner, &mut Context) + Send + Sync + 'static {
        let calls = self.clone();
        move |_: &mut dyn HostRunner, _: &mut Context| calls.push(label)
    }
}
