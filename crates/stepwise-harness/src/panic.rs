//! Panic payload formatting.

use std::any::Any;

use crate::signal::StepSignal;

/// Formats a panic payload into a readable message.
///
/// String payloads and [`StepSignal`]s are rendered as their message; any
/// other payload type is described generically.
///
/// # Examples
///
/// ```
/// use stepwise_harness::panic_message;
/// use std::any::Any;
///
/// let payload: Box<dyn Any + Send> = Box::new("boom");
/// assert_eq!(panic_message(payload.as_ref()), "boom");
/// ```
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .or_else(|| {
            payload
                .downcast_ref::<StepSignal>()
                .map(|signal| signal.message().to_owned())
        })
        .unwrap_or_else(|| "panic with a non-string payload".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_owned_strings() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
    }

    #[test]
    fn formats_step_signals() {
        let payload: Box<dyn Any + Send> = Box::new(StepSignal::Fatal("stop".into()));
        assert_eq!(panic_message(payload.as_ref()), "stop");
    }

    #[test]
    fn describes_other_payloads() {
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "panic with a non-string payload");
    }
}
