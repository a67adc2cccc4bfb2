//! Process-wide runtime settings.
//!
//! The only setting is the default [`CoercionMode`] used by suites that do not
//! choose one explicitly. It is read from `STEPWISE_STRICT_COERCION` unless a
//! test has installed an in-process override.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::coercion::CoercionMode;

/// Environment variable selecting strict coercion.
pub const STRICT_COERCION_ENV: &str = "STEPWISE_STRICT_COERCION";

const OVERRIDE_UNSET: u8 = 0;
const OVERRIDE_LENIENT: u8 = 1;
const OVERRIDE_STRICT: u8 = 2;

static STRICT_COERCION_OVERRIDE: AtomicU8 = AtomicU8::new(OVERRIDE_UNSET);

const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];
const FALSY: [&str; 4] = ["0", "false", "no", "off"];

fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    let is = |candidates: &[&str]| candidates.iter().any(|c| c.eq_ignore_ascii_case(value));
    if is(&TRUTHY) {
        Some(true)
    } else if is(&FALSY) {
        Some(false)
    } else {
        None
    }
}

fn env_strict() -> Option<bool> {
    let raw = std::env::var(STRICT_COERCION_ENV).ok()?;
    let parsed = parse_flag(&raw);
    if parsed.is_none() {
        log::warn!("ignoring {STRICT_COERCION_ENV}={raw:?}: expected a boolean");
    }
    parsed
}

fn override_strict() -> Option<bool> {
    match STRICT_COERCION_OVERRIDE.load(Ordering::Relaxed) {
        OVERRIDE_LENIENT => Some(false),
        OVERRIDE_STRICT => Some(true),
        _ => None,
    }
}

/// Coercion mode for suites that leave it unset.
///
/// An override installed with [`set_strict_coercion`] wins over the
/// environment; without either the mode is [`CoercionMode::Lenient`].
#[must_use]
pub fn coercion_mode() -> CoercionMode {
    if override_strict().or_else(env_strict).unwrap_or(false) {
        CoercionMode::Strict
    } else {
        CoercionMode::Lenient
    }
}

/// Force strict (`true`) or lenient (`false`) coercion for this process.
pub fn set_strict_coercion(strict: bool) {
    let value = if strict {
        OVERRIDE_STRICT
    } else {
        OVERRIDE_LENIENT
    };
    STRICT_COERCION_OVERRIDE.store(value, Ordering::Relaxed);
}

/// Drop the override installed by [`set_strict_coercion`].
pub fn clear_strict_coercion_override() {
    STRICT_COERCION_OVERRIDE.store(OVERRIDE_UNSET, Ordering::Relaxed);
}
