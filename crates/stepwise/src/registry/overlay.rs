//! Per-scenario overlay for patterns derived from outline rows.

use super::{ResolveError, StepDefinition, StepRegistry, select};

/// Definitions derived while expanding one outline, layered over the suite
/// registry.
///
/// Derived definitions are visible to [`DerivedSteps::resolve`] only, so an
/// outline never leaks patterns into other scenarios.
#[derive(Debug)]
pub struct DerivedSteps<'a> {
    base: &'a StepRegistry,
    derived: Vec<StepDefinition>,
}

impl<'a> DerivedSteps<'a> {
    /// Start an empty overlay on `base`.
    #[must_use]
    pub fn new(base: &'a StepRegistry) -> Self {
        Self {
            base,
            derived: Vec::new(),
        }
    }

    /// Underlying suite registry.
    #[must_use]
    pub fn base(&self) -> &'a StepRegistry {
        self.base
    }

    /// Add a derived definition. It ranks after every base definition when
    /// all else is equal.
    pub fn add(&mut self, definition: StepDefinition) {
        self.derived.push(definition);
    }

    /// Number of derived definitions.
    #[must_use]
    pub fn derived_len(&self) -> usize {
        self.derived.len()
    }

    /// Resolve against the base registry and the derived definitions.
    ///
    /// # Errors
    /// Returns [`ResolveError::NotFound`] when nothing matches.
    pub fn resolve(&self, text: &str) -> Result<StepDefinition, ResolveError> {
        select(self.base.definitions().chain(self.derived.iter()), text)
    }
}
