//! Model descriptors: everything the master needs to create one component.

use serde::{Deserialize, Serialize};

/// How a model advances in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SteppingScheme {
    /// Advanced by externally chosen increments; no self-reported
    /// discontinuities beyond the configured communication step.
    FixedStep,
    /// Reports the time of its next internal discontinuity after every input
    /// change or step; must not be advanced past that time unresolved.
    Predictive,
}

/// Creation-time description of one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Where the backend finds the model (interpretation is backend-specific).
    pub uri: String,
    /// Instance name, used in diagnostics and traces.
    pub name: String,
    /// Stepping scheme of the wrapped model.
    pub scheme: SteppingScheme,
    /// Whether an input write forces the model to re-evaluate its outputs at
    /// zero time advance before anyone reads them again.
    pub iterate_after_set: bool,
}

impl ModelDescriptor {
    /// Describe a fixed-step model. Input writes re-evaluate outputs by
    /// default, matching the usual co-simulation backend behavior.
    pub fn fixed_step(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            scheme: SteppingScheme::FixedStep,
            iterate_after_set: true,
        }
    }

    /// Describe a predictive model.
    pub fn predictive(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scheme: SteppingScheme::Predictive,
            ..Self::fixed_step(uri, name)
        }
    }

    /// Override the iterate-after-set behavior.
    pub fn with_iterate_after_set(mut self, iterate: bool) -> Self {
        self.iterate_after_set = iterate;
        self
    }
}
