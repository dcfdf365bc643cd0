//! ModelInstance and ModelLoader traits for pluggable execution backends.

use cs_core::{Value, ValueKind};

use crate::descriptor::ModelDescriptor;
use crate::error::{BackendError, BackendResult};

/// One live, exclusively-owned sub-model.
///
/// The master calls these primitives strictly serially; an instance never
/// needs internal synchronization. Times are seconds on the host engine's
/// clock. After a failed [`step`](ModelInstance::step) the instance state is
/// undefined and the run is over — no method will be called again.
pub trait ModelInstance {
    /// Instance name, as given in the descriptor.
    fn name(&self) -> &str;

    /// Bring the model to its initial state at `start_time`.
    ///
    /// Called exactly once, before any get/set/step.
    fn initialize(&mut self, start_time: f64) -> BackendResult<()>;

    /// The kind of a named variable, or `UnknownVariable`.
    fn variable_kind(&self, variable: &str) -> BackendResult<ValueKind>;

    /// Read a variable's current value.
    fn get_value(&self, variable: &str) -> BackendResult<Value>;

    /// Write an input variable.
    ///
    /// Whether outputs reflect the write immediately or only after the next
    /// step is model-specific; the master's iterate-after-set setting forces
    /// a zero-`dt` step when immediate visibility is required.
    fn set_value(&mut self, variable: &str, value: Value) -> BackendResult<()>;

    /// Advance the model from `from_time` by `dt` (`dt >= 0`).
    ///
    /// `dt == 0` means: re-evaluate outputs at the current instant without
    /// advancing time.
    fn step(&mut self, from_time: f64, dt: f64) -> BackendResult<()>;

    /// The time of the model's next internal discontinuity, if it knows one.
    ///
    /// Fixed-step models return `None` (the default). Predictive models
    /// recompute this after every input change, step, or event resolution.
    fn predicted_event_time(&self) -> Option<f64> {
        None
    }

    /// Resolve the discontinuity at `time`: jump from the left-limit to the
    /// right-limit state, and return the re-predicted next event time.
    ///
    /// Only called when the model's local time has reached its predicted
    /// event time. The default is for fixed-step models, which never get
    /// here.
    fn resolve_event(&mut self, time: f64) -> BackendResult<Option<f64>> {
        let _ = time;
        Ok(None)
    }
}

/// Produces model instances from descriptors.
pub trait ModelLoader {
    /// Load the model a descriptor points at.
    ///
    /// The returned instance is not initialized yet; the master calls
    /// [`ModelInstance::initialize`] with its current time.
    fn load(&self, descriptor: &ModelDescriptor) -> BackendResult<Box<dyn ModelInstance>>;
}

/// Check an incoming value against a variable's kind.
///
/// Helper for `set_value` implementations.
pub fn expect_kind(variable: &str, expected: ValueKind, value: &Value) -> BackendResult<()> {
    let actual = value.kind();
    if actual == expected {
        Ok(())
    } else {
        Err(BackendError::Type {
            variable: variable.to_string(),
            expected,
            actual,
        })
    }
}
