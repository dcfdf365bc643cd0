//! Error types for backend operations.

use cs_core::ValueKind;
use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by a model-execution backend.
///
/// Every failure here concerns a single model instance; the master adds the
/// component context when it propagates one.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not produce a model instance.
    #[error("failed to load model '{name}' from '{uri}': {reason}")]
    Load {
        uri: String,
        name: String,
        reason: String,
    },

    /// Post-load initialization failed.
    #[error("failed to initialize model at t = {start_time}: {reason}")]
    Init { start_time: f64, reason: String },

    /// The named variable does not exist on this model.
    #[error("unknown variable '{variable}'")]
    UnknownVariable { variable: String },

    /// A value of the wrong kind was read from or written to a variable.
    #[error("type error on variable '{variable}': expected {expected}, got {actual}")]
    Type {
        variable: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// A step over [from, from + dt] failed; the instance state is undefined.
    #[error("step from t = {from} over dt = {dt} failed: {reason}")]
    Step { from: f64, dt: f64, reason: String },

    /// Any other failure internal to the model.
    #[error("model failure: {reason}")]
    Model { reason: String },
}
