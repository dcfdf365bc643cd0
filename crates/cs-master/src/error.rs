//! Error types for master operations.

use cs_backend::BackendError;
use cs_core::{ComponentId, CsError, Port, ValueKind};
use thiserror::Error;

/// Result type for master operations.
pub type MasterResult<T> = Result<T, MasterError>;

/// Errors reported by the co-simulation master.
///
/// Configuration errors (unknown port, type mismatch, already-bound
/// destination, mutation after freeze) are reported synchronously to the
/// caller of the mutating API and never retried. Backend failures are fatal
/// to the run: component state after a failed operation is undefined, so the
/// host is expected to abort the affected run rather than continue degraded.
#[derive(Debug, Error)]
pub enum MasterError {
    /// No component registered under this id.
    #[error("unknown component {component}")]
    UnknownComponent { component: ComponentId },

    /// The port's component or variable is not registered.
    #[error("unknown port {port}")]
    UnknownPort { port: String },

    /// Two value kinds that must agree do not.
    #[error("type mismatch on {port}: expected {expected}, got {actual}")]
    TypeMismatch {
        port: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// The destination port already has a producer (coupling or driver).
    #[error("destination {port} is already bound")]
    AlreadyBound { port: String },

    /// Topology mutation attempted after the run was frozen.
    #[error("topology is frozen")]
    Frozen,

    /// A run operation was attempted before `freeze()`.
    #[error("master is not frozen yet")]
    NotFrozen,

    /// `advance` was called with a target not ahead of the current time.
    #[error("advance target t = {target} is not ahead of current time t = {current}")]
    BadTarget { target: f64, current: f64 },

    /// Rejected master options.
    #[error("invalid options: {what}")]
    InvalidOptions { what: &'static str },

    /// The backend could not produce a model instance.
    #[error("loading component '{name}' failed: {source}")]
    Load { name: String, source: BackendError },

    /// Post-load initialization of a component failed.
    #[error("initializing component '{name}' failed: {source}")]
    Init { name: String, source: BackendError },

    /// A component failed to advance; master state is as of the last
    /// successful sub-step.
    #[error("component '{component}' failed stepping from t = {from} to t = {to}: {source}")]
    Step {
        component: String,
        from: f64,
        to: f64,
        source: BackendError,
    },

    /// A component reported a failure on a value access or event resolution.
    #[error("component '{component}' backend failure: {source}")]
    Backend {
        component: String,
        source: BackendError,
    },

    /// The relaxation loop still saw changes after the configured sweep cap.
    #[error("coupling relaxation did not converge within {sweeps} sweeps")]
    NotConverged { sweeps: usize },

    /// Numeric validation failure on a time or input value.
    #[error(transparent)]
    Numeric(#[from] CsError),
}

/// Attach port/component context to a backend error.
///
/// Unknown variables surface as unknown ports (the port is the unit the
/// caller named); declared-kind conflicts surface as type mismatches.
pub(crate) fn backend_to_master(port: &Port, component: &str, e: BackendError) -> MasterError {
    match e {
        BackendError::UnknownVariable { .. } => MasterError::UnknownPort {
            port: port.to_string(),
        },
        BackendError::Type {
            expected, actual, ..
        } => MasterError::TypeMismatch {
            port: port.to_string(),
            expected,
            actual,
        },
        other => MasterError::Backend {
            component: component.to_string(),
            source: other,
        },
    }
}
