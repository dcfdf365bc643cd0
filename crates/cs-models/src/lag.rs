//! First-order lag with an internal integrator.

use cs_backend::{BackendError, BackendResult, ModelInstance, expect_kind};
use cs_core::{Value, ValueKind};

/// First-order lag: `dx/dt = (u - x) / tau`, output `x`.
///
/// The state is integrated by the model itself (one explicit Euler update
/// per step call), the way a co-simulation slave carries its own solver.
/// The master only chooses the communication instants.
#[derive(Debug, Clone)]
pub struct FirstOrderLag {
    name: String,
    /// Time constant in seconds.
    pub tau: f64,
    x0: f64,
    x: f64,
    u: f64,
}

impl FirstOrderLag {
    /// Create a lag with zero initial state.
    pub fn new(name: impl Into<String>, tau: f64) -> Self {
        Self {
            name: name.into(),
            tau,
            x0: 0.0,
            x: 0.0,
            u: 0.0,
        }
    }

    /// Set the initial state used at initialization.
    pub fn with_initial(mut self, x0: f64) -> Self {
        self.x0 = x0;
        self
    }
}

impl ModelInstance for FirstOrderLag {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, _start_time: f64) -> BackendResult<()> {
        if !(self.tau > 0.0) {
            return Err(BackendError::Init {
                start_time: _start_time,
                reason: format!("time constant must be positive, got {}", self.tau),
            });
        }
        self.x = self.x0;
        Ok(())
    }

    fn variable_kind(&self, variable: &str) -> BackendResult<ValueKind> {
        match variable {
            "u" | "x" => Ok(ValueKind::Real),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn get_value(&self, variable: &str) -> BackendResult<Value> {
        match variable {
            "u" => Ok(Value::Real(self.u)),
            "x" => Ok(Value::Real(self.x)),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn set_value(&mut self, variable: &str, value: Value) -> BackendResult<()> {
        match variable {
            "u" => {
                expect_kind("u", ValueKind::Real, &value)?;
                if let Value::Real(v) = value {
                    self.u = v;
                }
                Ok(())
            }
            "x" => Err(BackendError::Model {
                reason: "state 'x' is not writable".to_string(),
            }),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn step(&mut self, _from_time: f64, dt: f64) -> BackendResult<()> {
        if dt > 0.0 {
            self.x += dt * (self.u - self.x) / self.tau;
        }
        Ok(())
    }
}
