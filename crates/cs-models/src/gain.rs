//! Memoryless gain model.

use cs_backend::{BackendError, BackendResult, ModelInstance, expect_kind};
use cs_core::{Value, ValueKind};

/// Pure gain: output `y = k * u`.
///
/// The output is recomputed on every step, including zero-length ones, so a
/// master configured with iterate-after-set sees input writes immediately.
#[derive(Debug, Clone)]
pub struct GainModel {
    name: String,
    /// Gain applied to the input.
    pub k: f64,
    u: f64,
    y: f64,
}

impl GainModel {
    /// Create a gain model.
    pub fn new(name: impl Into<String>, k: f64) -> Self {
        Self {
            name: name.into(),
            k,
            u: 0.0,
            y: 0.0,
        }
    }
}

impl ModelInstance for GainModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, _start_time: f64) -> BackendResult<()> {
        self.y = self.k * self.u;
        Ok(())
    }

    fn variable_kind(&self, variable: &str) -> BackendResult<ValueKind> {
        match variable {
            "u" | "y" => Ok(ValueKind::Real),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn get_value(&self, variable: &str) -> BackendResult<Value> {
        match variable {
            "u" => Ok(Value::Real(self.u)),
            "y" => Ok(Value::Real(self.y)),
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
            "y" => Err(BackendError::Model {
                reason: "output 'y' is not writable".to_string(),
            }),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn step(&mut self, _from_time: f64, _dt: f64) -> BackendResult<()> {
        self.y = self.k * self.u;
        Ok(())
    }
}
