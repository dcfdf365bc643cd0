//! Time-driven ramp source.

use cs_backend::{BackendError, BackendResult, ModelInstance};
use cs_core::{Value, ValueKind};

/// Source with no inputs: output `y = offset + rate * (t - t0)`.
#[derive(Debug, Clone)]
pub struct RampSource {
    name: String,
    /// Slope per second.
    pub rate: f64,
    /// Value at the start time.
    pub offset: f64,
    t0: f64,
    t: f64,
}

impl RampSource {
    /// Create a ramp source.
    pub fn new(name: impl Into<String>, offset: f64, rate: f64) -> Self {
        Self {
            name: name.into(),
            rate,
            offset,
            t0: 0.0,
            t: 0.0,
        }
    }
}

impl ModelInstance for RampSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, start_time: f64) -> BackendResult<()> {
        self.t0 = start_time;
        self.t = start_time;
        Ok(())
    }

    fn variable_kind(&self, variable: &str) -> BackendResult<ValueKind> {
        match variable {
            "y" => Ok(ValueKind::Real),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn get_value(&self, variable: &str) -> BackendResult<Value> {
        match variable {
            "y" => Ok(Value::Real(self.offset + self.rate * (self.t - self.t0))),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn set_value(&mut self, variable: &str, _value: Value) -> BackendResult<()> {
        Err(BackendError::UnknownVariable {
            variable: variable.to_string(),
        })
    }

    fn step(&mut self, _from_time: f64, dt: f64) -> BackendResult<()> {
        self.t += dt;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramps_with_time() {
        let mut m = RampSource::new("stim", 1.0, 2.0);
        m.initialize(10.0).unwrap();
        assert_eq!(m.get_value("y").unwrap(), Value::Real(1.0));
        m.step(10.0, 0.5).unwrap();
        assert_eq!(m.get_value("y").unwrap(), Value::Real(2.0));
    }

    #[test]
    fn has_no_inputs() {
        let mut m = RampSource::new("stim", 0.0, 1.0);
        assert!(matches!(
            m.set_value("y", Value::Real(0.0)),
            Err(BackendError::UnknownVariable { .. })
        ));
    }
}
