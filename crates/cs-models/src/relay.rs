//! Predictive relay with self-reported switching times.

use cs_backend::{BackendError, BackendResult, ModelInstance, expect_kind};
use cs_core::{Value, ValueKind};

const TIME_SLACK: f64 = 1e-9;

/// Relay that toggles on a fixed period and reports every toggle as a
/// predicted discontinuity.
///
/// Stand-in for a model-exchange slave: the master must never step it across
/// a reported switching time without resolving the switch first, and the
/// model enforces that contract by failing the offending step.
///
/// Variables: output `q` (real, `amplitude` while on and enabled, else 0),
/// output `on` (boolean), input `enable` (boolean, defaults to true).
#[derive(Debug, Clone)]
pub struct CyclingRelay {
    name: String,
    /// Time between toggles, in seconds.
    pub period: f64,
    /// Output level while on.
    pub amplitude: f64,
    t: f64,
    on: bool,
    enabled: bool,
    next_toggle: f64,
}

impl CyclingRelay {
    /// Create a relay that starts off and toggles every `period` seconds.
    pub fn new(name: impl Into<String>, period: f64, amplitude: f64) -> Self {
        Self {
            name: name.into(),
            period,
            amplitude,
            t: 0.0,
            on: false,
            enabled: true,
            next_toggle: 0.0,
        }
    }

    fn q(&self) -> f64 {
        if self.on && self.enabled {
            self.amplitude
        } else {
            0.0
        }
    }
}

impl ModelInstance for CyclingRelay {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, start_time: f64) -> BackendResult<()> {
        if !(self.period > 0.0) {
            return Err(BackendError::Init {
                start_time,
                reason: format!("period must be positive, got {}", self.period),
            });
        }
        self.t = start_time;
        self.next_toggle = start_time + self.period;
        Ok(())
    }

    fn variable_kind(&self, variable: &str) -> BackendResult<ValueKind> {
        match variable {
            "q" => Ok(ValueKind::Real),
            "on" | "enable" => Ok(ValueKind::Boolean),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn get_value(&self, variable: &str) -> BackendResult<Value> {
        match variable {
            "q" => Ok(Value::Real(self.q())),
            "on" => Ok(Value::Boolean(self.on)),
            "enable" => Ok(Value::Boolean(self.enabled)),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn set_value(&mut self, variable: &str, value: Value) -> BackendResult<()> {
        match variable {
            "enable" => {
                expect_kind("enable", ValueKind::Boolean, &value)?;
                if let Value::Boolean(v) = value {
                    self.enabled = v;
                }
                Ok(())
            }
            "q" | "on" => Err(BackendError::Model {
                reason: format!("'{variable}' is an output"),
            }),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn step(&mut self, from_time: f64, dt: f64) -> BackendResult<()> {
        // A step across the scheduled switch means the master ignored the
        // predicted event time; refuse rather than silently smear the jump.
        if from_time + dt > self.next_toggle + TIME_SLACK {
            return Err(BackendError::Step {
                from: from_time,
                dt,
                reason: format!("step crosses scheduled switch at t = {}", self.next_toggle),
            });
        }
        self.t = from_time + dt;
        Ok(())
    }

    fn predicted_event_time(&self) -> Option<f64> {
        Some(self.next_toggle)
    }

    fn resolve_event(&mut self, time: f64) -> BackendResult<Option<f64>> {
        self.on = !self.on;
        self.next_toggle = time + self.period;
        Ok(Some(self.next_toggle))
    }
}
