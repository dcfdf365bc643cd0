//! Integration test: predictive components and clamped stepping.
//!
//! A predictive component reports its next internal discontinuity; the
//! master must clamp its sub-intervals so the component is never stepped
//! past that time unresolved, must resolve the jump exactly at it, and must
//! honor re-predicted times that differ from earlier ones.

use std::cell::RefCell;
use std::rc::Rc;

use cs_backend::{BackendError, BackendResult, ModelDescriptor, ModelInstance};
use cs_core::{Value, ValueKind};
use cs_master::{Master, MasterOptions};
use cs_models::{CyclingRelay, FirstOrderLag, ModelCatalog};

/// Predictive model with an irregular, finite schedule of jumps.
///
/// Records every resolution instant and, like a strict backend, refuses any
/// step that would cross the next scheduled jump.
struct ScheduledJumps {
    name: String,
    times: Vec<f64>,
    idx: usize,
    resolved: Rc<RefCell<Vec<f64>>>,
}

impl ModelInstance for ScheduledJumps {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, _start_time: f64) -> BackendResult<()> {
        Ok(())
    }

    fn variable_kind(&self, variable: &str) -> BackendResult<ValueKind> {
        match variable {
            "count" => Ok(ValueKind::Integer),
            other => Err(BackendError::UnknownVariable {
                variable: other.to_string(),
            }),
        }
    }

    fn get_value(&self, variable: &str) -> BackendResult<Value> {
        match variable {
            "count" => Ok(Value::Integer(self.idx as i64)),
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

    fn step(&mut self, from_time: f64, dt: f64) -> BackendResult<()> {
        if let Some(&next) = self.times.get(self.idx) {
            if from_time + dt > next + 1e-9 {
                return Err(BackendError::Step {
                    from: from_time,
                    dt,
                    reason: format!("step crosses scheduled jump at t = {next}"),
                });
            }
        }
        Ok(())
    }

    fn predicted_event_time(&self) -> Option<f64> {
        self.times.get(self.idx).copied()
    }

    fn resolve_event(&mut self, time: f64) -> BackendResult<Option<f64>> {
        self.resolved.borrow_mut().push(time);
        self.idx += 1;
        Ok(self.times.get(self.idx).copied())
    }
}

#[test]
fn irregular_jump_schedule_is_honored_exactly() {
    let resolved = Rc::new(RefCell::new(Vec::new()));
    let resolved_for_factory = resolved.clone();

    let mut catalog = ModelCatalog::new();
    catalog.register("demo:jumps", move |d| {
        Ok(Box::new(ScheduledJumps {
            name: d.name.clone(),
            times: vec![1.0, 1.5, 4.0],
            idx: 0,
            resolved: resolved_for_factory.clone(),
        }))
    });

    let options = MasterOptions {
        communication_step: 2.0,
        ..MasterOptions::default()
    };
    let mut master = Master::new(Box::new(catalog), options).unwrap();
    let jumps = master
        .add_component(ModelDescriptor::predictive("demo:jumps", "jumps"))
        .unwrap();
    master.freeze().unwrap();

    // One call across the whole schedule; the model itself fails any step
    // that overshoots, so reaching the target proves the clamping.
    let hint = master.advance(5.0).unwrap();

    assert_eq!(*resolved.borrow(), vec![1.0, 1.5, 4.0]);
    let count = master.port(jumps, "count").unwrap();
    assert_eq!(master.get(&count).unwrap(), Value::Integer(3));

    // Schedule exhausted, no pending events: no scheduling preference.
    assert_eq!(hint, None);
}

#[test]
fn relay_drives_plant_without_overshooting_switches() {
    let mut catalog = ModelCatalog::new();
    catalog.register("demo:relay", |d| {
        Ok(Box::new(CyclingRelay::new(d.name.as_str(), 3.0, 10.0)))
    });
    catalog.register("demo:lag", |d| {
        Ok(Box::new(FirstOrderLag::new(d.name.as_str(), 5.0)))
    });

    let options = MasterOptions {
        communication_step: 2.0,
        ..MasterOptions::default()
    };
    let mut master = Master::new(Box::new(catalog), options).unwrap();

    let relay = master
        .add_component(ModelDescriptor::predictive("demo:relay", "relay"))
        .unwrap();
    let plant = master
        .add_component(ModelDescriptor::fixed_step("demo:lag", "plant"))
        .unwrap();

    let relay_q = master.port(relay, "q").unwrap();
    let plant_u = master.port(plant, "u").unwrap();
    master.connect(&relay_q, &plant_u).unwrap();
    master.freeze().unwrap();

    // Switches at t = 3 (on), 6 (off), 9 (on); the relay refuses any step
    // across them, so a clean advance is itself the clamping proof.
    let hint = master.advance(10.0).unwrap();

    let relay_on = master.port(relay, "on").unwrap();
    assert_eq!(master.get(&relay_on).unwrap(), Value::Boolean(true));
    assert_eq!(master.get(&relay_q).unwrap(), Value::Real(10.0));

    // Heat flowed during [3, 6] and [9, 10]; the plant state moved.
    let plant_x = master.port(plant, "x").unwrap();
    let x = master.get(&plant_x).unwrap().as_real().unwrap();
    assert!(x > 0.0, "plant never saw the relay output, x = {x}");

    // Next wake-up: the relay's re-predicted switch at t = 12.
    assert_eq!(hint, Some(12.0));
}

#[test]
fn nearer_predicted_event_lowers_the_wake_hint() {
    let mut catalog = ModelCatalog::new();
    catalog.register("demo:relay", |d| {
        Ok(Box::new(CyclingRelay::new(d.name.as_str(), 3.0, 1.0)))
    });

    let options = MasterOptions {
        communication_step: 2.5,
        ..MasterOptions::default()
    };
    let mut master = Master::new(Box::new(catalog), options).unwrap();
    master
        .add_component(ModelDescriptor::predictive("demo:relay", "relay"))
        .unwrap();
    master.freeze().unwrap();

    // Pending event would ask for t = 1.0 + 2.5; the relay's switch at
    // t = 3.0 is nearer and wins.
    master
        .register_event(|_m| Ok(false), |_m| Ok(()))
        .unwrap();
    let hint = master.advance(1.0).unwrap();
    assert_eq!(hint, Some(3.0));
}
