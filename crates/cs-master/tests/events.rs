//! Integration test: one-shot event semantics.
//!
//! Covers synchronous firing of already-true conditions, firing during a
//! set's propagation pass, one-shot removal, the snapshot-then-apply sweep
//! policy, clear-all, and the wake-up hint for pending events.

use std::cell::RefCell;
use std::rc::Rc;

use cs_backend::ModelDescriptor;
use cs_core::Value;
use cs_master::{Master, MasterError, MasterOptions};
use cs_models::{GainModel, ModelCatalog};

fn gain_master(communication_step: f64) -> Master {
    let mut catalog = ModelCatalog::new();
    catalog.register("demo:gain-2x", |d| Ok(Box::new(GainModel::new(d.name.as_str(), 2.0))));
    let options = MasterOptions {
        communication_step,
        ..MasterOptions::default()
    };
    Master::new(Box::new(catalog), options).unwrap()
}

#[test]
fn already_true_condition_fires_synchronously() {
    let mut master = gain_master(0.5);
    master
        .add_component(ModelDescriptor::fixed_step("demo:gain-2x", "p"))
        .unwrap();
    master.freeze().unwrap();

    let fired = Rc::new(RefCell::new(0));
    let fired_in_handler = fired.clone();
    master
        .register_event(
            |_m| Ok(true),
            move |_m| {
                *fired_in_handler.borrow_mut() += 1;
                Ok(())
            },
        )
        .unwrap();

    assert_eq!(*fired.borrow(), 1);
    assert_eq!(master.pending_events(), 0);
}

#[test]
fn event_fires_during_the_triggering_set() {
    let mut master = gain_master(0.5);
    let p = master
        .add_component(ModelDescriptor::fixed_step("demo:gain-2x", "p"))
        .unwrap();
    let p_u = master.port(p, "u").unwrap();
    let p_y = master.port(p, "y").unwrap();
    master.freeze().unwrap();

    let fired = Rc::new(RefCell::new(0));
    let fired_in_handler = fired.clone();
    let watched = p_y.clone();
    master
        .register_event(
            move |m| Ok(m.get(&watched)?.as_real().unwrap_or(0.0) > 5.0),
            move |_m| {
                *fired_in_handler.borrow_mut() += 1;
                Ok(())
            },
        )
        .unwrap();
    assert_eq!(master.pending_events(), 1);
    assert_eq!(*fired.borrow(), 0);

    // Below threshold: condition stays false, entry stays registered.
    master.set(&p_u, Value::Real(1.0)).unwrap();
    assert_eq!(*fired.borrow(), 0);
    assert_eq!(master.pending_events(), 1);

    // Crossing the threshold fires during this set's event pass, once.
    master.set(&p_u, Value::Real(4.0)).unwrap();
    assert_eq!(*fired.borrow(), 1);
    assert_eq!(master.pending_events(), 0);

    // One-shot: staying above the threshold does not re-fire.
    master.set(&p_u, Value::Real(6.0)).unwrap();
    assert_eq!(*fired.borrow(), 1);
}

#[test]
fn entries_registered_by_handlers_wait_for_the_next_sweep() {
    let mut master = gain_master(0.5);
    let p = master
        .add_component(ModelDescriptor::fixed_step("demo:gain-2x", "p"))
        .unwrap();
    let p_u = master.port(p, "u").unwrap();
    let p_y = master.port(p, "y").unwrap();
    master.freeze().unwrap();

    let late_flag = Rc::new(RefCell::new(false));
    let late_fired = Rc::new(RefCell::new(0));

    // First entry: once triggered, registers a follow-up gated on
    // `late_flag`, which the second entry's handler raises later in the
    // same sweep. Under the snapshot policy the follow-up must not fire
    // until the next sweep even though its condition is true by the end of
    // this one.
    let flag_for_cond = late_flag.clone();
    let late_fired_in_handler = late_fired.clone();
    let watched = p_y.clone();
    master
        .register_event(
            move |m| Ok(m.get(&watched)?.as_real().unwrap_or(0.0) > 5.0),
            move |m| {
                let flag = flag_for_cond.clone();
                let counter = late_fired_in_handler.clone();
                m.register_event(
                    move |_m| Ok(*flag.borrow()),
                    move |_m| {
                        *counter.borrow_mut() += 1;
                        Ok(())
                    },
                )
            },
        )
        .unwrap();

    let flag_for_second = late_flag.clone();
    let watched = p_y.clone();
    master
        .register_event(
            move |m| Ok(m.get(&watched)?.as_real().unwrap_or(0.0) > 5.0),
            move |_m| {
                *flag_for_second.borrow_mut() = true;
                Ok(())
            },
        )
        .unwrap();
    assert_eq!(master.pending_events(), 2);

    // Trigger both original entries in one sweep. The follow-up registered
    // by the first handler stays pending, its condition unevaluated.
    master.set(&p_u, Value::Real(4.0)).unwrap();
    assert!(*late_flag.borrow());
    assert_eq!(*late_fired.borrow(), 0);
    assert_eq!(master.pending_events(), 1);

    // The follow-up fires on the next value-change sweep.
    master.set(&p_u, Value::Real(4.5)).unwrap();
    assert_eq!(*late_fired.borrow(), 1);
    assert_eq!(master.pending_events(), 0);
}

#[test]
fn clear_events_empties_the_registry() {
    let mut master = gain_master(0.5);
    let p = master
        .add_component(ModelDescriptor::fixed_step("demo:gain-2x", "p"))
        .unwrap();
    let p_u = master.port(p, "u").unwrap();
    master.freeze().unwrap();

    master
        .register_event(|_m| Ok(false), |_m| Ok(()))
        .unwrap();
    master
        .register_event(|_m| Ok(false), |_m| Ok(()))
        .unwrap();
    assert_eq!(master.pending_events(), 2);

    master.clear_events();
    assert_eq!(master.pending_events(), 0);
    master.set(&p_u, Value::Real(1.0)).unwrap();
}

#[test]
fn condition_errors_propagate_out_of_the_sweep() {
    let mut master = gain_master(0.5);
    let p = master
        .add_component(ModelDescriptor::fixed_step("demo:gain-2x", "p"))
        .unwrap();
    let p_u = master.port(p, "u").unwrap();
    master.freeze().unwrap();

    let mut first_call = true;
    master
        .register_event(
            move |_m| {
                if first_call {
                    first_call = false;
                    Ok(false)
                } else {
                    Err(MasterError::InvalidOptions {
                        what: "probe condition failure",
                    })
                }
            },
            |_m| Ok(()),
        )
        .unwrap();

    let err = master.set(&p_u, Value::Real(1.0)).unwrap_err();
    assert!(matches!(err, MasterError::InvalidOptions { .. }));
}

#[test]
fn pending_events_request_a_wake_up() {
    let mut master = gain_master(0.5);
    let p = master
        .add_component(ModelDescriptor::fixed_step("demo:gain-2x", "p"))
        .unwrap();
    let p_y = master.port(p, "y").unwrap();
    master.freeze().unwrap();

    let watched = p_y.clone();
    master
        .register_event(
            move |m| Ok(m.get(&watched)?.as_real().unwrap_or(0.0) > 100.0),
            |_m| Ok(()),
        )
        .unwrap();

    // Pending event: wake me one communication step after the target.
    assert_eq!(master.advance(1.0).unwrap(), Some(1.5));

    // Registry drained: no scheduling preference.
    master.clear_events();
    assert_eq!(master.advance(2.0).unwrap(), None);
}
