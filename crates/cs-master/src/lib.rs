//! cs-master: the co-simulation master algorithm for costep.
//!
//! A [`Master`] coordinates the joint, stepwise execution of independently
//! simulated components that exchange typed signals through ports. It owns
//! every component exclusively, decides when each one advances, resolves
//! direct couplings to a consistent fixed point at every communication
//! instant, and dispatches one-shot condition/handler events.
//!
//! The master simulates nothing itself: components are opaque
//! [`ModelInstance`](cs_backend::ModelInstance)s behind the cs-backend
//! traits. The surrounding host engine owns wall-clock time; it calls
//! [`Master::advance`] with a monotonic "now" and treats the returned
//! next-wake-up time as advisory. All master calls must be serialized by the
//! host, which Rust enforces here through `&mut` access.
//!
//! # Example
//!
//! ```no_run
//! use cs_backend::ModelDescriptor;
//! use cs_core::Value;
//! use cs_master::{Master, MasterOptions};
//! use cs_models::{GainModel, ModelCatalog};
//!
//! let mut catalog = ModelCatalog::new();
//! catalog.register("demo:gain", |d| Ok(Box::new(GainModel::new(d.name.as_str(), 2.0))));
//!
//! let mut master = Master::new(Box::new(catalog), MasterOptions::default()).unwrap();
//! let p = master.add_component(ModelDescriptor::fixed_step("demo:gain", "p")).unwrap();
//! let q = master.add_component(ModelDescriptor::fixed_step("demo:gain", "q")).unwrap();
//! master.connect(&master.port(p, "y").unwrap(), &master.port(q, "u").unwrap()).unwrap();
//! master.freeze().unwrap();
//!
//! master.set(&master.port(p, "u").unwrap(), Value::Real(5.0)).unwrap();
//! let next = master.advance(1.0).unwrap();
//! # let _ = next;
//! ```

pub mod error;
pub mod master;

// Internal modules
mod component;
mod coupling;
mod events;
mod relax;

// Re-exports for public API
pub use coupling::DriverFn;
pub use error::{MasterError, MasterResult};
pub use events::{EventCondition, EventHandler};
pub use master::{Master, MasterOptions};
