//! cs-models: analytic demo models for costep.
//!
//! Small, self-contained [`ModelInstance`](cs_backend::ModelInstance)
//! implementations used by the integration tests and the demo CLI. Each one
//! stands in for a real model-execution backend:
//! - [`GainModel`]: memoryless y = k * u
//! - [`FirstOrderLag`]: one internal state, integrated by the model itself
//! - [`RampSource`]: time-driven source with no inputs
//! - [`CyclingRelay`]: predictive model with self-reported switching times
//!
//! [`ModelCatalog`] maps descriptor URIs to factories, playing the role of
//! the backend's model manager.

pub mod catalog;
pub mod gain;
pub mod lag;
pub mod relay;
pub mod source;

// Re-exports for ergonomics
pub use catalog::ModelCatalog;
pub use gain::GainModel;
pub use lag::FirstOrderLag;
pub use relay::CyclingRelay;
pub use source::RampSource;
