//! cs-core: stable foundation for costep.
//!
//! Contains:
//! - value (typed signal values exchanged through ports)
//! - port (typed, named component variables with structural identity)
//! - ids (stable compact IDs for registered components)
//! - numeric (time tolerances + float helpers)
//! - timing (env-gated wall-clock timers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod port;
pub mod timing;
pub mod value;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CsError, CsResult};
pub use ids::ComponentId;
pub use numeric::*;
pub use port::Port;
pub use value::{Value, ValueKind};
