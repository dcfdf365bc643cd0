//! cs-trace: port-trace observer and run storage for costep.
//!
//! Tracing is an optional observer layered on the master's public get
//! surface, never part of the coordination contract: a [`TraceRecorder`]
//! samples a fixed port selection at chosen instants, and a [`RunStore`]
//! persists the sampled series (manifest + JSONL) with content-hashed run
//! IDs and exports CSV.

pub mod hash;
pub mod recorder;
pub mod store;
pub mod types;

pub use hash::compute_run_id;
pub use recorder::TraceRecorder;
pub use store::RunStore;
pub use types::*;

pub type TraceResult<T> = Result<T, TraceError>;

#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Master error: {0}")]
    Master(#[from] cs_master::MasterError),
}
