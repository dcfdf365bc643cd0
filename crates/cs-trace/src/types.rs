//! Trace data types.

use cs_core::{Value, ValueKind};
use serde::{Deserialize, Serialize};

pub type RunId = String;

/// Everything needed to interpret a stored series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceManifest {
    pub run_id: RunId,
    /// Caller-chosen scenario identity, used for listing.
    pub scenario_id: String,
    /// RFC 3339 creation timestamp.
    pub timestamp: String,
    pub communication_step: f64,
    pub columns: Vec<TraceColumn>,
}

impl TraceManifest {
    /// Build a manifest stamped with the current wall-clock time.
    pub fn new(
        run_id: RunId,
        scenario_id: impl Into<String>,
        communication_step: f64,
        columns: Vec<TraceColumn>,
    ) -> Self {
        Self {
            run_id,
            scenario_id: scenario_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            communication_step,
            columns,
        }
    }
}

/// One traced port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceColumn {
    /// Human-readable column label, `component.variable`.
    pub label: String,
    pub component: String,
    pub variable: String,
    pub kind: ValueKind,
}

/// One sampled instant: the traced ports' values at `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub time: f64,
    pub values: Vec<Value>,
}
