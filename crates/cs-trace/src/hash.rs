//! Content-based hashing for run IDs.
//!
//! Two runs over the same component set, communication step and master
//! version get the same ID, so re-running an unchanged scenario lands on the
//! same store entry.

use cs_backend::ModelDescriptor;
use sha2::{Digest, Sha256};

pub fn compute_run_id(
    descriptors: &[ModelDescriptor],
    communication_step: f64,
    master_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let descriptors_json = serde_json::to_string(descriptors).unwrap_or_default();
    hasher.update(descriptors_json.as_bytes());

    hasher.update(communication_step.to_le_bytes());
    hasher.update(master_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
