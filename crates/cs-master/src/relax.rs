//! Relaxation solver: explicit Gauss–Seidel coupling resolution.

use std::collections::HashMap;

use cs_core::{Port, Value};
use tracing::trace;

use crate::component::ComponentTable;
use crate::coupling::Coupling;
use crate::error::{MasterError, MasterResult, backend_to_master};

/// Last output value observed per source port, used to detect "no change"
/// convergence across sweeps and across whole advance calls.
#[derive(Default)]
pub(crate) struct ValueCache {
    last: HashMap<Port, Value>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn unchanged(&self, source: &Port, value: &Value) -> bool {
        self.last.get(source) == Some(value)
    }

    fn record(&mut self, source: &Port, value: Value) {
        self.last.insert(source.clone(), value);
    }
}

/// Resolve the coupling set at the current instant.
///
/// Sweeps all couplings in registration order, feeding each source's output
/// to its destination whenever the output differs from the cached last
/// observation (or unconditionally on the first sweep when
/// `force_first_pass` is set). Termination is value-based: the loop stops
/// exactly when a full sweep produces no change. Mutually coupled components
/// each see one stale read during the sweep in which the other changes,
/// corrected on the following sweep.
///
/// A coupling graph that keeps oscillating would never settle, so the sweep
/// count is capped; hitting the cap raises
/// [`MasterError::NotConverged`] instead of looping forever.
///
/// Returns the number of sweeps performed (including the final no-change
/// sweep).
pub(crate) fn solve_couplings(
    components: &mut ComponentTable,
    couplings: &[Coupling],
    cache: &mut ValueCache,
    force_first_pass: bool,
    max_sweeps: usize,
) -> MasterResult<usize> {
    let mut first = force_first_pass;
    let mut sweeps = 0;
    let mut changed = true;

    while changed {
        if sweeps == max_sweeps {
            return Err(MasterError::NotConverged { sweeps });
        }
        sweeps += 1;
        changed = false;

        for coupling in couplings {
            let source = components
                .get(coupling.source.component())
                .ok_or_else(|| MasterError::UnknownPort {
                    port: coupling.source.to_string(),
                })?;
            let value = source
                .get_value(coupling.source.variable())
                .map_err(|e| backend_to_master(&coupling.source, source.name(), e))?;

            if first || !cache.unchanged(&coupling.source, &value) {
                let destination = components
                    .get_mut(coupling.destination.component())
                    .ok_or_else(|| MasterError::UnknownPort {
                        port: coupling.destination.to_string(),
                    })?;
                destination
                    .write_input(coupling.destination.variable(), value.clone())
                    .map_err(|e| backend_to_master(&coupling.destination, destination.name(), e))?;
                cache.record(&coupling.source, value);
                changed = true;
            }
        }
        first = false;
    }

    trace!(sweeps, "couplings settled");
    Ok(sweeps)
}
