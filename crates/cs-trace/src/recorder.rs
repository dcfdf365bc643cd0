//! Port-selection recorder.

use cs_core::Port;
use cs_master::Master;

use crate::TraceResult;
use crate::types::{TraceColumn, TraceRecord};

/// Samples a fixed selection of ports at caller-chosen instants.
///
/// Pure observer: reads exclusively through [`Master::get`] and never mutates
/// the coordinated system. The usual pattern is one
/// [`sample`](TraceRecorder::sample) after freeze and one after every
/// `advance`.
pub struct TraceRecorder {
    ports: Vec<Port>,
    columns: Vec<TraceColumn>,
    records: Vec<TraceRecord>,
}

impl TraceRecorder {
    /// Build a recorder over a port selection, resolving column labels
    /// against the master's component table.
    pub fn over_ports(master: &Master, ports: Vec<Port>) -> TraceResult<Self> {
        let mut columns = Vec::with_capacity(ports.len());
        for port in &ports {
            let component = master.component_name(port.component())?.to_string();
            columns.push(TraceColumn {
                label: format!("{}.{}", component, port.variable()),
                component,
                variable: port.variable().to_string(),
                kind: port.kind(),
            });
        }
        Ok(Self {
            ports,
            columns,
            records: Vec::new(),
        })
    }

    /// Append one record with the ports' current values.
    pub fn sample(&mut self, master: &Master) -> TraceResult<()> {
        let mut values = Vec::with_capacity(self.ports.len());
        for port in &self.ports {
            values.push(master.get(port)?);
        }
        self.records.push(TraceRecord {
            time: master.current_time(),
            values,
        });
        Ok(())
    }

    pub fn columns(&self) -> &[TraceColumn] {
        &self.columns
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the recorder, keeping only the sampled series.
    pub fn into_parts(self) -> (Vec<TraceColumn>, Vec<TraceRecord>) {
        (self.columns, self.records)
    }
}
