//! Component wrappers and the component table.

use cs_backend::{BackendResult, ModelDescriptor, ModelInstance, SteppingScheme};
use cs_core::{ComponentId, Value, ValueKind};

/// One registered component: a model instance plus the master-side state
/// needed to schedule it.
///
/// Exclusively owned by the master; nothing else may alias the instance once
/// registered. Predictive components additionally carry the time of their
/// next self-reported discontinuity, refreshed after every input write, step
/// or event resolution.
pub(crate) struct Component {
    name: String,
    scheme: SteppingScheme,
    iterate_after_set: bool,
    local_time: f64,
    next_event: Option<f64>,
    instance: Box<dyn ModelInstance>,
}

impl Component {
    /// Wrap an already-initialized instance.
    pub fn new(
        descriptor: &ModelDescriptor,
        instance: Box<dyn ModelInstance>,
        start_time: f64,
    ) -> Self {
        let next_event = match descriptor.scheme {
            SteppingScheme::FixedStep => None,
            SteppingScheme::Predictive => instance.predicted_event_time(),
        };
        Self {
            name: descriptor.name.clone(),
            scheme: descriptor.scheme,
            iterate_after_set: descriptor.iterate_after_set,
            local_time: start_time,
            next_event,
            instance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Predicted next discontinuity, `None` for fixed-step components.
    pub fn next_event(&self) -> Option<f64> {
        self.next_event
    }

    pub fn variable_kind(&self, variable: &str) -> BackendResult<ValueKind> {
        self.instance.variable_kind(variable)
    }

    pub fn get_value(&self, variable: &str) -> BackendResult<Value> {
        self.instance.get_value(variable)
    }

    /// Write an input variable.
    ///
    /// If the component was created with iterate-after-set, the model
    /// re-evaluates its outputs at zero time advance so readers (and the
    /// relaxation solver) observe the write immediately.
    pub fn write_input(&mut self, variable: &str, value: Value) -> BackendResult<()> {
        self.instance.set_value(variable, value)?;
        if self.iterate_after_set {
            self.instance.step(self.local_time, 0.0)?;
        }
        self.refresh_prediction();
        Ok(())
    }

    /// Advance the instance from `from` by `dt` and track its local time.
    pub fn step(&mut self, from: f64, dt: f64) -> BackendResult<()> {
        self.instance.step(from, dt)?;
        self.local_time = from + dt;
        self.refresh_prediction();
        Ok(())
    }

    /// Jump across the discontinuity at `time` and adopt the re-predicted
    /// next event time, which may differ from any earlier prediction.
    pub fn resolve_event(&mut self, time: f64) -> BackendResult<()> {
        self.next_event = self.instance.resolve_event(time)?;
        Ok(())
    }

    fn refresh_prediction(&mut self) {
        if self.scheme == SteppingScheme::Predictive {
            self.next_event = self.instance.predicted_event_time();
        }
    }
}

/// The master's component table, indexed by [`ComponentId`] registration
/// order.
#[derive(Default)]
pub(crate) struct ComponentTable {
    components: Vec<Component>,
}

impl ComponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an initialized instance and return its id.
    pub fn insert(
        &mut self,
        descriptor: &ModelDescriptor,
        instance: Box<dyn ModelInstance>,
        start_time: f64,
    ) -> ComponentId {
        let id = ComponentId::from_index(self.components.len() as u32);
        self.components
            .push(Component::new(descriptor, instance, start_time));
        id
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.index() as usize)
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id.index() as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }
}
