//! The co-simulation master: public API and time advancement.

use cs_backend::{BackendError, ModelDescriptor, ModelLoader};
use cs_core::{
    ComponentId, Port, Tolerances, Value, ensure_finite, ensure_positive, nearly_equal,
};
use tracing::{debug, trace};

use crate::component::ComponentTable;
use crate::coupling::CouplingTable;
use crate::error::{MasterError, MasterResult, backend_to_master};
use crate::events::{EventEntry, EventRegistry};
use crate::relax::{ValueCache, solve_couplings};

/// Options for a master instance.
#[derive(Clone, Debug)]
pub struct MasterOptions {
    /// Simulation time the master (and every component) starts at.
    pub start_time: f64,
    /// Default communication step between coupled components (seconds).
    pub communication_step: f64,
    /// Relaxation sweep cap; a coupling graph still changing after this many
    /// sweeps is treated as non-convergent.
    pub max_relaxation_sweeps: usize,
    /// Tolerance used for all time comparisons in the stepping loop.
    pub tolerances: Tolerances,
}

impl Default for MasterOptions {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            communication_step: 1e-3,
            max_relaxation_sweeps: 100,
            tolerances: Tolerances::default(),
        }
    }
}

impl MasterOptions {
    fn validate(&self) -> MasterResult<()> {
        ensure_finite(self.start_time, "start_time")?;
        ensure_positive(self.communication_step, "communication_step")?;
        if self.max_relaxation_sweeps == 0 {
            return Err(MasterError::InvalidOptions {
                what: "max_relaxation_sweeps must be positive",
            });
        }
        Ok(())
    }
}

/// The co-simulation master.
///
/// Owns the component table, the coupling/driver routing, the relaxation
/// cache and the event registry. Construction is explicit and the value is
/// explicitly owned by its caller; there is no ambient global instance.
///
/// Lifecycle: create, [`add_component`](Master::add_component) /
/// [`connect`](Master::connect) / [`bind_external_driver`](Master::bind_external_driver)
/// while unfrozen, then [`freeze`](Master::freeze) once, then any number of
/// [`set`](Master::set) / [`get`](Master::get) / [`advance`](Master::advance)
/// calls, serialized by the host.
pub struct Master {
    options: MasterOptions,
    loader: Box<dyn ModelLoader>,
    components: ComponentTable,
    couplings: CouplingTable,
    events: EventRegistry,
    cache: ValueCache,
    current_time: f64,
    frozen: bool,
}

impl Master {
    /// Create a master over a model-execution backend.
    pub fn new(loader: Box<dyn ModelLoader>, options: MasterOptions) -> MasterResult<Self> {
        options.validate()?;
        Ok(Self {
            current_time: options.start_time,
            options,
            loader,
            components: ComponentTable::new(),
            couplings: CouplingTable::new(),
            events: EventRegistry::new(),
            cache: ValueCache::new(),
            frozen: false,
        })
    }

    /// Current simulation time.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Whether the topology is frozen (the run has started).
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The options this master was created with.
    pub fn options(&self) -> &MasterOptions {
        &self.options
    }

    /// Number of registered components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Name of a registered component.
    pub fn component_name(&self, component: ComponentId) -> MasterResult<&str> {
        self.components
            .get(component)
            .map(|c| c.name())
            .ok_or(MasterError::UnknownComponent { component })
    }

    /// Number of declared couplings.
    pub fn coupling_count(&self) -> usize {
        self.couplings.coupling_count()
    }

    /// Number of bound external drivers.
    pub fn driver_count(&self) -> usize {
        self.couplings.driver_count()
    }

    /// Number of event entries still pending.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Load and initialize one component at the current time.
    pub fn add_component(&mut self, descriptor: ModelDescriptor) -> MasterResult<ComponentId> {
        if self.frozen {
            return Err(MasterError::Frozen);
        }
        let mut instance = self.loader.load(&descriptor).map_err(|e| MasterError::Load {
            name: descriptor.name.clone(),
            source: e,
        })?;
        instance
            .initialize(self.current_time)
            .map_err(|e| MasterError::Init {
                name: descriptor.name.clone(),
                source: e,
            })?;
        let id = self
            .components
            .insert(&descriptor, instance, self.current_time);
        debug!(component = %descriptor.name, id = %id, "component registered");
        Ok(id)
    }

    /// Build a validated port handle for a component variable.
    pub fn port(&self, component: ComponentId, variable: &str) -> MasterResult<Port> {
        let comp = self
            .components
            .get(component)
            .ok_or(MasterError::UnknownComponent { component })?;
        let kind = comp.variable_kind(variable).map_err(|e| match e {
            BackendError::UnknownVariable { .. } => MasterError::UnknownPort {
                port: format!("{component}:{variable}"),
            },
            other => MasterError::Backend {
                component: comp.name().to_string(),
                source: other,
            },
        })?;
        Ok(Port::new(component, variable, kind))
    }

    /// Declare a coupling: feed `source`'s output into `destination`.
    pub fn connect(&mut self, source: &Port, destination: &Port) -> MasterResult<()> {
        if self.frozen {
            return Err(MasterError::Frozen);
        }
        let source = self.revalidate(source)?;
        let destination = self.revalidate(destination)?;
        if source.kind() != destination.kind() {
            return Err(MasterError::TypeMismatch {
                port: destination.to_string(),
                expected: source.kind(),
                actual: destination.kind(),
            });
        }
        if self.couplings.is_bound(&destination) {
            return Err(MasterError::AlreadyBound {
                port: destination.to_string(),
            });
        }
        debug!(source = %source, destination = %destination, "coupling declared");
        self.couplings.insert_coupling(source, destination);
        Ok(())
    }

    /// Bind an external stimulus generator to an input port.
    ///
    /// The generator's value kind is checked against the port on every
    /// driver pass, since the closure's output cannot be inspected here.
    pub fn bind_external_driver<F>(&mut self, destination: &Port, generate: F) -> MasterResult<()>
    where
        F: FnMut() -> Value + 'static,
    {
        if self.frozen {
            return Err(MasterError::Frozen);
        }
        let destination = self.revalidate(destination)?;
        if self.couplings.is_bound(&destination) {
            return Err(MasterError::AlreadyBound {
                port: destination.to_string(),
            });
        }
        debug!(destination = %destination, "external driver bound");
        self.couplings.insert_driver(destination, Box::new(generate));
        Ok(())
    }

    /// Read a port's current value.
    pub fn get(&self, port: &Port) -> MasterResult<Value> {
        let comp = self
            .components
            .get(port.component())
            .ok_or_else(|| MasterError::UnknownPort {
                port: port.to_string(),
            })?;
        comp.get_value(port.variable())
            .map_err(|e| backend_to_master(port, comp.name(), e))
    }

    /// Write an input port, then propagate: resolve couplings and sweep the
    /// event registry.
    pub fn set(&mut self, port: &Port, value: Value) -> MasterResult<()> {
        self.set_inner(port, value, true)
    }

    /// Write an input port without running the relaxation solver or the
    /// event registry afterwards.
    pub fn set_no_propagate(&mut self, port: &Port, value: Value) -> MasterResult<()> {
        self.set_inner(port, value, false)
    }

    fn set_inner(&mut self, port: &Port, value: Value, propagate: bool) -> MasterResult<()> {
        let port = self.revalidate(port)?;
        if value.kind() != port.kind() {
            return Err(MasterError::TypeMismatch {
                port: port.to_string(),
                expected: port.kind(),
                actual: value.kind(),
            });
        }
        if let Value::Real(v) = &value {
            ensure_finite(*v, "input value")?;
        }
        // Once running, a bound destination has exactly one producer; manual
        // writes before freeze stage initial values.
        if self.frozen && self.couplings.is_bound(&port) {
            return Err(MasterError::AlreadyBound {
                port: port.to_string(),
            });
        }
        let comp = self
            .components
            .get_mut(port.component())
            .ok_or_else(|| MasterError::UnknownPort {
                port: port.to_string(),
            })?;
        comp.write_input(port.variable(), value)
            .map_err(|e| backend_to_master(&port, comp.name(), e))?;
        if propagate {
            self.solve_all(false)?;
            self.sweep_events()?;
        }
        Ok(())
    }

    /// Register a one-shot event.
    ///
    /// If the condition is already true the handler runs synchronously and
    /// nothing is registered; otherwise the pair joins the registry and is
    /// evaluated after every value change until it fires.
    pub fn register_event<C, H>(&mut self, mut condition: C, mut handler: H) -> MasterResult<()>
    where
        C: FnMut(&Master) -> MasterResult<bool> + 'static,
        H: FnMut(&mut Master) -> MasterResult<()> + 'static,
    {
        if condition(self)? {
            debug!(t = self.current_time, "event condition already true, firing");
            handler(self)
        } else {
            self.events.push(EventEntry {
                condition: Box::new(condition),
                handler: Box::new(handler),
            });
            Ok(())
        }
    }

    /// Drop every pending event entry.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Transition to the running state.
    ///
    /// Performs one full external-driver pass, one forced relaxation pass
    /// and one event sweep, establishing a consistent state at the start
    /// time. Topology mutation fails with `Frozen` from here on.
    pub fn freeze(&mut self) -> MasterResult<()> {
        if self.frozen {
            return Err(MasterError::Frozen);
        }
        self.frozen = true;
        debug!(t = self.current_time, components = self.components.len(), "freezing topology");
        self.run_driver_pass()?;
        self.solve_all(true)?;
        self.sweep_events()
    }

    /// Advance the coordinated system to `target_time`.
    ///
    /// Steps all components in communication-step sub-intervals, clamped so
    /// that no predictive component is ever advanced past a discontinuity it
    /// reported without resolving it first. Returns the next time the
    /// master wants to be invoked, or `None` for "no preference".
    pub fn advance(&mut self, target_time: f64) -> MasterResult<Option<f64>> {
        if !self.frozen {
            return Err(MasterError::NotFrozen);
        }
        ensure_finite(target_time, "target time")?;
        let tol = self.options.tolerances;
        if target_time <= self.current_time
            || nearly_equal(target_time, self.current_time, tol)
        {
            return Err(MasterError::BadTarget {
                target: target_time,
                current: self.current_time,
            });
        }
        debug!(from = self.current_time, to = target_time, "advancing coupled components");

        while self.current_time < target_time
            && !nearly_equal(self.current_time, target_time, tol)
        {
            // Jump across any discontinuity scheduled for this instant
            // before choosing the next sub-interval.
            self.resolve_due_events()?;

            let mut dt = self
                .options
                .communication_step
                .min(target_time - self.current_time);
            if let Some(event_time) = self.earliest_predicted_event() {
                if event_time - self.current_time < dt {
                    dt = event_time - self.current_time;
                }
            }

            let from = self.current_time;
            self.step_all(from, dt)?;
            self.current_time = from + dt;
            trace!(t = self.current_time, dt, "sub-step complete");

            let at_target = nearly_equal(self.current_time, target_time, tol)
                || self.current_time >= target_time;
            if !at_target {
                // Downstream components must see this instant's values
                // before the next sub-interval is chosen.
                self.resolve_due_events()?;
                self.solve_all(true)?;
            }
        }
        self.current_time = target_time;

        self.resolve_due_events()?;
        self.run_driver_pass()?;
        self.solve_all(false)?;
        self.sweep_events()?;

        Ok(self.wake_hint())
    }

    /// Re-resolve a port against the live component table, picking up the
    /// authoritative value kind.
    fn revalidate(&self, port: &Port) -> MasterResult<Port> {
        let comp = self
            .components
            .get(port.component())
            .ok_or_else(|| MasterError::UnknownPort {
                port: port.to_string(),
            })?;
        let kind = comp
            .variable_kind(port.variable())
            .map_err(|e| backend_to_master(port, comp.name(), e))?;
        Ok(Port::new(port.component(), port.variable(), kind))
    }

    /// Earliest strictly-future predicted discontinuity, if any.
    fn earliest_predicted_event(&self) -> Option<f64> {
        let tol = self.options.tolerances;
        self.components
            .iter()
            .filter_map(|c| c.next_event())
            .filter(|&t| t > self.current_time && !nearly_equal(t, self.current_time, tol))
            .min_by(f64::total_cmp)
    }

    /// Resolve discontinuities whose predicted time is the current instant.
    fn resolve_due_events(&mut self) -> MasterResult<()> {
        let tol = self.options.tolerances;
        let now = self.current_time;
        for comp in self.components.iter_mut() {
            let due = match comp.next_event() {
                Some(t) => t <= now || nearly_equal(t, now, tol),
                None => false,
            };
            if due {
                debug!(component = comp.name(), t = now, "resolving predicted discontinuity");
                comp.resolve_event(now).map_err(|e| MasterError::Backend {
                    component: comp.name().to_string(),
                    source: e,
                })?;
            }
        }
        Ok(())
    }

    /// Step every component over `[from, from + dt]`.
    fn step_all(&mut self, from: f64, dt: f64) -> MasterResult<()> {
        for comp in self.components.iter_mut() {
            comp.step(from, dt).map_err(|e| MasterError::Step {
                component: comp.name().to_string(),
                from,
                to: from + dt,
                source: e,
            })?;
        }
        Ok(())
    }

    /// Pull every external driver once and write the produced values.
    fn run_driver_pass(&mut self) -> MasterResult<()> {
        for binding in self.couplings.drivers_mut() {
            let value = (binding.generate)();
            if value.kind() != binding.destination.kind() {
                return Err(MasterError::TypeMismatch {
                    port: binding.destination.to_string(),
                    expected: binding.destination.kind(),
                    actual: value.kind(),
                });
            }
            if let Value::Real(v) = &value {
                ensure_finite(*v, "driver value")?;
            }
            let comp = self
                .components
                .get_mut(binding.destination.component())
                .ok_or_else(|| MasterError::UnknownPort {
                    port: binding.destination.to_string(),
                })?;
            comp.write_input(binding.destination.variable(), value)
                .map_err(|e| backend_to_master(&binding.destination, comp.name(), e))?;
        }
        Ok(())
    }

    fn solve_all(&mut self, force_first_pass: bool) -> MasterResult<()> {
        solve_couplings(
            &mut self.components,
            self.couplings.couplings(),
            &mut self.cache,
            force_first_pass,
            self.options.max_relaxation_sweeps,
        )?;
        Ok(())
    }

    /// One snapshot-then-apply sweep over the event registry.
    ///
    /// Evaluates the entries registered before this sweep started, in
    /// registration order; fired entries are removed and their handlers run
    /// immediately. Entries registered by handlers during the sweep are kept
    /// for the next sweep, after the survivors.
    fn sweep_events(&mut self) -> MasterResult<()> {
        if self.events.is_empty() {
            return Ok(());
        }
        let snapshot = self.events.take();
        let mut survivors = Vec::with_capacity(snapshot.len());
        for mut entry in snapshot {
            if (entry.condition)(self)? {
                debug!(t = self.current_time, "event condition met, dispatching handler");
                (entry.handler)(self)?;
            } else {
                survivors.push(entry);
            }
        }
        self.events.restore(survivors);
        Ok(())
    }

    /// Next time the master wants to be invoked.
    fn wake_hint(&self) -> Option<f64> {
        let mut hint = if self.events.is_empty() {
            None
        } else {
            Some(self.current_time + self.options.communication_step)
        };
        if let Some(event_time) = self.earliest_predicted_event() {
            hint = Some(match hint {
                Some(h) => h.min(event_time),
                None => event_time,
            });
        }
        hint
    }
}
