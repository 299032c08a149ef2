use std::time::Duration;

use glam::Vec2;
use log::{debug, warn};

use crate::{
    core::{
        layout::StrandLayout,
        params::{ParamUpdate, SimulationConfig, SimulationParams},
        store::NodeStore,
    },
    dynamics::fixed_point::ForceCodec,
    error::{Result, SimError},
    gpu::{ComputeBackend, CpuBackend, DispatchRecord, Kernel, KernelContext},
    utils::{
        logging::warn_if_frame_budget_exceeded,
        profiling::{ScopedTimer, StepProfiler},
    },
};

#[cfg(feature = "parallel")]
use crate::gpu::RayonBackend;

/// Host-visible copies of the device state.
///
/// Collider positions flow in before a tick; node positions and decoded contact
/// forces flow out after it.
#[derive(Debug, Default)]
struct HostMirror {
    collider_positions: Vec<Vec2>,
    node_positions: Vec<Vec2>,
    contact_forces: Vec<Vec2>,
}

/// Simulation context owning the node store, parameters and compute backend.
///
/// Each tick pushes collider positions to the device, runs a fixed number of
/// four-kernel sub-steps, then pulls results back into the host mirror.
pub struct HairWorld {
    store: NodeStore,
    params: SimulationParams,
    simulation_steps: u32,
    group_width: usize,
    parallel_enabled: bool,
    backend: Box<dyn ComputeBackend>,
    host: HostMirror,
    profiler: StepProfiler,
    frame_budget_ms: Option<f32>,
    tick_count: u64,
}

impl HairWorld {
    /// Validates `config` and allocates the node store.
    pub fn configure(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let codec = ForceCodec::new(config.fixed_point_shift)?;
        let layout = StrandLayout::new(config.strand_count, config.nodes_per_strand)?;
        let store = NodeStore::new(
            layout,
            codec,
            &config.colliders,
            config.params.rest_distance,
        )?;

        debug!(
            "configured hair world: {} strands x {} nodes, {} colliders, {} sub-steps, scale 2^{}",
            layout.strand_count(),
            layout.nodes_per_strand(),
            store.collider_count(),
            config.simulation_steps,
            codec.shift()
        );

        let parallel_enabled = cfg!(feature = "parallel");
        let mut world = Self {
            backend: make_backend(parallel_enabled, config.group_width),
            store,
            params: config.params,
            simulation_steps: config.simulation_steps,
            group_width: config.group_width,
            parallel_enabled,
            host: HostMirror::default(),
            profiler: StepProfiler::default(),
            frame_budget_ms: None,
            tick_count: 0,
        };
        world.host.collider_positions = config.colliders.iter().map(|c| c.position).collect();
        world.pull_results();
        Ok(world)
    }

    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        if enabled && !cfg!(feature = "parallel") {
            warn!("parallel execution requested but the `parallel` feature is disabled");
        }
        self.parallel_enabled = enabled && cfg!(feature = "parallel");
        self.backend = make_backend(self.parallel_enabled, self.group_width);
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel_enabled
    }

    pub fn set_backend<B>(&mut self, backend: B)
    where
        B: ComputeBackend + 'static,
    {
        self.backend = Box::new(backend);
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Warn whenever a tick takes longer than `budget_ms`. `None` disables the check.
    pub fn set_frame_budget(&mut self, budget_ms: Option<f32>) {
        self.frame_budget_ms = budget_ms;
    }

    /// Advances the simulation by one visible tick of `simulation_steps` sub-steps.
    pub fn tick(&mut self) {
        let mut elapsed = Duration::ZERO;
        {
            let _timer = ScopedTimer::new("tick", &mut elapsed);
            self.profiler.reset();
            self.backend.dispatch_log().clear();

            self.push_colliders();
            for _ in 0..self.simulation_steps {
                self.sub_step();
            }
            self.pull_results();
        }

        self.tick_count += 1;
        self.profiler.total_tick_time = elapsed;
        self.profiler.node_count = self.store.node_count();
        self.profiler.collider_count = self.store.collider_count();
        self.profiler.sub_steps = self.simulation_steps;

        if let Some(budget) = self.frame_budget_ms {
            warn_if_frame_budget_exceeded(elapsed, budget);
        }
    }

    fn sub_step(&mut self) {
        for kernel in Kernel::ORDER {
            let _timer =
                ScopedTimer::new(kernel.label(), self.profiler.kernel_time_mut(kernel));
            self.backend.dispatch(
                kernel,
                KernelContext {
                    store: &mut self.store,
                    params: &self.params,
                },
            );
        }
    }

    /// Host to device: collider positions in, contact accumulators zeroed.
    fn push_colliders(&mut self) {
        for (collider, &position) in self
            .store
            .colliders
            .iter_mut()
            .zip(&self.host.collider_positions)
        {
            collider.position = position;
            collider.force.set_raw([0, 0]);
        }
    }

    /// Device to host: node positions and decoded contact forces out.
    fn pull_results(&mut self) {
        let codec = *self.store.codec();
        self.host.node_positions.clear();
        self.host
            .node_positions
            .extend(self.store.nodes.iter().map(|n| n.position));
        self.host.contact_forces.clear();
        self.host
            .contact_forces
            .extend(self.store.colliders.iter().map(|c| c.force.load(&codec)));
    }

    /// Moves collider `index`; takes effect at the start of the next tick.
    pub fn set_collider_position(&mut self, index: usize, position: Vec2) -> Result<()> {
        let len = self.host.collider_positions.len();
        let slot = self
            .host
            .collider_positions
            .get_mut(index)
            .ok_or_else(|| SimError::collider_index(index, len))?;
        if !position.is_finite() {
            return Err(SimError::config(format!(
                "collider {index} position must be finite, got {position}"
            )));
        }
        *slot = position;
        Ok(())
    }

    /// Host-side collider position, including any not yet pushed.
    pub fn collider_position(&self, index: usize) -> Result<Vec2> {
        self.host
            .collider_positions
            .get(index)
            .copied()
            .ok_or_else(|| SimError::collider_index(index, self.host.collider_positions.len()))
    }

    /// Node position as of the last completed tick.
    pub fn node_position(&self, index: usize) -> Result<Vec2> {
        self.host
            .node_positions
            .get(index)
            .copied()
            .ok_or_else(|| SimError::node_index(index, self.host.node_positions.len()))
    }

    /// Decoded contact force accumulated on collider `index` during the last tick.
    pub fn collider_contact_force(&self, index: usize) -> Result<Vec2> {
        self.host
            .contact_forces
            .get(index)
            .copied()
            .ok_or_else(|| SimError::collider_index(index, self.host.contact_forces.len()))
    }

    pub fn node_positions(&self) -> &[Vec2] {
        &self.host.node_positions
    }

    pub fn contact_forces(&self) -> &[Vec2] {
        &self.host.contact_forces
    }

    /// Device-side node velocity, for diagnostics.
    pub fn node_velocity(&self, index: usize) -> Result<Vec2> {
        self.store.node(index).map(|node| node.velocity)
    }

    /// Replaces every node position and zeroes velocity and force.
    pub fn reset_nodes(&mut self, positions: &[Vec2]) -> Result<()> {
        self.store.reset_nodes(positions)?;
        self.pull_results();
        Ok(())
    }

    pub fn apply(&mut self, update: ParamUpdate) -> Result<()> {
        self.params.apply(update)
    }

    pub fn set_rest_distance(&mut self, value: f32) -> Result<()> {
        self.apply(ParamUpdate::RestDistance(value))
    }

    pub fn set_stiffness(&mut self, value: f32) -> Result<()> {
        self.apply(ParamUpdate::Stiffness(value))
    }

    pub fn set_gravity(&mut self, value: f32) -> Result<()> {
        self.apply(ParamUpdate::Gravity(value))
    }

    pub fn set_max_travel_distance(&mut self, value: f32) -> Result<()> {
        self.apply(ParamUpdate::MaxTravelDistance(value))
    }

    pub fn set_bending_stiffness(&mut self, value: f32) -> Result<()> {
        self.apply(ParamUpdate::BendingStiffness(value))
    }

    pub fn set_velocity_decay(&mut self, value: f32) -> Result<()> {
        self.apply(ParamUpdate::VelocityDecay(value))
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn layout(&self) -> &StrandLayout {
        self.store.layout()
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    pub fn collider_count(&self) -> usize {
        self.store.collider_count()
    }

    pub fn simulation_steps(&self) -> u32 {
        self.simulation_steps
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Kernel dispatches issued during the last tick, in order.
    pub fn dispatch_log(&self) -> Vec<DispatchRecord> {
        self.backend.dispatch_log().records()
    }

    pub fn profiler(&self) -> &StepProfiler {
        &self.profiler
    }
}

fn make_backend(parallel: bool, group_width: usize) -> Box<dyn ComputeBackend> {
    #[cfg(feature = "parallel")]
    if parallel {
        return Box::new(RayonBackend::new(group_width));
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;
    Box::new(CpuBackend::new(group_width))
}
