//! Compute device abstraction: kernels, dispatch sizing, and backends.

pub mod cpu_backend;
pub mod execution;

pub use cpu_backend::CpuBackend;
#[cfg(feature = "parallel")]
pub use cpu_backend::RayonBackend;
pub use execution::Execution;

use parking_lot::Mutex;

use crate::{
    collision,
    core::{params::SimulationParams, store::NodeStore},
    dynamics::{forces, integrator, velocity},
};

/// The four per-sub-step kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// Exchange velocity between chain neighbours.
    Velocity,
    /// Springs, bending and gravity into the force accumulators.
    Force,
    /// Push nodes out of colliders and record contact impulses.
    Collision,
    /// Semi-implicit Euler step and the max-travel clamp.
    Integration,
}

impl Kernel {
    /// Dispatch order within a sub-step. Reordering or fusing changes the result.
    pub const ORDER: [Kernel; 4] = [
        Kernel::Velocity,
        Kernel::Force,
        Kernel::Collision,
        Kernel::Integration,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Kernel::Velocity => "kernel::velocity",
            Kernel::Force => "kernel::force",
            Kernel::Collision => "kernel::collision",
            Kernel::Integration => "kernel::integration",
        }
    }
}

/// Number of work groups needed to cover every node once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGrid {
    pub items: usize,
    pub group_width: usize,
    pub groups: usize,
}

impl DispatchGrid {
    pub fn for_items(items: usize, group_width: usize) -> Self {
        let group_width = group_width.max(1);
        Self {
            items,
            group_width,
            groups: items.div_ceil(group_width),
        }
    }
}

/// One kernel dispatch as seen by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRecord {
    pub kernel: Kernel,
    pub grid: DispatchGrid,
}

/// Dispatches issued since the last [`DispatchLog::clear`].
#[derive(Debug, Default)]
pub struct DispatchLog {
    records: Mutex<Vec<DispatchRecord>>,
}

impl DispatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kernel: Kernel, grid: DispatchGrid) {
        self.records.lock().push(DispatchRecord { kernel, grid });
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    pub fn records(&self) -> Vec<DispatchRecord> {
        self.records.lock().clone()
    }

    pub fn kernels(&self) -> Vec<Kernel> {
        self.records.lock().iter().map(|r| r.kernel).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a kernel reads or writes during one dispatch.
pub struct KernelContext<'a> {
    pub store: &'a mut NodeStore,
    pub params: &'a SimulationParams,
}

/// Trait implemented by devices that can run the simulation kernels.
pub trait ComputeBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Preferred number of nodes per work group.
    fn group_width(&self) -> usize;

    /// Scheduling used for a dispatch over `grid`.
    fn execution(&self, grid: DispatchGrid) -> Execution;

    fn dispatch_log(&self) -> &DispatchLog;

    /// Runs `kernel` over every node and returns once all writes have landed.
    fn dispatch(&self, kernel: Kernel, ctx: KernelContext<'_>) {
        let grid = DispatchGrid::for_items(ctx.store.node_count(), self.group_width());
        self.dispatch_log().record(kernel, grid);
        let exec = self.execution(grid);

        match kernel {
            Kernel::Velocity => velocity::run(ctx.store, ctx.params, exec),
            Kernel::Force => forces::run(ctx.store, ctx.params, exec),
            Kernel::Collision => collision::circle::run(ctx.store, ctx.params, exec),
            Kernel::Integration => integrator::run(ctx.store, ctx.params, exec),
        }
    }
}
