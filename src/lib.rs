//! Hair Strands – data-parallel 2D hair simulation for Rust.
//!
//! A grid of strands, each a chain of point-mass nodes joined by springs, reacts
//! to gravity, elastic and bending forces, velocity damping, and circular
//! colliders. Every tick runs a fixed number of sub-steps, each dispatching the
//! velocity, force, collision and integration kernels in that order. Force
//! contributions are accumulated as fixed-point integers with atomic adds, so
//! parallel workers can write into shared accumulators without float atomics.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod gpu;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use crate::core::{
    layout::StrandLayout,
    node::{ColliderNode, HairNode},
    params::{ColliderDesc, ParamUpdate, SimulationConfig, SimulationParams},
    store::NodeStore,
};
pub use dynamics::fixed_point::{AtomicForce, ForceCodec};
pub use error::{IndexKind, Result, SimError};
pub use gpu::{
    ComputeBackend, CpuBackend, DispatchGrid, DispatchLog, DispatchRecord, Execution, Kernel,
};
#[cfg(feature = "parallel")]
pub use gpu::RayonBackend;
pub use utils::profiling::StepProfiler;
pub use world::HairWorld;

/// High-level convenience wrapper that owns a [`HairWorld`].
pub struct HairSimulation {
    world: HairWorld,
}

impl HairSimulation {
    /// Configures a new simulation; see [`HairWorld::configure`].
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Ok(Self {
            world: HairWorld::configure(config)?,
        })
    }

    /// Runs one visible tick.
    pub fn tick(&mut self) {
        self.world.tick();
    }

    /// Moves a collider before the next tick.
    pub fn set_collider(&mut self, index: usize, position: Vec2) -> Result<()> {
        self.world.set_collider_position(index, position)
    }

    /// Node position after the last tick.
    pub fn node_position(&self, index: usize) -> Result<Vec2> {
        self.world.node_position(index)
    }

    /// Decoded contact force on a collider after the last tick.
    pub fn collider_contact_force(&self, index: usize) -> Result<Vec2> {
        self.world.collider_contact_force(index)
    }

    pub fn world(&self) -> &HairWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut HairWorld {
        &mut self.world
    }
}
