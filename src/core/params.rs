use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use super::layout::StrandLayout;
use crate::{
    config::*,
    dynamics::fixed_point::MAX_CONTRIBUTIONS,
    error::{ensure_finite, Result, SimError},
};

/// Physical coefficients shared by every kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub rest_distance: f32,
    /// Euler ratio: `position += velocity * d_position`.
    pub d_position: f32,
    /// Euler ratio: `velocity += force * d_velocity`.
    pub d_velocity: f32,
    pub force_decay: f32,
    pub velocity_decay: f32,
    pub gravity: f32,
    pub stiffness: f32,
    pub max_travel_distance: f32,
    pub bending_stiffness: f32,
    /// Weight of neighbour velocities in the velocity stage, in `[0, 1]`.
    pub velocity_coupling: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            rest_distance: DEFAULT_REST_DISTANCE,
            d_position: DEFAULT_D_POSITION,
            d_velocity: DEFAULT_D_VELOCITY,
            force_decay: DEFAULT_FORCE_DECAY,
            velocity_decay: DEFAULT_VELOCITY_DECAY,
            gravity: DEFAULT_GRAVITY,
            stiffness: DEFAULT_STIFFNESS,
            max_travel_distance: DEFAULT_MAX_TRAVEL_DISTANCE,
            bending_stiffness: DEFAULT_BENDING_STIFFNESS,
            velocity_coupling: DEFAULT_VELOCITY_COUPLING,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("rest_distance", self.rest_distance)?;
        ensure_finite("d_position", self.d_position)?;
        ensure_finite("d_velocity", self.d_velocity)?;
        ensure_finite("force_decay", self.force_decay)?;
        ensure_finite("velocity_decay", self.velocity_decay)?;
        ensure_finite("gravity", self.gravity)?;
        ensure_finite("stiffness", self.stiffness)?;
        ensure_finite("max_travel_distance", self.max_travel_distance)?;
        ensure_finite("bending_stiffness", self.bending_stiffness)?;
        ensure_finite("velocity_coupling", self.velocity_coupling)?;

        ensure_non_negative("max_travel_distance", self.max_travel_distance)?;

        if !(0.0..=1.0).contains(&self.velocity_coupling) {
            return Err(SimError::config(format!(
                "velocity_coupling must be in [0, 1], got {}",
                self.velocity_coupling
            )));
        }
        Ok(())
    }

    /// Applies a live update, leaving `self` untouched when the value is rejected.
    pub fn apply(&mut self, update: ParamUpdate) -> Result<()> {
        let value = ensure_finite(update.name(), update.value())?;
        if let ParamUpdate::MaxTravelDistance(_) = update {
            ensure_non_negative(update.name(), value)?;
        }
        match update {
            ParamUpdate::RestDistance(_) => self.rest_distance = value,
            ParamUpdate::Stiffness(_) => self.stiffness = value,
            ParamUpdate::Gravity(_) => self.gravity = value,
            ParamUpdate::MaxTravelDistance(_) => self.max_travel_distance = value,
            ParamUpdate::BendingStiffness(_) => self.bending_stiffness = value,
            ParamUpdate::VelocityDecay(_) => self.velocity_decay = value,
        }
        debug!("param update: {} = {}", update.name(), value);
        Ok(())
    }
}

fn ensure_non_negative(name: &str, value: f32) -> Result<f32> {
    if value < 0.0 {
        return Err(SimError::config(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(value)
}

/// A single named parameter write that may be issued between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamUpdate {
    RestDistance(f32),
    Stiffness(f32),
    Gravity(f32),
    MaxTravelDistance(f32),
    BendingStiffness(f32),
    VelocityDecay(f32),
}

impl ParamUpdate {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RestDistance(_) => "rest_distance",
            Self::Stiffness(_) => "stiffness",
            Self::Gravity(_) => "gravity",
            Self::MaxTravelDistance(_) => "max_travel_distance",
            Self::BendingStiffness(_) => "bending_stiffness",
            Self::VelocityDecay(_) => "velocity_decay",
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            Self::RestDistance(v)
            | Self::Stiffness(v)
            | Self::Gravity(v)
            | Self::MaxTravelDistance(v)
            | Self::BendingStiffness(v)
            | Self::VelocityDecay(v) => v,
        }
    }
}

/// Initial placement of one collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderDesc {
    pub position: Vec2,
    pub radius: f32,
}

impl ColliderDesc {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self { position, radius }
    }

    /// `count` colliders spaced one radius apart around `x = 0` at height `y`.
    pub fn row(count: usize, radius: f32, y: f32) -> Vec<Self> {
        (0..count)
            .map(|i| {
                let x = radius * (i as f32 - (count / 2) as f32);
                Self::new(Vec2::new(x, y), radius)
            })
            .collect()
    }
}

/// Everything needed to configure a simulation instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub strand_count: usize,
    pub nodes_per_strand: usize,
    pub simulation_steps: u32,
    pub fixed_point_shift: u32,
    pub group_width: usize,
    pub colliders: Vec<ColliderDesc>,
    pub params: SimulationParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            strand_count: DEFAULT_STRAND_COUNT,
            nodes_per_strand: DEFAULT_NODES_PER_STRAND,
            simulation_steps: DEFAULT_SIMULATION_STEPS,
            fixed_point_shift: DEFAULT_FIXED_POINT_SHIFT,
            group_width: DEFAULT_GROUP_WIDTH,
            colliders: ColliderDesc::row(1, DEFAULT_COLLIDER_RADIUS, DEFAULT_COLLIDER_Y),
            params: SimulationParams::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strands(mut self, strand_count: usize, nodes_per_strand: usize) -> Self {
        self.strand_count = strand_count;
        self.nodes_per_strand = nodes_per_strand;
        self
    }

    pub fn simulation_steps(mut self, steps: u32) -> Self {
        self.simulation_steps = steps;
        self
    }

    pub fn fixed_point_shift(mut self, shift: u32) -> Self {
        self.fixed_point_shift = shift;
        self
    }

    pub fn group_width(mut self, width: usize) -> Self {
        self.group_width = width;
        self
    }

    pub fn colliders(mut self, colliders: Vec<ColliderDesc>) -> Self {
        self.colliders = colliders;
        self
    }

    pub fn collider(mut self, position: Vec2, radius: f32) -> Self {
        self.colliders.push(ColliderDesc::new(position, radius));
        self
    }

    pub fn params(mut self, params: SimulationParams) -> Self {
        self.params = params;
        self
    }

    pub fn node_count(&self) -> Option<usize> {
        self.strand_count.checked_mul(self.nodes_per_strand)
    }

    pub fn validate(&self) -> Result<()> {
        let layout = StrandLayout::new(self.strand_count, self.nodes_per_strand)?;
        if self.simulation_steps == 0 {
            return Err(SimError::config("simulation_steps must be at least 1"));
        }
        // A collider accumulator takes one reaction per node per sub-step.
        let contributions =
            (layout.node_count() as u64).checked_mul(u64::from(self.simulation_steps));
        if contributions.map_or(true, |n| n > MAX_CONTRIBUTIONS) {
            return Err(SimError::config(format!(
                "{} nodes x {} simulation_steps exceeds the {MAX_CONTRIBUTIONS} \
                 contributions a collider accumulates per tick",
                layout.node_count(),
                self.simulation_steps
            )));
        }
        if self.group_width == 0 {
            return Err(SimError::config("group_width must be at least 1"));
        }
        for (i, collider) in self.colliders.iter().enumerate() {
            if !collider.position.is_finite() {
                return Err(SimError::config(format!(
                    "collider {i} position must be finite, got {}",
                    collider.position
                )));
            }
            if !collider.radius.is_finite() || collider.radius <= 0.0 {
                return Err(SimError::config(format!(
                    "collider {i} radius must be positive and finite, got {}",
                    collider.radius
                )));
            }
        }
        self.params.validate()
    }
}
