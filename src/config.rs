//! Global configuration constants for the Hair Strands simulation.

/// Default number of strands across the grid.
pub const DEFAULT_STRAND_COUNT: usize = 32;

/// Default number of nodes along each strand.
pub const DEFAULT_NODES_PER_STRAND: usize = 32;

/// Number of four-kernel sub-steps executed per visible tick.
pub const DEFAULT_SIMULATION_STEPS: u32 = 40;

/// Spring rest length between adjacent nodes (also the initial spacing).
pub const DEFAULT_REST_DISTANCE: f32 = 0.5;

/// Euler integration ratio applied to velocity when advancing positions.
pub const DEFAULT_D_POSITION: f32 = 0.0004;

/// Euler integration ratio applied to force when advancing velocities.
pub const DEFAULT_D_VELOCITY: f32 = 1.0;

/// Fraction of a sub-step's force carried into the next one.
pub const DEFAULT_FORCE_DECAY: f32 = 0.0;

/// Velocity multiplier applied once per sub-step.
pub const DEFAULT_VELOCITY_DECAY: f32 = 0.999;

/// Gravity magnitude, pulling along -Y.
pub const DEFAULT_GRAVITY: f32 = 0.1;

/// Hooke's law coefficient for structural springs.
pub const DEFAULT_STIFFNESS: f32 = 6.0;

/// Maximum distance allowed between adjacent nodes after integration.
pub const DEFAULT_MAX_TRAVEL_DISTANCE: f32 = 5.0;

/// Coefficient of the straightening force across node triples.
pub const DEFAULT_BENDING_STIFFNESS: f32 = 0.1;

/// Blend weight of neighbour velocities in the velocity stage.
pub const DEFAULT_VELOCITY_COUPLING: f32 = 0.25;

/// Default collider radius.
pub const DEFAULT_COLLIDER_RADIUS: f32 = 2.5;

/// Default collider height below the grid centre.
pub const DEFAULT_COLLIDER_Y: f32 = -20.0;

/// Fixed-point shift: forces are stored scaled by `2^18`.
pub const DEFAULT_FIXED_POINT_SHIFT: u32 = 18;

/// Preferred number of nodes handled per dispatch group.
pub const DEFAULT_GROUP_WIDTH: usize = 32;

/// Distances below this are treated as coincident points.
pub const EPSILON: f32 = 1e-6;
