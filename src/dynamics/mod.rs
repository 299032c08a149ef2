//! Simulation dynamics: the fixed-point force codec and the velocity, force and
//! integration kernels.

pub mod fixed_point;
pub mod forces;
pub mod integrator;
pub mod velocity;

pub use fixed_point::{AtomicForce, ForceCodec};
pub use forces::{bending_force, spring_force};
pub use integrator::{clamp_strand, integrate_node};
pub use velocity::blended_velocity;
