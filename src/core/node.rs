use glam::Vec2;

use crate::dynamics::fixed_point::AtomicForce;

/// One segment of a hair strand.
///
/// Two `Vec2`s and a 16-byte accumulator, so a buffer of nodes keeps a 32-byte
/// stride.
#[repr(C)]
#[derive(Debug, Default, Clone)]
pub struct HairNode {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Fixed-point force accumulated during the current sub-step.
    pub force: AtomicForce,
}

impl HairNode {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Puts the node at `position` with zero velocity and an empty accumulator.
    pub fn reset(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.force.set_raw([0, 0]);
    }
}

/// Circular obstacle that hair nodes cannot penetrate.
#[repr(C)]
#[derive(Debug, Default, Clone)]
pub struct ColliderNode {
    pub position: Vec2,
    pub radius: f32,
    _reserved: f32,
    /// Fixed-point contact reaction accumulated over one tick.
    pub force: AtomicForce,
}

impl ColliderNode {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            radius,
            ..Self::default()
        }
    }

    /// Returns `true` when `point` lies strictly inside the circle.
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance_squared(self.position) < self.radius * self.radius
    }
}
