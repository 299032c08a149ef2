//! Core types describing the hair grid, its colliders, and their parameters.

pub mod layout;
pub mod node;
pub mod params;
pub mod store;

pub use layout::StrandLayout;
pub use node::{ColliderNode, HairNode};
pub use params::{ColliderDesc, ParamUpdate, SimulationConfig, SimulationParams};
pub use store::NodeStore;
