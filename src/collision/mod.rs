//! Collision handling between hair nodes and circular colliders.

pub mod circle;

pub use circle::resolve_contact;
