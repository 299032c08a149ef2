//! Error types for the Hair Strands simulation.
//!
//! Every fallible operation returns [`Result`], surfacing [`SimError`] synchronously
//! at the point of the offending call. Nothing is retried or silently clamped.

use std::fmt;

use thiserror::Error;

/// Which accessor an out-of-range index was passed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Node,
    Collider,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Collider => write!(f, "collider"),
        }
    }
}

/// Main error type for the simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid setup or parameter value. Fatal to the simulation being configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Out-of-range node or collider index. No state was mutated.
    #[error("Index error: {kind} index {index} out of range (len {len})")]
    Index {
        kind: IndexKind,
        index: usize,
        len: usize,
    },

    /// Node store allocation failed while configuring.
    #[error("Resource exhaustion: could not allocate {requested} {what}")]
    ResourceExhaustion { what: &'static str, requested: usize },
}

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn node_index(index: usize, len: usize) -> Self {
        Self::Index {
            kind: IndexKind::Node,
            index,
            len,
        }
    }

    pub(crate) fn collider_index(index: usize, len: usize) -> Self {
        Self::Index {
            kind: IndexKind::Collider,
            index,
            len,
        }
    }
}

/// Convenient Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Rejects NaN and infinities with a [`SimError::Configuration`] naming the field.
pub(crate) fn ensure_finite(name: &str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::config(format!("{name} must be finite, got {value}")))
    }
}
