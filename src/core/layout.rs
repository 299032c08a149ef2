use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Flat-index arithmetic for a grid of equal-length strands.
///
/// Node `i` belongs to strand `i / nodes_per_strand` at position
/// `i % nodes_per_strand`. Neighbour lookups never cross a strand boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LayoutShape")]
pub struct StrandLayout {
    strand_count: usize,
    nodes_per_strand: usize,
}

/// Unchecked serialized form; deserialization goes through [`StrandLayout::new`].
#[derive(Deserialize)]
struct LayoutShape {
    strand_count: usize,
    nodes_per_strand: usize,
}

impl TryFrom<LayoutShape> for StrandLayout {
    type Error = SimError;

    fn try_from(shape: LayoutShape) -> Result<Self> {
        Self::new(shape.strand_count, shape.nodes_per_strand)
    }
}

impl StrandLayout {
    /// Fails when either count is zero or the node count overflows `usize`.
    pub fn new(strand_count: usize, nodes_per_strand: usize) -> Result<Self> {
        if strand_count == 0 {
            return Err(SimError::config("strand_count must be at least 1"));
        }
        if nodes_per_strand == 0 {
            return Err(SimError::config("nodes_per_strand must be at least 1"));
        }
        if strand_count.checked_mul(nodes_per_strand).is_none() {
            return Err(SimError::config(format!(
                "{strand_count} strands x {nodes_per_strand} nodes overflows the node index range"
            )));
        }
        Ok(Self {
            strand_count,
            nodes_per_strand,
        })
    }

    pub fn strand_count(&self) -> usize {
        self.strand_count
    }

    pub fn nodes_per_strand(&self) -> usize {
        self.nodes_per_strand
    }

    pub fn node_count(&self) -> usize {
        self.strand_count * self.nodes_per_strand
    }

    pub fn index(&self, strand: usize, node: usize) -> usize {
        strand * self.nodes_per_strand + node
    }

    pub fn strand_of(&self, index: usize) -> usize {
        index / self.nodes_per_strand
    }

    pub fn node_in_strand(&self, index: usize) -> usize {
        index % self.nodes_per_strand
    }

    pub fn is_strand_start(&self, index: usize) -> bool {
        self.node_in_strand(index) == 0
    }

    pub fn is_strand_end(&self, index: usize) -> bool {
        self.node_in_strand(index) + 1 == self.nodes_per_strand
    }

    /// Index of the node `offset` steps along the same strand, if it exists.
    pub fn neighbor(&self, index: usize, offset: isize) -> Option<usize> {
        let local = self.node_in_strand(index) as isize + offset;
        if local < 0 || local >= self.nodes_per_strand as isize {
            return None;
        }
        Some(index - self.node_in_strand(index) + local as usize)
    }

    pub fn prev(&self, index: usize) -> Option<usize> {
        self.neighbor(index, -1)
    }

    pub fn next(&self, index: usize) -> Option<usize> {
        self.neighbor(index, 1)
    }
}
