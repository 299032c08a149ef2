use glam::Vec2;

use super::{
    layout::StrandLayout,
    node::{ColliderNode, HairNode},
    params::ColliderDesc,
};
use crate::{
    dynamics::fixed_point::ForceCodec,
    error::{Result, SimError},
};

/// Device-resident simulation state: the hair node and collider arrays.
///
/// Both arrays are sized once at creation and never resized.
#[derive(Debug)]
pub struct NodeStore {
    pub nodes: Vec<HairNode>,
    pub colliders: Vec<ColliderNode>,
    layout: StrandLayout,
    codec: ForceCodec,
    /// Scratch velocities for the velocity stage's gather pass.
    pub(crate) scratch: Vec<Vec2>,
}

impl NodeStore {
    /// Allocates the store with every strand laid out on the default grid.
    pub fn new(
        layout: StrandLayout,
        codec: ForceCodec,
        colliders: &[ColliderDesc],
        rest_distance: f32,
    ) -> Result<Self> {
        let node_count = layout.node_count();

        let mut nodes = try_alloc::<HairNode>("hair nodes", node_count)?;
        nodes.extend((0..node_count).map(|i| {
            HairNode::new(grid_position(&layout, i, rest_distance))
        }));

        let mut scratch = try_alloc::<Vec2>("scratch velocities", node_count)?;
        scratch.resize(node_count, Vec2::ZERO);

        let mut collider_nodes = try_alloc::<ColliderNode>("collider nodes", colliders.len())?;
        collider_nodes.extend(
            colliders
                .iter()
                .map(|desc| ColliderNode::new(desc.position, desc.radius)),
        );

        Ok(Self {
            nodes,
            colliders: collider_nodes,
            layout,
            codec,
            scratch,
        })
    }

    pub fn layout(&self) -> &StrandLayout {
        &self.layout
    }

    pub fn codec(&self) -> &ForceCodec {
        &self.codec
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn node(&self, index: usize) -> Result<&HairNode> {
        self.nodes
            .get(index)
            .ok_or_else(|| SimError::node_index(index, self.nodes.len()))
    }

    pub fn collider(&self, index: usize) -> Result<&ColliderNode> {
        self.colliders
            .get(index)
            .ok_or_else(|| SimError::collider_index(index, self.colliders.len()))
    }

    /// Places every node at `positions[i]` with zero velocity and force.
    pub fn reset_nodes(&mut self, positions: &[Vec2]) -> Result<()> {
        if positions.len() != self.nodes.len() {
            return Err(SimError::config(format!(
                "expected {} node positions, got {}",
                self.nodes.len(),
                positions.len()
            )));
        }
        if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
            return Err(SimError::config(format!(
                "node {i} position must be finite, got {}",
                positions[i]
            )));
        }
        for (node, &position) in self.nodes.iter_mut().zip(positions) {
            node.reset(position);
        }
        Ok(())
    }
}

/// Default layout: strands side by side along X, nodes hanging along -Y,
/// both centred on the origin.
pub fn grid_position(layout: &StrandLayout, index: usize, spacing: f32) -> Vec2 {
    let strand = layout.strand_of(index) as f32;
    let node = layout.node_in_strand(index) as f32;
    let half_strands = (layout.strand_count() / 2) as f32;
    let half_nodes = (layout.nodes_per_strand() / 2) as f32;
    Vec2::new(
        spacing * (strand - half_strands),
        -spacing * (node - half_nodes),
    )
}

fn try_alloc<T>(what: &'static str, requested: usize) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(requested)
        .map_err(|_| SimError::ResourceExhaustion { what, requested })?;
    Ok(buffer)
}
