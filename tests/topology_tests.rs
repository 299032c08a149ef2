use hair_strands::{
    ComputeBackend, CpuBackend, ForceCodec, Kernel, NodeStore, SimulationParams, StrandLayout,
    Vec2,
};
use hair_strands::gpu::KernelContext;

#[test]
fn neighbours_never_cross_strands() {
    for strands in 1..6 {
        for per_strand in 1..10 {
            let layout = StrandLayout::new(strands, per_strand).unwrap();
            for i in 0..layout.node_count() {
                for offset in [-2isize, -1, 1, 2] {
                    let local = layout.node_in_strand(i) as isize + offset;
                    let expected_exists = (0..per_strand as isize).contains(&local);
                    match layout.neighbor(i, offset) {
                        Some(j) => {
                            assert!(expected_exists, "{strands}x{per_strand}: {i}{offset:+}");
                            assert_eq!(layout.strand_of(j), layout.strand_of(i));
                            assert_eq!(j as isize - i as isize, offset);
                        }
                        None => assert!(!expected_exists, "{strands}x{per_strand}: {i}{offset:+}"),
                    }
                }
            }
        }
    }
}

fn two_strands() -> NodeStore {
    let layout = StrandLayout::new(2, 4).unwrap();
    NodeStore::new(layout, ForceCodec::default(), &[], 0.5).unwrap()
}

#[test]
fn velocity_stage_keeps_strands_isolated() {
    let mut store = two_strands();
    for node in store.nodes.iter_mut().take(4) {
        node.velocity = Vec2::new(10.0, -10.0);
    }
    let params = SimulationParams {
        velocity_coupling: 1.0,
        ..SimulationParams::default()
    };

    CpuBackend::new(4).dispatch(
        Kernel::Velocity,
        KernelContext {
            store: &mut store,
            params: &params,
        },
    );

    assert!(store.nodes[4..].iter().all(|n| n.velocity == Vec2::ZERO));
    assert!(store.nodes[..4].iter().all(|n| n.velocity == Vec2::new(10.0, -10.0)));
}

#[test]
fn force_stage_keeps_strands_isolated() {
    let mut store = two_strands();
    // Stretch and bend the first strand; leave the second at rest.
    let mut positions: Vec<Vec2> = store.nodes.iter().map(|n| n.position).collect();
    positions[3] = Vec2::new(5.0, -5.0);
    positions[1] = Vec2::new(-3.0, 2.0);
    store.reset_nodes(&positions).unwrap();

    let params = SimulationParams {
        gravity: 0.0,
        ..SimulationParams::default()
    };
    CpuBackend::new(4).dispatch(
        Kernel::Force,
        KernelContext {
            store: &mut store,
            params: &params,
        },
    );

    assert!(store.nodes[..4].iter().any(|n| n.force.raw() != [0, 0]));
    assert!(store.nodes[4..].iter().all(|n| n.force.raw() == [0, 0]));
}
