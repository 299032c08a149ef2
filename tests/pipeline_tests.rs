use approx::assert_abs_diff_eq;
use hair_strands::gpu::KernelContext;
use hair_strands::*;

fn still_params() -> SimulationParams {
    SimulationParams {
        gravity: 0.0,
        ..SimulationParams::default()
    }
}

fn run_sub_step(store: &mut NodeStore, params: &SimulationParams, kernels: &[Kernel]) {
    let backend = CpuBackend::new(32);
    for &kernel in kernels {
        backend.dispatch(kernel, KernelContext { store: &mut *store, params });
    }
}

fn max_speed(store: &NodeStore) -> f32 {
    store
        .nodes
        .iter()
        .map(|n| n.velocity.length())
        .fold(0.0, f32::max)
}

#[test]
fn two_nodes_at_rest_length_feel_no_force() {
    let params = SimulationParams {
        rest_distance: 0.5,
        stiffness: 6.0,
        gravity: 0.0,
        ..SimulationParams::default()
    };
    let config = SimulationConfig::new()
        .strands(1, 2)
        .simulation_steps(1)
        .colliders(Vec::new())
        .params(params);
    let mut world = HairWorld::configure(config).unwrap();
    world
        .reset_nodes(&[Vec2::ZERO, Vec2::new(0.0, -0.5)])
        .unwrap();

    world.tick();

    assert_eq!(world.node_velocity(0).unwrap(), Vec2::ZERO);
    assert_eq!(world.node_velocity(1).unwrap(), Vec2::ZERO);
    let a = world.node_position(0).unwrap();
    let b = world.node_position(1).unwrap();
    assert_eq!(a, Vec2::ZERO);
    assert_eq!(b, Vec2::new(0.0, -0.5));
    assert!(a.distance(b) <= world.params().max_travel_distance);
}

#[test]
fn velocities_decay_without_external_input() {
    let layout = StrandLayout::new(3, 8).unwrap();
    let mut store = NodeStore::new(layout, ForceCodec::default(), &[], 0.5).unwrap();
    for (i, node) in store.nodes.iter_mut().enumerate() {
        node.velocity = Vec2::new(((i * 7) % 5) as f32 - 2.0, ((i * 3) % 4) as f32 - 1.5);
    }
    let params = SimulationParams {
        gravity: 0.0,
        stiffness: 0.0,
        bending_stiffness: 0.0,
        velocity_decay: 0.95,
        ..SimulationParams::default()
    };

    let initial = max_speed(&store);
    let mut previous = initial;
    for _ in 0..50 {
        run_sub_step(&mut store, &params, &Kernel::ORDER);
        let speed = max_speed(&store);
        assert!(speed < previous, "speed grew from {previous} to {speed}");
        previous = speed;
    }
    assert!(previous < initial * 0.1);
}

#[test]
fn integration_clamps_adjacent_nodes_to_max_travel() {
    let layout = StrandLayout::new(2, 6).unwrap();
    let mut store = NodeStore::new(layout, ForceCodec::default(), &[], 0.5).unwrap();
    let positions: Vec<Vec2> = (0..12)
        .map(|i| {
            let t = i as f32;
            Vec2::new(t * t * 0.3, (t * 1.7).sin() * 4.0)
        })
        .collect();
    store.reset_nodes(&positions).unwrap();

    let params = SimulationParams {
        max_travel_distance: 1.25,
        ..still_params()
    };
    run_sub_step(&mut store, &params, &[Kernel::Integration]);

    for i in 0..store.node_count() {
        if let Some(next) = layout.next(i) {
            let distance = store.nodes[i].position.distance(store.nodes[next].position);
            assert!(distance <= 1.25 + 1e-4, "link {i}-{next} is {distance}");
        }
    }
}

#[test]
fn ticks_keep_links_within_max_travel() {
    let params = SimulationParams {
        gravity: 50.0,
        stiffness: 0.5,
        max_travel_distance: 0.55,
        d_position: 0.01,
        ..SimulationParams::default()
    };
    let config = SimulationConfig::new()
        .strands(4, 16)
        .simulation_steps(10)
        .colliders(Vec::new())
        .params(params);
    let mut world = HairWorld::configure(config).unwrap();

    for _ in 0..3 {
        world.tick();
    }

    let layout = *world.layout();
    for i in 0..world.node_count() {
        if let Some(next) = layout.next(i) {
            let a = world.node_position(i).unwrap();
            let b = world.node_position(next).unwrap();
            assert!(a.distance(b) <= 0.55 + 1e-4);
        }
    }
}

#[test]
fn collision_pushes_centred_node_to_surface() {
    let layout = StrandLayout::new(1, 1).unwrap();
    let collider = ColliderDesc::new(Vec2::new(1.0, 2.0), 1.5);
    let mut store = NodeStore::new(layout, ForceCodec::default(), &[collider], 0.5).unwrap();
    store.reset_nodes(&[collider.position]).unwrap();

    run_sub_step(
        &mut store,
        &still_params(),
        &[Kernel::Velocity, Kernel::Force, Kernel::Collision],
    );

    let distance = store.nodes[0].position.distance(collider.position);
    assert!(distance >= collider.radius - 1e-4, "node still inside: {distance}");
}

#[test]
fn collider_receives_the_opposite_impulse() {
    let config = SimulationConfig::new()
        .strands(1, 1)
        .simulation_steps(1)
        .colliders(vec![ColliderDesc::new(Vec2::new(1.0, 2.0), 1.5)])
        .params(still_params());
    let mut world = HairWorld::configure(config).unwrap();
    world.reset_nodes(&[Vec2::new(1.0, 2.0)]).unwrap();

    world.tick();

    let force = world.collider_contact_force(0).unwrap();
    assert_abs_diff_eq!(force.x, 0.0);
    assert_abs_diff_eq!(force.y, -1.5, epsilon = 1e-5);
    let node = world.node_position(0).unwrap();
    assert!(node.distance(Vec2::new(1.0, 2.0)) >= 1.5);
    assert!(world.node_velocity(0).unwrap().y > 0.0);
}

#[test]
fn contact_force_resets_every_tick() {
    let config = SimulationConfig::new()
        .strands(1, 1)
        .simulation_steps(1)
        .colliders(vec![ColliderDesc::new(Vec2::ZERO, 1.0)])
        .params(still_params());
    let mut world = HairWorld::configure(config).unwrap();
    world.reset_nodes(&[Vec2::new(0.5, 0.0)]).unwrap();

    world.tick();
    assert!(world.collider_contact_force(0).unwrap().x < 0.0);

    world.set_collider_position(0, Vec2::new(-50.0, 0.0)).unwrap();
    world.tick();
    assert_eq!(world.collider_contact_force(0).unwrap(), Vec2::ZERO);
}

#[test]
fn moving_a_collider_into_the_grid_generates_contact() {
    let config = SimulationConfig::new().strands(8, 8).simulation_steps(4);
    let mut world = HairWorld::configure(config).unwrap();

    world.tick();
    assert_eq!(world.collider_contact_force(0).unwrap(), Vec2::ZERO);

    world.set_collider_position(0, Vec2::new(0.1, 0.1)).unwrap();
    world.tick();
    assert_eq!(world.store().colliders[0].position, Vec2::new(0.1, 0.1));
    assert!(world.collider_contact_force(0).unwrap().length() > 0.0);
}

#[test]
fn kernels_dispatch_in_fixed_order_every_sub_step() {
    let config = SimulationConfig::new()
        .strands(5, 7)
        .simulation_steps(3)
        .group_width(8);
    let mut world = HairWorld::configure(config).unwrap();
    world.set_parallel_enabled(false);

    world.tick();

    let log = world.dispatch_log();
    let kernels: Vec<Kernel> = log.iter().map(|r| r.kernel).collect();
    let expected: Vec<Kernel> = Kernel::ORDER.iter().copied().cycle().take(12).collect();
    assert_eq!(kernels, expected);
    assert!(log.iter().all(|r| r.grid.groups == 5 && r.grid.items == 35));

    world.tick();
    assert_eq!(world.dispatch_log().len(), 12);
}

#[test]
fn default_grid_falls_under_gravity() {
    let mut world = HairWorld::configure(SimulationConfig::default()).unwrap();
    let mean_y = |world: &HairWorld| {
        world.node_positions().iter().map(|p| p.y).sum::<f32>() / world.node_count() as f32
    };

    let before = mean_y(&world);
    world.tick();
    assert!(mean_y(&world) < before);
    assert_eq!(world.tick_count(), 1);
    assert_eq!(world.profiler().sub_steps, 40);
}

#[cfg(feature = "parallel")]
#[test]
fn sequential_and_parallel_backends_agree() {
    let config = SimulationConfig::new()
        .strands(16, 24)
        .simulation_steps(8)
        .colliders(vec![ColliderDesc::new(Vec2::new(0.0, 1.0), 2.5)]);

    let mut sequential = HairWorld::configure(config.clone()).unwrap();
    sequential.set_parallel_enabled(false);
    let mut parallel = HairWorld::configure(config).unwrap();
    parallel.set_parallel_enabled(true);
    assert_eq!(parallel.backend_name(), "cpu-rayon");

    for _ in 0..3 {
        sequential.tick();
        parallel.tick();
    }

    assert_eq!(sequential.node_positions(), parallel.node_positions());
    assert_eq!(sequential.contact_forces(), parallel.contact_forces());
}

#[test]
fn dense_contact_force_keeps_its_sign_at_any_scale() {
    let contact_force = |shift: u32| {
        let config = SimulationConfig::new()
            .strands(64, 64)
            .simulation_steps(1)
            .fixed_point_shift(shift)
            .colliders(vec![ColliderDesc::new(Vec2::new(0.0, -40.0), 40.0)]);
        let mut world = HairWorld::configure(config).unwrap();
        world.set_parallel_enabled(false);
        world.tick();
        world.collider_contact_force(0).unwrap()
    };

    let fine = contact_force(18);
    let coarse = contact_force(10);
    // The summed reaction is far past a single cell's 8192 bound at 2^18.
    assert!(fine.y < -ForceCodec::default().max_magnitude(), "{fine}");
    assert!(coarse.y < 0.0, "{coarse}");
    assert!((fine - coarse).length() < 0.01 * coarse.length(), "{fine} vs {coarse}");
}
