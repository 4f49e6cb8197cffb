//! Tests for the simulation engine: arena invariants, the flight-state
//! machine, collision handling, events, scenarios, and fleet management.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skyfleet_core::commands::DroneCommand;
use skyfleet_core::constants::SIMULATION_DT;
use skyfleet_core::enums::{FlightState, ObstacleKind};
use skyfleet_core::error::{CommandError, FleetError};
use skyfleet_core::events::SimEvent;
use skyfleet_core::types::Vec3;

use crate::fleet::DroneFleet;
use crate::physics::DronePhysics;
use crate::scenario;
use crate::simulator::{DroneConfig, DroneSimulator};
use crate::space::{Obstacle, Virtual3DSpace};

const ARENA: Vec3 = Vec3::new(20.0, 20.0, 10.0);

fn test_drone(id: &str) -> DroneSimulator {
    DroneSimulator::with_bounds(id, ARENA, DroneConfig::default())
}

fn run_ticks(sim: &DroneSimulator, ticks: usize) {
    for _ in 0..ticks {
        sim.step(SIMULATION_DT);
    }
}

/// Fly a fresh drone up to its takeoff altitude and into `Flying`.
fn flying_drone(id: &str) -> DroneSimulator {
    let sim = test_drone(id);
    sim.takeoff().unwrap();
    run_ticks(&sim, 800);
    assert_eq!(sim.flight_state(), FlightState::Flying);
    sim
}

// ---- Arena invariants ----

#[test]
fn test_boundary_invariant() {
    let space = Virtual3DSpace::new(ARENA);

    assert!(space.is_position_valid(Vec3::new(0.0, 0.0, 5.0)));
    assert!(space.is_position_valid(Vec3::new(9.0, -9.0, 1.0)));

    assert!(!space.is_position_valid(Vec3::new(10.1, 0.0, 5.0)));
    assert!(!space.is_position_valid(Vec3::new(-10.1, 0.0, 5.0)));
    assert!(!space.is_position_valid(Vec3::new(0.0, 10.1, 5.0)));
    assert!(!space.is_position_valid(Vec3::new(0.0, -10.1, 5.0)));
    assert!(!space.is_position_valid(Vec3::new(0.0, 0.0, -0.1)));
    assert!(!space.is_position_valid(Vec3::new(0.0, 0.0, 10.1)));
}

#[test]
fn test_collision_symmetry() {
    let mut space = Virtual3DSpace::new(ARENA);
    space.add_obstacle(Obstacle::fixed(
        "box_1",
        ObstacleKind::Column,
        Vec3::new(3.0, 3.0, 0.5),
        Vec3::new(1.0, 1.0, 1.0),
    ));

    // Dead center: must collide.
    assert_eq!(space.check_collision(Vec3::new(3.0, 3.0, 0.5)), Some("box_1"));
    // Touching faces count: obstacle max x = 3.5, drone min x = 3.7 - 0.2.
    assert_eq!(space.check_collision(Vec3::new(3.7, 3.0, 0.5)), Some("box_1"));
    // Clearly separated: no overlap.
    assert_eq!(space.check_collision(Vec3::new(3.8, 3.0, 0.5)), None);
    assert_eq!(space.check_collision(Vec3::new(3.0, 3.0, 3.0)), None);
}

#[test]
fn test_safe_landing_positions_are_valid() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let space = scenario::build_space(&scenario::warehouse()).unwrap();

    let points = space.safe_landing_positions(&mut rng, 8);
    assert!(points.len() <= 8);
    assert!(!points.is_empty(), "an open warehouse should have landing room");
    for p in &points {
        assert!(space.is_position_valid(*p), "sampled point {p:?} is not valid");
        assert_eq!(p.z, 0.5);
    }
}

// ---- State machine legality ----

#[test]
fn test_takeoff_requires_idle() {
    let sim = test_drone("alpha");
    sim.takeoff().unwrap();
    assert_eq!(sim.flight_state(), FlightState::Takeoff);

    // Second takeoff while climbing is rejected without side effects.
    let err = sim.takeoff().unwrap_err();
    assert!(matches!(err, CommandError::InvalidState { command: "takeoff", .. }));
}

#[test]
fn test_takeoff_rejected_below_battery_minimum() {
    let sim = DroneSimulator::with_bounds(
        "lowbat",
        ARENA,
        DroneConfig {
            initial_battery: 5.0,
            ..DroneConfig::default()
        },
    );

    let err = sim.takeoff().unwrap_err();
    assert!(matches!(err, CommandError::LowBattery { .. }));
    assert_eq!(sim.flight_state(), FlightState::Idle);
    assert_eq!(sim.target(), None);
}

#[test]
fn test_move_to_from_idle_rejected() {
    let sim = test_drone("idle-mover");
    let err = sim.move_to(Vec3::new(1.0, 1.0, 1.0)).unwrap_err();
    assert!(matches!(err, CommandError::InvalidState { .. }));
    assert_eq!(sim.target(), None);
    assert!(sim.flight_path().is_empty());
}

#[test]
fn test_land_requires_airborne_state() {
    let sim = test_drone("grounded");
    assert!(matches!(
        sim.land(),
        Err(CommandError::InvalidState { command: "land", .. })
    ));

    sim.takeoff().unwrap();
    // Landing straight out of the climb is allowed.
    sim.land().unwrap();
    assert_eq!(sim.flight_state(), FlightState::Landing);
}

#[test]
fn test_rotate_requires_flying() {
    let sim = test_drone("rotator");
    assert!(sim.rotate_to_yaw(90.0).is_err());

    let sim = flying_drone("rotator2");
    sim.rotate_to_yaw(450.0).unwrap();
    assert_eq!(sim.state().rotation.z, 90.0);
}

// ---- Flight dynamics through the full command surface ----

#[test]
fn test_takeoff_climbs_to_altitude_and_transitions() {
    let sim = test_drone("climber");
    sim.takeoff().unwrap();

    // A few simulated seconds to climb 1.5 m and settle.
    run_ticks(&sim, 800);

    let z = sim.current_position().z;
    assert!((z - 1.5).abs() < 0.1, "altitude should settle near 1.5, got {z:.3}");
    assert_eq!(sim.flight_state(), FlightState::Flying);
    assert!(sim.current_velocity().length() < 0.2);
}

#[test]
fn test_move_to_reaches_target() {
    let sim = flying_drone("mover");
    let target = Vec3::new(3.0, -2.0, 2.5);
    sim.move_to(target).unwrap();
    assert_eq!(sim.flight_path(), vec![target]);

    run_ticks(&sim, 2000);

    assert!((sim.current_position() - target).length() < 0.1);
    let stats = sim.statistics();
    assert!(stats.total_distance_traveled > 3.0);
    assert!(stats.total_flight_time_secs > 5.0);
}

#[test]
fn test_move_to_obstructed_target_rejected() {
    let sim = flying_drone("blocked");
    {
        let world = sim.world();
        world.write().unwrap().add_obstacle(Obstacle::fixed(
            "box_1",
            ObstacleKind::Column,
            Vec3::new(3.0, 3.0, 0.5),
            Vec3::new(1.0, 1.0, 1.0),
        ));
    }

    let before = sim.target();
    let err = sim.move_to(Vec3::new(3.0, 3.0, 0.5)).unwrap_err();
    assert!(matches!(err, CommandError::TargetObstructed { .. }));
    assert_eq!(sim.target(), before, "rejected command must not change the target");

    let err = sim.move_to(Vec3::new(50.0, 0.0, 5.0)).unwrap_err();
    assert!(matches!(err, CommandError::TargetOutOfBounds { .. }));
    assert_eq!(sim.target(), before);
}

#[test]
fn test_full_landing_cycle_returns_to_idle() {
    let sim = flying_drone("lander");
    sim.land().unwrap();
    assert_eq!(sim.flight_state(), FlightState::Landing);

    // Descend, touch down, settle.
    run_ticks(&sim, 2000);

    assert_eq!(sim.flight_state(), FlightState::Idle);
    assert!(sim.current_position().z <= 0.2);
    assert_eq!(sim.current_velocity(), Vec3::ZERO);

    // The cycle can restart.
    sim.takeoff().unwrap();
    assert_eq!(sim.flight_state(), FlightState::Takeoff);
}

#[test]
fn test_emergency_land_is_unconditional() {
    let sim = flying_drone("aborter");
    sim.emergency_land();
    assert_eq!(sim.flight_state(), FlightState::Emergency);
    let target = sim.target().unwrap();
    assert_eq!(target.z, 0.0);

    run_ticks(&sim, 2000);
    assert_eq!(sim.flight_state(), FlightState::Idle);
}

// ---- Collision and battery emergencies ----

#[test]
fn test_collision_triggers_emergency_and_event() {
    let sim = flying_drone("crasher");
    let events = sim.subscribe();

    // Drop an obstacle right on top of the hovering drone.
    {
        let world = sim.world();
        world.write().unwrap().add_obstacle(Obstacle::fixed(
            "ambush",
            ObstacleKind::Column,
            sim.current_position(),
            Vec3::new(1.0, 1.0, 1.0),
        ));
    }

    run_ticks(&sim, 5);

    let stats = sim.statistics();
    assert!(stats.collision_count >= 1);
    assert_eq!(sim.flight_state(), FlightState::Emergency);

    let received: Vec<SimEvent> = events.try_iter().collect();
    assert!(
        received.iter().any(|e| matches!(
            e,
            SimEvent::Collision { obstacle_id, .. } if obstacle_id == "ambush"
        )),
        "collision event should have been pushed, got {received:?}"
    );
    assert!(received.iter().any(|e| matches!(
        e,
        SimEvent::StateChanged { to: FlightState::Collision, .. }
    )));
}

#[test]
fn test_collision_discards_offending_tick() {
    let sim = flying_drone("wall-runner");
    // Wall across the flight path; the far side target itself stays valid.
    {
        let world = sim.world();
        world.write().unwrap().add_obstacle(Obstacle::fixed(
            "pillar",
            ObstacleKind::Wall,
            Vec3::new(3.0, 0.0, 1.5),
            Vec3::new(0.5, 6.0, 3.0),
        ));
    }
    sim.move_to(Vec3::new(6.0, 0.0, 1.5)).unwrap();

    run_ticks(&sim, 2000);

    // The drone must have stopped short of the wall face, never inside it.
    let x = sim.current_position().x;
    assert!(x < 2.75 - 0.2 + 1e-9, "drone body ended up at x = {x:.3}, inside the wall");
    assert!(sim.statistics().collision_count >= 1);
}

#[test]
fn test_battery_exhaustion_forces_emergency() {
    let sim = DroneSimulator::with_bounds(
        "drained",
        ARENA,
        DroneConfig {
            physics: DronePhysics {
                // Burns out in roughly a second of hover.
                battery_drain_rate: 60.0,
                ..DronePhysics::default()
            },
            initial_battery: 100.0,
            ..DroneConfig::default()
        },
    );
    let events = sim.subscribe();
    sim.takeoff().unwrap();

    run_ticks(&sim, 400);

    assert_eq!(sim.battery_level(), 0.0);
    let received: Vec<SimEvent> = events.try_iter().collect();
    assert!(received
        .iter()
        .any(|e| matches!(e, SimEvent::BatteryEmpty { .. })));

    // Grounded with an empty battery: the next takeoff is rejected.
    run_ticks(&sim, 2000);
    assert_eq!(sim.flight_state(), FlightState::Idle);
    assert!(matches!(sim.takeoff(), Err(CommandError::LowBattery { .. })));
}

#[test]
fn test_battery_not_drained_while_grounded() {
    let sim = test_drone("parked");
    run_ticks(&sim, 1000);
    assert_eq!(sim.battery_level(), 100.0);
    assert_eq!(sim.statistics().total_flight_time_secs, 0.0);
}

// ---- Fleet management ----

#[test]
fn test_fleet_rejects_duplicate_and_out_of_bounds() {
    let mut fleet = DroneFleet::new(ARENA);
    fleet.add_drone("alpha", Vec3::ZERO).unwrap();

    assert!(matches!(
        fleet.add_drone("alpha", Vec3::ZERO),
        Err(FleetError::DuplicateDrone(_))
    ));
    assert!(matches!(
        fleet.add_drone("bravo", Vec3::new(100.0, 0.0, 0.0)),
        Err(FleetError::SpawnOutOfBounds { .. })
    ));
    assert_eq!(fleet.len(), 1);
}

#[test]
fn test_fleet_dispatch_routes_to_one_drone() {
    let mut fleet = DroneFleet::new(ARENA);
    fleet.add_drone("alpha", Vec3::new(-2.0, 0.0, 0.0)).unwrap();
    fleet.add_drone("bravo", Vec3::new(2.0, 0.0, 0.0)).unwrap();

    fleet.dispatch("alpha", DroneCommand::Takeoff).unwrap();
    let alpha = fleet.drone("alpha").unwrap();
    assert_eq!(alpha.drone_id(), "alpha");
    assert_eq!(alpha.flight_state(), FlightState::Takeoff);
    assert_eq!(fleet.drone("bravo").unwrap().flight_state(), FlightState::Idle);

    assert!(matches!(
        fleet.dispatch("charlie", DroneCommand::Takeoff),
        Err(FleetError::UnknownDrone(_))
    ));
    // Command rejections propagate as fleet errors.
    assert!(matches!(
        fleet.dispatch("bravo", DroneCommand::Land),
        Err(FleetError::Command(CommandError::InvalidState { .. }))
    ));
}

#[test]
fn test_fleet_shares_one_obstacle_registry() {
    let mut fleet = DroneFleet::new(ARENA);
    fleet.add_drone("alpha", Vec3::new(-2.0, 0.0, 0.0)).unwrap();
    fleet.add_drone("bravo", Vec3::new(2.0, 0.0, 0.0)).unwrap();

    fleet.add_obstacle(Obstacle::fixed(
        "shared_box",
        ObstacleKind::Column,
        Vec3::new(0.0, 5.0, 1.0),
        Vec3::splat(2.0),
    ));

    for stats in fleet.statistics() {
        assert_eq!(stats.obstacle_count, 7, "drone {} sees a stale space", stats.drone_id);
    }

    assert!(fleet.remove_obstacle("shared_box"));
    assert!(!fleet.remove_obstacle("shared_box"));
    assert_eq!(fleet.snapshot().obstacle_count, 6);
}

#[test]
fn test_fleet_snapshot_ordering() {
    let mut fleet = DroneFleet::new(ARENA);
    fleet.add_drone("delta", Vec3::new(1.0, 1.0, 0.0)).unwrap();
    fleet.add_drone("alpha", Vec3::new(-1.0, -1.0, 0.0)).unwrap();

    let snapshot = fleet.snapshot();
    let ids: Vec<&str> = snapshot.drones.iter().map(|d| d.drone_id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "delta"], "snapshots are ordered by id");
    assert_eq!(fleet.drone_ids().collect::<Vec<_>>(), ids);

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(json.contains("\"idle\""));
}

#[test]
fn test_fleet_remove_drone() {
    let mut fleet = DroneFleet::new(ARENA);
    fleet.add_drone("alpha", Vec3::ZERO).unwrap();
    fleet.remove_drone("alpha").unwrap();
    assert!(fleet.is_empty());
    assert!(matches!(
        fleet.remove_drone("alpha"),
        Err(FleetError::UnknownDrone(_))
    ));
}

#[test]
fn test_fleet_background_loops() {
    let mut fleet = DroneFleet::new(ARENA);
    fleet.add_drone("alpha", Vec3::new(-2.0, 0.0, 0.0)).unwrap();
    fleet.add_drone("bravo", Vec3::new(2.0, 0.0, 0.0)).unwrap();
    fleet.dispatch("alpha", DroneCommand::Takeoff).unwrap();

    fleet.start_all();
    std::thread::sleep(std::time::Duration::from_millis(100));
    fleet.stop_all();

    let alpha = fleet.drone("alpha").unwrap();
    assert!(alpha.state().timestamp > 0.0);
    assert!(alpha.current_position().z > 0.0);
    // Idle drones tick as no-ops.
    assert_eq!(fleet.drone("bravo").unwrap().current_position().z, 0.0);
}
