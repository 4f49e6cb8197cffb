//! Single-drone simulator: command API, control loop tick, statistics.
//!
//! `DroneSimulator` owns one drone's state and shares a `Virtual3DSpace`
//! with the rest of its fleet. Commands validate against the flight-state
//! machine and fail closed; the actual movement happens in `update`, driven
//! either by the background thread (`start`) or directly by `step` in tests.
//!
//! Lock order is core before world, everywhere. The background loop, the
//! command methods, and the getters all follow it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use skyfleet_core::constants::{
    ALTITUDE_REACHED_TOLERANCE, LANDED_SETTLE_SECS, LANDING_TARGET_ALTITUDE,
    MAX_FLIGHT_PATH_POINTS, TAKEOFF_ALTITUDE_GAIN, TAKEOFF_MIN_BATTERY, TOUCHDOWN_MAX_ALTITUDE,
    TOUCHDOWN_MAX_SPEED,
};
use skyfleet_core::enums::FlightState;
use skyfleet_core::error::CommandError;
use skyfleet_core::events::SimEvent;
use skyfleet_core::state::DroneStatistics;
use skyfleet_core::types::{ground_below, SimTime, Vec3};

use crate::control;
use crate::physics::{DronePhysics, PhysicsEngine};
use crate::runner;
use crate::space::Virtual3DSpace;
use crate::state::DroneState3D;

/// Initial conditions for a simulated drone.
#[derive(Debug, Clone)]
pub struct DroneConfig {
    pub initial_position: Vec3,
    /// Starting battery level, 0–100 (%).
    pub initial_battery: f64,
    pub physics: DronePhysics,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            initial_position: Vec3::ZERO,
            initial_battery: 100.0,
            physics: DronePhysics::default(),
        }
    }
}

/// The mutable half of a simulator, guarded by one mutex.
pub(crate) struct SimulatorCore {
    drone_id: String,
    state: DroneState3D,
    engine: PhysicsEngine,
    target: Option<Vec3>,
    /// Commanded waypoints, newest last, capped.
    flight_path: Vec<Vec3>,
    time: SimTime,
    total_flight_secs: f64,
    total_distance: f64,
    collision_count: u32,
    /// Countdown from touchdown back to `Idle`.
    settle_remaining_secs: f64,
    subscribers: Vec<Sender<SimEvent>>,
}

impl SimulatorCore {
    fn new(drone_id: String, config: DroneConfig) -> Self {
        let mut state = DroneState3D::at(config.initial_position);
        state.battery_level = config.initial_battery.clamp(0.0, 100.0);
        Self {
            drone_id,
            state,
            engine: PhysicsEngine::new(config.physics),
            target: None,
            flight_path: Vec::new(),
            time: SimTime::default(),
            total_flight_secs: 0.0,
            total_distance: 0.0,
            collision_count: 0,
            settle_remaining_secs: 0.0,
            subscribers: Vec::new(),
        }
    }

    fn emit(&mut self, event: SimEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn transition(&mut self, to: FlightState) {
        let from = self.state.flight_state;
        if from == to {
            return;
        }
        debug!(drone_id = %self.drone_id, ?from, ?to, "flight state transition");
        self.state.flight_state = to;
        self.emit(SimEvent::StateChanged {
            drone_id: self.drone_id.clone(),
            from,
            to,
        });
    }

    fn validate_target(&self, world: &Virtual3DSpace, target: Vec3) -> Result<(), CommandError> {
        if !world.in_bounds(target) {
            return Err(CommandError::TargetOutOfBounds { target });
        }
        if let Some(obstacle_id) = world.check_collision(target) {
            return Err(CommandError::TargetObstructed {
                obstacle_id: obstacle_id.to_owned(),
            });
        }
        Ok(())
    }

    // --- Commands ---

    fn takeoff(&mut self, world: &Virtual3DSpace) -> Result<(), CommandError> {
        if self.state.flight_state != FlightState::Idle {
            warn!(drone_id = %self.drone_id, state = ?self.state.flight_state, "takeoff rejected");
            return Err(CommandError::InvalidState {
                command: "takeoff",
                state: self.state.flight_state,
            });
        }
        if self.state.battery_level < TAKEOFF_MIN_BATTERY {
            warn!(drone_id = %self.drone_id, battery = self.state.battery_level, "takeoff rejected");
            return Err(CommandError::LowBattery {
                level: self.state.battery_level,
                min: TAKEOFF_MIN_BATTERY,
            });
        }

        let target = self.state.position + Vec3::new(0.0, 0.0, TAKEOFF_ALTITUDE_GAIN);
        self.validate_target(world, target)?;

        self.target = Some(target);
        self.transition(FlightState::Takeoff);
        Ok(())
    }

    fn land(&mut self) -> Result<(), CommandError> {
        if !matches!(
            self.state.flight_state,
            FlightState::Flying | FlightState::Takeoff
        ) {
            warn!(drone_id = %self.drone_id, state = ?self.state.flight_state, "land rejected");
            return Err(CommandError::InvalidState {
                command: "land",
                state: self.state.flight_state,
            });
        }

        let p = self.state.position;
        self.target = Some(Vec3::new(p.x, p.y, LANDING_TARGET_ALTITUDE));
        self.transition(FlightState::Landing);
        Ok(())
    }

    fn emergency_land(&mut self) {
        self.target = Some(ground_below(self.state.position));
        self.transition(FlightState::Emergency);
    }

    fn move_to(&mut self, world: &Virtual3DSpace, target: Vec3) -> Result<(), CommandError> {
        if !self.state.flight_state.accepts_movement() {
            warn!(drone_id = %self.drone_id, state = ?self.state.flight_state, "move_to rejected");
            return Err(CommandError::InvalidState {
                command: "move_to",
                state: self.state.flight_state,
            });
        }
        self.validate_target(world, target)?;

        if self.flight_path.len() >= MAX_FLIGHT_PATH_POINTS {
            self.flight_path.remove(0);
        }
        self.flight_path.push(target);
        self.target = Some(target);
        Ok(())
    }

    fn rotate_to_yaw(&mut self, yaw_deg: f64) -> Result<(), CommandError> {
        if !self.state.flight_state.accepts_movement() {
            warn!(drone_id = %self.drone_id, state = ?self.state.flight_state, "rotate rejected");
            return Err(CommandError::InvalidState {
                command: "rotate_to_yaw",
                state: self.state.flight_state,
            });
        }
        // Instantaneous set; yaw is not integrated through the physics step.
        self.state.rotation.z = yaw_deg.rem_euclid(360.0);
        Ok(())
    }

    // --- Tick ---

    /// Advance the drone by `dt` seconds against the shared space.
    pub(crate) fn update(&mut self, dt: f64, world: &Virtual3DSpace) {
        match self.state.flight_state {
            FlightState::Idle => return,
            FlightState::Landed => {
                self.settle_remaining_secs -= dt;
                self.time.advance(dt);
                self.state.timestamp = self.time.elapsed_secs;
                if self.settle_remaining_secs <= 0.0 {
                    self.transition(FlightState::Idle);
                }
                return;
            }
            _ => {}
        }

        let thrust = match self.target {
            Some(target) => control::position_hold_thrust(&self.state, target, self.engine.physics()),
            None => control::hover_thrust(self.engine.physics()),
        };

        let next = self.engine.apply_forces(&self.state, thrust, dt);

        match world.check_collision(next.position) {
            Some(obstacle_id) => {
                // Discard the offending state; the drone keeps its last
                // committed position this tick.
                let obstacle_id = obstacle_id.to_owned();
                self.handle_collision(obstacle_id);
            }
            None => {
                self.total_distance += (next.position - self.state.position).length();
                self.total_flight_secs += dt;
                self.state = next;
            }
        }

        self.time.advance(dt);
        self.state.timestamp = self.time.elapsed_secs;

        if self.state.battery_level <= 0.0 && self.state.flight_state != FlightState::Emergency {
            self.handle_battery_empty();
        }

        self.apply_auto_transitions();
    }

    fn handle_collision(&mut self, obstacle_id: String) {
        warn!(drone_id = %self.drone_id, obstacle_id = %obstacle_id, "collision detected");
        self.state.velocity = Vec3::ZERO;
        self.state.acceleration = Vec3::ZERO;
        self.collision_count += 1;
        self.transition(FlightState::Collision);
        self.emit(SimEvent::Collision {
            drone_id: self.drone_id.clone(),
            obstacle_id,
            position: self.state.position,
        });
        self.emergency_land();
    }

    fn handle_battery_empty(&mut self) {
        warn!(drone_id = %self.drone_id, "battery exhausted, forcing emergency descent");
        self.emit(SimEvent::BatteryEmpty {
            drone_id: self.drone_id.clone(),
        });
        self.emergency_land();
    }

    fn apply_auto_transitions(&mut self) {
        match self.state.flight_state {
            FlightState::Takeoff => {
                if let Some(target) = self.target {
                    if (self.state.position.z - target.z).abs() < ALTITUDE_REACHED_TOLERANCE {
                        self.transition(FlightState::Flying);
                    }
                }
            }
            FlightState::Landing | FlightState::Emergency | FlightState::Collision => {
                if self.state.position.z <= TOUCHDOWN_MAX_ALTITUDE
                    && self.state.speed() <= TOUCHDOWN_MAX_SPEED
                {
                    self.state.velocity = Vec3::ZERO;
                    self.state.acceleration = Vec3::ZERO;
                    self.target = None;
                    self.settle_remaining_secs = LANDED_SETTLE_SECS;
                    self.transition(FlightState::Landed);
                    self.emit(SimEvent::Touchdown {
                        drone_id: self.drone_id.clone(),
                        position: self.state.position,
                    });
                }
            }
            _ => {}
        }
    }

    fn statistics(&self, obstacle_count: usize) -> DroneStatistics {
        DroneStatistics {
            drone_id: self.drone_id.clone(),
            position: self.state.position,
            velocity: self.state.velocity,
            battery_level: self.state.battery_level,
            flight_state: self.state.flight_state,
            total_flight_time_secs: self.total_flight_secs,
            total_distance_traveled: self.total_distance,
            collision_count: self.collision_count,
            obstacle_count,
        }
    }
}

/// One simulated drone with a background simulation loop.
pub struct DroneSimulator {
    drone_id: String,
    core: Arc<Mutex<SimulatorCore>>,
    world: Arc<RwLock<Virtual3DSpace>>,
    running: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl DroneSimulator {
    /// Create a drone sharing `world` with its fleet.
    pub fn new(
        drone_id: impl Into<String>,
        world: Arc<RwLock<Virtual3DSpace>>,
        config: DroneConfig,
    ) -> Self {
        let drone_id = drone_id.into();
        Self {
            core: Arc::new(Mutex::new(SimulatorCore::new(drone_id.clone(), config))),
            drone_id,
            world,
            running: Arc::new(AtomicBool::new(false)),
            thread: Mutex::new(None),
        }
    }

    /// Create a drone with its own private space of the given bounds.
    pub fn with_bounds(drone_id: impl Into<String>, bounds: Vec3, config: DroneConfig) -> Self {
        Self::new(
            drone_id,
            Arc::new(RwLock::new(Virtual3DSpace::new(bounds))),
            config,
        )
    }

    pub fn drone_id(&self) -> &str {
        &self.drone_id
    }

    /// Handle to the shared space (obstacle mutation goes through this).
    pub fn world(&self) -> Arc<RwLock<Virtual3DSpace>> {
        Arc::clone(&self.world)
    }

    fn lock_core(&self) -> MutexGuard<'_, SimulatorCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Commands ---

    /// Climb to the standard takeoff altitude above the current position.
    pub fn takeoff(&self) -> Result<(), CommandError> {
        let mut core = self.lock_core();
        let world = self.world.read().unwrap_or_else(PoisonError::into_inner);
        core.takeoff(&world)
    }

    /// Descend to the landing altitude at the current x/y position.
    pub fn land(&self) -> Result<(), CommandError> {
        self.lock_core().land()
    }

    /// Abort everything and descend straight down. Never fails.
    pub fn emergency_land(&self) {
        self.lock_core().emergency_land();
    }

    /// Steer toward `target`. The control loop does the moving.
    pub fn move_to(&self, target: Vec3) -> Result<(), CommandError> {
        let mut core = self.lock_core();
        let world = self.world.read().unwrap_or_else(PoisonError::into_inner);
        core.move_to(&world, target)
    }

    /// Set the heading (degrees, wrapped to [0, 360)).
    pub fn rotate_to_yaw(&self, yaw_deg: f64) -> Result<(), CommandError> {
        self.lock_core().rotate_to_yaw(yaw_deg)
    }

    // --- Observation ---

    pub fn current_position(&self) -> Vec3 {
        self.lock_core().state.position
    }

    pub fn current_velocity(&self) -> Vec3 {
        self.lock_core().state.velocity
    }

    pub fn battery_level(&self) -> f64 {
        self.lock_core().state.battery_level
    }

    pub fn flight_state(&self) -> FlightState {
        self.lock_core().state.flight_state
    }

    /// Full state snapshot.
    pub fn state(&self) -> DroneState3D {
        self.lock_core().state.clone()
    }

    /// The target the control law is currently steering toward.
    pub fn target(&self) -> Option<Vec3> {
        self.lock_core().target
    }

    /// Commanded waypoint history, oldest first.
    pub fn flight_path(&self) -> Vec<Vec3> {
        self.lock_core().flight_path.clone()
    }

    pub fn statistics(&self) -> DroneStatistics {
        let core = self.lock_core();
        let world = self.world.read().unwrap_or_else(PoisonError::into_inner);
        core.statistics(world.obstacle_count())
    }

    /// Subscribe to state-change events. Dropped receivers are pruned on the
    /// next emit.
    pub fn subscribe(&self) -> Receiver<SimEvent> {
        let (tx, rx) = mpsc::channel();
        self.lock_core().subscribers.push(tx);
        rx
    }

    // --- Execution ---

    /// Advance the simulation by one tick of `dt` seconds, synchronously.
    /// This is the deterministic path used by tests and lockstep drivers;
    /// don't mix it with a running background loop.
    pub fn step(&self, dt: f64) {
        let mut core = self.lock_core();
        let world = self.world.read().unwrap_or_else(PoisonError::into_inner);
        core.update(dt, &world);
    }

    /// Start the background simulation loop. Starting twice warns and no-ops.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!(drone_id = %self.drone_id, "simulation loop already running");
            return;
        }
        let handle = runner::spawn_loop(
            self.drone_id.clone(),
            Arc::clone(&self.core),
            Arc::clone(&self.world),
            Arc::clone(&self.running),
        );
        *self.thread.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Signal the background loop to exit and join it. Idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for DroneSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}
