//! Simulation constants and tuning parameters.

use crate::types::Vec3;

// --- Tick timing ---

/// Target simulation tick rate per drone (Hz).
pub const SIMULATION_TICK_RATE: u32 = 100;

/// Target seconds per simulation tick.
pub const SIMULATION_DT: f64 = 1.0 / SIMULATION_TICK_RATE as f64;

/// Sleep granularity of the background loop while waiting for the next tick.
pub const LOOP_IDLE_SLEEP_MS: u64 = 1;

/// Ceiling on a single integration step. A stalled thread resumes with one
/// clamped step instead of a huge catch-up step that would tunnel through
/// obstacles.
pub const MAX_STEP_DT: f64 = 0.1;

// --- Environment ---

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Air density at sea level (kg/m³), for the quadratic drag model.
pub const AIR_DENSITY: f64 = 1.225;

/// Default arena extents (meters): x and y centered on the origin, z from 0.
pub const DEFAULT_SPACE_BOUNDS: Vec3 = Vec3::new(20.0, 20.0, 10.0);

/// Thickness of the auto-generated boundary panels (meters).
pub const BOUNDARY_THICKNESS: f64 = 0.2;

// --- Drone airframe defaults ---

/// Default airframe mass (kg).
pub const DEFAULT_MASS_KG: f64 = 1.2;

/// Default speed cap (m/s).
pub const DEFAULT_MAX_SPEED: f64 = 10.0;

/// Default acceleration cap (m/s²); bounds commanded thrust. Must exceed
/// gravity or the airframe cannot hover.
pub const DEFAULT_MAX_ACCELERATION: f64 = 20.0;

/// Default angular rate cap (deg/s).
pub const DEFAULT_MAX_ANGULAR_VELOCITY: f64 = 180.0;

/// Default drag coefficient (dimensionless).
pub const DEFAULT_DRAG_COEFFICIENT: f64 = 0.3;

/// Default lift coefficient (dimensionless).
pub const DEFAULT_LIFT_COEFFICIENT: f64 = 1.2;

/// Default battery drain at hover (% per second).
pub const DEFAULT_BATTERY_DRAIN_RATE: f64 = 0.05;

/// Collision half-extents of the drone body (meters per axis).
pub const DRONE_COLLISION_HALF_EXTENTS: Vec3 = Vec3::new(0.2, 0.2, 0.1);

// --- Controller ---

/// Proportional gain of the position-hold controller.
pub const CONTROL_KP: f64 = 10.0;

/// Derivative gain of the position-hold controller.
pub const CONTROL_KD: f64 = 5.0;

// --- Flight procedures ---

/// Minimum battery level required for takeoff (%).
pub const TAKEOFF_MIN_BATTERY: f64 = 10.0;

/// Altitude gained by a takeoff command, relative to the current position (m).
pub const TAKEOFF_ALTITUDE_GAIN: f64 = 1.5;

/// Altitude tolerance for declaring the takeoff climb complete (m).
pub const ALTITUDE_REACHED_TOLERANCE: f64 = 0.05;

/// Target altitude of a normal landing approach (m).
pub const LANDING_TARGET_ALTITUDE: f64 = 0.1;

/// Altitude below which a descending drone is considered touched down (m).
pub const TOUCHDOWN_MAX_ALTITUDE: f64 = 0.15;

/// Speed below which a descending drone is considered touched down (m/s).
pub const TOUCHDOWN_MAX_SPEED: f64 = 0.2;

/// Seconds a drone stays in `Landed` before settling back to `Idle`.
pub const LANDED_SETTLE_SECS: f64 = 1.0;

// --- Flight path history ---

/// Maximum number of commanded waypoints retained per drone.
pub const MAX_FLIGHT_PATH_POINTS: usize = 256;

// --- Landing site sampling ---

/// Altitude at which candidate landing points are sampled (m).
pub const SAFE_LANDING_ALTITUDE: f64 = 0.5;

/// Rejection-sampling attempts allowed per requested landing point.
pub const SAFE_LANDING_ATTEMPTS_PER_POINT: usize = 10;
