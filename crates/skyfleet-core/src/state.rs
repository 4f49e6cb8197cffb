//! State snapshots — the visible state of drones sent to consumers.

use serde::{Deserialize, Serialize};

use crate::enums::FlightState;
use crate::types::Vec3;

/// Point-in-time statistics for a single drone.
///
/// Built from the live simulator state on demand; all fields are plain
/// values, safe to hand across threads or serialize onto the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneStatistics {
    pub drone_id: String,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Battery level, 0–100 (%).
    pub battery_level: f64,
    pub flight_state: FlightState,
    /// Accumulated airborne time (seconds of simulation time).
    pub total_flight_time_secs: f64,
    /// Accumulated Euclidean distance traveled (meters).
    pub total_distance_traveled: f64,
    /// Number of collisions detected over the drone's lifetime.
    pub collision_count: u32,
    /// Obstacles currently registered in the drone's shared space.
    pub obstacle_count: usize,
}

/// Fleet-wide snapshot: every drone's statistics plus shared-space info.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub drones: Vec<DroneStatistics>,
    /// Obstacles registered in the shared space (boundaries included).
    pub obstacle_count: usize,
}
