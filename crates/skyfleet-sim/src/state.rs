//! Live kinematic state of one simulated drone.

use serde::{Deserialize, Serialize};

use skyfleet_core::enums::FlightState;
use skyfleet_core::types::Vec3;

/// Full mutable state snapshot of a drone.
///
/// Owned by exactly one `DroneSimulator` and mutated only by its tick;
/// everyone else sees copies taken under the simulator's lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneState3D {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Euler angles in degrees: x = pitch, y = roll, z = yaw.
    /// Yaw is set directly by rotate commands — not physically integrated.
    pub rotation: Vec3,
    pub angular_velocity: Vec3,
    /// Battery level, 0–100 (%).
    pub battery_level: f64,
    pub flight_state: FlightState,
    /// Simulation time of the last update (seconds).
    pub timestamp: f64,
}

impl DroneState3D {
    /// A grounded, fully charged drone at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            rotation: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            battery_level: 100.0,
            flight_state: FlightState::Idle,
            timestamp: 0.0,
        }
    }

    /// Current speed (m/s).
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}
