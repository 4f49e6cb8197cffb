//! Drone commands sent from consumers (API layer, operator console) to the
//! simulation.
//!
//! Commands are validated against the drone's flight state before any state
//! changes; an invalid command is rejected whole with a `CommandError`.

use serde::{Deserialize, Serialize};

/// All commands a single drone accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DroneCommand {
    /// Climb from the ground to the standard takeoff altitude.
    Takeoff,
    /// Descend to the landing altitude at the current x/y position.
    Land,
    /// Abort everything and descend straight down. Never rejected.
    EmergencyLand,
    /// Steer toward a new target position. The control loop does the moving.
    MoveTo { x: f64, y: f64, z: f64 },
    /// Set the heading directly (degrees, 0 = North). Not physically
    /// integrated — yaw changes are instantaneous.
    RotateToYaw { yaw_deg: f64 },
}
