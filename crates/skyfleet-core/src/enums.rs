//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Drone flight-state machine.
///
/// The nominal cycle is `Idle → Takeoff → Flying → Landing → Landed → Idle`.
/// Any state can drop into `Emergency` or `Collision`; both descend to the
/// ground and settle back through `Landed` to `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightState {
    /// Powered off / on the ground, awaiting a takeoff command.
    #[default]
    Idle,
    /// Climbing to the commanded takeoff altitude.
    Takeoff,
    /// Airborne and accepting movement commands.
    Flying,
    /// Descending toward the commanded landing point.
    Landing,
    /// Touched down; settles back to `Idle` after a short delay.
    Landed,
    /// Emergency descent straight down (low battery, operator abort, collision).
    Emergency,
    /// Transient state recorded when a collision is detected; immediately
    /// followed by an emergency descent.
    Collision,
}

impl FlightState {
    /// Whether the drone is in the air in this state.
    pub fn is_airborne(self) -> bool {
        matches!(
            self,
            FlightState::Takeoff
                | FlightState::Flying
                | FlightState::Landing
                | FlightState::Emergency
                | FlightState::Collision
        )
    }

    /// Whether movement commands (`move_to`, `rotate_to_yaw`) are accepted.
    pub fn accepts_movement(self) -> bool {
        self == FlightState::Flying
    }
}

/// Obstacle category within a `Virtual3DSpace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Vertical boundary panel.
    Wall,
    /// Upper boundary panel.
    Ceiling,
    /// Lower boundary panel.
    Floor,
    /// Free-standing pillar or box inside the arena.
    Column,
    /// Moving obstacle; carries a velocity.
    Dynamic,
}
