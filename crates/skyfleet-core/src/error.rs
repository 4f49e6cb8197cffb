//! Error types for drone commands, fleet management, and scenario loading.
//!
//! Expected operational conditions (wrong state, low battery, bad target)
//! are ordinary `Err` values, never panics. Runtime collisions and battery
//! exhaustion are not errors at all — they surface as `SimEvent`s.

use thiserror::Error;

use crate::enums::FlightState;
use crate::types::Vec3;

/// A drone command was rejected before any state change.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    /// The command is not legal in the drone's current flight state.
    #[error("{command} rejected: drone is {state:?}")]
    InvalidState {
        command: &'static str,
        state: FlightState,
    },

    /// Battery below the takeoff minimum.
    #[error("battery at {level:.1}%, below the takeoff minimum of {min:.0}%")]
    LowBattery { level: f64, min: f64 },

    /// The requested target lies outside the arena volume.
    #[error("target ({:.2}, {:.2}, {:.2}) is outside the arena bounds", .target.x, .target.y, .target.z)]
    TargetOutOfBounds { target: Vec3 },

    /// The requested target overlaps an obstacle.
    #[error("target obstructed by obstacle `{obstacle_id}`")]
    TargetObstructed { obstacle_id: String },
}

/// A fleet-level operation failed.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("drone `{0}` is already registered")]
    DuplicateDrone(String),

    #[error("unknown drone `{0}`")]
    UnknownDrone(String),

    /// Initial position outside the shared space.
    #[error("spawn position for drone `{id}` is outside the arena bounds")]
    SpawnOutOfBounds { id: String },

    /// A dispatched command was rejected by the target drone.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// A scenario definition could not be loaded.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("scenario bounds must be positive, got ({:.2}, {:.2}, {:.2})", .bounds.x, .bounds.y, .bounds.z)]
    InvalidBounds { bounds: Vec3 },

    #[error("obstacle `{id}` has a non-positive size")]
    InvalidObstacleSize { id: String },
}
