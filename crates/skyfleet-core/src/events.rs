//! Events pushed to subscribers when a drone's situation changes.
//!
//! Collision and battery emergencies are not surfaced as command errors —
//! they happen mid-flight, inside the simulation loop. Subscribers receive
//! them here instead of having to poll the flight state.

use serde::{Deserialize, Serialize};

use crate::enums::FlightState;
use crate::types::Vec3;

/// A state-change notification from one drone's simulation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// The flight-state machine moved to a new state.
    StateChanged {
        drone_id: String,
        from: FlightState,
        to: FlightState,
    },
    /// The drone's bounding box overlapped an obstacle. The offending tick
    /// was discarded; an emergency descent follows.
    Collision {
        drone_id: String,
        obstacle_id: String,
        position: Vec3,
    },
    /// Battery reached zero mid-flight; an emergency descent follows.
    BatteryEmpty { drone_id: String },
    /// A descending drone reached the ground and stopped.
    Touchdown { drone_id: String, position: Vec3 },
}

impl SimEvent {
    /// The drone this event belongs to.
    pub fn drone_id(&self) -> &str {
        match self {
            SimEvent::StateChanged { drone_id, .. }
            | SimEvent::Collision { drone_id, .. }
            | SimEvent::BatteryEmpty { drone_id }
            | SimEvent::Touchdown { drone_id, .. } => drone_id,
        }
    }
}
