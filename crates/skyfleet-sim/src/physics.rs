//! Drone force model and kinematic integration.
//!
//! `PhysicsEngine::apply_forces` is a pure function of
//! `(state, thrust, dt) → new state`: thrust clamping, gravity, quadratic
//! drag, semi-implicit Euler integration, speed cap, and battery drain.
//! It never fails — rejecting a bad new position (collision) is the
//! simulator's job.

use serde::{Deserialize, Serialize};

use skyfleet_core::constants::{
    AIR_DENSITY, DEFAULT_BATTERY_DRAIN_RATE, DEFAULT_DRAG_COEFFICIENT, DEFAULT_LIFT_COEFFICIENT,
    DEFAULT_MASS_KG, DEFAULT_MAX_ACCELERATION, DEFAULT_MAX_ANGULAR_VELOCITY, DEFAULT_MAX_SPEED,
    GRAVITY,
};
use skyfleet_core::types::Vec3;

use crate::state::DroneState3D;

/// Airframe parameters, fixed for a simulator's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DronePhysics {
    /// Airframe mass (kg).
    pub mass: f64,
    /// Speed cap (m/s).
    pub max_speed: f64,
    /// Acceleration cap (m/s²); bounds commanded thrust.
    pub max_acceleration: f64,
    /// Angular rate cap (deg/s). Yaw is set directly by commands, so this is
    /// carried for consumers rather than enforced by integration.
    pub max_angular_velocity: f64,
    /// Drag coefficient for the quadratic drag model.
    pub drag_coefficient: f64,
    /// Lift coefficient. Not used by the simplified force model.
    pub lift_coefficient: f64,
    /// Battery drain at hover (% per second); scales up with thrust.
    pub battery_drain_rate: f64,
}

impl Default for DronePhysics {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS_KG,
            max_speed: DEFAULT_MAX_SPEED,
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            max_angular_velocity: DEFAULT_MAX_ANGULAR_VELOCITY,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            lift_coefficient: DEFAULT_LIFT_COEFFICIENT,
            battery_drain_rate: DEFAULT_BATTERY_DRAIN_RATE,
        }
    }
}

impl DronePhysics {
    /// Largest thrust magnitude the airframe can produce (N).
    pub fn max_thrust(&self) -> f64 {
        self.max_acceleration * self.mass
    }
}

/// Applies the force model to advance a drone's kinematic state.
#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    physics: DronePhysics,
}

impl PhysicsEngine {
    pub fn new(physics: DronePhysics) -> Self {
        Self { physics }
    }

    pub fn physics(&self) -> &DronePhysics {
        &self.physics
    }

    /// Advance `state` by `dt` seconds under a commanded thrust vector.
    pub fn apply_forces(&self, state: &DroneState3D, thrust: Vec3, dt: f64) -> DroneState3D {
        let p = &self.physics;
        let max_thrust = p.max_thrust();
        let thrust = thrust.clamp_length_max(max_thrust);

        let gravity_force = Vec3::new(0.0, 0.0, -GRAVITY * p.mass);
        // Quadratic drag opposite the velocity: ½ρC_d|v|² in magnitude.
        let drag_force = -0.5 * AIR_DENSITY * p.drag_coefficient * state.velocity.length()
            * state.velocity;

        let total_force = thrust + gravity_force + drag_force;
        let acceleration = total_force / p.mass;

        let velocity = (state.velocity + acceleration * dt).clamp_length_max(p.max_speed);
        let position = state.position + velocity * dt;

        // Drain scales from 1x at zero thrust to 2x at full thrust.
        let thrust_ratio = if max_thrust > 0.0 {
            thrust.length() / max_thrust
        } else {
            0.0
        };
        let drain = p.battery_drain_rate * dt * (1.0 + thrust_ratio);
        let battery_level = (state.battery_level - drain).max(0.0);

        DroneState3D {
            position,
            velocity,
            acceleration,
            battery_level,
            timestamp: state.timestamp + dt,
            ..state.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfleet_core::enums::FlightState;

    fn engine() -> PhysicsEngine {
        PhysicsEngine::new(DronePhysics::default())
    }

    #[test]
    fn test_free_fall_without_thrust() {
        let engine = engine();
        let state = DroneState3D::at(Vec3::new(0.0, 0.0, 5.0));

        let next = engine.apply_forces(&state, Vec3::ZERO, 0.1);
        assert!(next.velocity.z < 0.0, "gravity should pull downward");
        assert!(next.position.z < 5.0);
    }

    #[test]
    fn test_hover_thrust_cancels_gravity() {
        let engine = engine();
        let state = DroneState3D::at(Vec3::new(0.0, 0.0, 2.0));
        let hover = Vec3::new(0.0, 0.0, GRAVITY * engine.physics().mass);

        let next = engine.apply_forces(&state, hover, 0.1);
        assert!(next.velocity.length() < 1e-9, "hover should hold velocity at zero");
        assert!((next.position.z - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_capped_under_excess_thrust() {
        let engine = engine();
        let mut state = DroneState3D::at(Vec3::ZERO);
        state.flight_state = FlightState::Flying;

        // Far more thrust than the clamp allows, for a long step.
        let thrust = Vec3::new(1e6, 0.0, 0.0);
        for dt in [0.01, 0.1, 0.5, 1.0] {
            let next = engine.apply_forces(&state, thrust, dt);
            assert!(
                next.velocity.length() <= engine.physics().max_speed + 1e-9,
                "speed {} exceeds cap for dt {dt}",
                next.velocity.length()
            );
            state = next;
        }
    }

    #[test]
    fn test_battery_monotonic_and_clamped() {
        let engine = engine();
        let mut state = DroneState3D::at(Vec3::ZERO);
        state.battery_level = 0.4;

        let thrust = Vec3::new(0.0, 0.0, engine.physics().max_thrust());
        let mut last = state.battery_level;
        for _ in 0..10_000 {
            state = engine.apply_forces(&state, thrust, 0.01);
            assert!(state.battery_level <= last);
            assert!(state.battery_level >= 0.0);
            last = state.battery_level;
        }
        assert_eq!(state.battery_level, 0.0);
    }

    #[test]
    fn test_higher_thrust_drains_faster() {
        let engine = engine();
        let state = DroneState3D::at(Vec3::ZERO);

        let idle = engine.apply_forces(&state, Vec3::ZERO, 1.0);
        let full = engine.apply_forces(
            &state,
            Vec3::new(0.0, 0.0, engine.physics().max_thrust()),
            1.0,
        );
        assert!(full.battery_level < idle.battery_level);
    }

    #[test]
    fn test_drag_opposes_motion() {
        let engine = engine();
        let mut state = DroneState3D::at(Vec3::ZERO);
        state.velocity = Vec3::new(5.0, 0.0, 0.0);

        // Hover thrust only: horizontal velocity must decay through drag.
        let hover = Vec3::new(0.0, 0.0, GRAVITY * engine.physics().mass);
        let next = engine.apply_forces(&state, hover, 0.1);
        assert!(next.velocity.x < 5.0);
        assert!(next.velocity.x > 0.0, "drag must not reverse motion in one step");
    }
}
