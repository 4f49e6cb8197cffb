//! Position-hold control law.
//!
//! A PD controller (no integral term) that always drives straight toward the
//! current target: `thrust = kp·(target − position) + kd·(−velocity) +
//! gravity compensation`. It is a position holder, not a trajectory planner.

use skyfleet_core::constants::{CONTROL_KD, CONTROL_KP, GRAVITY};
use skyfleet_core::types::Vec3;

use crate::physics::DronePhysics;
use crate::state::DroneState3D;

/// Thrust that exactly cancels gravity for this airframe.
pub fn hover_thrust(physics: &DronePhysics) -> Vec3 {
    Vec3::new(0.0, 0.0, GRAVITY * physics.mass)
}

/// PD thrust command toward `target`. With no target, callers should use
/// [`hover_thrust`] directly.
pub fn position_hold_thrust(state: &DroneState3D, target: Vec3, physics: &DronePhysics) -> Vec3 {
    let error = target - state.position;
    CONTROL_KP * error - CONTROL_KD * state.velocity + hover_thrust(physics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsEngine;

    #[test]
    fn test_hover_thrust_magnitude() {
        let physics = DronePhysics::default();
        let thrust = hover_thrust(&physics);
        assert_eq!(thrust.x, 0.0);
        assert_eq!(thrust.y, 0.0);
        assert!((thrust.z - GRAVITY * physics.mass).abs() < 1e-12);
    }

    #[test]
    fn test_thrust_points_toward_target() {
        let physics = DronePhysics::default();
        let state = DroneState3D::at(Vec3::ZERO);
        let thrust = position_hold_thrust(&state, Vec3::new(5.0, 0.0, 0.0), &physics);
        assert!(thrust.x > 0.0);

        let thrust = position_hold_thrust(&state, Vec3::new(-5.0, 0.0, 0.0), &physics);
        assert!(thrust.x < 0.0);
    }

    /// Closed-loop climb: controller + physics converge on a target altitude
    /// without sustained overshoot.
    #[test]
    fn test_closed_loop_altitude_convergence() {
        let physics = DronePhysics::default();
        let engine = PhysicsEngine::new(physics);
        let mut state = DroneState3D::at(Vec3::ZERO);
        let target = Vec3::new(0.0, 0.0, 1.5);
        let dt = 0.01;

        for _ in 0..1000 {
            let thrust = position_hold_thrust(&state, target, &physics);
            state = engine.apply_forces(&state, thrust, dt);
        }

        assert!(
            (state.position.z - 1.5).abs() < 0.1,
            "altitude should settle near 1.5, got {:.3}",
            state.position.z
        );
        assert!(state.speed() < 0.1, "should be nearly stationary at hold");
    }

    /// The same loop converges laterally, not just vertically.
    #[test]
    fn test_closed_loop_lateral_convergence() {
        let physics = DronePhysics::default();
        let engine = PhysicsEngine::new(physics);
        let mut state = DroneState3D::at(Vec3::new(0.0, 0.0, 2.0));
        let target = Vec3::new(3.0, -2.0, 2.0);
        let dt = 0.01;

        for _ in 0..2000 {
            let thrust = position_hold_thrust(&state, target, &physics);
            state = engine.apply_forces(&state, thrust, dt);
        }

        assert!((state.position - target).length() < 0.1);
    }
}
