//! Fundamental geometric and simulation types.

use serde::{Deserialize, Serialize};

/// 3D vector in simulation space (meters, Cartesian).
/// x = East, y = North, z = Up (altitude).
///
/// Positions, velocities, accelerations, obstacle extents, and Euler
/// rotations all use this one value type. Serializes as `[x, y, z]`.
pub type Vec3 = glam::DVec3;

/// Horizontal distance between two points (ignoring altitude).
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// The point on the ground plane directly below `p`.
pub fn ground_below(p: Vec3) -> Vec3 {
    Vec3::new(p.x, p.y, 0.0)
}

/// Simulation time tracking for one drone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of ticks executed so far.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}
