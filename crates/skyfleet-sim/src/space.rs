//! The bounded 3D arena: obstacle registry and collision queries.
//!
//! `Virtual3DSpace` answers one question for the simulators that share it:
//! "is this point free?". Collision volumes are axis-aligned bounding boxes;
//! the `rotation` field on obstacles is carried for consumers but ignored by
//! the collision test.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use skyfleet_core::constants::{
    BOUNDARY_THICKNESS, DRONE_COLLISION_HALF_EXTENTS, SAFE_LANDING_ALTITUDE,
    SAFE_LANDING_ATTEMPTS_PER_POINT,
};
use skyfleet_core::enums::ObstacleKind;
use skyfleet_core::types::Vec3;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB centered at a point with the given half-extents.
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Overlap test. Touching boxes count as overlapping.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// A box-shaped region of space a drone may not enter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Unique within one space; inserting an existing id overwrites.
    pub id: String,
    pub kind: ObstacleKind,
    /// Center of the bounding box.
    pub position: Vec3,
    /// Full extents per axis; the box spans `position ± size/2`.
    pub size: Vec3,
    /// Euler angles (degrees). Ignored by collision — boxes stay axis-aligned.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_static")]
    pub is_static: bool,
    /// Velocity of a non-static obstacle (m/s).
    #[serde(default)]
    pub velocity: Vec3,
}

fn default_static() -> bool {
    true
}

impl Obstacle {
    /// A static obstacle with no rotation or velocity.
    pub fn fixed(id: impl Into<String>, kind: ObstacleKind, position: Vec3, size: Vec3) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            size,
            rotation: Vec3::ZERO,
            is_static: true,
            velocity: Vec3::ZERO,
        }
    }

    /// A moving obstacle.
    pub fn moving(id: impl Into<String>, position: Vec3, size: Vec3, velocity: Vec3) -> Self {
        Self {
            id: id.into(),
            kind: ObstacleKind::Dynamic,
            position,
            size,
            rotation: Vec3::ZERO,
            is_static: false,
            velocity,
        }
    }

    /// The obstacle's collision volume.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.size * 0.5)
    }
}

/// Bounded 3D arena with an obstacle registry.
///
/// The valid volume is `[-x/2, x/2] × [-y/2, y/2] × [0, z]` for bounds
/// `(x, y, z)`. Construction fences that volume with six boundary panels, so
/// a drone can never legally fly out of its declared space.
#[derive(Debug, Clone)]
pub struct Virtual3DSpace {
    bounds: Vec3,
    obstacles: HashMap<String, Obstacle>,
}

impl Virtual3DSpace {
    /// Create a space with the given full extents and its boundary panels.
    pub fn new(bounds: Vec3) -> Self {
        let mut space = Self {
            bounds,
            obstacles: HashMap::new(),
        };
        space.add_boundary_obstacles();
        space
    }

    fn add_boundary_obstacles(&mut self) {
        let b = self.bounds;
        let t = BOUNDARY_THICKNESS;
        let half_t = t / 2.0;
        let mid_z = b.z / 2.0;

        // The floor is recessed one drone half-height below the ground plane
        // so grounded and just-launched drones sit clear of it.
        let floor_z = -(half_t + DRONE_COLLISION_HALF_EXTENTS.z);

        let panels = [
            Obstacle::fixed(
                "boundary_floor",
                ObstacleKind::Floor,
                Vec3::new(0.0, 0.0, floor_z),
                Vec3::new(b.x, b.y, t),
            ),
            Obstacle::fixed(
                "boundary_ceiling",
                ObstacleKind::Ceiling,
                Vec3::new(0.0, 0.0, b.z + half_t),
                Vec3::new(b.x, b.y, t),
            ),
            Obstacle::fixed(
                "boundary_wall_north",
                ObstacleKind::Wall,
                Vec3::new(0.0, b.y / 2.0 + half_t, mid_z),
                Vec3::new(b.x, t, b.z),
            ),
            Obstacle::fixed(
                "boundary_wall_south",
                ObstacleKind::Wall,
                Vec3::new(0.0, -b.y / 2.0 - half_t, mid_z),
                Vec3::new(b.x, t, b.z),
            ),
            Obstacle::fixed(
                "boundary_wall_east",
                ObstacleKind::Wall,
                Vec3::new(b.x / 2.0 + half_t, 0.0, mid_z),
                Vec3::new(t, b.y, b.z),
            ),
            Obstacle::fixed(
                "boundary_wall_west",
                ObstacleKind::Wall,
                Vec3::new(-b.x / 2.0 - half_t, 0.0, mid_z),
                Vec3::new(t, b.y, b.z),
            ),
        ];

        for panel in panels {
            self.add_obstacle(panel);
        }
    }

    /// Full extents of the arena.
    pub fn bounds(&self) -> Vec3 {
        self.bounds
    }

    /// Insert an obstacle; an existing obstacle with the same id is replaced.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.insert(obstacle.id.clone(), obstacle);
    }

    /// Remove an obstacle by id. Returns whether it was present.
    pub fn remove_obstacle(&mut self, id: &str) -> bool {
        self.obstacles.remove(id).is_some()
    }

    /// Number of registered obstacles, boundary panels included.
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Look up an obstacle by id.
    pub fn obstacle(&self, id: &str) -> Option<&Obstacle> {
        self.obstacles.get(id)
    }

    /// Iterate over all registered obstacles.
    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.values()
    }

    /// Test a drone-sized box centered at `position` against every obstacle.
    /// Returns the id of the first overlapping obstacle, if any.
    pub fn check_collision(&self, position: Vec3) -> Option<&str> {
        self.check_collision_sized(position, DRONE_COLLISION_HALF_EXTENTS)
    }

    /// Collision test with explicit half-extents.
    pub fn check_collision_sized(&self, position: Vec3, half_extents: Vec3) -> Option<&str> {
        let body = Aabb::from_center(position, half_extents);
        self.obstacles
            .values()
            .find(|o| body.overlaps(&o.aabb()))
            .map(|o| o.id.as_str())
    }

    /// Whether `position` is inside the arena volume.
    pub fn in_bounds(&self, position: Vec3) -> bool {
        position.x.abs() <= self.bounds.x / 2.0
            && position.y.abs() <= self.bounds.y / 2.0
            && position.z >= 0.0
            && position.z <= self.bounds.z
    }

    /// Whether a drone could occupy `position`: in bounds and collision-free.
    pub fn is_position_valid(&self, position: Vec3) -> bool {
        self.in_bounds(position) && self.check_collision(position).is_none()
    }

    /// Rejection-sample up to `count` valid landing points just above the
    /// ground plane. May return fewer than `count` in crowded spaces.
    pub fn safe_landing_positions<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<Vec3> {
        let half_x = self.bounds.x / 2.0;
        let half_y = self.bounds.y / 2.0;
        let mut found = Vec::with_capacity(count);

        for _ in 0..count * SAFE_LANDING_ATTEMPTS_PER_POINT {
            if found.len() >= count {
                break;
            }
            let candidate = Vec3::new(
                rng.gen_range(-half_x..=half_x),
                rng.gen_range(-half_y..=half_y),
                SAFE_LANDING_ALTITUDE,
            );
            if self.is_position_valid(candidate) {
                found.push(candidate);
            }
        }

        found
    }

    /// Advance non-static obstacles by one step, reflecting off the arena
    /// faces so they stay inside.
    pub fn step_dynamic(&mut self, dt: f64) {
        let half_x = self.bounds.x / 2.0;
        let half_y = self.bounds.y / 2.0;
        let top = self.bounds.z;

        for obstacle in self.obstacles.values_mut() {
            if obstacle.is_static {
                continue;
            }
            obstacle.position += obstacle.velocity * dt;

            if obstacle.position.x.abs() > half_x {
                obstacle.position.x = obstacle.position.x.clamp(-half_x, half_x);
                obstacle.velocity.x = -obstacle.velocity.x;
            }
            if obstacle.position.y.abs() > half_y {
                obstacle.position.y = obstacle.position.y.clamp(-half_y, half_y);
                obstacle.velocity.y = -obstacle.velocity.y;
            }
            if obstacle.position.z < 0.0 || obstacle.position.z > top {
                obstacle.position.z = obstacle.position.z.clamp(0.0, top);
                obstacle.velocity.z = -obstacle.velocity.z;
            }
        }
    }
}

impl Default for Virtual3DSpace {
    fn default() -> Self {
        Self::new(skyfleet_core::constants::DEFAULT_SPACE_BOUNDS)
    }
}
