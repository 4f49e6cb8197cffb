//! Scenario definitions — obstacle layouts loadable from JSON, plus a few
//! built-in layouts for demos and tests.

use serde::{Deserialize, Serialize};

use skyfleet_core::enums::ObstacleKind;
use skyfleet_core::error::ScenarioError;
use skyfleet_core::types::Vec3;

use crate::space::{Obstacle, Virtual3DSpace};

/// A declarative arena description: bounds plus extra obstacles.
/// Boundary panels are always generated and never listed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    /// Full arena extents.
    pub bounds: Vec3,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl ScenarioSpec {
    fn validate(&self) -> Result<(), ScenarioError> {
        if self.bounds.x <= 0.0 || self.bounds.y <= 0.0 || self.bounds.z <= 0.0 {
            return Err(ScenarioError::InvalidBounds {
                bounds: self.bounds,
            });
        }
        for obstacle in &self.obstacles {
            if obstacle.size.x <= 0.0 || obstacle.size.y <= 0.0 || obstacle.size.z <= 0.0 {
                return Err(ScenarioError::InvalidObstacleSize {
                    id: obstacle.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Parse and validate a scenario from JSON.
pub fn parse(json: &str) -> Result<ScenarioSpec, ScenarioError> {
    let spec: ScenarioSpec = serde_json::from_str(json)?;
    spec.validate()?;
    Ok(spec)
}

/// Build a populated space from a scenario. Obstacle ids repeat boundary ids
/// at their own risk — last write wins, as everywhere else.
pub fn build_space(spec: &ScenarioSpec) -> Result<Virtual3DSpace, ScenarioError> {
    spec.validate()?;
    let mut space = Virtual3DSpace::new(spec.bounds);
    for obstacle in &spec.obstacles {
        space.add_obstacle(obstacle.clone());
    }
    Ok(space)
}

/// "Warehouse": a 20×20×10 hall with four support columns and scattered
/// crates at floor level.
pub fn warehouse() -> ScenarioSpec {
    let column_size = Vec3::new(0.8, 0.8, 10.0);
    let crate_size = Vec3::new(1.2, 1.2, 1.2);

    let mut obstacles = Vec::new();
    for (i, (x, y)) in [(-5.0, -5.0), (5.0, -5.0), (-5.0, 5.0), (5.0, 5.0)]
        .into_iter()
        .enumerate()
    {
        obstacles.push(Obstacle::fixed(
            format!("column_{}", i + 1),
            ObstacleKind::Column,
            Vec3::new(x, y, 5.0),
            column_size,
        ));
    }
    for (i, (x, y)) in [(2.0, -1.5), (-3.0, 2.0), (0.5, 6.0)].into_iter().enumerate() {
        obstacles.push(Obstacle::fixed(
            format!("crate_{}", i + 1),
            ObstacleKind::Column,
            Vec3::new(x, y, 0.6),
            crate_size,
        ));
    }

    ScenarioSpec {
        name: "warehouse".into(),
        bounds: Vec3::new(20.0, 20.0, 10.0),
        obstacles,
    }
}

/// "Patrol corridor": a long hall with one moving obstacle sweeping across
/// the middle.
pub fn patrol_corridor() -> ScenarioSpec {
    ScenarioSpec {
        name: "patrol_corridor".into(),
        bounds: Vec3::new(30.0, 10.0, 6.0),
        obstacles: vec![
            Obstacle::fixed(
                "divider",
                ObstacleKind::Wall,
                Vec3::new(0.0, 2.0, 1.5),
                Vec3::new(0.3, 6.0, 3.0),
            ),
            Obstacle::moving(
                "patrol_1",
                Vec3::new(-10.0, -2.5, 2.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(1.5, 0.0, 0.0),
            ),
        ],
    }
}
