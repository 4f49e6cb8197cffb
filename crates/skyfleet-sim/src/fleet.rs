//! Multi-drone management over one shared space.
//!
//! `DroneFleet` owns the `Virtual3DSpace` and every `DroneSimulator` flying
//! in it. All drones see the same obstacle registry; drones do not collide
//! with each other. Commands can be dispatched by drone id through the
//! serde-tagged `DroneCommand` surface, which is what the (external) API
//! layer drives.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use skyfleet_core::commands::DroneCommand;
use skyfleet_core::error::FleetError;
use skyfleet_core::state::{DroneStatistics, FleetSnapshot};
use skyfleet_core::types::Vec3;

use crate::simulator::{DroneConfig, DroneSimulator};
use crate::space::{Obstacle, Virtual3DSpace};

/// A set of drones sharing one obstacle registry.
pub struct DroneFleet {
    world: Arc<RwLock<Virtual3DSpace>>,
    drones: BTreeMap<String, DroneSimulator>,
}

impl DroneFleet {
    /// Create a fleet over a fresh space with the given extents.
    pub fn new(bounds: Vec3) -> Self {
        Self::with_space(Virtual3DSpace::new(bounds))
    }

    /// Create a fleet over a pre-built space (e.g. loaded from a scenario).
    pub fn with_space(space: Virtual3DSpace) -> Self {
        Self {
            world: Arc::new(RwLock::new(space)),
            drones: BTreeMap::new(),
        }
    }

    /// Handle to the shared space.
    pub fn world(&self) -> Arc<RwLock<Virtual3DSpace>> {
        Arc::clone(&self.world)
    }

    /// Register a new drone at `initial_position` with default physics.
    pub fn add_drone(
        &mut self,
        drone_id: impl Into<String>,
        initial_position: Vec3,
    ) -> Result<&DroneSimulator, FleetError> {
        self.add_drone_with_config(
            drone_id,
            DroneConfig {
                initial_position,
                ..DroneConfig::default()
            },
        )
    }

    /// Register a new drone with explicit initial conditions.
    pub fn add_drone_with_config(
        &mut self,
        drone_id: impl Into<String>,
        config: DroneConfig,
    ) -> Result<&DroneSimulator, FleetError> {
        let drone_id = drone_id.into();
        if self.drones.contains_key(&drone_id) {
            return Err(FleetError::DuplicateDrone(drone_id));
        }

        let in_bounds = self
            .world
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .in_bounds(config.initial_position);
        if !in_bounds {
            return Err(FleetError::SpawnOutOfBounds { id: drone_id });
        }

        let simulator = DroneSimulator::new(drone_id.clone(), Arc::clone(&self.world), config);
        Ok(self.drones.entry(drone_id).or_insert(simulator))
    }

    /// Look up a drone by id.
    pub fn drone(&self, drone_id: &str) -> Option<&DroneSimulator> {
        self.drones.get(drone_id)
    }

    /// Stop and unregister a drone.
    pub fn remove_drone(&mut self, drone_id: &str) -> Result<(), FleetError> {
        match self.drones.remove(drone_id) {
            // Dropping the simulator stops its loop.
            Some(_) => Ok(()),
            None => Err(FleetError::UnknownDrone(drone_id.to_owned())),
        }
    }

    pub fn drone_ids(&self) -> impl Iterator<Item = &str> {
        self.drones.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.drones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    /// Start every drone's background loop.
    pub fn start_all(&self) {
        for drone in self.drones.values() {
            drone.start();
        }
    }

    /// Stop every drone's background loop.
    pub fn stop_all(&self) {
        for drone in self.drones.values() {
            drone.stop();
        }
    }

    /// Route a command to one drone.
    pub fn dispatch(&self, drone_id: &str, command: DroneCommand) -> Result<(), FleetError> {
        let drone = self
            .drones
            .get(drone_id)
            .ok_or_else(|| FleetError::UnknownDrone(drone_id.to_owned()))?;

        match command {
            DroneCommand::Takeoff => drone.takeoff()?,
            DroneCommand::Land => drone.land()?,
            DroneCommand::EmergencyLand => drone.emergency_land(),
            DroneCommand::MoveTo { x, y, z } => drone.move_to(Vec3::new(x, y, z))?,
            DroneCommand::RotateToYaw { yaw_deg } => drone.rotate_to_yaw(yaw_deg)?,
        }
        Ok(())
    }

    /// Statistics for every drone, ordered by id.
    pub fn statistics(&self) -> Vec<DroneStatistics> {
        self.drones.values().map(|d| d.statistics()).collect()
    }

    /// Fleet-wide snapshot for consumers.
    pub fn snapshot(&self) -> FleetSnapshot {
        let obstacle_count = self
            .world
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .obstacle_count();
        FleetSnapshot {
            drones: self.statistics(),
            obstacle_count,
        }
    }

    /// Insert an obstacle into the shared space.
    pub fn add_obstacle(&self, obstacle: Obstacle) {
        self.world
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_obstacle(obstacle);
    }

    /// Remove an obstacle from the shared space by id.
    pub fn remove_obstacle(&self, id: &str) -> bool {
        self.world
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove_obstacle(id)
    }
}

impl Drop for DroneFleet {
    fn drop(&mut self) {
        self.stop_all();
    }
}
