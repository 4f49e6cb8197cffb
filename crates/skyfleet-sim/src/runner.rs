//! Background simulation loop — one thread per drone.
//!
//! The loop measures wall-clock time since the last tick and steps the
//! simulator whenever at least one target tick interval has elapsed,
//! sleeping in 1 ms slices in between. Oversized gaps (a stalled or
//! descheduled thread) are clamped to `MAX_STEP_DT` rather than integrated
//! as one giant step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use skyfleet_core::constants::{LOOP_IDLE_SLEEP_MS, MAX_STEP_DT, SIMULATION_DT};

use crate::simulator::SimulatorCore;
use crate::space::Virtual3DSpace;

/// Spawn the simulation loop thread for one drone.
pub(crate) fn spawn_loop(
    drone_id: String,
    core: Arc<Mutex<SimulatorCore>>,
    world: Arc<RwLock<Virtual3DSpace>>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name(format!("skyfleet-sim-{drone_id}"))
        .spawn(move || run_loop(&core, &world, &running))
        .expect("failed to spawn simulation thread")
}

/// The loop body. Runs until `running` is cleared.
fn run_loop(core: &Mutex<SimulatorCore>, world: &RwLock<Virtual3DSpace>, running: &AtomicBool) {
    let mut last_tick = Instant::now();

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f64();

        if dt >= SIMULATION_DT {
            last_tick = now;
            let dt = dt.min(MAX_STEP_DT);
            // Lock order: core before world, same as the command methods.
            let mut core = core.lock().unwrap_or_else(PoisonError::into_inner);
            let world = world.read().unwrap_or_else(PoisonError::into_inner);
            core.update(dt, &world);
        } else {
            std::thread::sleep(Duration::from_millis(LOOP_IDLE_SLEEP_MS));
        }
    }
}
