//! Core types and definitions for the Skyfleet drone simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! commands, events, state snapshots, errors, and constants.
//! It has no dependency on any runtime machinery — the simulation engine
//! lives in `skyfleet-sim`.

pub mod commands;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
