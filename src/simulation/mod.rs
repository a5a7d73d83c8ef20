//! Directional traffic scenario module
//!
//! This module contains the scenario configuration logic: building a grid
//! network, deciding which spawn points generate traffic, and choosing
//! destinations for spawned vehicles. It runs without any simulation engine
//! attached.

mod classifier;
mod destination;
mod generator;
mod grid;
mod road_network;
mod setup;
mod types;
mod world;

pub use classifier::{Classification, SpawnClass, SpawnPointClassifier};
pub use destination::{DestinationChoice, DestinationError, DestinationSelector, DestinationTable};
pub use generator::{SpawnGenerator, SpawnSpec};
pub use grid::GridLayout;
pub use road_network::{RoadNetwork, SimLane, SimRoad, SpawnPoint};
pub use setup::{
    wire, wire_baseline, ScenarioConfig, ScenarioError, ScenarioMode, ScenarioSetup, SetupReport,
    WiringCounts,
};
pub use types::{
    Heading, LaneId, Position, RoadId, SimId, SpawnPointId, DEFAULT_BASELINE_INTERVAL,
    DEFAULT_MARGIN_FRACTION, DEFAULT_TRAFFIC_LEVEL, SPAWN_TIME_STEP, TIME_STEP,
};
pub use world::{SimStats, SimWorld};
