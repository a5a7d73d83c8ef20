//! Core types for the scenario configurator
//!
//! These are standalone types shared by the network, the classifier and the
//! generators.

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for road IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadId(pub SimId);

/// A wrapper type for lane IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneId(pub SimId);

/// A wrapper type for spawn point IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnPointId(pub SimId);

/// Direction of travel along a road
///
/// Y grows downward, so a northbound road moves towards smaller Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    North,
    South,
    East,
    West,
}

impl Heading {
    /// Single-letter suffix used in road names
    pub fn suffix(self) -> &'static str {
        match self {
            Heading::North => "N",
            Heading::South => "S",
            Heading::East => "E",
            Heading::West => "W",
        }
    }
}

/// A 2D position in map coordinates (Y increases downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Simulation step of the external tick loop, in seconds
pub const TIME_STEP: f32 = 0.02;

/// Granularity at which uniform generators roll for new vehicles, in seconds
pub const SPAWN_TIME_STEP: f32 = TIME_STEP / 10.0;

/// Default vehicles per second per lane on active spawn points
pub const DEFAULT_TRAFFIC_LEVEL: f32 = 0.28;

/// Default share of the spawn point Y-range counted as the southern boundary
pub const DEFAULT_MARGIN_FRACTION: f32 = 0.1;

/// Default seconds between vehicles for baseline spawn points
pub const DEFAULT_BASELINE_INTERVAL: f32 = 1.0;
