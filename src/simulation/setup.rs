//! Scenario setup: classify spawn points and attach generators
//!
//! Runs once before the tick loop. In directional mode only the southern
//! spawn points produce traffic; every other spawn point still gets a
//! generator, with a rate of zero. Baseline mode activates every spawn point
//! with a fixed-interval generator.

use log::{debug, info, warn};
use std::sync::Arc;
use thiserror::Error;

use super::classifier::{Classification, SpawnClass, SpawnPointClassifier};
use super::destination::{DestinationError, DestinationSelector, DestinationTable};
use super::generator::SpawnGenerator;
use super::road_network::RoadNetwork;
use super::types::{
    LaneId, RoadId, SpawnPointId, DEFAULT_BASELINE_INTERVAL, DEFAULT_MARGIN_FRACTION,
    DEFAULT_TRAFFIC_LEVEL,
};

/// Errors that stop a scenario from being set up
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Destination(#[from] DestinationError),

    #[error("margin fraction {0} must be a finite value between 0 and 1")]
    InvalidMarginFraction(f32),

    #[error("traffic level {0} must be finite and non-negative")]
    InvalidTrafficLevel(f32),

    #[error("baseline interval {0} must be finite and positive")]
    InvalidBaselineInterval(f32),

    #[error("spawn point {0:?} is not part of the network")]
    UnknownSpawnPoint(SpawnPointId),
}

/// How spawn points are activated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenarioMode {
    /// Only southern spawn points generate traffic
    Directional,
    /// Every spawn point releases one vehicle per `interval` seconds
    Baseline { interval: f32 },
}

impl ScenarioMode {
    pub fn baseline() -> Self {
        ScenarioMode::Baseline {
            interval: DEFAULT_BASELINE_INTERVAL,
        }
    }
}

/// Tunable parameters of a scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioConfig {
    /// Vehicles per second per lane on active spawn points
    pub traffic_level: f32,
    /// Share of the spawn point Y-range treated as the southern boundary
    pub margin_fraction: f32,
    pub mode: ScenarioMode,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            traffic_level: DEFAULT_TRAFFIC_LEVEL,
            margin_fraction: DEFAULT_MARGIN_FRACTION,
            mode: ScenarioMode::Directional,
        }
    }
}

/// Active/inactive spawn point counts from one wiring pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WiringCounts {
    pub activated: usize,
    pub deactivated: usize,
}

/// What setup did to the network
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupReport {
    pub activated: usize,
    pub deactivated: usize,
    /// Classification threshold (directional mode only)
    pub threshold: Option<f32>,
    /// Active spawn lanes that belong to no road; destinations there are unconstrained
    pub orphan_lanes: Vec<LaneId>,
    /// (entry road, destination road) pairs with no connecting route
    pub unreachable: Vec<(RoadId, RoadId)>,
}

/// Attach a generator to every spawn point according to its class
///
/// Directional spawn points get `directional_rate`, all others a rate of zero.
/// Spawn points missing from the classification count as `Other`. Every
/// generator gets its own selector over one shared destination table.
pub fn wire(
    network: &mut RoadNetwork,
    classification: &Classification,
    directional_rate: f32,
) -> Result<WiringCounts, ScenarioError> {
    check_traffic_level(directional_rate)?;
    let table = Arc::new(DestinationTable::from_network(network)?);

    let assignments: Vec<(SpawnPointId, SpawnClass)> = network
        .spawn_points()
        .iter()
        .map(|sp| {
            let class = classification.class_of(sp.id).unwrap_or(SpawnClass::Other);
            debug!(
                "Spawn point {:?} at ({:.1}, {:.1}) on lane {:?}: {:?}",
                sp.id, sp.position.x, sp.position.y, sp.lane, class
            );
            (sp.id, class)
        })
        .collect();

    let mut counts = WiringCounts::default();
    for (spawn_id, class) in assignments {
        let rate = match class {
            SpawnClass::Directional => {
                counts.activated += 1;
                directional_rate
            }
            SpawnClass::Other => {
                counts.deactivated += 1;
                0.0
            }
        };
        let generator = SpawnGenerator::uniform(rate, DestinationSelector::new(Arc::clone(&table)));
        network
            .set_generator(spawn_id, generator)
            .map_err(|_| ScenarioError::UnknownSpawnPoint(spawn_id))?;
    }

    info!(
        "Activated: {}, Deactivated: {}",
        counts.activated, counts.deactivated
    );
    Ok(counts)
}

/// Attach a fixed-interval generator to every spawn point
pub fn wire_baseline(network: &mut RoadNetwork, interval: f32) -> Result<WiringCounts, ScenarioError> {
    check_baseline_interval(interval)?;
    let table = Arc::new(DestinationTable::from_network(network)?);

    let spawn_ids: Vec<SpawnPointId> = network.spawn_points().iter().map(|sp| sp.id).collect();
    for &spawn_id in &spawn_ids {
        let generator = SpawnGenerator::periodic(interval, DestinationSelector::new(Arc::clone(&table)));
        network
            .set_generator(spawn_id, generator)
            .map_err(|_| ScenarioError::UnknownSpawnPoint(spawn_id))?;
    }

    info!("Baseline spawn points: {} (one vehicle every {:.2}s)", spawn_ids.len(), interval);
    Ok(WiringCounts {
        activated: spawn_ids.len(),
        deactivated: 0,
    })
}

/// One-shot setup of a scenario on a constructed network
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioSetup {
    config: ScenarioConfig,
}

impl ScenarioSetup {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Classify spawn points and attach generators
    ///
    /// Every check runs before any generator is replaced, so a failed setup
    /// leaves the network untouched.
    pub fn apply(&self, network: &mut RoadNetwork) -> Result<SetupReport, ScenarioError> {
        let traffic_level = self.config.traffic_level;
        check_traffic_level(traffic_level)?;

        let selector = DestinationSelector::from_network(network)?;
        info!(
            "Setting up {:?} scenario: {} spawn points, {} destination roads",
            self.config.mode,
            network.spawn_point_count(),
            selector.table().destinations().len()
        );

        match self.config.mode {
            ScenarioMode::Directional => {
                let classifier = SpawnPointClassifier::new(self.config.margin_fraction)
                    .ok_or(ScenarioError::InvalidMarginFraction(self.config.margin_fraction))?;
                let classification = classifier.classify(network.spawn_points());
                if let Some(threshold) = classification.threshold {
                    debug!("Directional threshold: y >= {:.2}", threshold);
                }

                let active: Vec<LaneId> = network
                    .spawn_points()
                    .iter()
                    .filter(|sp| classification.is_directional(sp.id))
                    .map(|sp| sp.lane)
                    .collect();
                let (orphan_lanes, unreachable) = check_active_lanes(network, &selector, &active)?;

                let counts = wire(network, &classification, traffic_level)?;
                Ok(SetupReport {
                    activated: counts.activated,
                    deactivated: counts.deactivated,
                    threshold: classification.threshold,
                    orphan_lanes,
                    unreachable,
                })
            }
            ScenarioMode::Baseline { interval } => {
                check_baseline_interval(interval)?;

                let active: Vec<LaneId> = network.spawn_points().iter().map(|sp| sp.lane).collect();
                let (orphan_lanes, unreachable) = check_active_lanes(network, &selector, &active)?;

                let counts = wire_baseline(network, interval)?;
                Ok(SetupReport {
                    activated: counts.activated,
                    deactivated: counts.deactivated,
                    threshold: None,
                    orphan_lanes,
                    unreachable,
                })
            }
        }
    }
}

fn check_traffic_level(traffic_level: f32) -> Result<(), ScenarioError> {
    if !traffic_level.is_finite() || traffic_level < 0.0 {
        return Err(ScenarioError::InvalidTrafficLevel(traffic_level));
    }
    Ok(())
}

fn check_baseline_interval(interval: f32) -> Result<(), ScenarioError> {
    if !interval.is_finite() || interval <= 0.0 {
        return Err(ScenarioError::InvalidBaselineInterval(interval));
    }
    Ok(())
}

/// Fail on lanes with no possible destination, collect softer diagnostics
fn check_active_lanes(
    network: &RoadNetwork,
    selector: &DestinationSelector,
    lanes: &[LaneId],
) -> Result<(Vec<LaneId>, Vec<(RoadId, RoadId)>), ScenarioError> {
    let mut orphan_lanes = Vec::new();
    let mut checked_roads: Vec<RoadId> = Vec::new();
    let mut unreachable = Vec::new();

    for &lane_id in lanes {
        if !selector.check_lane(lane_id)? {
            warn!("Spawn lane {:?} is not part of any road", lane_id);
            orphan_lanes.push(lane_id);
            continue;
        }

        let Some(road_id) = selector.table().road_of_lane(lane_id) else {
            continue;
        };
        if checked_roads.contains(&road_id) {
            continue;
        }
        checked_roads.push(road_id);

        for dest in network.unreachable_destinations(road_id) {
            warn!("Destination road {:?} cannot be reached from road {:?}", dest, road_id);
            unreachable.push((road_id, dest));
        }
    }

    Ok((orphan_lanes, unreachable))
}
