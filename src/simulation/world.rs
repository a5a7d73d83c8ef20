//! Headless spawn driver
//!
//! Ticks the generators attached during setup and tallies where vehicles
//! enter and where they are sent. Vehicle movement belongs to the external
//! simulation engine and is not modelled here.

use log::info;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::HashMap;

use super::destination::DestinationError;
use super::generator::SpawnSpec;
use super::road_network::RoadNetwork;
use super::types::{RoadId, SpawnPointId};

/// Running spawn statistics
#[derive(Debug, Clone, Default)]
pub struct SimStats {
    pub ticks: u64,
    pub total_spawned: usize,
    pub spawned_by_spawn_point: HashMap<SpawnPointId, usize>,
    pub spawned_by_destination: HashMap<RoadId, usize>,
    /// Spawns whose lane matched no road
    pub unconstrained: usize,
}

impl SimStats {
    fn record(&mut self, spec: &SpawnSpec) {
        self.total_spawned += 1;
        *self.spawned_by_spawn_point.entry(spec.spawn_point).or_default() += 1;
        *self
            .spawned_by_destination
            .entry(spec.destination.road())
            .or_default() += 1;
        if spec.destination.is_unconstrained() {
            self.unconstrained += 1;
        }
    }
}

/// A configured network plus the clock and RNG that drive its generators
pub struct SimWorld {
    pub network: RoadNetwork,

    /// Simulation time
    pub time: f32,

    pub stats: SimStats,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl SimWorld {
    fn new_internal(network: RoadNetwork, rng: Option<StdRng>) -> Self {
        Self {
            network,
            time: 0.0,
            stats: SimStats::default(),
            rng,
        }
    }

    pub fn new(network: RoadNetwork) -> Self {
        Self::new_internal(network, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(network: RoadNetwork, seed: u64) -> Self {
        Self::new_internal(network, Some(StdRng::seed_from_u64(seed)))
    }

    /// Advance the clock by one step and collect this step's spawns
    pub fn tick(&mut self, delta_secs: f32) -> Result<Vec<SpawnSpec>, DestinationError> {
        let specs = match &mut self.rng {
            Some(rng) => spawn_all(&self.network, self.time, delta_secs, rng)?,
            None => spawn_all(&self.network, self.time, delta_secs, &mut rand::rng())?,
        };

        for spec in &specs {
            self.stats.record(spec);
        }
        self.stats.ticks += 1;
        self.time += delta_secs;
        Ok(specs)
    }

    /// Log the spawn statistics
    pub fn log_summary(&self) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", self.time);
        info!("Ticks: {}", self.stats.ticks);
        info!("Total vehicles spawned: {}", self.stats.total_spawned);

        let active = self
            .network
            .spawn_points()
            .iter()
            .filter(|sp| sp.generator.as_ref().is_some_and(|g| g.rate() > 0.0))
            .count();
        info!(
            "Active spawn points: {}/{}",
            active,
            self.network.spawn_point_count()
        );

        for road in self.network.roads() {
            let count = self
                .stats
                .spawned_by_destination
                .get(&road.id)
                .copied()
                .unwrap_or(0);
            info!("  Destination {}: {}", road.name, count);
        }

        if self.stats.unconstrained > 0 {
            info!("Unconstrained destinations: {}", self.stats.unconstrained);
        }
    }
}

fn spawn_all<R: Rng + ?Sized>(
    network: &RoadNetwork,
    time: f32,
    delta_secs: f32,
    rng: &mut R,
) -> Result<Vec<SpawnSpec>, DestinationError> {
    let mut specs = Vec::new();
    for spawn_point in network.spawn_points() {
        if let Some(generator) = &spawn_point.generator {
            specs.extend(generator.act(spawn_point, time, delta_secs, rng)?);
        }
    }
    Ok(specs)
}
