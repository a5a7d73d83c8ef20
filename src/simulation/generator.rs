//! Spawn generators attached to spawn points
//!
//! The tick loop asks each spawn point's generator what to spawn during a
//! step; the generator decides how many vehicles and asks its destination
//! selector where each one goes.

use rand::Rng;

use super::destination::{DestinationChoice, DestinationError, DestinationSelector};
use super::road_network::SpawnPoint;
use super::types::{LaneId, SpawnPointId, SPAWN_TIME_STEP};

/// A request to introduce one vehicle into the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnSpec {
    pub spawn_time: f32,
    pub spawn_point: SpawnPointId,
    pub lane: LaneId,
    pub destination: DestinationChoice,
}

/// Decides whether and what a spawn point produces
#[derive(Debug, Clone)]
pub enum SpawnGenerator {
    /// Random arrivals at `traffic_level` vehicles per second
    Uniform {
        traffic_level: f32,
        selector: DestinationSelector,
    },
    /// One vehicle every `interval` seconds
    Periodic {
        interval: f32,
        selector: DestinationSelector,
    },
}

impl SpawnGenerator {
    pub fn uniform(traffic_level: f32, selector: DestinationSelector) -> Self {
        SpawnGenerator::Uniform {
            traffic_level,
            selector,
        }
    }

    pub fn periodic(interval: f32, selector: DestinationSelector) -> Self {
        SpawnGenerator::Periodic { interval, selector }
    }

    /// Vehicles per second this generator produces on average
    pub fn rate(&self) -> f32 {
        match self {
            SpawnGenerator::Uniform { traffic_level, .. } => *traffic_level,
            SpawnGenerator::Periodic { interval, .. } => {
                if *interval > 0.0 {
                    1.0 / interval
                } else {
                    0.0
                }
            }
        }
    }

    pub fn selector(&self) -> &DestinationSelector {
        match self {
            SpawnGenerator::Uniform { selector, .. } => selector,
            SpawnGenerator::Periodic { selector, .. } => selector,
        }
    }

    /// Vehicles to spawn at `spawn_point` during [time, time + time_step)
    pub fn act<R: Rng + ?Sized>(
        &self,
        spawn_point: &SpawnPoint,
        time: f32,
        time_step: f32,
        rng: &mut R,
    ) -> Result<Vec<SpawnSpec>, DestinationError> {
        let spawn_times = match self {
            SpawnGenerator::Uniform { traffic_level, .. } => {
                uniform_spawn_times(*traffic_level, time, time_step, rng)
            }
            SpawnGenerator::Periodic { interval, .. } => periodic_spawn_times(*interval, time, time_step),
        };

        let mut specs = Vec::with_capacity(spawn_times.len());
        for spawn_time in spawn_times {
            let destination = self.selector().select_destination(spawn_point.lane, rng)?;
            specs.push(SpawnSpec {
                spawn_time,
                spawn_point: spawn_point.id,
                lane: spawn_point.lane,
                destination,
            });
        }
        Ok(specs)
    }
}

/// Roll once per spawn sub-step with probability `traffic_level * SPAWN_TIME_STEP`
fn uniform_spawn_times<R: Rng + ?Sized>(
    traffic_level: f32,
    time: f32,
    time_step: f32,
    rng: &mut R,
) -> Vec<f32> {
    let prob = traffic_level * SPAWN_TIME_STEP;
    if prob <= 0.0 || time_step <= 0.0 {
        return Vec::new();
    }

    let sub_steps = (time_step / SPAWN_TIME_STEP).round().max(1.0) as u32;
    (0..sub_steps)
        .filter(|_| rng.random::<f32>() < prob)
        .map(|i| time + i as f32 * SPAWN_TIME_STEP)
        .collect()
}

/// Multiples of `interval` falling in [time, time + time_step)
fn periodic_spawn_times(interval: f32, time: f32, time_step: f32) -> Vec<f32> {
    if interval <= 0.0 || time_step <= 0.0 {
        return Vec::new();
    }

    let interval = interval as f64;
    let first = (time as f64 / interval).ceil() as u64;
    let end = ((time + time_step) as f64 / interval).ceil() as u64;
    (first..end).map(|k| (k as f64 * interval) as f32).collect()
}
