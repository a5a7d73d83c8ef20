//! Destination selection for spawned vehicles
//!
//! A vehicle leaving an entry lane is sent to a uniformly random eligible
//! destination road, never to the dual of the road it entered on. Candidate
//! lists are computed once per road when the table is built, so each call is a
//! single uniform draw and always terminates.

use log::{debug, warn};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::road_network::RoadNetwork;
use super::types::{LaneId, RoadId};

/// Errors raised while choosing a destination
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestinationError {
    #[error("the network has no eligible destination roads")]
    EmptyDestinationSet,

    #[error("no eligible destination for vehicles entering on road {road:?}: every destination is its dual")]
    NoEligibleDestination { road: RoadId },
}

/// The outcome of a successful destination choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationChoice {
    /// Chosen with the dual of `origin` excluded
    Excluding { road: RoadId, origin: RoadId },
    /// The lane belongs to no known road, so nothing was excluded
    Unconstrained { road: RoadId, lane: LaneId },
}

impl DestinationChoice {
    /// The chosen destination road
    pub fn road(&self) -> RoadId {
        match *self {
            DestinationChoice::Excluding { road, .. } => road,
            DestinationChoice::Unconstrained { road, .. } => road,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, DestinationChoice::Unconstrained { .. })
    }
}

/// Read-only destination data derived from a network
#[derive(Debug)]
pub struct DestinationTable {
    /// The eligible destination set, in network order
    destinations: Vec<RoadId>,

    /// Owning road of every lane, found by scanning each road's lanes
    lane_to_road: HashMap<LaneId, RoadId>,

    /// Destinations other than the keyed road's dual or any road paired with it
    candidates: HashMap<RoadId, Vec<RoadId>>,
}

impl DestinationTable {
    /// Builds the table from the network's current destination set
    pub fn from_network(network: &RoadNetwork) -> Result<Self, DestinationError> {
        let destinations = network.destination_roads().to_vec();
        if destinations.is_empty() {
            return Err(DestinationError::EmptyDestinationSet);
        }

        let lane_to_road = network
            .roads()
            .iter()
            .flat_map(|road| road.lanes.iter().map(move |&lane| (lane, road.id)))
            .collect();

        let candidates = network
            .roads()
            .iter()
            .map(|road| {
                let eligible: Vec<RoadId> = destinations
                    .iter()
                    .copied()
                    .filter(|&dest| {
                        road.dual != Some(dest) && network.dual_of(dest) != Some(road.id)
                    })
                    .collect();
                (road.id, eligible)
            })
            .collect();

        Ok(Self {
            destinations,
            lane_to_road,
            candidates,
        })
    }

    pub fn destinations(&self) -> &[RoadId] {
        &self.destinations
    }

    pub fn road_of_lane(&self, lane_id: LaneId) -> Option<RoadId> {
        self.lane_to_road.get(&lane_id).copied()
    }

    /// Destinations a vehicle entering on `road_id` may be sent to
    pub fn candidates_for(&self, road_id: RoadId) -> &[RoadId] {
        self.candidates
            .get(&road_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Picks destination roads for vehicles leaving a given lane
#[derive(Debug, Clone)]
pub struct DestinationSelector {
    table: Arc<DestinationTable>,
}

impl DestinationSelector {
    pub fn new(table: Arc<DestinationTable>) -> Self {
        Self { table }
    }

    /// Create a selector with its own table built from the network
    pub fn from_network(network: &RoadNetwork) -> Result<Self, DestinationError> {
        Ok(Self::new(Arc::new(DestinationTable::from_network(network)?)))
    }

    pub fn table(&self) -> &DestinationTable {
        &self.table
    }

    /// Choose a destination for a vehicle entering on `lane_id`
    pub fn select_destination<R: Rng + ?Sized>(
        &self,
        lane_id: LaneId,
        rng: &mut R,
    ) -> Result<DestinationChoice, DestinationError> {
        match self.table.road_of_lane(lane_id) {
            Some(origin) => {
                let road = *self
                    .table
                    .candidates_for(origin)
                    .choose(rng)
                    .ok_or(DestinationError::NoEligibleDestination { road: origin })?;
                debug!("Lane {:?} on road {:?} -> destination {:?}", lane_id, origin, road);
                Ok(DestinationChoice::Excluding { road, origin })
            }
            None => {
                warn!(
                    "Lane {:?} is not part of any road, choosing destination without dual exclusion",
                    lane_id
                );
                let road = *self
                    .table
                    .destinations()
                    .choose(rng)
                    .ok_or(DestinationError::EmptyDestinationSet)?;
                Ok(DestinationChoice::Unconstrained { road, lane: lane_id })
            }
        }
    }

    /// Check that vehicles entering on `lane_id` have somewhere to go
    ///
    /// Returns `Ok(false)` when the lane belongs to no known road.
    pub fn check_lane(&self, lane_id: LaneId) -> Result<bool, DestinationError> {
        match self.table.road_of_lane(lane_id) {
            Some(origin) if self.table.candidates_for(origin).is_empty() => {
                Err(DestinationError::NoEligibleDestination { road: origin })
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }
}
