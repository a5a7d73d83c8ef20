//! Road network holding roads, lanes and spawn points
//!
//! Roads are nodes of a petgraph directed graph; an edge from one road to
//! another means a vehicle can turn from the first onto the second. The graph
//! is only used for reachability diagnostics, never for destination choice.

use anyhow::{Context, Result};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

use super::generator::SpawnGenerator;
use super::types::{Heading, LaneId, Position, RoadId, SimId, SpawnPointId};

/// A road: an ordered bundle of lanes travelling in one direction
#[derive(Debug, Clone)]
pub struct SimRoad {
    pub id: RoadId,
    pub name: String,
    pub heading: Heading,
    pub speed_limit: f32,
    /// Lanes from the centre line outwards
    pub lanes: Vec<LaneId>,
    /// The opposing road along the same edge, if any
    pub dual: Option<RoadId>,
}

/// A single lane segment owned by exactly one road
#[derive(Debug, Clone)]
pub struct SimLane {
    pub id: LaneId,
    pub road: RoadId,
    pub start: Position,
    pub end: Position,
    pub width: f32,
}

/// An entry point where vehicles are introduced into the network
#[derive(Debug, Clone)]
pub struct SpawnPoint {
    pub id: SpawnPointId,
    pub lane: LaneId,
    pub position: Position,
    /// Decides what the spawn point produces and how often
    pub generator: Option<SpawnGenerator>,
}

/// Road network used to configure a scenario
#[derive(Debug, Default)]
pub struct RoadNetwork {
    /// Road-to-road turning connections
    graph: DiGraph<RoadId, ()>,

    /// Maps road IDs to their node indices in the graph
    road_to_node: HashMap<RoadId, NodeIndex>,

    /// Roads in creation order
    roads: Vec<SimRoad>,

    /// Index into `roads` by ID
    road_index: HashMap<RoadId, usize>,

    lanes: HashMap<LaneId, SimLane>,

    /// Spawn points in creation order
    spawn_points: Vec<SpawnPoint>,

    /// Roads vehicles may use as their ultimate destination
    destination_roads: Vec<RoadId>,

    next_id: usize,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds an empty road to the network
    pub fn add_road(&mut self, name: impl Into<String>, heading: Heading, speed_limit: f32) -> RoadId {
        let id = RoadId(self.next_sim_id());
        let node_index = self.graph.add_node(id);
        self.road_to_node.insert(id, node_index);
        self.road_index.insert(id, self.roads.len());
        self.roads.push(SimRoad {
            id,
            name: name.into(),
            heading,
            speed_limit,
            lanes: Vec::new(),
            dual: None,
        });
        id
    }

    /// Appends a lane to a road
    pub fn add_lane(
        &mut self,
        road_id: RoadId,
        start: Position,
        end: Position,
        width: f32,
    ) -> Result<LaneId> {
        let index = *self
            .road_index
            .get(&road_id)
            .with_context(|| format!("Road {:?} not found", road_id))?;

        let id = LaneId(self.next_sim_id());
        self.roads[index].lanes.push(id);
        self.lanes.insert(
            id,
            SimLane {
                id,
                road: road_id,
                start,
                end,
                width,
            },
        );
        Ok(id)
    }

    /// Pairs two roads as each other's dual
    ///
    /// Any previous partner of either road loses its dual, so the relation
    /// stays symmetric.
    pub fn set_dual(&mut self, a: RoadId, b: RoadId) -> Result<()> {
        if a == b {
            anyhow::bail!("Road {:?} cannot be its own dual", a);
        }
        let a_index = *self.road_index.get(&a).context("First road not found")?;
        let b_index = *self.road_index.get(&b).context("Second road not found")?;

        for (index, partner) in [(a_index, b), (b_index, a)] {
            if let Some(stale) = self.roads[index].dual.filter(|&old| old != partner) {
                if let Some(&stale_index) = self.road_index.get(&stale) {
                    self.roads[stale_index].dual = None;
                }
            }
        }

        self.roads[a_index].dual = Some(b);
        self.roads[b_index].dual = Some(a);
        Ok(())
    }

    /// Adds a spawn point on a lane with no generator attached
    pub fn add_spawn_point(&mut self, lane_id: LaneId, position: Position) -> Result<SpawnPointId> {
        if !self.lanes.contains_key(&lane_id) {
            anyhow::bail!("Lane {:?} not found", lane_id);
        }
        let id = SpawnPointId(self.next_sim_id());
        self.spawn_points.push(SpawnPoint {
            id,
            lane: lane_id,
            position,
            generator: None,
        });
        Ok(id)
    }

    /// Records that vehicles on `from` can turn onto `to`
    pub fn connect_roads(&mut self, from: RoadId, to: RoadId) -> Result<()> {
        let from_node = *self
            .road_to_node
            .get(&from)
            .with_context(|| format!("Road {:?} not found", from))?;
        let to_node = *self
            .road_to_node
            .get(&to)
            .with_context(|| format!("Road {:?} not found", to))?;

        if self.graph.find_edge(from_node, to_node).is_none() {
            self.graph.add_edge(from_node, to_node, ());
        }
        Ok(())
    }

    /// Replaces the eligible destination set
    pub fn set_destination_roads(&mut self, roads: Vec<RoadId>) -> Result<()> {
        if let Some(missing) = roads.iter().find(|id| !self.road_index.contains_key(*id)) {
            anyhow::bail!("Destination road {:?} not found", missing);
        }
        let mut seen = HashSet::with_capacity(roads.len());
        if let Some(duplicate) = roads.iter().find(|&&id| !seen.insert(id)) {
            anyhow::bail!("Destination road {:?} listed more than once", duplicate);
        }
        self.destination_roads = roads;
        Ok(())
    }

    /// Gets a road by ID
    pub fn get_road(&self, road_id: RoadId) -> Option<&SimRoad> {
        self.road_index.get(&road_id).map(|&index| &self.roads[index])
    }

    /// Gets a lane by ID
    pub fn get_lane(&self, lane_id: LaneId) -> Option<&SimLane> {
        self.lanes.get(&lane_id)
    }

    /// The road owning a lane, or None if the lane is not part of the network
    pub fn road_of_lane(&self, lane_id: LaneId) -> Option<RoadId> {
        self.lanes.get(&lane_id).map(|lane| lane.road)
    }

    /// The dual of a road, if it has one
    pub fn dual_of(&self, road_id: RoadId) -> Option<RoadId> {
        self.get_road(road_id).and_then(|road| road.dual)
    }

    /// Get all roads in creation order
    pub fn roads(&self) -> &[SimRoad] {
        &self.roads
    }

    /// Get the eligible destination roads
    pub fn destination_roads(&self) -> &[RoadId] {
        &self.destination_roads
    }

    /// Get all spawn points in creation order
    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    pub fn spawn_point(&self, spawn_id: SpawnPointId) -> Option<&SpawnPoint> {
        self.spawn_points.iter().find(|sp| sp.id == spawn_id)
    }

    /// Replaces the generator attached to a spawn point
    pub fn set_generator(&mut self, spawn_id: SpawnPointId, generator: SpawnGenerator) -> Result<()> {
        let spawn_point = self
            .spawn_points
            .iter_mut()
            .find(|sp| sp.id == spawn_id)
            .with_context(|| format!("Spawn point {:?} not found", spawn_id))?;
        spawn_point.generator = Some(generator);
        Ok(())
    }

    /// Check whether a vehicle on `from` can eventually end up on `to`
    pub fn can_reach(&self, from: RoadId, to: RoadId) -> bool {
        if from == to {
            return true;
        }
        match (self.road_to_node.get(&from), self.road_to_node.get(&to)) {
            (Some(&from_node), Some(&to_node)) => {
                has_path_connecting(&self.graph, from_node, to_node, None)
            }
            _ => false,
        }
    }

    /// Destination roads (other than the dual of `from`) that `from` cannot reach
    pub fn unreachable_destinations(&self, from: RoadId) -> Vec<RoadId> {
        self.destination_roads
            .iter()
            .copied()
            .filter(|&dest| {
                self.dual_of(from) != Some(dest)
                    && self.dual_of(dest) != Some(from)
                    && !self.can_reach(from, dest)
            })
            .collect()
    }

    /// Get number of roads
    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    /// Get number of lanes
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Get number of spawn points
    pub fn spawn_point_count(&self) -> usize {
        self.spawn_points.len()
    }
}
