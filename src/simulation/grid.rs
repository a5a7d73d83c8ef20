//! Grid-shaped road networks
//!
//! Every row of intersections is crossed by an eastbound and a westbound
//! street, every column by a northbound and a southbound avenue. Each lane has
//! one spawn point where it enters the map.

use anyhow::{Context, Result};

use super::road_network::RoadNetwork;
use super::types::{Heading, Position, RoadId};

/// Dimensions of a grid network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    pub lane_width: f32,
    pub speed_limit: f32,
    pub lanes_per_road: usize,
    /// Gap between the two directions of travel
    pub median_size: f32,
    /// Distance between neighbouring intersections, and from the map edge
    pub distance_between: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 1,
            rows: 1,
            lane_width: 4.0,
            speed_limit: 25.0,
            lanes_per_road: 3,
            median_size: 1.0,
            distance_between: 150.0,
        }
    }
}

impl GridLayout {
    pub fn width(&self) -> f32 {
        (self.columns + 1) as f32 * self.distance_between
    }

    pub fn height(&self) -> f32 {
        (self.rows + 1) as f32 * self.distance_between
    }

    /// Lateral distance of lane `index` from its road's centre line
    pub fn lane_offset(&self, index: usize) -> f32 {
        self.median_size / 2.0 + self.lane_width * (index as f32 + 0.5)
    }

    fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            anyhow::bail!("Grid needs at least one row and one column");
        }
        if self.lanes_per_road == 0 {
            anyhow::bail!("Roads need at least one lane");
        }
        if !(self.lane_width > 0.0) || !(self.distance_between > 0.0) {
            anyhow::bail!("Lane width and intersection spacing must be positive");
        }
        if self.median_size < 0.0 {
            anyhow::bail!("Median size cannot be negative");
        }
        let half_carriageway = self.lane_offset(self.lanes_per_road - 1) + self.lane_width / 2.0;
        if half_carriageway * 2.0 >= self.distance_between {
            anyhow::bail!(
                "Roads ({:.1} wide) do not fit between intersections {:.1} apart",
                half_carriageway * 2.0,
                self.distance_between
            );
        }
        Ok(())
    }

    /// Build the network with every road as an eligible destination
    pub fn build(&self) -> Result<RoadNetwork> {
        self.validate()?;

        let mut network = RoadNetwork::new();
        let width = self.width();
        let height = self.height();

        let mut streets: Vec<(RoadId, RoadId)> = Vec::with_capacity(self.rows);
        for row in 0..self.rows {
            let center_y = (row + 1) as f32 * self.distance_between;
            let name = format!("{} Street", ordinal(row + 1));
            let east = network.add_road(road_name(&name, Heading::East), Heading::East, self.speed_limit);
            let west = network.add_road(road_name(&name, Heading::West), Heading::West, self.speed_limit);
            network.set_dual(east, west)?;

            for i in 0..self.lanes_per_road {
                let offset = self.lane_offset(i);
                self.add_lane_with_spawn(
                    &mut network,
                    east,
                    Position::new(0.0, center_y + offset),
                    Position::new(width, center_y + offset),
                )?;
                self.add_lane_with_spawn(
                    &mut network,
                    west,
                    Position::new(width, center_y - offset),
                    Position::new(0.0, center_y - offset),
                )?;
            }
            streets.push((east, west));
        }

        let mut avenues: Vec<(RoadId, RoadId)> = Vec::with_capacity(self.columns);
        for col in 0..self.columns {
            let center_x = (col + 1) as f32 * self.distance_between;
            let name = format!("{} Avenue", ordinal(col + 1));
            let north = network.add_road(road_name(&name, Heading::North), Heading::North, self.speed_limit);
            let south = network.add_road(road_name(&name, Heading::South), Heading::South, self.speed_limit);
            network.set_dual(north, south)?;

            for i in 0..self.lanes_per_road {
                let offset = self.lane_offset(i);
                self.add_lane_with_spawn(
                    &mut network,
                    north,
                    Position::new(center_x + offset, height),
                    Position::new(center_x + offset, 0.0),
                )?;
                self.add_lane_with_spawn(
                    &mut network,
                    south,
                    Position::new(center_x - offset, 0.0),
                    Position::new(center_x - offset, height),
                )?;
            }
            avenues.push((north, south));
        }

        // Every street crosses every avenue, and turns are allowed both ways
        for &(east, west) in &streets {
            for &(north, south) in &avenues {
                for street in [east, west] {
                    for avenue in [north, south] {
                        network.connect_roads(street, avenue)?;
                        network.connect_roads(avenue, street)?;
                    }
                }
            }
        }

        let destinations = network.roads().iter().map(|road| road.id).collect();
        network
            .set_destination_roads(destinations)
            .context("Failed to register grid destination roads")?;

        Ok(network)
    }

    fn add_lane_with_spawn(
        &self,
        network: &mut RoadNetwork,
        road_id: RoadId,
        start: Position,
        end: Position,
    ) -> Result<()> {
        let lane_id = network.add_lane(road_id, start, end, self.lane_width)?;
        network.add_spawn_point(lane_id, start)?;
        Ok(())
    }
}

fn road_name(base: &str, heading: Heading) -> String {
    format!("{} {}", base, heading.suffix())
}

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
