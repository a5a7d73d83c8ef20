//! Position-based classification of spawn points
//!
//! Spawn points are assumed to sit on the boundary of a grid with Y growing
//! downward. Those whose Y falls within the last `margin_fraction` of the
//! Y-range are the southern entrances.

use ordered_float::OrderedFloat;
use std::collections::HashMap;

use super::road_network::SpawnPoint;
use super::types::{SpawnPointId, DEFAULT_MARGIN_FRACTION};

/// Which group a spawn point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnClass {
    /// On the southern boundary, generates traffic
    Directional,
    Other,
}

/// Result of classifying a set of spawn points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Minimum Y a spawn point needs to count as directional.
    /// None when there were no spawn points.
    pub threshold: Option<f32>,
    pub classes: HashMap<SpawnPointId, SpawnClass>,
}

impl Classification {
    pub fn class_of(&self, spawn_id: SpawnPointId) -> Option<SpawnClass> {
        self.classes.get(&spawn_id).copied()
    }

    pub fn is_directional(&self, spawn_id: SpawnPointId) -> bool {
        self.class_of(spawn_id) == Some(SpawnClass::Directional)
    }

    pub fn directional_count(&self) -> usize {
        self.classes
            .values()
            .filter(|&&class| class == SpawnClass::Directional)
            .count()
    }

    pub fn other_count(&self) -> usize {
        self.classes.len() - self.directional_count()
    }
}

/// Splits spawn points into southern entrances and everything else
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPointClassifier {
    margin_fraction: f32,
}

impl Default for SpawnPointClassifier {
    fn default() -> Self {
        Self {
            margin_fraction: DEFAULT_MARGIN_FRACTION,
        }
    }
}

impl SpawnPointClassifier {
    /// Returns None unless `margin_fraction` is a finite value in [0, 1]
    pub fn new(margin_fraction: f32) -> Option<Self> {
        if margin_fraction.is_finite() && (0.0..=1.0).contains(&margin_fraction) {
            Some(Self { margin_fraction })
        } else {
            None
        }
    }

    pub fn margin_fraction(&self) -> f32 {
        self.margin_fraction
    }

    /// Y value at or beyond which a spawn point is directional
    pub fn threshold<I>(&self, ys: I) -> Option<f32>
    where
        I: IntoIterator<Item = f32>,
    {
        let (min_y, max_y) = ys.into_iter().map(OrderedFloat).fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((min_y, max_y)) => Some((min_y.min(y), max_y.max(y))),
        })?;
        let range = max_y.0 - min_y.0;
        Some(max_y.0 - range * self.margin_fraction)
    }

    /// Classify every spawn point by its Y coordinate
    pub fn classify(&self, spawn_points: &[SpawnPoint]) -> Classification {
        let Some(threshold) = self.threshold(spawn_points.iter().map(|sp| sp.position.y)) else {
            return Classification::default();
        };

        let classes = spawn_points
            .iter()
            .map(|sp| {
                let class = if sp.position.y >= threshold {
                    SpawnClass::Directional
                } else {
                    SpawnClass::Other
                };
                (sp.id, class)
            })
            .collect();

        Classification {
            threshold: Some(threshold),
            classes,
        }
    }
}
