//! Cubic scan for valuable terrain around an agent.

use crate::config::AdvisorConfig;
use crate::env::Environment;
use crate::error::EnvError;
use crate::event::{EventKind, ScoredEvent};
use crate::geometry::Vec3;
use crate::types::Dimension;

pub struct ResourceScanner<'a> {
    config: &'a AdvisorConfig,
}

impl<'a> ResourceScanner<'a> {
    pub fn new(config: &'a AdvisorConfig) -> Self {
        Self { config }
    }

    /// Every catalogued resource within the scan cube, rarest first.
    ///
    /// Terrain is read directly, bypassing the terrain cache. Equal rarity
    /// is broken by distance, nearest first.
    pub fn scan_for_resources<E: Environment + ?Sized>(
        &self,
        env: &E,
        dimension: &Dimension,
        position: Vec3,
    ) -> Result<Vec<ScoredEvent>, EnvError> {
        let radius = self.config.scan.resource_radius.max(0);
        let origin = position.cell();
        let mut finds = Vec::new();
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    let cell = origin.offset(dx, dy, dz);
                    let Some(terrain) = env.query_terrain_cell(dimension, cell)? else {
                        continue;
                    };
                    let Some(signature) = self.config.resources.get(&terrain) else {
                        continue;
                    };
                    let distance = (f64::from(dx).powi(2)
                        + f64::from(dy).powi(2)
                        + f64::from(dz).powi(2))
                    .sqrt();
                    finds.push(
                        ScoredEvent::new(EventKind::Resource, signature.rarity, signature.message.clone())
                            .with_distance(distance)
                            .with_source(terrain),
                    );
                }
            }
        }
        finds.sort_by(|left, right| {
            right.priority.cmp(&left.priority).then_with(|| {
                let left = left.distance.unwrap_or(f64::MAX);
                let right = right.distance.unwrap_or(f64::MAX);
                left.partial_cmp(&right).unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        Ok(finds)
    }
}
