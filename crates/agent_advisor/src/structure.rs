//! One-shot structure discovery: settlement and outpost census plus
//! host-reported generated structures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::AdvisorConfig;
use crate::env::{ActorQuery, AgentReading, Environment};
use crate::error::EnvError;
use crate::perf::PerformanceMonitor;
use crate::types::{markup, strip_namespace};

pub const SETTLEMENT_KEY: &str = "village";
pub const OUTPOST_KEY: &str = "outpost";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureFind {
    /// Notification key; each key is announced once per agent.
    pub key: String,
    pub message: String,
    /// Host-reported structures count toward the agent's discoveries.
    pub counts_as_discovery: bool,
}

pub struct StructureScanner<'a> {
    config: &'a AdvisorConfig,
}

impl<'a> StructureScanner<'a> {
    pub fn new(config: &'a AdvisorConfig) -> Self {
        Self { config }
    }

    /// Structures around the agent that are not in `notified` yet.
    pub fn scan<E: Environment + ?Sized>(
        &self,
        env: &E,
        reading: &AgentReading,
        notified: &BTreeSet<String>,
        perf: &mut PerformanceMonitor,
    ) -> Vec<StructureFind> {
        let mut finds = Vec::new();
        if let Err(err) = self.collect(env, reading, notified, &mut finds) {
            perf.record_error();
            debug!(
                agent_id = %reading.agent_id,
                error = %err,
                collected = finds.len(),
                "structure scan cut short"
            );
        }
        finds
    }

    fn collect<E: Environment + ?Sized>(
        &self,
        env: &E,
        reading: &AgentReading,
        notified: &BTreeSet<String>,
        finds: &mut Vec<StructureFind>,
    ) -> Result<(), EnvError> {
        let scan = &self.config.scan;
        let actors = &self.config.actors;
        let is_new = |key: &str, finds: &[StructureFind]| {
            !notified.contains(key) && finds.iter().all(|find| find.key != key)
        };

        if is_new(SETTLEMENT_KEY, finds.as_slice()) {
            let query = ActorQuery::around(reading.position, scan.structure_trader_radius)
                .of_kind(actors.trader_kind.clone());
            let traders = env.query_nearby_actors(&reading.dimension, &query)?;
            if traders.len() >= scan.structure_min_traders {
                finds.push(StructureFind {
                    key: SETTLEMENT_KEY.to_string(),
                    message: format!(
                        "{}[STRUCTURE] {}Village detected nearby - Trading opportunities available!",
                        markup::DARK_GREEN,
                        markup::GREEN
                    ),
                    counts_as_discovery: false,
                });
            }
        }

        if is_new(OUTPOST_KEY, finds.as_slice()) {
            let query = ActorQuery::around(reading.position, scan.raider_radius)
                .of_kind(actors.raider_kind.clone());
            let raiders = env.query_nearby_actors(&reading.dimension, &query)?;
            if raiders.len() >= scan.min_raiders {
                finds.push(StructureFind {
                    key: OUTPOST_KEY.to_string(),
                    message: format!(
                        "{}[STRUCTURE] {}Pillager Outpost detected - High danger zone!",
                        markup::RED,
                        markup::GOLD
                    ),
                    counts_as_discovery: false,
                });
            }
        }

        let structures = match env.query_structures(&reading.dimension, reading.position) {
            Ok(structures) => structures,
            Err(err) if err.is_unsupported() => return Ok(()),
            Err(err) => return Err(err),
        };
        for structure in structures {
            let name = strip_namespace(&structure).to_string();
            if !is_new(&name, finds.as_slice()) {
                continue;
            }
            let message = self
                .config
                .structures
                .get(&name)
                .cloned()
                .unwrap_or_else(|| format!("{}[DISCOVERY] {name} structure found", markup::GRAY));
            finds.push(StructureFind {
                key: name,
                message,
                counts_as_discovery: true,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CellPos, Vec3};
    use crate::memory_env::{InMemoryEnvironment, QueryKind};
    use crate::types::Dimension;

    fn setup() -> (AdvisorConfig, InMemoryEnvironment, AgentReading) {
        let mut env = InMemoryEnvironment::new();
        let reading = AgentReading::new("p1", Vec3::new(0.0, 64.0, 0.0));
        env.put_agent(reading.clone());
        (AdvisorConfig::default(), env, reading)
    }

    #[test]
    fn census_detects_settlement_and_outpost_once() {
        let (config, mut env, reading) = setup();
        for index in 0..3 {
            env.spawn_actor(
                Dimension::Overworld,
                &format!("v{index}"),
                "minecraft:villager",
                Vec3::new(80.0, 64.0, index as f64),
            );
        }
        env.spawn_actor(Dimension::Overworld, "r1", "minecraft:pillager", Vec3::new(140.0, 64.0, 0.0));
        env.spawn_actor(Dimension::Overworld, "r2", "minecraft:pillager", Vec3::new(0.0, 64.0, 140.0));

        let scanner = StructureScanner::new(&config);
        let mut perf = PerformanceMonitor::default();
        let finds = scanner.scan(&env, &reading, &BTreeSet::new(), &mut perf);
        let keys: Vec<&str> = finds.iter().map(|find| find.key.as_str()).collect();
        assert_eq!(keys, vec![SETTLEMENT_KEY, OUTPOST_KEY]);
        assert!(finds.iter().all(|find| !find.counts_as_discovery));

        let notified: BTreeSet<String> = keys.iter().map(|key| key.to_string()).collect();
        assert!(scanner.scan(&env, &reading, &notified, &mut perf).is_empty());
    }

    #[test]
    fn generated_structures_use_catalog_or_generic_message() {
        let (config, mut env, reading) = setup();
        env.add_structure(Dimension::Overworld, CellPos::new(0, 64, 0), 50.0, "minecraft:stronghold");
        env.add_structure(Dimension::Overworld, CellPos::new(10, 64, 0), 50.0, "minecraft:trail_ruins");
        env.add_structure(Dimension::Overworld, CellPos::new(5, 64, 0), 50.0, "minecraft:stronghold");

        let mut perf = PerformanceMonitor::default();
        let finds = StructureScanner::new(&config).scan(&env, &reading, &BTreeSet::new(), &mut perf);
        assert_eq!(finds.len(), 2);
        assert_eq!(finds[0].key, "stronghold");
        assert!(finds[0].message.contains("Portal to The End"));
        assert_eq!(finds[1].message, "§7[DISCOVERY] trail_ruins structure found");
        assert!(finds.iter().all(|find| find.counts_as_discovery));
    }

    #[test]
    fn quiet_surroundings_find_nothing_and_failures_are_counted() {
        let (config, mut env, reading) = setup();
        let mut perf = PerformanceMonitor::default();
        assert!(StructureScanner::new(&config)
            .scan(&env, &reading, &BTreeSet::new(), &mut perf)
            .is_empty());
        assert_eq!(perf.errors(), 0);

        env.fail(QueryKind::NearbyActors);
        StructureScanner::new(&config).scan(&env, &reading, &BTreeSet::new(), &mut perf);
        assert_eq!(perf.errors(), 1);
    }
}
