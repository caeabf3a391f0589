//! Danger scoring for nearby actors, agent condition and hazardous terrain.

use tracing::debug;

use crate::cache::ExpiringCache;
use crate::catalog::{ActorCatalog, HazardClass};
use crate::config::{AdvisorConfig, ThresholdConfig};
use crate::env::{ActorQuery, AgentReading, Environment};
use crate::error::EnvError;
use crate::event::{sort_by_priority, EventKind, ScoredEvent};
use crate::geometry::{box_cells, space_distance, CellPos, Vec3};
use crate::perf::PerformanceMonitor;
use crate::types::{markup, strip_namespace, Dimension, Millis};

pub const MAX_DANGER: u8 = 100;

/// Terrain cache key: quantized cell within a dimension.
pub type TerrainKey = (Dimension, CellPos);
pub type TerrainCache = ExpiringCache<TerrainKey, String>;

/// Danger score of one actor, in `[0, 100]`.
///
/// Base by class (boss 100, hostile 60, passive danger 70), then a distance
/// band bonus, a low-health bonus and the catalog's per-kind bonus.
pub fn analyze_danger(
    catalog: &ActorCatalog,
    thresholds: &ThresholdConfig,
    kind: &str,
    distance: f64,
    agent_health: Option<f64>,
) -> u8 {
    let mut score: i64 = match catalog.classify(kind) {
        HazardClass::Boss => 100,
        HazardClass::Hostile => 60,
        HazardClass::PassiveDanger => 70,
        HazardClass::Unclassified => 0,
    };
    if distance < thresholds.critical_threat_distance {
        score += 40;
    } else if distance < thresholds.secondary_threat_distance {
        score += 20;
    }
    if agent_health
        .map(|health| health < thresholds.low_health)
        .unwrap_or(false)
    {
        score += 30;
    }
    score += i64::from(catalog.bonus(kind));
    score.clamp(0, i64::from(MAX_DANGER)) as u8
}

pub fn actor_message(kind: &str, danger: u8, distance: f64) -> String {
    let name = strip_namespace(kind).to_uppercase();
    let meters = distance.floor() as i64;
    if danger >= 90 {
        format!("{}[EXTREME DANGER] {name} - {meters}m - EVADE!", markup::DARK_RED)
    } else if danger >= 70 {
        format!(
            "{}[HIGH THREAT] {name} - {meters}m - Prepare to fight or flee",
            markup::RED
        )
    } else {
        format!("{}[THREAT] {name} detected - {meters}m away", markup::YELLOW)
    }
}

pub struct ThreatScorer<'a> {
    config: &'a AdvisorConfig,
}

impl<'a> ThreatScorer<'a> {
    pub fn new(config: &'a AdvisorConfig) -> Self {
        Self { config }
    }

    pub fn analyze_danger(&self, kind: &str, distance: f64, agent_health: Option<f64>) -> u8 {
        analyze_danger(
            &self.config.actors,
            &self.config.thresholds,
            kind,
            distance,
            agent_health,
        )
    }

    /// Hazardous terrain in the box around `position`, in scan order.
    pub fn detect_environmental_threats<E: Environment + ?Sized>(
        &self,
        env: &E,
        dimension: &Dimension,
        position: Vec3,
        terrain_cache: &mut TerrainCache,
        now: Millis,
    ) -> Result<Vec<ScoredEvent>, EnvError> {
        let scan = &self.config.scan;
        let mut threats = Vec::new();
        for cell in box_cells(position, scan.environment_radius, scan.environment_vertical) {
            let terrain = terrain_cache.get_or_load((dimension.clone(), cell), now, || {
                env.query_terrain_cell(dimension, cell)
            })?;
            let Some(terrain) = terrain else {
                continue;
            };
            if let Some(hazard) = self.config.terrain_hazards.get(&terrain) {
                threats.push(
                    ScoredEvent::new(EventKind::Environmental, hazard.priority, hazard.message.clone())
                        .with_source(terrain),
                );
            }
        }
        Ok(threats)
    }

    /// Full threat list for one agent, most urgent first.
    ///
    /// A failing query stops the scan; whatever was found before it is
    /// still returned and the failure is counted.
    pub fn scan_for_threats<E: Environment + ?Sized>(
        &self,
        env: &E,
        reading: &AgentReading,
        terrain_cache: &mut TerrainCache,
        perf: &mut PerformanceMonitor,
        now: Millis,
    ) -> Vec<ScoredEvent> {
        let mut threats = Vec::new();
        if let Err(err) = self.collect_threats(env, reading, terrain_cache, now, &mut threats) {
            if !err.is_unsupported() {
                perf.record_error();
            }
            debug!(
                agent_id = %reading.agent_id,
                error = %err,
                collected = threats.len(),
                "threat scan cut short"
            );
        }
        sort_by_priority(&mut threats);
        threats
    }

    fn collect_threats<E: Environment + ?Sized>(
        &self,
        env: &E,
        reading: &AgentReading,
        terrain_cache: &mut TerrainCache,
        now: Millis,
        threats: &mut Vec<ScoredEvent>,
    ) -> Result<(), EnvError> {
        let thresholds = &self.config.thresholds;
        let query = ActorQuery::around(reading.position, thresholds.max_threat_distance)
            .excluding(&self.config.actors.excluded_kinds);
        for actor in env.query_nearby_actors(&reading.dimension, &query)? {
            let distance = space_distance(actor.position, reading.position);
            let danger = self.analyze_danger(&actor.kind, distance, reading.health);
            if danger <= thresholds.threat_score_floor {
                debug!(
                    agent_id = %reading.agent_id,
                    kind = %actor.kind,
                    class = self.config.actors.classify(&actor.kind).as_str(),
                    danger,
                    "actor below threat floor"
                );
                continue;
            }
            threats.push(
                ScoredEvent::new(
                    EventKind::Actor,
                    i32::from(danger / 10),
                    actor_message(&actor.kind, danger, distance),
                )
                .with_distance(distance)
                .with_source(actor.kind),
            );
        }

        // Priority 10 ties with an actor scored 100; actors are collected
        // first, so the stable sort keeps the actor alert on top.
        if let Some(health) = reading.health {
            let shown = health.floor() as i64;
            if health <= thresholds.critical_health {
                threats.push(ScoredEvent::new(
                    EventKind::HealthCritical,
                    10,
                    format!(
                        "{}[CRITICAL] Health: {shown}/20 - HEAL IMMEDIATELY!",
                        markup::DARK_RED
                    ),
                ));
            } else if health <= thresholds.low_health {
                threats.push(ScoredEvent::new(
                    EventKind::HealthLow,
                    7,
                    format!(
                        "{}[WARNING] Health: {shown}/20 - Find safety and heal",
                        markup::RED
                    ),
                ));
            }
        }

        if reading.in_water {
            if let Some(breath) = reading.breath.as_ref() {
                if breath.air <= thresholds.low_air {
                    threats.push(ScoredEvent::new(
                        EventKind::Drowning,
                        9,
                        format!(
                            "{}[DROWNING] Air: {}/{} - SURFACE NOW!",
                            markup::AQUA,
                            breath.air,
                            breath.max_air
                        ),
                    ));
                }
            }
        }

        let environmental = self.detect_environmental_threats(
            env,
            &reading.dimension,
            reading.position,
            terrain_cache,
            now,
        )?;
        threats.extend(environmental);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Breath;
    use crate::memory_env::{InMemoryEnvironment, QueryKind};

    fn thresholds() -> ThresholdConfig {
        ThresholdConfig::default()
    }

    #[test]
    fn boss_is_always_maximal() {
        let catalog = ActorCatalog::default();
        for distance in [0.5, 5.0, 11.9, 500.0] {
            assert_eq!(
                analyze_danger(&catalog, &thresholds(), "minecraft:wither", distance, Some(20.0)),
                100
            );
        }
    }

    #[test]
    fn hostile_score_follows_distance_bands_and_bonuses() {
        let catalog = ActorCatalog::default();
        let t = thresholds();
        assert_eq!(analyze_danger(&catalog, &t, "minecraft:zombie", 10.0, Some(20.0)), 60);
        assert_eq!(analyze_danger(&catalog, &t, "minecraft:zombie", 6.0, Some(20.0)), 80);
        assert_eq!(analyze_danger(&catalog, &t, "minecraft:zombie", 3.0, Some(20.0)), 100);
        assert_eq!(analyze_danger(&catalog, &t, "minecraft:zombie", 10.0, Some(9.0)), 90);
        assert_eq!(analyze_danger(&catalog, &t, "minecraft:creeper", 10.0, Some(20.0)), 85);
        assert_eq!(analyze_danger(&catalog, &t, "minecraft:cow", 10.0, Some(20.0)), 0);
        assert_eq!(analyze_danger(&catalog, &t, "minecraft:cow", 2.0, None), 40);
    }

    #[test]
    fn critical_health_produces_threat_channel_alert() {
        let config = AdvisorConfig::default();
        let mut env = InMemoryEnvironment::new();
        let mut reading = AgentReading::new("p1", Vec3::new(0.5, 64.0, 0.5));
        reading.health = Some(5.0);
        env.put_agent(reading.clone());

        let mut cache = TerrainCache::new(config.cache.terrain_ttl_ms);
        let mut perf = PerformanceMonitor::default();
        let threats =
            ThreatScorer::new(&config).scan_for_threats(&env, &reading, &mut cache, &mut perf, 0);
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].kind, EventKind::HealthCritical);
        assert!(threats[0].message.contains("CRITICAL"));
        assert!(threats[0].message.contains('5'));
        assert_eq!(threats[0].kind.channel(), crate::cooldown::NotificationChannel::Threat);
    }

    #[test]
    fn low_scores_are_dropped_and_list_is_sorted() {
        let config = AdvisorConfig::default();
        let mut env = InMemoryEnvironment::new();
        let origin = Vec3::new(0.5, 64.0, 0.5);
        let mut reading = AgentReading::new("p1", origin);
        reading.in_water = true;
        reading.breath = Some(Breath {
            air: 10,
            max_air: 300,
        });
        env.put_agent(reading.clone());
        env.spawn_actor(Dimension::Overworld, "w", "minecraft:wither", Vec3::new(5.5, 64.0, 0.5));
        env.spawn_actor(Dimension::Overworld, "c", "minecraft:cow", Vec3::new(1.5, 64.0, 0.5));
        env.spawn_actor(Dimension::Overworld, "z", "minecraft:zombie", Vec3::new(20.5, 64.0, 0.5));
        env.set_terrain(Dimension::Overworld, CellPos::new(1, 63, 1), "minecraft:cactus");

        let mut cache = TerrainCache::new(config.cache.terrain_ttl_ms);
        let mut perf = PerformanceMonitor::default();
        let threats =
            ThreatScorer::new(&config).scan_for_threats(&env, &reading, &mut cache, &mut perf, 0);

        let kinds: Vec<EventKind> = threats.iter().map(|threat| threat.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Actor, EventKind::Drowning, EventKind::Environmental]
        );
        assert!(threats[0].message.starts_with("§4[EXTREME DANGER] WITHER - 5m"));
        assert!(threats[1].message.contains("Air: 10/300"));
        assert_eq!(perf.errors(), 0);
    }

    #[test]
    fn maximal_actor_outranks_critical_health_on_tie() {
        let config = AdvisorConfig::default();
        let mut env = InMemoryEnvironment::new();
        let mut reading = AgentReading::new("p1", Vec3::new(0.5, 64.0, 0.5));
        reading.health = Some(5.0);
        env.put_agent(reading.clone());
        env.spawn_actor(Dimension::Overworld, "z", "minecraft:zombie", Vec3::new(2.5, 64.0, 0.5));

        let mut cache = TerrainCache::new(config.cache.terrain_ttl_ms);
        let mut perf = PerformanceMonitor::default();
        let threats =
            ThreatScorer::new(&config).scan_for_threats(&env, &reading, &mut cache, &mut perf, 0);

        let ranked: Vec<(EventKind, i32)> =
            threats.iter().map(|threat| (threat.kind, threat.priority)).collect();
        assert_eq!(
            ranked,
            vec![(EventKind::Actor, 10), (EventKind::HealthCritical, 10)]
        );
        assert!(threats[0].message.starts_with("§4[EXTREME DANGER] ZOMBIE - 2m"));
    }

    #[test]
    fn failed_actor_query_is_counted_and_scan_stops() {
        let config = AdvisorConfig::default();
        let mut env = InMemoryEnvironment::new();
        let mut reading = AgentReading::new("p1", Vec3::default());
        reading.health = Some(8.0);
        env.put_agent(reading.clone());
        env.fail(QueryKind::NearbyActors);

        let mut cache = TerrainCache::new(config.cache.terrain_ttl_ms);
        let mut perf = PerformanceMonitor::default();
        let threats =
            ThreatScorer::new(&config).scan_for_threats(&env, &reading, &mut cache, &mut perf, 0);
        assert!(threats.is_empty());
        assert_eq!(perf.errors(), 1);
    }

    #[test]
    fn terrain_reads_are_served_from_cache_within_ttl() {
        let config = AdvisorConfig::default();
        let mut env = InMemoryEnvironment::new();
        let position = Vec3::new(0.5, 64.0, 0.5);
        env.set_terrain(Dimension::Overworld, CellPos::new(0, 64, 0), "minecraft:lava");
        env.set_terrain(Dimension::Overworld, CellPos::new(2, 65, -2), "minecraft:stone");

        let scorer = ThreatScorer::new(&config);
        let mut cache = TerrainCache::new(40);
        let first = scorer
            .detect_environmental_threats(&env, &Dimension::Overworld, position, &mut cache, 0)
            .expect("scan");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].priority, 10);
        let reads = env.terrain_queries();
        assert_eq!(reads, 75);

        scorer
            .detect_environmental_threats(&env, &Dimension::Overworld, position, &mut cache, 20)
            .expect("scan");
        // Only the 73 empty cells are re-read; the two occupied ones are cached.
        assert_eq!(env.terrain_queries(), reads + 73);

        scorer
            .detect_environmental_threats(&env, &Dimension::Overworld, position, &mut cache, 100)
            .expect("scan");
        assert_eq!(env.terrain_queries(), reads + 73 + 75);
    }
}
