//! Per-tick state snapshot of one agent.
//!
//! The builder starts from pessimistic defaults and overlays whatever the
//! host can report. A failed read bumps the error counter and leaves the
//! affected fields at their defaults; it never aborts the snapshot.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::ExpiringCache;
use crate::catalog::{ItemTag, ItemTagTable};
use crate::config::AdvisorConfig;
use crate::env::{ActorQuery, AgentReading, Environment, Inventory};
use crate::error::EnvError;
use crate::geometry::Vec3;
use crate::history::AgentHistory;
use crate::perf::PerformanceMonitor;
use crate::types::{strip_namespace, Dimension, Millis};

pub const UNKNOWN_REGION: &str = "unknown";

/// Region cache key: one entry per dimension column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionKey {
    pub dimension: Dimension,
    pub x: i32,
    pub z: i32,
}

impl RegionKey {
    pub fn of(dimension: &Dimension, position: Vec3) -> Self {
        let cell = position.cell();
        Self {
            dimension: dimension.clone(),
            x: cell.x,
            z: cell.z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub dimension: Dimension,
    pub position: Vec3,
    pub health: f64,
    pub max_health: f64,
    pub hunger: f64,
    pub low_health: bool,
    pub in_water: bool,
    pub has_food: bool,
    pub has_bed: bool,
    pub has_water: bool,
    pub has_shelter: bool,
    pub has_wood: bool,
    pub has_wood_tools: bool,
    pub has_stone: bool,
    pub has_stone_tools: bool,
    pub has_iron: bool,
    pub has_iron_tools: bool,
    pub has_iron_armor: bool,
    pub has_diamonds: bool,
    pub has_diamond_tools: bool,
    pub has_diamond_armor: bool,
    pub has_enchanting_table: bool,
    pub has_portable_storage: bool,
    pub has_shield: bool,
    pub has_weapon: bool,
    pub has_boat: bool,
    pub has_maps: bool,
    pub has_fire_resistance: bool,
    pub has_ender_pearls: bool,
    pub inventory_full: bool,
    pub low_durability: bool,
    pub near_settlement: bool,
    pub has_traded: bool,
    pub region: String,
    pub is_night: bool,
}

impl StateSnapshot {
    /// Nothing owned, full health, unknown region.
    pub fn pessimistic(dimension: Dimension, position: Vec3) -> Self {
        Self {
            dimension,
            position,
            health: 20.0,
            max_health: 20.0,
            hunger: 20.0,
            low_health: false,
            in_water: false,
            has_food: false,
            has_bed: false,
            has_water: false,
            has_shelter: false,
            has_wood: false,
            has_wood_tools: false,
            has_stone: false,
            has_stone_tools: false,
            has_iron: false,
            has_iron_tools: false,
            has_iron_armor: false,
            has_diamonds: false,
            has_diamond_tools: false,
            has_diamond_armor: false,
            has_enchanting_table: false,
            has_portable_storage: false,
            has_shield: false,
            has_weapon: false,
            has_boat: false,
            has_maps: false,
            has_fire_resistance: false,
            has_ender_pearls: false,
            inventory_full: false,
            low_durability: false,
            near_settlement: false,
            has_traded: false,
            region: UNKNOWN_REGION.to_string(),
            is_night: false,
        }
    }

    pub fn set_tag(&mut self, tag: ItemTag) {
        let flag = match tag {
            ItemTag::Food => &mut self.has_food,
            ItemTag::Bed => &mut self.has_bed,
            ItemTag::WaterSource => &mut self.has_water,
            ItemTag::Wood => &mut self.has_wood,
            ItemTag::Stone => &mut self.has_stone,
            ItemTag::Iron => &mut self.has_iron,
            ItemTag::Diamonds => &mut self.has_diamonds,
            ItemTag::WoodTool => &mut self.has_wood_tools,
            ItemTag::StoneTool => &mut self.has_stone_tools,
            ItemTag::IronTool => &mut self.has_iron_tools,
            ItemTag::DiamondTool => &mut self.has_diamond_tools,
            ItemTag::IronArmor => &mut self.has_iron_armor,
            ItemTag::DiamondArmor => &mut self.has_diamond_armor,
            ItemTag::Weapon => &mut self.has_weapon,
            ItemTag::Shield => &mut self.has_shield,
            ItemTag::EnchantingTable => &mut self.has_enchanting_table,
            ItemTag::PortableStorage => &mut self.has_portable_storage,
            ItemTag::Boat => &mut self.has_boat,
            ItemTag::Map => &mut self.has_maps,
            ItemTag::FireResistance => &mut self.has_fire_resistance,
            ItemTag::EnderPearl => &mut self.has_ender_pearls,
        };
        *flag = true;
    }
}

/// Overlays inventory-derived facts onto `snapshot`.
pub fn apply_inventory(
    snapshot: &mut StateSnapshot,
    inventory: &Inventory,
    items: &ItemTagTable,
    low_durability_ratio: f64,
) {
    snapshot.inventory_full = inventory.is_full();
    for item in inventory.items() {
        if item
            .durability
            .as_ref()
            .map(|durability| durability.worn_ratio() > low_durability_ratio)
            .unwrap_or(false)
        {
            snapshot.low_durability = true;
        }
        if item.edible {
            snapshot.has_food = true;
        }
        for tag in items.tags_for(&item.id) {
            snapshot.set_tag(tag);
        }
    }
}

pub fn is_night(time_of_day: u32, night_start: u32, night_end: u32) -> bool {
    time_of_day >= night_start && time_of_day <= night_end
}

pub struct SnapshotBuilder<'a> {
    config: &'a AdvisorConfig,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(config: &'a AdvisorConfig) -> Self {
        Self { config }
    }

    pub fn build<E: Environment + ?Sized>(
        &self,
        env: &E,
        reading: &AgentReading,
        history: Option<&AgentHistory>,
        region_cache: &mut ExpiringCache<RegionKey, String>,
        perf: &mut PerformanceMonitor,
        now: Millis,
    ) -> StateSnapshot {
        let thresholds = &self.config.thresholds;
        let mut snapshot = StateSnapshot::pessimistic(reading.dimension.clone(), reading.position);
        snapshot.has_traded = history.map(|history| history.has_traded).unwrap_or(false);
        snapshot.in_water = reading.in_water;
        snapshot.max_health = reading.max_health;
        if let Some(health) = reading.health {
            snapshot.health = health;
            snapshot.low_health = health <= thresholds.low_health;
        }
        if let Some(hunger) = reading.hunger {
            snapshot.hunger = hunger;
        }

        match self.region(env, reading, region_cache, now) {
            Ok(region) => snapshot.region = region,
            Err(err) => note_failure(perf, &reading.agent_id, "region", &err),
        }

        match env.query_time_of_day() {
            Ok(time_of_day) => {
                snapshot.is_night =
                    is_night(time_of_day, thresholds.night_start, thresholds.night_end)
            }
            Err(err) => note_failure(perf, &reading.agent_id, "time_of_day", &err),
        }

        let above = reading
            .position
            .cell()
            .offset(0, self.config.scan.shelter_height, 0);
        match env.query_terrain_cell(&reading.dimension, above) {
            Ok(Some(terrain)) => {
                snapshot.has_shelter = !self
                    .config
                    .scan
                    .air_terrain_ids
                    .iter()
                    .any(|air| air == &terrain)
            }
            Ok(None) => {}
            Err(err) => note_failure(perf, &reading.agent_id, "shelter", &err),
        }

        if let Some(inventory) = reading.inventory.as_ref() {
            apply_inventory(
                &mut snapshot,
                inventory,
                &self.config.items,
                thresholds.low_durability_ratio,
            );
        }

        let census = ActorQuery::around(reading.position, self.config.scan.settlement_radius)
            .of_kind(self.config.actors.trader_kind.clone());
        match env.query_nearby_actors(&reading.dimension, &census) {
            Ok(traders) => {
                snapshot.near_settlement = traders.len() >= self.config.scan.settlement_min_traders
            }
            Err(err) => note_failure(perf, &reading.agent_id, "settlement", &err),
        }

        snapshot
    }

    /// Cached region type with the namespace stripped.
    ///
    /// An unsupported region query yields `unknown` and is cached as such.
    fn region<E: Environment + ?Sized>(
        &self,
        env: &E,
        reading: &AgentReading,
        region_cache: &mut ExpiringCache<RegionKey, String>,
        now: Millis,
    ) -> Result<String, EnvError> {
        let key = RegionKey::of(&reading.dimension, reading.position);
        if let Some(region) = region_cache.get(&key, now) {
            return Ok(region);
        }
        let region = match env.query_region_type(&reading.dimension, reading.position) {
            Ok(region) => strip_namespace(&region).to_string(),
            Err(err) if err.is_unsupported() => UNKNOWN_REGION.to_string(),
            Err(err) => return Err(err),
        };
        region_cache.set(key, region.clone(), now);
        Ok(region)
    }
}

fn note_failure(perf: &mut PerformanceMonitor, agent_id: &str, field: &'static str, err: &EnvError) {
    if err.is_unsupported() {
        return;
    }
    perf.record_error();
    debug!(agent_id = %agent_id, field, error = %err, "snapshot field degraded to default");
}
