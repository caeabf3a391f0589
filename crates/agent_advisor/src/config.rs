//! Static policy table: intervals, thresholds, scan radii and catalogs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::catalog::{
    default_resource_signatures, default_structure_messages, default_terrain_hazards,
    ActorCatalog, ItemTagTable, ResourceSignature, TerrainHazard,
};
use crate::error::ConfigError;
use crate::types::{Millis, DEFAULT_TICK_DURATION_MS};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "advisor.toml";

pub const ENV_SCAN_INTERVAL: &str = "AGENT_ADVISOR_SCAN_INTERVAL";
pub const ENV_THREAT_INTERVAL: &str = "AGENT_ADVISOR_THREAT_INTERVAL";
pub const ENV_QUEST_INTERVAL: &str = "AGENT_ADVISOR_QUEST_INTERVAL";
pub const ENV_PERF_INTERVAL: &str = "AGENT_ADVISOR_PERF_INTERVAL";

/// Upper bound for every cubic scan radius; a resource scan reads `(2r+1)^3` cells.
pub const MAX_SCAN_RADIUS: i32 = 32;

/// Pass intervals, in host ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub scan: u64,
    pub threat_check: u64,
    pub quest_update: u64,
    pub performance_check: u64,
    pub structure_scan: u64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            scan: 60,
            threat_check: 30,
            quest_update: 560,
            performance_check: 600,
            structure_scan: 2000,
        }
    }
}

/// Notification cooldown windows, in host ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub resource: u64,
    pub threat: u64,
    pub quest: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            resource: 300,
            threat: 100,
            quest: 180,
        }
    }
}

impl CooldownConfig {
    pub fn longest(&self) -> u64 {
        self.resource.max(self.threat).max(self.quest)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub low_health: f64,
    pub critical_health: f64,
    pub low_air: i32,
    pub low_hunger: f64,
    /// Minimum horizontal movement per scan pass that counts as travel.
    pub movement: f64,
    /// Stationary ticks after which the agent is considered stagnant.
    pub stagnant_time: u64,
    pub max_threat_distance: f64,
    pub critical_threat_distance: f64,
    pub secondary_threat_distance: f64,
    /// Candidates must score strictly above this to become threat events.
    pub threat_score_floor: u8,
    pub low_durability_ratio: f64,
    pub night_start: u32,
    pub night_end: u32,
    pub kill_milestone: u64,
    pub fall_damage_alert: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            low_health: 10.0,
            critical_health: 6.0,
            low_air: 30,
            low_hunger: 10.0,
            movement: 30.0,
            stagnant_time: 2400,
            max_threat_distance: 12.0,
            critical_threat_distance: 4.0,
            secondary_threat_distance: 8.0,
            threat_score_floor: 50,
            low_durability_ratio: 0.8,
            night_start: 13_000,
            night_end: 23_000,
            kill_milestone: 10,
            fall_damage_alert: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub environment_radius: i32,
    pub environment_vertical: i32,
    pub resource_radius: i32,
    pub shelter_height: i32,
    pub air_terrain_ids: Vec<String>,
    pub settlement_radius: f64,
    pub settlement_min_traders: usize,
    pub structure_trader_radius: f64,
    pub structure_min_traders: usize,
    pub raider_radius: f64,
    pub min_raiders: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            environment_radius: 2,
            environment_vertical: 1,
            resource_radius: 5,
            shelter_height: 2,
            air_terrain_ids: vec!["minecraft:air".to_string()],
            settlement_radius: 50.0,
            settlement_min_traders: 3,
            structure_trader_radius: 100.0,
            structure_min_traders: 3,
            raider_radius: 150.0,
            min_raiders: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub region_ttl_ms: Millis,
    pub terrain_ttl_ms: Millis,
    pub region_max_entries: usize,
    pub terrain_max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            region_ttl_ms: 200,
            terrain_ttl_ms: 40,
            region_max_entries: 1000,
            terrain_max_entries: 500,
        }
    }
}

/// Process-lifetime policy. Read-only once the context is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub tick_duration_ms: Millis,
    pub max_quests: usize,
    pub perf_sample_window: usize,
    pub intervals: IntervalConfig,
    pub cooldowns: CooldownConfig,
    pub thresholds: ThresholdConfig,
    pub scan: ScanConfig,
    pub cache: CacheConfig,
    pub actors: ActorCatalog,
    pub terrain_hazards: BTreeMap<String, TerrainHazard>,
    pub resources: BTreeMap<String, ResourceSignature>,
    pub structures: BTreeMap<String, String>,
    pub items: ItemTagTable,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms: DEFAULT_TICK_DURATION_MS,
            max_quests: 4,
            perf_sample_window: 128,
            intervals: IntervalConfig::default(),
            cooldowns: CooldownConfig::default(),
            thresholds: ThresholdConfig::default(),
            scan: ScanConfig::default(),
            cache: CacheConfig::default(),
            actors: ActorCatalog::default(),
            terrain_hazards: default_terrain_hazards(),
            resources: default_resource_signatures(),
            structures: default_structure_messages(),
            items: ItemTagTable::default(),
        }
    }
}

impl AdvisorConfig {
    /// Loads `advisor.toml` from the working directory if present, else defaults.
    /// Environment overrides apply in both cases.
    pub fn from_default_sources() -> Result<Self, ConfigError> {
        let config_path = Path::new(DEFAULT_CONFIG_FILE_NAME);
        if config_path.exists() {
            return Self::from_config_file(config_path);
        }
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_config_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::ReadConfigFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let mut config: Self =
            toml::from_str(&content).map_err(|err| ConfigError::ParseConfigFile {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::ParseConfigFile {
            path: "<inline>".to_string(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, mut getter: F) -> Result<(), ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(value) = parse_ticks(&mut getter, ENV_SCAN_INTERVAL)? {
            self.intervals.scan = value;
        }
        if let Some(value) = parse_ticks(&mut getter, ENV_THREAT_INTERVAL)? {
            self.intervals.threat_check = value;
        }
        if let Some(value) = parse_ticks(&mut getter, ENV_QUEST_INTERVAL)? {
            self.intervals.quest_update = value;
        }
        if let Some(value) = parse_ticks(&mut getter, ENV_PERF_INTERVAL)? {
            self.intervals.performance_check = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_duration_ms == 0 {
            return Err(ConfigError::Invalid("tick_duration_ms must be > 0".to_string()));
        }
        let intervals = [
            ("intervals.scan", self.intervals.scan),
            ("intervals.threat_check", self.intervals.threat_check),
            ("intervals.quest_update", self.intervals.quest_update),
            ("intervals.performance_check", self.intervals.performance_check),
            ("intervals.structure_scan", self.intervals.structure_scan),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be > 0")));
            }
        }
        let thresholds = &self.thresholds;
        if thresholds.critical_threat_distance > thresholds.secondary_threat_distance
            || thresholds.secondary_threat_distance > thresholds.max_threat_distance
        {
            return Err(ConfigError::Invalid(
                "threat distance bands must satisfy critical <= secondary <= max".to_string(),
            ));
        }
        if thresholds.critical_health > thresholds.low_health {
            return Err(ConfigError::Invalid(
                "critical_health must not exceed low_health".to_string(),
            ));
        }
        let radii = [
            ("scan.environment_radius", self.scan.environment_radius),
            ("scan.environment_vertical", self.scan.environment_vertical),
            ("scan.resource_radius", self.scan.resource_radius),
        ];
        for (name, value) in radii {
            if !(0..=MAX_SCAN_RADIUS).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within 0..={MAX_SCAN_RADIUS}"
                )));
            }
        }
        if self.max_quests == 0 {
            return Err(ConfigError::Invalid("max_quests must be > 0".to_string()));
        }
        Ok(())
    }
}

fn parse_ticks<F>(getter: &mut F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
{
    match getter(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvValue { key, value }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn defaults_match_reference_policy() {
        let config = AdvisorConfig::default();
        assert_eq!(config.intervals.scan, 60);
        assert_eq!(config.intervals.threat_check, 30);
        assert_eq!(config.intervals.quest_update, 560);
        assert_eq!(config.cooldowns.longest(), 300);
        assert_eq!(config.thresholds.critical_health, 6.0);
        assert_eq!(config.max_quests, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let config = AdvisorConfig::from_toml_str(
            r#"
max_quests = 3

[intervals]
scan = 20

[thresholds]
low_health = 12.0

[terrain_hazards."custom:acid"]
priority = 9
message = "ACID"
"#,
        )
        .expect("parse config");
        assert_eq!(config.max_quests, 3);
        assert_eq!(config.intervals.scan, 20);
        assert_eq!(config.intervals.threat_check, 30);
        assert_eq!(config.thresholds.low_health, 12.0);
        assert_eq!(config.thresholds.critical_health, 6.0);
        assert_eq!(config.terrain_hazards.len(), 1);
        assert_eq!(config.terrain_hazards["custom:acid"].priority, 9);
    }

    #[test]
    fn env_overrides_replace_intervals() {
        let mut config = AdvisorConfig::default();
        config
            .apply_overrides(|key| match key {
                ENV_THREAT_INTERVAL => Some("15".to_string()),
                ENV_PERF_INTERVAL => Some("  ".to_string()),
                _ => None,
            })
            .expect("overrides");
        assert_eq!(config.intervals.threat_check, 15);
        assert_eq!(config.intervals.performance_check, 600);

        let err = config
            .apply_overrides(|key| (key == ENV_SCAN_INTERVAL).then(|| "fast".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvValue { key: ENV_SCAN_INTERVAL, .. }));
    }

    #[test]
    fn validate_rejects_inverted_bands_and_zero_intervals() {
        let mut config = AdvisorConfig::default();
        config.thresholds.critical_threat_distance = 10.0;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.intervals.quest_update = 0;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.thresholds.critical_health = 15.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bounds_scan_radii() {
        let mut config = AdvisorConfig::default();
        config.scan.resource_radius = MAX_SCAN_RADIUS;
        assert!(config.validate().is_ok());

        config.scan.resource_radius = 30_000;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("scan.resource_radius")));

        let mut config = AdvisorConfig::default();
        config.scan.environment_radius = -1;
        assert!(config.validate().is_err());

        let err = AdvisorConfig::from_toml_str("[scan]\nresource_radius = 64\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn config_file_round_trip() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos())
            .unwrap_or(0);
        let path = std::env::temp_dir().join(format!("agent-advisor-config-{unique}.toml"));
        let mut config = AdvisorConfig::default();
        config.cooldowns.quest = 90;
        let content = toml::to_string(&config).expect("serialize config");
        fs::write(&path, content).expect("write config");

        let loaded = AdvisorConfig::from_config_file(&path).expect("load config");
        assert_eq!(loaded.cooldowns.quest, 90);
        assert_eq!(loaded.resources, config.resources);
        let _ = fs::remove_file(&path);

        let missing = AdvisorConfig::from_config_file(&path).unwrap_err();
        assert!(matches!(missing, ConfigError::ReadConfigFile { .. }));
    }
}
