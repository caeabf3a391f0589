pub mod cache;
pub mod catalog;
pub mod config;
pub mod context;
pub mod cooldown;
pub mod env;
pub mod error;
pub mod event;
pub mod geometry;
pub mod history;
pub mod lifecycle;
pub mod memory_env;
pub mod perf;
pub mod progress;
pub mod quest;
pub mod resource;
pub mod scheduler;
pub mod snapshot;
pub mod structure;
pub mod threat;
pub mod types;

pub use geometry::{box_cells, horizontal_distance, space_distance, CellPos, Vec3};
pub use types::{
    markup, strip_namespace, AgentId, Dimension, GameTick, Millis, DEFAULT_TICK_DURATION_MS,
};

// Configuration and catalogs
pub use catalog::{
    ActorCatalog, HazardClass, ItemTag, ItemTagTable, ResourceSignature, TerrainHazard,
};
pub use config::{
    AdvisorConfig, CacheConfig, CooldownConfig, IntervalConfig, ScanConfig, ThresholdConfig,
    DEFAULT_CONFIG_FILE_NAME, ENV_PERF_INTERVAL, ENV_QUEST_INTERVAL, ENV_SCAN_INTERVAL,
    ENV_THREAT_INTERVAL, MAX_SCAN_RADIUS,
};
pub use error::{ConfigError, EnvError};

// Host boundary
pub use env::{
    ActorHandle, ActorQuery, AgentReading, Breath, Durability, Environment, Inventory, ItemStack,
    MessageSink,
};
pub use lifecycle::{AgentEvent, DamageCause};
pub use memory_env::{InMemoryEnvironment, QueryKind, RecordingSink, SentMessage};

// Caches and rate limiting
pub use cache::ExpiringCache;
pub use cooldown::{CooldownKey, CooldownRegistry, NotificationChannel};

// Perception and scoring
pub use event::{EventKind, ScoredEvent};
pub use history::{AgentHistory, HistoryView};
pub use progress::{
    combat_score, crafting_score, exploration_score, survival_score, ProgressScores,
};
pub use quest::{
    generate_contextual_quests, Quest, QuestCategory, QuestGenerator, QuestInputs, QuestKind,
};
pub use resource::ResourceScanner;
pub use snapshot::{RegionKey, SnapshotBuilder, StateSnapshot, UNKNOWN_REGION};
pub use structure::{StructureFind, StructureScanner};
pub use threat::{analyze_danger, TerrainCache, ThreatScorer};

// Dispatch and scheduling
pub use context::{frame_quests, welcome_banner, AdvisorContext, DispatchOutcome};
pub use perf::{PassTimingSnapshot, PerformanceMonitor, PerformanceReport};
pub use scheduler::{AdvisorRuntime, AdvisorScheduler, AdvisorTask};
