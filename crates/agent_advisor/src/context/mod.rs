//! AdvisorContext: process-scoped state shared by every pass.
//!
//! All passes run on one thread against the same context. Each agent is
//! processed in isolation; a failure while handling one agent is counted
//! and never reaches the others.

mod dispatch;
mod lifecycle;
mod report;
mod structures;
mod tracking;

pub use dispatch::{frame_quests, QUEST_BANNER};
pub use lifecycle::welcome_banner;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::cache::ExpiringCache;
use crate::config::AdvisorConfig;
use crate::cooldown::CooldownRegistry;
use crate::env::{AgentReading, Environment, MessageSink};
use crate::error::EnvError;
use crate::history::AgentHistory;
use crate::perf::PerformanceMonitor;
use crate::snapshot::RegionKey;
use crate::threat::TerrainCache;
use crate::types::{markup, AgentId, Millis};

/// Result of offering one candidate to a notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent,
    NothingToSend,
    /// Same payload as the last one sent on this channel.
    Unchanged,
    CoolingDown,
    /// The agent could not be read this pass.
    Skipped,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Sent => "sent",
            DispatchOutcome::NothingToSend => "nothing_to_send",
            DispatchOutcome::Unchanged => "unchanged",
            DispatchOutcome::CoolingDown => "cooling_down",
            DispatchOutcome::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdvisorContext {
    config: AdvisorConfig,
    region_cache: ExpiringCache<RegionKey, String>,
    terrain_cache: TerrainCache,
    cooldowns: CooldownRegistry,
    histories: BTreeMap<AgentId, AgentHistory>,
    perf: PerformanceMonitor,
}

impl Default for AdvisorContext {
    fn default() -> Self {
        Self::new(AdvisorConfig::default())
    }
}

impl AdvisorContext {
    pub fn new(config: AdvisorConfig) -> Self {
        Self {
            region_cache: ExpiringCache::new(config.cache.region_ttl_ms),
            terrain_cache: ExpiringCache::new(config.cache.terrain_ttl_ms),
            cooldowns: CooldownRegistry::new(config.tick_duration_ms),
            histories: BTreeMap::new(),
            perf: PerformanceMonitor::with_sample_window(config.perf_sample_window),
            config,
        }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn history(&self, agent_id: &str) -> Option<&AgentHistory> {
        self.histories.get(agent_id)
    }

    pub fn tracked_agents(&self) -> usize {
        self.histories.len()
    }

    pub fn perf(&self) -> &PerformanceMonitor {
        &self.perf
    }

    pub fn cooldowns(&self) -> &CooldownRegistry {
        &self.cooldowns
    }

    pub fn region_cache_len(&self) -> usize {
        self.region_cache.len()
    }

    pub fn terrain_cache_len(&self) -> usize {
        self.terrain_cache.len()
    }

    /// Forgets everything held for `agent_id`. Returns true if it was tracked.
    pub fn forget_agent(&mut self, agent_id: &str) -> bool {
        let removed = self.histories.remove(agent_id).is_some();
        let cooldowns = self.cooldowns.forget_agent(agent_id);
        if removed {
            info!(agent_id = %agent_id, cooldowns, "agent tracking stopped");
        }
        removed
    }

    /// Reads one agent, counting the failure if it cannot be read.
    fn read_agent<E: Environment + ?Sized>(
        &mut self,
        env: &E,
        agent_id: &str,
    ) -> Option<AgentReading> {
        match env.query_agent_state(agent_id) {
            Ok(reading) => Some(reading),
            Err(err) => {
                self.note_failure(agent_id, "agent_state", &err);
                None
            }
        }
    }

    fn list_agents<E: Environment + ?Sized>(&mut self, env: &E) -> Vec<AgentId> {
        match env.list_agents() {
            Ok(agents) => agents,
            Err(err) => {
                self.note_failure("*", "agent_list", &err);
                Vec::new()
            }
        }
    }

    fn note_failure(&mut self, agent_id: &str, operation: &'static str, err: &EnvError) {
        if !err.is_unsupported() {
            self.perf.record_error();
        }
        debug!(agent_id = %agent_id, operation, error = %err, "environment query failed");
    }

    /// History for `reading`, created on first observation with a greeting.
    fn ensure_tracked<S: MessageSink + ?Sized>(
        &mut self,
        sink: &mut S,
        reading: &AgentReading,
        now: Millis,
    ) -> &mut AgentHistory {
        let agent_id = reading.agent_id.as_str();
        if !self.histories.contains_key(agent_id) {
            sink.send_message(
                agent_id,
                &format!("{}[AGENT ADVISOR] {}Tracking initialized", markup::GREEN, markup::GRAY),
            );
            sink.send_message(
                agent_id,
                &format!("{}Advisor online - all systems operational", markup::GRAY),
            );
            info!(agent_id = %agent_id, dimension = reading.dimension.as_str(), "agent tracking started");
        }
        self.histories
            .entry(reading.agent_id.clone())
            .or_insert_with(|| AgentHistory::new(reading.position, now))
    }
}
