//! Per-agent, per-channel notification cooldowns.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::types::{Millis, DEFAULT_TICK_DURATION_MS};

/// Outbound notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Resource,
    Threat,
    Quest,
    Structure,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Resource => "resource",
            NotificationChannel::Threat => "threat",
            NotificationChannel::Quest => "quest",
            NotificationChannel::Structure => "structure",
        }
    }
}

/// Composite cooldown key: agent + channel (+ subtype, e.g. the threat kind).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CooldownKey {
    pub agent_id: String,
    pub channel: NotificationChannel,
    pub subtype: Option<String>,
}

impl CooldownKey {
    pub fn new(agent_id: impl Into<String>, channel: NotificationChannel) -> Self {
        Self {
            agent_id: agent_id.into(),
            channel,
            subtype: None,
        }
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }
}

impl fmt::Display for CooldownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subtype {
            Some(subtype) => write!(f, "{}_{}_{}", self.channel.as_str(), self.agent_id, subtype),
            None => write!(f, "{}_{}", self.channel.as_str(), self.agent_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CooldownRegistry {
    last_fired: HashMap<CooldownKey, Millis>,
    tick_duration_ms: Millis,
}

impl Default for CooldownRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_DURATION_MS)
    }
}

impl CooldownRegistry {
    pub fn new(tick_duration_ms: Millis) -> Self {
        Self {
            last_fired: HashMap::new(),
            tick_duration_ms,
        }
    }

    fn window_ms(&self, window_ticks: u64) -> Millis {
        window_ticks.saturating_mul(self.tick_duration_ms)
    }

    /// True if `key` fired less than `window_ticks` ticks of wall-clock time ago.
    pub fn is_on_cooldown(&self, key: &CooldownKey, window_ticks: u64, now: Millis) -> bool {
        match self.last_fired.get(key) {
            Some(last) => now.saturating_sub(*last) < self.window_ms(window_ticks),
            None => false,
        }
    }

    pub fn set_cooldown(&mut self, key: CooldownKey, now: Millis) {
        self.last_fired.insert(key, now);
    }

    pub fn last_fired(&self, key: &CooldownKey) -> Option<Millis> {
        self.last_fired.get(key).copied()
    }

    /// Drops every key belonging to `agent_id`. Returns the number removed.
    pub fn forget_agent(&mut self, agent_id: &str) -> usize {
        let before = self.last_fired.len();
        self.last_fired.retain(|key, _| key.agent_id != agent_id);
        before - self.last_fired.len()
    }

    /// Drops keys that can no longer gate anything under `max_window_ticks`.
    pub fn prune_expired(&mut self, max_window_ticks: u64, now: Millis) -> usize {
        let window_ms = self.window_ms(max_window_ticks);
        let before = self.last_fired.len();
        self.last_fired
            .retain(|_, last| now.saturating_sub(*last) < window_ms);
        before - self.last_fired.len()
    }

    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }
}
