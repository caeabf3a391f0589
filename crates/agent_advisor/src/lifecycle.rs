use serde::{Deserialize, Serialize};

use crate::types::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DamageCause {
    Fall,
    Attack,
    Fire,
    Drowning,
    #[default]
    Other,
}

impl DamageCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DamageCause::Fall => "fall",
            DamageCause::Attack => "attack",
            DamageCause::Fire => "fire",
            DamageCause::Drowning => "drowning",
            DamageCause::Other => "other",
        }
    }

    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "fall" => DamageCause::Fall,
            "attack" | "entity_attack" => DamageCause::Attack,
            "fire" | "fire_tick" | "lava" => DamageCause::Fire,
            "drowning" => DamageCause::Drowning,
            _ => DamageCause::Other,
        }
    }
}

/// Host lifecycle notification delivered outside the scan passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    AgentJoined {
        agent_id: AgentId,
        initial_spawn: bool,
    },
    AgentLeft {
        agent_id: AgentId,
    },
    ActorKilled {
        killer: AgentId,
        victim_kind: String,
    },
    AgentDamaged {
        agent_id: AgentId,
        cause: DamageCause,
        amount: f64,
    },
    TradeCompleted {
        agent_id: AgentId,
    },
}

impl AgentEvent {
    /// Serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentEvent::AgentJoined { .. } => "agent_joined",
            AgentEvent::AgentLeft { .. } => "agent_left",
            AgentEvent::ActorKilled { .. } => "actor_killed",
            AgentEvent::AgentDamaged { .. } => "agent_damaged",
            AgentEvent::TradeCompleted { .. } => "trade_completed",
        }
    }

    /// Agent the event concerns.
    pub fn agent_id(&self) -> &str {
        match self {
            AgentEvent::AgentJoined { agent_id, .. }
            | AgentEvent::AgentLeft { agent_id }
            | AgentEvent::AgentDamaged { agent_id, .. }
            | AgentEvent::TradeCompleted { agent_id } => agent_id,
            AgentEvent::ActorKilled { killer, .. } => killer,
        }
    }
}
