use tracing::{debug, info};

use super::AdvisorContext;
use crate::env::MessageSink;
use crate::lifecycle::{AgentEvent, DamageCause};
use crate::types::markup;

pub fn welcome_banner() -> Vec<String> {
    vec![
        markup::SEPARATOR.to_string(),
        format!("{}           AGENT {}ADVISOR", markup::AQUA, markup::DARK_AQUA),
        format!("{}    Situational awareness for every agent", markup::GRAY),
        markup::SEPARATOR.to_string(),
        format!("{}✓ {}Real-time threat alerts", markup::GREEN, markup::GRAY),
        format!("{}✓ {}Contextual quests", markup::GREEN, markup::GRAY),
        format!("{}✓ {}Valuable resource detection", markup::GREEN, markup::GRAY),
        format!("{}✓ {}Structure discovery alerts", markup::GREEN, markup::GRAY),
        markup::SEPARATOR.to_string(),
    ]
}

impl AdvisorContext {
    pub fn handle_event<S: MessageSink + ?Sized>(
        &mut self,
        event: &AgentEvent,
        sink: &mut S,
    ) {
        debug!(agent_id = %event.agent_id(), event = event.kind(), "host event");
        match event {
            AgentEvent::AgentJoined {
                agent_id,
                initial_spawn,
            } => {
                if *initial_spawn {
                    for line in welcome_banner() {
                        sink.send_message(agent_id, &line);
                    }
                }
                info!(agent_id = %agent_id, initial_spawn, "agent joined");
            }
            AgentEvent::AgentLeft { agent_id } => {
                self.forget_agent(agent_id);
            }
            AgentEvent::ActorKilled {
                killer,
                victim_kind,
            } => {
                if !self.config.actors.is_hostile(victim_kind) {
                    return;
                }
                let milestone = self.config.thresholds.kill_milestone;
                let Some(history) = self.histories.get_mut(killer) else {
                    debug!(agent_id = %killer, "kill by untracked agent ignored");
                    return;
                };
                if history.record_kill(milestone) {
                    sink.send_message(
                        killer,
                        &format!(
                            "{}[COMBAT] {}Total kills: {} - Combat mastery increasing!",
                            markup::YELLOW,
                            markup::GOLD,
                            history.kills
                        ),
                    );
                }
            }
            AgentEvent::AgentDamaged {
                agent_id,
                cause,
                amount,
            } => {
                if *cause == DamageCause::Fall && *amount > self.config.thresholds.fall_damage_alert
                {
                    sink.send_message(
                        agent_id,
                        &format!(
                            "{}[CAUTION] {}Severe fall damage - Watch your step!",
                            markup::YELLOW,
                            markup::GOLD
                        ),
                    );
                }
            }
            AgentEvent::TradeCompleted { agent_id } => {
                if let Some(history) = self.histories.get_mut(agent_id) {
                    history.has_traded = true;
                }
            }
        }
    }
}
