use tracing::{debug, info};

use super::{AdvisorContext, DispatchOutcome};
use crate::cooldown::{CooldownKey, NotificationChannel};
use crate::env::{Environment, MessageSink};
use crate::progress::ProgressScores;
use crate::quest::{Quest, QuestGenerator};
use crate::threat::ThreatScorer;
use crate::types::{markup, Millis};

pub const QUEST_BANNER: &str = "§b[ADVISOR QUEST BOARD]";

impl AdvisorContext {
    pub fn run_threat_pass<E, S>(&mut self, env: &E, sink: &mut S, now: Millis)
    where
        E: Environment + ?Sized,
        S: MessageSink + ?Sized,
    {
        for agent_id in self.list_agents(env) {
            let outcome = self.process_threats(env, sink, &agent_id, now);
            debug!(agent_id = %agent_id, outcome = outcome.as_str(), "threat channel");
        }
    }

    /// Sends the most urgent threat if it differs from the last one sent and
    /// its `agent + kind` key is not cooling down.
    pub fn process_threats<E, S>(
        &mut self,
        env: &E,
        sink: &mut S,
        agent_id: &str,
        now: Millis,
    ) -> DispatchOutcome
    where
        E: Environment + ?Sized,
        S: MessageSink + ?Sized,
    {
        let Some(reading) = self.read_agent(env, agent_id) else {
            return DispatchOutcome::Skipped;
        };
        self.ensure_tracked(sink, &reading, now);

        let threats = ThreatScorer::new(&self.config).scan_for_threats(
            env,
            &reading,
            &mut self.terrain_cache,
            &mut self.perf,
            now,
        );
        let Some(top) = threats.into_iter().next() else {
            return DispatchOutcome::NothingToSend;
        };

        let key = CooldownKey::new(agent_id, NotificationChannel::Threat).with_subtype(top.kind.as_str());
        let unchanged = self
            .histories
            .get(agent_id)
            .and_then(|history| history.last_threat_message.as_deref())
            == Some(top.message.as_str());
        if unchanged {
            self.perf.record_suppressed();
            debug!(agent_id = %agent_id, kind = top.kind.as_str(), "threat unchanged since last alert");
            return DispatchOutcome::Unchanged;
        }
        if self
            .cooldowns
            .is_on_cooldown(&key, self.config.cooldowns.threat, now)
        {
            self.perf.record_suppressed();
            debug!(agent_id = %agent_id, key = %key, "threat alert cooling down");
            return DispatchOutcome::CoolingDown;
        }

        sink.send_message(agent_id, &top.message);
        if let Some(history) = self.histories.get_mut(agent_id) {
            history.last_threat_message = Some(top.message.clone());
        }
        self.cooldowns.set_cooldown(key, now);
        self.perf.record_dispatch();
        info!(
            agent_id = %agent_id,
            kind = top.kind.as_str(),
            priority = top.priority,
            "threat alert sent"
        );
        DispatchOutcome::Sent
    }

    pub fn run_quest_pass<E, S>(&mut self, env: &E, sink: &mut S, now: Millis)
    where
        E: Environment + ?Sized,
        S: MessageSink + ?Sized,
    {
        for agent_id in self.list_agents(env) {
            let outcome = self.update_quests(env, sink, &agent_id, now);
            debug!(agent_id = %agent_id, outcome = outcome.as_str(), "quest channel");
        }
    }

    /// Ranked quest list for one agent, without dispatching anything.
    pub fn evaluate_quests<E: Environment + ?Sized, S: MessageSink + ?Sized>(
        &mut self,
        env: &E,
        sink: &mut S,
        agent_id: &str,
        now: Millis,
    ) -> Option<Vec<Quest>> {
        let reading = self.read_agent(env, agent_id)?;
        let view = self.ensure_tracked(sink, &reading, now).view();
        let snapshot = self.build_snapshot(env, &reading, now);
        let progress = ProgressScores::evaluate(&snapshot, &view);
        Some(QuestGenerator::new(&self.config).generate(&snapshot, &view, &progress))
    }

    /// Sends the whole quest batch, framed, when it changed and the quest
    /// cooldown has elapsed.
    pub fn update_quests<E, S>(
        &mut self,
        env: &E,
        sink: &mut S,
        agent_id: &str,
        now: Millis,
    ) -> DispatchOutcome
    where
        E: Environment + ?Sized,
        S: MessageSink + ?Sized,
    {
        let Some(quests) = self.evaluate_quests(env, sink, agent_id, now) else {
            return DispatchOutcome::Skipped;
        };
        if quests.is_empty() {
            return DispatchOutcome::NothingToSend;
        }
        let unchanged = self
            .histories
            .get(agent_id)
            .and_then(|history| history.last_quests.as_ref())
            == Some(&quests);
        if unchanged {
            self.perf.record_suppressed();
            debug!(agent_id = %agent_id, quests = quests.len(), "quest batch unchanged");
            return DispatchOutcome::Unchanged;
        }
        let key = CooldownKey::new(agent_id, NotificationChannel::Quest);
        if self
            .cooldowns
            .is_on_cooldown(&key, self.config.cooldowns.quest, now)
        {
            self.perf.record_suppressed();
            debug!(agent_id = %agent_id, key = %key, "quest batch cooling down");
            return DispatchOutcome::CoolingDown;
        }

        for line in frame_quests(&quests) {
            sink.send_message(agent_id, &line);
        }
        self.cooldowns.set_cooldown(key, now);
        self.perf.record_dispatch();
        info!(
            agent_id = %agent_id,
            quests = quests.len(),
            top_priority = quests[0].priority,
            top_category = quests[0].category.as_str(),
            "quest batch sent"
        );
        if let Some(history) = self.histories.get_mut(agent_id) {
            history.last_quests = Some(quests);
        }
        DispatchOutcome::Sent
    }
}

/// Quest batch as sent: banner between separators, one line per quest,
/// closing separator.
pub fn frame_quests(quests: &[Quest]) -> Vec<String> {
    let mut lines = Vec::with_capacity(quests.len() + 4);
    lines.push(markup::SEPARATOR.to_string());
    lines.push(QUEST_BANNER.to_string());
    lines.push(markup::SEPARATOR.to_string());
    lines.extend(quests.iter().map(|quest| quest.text.clone()));
    lines.push(markup::SEPARATOR.to_string());
    lines
}
