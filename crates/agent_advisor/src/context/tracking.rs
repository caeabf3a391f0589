use std::time::Instant;
use tracing::{debug, info};

use super::{AdvisorContext, DispatchOutcome};
use crate::cooldown::{CooldownKey, NotificationChannel};
use crate::env::{AgentReading, Environment, MessageSink};
use crate::resource::ResourceScanner;
use crate::snapshot::{SnapshotBuilder, StateSnapshot};
use crate::types::Millis;

impl AdvisorContext {
    /// Scan pass over every listed agent; records its duration.
    pub fn run_scan_pass<E, S>(&mut self, env: &E, sink: &mut S, now: Millis)
    where
        E: Environment + ?Sized,
        S: MessageSink + ?Sized,
    {
        let started = Instant::now();
        for agent_id in self.list_agents(env) {
            let outcome = self.track_agent(env, sink, &agent_id, now);
            debug!(agent_id = %agent_id, outcome = outcome.as_str(), "resource channel");
        }
        self.perf.record_scan_pass(started.elapsed());
    }

    /// Movement history, region bookkeeping and the resource notification
    /// for one agent.
    pub fn track_agent<E, S>(
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
        let movement = self.config.thresholds.movement;
        let elapsed_ticks = self.config.intervals.scan;
        self.ensure_tracked(sink, &reading, now)
            .record_movement(reading.position, movement, elapsed_ticks);

        let snapshot = self.build_snapshot(env, &reading, now);
        if let Some(history) = self.histories.get_mut(agent_id) {
            if history.visit_region(&snapshot.region) {
                debug!(agent_id = %agent_id, region = %snapshot.region, "new region visited");
            }
        }

        let finds = match ResourceScanner::new(&self.config).scan_for_resources(
            env,
            &reading.dimension,
            reading.position,
        ) {
            Ok(finds) => finds,
            Err(err) => {
                self.note_failure(agent_id, "resource_scan", &err);
                return DispatchOutcome::Skipped;
            }
        };
        let Some(top) = finds.first() else {
            return DispatchOutcome::NothingToSend;
        };

        let key = CooldownKey::new(agent_id, NotificationChannel::Resource);
        if self
            .cooldowns
            .is_on_cooldown(&key, self.config.cooldowns.resource, now)
        {
            self.perf.record_suppressed();
            debug!(agent_id = %agent_id, key = %key, "resource notification cooling down");
            return DispatchOutcome::CoolingDown;
        }
        sink.send_message(agent_id, &top.message);
        self.cooldowns.set_cooldown(key, now);
        self.perf.record_dispatch();
        info!(
            agent_id = %agent_id,
            resource = top.source.as_deref().unwrap_or_default(),
            rarity = top.priority,
            "resource notification sent"
        );
        DispatchOutcome::Sent
    }

    pub(super) fn build_snapshot<E: Environment + ?Sized>(
        &mut self,
        env: &E,
        reading: &AgentReading,
        now: Millis,
    ) -> StateSnapshot {
        let history = self.histories.get(reading.agent_id.as_str());
        SnapshotBuilder::new(&self.config).build(
            env,
            reading,
            history,
            &mut self.region_cache,
            &mut self.perf,
            now,
        )
    }
}
