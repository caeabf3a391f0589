use tracing::info;

use super::AdvisorContext;
use crate::env::{Environment, MessageSink};
use crate::structure::StructureScanner;
use crate::types::Millis;

impl AdvisorContext {
    pub fn run_structure_pass<E, S>(&mut self, env: &E, sink: &mut S, now: Millis)
    where
        E: Environment + ?Sized,
        S: MessageSink + ?Sized,
    {
        for agent_id in self.list_agents(env) {
            self.scan_structures(env, sink, &agent_id, now);
        }
    }

    /// Announces each newly found structure once. Returns how many were sent.
    pub fn scan_structures<E, S>(
        &mut self,
        env: &E,
        sink: &mut S,
        agent_id: &str,
        now: Millis,
    ) -> usize
    where
        E: Environment + ?Sized,
        S: MessageSink + ?Sized,
    {
        let Some(reading) = self.read_agent(env, agent_id) else {
            return 0;
        };
        self.ensure_tracked(sink, &reading, now);
        let finds = match self.histories.get(agent_id) {
            Some(history) => StructureScanner::new(&self.config).scan(
                env,
                &reading,
                &history.notified_structures,
                &mut self.perf,
            ),
            None => return 0,
        };
        let Some(history) = self.histories.get_mut(agent_id) else {
            return 0;
        };
        for find in &finds {
            sink.send_message(agent_id, &find.message);
            history.notified_structures.insert(find.key.clone());
            if find.counts_as_discovery {
                history.discoveries = history.discoveries.saturating_add(1);
            }
            self.perf.record_dispatch();
            info!(agent_id = %agent_id, structure = %find.key, "structure announced");
        }
        finds.len()
    }
}
