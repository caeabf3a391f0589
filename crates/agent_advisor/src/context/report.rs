use tracing::{info, warn};

use super::AdvisorContext;
use crate::env::MessageSink;
use crate::perf::PerformanceReport;
use crate::types::Millis;

impl AdvisorContext {
    /// Current counters; does not emit anything.
    pub fn performance_report(&self) -> PerformanceReport {
        self.perf.report(
            self.histories.len(),
            self.region_cache.len() + self.terrain_cache.len(),
        )
    }

    /// Emits the report as diagnostics, then enforces the cache ceilings and
    /// drops cooldowns that can no longer gate anything.
    ///
    /// Nothing happens while no agent is tracked.
    pub fn run_performance_pass<S: MessageSink + ?Sized>(
        &mut self,
        sink: &mut S,
        now: Millis,
    ) -> Option<PerformanceReport> {
        if self.histories.is_empty() {
            return None;
        }
        let report = self.performance_report();
        for line in report.lines() {
            sink.log_diagnostic(&line);
        }
        info!(
            updates = report.updates,
            errors = report.errors,
            avg_ms = report.scan_pass.avg_ms,
            agents = report.active_agents,
            cache_entries = report.cache_entries,
            "performance report"
        );

        let limits = &self.config.cache;
        let region_entries = self.region_cache.len();
        if self.region_cache.clear_if_over(limits.region_max_entries) {
            warn!(entries = region_entries, "region cache over ceiling, cleared");
        }
        let terrain_entries = self.terrain_cache.len();
        if self.terrain_cache.clear_if_over(limits.terrain_max_entries) {
            warn!(entries = terrain_entries, "terrain cache over ceiling, cleared");
        }
        self.cooldowns
            .prune_expired(self.config.cooldowns.longest(), now);
        Some(report)
    }
}
