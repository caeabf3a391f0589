//! Single scheduling loop with one next-due tick per pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{AdvisorConfig, IntervalConfig};
use crate::context::AdvisorContext;
use crate::env::{Environment, MessageSink};
use crate::lifecycle::AgentEvent;
use crate::perf::PerformanceReport;
use crate::types::{GameTick, Millis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorTask {
    Scan,
    Threat,
    Quest,
    Structure,
    PerformanceReport,
}

impl AdvisorTask {
    /// Execution order when several passes fall due on the same tick.
    pub const ALL: [AdvisorTask; 5] = [
        AdvisorTask::Scan,
        AdvisorTask::Threat,
        AdvisorTask::Quest,
        AdvisorTask::Structure,
        AdvisorTask::PerformanceReport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisorTask::Scan => "scan",
            AdvisorTask::Threat => "threat",
            AdvisorTask::Quest => "quest",
            AdvisorTask::Structure => "structure",
            AdvisorTask::PerformanceReport => "performance_report",
        }
    }

    pub fn interval(&self, intervals: &IntervalConfig) -> GameTick {
        match self {
            AdvisorTask::Scan => intervals.scan,
            AdvisorTask::Threat => intervals.threat_check,
            AdvisorTask::Quest => intervals.quest_update,
            AdvisorTask::Structure => intervals.structure_scan,
            AdvisorTask::PerformanceReport => intervals.performance_check,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorScheduler {
    intervals: IntervalConfig,
    next_due: BTreeMap<AdvisorTask, GameTick>,
}

impl AdvisorScheduler {
    /// Every pass first falls due one interval after `start_tick`.
    pub fn new(intervals: IntervalConfig, start_tick: GameTick) -> Self {
        let next_due = AdvisorTask::ALL
            .iter()
            .map(|task| {
                (
                    *task,
                    start_tick.saturating_add(task.interval(&intervals).max(1)),
                )
            })
            .collect();
        Self {
            intervals,
            next_due,
        }
    }

    pub fn next_due(&self, task: AdvisorTask) -> Option<GameTick> {
        self.next_due.get(&task).copied()
    }

    /// Tasks due at `tick`, in [`AdvisorTask::ALL`] order. Each returned task
    /// is rescheduled one interval after `tick`.
    pub fn due_tasks(&mut self, tick: GameTick) -> Vec<AdvisorTask> {
        let mut due = Vec::new();
        for task in AdvisorTask::ALL {
            let interval = task.interval(&self.intervals).max(1);
            let next = self.next_due.entry(task).or_insert(interval);
            if tick >= *next {
                *next = tick.saturating_add(interval);
                due.push(task);
            }
        }
        due
    }
}

/// Context plus scheduler: the whole advisor as driven by a host loop.
#[derive(Debug, Clone)]
pub struct AdvisorRuntime {
    context: AdvisorContext,
    scheduler: AdvisorScheduler,
    last_report: Option<PerformanceReport>,
}

impl AdvisorRuntime {
    pub fn new(config: AdvisorConfig, start_tick: GameTick) -> Self {
        let scheduler = AdvisorScheduler::new(config.intervals.clone(), start_tick);
        Self {
            context: AdvisorContext::new(config),
            scheduler,
            last_report: None,
        }
    }

    pub fn context(&self) -> &AdvisorContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AdvisorContext {
        &mut self.context
    }

    pub fn scheduler(&self) -> &AdvisorScheduler {
        &self.scheduler
    }

    pub fn last_report(&self) -> Option<&PerformanceReport> {
        self.last_report.as_ref()
    }

    /// Runs every pass due at `tick`. Returns the passes that ran.
    pub fn step<E, S>(&mut self, env: &E, sink: &mut S, tick: GameTick, now: Millis) -> Vec<AdvisorTask>
    where
        E: Environment + ?Sized,
        S: MessageSink + ?Sized,
    {
        let due = self.scheduler.due_tasks(tick);
        for task in &due {
            debug!(tick, task = task.as_str(), "running pass");
            match task {
                AdvisorTask::Scan => self.context.run_scan_pass(env, sink, now),
                AdvisorTask::Threat => self.context.run_threat_pass(env, sink, now),
                AdvisorTask::Quest => self.context.run_quest_pass(env, sink, now),
                AdvisorTask::Structure => self.context.run_structure_pass(env, sink, now),
                AdvisorTask::PerformanceReport => {
                    if let Some(report) = self.context.run_performance_pass(sink, now) {
                        self.last_report = Some(report);
                    }
                }
            }
        }
        due
    }

    pub fn handle_event<S: MessageSink + ?Sized>(&mut self, event: &AgentEvent, sink: &mut S) {
        self.context.handle_event(event, sink);
    }
}
