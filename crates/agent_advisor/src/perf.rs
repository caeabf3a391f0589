use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use crate::types::markup;

const DEFAULT_SAMPLE_WINDOW: usize = 128;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PassTimingSnapshot {
    pub samples_total: u64,
    pub samples_window: usize,
    pub last_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
}

/// Periodic operational summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformanceReport {
    pub updates: u64,
    pub errors: u64,
    pub dispatched: u64,
    pub suppressed: u64,
    pub scan_pass: PassTimingSnapshot,
    pub active_agents: usize,
    pub cache_entries: usize,
}

impl PerformanceReport {
    /// Two diagnostic lines, in the host's markup.
    pub fn lines(&self) -> [String; 2] {
        [
            format!(
                "{}[PERFORMANCE] Updates: {} | Errors: {} | Avg Time: {:.1}ms",
                markup::GRAY,
                self.updates,
                self.errors,
                self.scan_pass.avg_ms
            ),
            format!(
                "{}[TRACKING] Active Agents: {} | Cache Size: {}",
                markup::GRAY,
                self.active_agents,
                self.cache_entries
            ),
        ]
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Aggregate counters for the whole advisor process.
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    sample_window: usize,
    updates: u64,
    errors: u64,
    dispatched: u64,
    suppressed: u64,
    scan_pass: PassSeries,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::with_sample_window(DEFAULT_SAMPLE_WINDOW)
    }
}

impl PerformanceMonitor {
    pub fn with_sample_window(sample_window: usize) -> Self {
        Self {
            sample_window: sample_window.max(1),
            updates: 0,
            errors: 0,
            dispatched: 0,
            suppressed: 0,
            scan_pass: PassSeries::default(),
        }
    }

    /// Records a completed scan pass over all agents.
    pub fn record_scan_pass(&mut self, duration: Duration) {
        self.updates = self.updates.saturating_add(1);
        self.scan_pass
            .record(duration.as_secs_f64() * 1000.0, self.sample_window);
    }

    pub fn record_error(&mut self) {
        self.errors = self.errors.saturating_add(1);
    }

    pub fn record_dispatch(&mut self) {
        self.dispatched = self.dispatched.saturating_add(1);
    }

    pub fn record_suppressed(&mut self) {
        self.suppressed = self.suppressed.saturating_add(1);
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn report(&self, active_agents: usize, cache_entries: usize) -> PerformanceReport {
        PerformanceReport {
            updates: self.updates,
            errors: self.errors,
            dispatched: self.dispatched,
            suppressed: self.suppressed,
            scan_pass: self.scan_pass.snapshot(),
            active_agents,
            cache_entries,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PassSeries {
    window_samples: VecDeque<f64>,
    samples_total: u64,
    total_ms: f64,
    last_ms: f64,
    max_ms: f64,
}

impl PassSeries {
    fn record(&mut self, sample_ms: f64, sample_window: usize) {
        if !sample_ms.is_finite() || sample_ms < 0.0 {
            return;
        }
        self.samples_total = self.samples_total.saturating_add(1);
        self.total_ms += sample_ms;
        self.last_ms = sample_ms;
        self.max_ms = self.max_ms.max(sample_ms);
        self.window_samples.push_back(sample_ms);
        while self.window_samples.len() > sample_window {
            self.window_samples.pop_front();
        }
    }

    fn snapshot(&self) -> PassTimingSnapshot {
        let mut samples: Vec<f64> = self.window_samples.iter().copied().collect();
        samples.sort_by(|left, right| left.partial_cmp(right).unwrap_or(std::cmp::Ordering::Equal));
        let avg_ms = if self.samples_total > 0 {
            self.total_ms / self.samples_total as f64
        } else {
            0.0
        };
        PassTimingSnapshot {
            samples_total: self.samples_total,
            samples_window: samples.len(),
            last_ms: self.last_ms,
            avg_ms,
            max_ms: self.max_ms,
            p95_ms: percentile(&samples, 0.95),
        }
    }
}

fn percentile(samples: &[f64], percentile: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let index = ((samples.len() - 1) as f64 * percentile.clamp(0.0, 1.0)).round() as usize;
    samples[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_passes_feed_updates_and_timing() {
        let mut monitor = PerformanceMonitor::with_sample_window(3);
        monitor.record_scan_pass(Duration::from_millis(10));
        monitor.record_scan_pass(Duration::from_millis(20));
        monitor.record_scan_pass(Duration::from_millis(30));
        monitor.record_scan_pass(Duration::from_millis(40));

        let report = monitor.report(2, 7);
        assert_eq!(report.updates, 4);
        assert_eq!(report.scan_pass.samples_window, 3);
        assert!((report.scan_pass.avg_ms - 25.0).abs() < 1e-9);
        assert!((report.scan_pass.last_ms - 40.0).abs() < 1e-9);
        assert!((report.scan_pass.p95_ms - 40.0).abs() < 1e-9);
        assert_eq!(report.active_agents, 2);
        assert_eq!(report.cache_entries, 7);
    }

    #[test]
    fn report_lines_carry_counters() {
        let mut monitor = PerformanceMonitor::default();
        monitor.record_error();
        monitor.record_error();
        monitor.record_scan_pass(Duration::from_millis(4));
        let [first, second] = monitor.report(1, 12).lines();
        assert!(first.contains("Updates: 1"));
        assert!(first.contains("Errors: 2"));
        assert!(first.contains("Avg Time: 4.0ms"));
        assert!(second.contains("Active Agents: 1"));
        assert!(second.contains("Cache Size: 12"));
    }

    #[test]
    fn fresh_monitor_reports_zeroes_and_counts_outcomes() {
        let mut monitor = PerformanceMonitor::default();
        let report = monitor.report(0, 0);
        assert_eq!(report, PerformanceReport::default());
        assert!(report.to_json().expect("json").contains("\"updates\": 0"));

        monitor.record_dispatch();
        monitor.record_suppressed();
        monitor.record_suppressed();
        let report = monitor.report(0, 0);
        assert_eq!(report.dispatched, 1);
        assert_eq!(report.suppressed, 2);
        assert_eq!(report.updates, 0);
    }
}
