//! Per-agent cumulative history, mutated only by that agent's tracking loop.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::geometry::{horizontal_distance, Vec3};
use crate::quest::Quest;
use crate::types::Millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentHistory {
    pub first_seen_ms: Millis,
    /// Anchor of the current stay; only moves when the agent travels.
    pub last_location: Vec3,
    /// Ticks spent within the movement threshold of `last_location`.
    pub stationary_ticks: u64,
    pub kills: u64,
    pub regions_visited: BTreeSet<String>,
    pub discoveries: u64,
    pub distance_traveled: f64,
    pub last_threat_message: Option<String>,
    pub last_quests: Option<Vec<Quest>>,
    pub has_traded: bool,
    pub notified_structures: BTreeSet<String>,
}

/// Compact numeric view used by scoring.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryView {
    pub stationary_ticks: u64,
    pub kills: u64,
    pub regions_visited: usize,
    pub discoveries: u64,
    pub distance_traveled: f64,
}

impl AgentHistory {
    pub fn new(location: Vec3, now: Millis) -> Self {
        Self {
            first_seen_ms: now,
            last_location: location,
            stationary_ticks: 0,
            kills: 0,
            regions_visited: BTreeSet::new(),
            discoveries: 0,
            distance_traveled: 0.0,
            last_threat_message: None,
            last_quests: None,
            has_traded: false,
            notified_structures: BTreeSet::new(),
        }
    }

    /// Folds one scan pass worth of movement into the history.
    ///
    /// Moving less than `threshold` horizontally accumulates `elapsed_ticks`
    /// of stationary time; anything further resets it, adds the distance and
    /// re-anchors the stay at `current`.
    pub fn record_movement(&mut self, current: Vec3, threshold: f64, elapsed_ticks: u64) -> f64 {
        let moved = horizontal_distance(current, self.last_location);
        if moved < threshold {
            self.stationary_ticks = self.stationary_ticks.saturating_add(elapsed_ticks);
        } else {
            self.stationary_ticks = 0;
            self.distance_traveled += moved;
            self.last_location = current;
        }
        moved
    }

    /// Records a region type; `unknown` regions are ignored. Returns true if new.
    pub fn visit_region(&mut self, region: &str) -> bool {
        if region == crate::snapshot::UNKNOWN_REGION {
            return false;
        }
        self.regions_visited.insert(region.to_string())
    }

    /// Counts a kill. Returns true when the total hits a multiple of `milestone`.
    pub fn record_kill(&mut self, milestone: u64) -> bool {
        self.kills = self.kills.saturating_add(1);
        milestone > 0 && self.kills % milestone == 0
    }

    pub fn view(&self) -> HistoryView {
        HistoryView {
            stationary_ticks: self.stationary_ticks,
            kills: self.kills,
            regions_visited: self.regions_visited.len(),
            discoveries: self.discoveries,
            distance_traveled: self.distance_traveled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_moves_accumulate_stationary_time() {
        let mut history = AgentHistory::new(Vec3::new(0.0, 64.0, 0.0), 0);
        history.record_movement(Vec3::new(5.0, 64.0, 5.0), 30.0, 60);
        history.record_movement(Vec3::new(10.0, 90.0, 0.0), 30.0, 60);
        assert_eq!(history.stationary_ticks, 120);
        assert_eq!(history.distance_traveled, 0.0);
        assert_eq!(history.last_location, Vec3::new(0.0, 64.0, 0.0));
    }

    #[test]
    fn travel_resets_stay_and_adds_distance() {
        let mut history = AgentHistory::new(Vec3::new(0.0, 64.0, 0.0), 0);
        history.record_movement(Vec3::new(1.0, 64.0, 0.0), 30.0, 60);
        let moved = history.record_movement(Vec3::new(30.0, 64.0, 40.0), 30.0, 60);
        assert!((moved - 50.0).abs() < 1e-9);
        assert_eq!(history.stationary_ticks, 0);
        assert!((history.distance_traveled - 50.0).abs() < 1e-9);
        assert_eq!(history.last_location, Vec3::new(30.0, 64.0, 40.0));
    }

    #[test]
    fn regions_are_a_set_and_unknown_is_skipped() {
        let mut history = AgentHistory::new(Vec3::default(), 0);
        assert!(history.visit_region("plains"));
        assert!(!history.visit_region("plains"));
        assert!(!history.visit_region("unknown"));
        assert!(history.visit_region("desert"));
        assert_eq!(history.view().regions_visited, 2);
    }

    #[test]
    fn kill_milestones_fire_every_tenth_kill() {
        let mut history = AgentHistory::new(Vec3::default(), 0);
        let milestones = (0..25).filter(|_| history.record_kill(10)).count();
        assert_eq!(milestones, 2);
        assert_eq!(history.kills, 25);
    }
}
