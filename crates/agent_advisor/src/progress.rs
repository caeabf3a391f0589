//! Four additive progress sub-scores derived from a snapshot and history.

use serde::{Deserialize, Serialize};

use crate::history::HistoryView;
use crate::snapshot::StateSnapshot;

pub const MAX_SCORE: u32 = 100;

const HEALTHY_ABOVE: f64 = 15.0;
const VETERAN_KILLS_ABOVE: u64 = 10;
const WELL_TRAVELED_REGIONS_ABOVE: usize = 3;
const LONG_DISTANCE_ABOVE: f64 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressScores {
    pub survival: u32,
    pub combat: u32,
    pub exploration: u32,
    pub crafting: u32,
}

impl ProgressScores {
    pub fn evaluate(snapshot: &StateSnapshot, history: &HistoryView) -> Self {
        Self {
            survival: survival_score(snapshot),
            combat: combat_score(snapshot, history),
            exploration: exploration_score(snapshot, history),
            crafting: crafting_score(snapshot),
        }
    }
}

fn sum(parts: &[(bool, u32)]) -> u32 {
    parts
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, weight)| *weight)
        .sum::<u32>()
        .min(MAX_SCORE)
}

pub fn survival_score(snapshot: &StateSnapshot) -> u32 {
    sum(&[
        (snapshot.has_food, 20),
        (snapshot.has_bed, 15),
        (snapshot.has_shelter, 10),
        (snapshot.has_water, 10),
        (snapshot.health > HEALTHY_ABOVE, 15),
    ])
}

pub fn combat_score(snapshot: &StateSnapshot, history: &HistoryView) -> u32 {
    sum(&[
        (snapshot.has_weapon, 25),
        (snapshot.has_iron_armor, 30),
        (snapshot.has_diamond_armor, 50),
        (snapshot.has_shield, 15),
        (history.kills > VETERAN_KILLS_ABOVE, 20),
    ])
}

pub fn exploration_score(snapshot: &StateSnapshot, history: &HistoryView) -> u32 {
    sum(&[
        (history.regions_visited > WELL_TRAVELED_REGIONS_ABOVE, 30),
        (history.discoveries > 0, 20),
        (history.distance_traveled > LONG_DISTANCE_ABOVE, 25),
        (snapshot.has_maps, 15),
    ])
}

pub fn crafting_score(snapshot: &StateSnapshot) -> u32 {
    sum(&[
        (snapshot.has_wood_tools, 10),
        (snapshot.has_stone_tools, 20),
        (snapshot.has_iron_tools, 35),
        (snapshot.has_diamond_tools, 50),
        (snapshot.has_enchanting_table, 25),
    ])
}
