//! Contextual advisories from an ordered rule table.
//!
//! Every rule is evaluated independently; matches are ranked by priority
//! (stable, so ties keep table order) and cut to the configured maximum.

use serde::{Deserialize, Serialize};

use crate::config::{AdvisorConfig, ThresholdConfig};
use crate::history::HistoryView;
use crate::progress::ProgressScores;
use crate::snapshot::StateSnapshot;
use crate::types::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestCategory {
    Survival,
    Combat,
    Exploration,
    Crafting,
}

impl QuestCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestCategory::Survival => "survival",
            QuestCategory::Combat => "combat",
            QuestCategory::Exploration => "exploration",
            QuestCategory::Crafting => "crafting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    Critical,
    Dimension,
    Survival,
    Safety,
    Inventory,
    Progression,
    Combat,
    Exploration,
    Region,
    Trading,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub kind: QuestKind,
    pub category: QuestCategory,
    pub priority: u32,
    pub text: String,
}

/// Everything a rule predicate may look at.
pub struct QuestInputs<'a> {
    pub snapshot: &'a StateSnapshot,
    pub history: &'a HistoryView,
    pub progress: &'a ProgressScores,
    pub thresholds: &'a ThresholdConfig,
}

struct QuestRule {
    kind: QuestKind,
    category: QuestCategory,
    priority: u32,
    text: &'static str,
    applies: fn(&QuestInputs<'_>) -> bool,
}

const RULES: &[QuestRule] = &[
    QuestRule {
        kind: QuestKind::Critical,
        category: QuestCategory::Survival,
        priority: 100,
        text: "§4[CRITICAL] IMMEDIATE DANGER - Heal or retreat NOW!",
        applies: |q| q.snapshot.health < q.thresholds.critical_health,
    },
    QuestRule {
        kind: QuestKind::Dimension,
        category: QuestCategory::Survival,
        priority: 85,
        text: "§c[NETHER] Brew fire resistance potions for safety",
        applies: |q| q.snapshot.dimension == Dimension::Nether && !q.snapshot.has_fire_resistance,
    },
    QuestRule {
        kind: QuestKind::Dimension,
        category: QuestCategory::Exploration,
        priority: 80,
        text: "§d[END] Collect ender pearls to navigate islands",
        applies: |q| q.snapshot.dimension == Dimension::End && !q.snapshot.has_ender_pearls,
    },
    QuestRule {
        kind: QuestKind::Survival,
        category: QuestCategory::Survival,
        priority: 90,
        text: "§e[HUNGER] Critical food shortage - Hunt or harvest immediately",
        applies: |q| !q.snapshot.has_food && q.snapshot.hunger < q.thresholds.low_hunger,
    },
    QuestRule {
        kind: QuestKind::Safety,
        category: QuestCategory::Survival,
        priority: 75,
        text: "§c[NIGHT CYCLE] Build shelter - Hostile spawns active",
        applies: |q| q.snapshot.is_night && !q.snapshot.has_shelter && q.progress.survival < 50,
    },
    QuestRule {
        kind: QuestKind::Inventory,
        category: QuestCategory::Crafting,
        priority: 60,
        text: "§6[STORAGE] Inventory full - Craft ender chest for portable storage",
        applies: |q| q.snapshot.inventory_full && !q.snapshot.has_portable_storage,
    },
    QuestRule {
        kind: QuestKind::Progression,
        category: QuestCategory::Crafting,
        priority: 70,
        text: "§a[START] Craft wooden tools to begin your journey",
        applies: |q| q.progress.crafting < 30 && q.snapshot.has_wood && !q.snapshot.has_wood_tools,
    },
    QuestRule {
        kind: QuestKind::Progression,
        category: QuestCategory::Crafting,
        priority: 65,
        text: "§a[UPGRADE] Stone tools available - 2x durability improvement",
        applies: |q| {
            q.progress.crafting >= 30 && q.snapshot.has_stone && !q.snapshot.has_stone_tools
        },
    },
    QuestRule {
        kind: QuestKind::Progression,
        category: QuestCategory::Crafting,
        priority: 68,
        text: "§b[UPGRADE] Smelt iron - Unlock superior tool tier",
        applies: |q| q.progress.crafting >= 50 && q.snapshot.has_iron && !q.snapshot.has_iron_tools,
    },
    QuestRule {
        kind: QuestKind::Combat,
        category: QuestCategory::Combat,
        priority: 72,
        text: "§b[DEFENSE] Craft iron armor - Reduce damage by 60%",
        applies: |q| q.snapshot.has_iron && !q.snapshot.has_iron_armor && q.progress.combat < 40,
    },
    QuestRule {
        kind: QuestKind::Progression,
        category: QuestCategory::Crafting,
        priority: 80,
        text: "§3[ELITE] Diamond tools available - Maximum efficiency",
        applies: |q| q.snapshot.has_diamonds && !q.snapshot.has_diamond_tools,
    },
    QuestRule {
        kind: QuestKind::Progression,
        category: QuestCategory::Crafting,
        priority: 78,
        text: "§5[ENCHANT] Build enchanting table - Unlock powerful upgrades",
        applies: |q| q.snapshot.has_diamonds && !q.snapshot.has_enchanting_table,
    },
    QuestRule {
        kind: QuestKind::Exploration,
        category: QuestCategory::Exploration,
        priority: 50,
        text: "§d[EXPLORE] Stagnant location - New biomes offer unique resources",
        applies: |q| q.history.stationary_ticks > q.thresholds.stagnant_time,
    },
    QuestRule {
        kind: QuestKind::Region,
        category: QuestCategory::Survival,
        priority: 73,
        text: "§6[DESERT] Find oasis or craft water bottles - Dehydration risk",
        applies: |q| q.snapshot.region == "desert" && !q.snapshot.has_water,
    },
    QuestRule {
        kind: QuestKind::Region,
        category: QuestCategory::Exploration,
        priority: 55,
        text: "§9[OCEAN] Craft a boat for efficient water travel",
        applies: |q| q.snapshot.region == "ocean" && !q.snapshot.has_boat,
    },
    QuestRule {
        kind: QuestKind::Trading,
        category: QuestCategory::Exploration,
        priority: 58,
        text: "§2[VILLAGE] Trade with villagers for rare items and discounts",
        applies: |q| q.snapshot.near_settlement && !q.snapshot.has_traded,
    },
    QuestRule {
        kind: QuestKind::Combat,
        category: QuestCategory::Combat,
        priority: 62,
        text: "§7[DEFENSE] Craft a shield to block attacks and explosions",
        applies: |q| !q.snapshot.has_shield && q.progress.combat > 30,
    },
    QuestRule {
        kind: QuestKind::Maintenance,
        category: QuestCategory::Crafting,
        priority: 65,
        text: "§e[REPAIR] Tool durability critical - Use anvil or craft replacement",
        applies: |q| q.snapshot.low_durability,
    },
];

/// Every matching rule, in table order, before ranking.
pub fn matching_quests(inputs: &QuestInputs<'_>) -> Vec<Quest> {
    RULES
        .iter()
        .filter(|rule| (rule.applies)(inputs))
        .map(|rule| Quest {
            kind: rule.kind,
            category: rule.category,
            priority: rule.priority,
            text: rule.text.to_string(),
        })
        .collect()
}

pub fn generate_contextual_quests(inputs: &QuestInputs<'_>, max_quests: usize) -> Vec<Quest> {
    let mut quests = matching_quests(inputs);
    quests.sort_by(|left, right| right.priority.cmp(&left.priority));
    quests.truncate(max_quests);
    quests
}

pub struct QuestGenerator<'a> {
    config: &'a AdvisorConfig,
}

impl<'a> QuestGenerator<'a> {
    pub fn new(config: &'a AdvisorConfig) -> Self {
        Self { config }
    }

    pub fn generate(
        &self,
        snapshot: &StateSnapshot,
        history: &HistoryView,
        progress: &ProgressScores,
    ) -> Vec<Quest> {
        let inputs = QuestInputs {
            snapshot,
            history,
            progress,
            thresholds: &self.config.thresholds,
        };
        generate_contextual_quests(&inputs, self.config.max_quests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;

    fn blank() -> StateSnapshot {
        StateSnapshot::pessimistic(Dimension::Overworld, Vec3::default())
    }

    fn run(snapshot: &StateSnapshot, history: &HistoryView) -> Vec<Quest> {
        let config = AdvisorConfig::default();
        let progress = ProgressScores::evaluate(snapshot, history);
        QuestGenerator::new(&config).generate(snapshot, history, &progress)
    }

    #[test]
    fn comfortable_agent_gets_no_quests() {
        assert!(run(&blank(), &HistoryView::default()).is_empty());
    }

    #[test]
    fn stagnation_yields_explore_quest() {
        let history = HistoryView {
            stationary_ticks: 2401,
            ..HistoryView::default()
        };
        let quests = run(&blank(), &history);
        assert_eq!(quests.len(), 1);
        assert!(quests[0].text.contains("Stagnant location"));
        assert_eq!(quests[0].category, QuestCategory::Exploration);

        let history = HistoryView {
            stationary_ticks: 2400,
            ..HistoryView::default()
        };
        assert!(run(&blank(), &history).is_empty());
    }

    #[test]
    fn output_is_capped_and_ranked() {
        let mut snapshot = blank();
        snapshot.health = 4.0;
        snapshot.hunger = 2.0;
        snapshot.dimension = Dimension::Nether;
        snapshot.has_diamonds = true;
        snapshot.has_iron = true;
        snapshot.low_durability = true;
        snapshot.inventory_full = true;
        let history = HistoryView {
            stationary_ticks: 5000,
            ..HistoryView::default()
        };

        let config = AdvisorConfig::default();
        let progress = ProgressScores::evaluate(&snapshot, &history);
        let inputs = QuestInputs {
            snapshot: &snapshot,
            history: &history,
            progress: &progress,
            thresholds: &config.thresholds,
        };
        assert!(matching_quests(&inputs).len() > 4);

        let quests = run(&snapshot, &history);
        let priorities: Vec<u32> = quests.iter().map(|quest| quest.priority).collect();
        assert_eq!(priorities, vec![100, 90, 85, 80]);
        assert_eq!(quests[3].text, "§3[ELITE] Diamond tools available - Maximum efficiency");
    }

    #[test]
    fn ties_keep_rule_order() {
        let mut snapshot = blank();
        snapshot.low_durability = true;
        snapshot.has_stone = true;
        snapshot.has_wood_tools = true;
        snapshot.has_iron_tools = true;
        let quests = run(&snapshot, &HistoryView::default());
        let kinds: Vec<QuestKind> = quests.iter().map(|quest| quest.kind).collect();
        assert_eq!(kinds, vec![QuestKind::Progression, QuestKind::Maintenance]);
        assert!(quests.iter().all(|quest| quest.priority == 65));
    }

    #[test]
    fn region_rules_match_stripped_region_names() {
        let mut snapshot = blank();
        snapshot.region = "desert".to_string();
        let quests = run(&snapshot, &HistoryView::default());
        assert_eq!(quests.len(), 1);
        assert!(quests[0].text.starts_with("§6[DESERT]"));

        snapshot.region = "ocean".to_string();
        snapshot.has_boat = true;
        assert!(run(&snapshot, &HistoryView::default()).is_empty());
    }
}
