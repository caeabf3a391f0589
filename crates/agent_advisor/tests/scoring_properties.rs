use agent_advisor::{
    analyze_danger, combat_score, crafting_score, exploration_score, generate_contextual_quests,
    survival_score, ActorCatalog, CooldownKey, CooldownRegistry, Dimension, ExpiringCache,
    HistoryView, NotificationChannel, ProgressScores, QuestInputs, StateSnapshot,
    ThresholdConfig, Vec3,
};
use proptest::prelude::*;

const KINDS: &[&str] = &[
    "minecraft:wither",
    "minecraft:ender_dragon",
    "minecraft:zombie",
    "minecraft:creeper",
    "minecraft:warden",
    "minecraft:iron_golem",
    "minecraft:cow",
    "custom:unknown",
];

fn snapshot_from(flags: [bool; 20], health: f64, hunger: f64) -> StateSnapshot {
    let mut snapshot = StateSnapshot::pessimistic(Dimension::Overworld, Vec3::default());
    snapshot.health = health;
    snapshot.hunger = hunger;
    snapshot.has_food = flags[0];
    snapshot.has_bed = flags[1];
    snapshot.has_water = flags[2];
    snapshot.has_shelter = flags[3];
    snapshot.has_wood = flags[4];
    snapshot.has_wood_tools = flags[5];
    snapshot.has_stone = flags[6];
    snapshot.has_stone_tools = flags[7];
    snapshot.has_iron = flags[8];
    snapshot.has_iron_tools = flags[9];
    snapshot.has_iron_armor = flags[10];
    snapshot.has_diamonds = flags[11];
    snapshot.has_diamond_tools = flags[12];
    snapshot.has_diamond_armor = flags[13];
    snapshot.has_enchanting_table = flags[14];
    snapshot.has_shield = flags[15];
    snapshot.has_weapon = flags[16];
    snapshot.inventory_full = flags[17];
    snapshot.low_durability = flags[18];
    snapshot.is_night = flags[19];
    snapshot
}

fn history_strategy() -> impl Strategy<Value = HistoryView> {
    (0_u64..5_000, 0_u64..30, 0_usize..8, 0_u64..4, 0.0_f64..10_000.0).prop_map(
        |(stationary_ticks, kills, regions_visited, discoveries, distance_traveled)| HistoryView {
            stationary_ticks,
            kills,
            regions_visited,
            discoveries,
            distance_traveled,
        },
    )
}

proptest! {
    #[test]
    fn danger_stays_within_bounds(
        kind_index in 0_usize..KINDS.len(),
        distance in 0.0_f64..64.0,
        health in prop::option::of(0.0_f64..20.0),
    ) {
        let danger = analyze_danger(
            &ActorCatalog::default(),
            &ThresholdConfig::default(),
            KINDS[kind_index],
            distance,
            health,
        );
        prop_assert!(danger <= 100);
    }

    #[test]
    fn bosses_always_score_maximal(
        distance in 0.0_f64..1_000.0,
        health in prop::option::of(0.0_f64..20.0),
    ) {
        for boss in ["minecraft:wither", "minecraft:ender_dragon"] {
            let danger = analyze_danger(
                &ActorCatalog::default(),
                &ThresholdConfig::default(),
                boss,
                distance,
                health,
            );
            prop_assert_eq!(danger, 100);
        }
    }

    #[test]
    fn closer_actors_are_never_less_dangerous(
        kind_index in 0_usize..KINDS.len(),
        near in 0.0_f64..12.0,
        extra in 0.0_f64..12.0,
    ) {
        let catalog = ActorCatalog::default();
        let thresholds = ThresholdConfig::default();
        let kind = KINDS[kind_index];
        let close = analyze_danger(&catalog, &thresholds, kind, near, Some(20.0));
        let far = analyze_danger(&catalog, &thresholds, kind, near + extra, Some(20.0));
        prop_assert!(close >= far);
    }

    #[test]
    fn progress_scores_stay_within_bounds(
        flags in any::<[bool; 20]>(),
        health in 0.0_f64..20.0,
        history in history_strategy(),
    ) {
        let snapshot = snapshot_from(flags, health, 20.0);
        let scores = ProgressScores::evaluate(&snapshot, &history);
        prop_assert!(scores.survival <= 100);
        prop_assert!(scores.combat <= 100);
        prop_assert!(scores.exploration <= 100);
        prop_assert!(scores.crafting <= 100);
    }

    #[test]
    fn gaining_a_capability_never_lowers_a_score(
        flags in any::<[bool; 20]>(),
        flip in 0_usize..20,
        health in 0.0_f64..20.0,
        history in history_strategy(),
    ) {
        let before = snapshot_from(flags, health, 20.0);
        let mut gained = flags;
        gained[flip] = true;
        let after = snapshot_from(gained, health, 20.0);

        prop_assert!(survival_score(&after) >= survival_score(&before));
        prop_assert!(combat_score(&after, &history) >= combat_score(&before, &history));
        prop_assert!(exploration_score(&after, &history) >= exploration_score(&before, &history));
        prop_assert!(crafting_score(&after) >= crafting_score(&before));
    }

    #[test]
    fn quest_lists_are_capped_and_ranked(
        flags in any::<[bool; 20]>(),
        health in 0.0_f64..20.0,
        hunger in 0.0_f64..20.0,
        history in history_strategy(),
        max in 1_usize..8,
    ) {
        let snapshot = snapshot_from(flags, health, hunger);
        let progress = ProgressScores::evaluate(&snapshot, &history);
        let thresholds = ThresholdConfig::default();
        let quests = generate_contextual_quests(
            &QuestInputs {
                snapshot: &snapshot,
                history: &history,
                progress: &progress,
                thresholds: &thresholds,
            },
            max,
        );
        prop_assert!(quests.len() <= max);
        prop_assert!(quests.windows(2).all(|pair| pair[0].priority >= pair[1].priority));
        if health < thresholds.critical_health {
            prop_assert_eq!(quests.first().map(|quest| quest.priority), Some(100));
        }
    }

    #[test]
    fn cache_serves_values_until_ttl_passes(
        ttl in 1_u64..10_000,
        set_at in 0_u64..1_000_000,
        offset in 0_u64..20_000,
    ) {
        let mut cache: ExpiringCache<&str, u32> = ExpiringCache::new(ttl);
        cache.set("key", 7, set_at);
        let read = cache.get(&"key", set_at + offset);
        if offset <= ttl {
            prop_assert_eq!(read, Some(7));
        } else {
            prop_assert_eq!(read, None);
            prop_assert!(cache.is_empty());
        }
    }

    #[test]
    fn cooldown_blocks_exactly_its_window(
        window_ticks in 1_u64..1_000,
        fired_at in 0_u64..1_000_000,
        elapsed in 0_u64..100_000,
    ) {
        let mut registry = CooldownRegistry::new(50);
        let key = CooldownKey::new("p1", NotificationChannel::Threat);
        let other = CooldownKey::new("p2", NotificationChannel::Threat);
        registry.set_cooldown(key.clone(), fired_at);

        let blocked = registry.is_on_cooldown(&key, window_ticks, fired_at + elapsed);
        prop_assert_eq!(blocked, elapsed < window_ticks * 50);
        prop_assert!(!registry.is_on_cooldown(&other, window_ticks, fired_at + elapsed));
    }
}
