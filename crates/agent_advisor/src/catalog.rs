//! Static lookup tables: hazardous terrain, valuable resources, hazardous
//! actor classes, structure messages and item capability tags.
//!
//! All tables are plain immutable maps keyed by host identifier. Unknown
//! identifiers simply do not match anything.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Hazardous terrain entry: fixed alert priority and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainHazard {
    pub priority: i32,
    pub message: String,
}

/// Valuable resource entry: rarity rank and discovery message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSignature {
    pub rarity: i32,
    pub message: String,
}

/// Danger tier of an actor class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardClass {
    Boss,
    Hostile,
    PassiveDanger,
    Unclassified,
}

impl HazardClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardClass::Boss => "boss",
            HazardClass::Hostile => "hostile",
            HazardClass::PassiveDanger => "passive_danger",
            HazardClass::Unclassified => "unclassified",
        }
    }
}

fn ids(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|id| id.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorCatalog {
    pub boss: BTreeSet<String>,
    pub hostile: BTreeSet<String>,
    pub passive_danger: BTreeSet<String>,
    /// Actor kinds never considered threats (agents themselves, dropped items).
    pub excluded_kinds: Vec<String>,
    /// Trading-capable actor kind used for the settlement census.
    pub trader_kind: String,
    /// Raider kind used for outpost detection.
    pub raider_kind: String,
    /// Extra danger for named special cases (explosive, apex predator).
    pub special_bonus: BTreeMap<String, i32>,
}

impl Default for ActorCatalog {
    fn default() -> Self {
        Self {
            boss: ids(&["minecraft:wither", "minecraft:ender_dragon"]),
            hostile: ids(&[
                "minecraft:zombie",
                "minecraft:skeleton",
                "minecraft:creeper",
                "minecraft:spider",
                "minecraft:enderman",
                "minecraft:witch",
                "minecraft:drowned",
                "minecraft:husk",
                "minecraft:stray",
                "minecraft:phantom",
                "minecraft:piglin",
                "minecraft:zoglin",
                "minecraft:blaze",
                "minecraft:ghast",
                "minecraft:hoglin",
                "minecraft:wither_skeleton",
            ]),
            passive_danger: ids(&[
                "minecraft:iron_golem",
                "minecraft:warden",
                "minecraft:piglin_brute",
            ]),
            excluded_kinds: vec!["minecraft:player".to_string(), "minecraft:item".to_string()],
            trader_kind: "minecraft:villager".to_string(),
            raider_kind: "minecraft:pillager".to_string(),
            special_bonus: BTreeMap::from([
                ("minecraft:creeper".to_string(), 25),
                ("minecraft:warden".to_string(), 50),
            ]),
        }
    }
}

impl ActorCatalog {
    /// Boss membership wins over hostile, hostile over passive danger.
    pub fn classify(&self, kind: &str) -> HazardClass {
        if self.boss.contains(kind) {
            HazardClass::Boss
        } else if self.hostile.contains(kind) {
            HazardClass::Hostile
        } else if self.passive_danger.contains(kind) {
            HazardClass::PassiveDanger
        } else {
            HazardClass::Unclassified
        }
    }

    pub fn bonus(&self, kind: &str) -> i32 {
        self.special_bonus.get(kind).copied().unwrap_or(0)
    }

    pub fn is_hostile(&self, kind: &str) -> bool {
        self.hostile.contains(kind)
    }
}

pub fn default_terrain_hazards() -> BTreeMap<String, TerrainHazard> {
    let entry = |priority: i32, message: &str| TerrainHazard {
        priority,
        message: message.to_string(),
    };
    BTreeMap::from([
        ("minecraft:lava".to_string(), entry(10, "§4[CRITICAL] LAVA DETECTED!")),
        ("minecraft:flowing_lava".to_string(), entry(10, "§4[CRITICAL] FLOWING LAVA!")),
        ("minecraft:fire".to_string(), entry(7, "§c[DANGER] FIRE NEARBY!")),
        ("minecraft:magma".to_string(), entry(6, "§6[WARNING] Magma block detected!")),
        (
            "minecraft:sweet_berry_bush".to_string(),
            entry(2, "§e[CAUTION] Berry bush ahead"),
        ),
        ("minecraft:cactus".to_string(), entry(2, "§e[CAUTION] Cactus nearby")),
    ])
}

pub fn default_resource_signatures() -> BTreeMap<String, ResourceSignature> {
    let entry = |rarity: i32, message: &str| ResourceSignature {
        rarity,
        message: message.to_string(),
    };
    BTreeMap::from([
        ("minecraft:diamond_ore".to_string(), entry(10, "§b✦ DIAMONDS DETECTED! ✦")),
        (
            "minecraft:deepslate_diamond_ore".to_string(),
            entry(10, "§b✦ DIAMONDS DETECTED! ✦"),
        ),
        ("minecraft:ancient_debris".to_string(), entry(15, "§6✦ ANCIENT DEBRIS FOUND! ✦")),
        ("minecraft:emerald_ore".to_string(), entry(12, "§a✦ EMERALD DISCOVERED! ✦")),
        (
            "minecraft:deepslate_emerald_ore".to_string(),
            entry(12, "§a✦ EMERALD DISCOVERED! ✦"),
        ),
        ("minecraft:gold_ore".to_string(), entry(5, "§e⚑ Gold ore detected")),
        ("minecraft:deepslate_gold_ore".to_string(), entry(5, "§e⚑ Gold ore detected")),
        ("minecraft:nether_gold_ore".to_string(), entry(3, "§e⚑ Nether gold ore detected")),
    ])
}

pub fn default_structure_messages() -> BTreeMap<String, String> {
    [
        ("village", "§2[DISCOVERY] §aVillage - Trade, rest, and resupply"),
        ("desert_pyramid", "§6[DISCOVERY] §eDesert Temple - Treasure and traps await"),
        ("jungle_pyramid", "§a[DISCOVERY] §2Jungle Temple - Ancient mechanisms inside"),
        ("pillager_outpost", "§c[DISCOVERY] §4Pillager Outpost - Extreme danger!"),
        ("mansion", "§5[DISCOVERY] §dWoodland Mansion - Rare loot and totems"),
        ("stronghold", "§3[DISCOVERY] §bStronghold - Portal to The End"),
        ("fortress", "§4[DISCOVERY] §cNether Fortress - Blaze rods and wither skeletons"),
        ("bastion", "§6[DISCOVERY] §eBastion Remnant - Netherite and piglin gold"),
        ("end_city", "§d[DISCOVERY] §5End City - Elytra and shulker boxes"),
        ("monument", "§b[DISCOVERY] §3Ocean Monument - Sponges and prismarine"),
    ]
    .into_iter()
    .map(|(id, message)| (id.to_string(), message.to_string()))
    .collect()
}

// ============================================================================
// Item capability tags
// ============================================================================

/// Semantic fact an inventory item implies about its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemTag {
    Food,
    Bed,
    WaterSource,
    Wood,
    Stone,
    Iron,
    Diamonds,
    WoodTool,
    StoneTool,
    IronTool,
    DiamondTool,
    IronArmor,
    DiamondArmor,
    Weapon,
    Shield,
    EnchantingTable,
    PortableStorage,
    Boat,
    Map,
    FireResistance,
    EnderPearl,
}

/// Explicit item identifier → capability tags table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTagTable {
    tags: BTreeMap<String, BTreeSet<ItemTag>>,
}

const WOOD_TYPES: &[&str] = &[
    "oak", "spruce", "birch", "jungle", "acacia", "dark_oak", "mangrove", "cherry", "bamboo",
];
const BED_COLORS: &[&str] = &[
    "white", "orange", "magenta", "light_blue", "yellow", "lime", "pink", "gray", "light_gray",
    "cyan", "purple", "blue", "brown", "green", "red", "black",
];
const TOOL_KINDS: &[&str] = &["pickaxe", "axe", "shovel"];
const ARMOR_PIECES: &[&str] = &["helmet", "chestplate", "leggings", "boots"];
const FOODS: &[&str] = &[
    "apple", "bread", "baked_potato", "carrot", "cooked_beef", "cooked_chicken", "cooked_cod",
    "cooked_mutton", "cooked_porkchop", "cooked_rabbit", "cooked_salmon", "golden_carrot",
    "melon_slice", "pumpkin_pie", "sweet_berries", "beef", "porkchop", "chicken", "mutton",
];

impl Default for ItemTagTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for food in FOODS {
            table.tag(&format!("minecraft:{food}"), ItemTag::Food);
        }
        for color in BED_COLORS {
            table.tag(&format!("minecraft:{color}_bed"), ItemTag::Bed);
        }
        table.tag("minecraft:water_bucket", ItemTag::WaterSource);
        for wood in WOOD_TYPES {
            table.tag(&format!("minecraft:{wood}_log"), ItemTag::Wood);
            table.tag(&format!("minecraft:{wood}_planks"), ItemTag::Wood);
            table.tag(&format!("minecraft:{wood}_boat"), ItemTag::Boat);
        }
        table.tag("minecraft:boat", ItemTag::Boat);
        table.tag("minecraft:cobblestone", ItemTag::Stone);
        table.tag("minecraft:stone", ItemTag::Stone);
        table.tag("minecraft:iron_ingot", ItemTag::Iron);
        table.tag("minecraft:diamond", ItemTag::Diamonds);

        for (tier, tool_tag) in [
            ("wooden", ItemTag::WoodTool),
            ("stone", ItemTag::StoneTool),
            ("iron", ItemTag::IronTool),
            ("diamond", ItemTag::DiamondTool),
        ] {
            for kind in TOOL_KINDS {
                table.tag(&format!("minecraft:{tier}_{kind}"), tool_tag);
            }
            table.tag(&format!("minecraft:{tier}_axe"), ItemTag::Weapon);
            table.tag(&format!("minecraft:{tier}_sword"), ItemTag::Weapon);
            // Every wooden/stone item counts toward the tier, swords included.
            if matches!(tool_tag, ItemTag::WoodTool | ItemTag::StoneTool) {
                table.tag(&format!("minecraft:{tier}_sword"), tool_tag);
                table.tag(&format!("minecraft:{tier}_hoe"), tool_tag);
            }
        }
        for tier in ["golden", "netherite"] {
            table.tag(&format!("minecraft:{tier}_sword"), ItemTag::Weapon);
            table.tag(&format!("minecraft:{tier}_axe"), ItemTag::Weapon);
        }
        for (tier, armor_tag) in [("iron", ItemTag::IronArmor), ("diamond", ItemTag::DiamondArmor)] {
            for piece in ARMOR_PIECES {
                table.tag(&format!("minecraft:{tier}_{piece}"), armor_tag);
            }
        }

        table.tag("minecraft:shield", ItemTag::Shield);
        table.tag("minecraft:enchanting_table", ItemTag::EnchantingTable);
        table.tag("minecraft:ender_chest", ItemTag::PortableStorage);
        table.tag("minecraft:map", ItemTag::Map);
        table.tag("minecraft:empty_map", ItemTag::Map);
        table.tag("minecraft:filled_map", ItemTag::Map);
        table.tag("minecraft:fire_resistance", ItemTag::FireResistance);
        table.tag("minecraft:ender_pearl", ItemTag::EnderPearl);
        table
    }
}

impl ItemTagTable {
    pub fn empty() -> Self {
        Self {
            tags: BTreeMap::new(),
        }
    }

    pub fn tag(&mut self, item_id: &str, tag: ItemTag) {
        self.tags.entry(item_id.to_string()).or_default().insert(tag);
    }

    pub fn tags_for(&self, item_id: &str) -> impl Iterator<Item = ItemTag> + '_ {
        self.tags.get(item_id).into_iter().flat_map(|tags| tags.iter().copied())
    }

    pub fn has(&self, item_id: &str, tag: ItemTag) -> bool {
        self.tags
            .get(item_id)
            .map(|tags| tags.contains(&tag))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_prefers_boss_tier() {
        let mut catalog = ActorCatalog::default();
        catalog.hostile.insert("minecraft:wither".to_string());
        assert_eq!(catalog.classify("minecraft:wither"), HazardClass::Boss);
        assert_eq!(catalog.classify("minecraft:zombie"), HazardClass::Hostile);
        assert_eq!(catalog.classify("minecraft:warden"), HazardClass::PassiveDanger);
        assert_eq!(catalog.classify("minecraft:cow"), HazardClass::Unclassified);
        assert_eq!(catalog.bonus("minecraft:creeper"), 25);
        assert_eq!(catalog.bonus("minecraft:zombie"), 0);
    }

    #[test]
    fn item_tags_replace_name_patterns() {
        let table = ItemTagTable::default();
        assert!(table.has("minecraft:iron_pickaxe", ItemTag::IronTool));
        assert!(!table.has("minecraft:iron_pickaxe", ItemTag::Weapon));
        assert!(table.has("minecraft:iron_axe", ItemTag::IronTool));
        assert!(table.has("minecraft:iron_axe", ItemTag::Weapon));
        assert!(table.has("minecraft:diamond_boots", ItemTag::DiamondArmor));
        assert!(table.has("minecraft:wooden_sword", ItemTag::WoodTool));
        assert!(table.has("minecraft:red_bed", ItemTag::Bed));
        assert!(table.has("minecraft:birch_boat", ItemTag::Boat));
        // No substring accidents: stone bricks are neither tools nor raw stone.
        assert_eq!(table.tags_for("minecraft:stone_bricks").count(), 0);
        assert_eq!(table.tags_for("minecraft:iron_ore").count(), 0);
    }

    #[test]
    fn default_catalogs_carry_reference_weights() {
        let hazards = default_terrain_hazards();
        assert_eq!(hazards["minecraft:lava"].priority, 10);
        assert_eq!(hazards["minecraft:cactus"].priority, 2);
        let resources = default_resource_signatures();
        assert_eq!(resources["minecraft:ancient_debris"].rarity, 15);
        assert_eq!(resources["minecraft:nether_gold_ore"].rarity, 3);
        assert!(default_structure_messages().contains_key("stronghold"));
    }
}
