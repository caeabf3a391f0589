//! Core identifiers, time units and message markup.

use serde::{Deserialize, Serialize};

pub type AgentId = String;
/// Wall-clock milliseconds.
pub type Millis = u64;
/// Host scheduler tick counter.
pub type GameTick = u64;

pub const DEFAULT_TICK_DURATION_MS: Millis = 50;

/// World/dimension an agent is in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
    Other(String),
}

impl Dimension {
    pub fn as_str(&self) -> &str {
        match self {
            Dimension::Overworld => "minecraft:overworld",
            Dimension::Nether => "minecraft:the_nether",
            Dimension::End => "minecraft:the_end",
            Dimension::Other(id) => id.as_str(),
        }
    }

    pub fn parse(input: &str) -> Self {
        match strip_namespace(input.trim()) {
            "overworld" => Dimension::Overworld,
            "the_nether" | "nether" => Dimension::Nether,
            "the_end" | "end" => Dimension::End,
            _ => Dimension::Other(input.trim().to_string()),
        }
    }
}

/// Drops a `namespace:` prefix from a host identifier.
pub fn strip_namespace(id: &str) -> &str {
    match id.split_once(':') {
        Some((_, name)) => name,
        None => id,
    }
}

/// Inline color markup understood by the host message sink.
pub mod markup {
    pub const DARK_RED: &str = "§4";
    pub const RED: &str = "§c";
    pub const GOLD: &str = "§6";
    pub const YELLOW: &str = "§e";
    pub const GREEN: &str = "§a";
    pub const DARK_GREEN: &str = "§2";
    pub const AQUA: &str = "§b";
    pub const DARK_AQUA: &str = "§3";
    pub const GRAY: &str = "§7";

    pub const SEPARATOR: &str = "§6━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
}
