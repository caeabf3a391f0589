//! Boundary to the host environment: sensor queries in, messages out.
//!
//! Everything behind these traits is a thin wrapper around a platform API.
//! Implementations may fail any query; callers treat failures as transient.

use serde::{Deserialize, Serialize};

use crate::error::EnvError;
use crate::geometry::{CellPos, Vec3};
use crate::types::{AgentId, Dimension};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Durability {
    pub damage: u32,
    pub max: u32,
}

impl Durability {
    pub fn worn_ratio(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        self.damage as f64 / self.max as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: String,
    pub count: u32,
    /// Host reports the item as edible.
    #[serde(default)]
    pub edible: bool,
    #[serde(default)]
    pub durability: Option<Durability>,
}

impl ItemStack {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            count: 1,
            edible: false,
            durability: None,
        }
    }

    pub fn edible(mut self) -> Self {
        self.edible = true;
        self
    }

    pub fn with_durability(mut self, damage: u32, max: u32) -> Self {
        self.durability = Some(Durability { damage, max });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Inventory {
    pub slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    pub fn with_capacity(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Places the stack in the first empty slot. Returns false if full.
    pub fn push(&mut self, stack: ItemStack) -> bool {
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(stack);
                true
            }
            None => false,
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    pub fn empty_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    pub fn is_full(&self) -> bool {
        !self.slots.is_empty() && self.empty_slots() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breath {
    pub air: i32,
    pub max_air: i32,
}

/// Raw condition of an agent as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReading {
    pub agent_id: AgentId,
    pub position: Vec3,
    pub dimension: Dimension,
    pub health: Option<f64>,
    pub max_health: f64,
    pub hunger: Option<f64>,
    pub breath: Option<Breath>,
    pub in_water: bool,
    pub inventory: Option<Inventory>,
}

impl AgentReading {
    pub fn new(agent_id: impl Into<String>, position: Vec3) -> Self {
        Self {
            agent_id: agent_id.into(),
            position,
            dimension: Dimension::Overworld,
            health: Some(20.0),
            max_health: 20.0,
            hunger: Some(20.0),
            breath: None,
            in_water: false,
            inventory: Some(Inventory::with_capacity(36)),
        }
    }
}

/// A non-terrain entity near an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorHandle {
    pub id: String,
    pub kind: String,
    pub position: Vec3,
}

/// Nearby-actor query: every actor within `max_distance` of `center`,
/// optionally restricted to one `kind` and excluding `exclude_kinds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorQuery {
    pub center: Vec3,
    pub max_distance: f64,
    pub kind: Option<String>,
    pub exclude_kinds: Vec<String>,
}

impl ActorQuery {
    pub fn around(center: Vec3, max_distance: f64) -> Self {
        Self {
            center,
            max_distance,
            kind: None,
            exclude_kinds: Vec::new(),
        }
    }

    pub fn of_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn excluding(mut self, kinds: &[String]) -> Self {
        self.exclude_kinds = kinds.to_vec();
        self
    }

    pub fn matches(&self, actor: &ActorHandle) -> bool {
        if let Some(kind) = &self.kind {
            if &actor.kind != kind {
                return false;
            }
        }
        if self.exclude_kinds.iter().any(|kind| kind == &actor.kind) {
            return false;
        }
        crate::geometry::space_distance(self.center, actor.position) <= self.max_distance
    }
}

/// Read-only sensor surface of the host environment.
pub trait Environment {
    fn list_agents(&self) -> Result<Vec<AgentId>, EnvError>;

    fn query_agent_state(&self, agent_id: &str) -> Result<AgentReading, EnvError>;

    /// `Ok(None)` means the cell is not loaded or holds nothing.
    fn query_terrain_cell(
        &self,
        dimension: &Dimension,
        cell: CellPos,
    ) -> Result<Option<String>, EnvError>;

    fn query_nearby_actors(
        &self,
        dimension: &Dimension,
        query: &ActorQuery,
    ) -> Result<Vec<ActorHandle>, EnvError>;

    fn query_region_type(&self, dimension: &Dimension, position: Vec3)
        -> Result<String, EnvError>;

    /// Tick within the host day cycle.
    fn query_time_of_day(&self) -> Result<u32, EnvError>;

    /// Generated structures whose bounds contain `position`.
    fn query_structures(
        &self,
        _dimension: &Dimension,
        _position: Vec3,
    ) -> Result<Vec<String>, EnvError> {
        Err(EnvError::Unsupported {
            what: "structure queries",
        })
    }
}

/// Outbound message surface.
pub trait MessageSink {
    fn send_message(&mut self, agent_id: &str, text: &str);

    /// Operational telemetry; not an alert.
    fn log_diagnostic(&mut self, text: &str);
}
