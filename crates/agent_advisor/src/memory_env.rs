//! In-memory environment and recording sink, for tests and the demo binary.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::env::{ActorHandle, ActorQuery, AgentReading, Environment, MessageSink};
use crate::error::EnvError;
use crate::geometry::{CellPos, Vec3};
use crate::types::{AgentId, Dimension};

/// Query family, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    ListAgents,
    AgentState,
    TerrainCell,
    NearbyActors,
    RegionType,
    TimeOfDay,
    Structures,
}

#[derive(Debug, Default)]
pub struct InMemoryEnvironment {
    agents: BTreeMap<AgentId, AgentReading>,
    terrain: HashMap<(Dimension, CellPos), String>,
    actors: Vec<(Dimension, ActorHandle)>,
    regions: HashMap<(Dimension, i32, i32), String>,
    default_region: Option<String>,
    structures: Vec<(Dimension, CellPos, f64, String)>,
    time_of_day: u32,
    failing: BTreeSet<QueryKind>,
    unreadable_agents: BTreeSet<AgentId>,
    terrain_queries: Cell<u64>,
}

impl InMemoryEnvironment {
    pub fn new() -> Self {
        Self {
            default_region: Some("minecraft:plains".to_string()),
            ..Self::default()
        }
    }

    pub fn put_agent(&mut self, reading: AgentReading) {
        self.agents.insert(reading.agent_id.clone(), reading);
    }

    pub fn remove_agent(&mut self, agent_id: &str) -> Option<AgentReading> {
        self.agents.remove(agent_id)
    }

    pub fn agent_mut(&mut self, agent_id: &str) -> Option<&mut AgentReading> {
        self.agents.get_mut(agent_id)
    }

    pub fn set_terrain(&mut self, dimension: Dimension, cell: CellPos, terrain_id: &str) {
        self.terrain.insert((dimension, cell), terrain_id.to_string());
    }

    pub fn clear_terrain(&mut self, dimension: &Dimension, cell: CellPos) {
        self.terrain.remove(&(dimension.clone(), cell));
    }

    pub fn spawn_actor(
        &mut self,
        dimension: Dimension,
        id: &str,
        kind: &str,
        position: Vec3,
    ) {
        self.actors.push((
            dimension,
            ActorHandle {
                id: id.to_string(),
                kind: kind.to_string(),
                position,
            },
        ));
    }

    pub fn despawn_actor(&mut self, id: &str) {
        self.actors.retain(|(_, actor)| actor.id != id);
    }

    pub fn move_actor(&mut self, id: &str, position: Vec3) {
        for (_, actor) in self.actors.iter_mut() {
            if actor.id == id {
                actor.position = position;
            }
        }
    }

    /// Region type for the whole column containing `position`.
    pub fn set_region(&mut self, dimension: Dimension, position: Vec3, region: &str) {
        let cell = position.cell();
        self.regions
            .insert((dimension, cell.x, cell.z), region.to_string());
    }

    /// `None` makes region queries unsupported.
    pub fn set_default_region(&mut self, region: Option<&str>) {
        self.default_region = region.map(str::to_string);
    }

    pub fn add_structure(&mut self, dimension: Dimension, center: CellPos, radius: f64, id: &str) {
        self.structures
            .push((dimension, center, radius, id.to_string()));
    }

    pub fn set_time_of_day(&mut self, time_of_day: u32) {
        self.time_of_day = time_of_day;
    }

    pub fn fail(&mut self, kind: QueryKind) {
        self.failing.insert(kind);
    }

    pub fn recover(&mut self, kind: QueryKind) {
        self.failing.remove(&kind);
    }

    /// Makes state reads of one agent fail while it stays listed.
    pub fn fail_agent(&mut self, agent_id: &str) {
        self.unreadable_agents.insert(agent_id.to_string());
    }

    /// Number of terrain cell reads served so far.
    pub fn terrain_queries(&self) -> u64 {
        self.terrain_queries.get()
    }

    fn check(&self, kind: QueryKind, what: &'static str) -> Result<(), EnvError> {
        if self.failing.contains(&kind) {
            return Err(EnvError::Unavailable {
                what,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Environment for InMemoryEnvironment {
    fn list_agents(&self) -> Result<Vec<AgentId>, EnvError> {
        self.check(QueryKind::ListAgents, "agent list")?;
        Ok(self.agents.keys().cloned().collect())
    }

    fn query_agent_state(&self, agent_id: &str) -> Result<AgentReading, EnvError> {
        self.check(QueryKind::AgentState, "agent state")?;
        if self.unreadable_agents.contains(agent_id) {
            return Err(EnvError::Query(format!("agent {agent_id} unreadable")));
        }
        self.agents
            .get(agent_id)
            .cloned()
            .ok_or_else(|| EnvError::AgentNotFound {
                agent_id: agent_id.to_string(),
            })
    }

    fn query_terrain_cell(
        &self,
        dimension: &Dimension,
        cell: CellPos,
    ) -> Result<Option<String>, EnvError> {
        self.check(QueryKind::TerrainCell, "terrain cell")?;
        self.terrain_queries.set(self.terrain_queries.get() + 1);
        Ok(self.terrain.get(&(dimension.clone(), cell)).cloned())
    }

    fn query_nearby_actors(
        &self,
        dimension: &Dimension,
        query: &ActorQuery,
    ) -> Result<Vec<ActorHandle>, EnvError> {
        self.check(QueryKind::NearbyActors, "nearby actors")?;
        Ok(self
            .actors
            .iter()
            .filter(|(actor_dimension, actor)| actor_dimension == dimension && query.matches(actor))
            .map(|(_, actor)| actor.clone())
            .collect())
    }

    fn query_region_type(&self, dimension: &Dimension, position: Vec3) -> Result<String, EnvError> {
        self.check(QueryKind::RegionType, "region type")?;
        let cell = position.cell();
        if let Some(region) = self.regions.get(&(dimension.clone(), cell.x, cell.z)) {
            return Ok(region.clone());
        }
        self.default_region.clone().ok_or(EnvError::Unsupported {
            what: "region queries",
        })
    }

    fn query_time_of_day(&self) -> Result<u32, EnvError> {
        self.check(QueryKind::TimeOfDay, "time of day")?;
        Ok(self.time_of_day)
    }

    fn query_structures(
        &self,
        dimension: &Dimension,
        position: Vec3,
    ) -> Result<Vec<String>, EnvError> {
        self.check(QueryKind::Structures, "structures")?;
        let cell = position.cell();
        Ok(self
            .structures
            .iter()
            .filter(|(structure_dimension, center, radius, _)| {
                let dx = (center.x - cell.x) as f64;
                let dz = (center.z - cell.z) as f64;
                structure_dimension == dimension && (dx * dx + dz * dz).sqrt() <= *radius
            })
            .map(|(_, _, _, id)| id.clone())
            .collect())
    }
}

/// Sent message as captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub agent_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub messages: Vec<SentMessage>,
    pub diagnostics: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages_for(&self, agent_id: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|message| message.agent_id == agent_id)
            .map(|message| message.text.as_str())
            .collect()
    }

    pub fn count_containing(&self, agent_id: &str, needle: &str) -> usize {
        self.messages_for(agent_id)
            .into_iter()
            .filter(|text| text.contains(needle))
            .count()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.diagnostics.clear();
    }
}

impl MessageSink for RecordingSink {
    fn send_message(&mut self, agent_id: &str, text: &str) {
        self.messages.push(SentMessage {
            agent_id: agent_id.to_string(),
            text: text.to_string(),
        });
    }

    fn log_diagnostic(&mut self, text: &str) {
        self.diagnostics.push(text.to_string());
    }
}
