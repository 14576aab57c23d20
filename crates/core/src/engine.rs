//! Session controller wiring the graph, pellets, ghosts, and decision policy.
//! This module owns per-session state and the tick boundary contract.
//! It does not move entities; the game loop does that and reports back.

use slotmap::SlotMap;

use crate::graph::{Graph, LayoutError, parse_layout};
use crate::state::{Ghost, PelletField};
use crate::types::{
    Decision, Direction, GhostId, GhostPhase, GoalReason, LogEvent, Mode, PelletKind, Policy,
    StateError, Tile,
};

mod cost;
mod policy;
mod search;

#[cfg(test)]
mod test_support;

/// One navigation session: the parsed maze plus the entity snapshots the
/// game loop keeps in sync. Exactly one decision computation runs per tick;
/// paths and cost fields never survive a call.
pub struct Navigator {
    graph: Graph,
    pellets: PelletField,
    ghosts: SlotMap<GhostId, Ghost>,
    policy: Policy,
    log: Vec<LogEvent>,
    /// Last issued steering direction, held as the fallback when no path
    /// exists this tick.
    heading: Option<Direction>,
    last_goal: Option<(GoalReason, Option<Tile>)>,
    tick: u64,
}

impl Navigator {
    /// Parse the layout and seed the session. Any layout defect aborts here;
    /// a partial session never exists.
    pub fn from_layout(text: &str, policy: Policy) -> Result<Self, LayoutError> {
        let parsed = parse_layout(text)?;
        Ok(Self {
            graph: parsed.graph,
            pellets: PelletField::new(parsed.pellets),
            ghosts: SlotMap::with_key(),
            policy,
            log: Vec::new(),
            heading: None,
            last_goal: None,
            tick: 0,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn pellets(&self) -> &PelletField {
        &self.pellets
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn ghost(&self, id: GhostId) -> Option<&Ghost> {
        self.ghosts.get(id)
    }

    pub fn ghosts(&self) -> impl Iterator<Item = (GhostId, &Ghost)> {
        self.ghosts.iter()
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Register a ghost. The tile must be a graph node; anything else is an
    /// integration bug surfaced immediately.
    pub fn spawn_ghost(
        &mut self,
        tile: Tile,
        phase: GhostPhase,
        active: bool,
    ) -> Result<GhostId, StateError> {
        if !self.graph.has_node(tile) {
            return Err(StateError::UnknownTile { tile });
        }
        let id = self.ghosts.insert(Ghost { id: GhostId::default(), tile, phase, active });
        self.ghosts[id].id = id;
        Ok(id)
    }

    /// Update one ghost's reported position and state for this tick.
    pub fn sync_ghost(
        &mut self,
        id: GhostId,
        tile: Tile,
        phase: GhostPhase,
        active: bool,
    ) -> Result<(), StateError> {
        if !self.graph.has_node(tile) {
            return Err(StateError::UnknownTile { tile });
        }
        let Some(ghost) = self.ghosts.get_mut(id) else {
            return Err(StateError::UnknownGhost);
        };
        ghost.tile = tile;
        ghost.phase = phase;
        ghost.active = active;
        Ok(())
    }

    /// Report the agent's tile after the game loop moved it. Consumes any
    /// pellet there; a power pellet flips every active, non-returning ghost
    /// into the frightened phase.
    pub fn record_agent(&mut self, tile: Tile) -> Result<Option<PelletKind>, StateError> {
        if !self.graph.has_node(tile) {
            return Err(StateError::UnknownTile { tile });
        }
        let eaten = self.pellets.remove(tile);
        if let Some(kind) = eaten {
            self.log.push(LogEvent::PelletEaten { tile, kind });
            if kind == PelletKind::Power {
                self.trigger_fright(tile);
            }
        }
        Ok(eaten)
    }

    /// Compute the steering command for this tick.
    pub fn decide(&mut self, agent: Tile, mode: Mode) -> Result<Decision, StateError> {
        let Some(agent_node) = self.graph.node_at(agent) else {
            return Err(StateError::UnknownTile { tile: agent });
        };

        self.tick += 1;
        let decision = policy::decide(&policy::Snapshot {
            graph: &self.graph,
            ghosts: &self.ghosts,
            pellets: &self.pellets,
            agent: agent_node,
            mode,
            heading: self.heading,
            policy: &self.policy,
        });

        let entered_fallback = decision.reason == GoalReason::Fallback
            && self.last_goal.is_none_or(|(reason, _)| reason != GoalReason::Fallback);
        if entered_fallback {
            self.log.push(LogEvent::PathUnavailable { mode });
        }

        let goal_pair = (decision.reason, decision.goal);
        if self.last_goal != Some(goal_pair) {
            self.log.push(LogEvent::GoalChanged { reason: decision.reason, target: decision.goal });
            self.last_goal = Some(goal_pair);
        }

        if decision.direction.is_some() {
            self.heading = decision.direction;
        }
        Ok(decision)
    }

    /// Close a directed edge between ticks (access gates, one-way sections).
    pub fn restrict_edge(&mut self, tile: Tile, direction: Direction) -> Result<(), StateError> {
        self.graph.restrict_edge(tile, direction)
    }

    /// Reopen a directed edge between ticks.
    pub fn unrestrict_edge(&mut self, tile: Tile, direction: Direction) -> Result<(), StateError> {
        self.graph.unrestrict_edge(tile, direction)
    }

    /// Order-insensitive digest of the observable session state, used by the
    /// replay harness to confirm determinism.
    pub fn snapshot_hash(&self) -> u64 {
        use std::hash::Hasher;
        use xxhash_rust::xxh3::Xxh3;

        let mut hasher = Xxh3::new();
        hasher.write_u64(self.tick);
        hasher.write_u8(match self.heading {
            None => 0,
            Some(direction) => 1 + direction as u8,
        });

        hasher.write_usize(self.pellets.len());
        for (tile, kind) in self.pellets.tiles() {
            hasher.write_i32(tile.row);
            hasher.write_i32(tile.col);
            hasher.write_u8(kind as u8);
        }

        hasher.write_usize(self.ghosts.len());
        for ghost in self.ghosts.values() {
            hasher.write_i32(ghost.tile.row);
            hasher.write_i32(ghost.tile.col);
            hasher.write_u8(ghost.phase as u8);
            hasher.write_u8(ghost.active as u8);
        }

        hasher.finish()
    }

    fn trigger_fright(&mut self, tile: Tile) {
        for ghost in self.ghosts.values_mut() {
            if ghost.active && ghost.phase != GhostPhase::Returning {
                ghost.phase = GhostPhase::Frightened;
            }
        }
        self.log.push(LogEvent::FrightTriggered { tile });
    }
}
