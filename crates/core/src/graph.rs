//! Arena-backed maze graph: nodes keyed by slotmap ids, indexed by tile.
//! This module owns topology only; entity state and searches live elsewhere.
//! Topology is immutable after construction except for edge open/closed
//! toggles, which model gates and one-way restrictions.

use std::collections::BTreeMap;

use slotmap::SlotMap;

use crate::types::{Direction, NodeId, StateError, Tile};

mod layout;

pub use layout::{LayoutError, ParsedLayout, parse_layout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub to: NodeId,
    pub distance: u32,
    pub open: bool,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub tile: Tile,
    /// Indexed by `Direction as usize`.
    edges: [Option<Edge>; 4],
    portal: Option<NodeId>,
    /// Intersection, dead-end, or corner: a place the agent can be told to
    /// stop at, as opposed to a straight corridor cell.
    pub is_junction: bool,
}

impl Node {
    pub fn edge(&self, direction: Direction) -> Option<Edge> {
        self.edges[direction as usize]
    }

    pub fn has_open_edge(&self, direction: Direction) -> bool {
        self.edge(direction).is_some_and(|edge| edge.open)
    }
}

#[derive(Clone, Default)]
pub struct Graph {
    nodes: SlotMap<NodeId, Node>,
    by_tile: BTreeMap<Tile, NodeId>,
}

impl Graph {
    pub fn node_at(&self, tile: Tile) -> Option<NodeId> {
        self.by_tile.get(&tile).copied()
    }

    pub fn has_node(&self, tile: Tile) -> bool {
        self.by_tile.contains_key(&tile)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn tile_of(&self, id: NodeId) -> Tile {
        self.nodes[id].tile
    }

    pub fn portal_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].portal
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Open edges out of `id`, in the canonical direction order.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (Direction, NodeId, u32)> + '_ {
        let node = &self.nodes[id];
        Direction::ALL.into_iter().filter_map(move |direction| {
            node.edge(direction)
                .filter(|edge| edge.open)
                .map(|edge| (direction, edge.to, edge.distance))
        })
    }

    /// The direction of the open edge `from -> to`, if one exists. Portal
    /// links have no direction.
    pub fn direction_between(&self, from: NodeId, to: NodeId) -> Option<Direction> {
        self.neighbors(from).find(|(_, next, _)| *next == to).map(|(direction, _, _)| direction)
    }

    /// Close the directed edge out of `tile`. Idempotent; the reverse edge is
    /// untouched, which is what makes one-way restrictions expressible.
    pub fn restrict_edge(&mut self, tile: Tile, direction: Direction) -> Result<(), StateError> {
        self.set_edge_open(tile, direction, false)
    }

    /// Reopen the directed edge out of `tile`. Idempotent.
    pub fn unrestrict_edge(&mut self, tile: Tile, direction: Direction) -> Result<(), StateError> {
        self.set_edge_open(tile, direction, true)
    }

    fn set_edge_open(
        &mut self,
        tile: Tile,
        direction: Direction,
        open: bool,
    ) -> Result<(), StateError> {
        let id = self.node_at(tile).ok_or(StateError::UnknownTile { tile })?;
        match self.nodes[id].edges[direction as usize].as_mut() {
            Some(edge) => {
                edge.open = open;
                Ok(())
            }
            None => Err(StateError::MissingEdge { tile, direction }),
        }
    }
}
