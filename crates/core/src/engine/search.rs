//! Deterministic search primitives over the maze graph.
//! This module exists so both strategies share one traversal vocabulary.
//! It does not own goal selection or steering policy.

use std::collections::{BTreeMap, BTreeSet, VecDeque, btree_map::Entry};

use super::cost::CostField;
use crate::graph::Graph;
use crate::types::{NodeId, Tile};

/// Warp traversal counts as one move, like a normal step.
const PORTAL_DISTANCE: u32 = 1;

/// Open-set entry. Derived `Ord` over (f, h, row, col) is the canonical
/// tie-break order for equal-cost frontier nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: i64,
    h: i64,
    row: i32,
    col: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightedPath {
    /// Tiles to walk, starting with the first step after the start node.
    pub steps: Vec<Tile>,
    /// Exact sum of edge distances along `steps`.
    pub distance: u32,
}

/// Minimum-hop breadth-first search to the nearest member of `targets`.
/// Edge distances and the cost field play no part here; the first target
/// dequeued under the canonical neighbor order wins. `None` means no target
/// is reachable, which is a normal outcome for the caller to absorb.
pub(crate) fn find_nearest(
    graph: &Graph,
    start: NodeId,
    targets: &BTreeSet<NodeId>,
) -> Option<Vec<Tile>> {
    if targets.is_empty() {
        return None;
    }

    let mut came_from: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut visited = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if targets.contains(&current) {
            return Some(reconstruct(graph, &came_from, start, current));
        }
        for (next, _) in expansions(graph, current) {
            if visited.insert(next) {
                came_from.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    None
}

/// Weighted best-first search from `start` to `goal` under
/// `f = g + h + penalty`, where `h` is the Manhattan distance in
/// edge-distance units. The penalty term deliberately breaks strict
/// admissibility: the returned path leans safe rather than shortest.
pub(crate) fn find_path(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    field: &CostField,
) -> Option<WeightedPath> {
    if start == goal {
        return Some(WeightedPath { steps: Vec::new(), distance: 0 });
    }

    let goal_tile = graph.tile_of(goal);
    let start_tile = graph.tile_of(start);

    let mut open_set: BTreeSet<OpenNode> = BTreeSet::new();
    let mut open_entries: BTreeMap<NodeId, OpenNode> = BTreeMap::new();
    let mut came_from: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut g_score: BTreeMap<NodeId, u32> = BTreeMap::new();
    let mut closed: BTreeSet<NodeId> = BTreeSet::new();

    let start_h = i64::from(manhattan(start_tile, goal_tile));
    let start_entry = OpenNode {
        f: start_h + field.penalty(start),
        h: start_h,
        row: start_tile.row,
        col: start_tile.col,
    };
    open_set.insert(start_entry);
    open_entries.insert(start, start_entry);
    g_score.insert(start, 0);

    while let Some(current_entry) = open_set.pop_first() {
        let current_tile = Tile { row: current_entry.row, col: current_entry.col };
        let current = graph.node_at(current_tile).expect("open-set tiles come from the graph");
        open_entries.remove(&current);
        if !closed.insert(current) {
            continue;
        }

        if current == goal {
            let distance = *g_score.get(&goal).expect("dequeued goal must have a g-score");
            return Some(WeightedPath {
                steps: reconstruct(graph, &came_from, start, goal),
                distance,
            });
        }

        let current_g = *g_score.get(&current).expect("dequeued node must have a g-score");
        for (next, edge_distance) in expansions(graph, current) {
            if closed.contains(&next) {
                continue;
            }
            let tentative = current_g + edge_distance;
            if tentative >= g_score.get(&next).copied().unwrap_or(u32::MAX) {
                continue;
            }
            if let Some(stale) = open_entries.remove(&next) {
                open_set.remove(&stale);
            }

            came_from.insert(next, current);
            g_score.insert(next, tentative);

            let next_tile = graph.tile_of(next);
            let h = i64::from(manhattan(next_tile, goal_tile));
            let entry = OpenNode {
                f: i64::from(tentative) + h + field.penalty(next),
                h,
                row: next_tile.row,
                col: next_tile.col,
            };
            open_set.insert(entry);
            open_entries.insert(next, entry);
        }
    }

    None
}

/// Hop distances from `start` to every reachable node.
pub(crate) fn hop_distances(graph: &Graph, start: NodeId) -> BTreeMap<NodeId, u32> {
    hop_distances_within(graph, start, u32::MAX)
}

/// Hop distances from `start`, expanded no further than `max_hops`.
pub(crate) fn hop_distances_within(
    graph: &Graph,
    start: NodeId,
    max_hops: u32,
) -> BTreeMap<NodeId, u32> {
    let mut distances = BTreeMap::from([(start, 0u32)]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let hops = distances[&current];
        if hops == max_hops {
            continue;
        }
        for (next, _) in expansions(graph, current) {
            if let Entry::Vacant(entry) = distances.entry(next) {
                entry.insert(hops + 1);
                queue.push_back(next);
            }
        }
    }

    distances
}

/// Open edges in canonical order, then the portal twin if any.
fn expansions(graph: &Graph, from: NodeId) -> impl Iterator<Item = (NodeId, u32)> + '_ {
    graph
        .neighbors(from)
        .map(|(_, to, distance)| (to, distance))
        .chain(graph.portal_of(from).map(|twin| (twin, PORTAL_DISTANCE)))
}

fn reconstruct(
    graph: &Graph,
    came_from: &BTreeMap<NodeId, NodeId>,
    start: NodeId,
    goal: NodeId,
) -> Vec<Tile> {
    let mut trail = vec![goal];
    let mut current = goal;
    while current != start {
        current = *came_from.get(&current).expect("path must be reconstructible");
        trail.push(current);
    }
    trail.reverse();
    trail.remove(0);
    trail.into_iter().map(|id| graph.tile_of(id)).collect()
}

pub(crate) fn manhattan(a: Tile, b: Tile) -> u32 {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}
