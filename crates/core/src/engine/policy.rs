//! Goal selection and steering for one decision tick.
//! This module exists to keep the mode state machine a pure function of its
//! snapshot. It does not own session state, logging, or entity lifecycles.

use std::collections::{BTreeMap, BTreeSet};

use slotmap::SlotMap;

use super::cost::{CostField, build_cost_field};
use super::search::{find_nearest, find_path, hop_distances};
use crate::graph::Graph;
use crate::state::{Ghost, PelletField};
use crate::types::{
    Decision, Direction, GhostId, GhostPhase, GoalReason, Mode, NodeId, PelletKind, Policy, Tile,
};

/// Everything one decision reads. Borrowed for the call, never retained.
pub(super) struct Snapshot<'a> {
    pub graph: &'a Graph,
    pub ghosts: &'a SlotMap<GhostId, Ghost>,
    pub pellets: &'a PelletField,
    pub agent: NodeId,
    pub mode: Mode,
    pub heading: Option<Direction>,
    pub policy: &'a Policy,
}

pub(super) fn decide(snap: &Snapshot<'_>) -> Decision {
    match snap.mode {
        Mode::Player => idle(),
        Mode::Greedy => decide_greedy(snap),
        Mode::Cautious => decide_cautious(snap),
    }
}

/// Shortest-hop chase of the nearest pellet of any kind. Ghosts are invisible
/// to this strategy.
fn decide_greedy(snap: &Snapshot<'_>) -> Decision {
    let targets = pellet_nodes(snap, |_| true);
    if targets.is_empty() {
        return idle();
    }
    match find_nearest(snap.graph, snap.agent, &targets) {
        Some(steps) => steer(snap, steps, GoalReason::NearestPellet),
        None => fallback(snap),
    }
}

fn decide_cautious(snap: &Snapshot<'_>) -> Decision {
    let field = build_cost_field(snap.graph, snap.ghosts.values(), snap.policy);
    let reach = hop_distances(snap.graph, snap.agent);

    // A hostile ghost is close enough that routing is a luxury: step to the
    // least-dangerous neighbor now, replan next tick.
    if field.penalty(snap.agent) >= snap.policy.escape_threshold {
        return escape(snap, &field);
    }

    if let Some(prey) = nearest_frightened_ghost(snap, &reach) {
        return route(snap, prey, &field, GoalReason::FrightenedGhost);
    }

    if snap.pellets.is_empty() {
        // Nothing left to collect; keep distance until the board changes.
        return escape(snap, &field);
    }

    if hostile_within(snap, &reach, snap.policy.alarm_range) {
        if let Some(power) = nearest_pellet_node(snap, &reach, PelletKind::Power) {
            return route(snap, power, &field, GoalReason::PowerPellet);
        }
        if let Some(pellet) = nearest_pellet_node(snap, &reach, PelletKind::Pellet) {
            return route(snap, pellet, &field, GoalReason::NearestPellet);
        }
        return fallback(snap);
    }

    match nearest_reachable_pellet(snap, &reach) {
        Some(goal) => route(snap, goal, &field, GoalReason::NearestPellet),
        None => fallback(snap),
    }
}

fn idle() -> Decision {
    Decision { direction: None, goal: None, path: Vec::new(), reason: GoalReason::Idle }
}

/// Route to `goal` through the risk-aware search and translate the result
/// into a steering command.
fn route(snap: &Snapshot<'_>, goal: NodeId, field: &CostField, reason: GoalReason) -> Decision {
    match find_path(snap.graph, snap.agent, goal, field) {
        Some(weighted) => steer(snap, weighted.steps, reason),
        None => fallback(snap),
    }
}

/// Turn a path into a `Decision`. An empty path means the agent already
/// stands on the goal and simply holds. A leading warp hop has no cardinal
/// direction, so it degrades to the fallback rule.
fn steer(snap: &Snapshot<'_>, steps: Vec<Tile>, reason: GoalReason) -> Decision {
    let agent_tile = snap.graph.tile_of(snap.agent);
    let goal = Some(steps.last().copied().unwrap_or(agent_tile));

    let Some(&first) = steps.first() else {
        return Decision { direction: None, goal, path: steps, reason };
    };
    let first_node = snap.graph.node_at(first).expect("path tiles come from the graph");
    match snap.graph.direction_between(snap.agent, first_node) {
        Some(direction) => Decision { direction: Some(direction), goal, path: steps, reason },
        None => fallback(snap),
    }
}

/// Step to the open neighbor with the lowest penalty, canonical order
/// breaking ties. Used when a ghost is too close for goal routing and when
/// the board is out of pellets.
fn escape(snap: &Snapshot<'_>, field: &CostField) -> Decision {
    let mut best: Option<(i64, Direction)> = None;
    for (direction, next, _) in snap.graph.neighbors(snap.agent) {
        let penalty = field.penalty(next);
        if best.is_none_or(|(lowest, _)| penalty < lowest) {
            best = Some((penalty, direction));
        }
    }
    match best {
        Some((_, direction)) => Decision {
            direction: Some(direction),
            goal: None,
            path: Vec::new(),
            reason: GoalReason::Escape,
        },
        None => fallback(snap),
    }
}

/// The documented last resort: hold the previous heading if that edge is
/// open, otherwise take the first open edge in canonical order, otherwise
/// stand still. Never an error.
fn fallback(snap: &Snapshot<'_>) -> Decision {
    let node = snap.graph.node(snap.agent);
    let direction = snap
        .heading
        .filter(|held| node.has_open_edge(*held))
        .or_else(|| Direction::ALL.into_iter().find(|candidate| node.has_open_edge(*candidate)));
    Decision { direction, goal: None, path: Vec::new(), reason: GoalReason::Fallback }
}

fn pellet_nodes<F>(snap: &Snapshot<'_>, keep: F) -> BTreeSet<NodeId>
where
    F: Fn(PelletKind) -> bool,
{
    snap.pellets
        .tiles()
        .filter(|(_, kind)| keep(*kind))
        .map(|(tile, _)| snap.graph.node_at(tile).expect("pellet tiles come from the layout"))
        .collect()
}

/// Nearest reachable pellet of `kind`, by hop distance then tile order.
fn nearest_pellet_node(
    snap: &Snapshot<'_>,
    reach: &BTreeMap<NodeId, u32>,
    kind: PelletKind,
) -> Option<NodeId> {
    nearest_of(snap, reach, pellet_nodes(snap, |k| k == kind))
}

fn nearest_reachable_pellet(
    snap: &Snapshot<'_>,
    reach: &BTreeMap<NodeId, u32>,
) -> Option<NodeId> {
    nearest_of(snap, reach, pellet_nodes(snap, |_| true))
}

fn nearest_of(
    snap: &Snapshot<'_>,
    reach: &BTreeMap<NodeId, u32>,
    candidates: BTreeSet<NodeId>,
) -> Option<NodeId> {
    candidates
        .into_iter()
        .filter_map(|node| reach.get(&node).map(|&hops| (hops, snap.graph.tile_of(node), node)))
        .min_by_key(|&(hops, tile, _)| (hops, tile))
        .map(|(_, _, node)| node)
}

/// Nearest active frightened ghost within pursuit range, if any.
fn nearest_frightened_ghost(
    snap: &Snapshot<'_>,
    reach: &BTreeMap<NodeId, u32>,
) -> Option<NodeId> {
    snap.ghosts
        .values()
        .filter(|ghost| ghost.active && ghost.phase == GhostPhase::Frightened)
        .filter_map(|ghost| {
            let node = snap.graph.node_at(ghost.tile).expect("ghost tiles are validated at sync");
            reach
                .get(&node)
                .filter(|&&hops| hops <= snap.policy.pursuit_range)
                .map(|&hops| (hops, ghost.tile, node))
        })
        .min_by_key(|&(hops, tile, _)| (hops, tile))
        .map(|(_, _, node)| node)
}

fn hostile_within(snap: &Snapshot<'_>, reach: &BTreeMap<NodeId, u32>, range: u32) -> bool {
    snap.ghosts
        .values()
        .filter(|ghost| ghost.active && ghost.phase == GhostPhase::Pursuing)
        .any(|ghost| {
            let node = snap.graph.node_at(ghost.tile).expect("ghost tiles are validated at sync");
            reach.get(&node).is_some_and(|&hops| hops <= range)
        })
}
