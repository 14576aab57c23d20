//! Per-tick cost field derived from ghost positions and phases.
//! This module exists to keep the danger/pursuit landscape pure and separate
//! from the searches that consume it. It holds no state across ticks.

use std::collections::BTreeMap;

use super::search::hop_distances_within;
use crate::graph::Graph;
use crate::state::Ghost;
use crate::types::{GhostPhase, NodeId, Policy};

/// Ephemeral per-node penalty map. Positive values repel, negative values
/// attract; nodes outside every ghost's radius carry zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CostField {
    values: BTreeMap<NodeId, i64>,
}

impl CostField {
    /// An all-zero field, for searches that should ignore risk entirely.
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn new(values: BTreeMap<NodeId, i64>) -> Self {
        Self { values }
    }

    pub fn penalty(&self, node: NodeId) -> i64 {
        self.values.get(&node).copied().unwrap_or(0)
    }
}

/// Build the field for one tick. Pure in its inputs: the same graph, ghosts,
/// and policy always produce the same field.
///
/// Distances are breadth-first hop counts over the graph, so walls are
/// respected: a ghost one corridor over but behind a wall is as far away as
/// the walk around it. `base >> hops` decays sharply near the ghost and is
/// cut off past the radius entirely.
pub(crate) fn build_cost_field<'a>(
    graph: &Graph,
    ghosts: impl Iterator<Item = &'a Ghost>,
    policy: &Policy,
) -> CostField {
    let mut values: BTreeMap<NodeId, i64> = BTreeMap::new();

    for ghost in ghosts {
        if !ghost.active {
            continue;
        }
        let (base, radius) = match ghost.phase {
            GhostPhase::Pursuing => (policy.danger_base, policy.danger_radius),
            GhostPhase::Frightened => (-policy.pursuit_base, policy.pursuit_radius),
            // Returning ghosts are homing and harmless; idle ones are not in
            // play. Neither shapes the field.
            GhostPhase::Returning | GhostPhase::Idle => continue,
        };

        let origin = graph.node_at(ghost.tile).expect("ghost tiles are validated at sync");
        for (node, hops) in hop_distances_within(graph, origin, radius) {
            let contribution = if base >= 0 { base >> hops } else { -((-base) >> hops) };
            if contribution == 0 {
                continue;
            }
            *values.entry(node).or_insert(0) += contribution;
        }
    }

    CostField { values }
}
