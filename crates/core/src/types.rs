use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct NodeId;
    pub struct GhostId;
}

/// Discrete maze coordinate. `Ord` is (row, col) so tree iteration and
/// tie-breaks stay stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub row: i32,
    pub col: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// Canonical scan order. Every neighbor iteration and directional
    /// tie-break in the crate uses this order, which keeps searches
    /// reproducible for identical snapshots.
    pub const ALL: [Self; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Left => Self::Right,
            Self::Down => Self::Up,
            Self::Right => Self::Left,
        }
    }

    /// The tile one step from `tile` in this direction.
    pub fn step(self, tile: Tile) -> Tile {
        match self {
            Self::Up => Tile { row: tile.row - 1, col: tile.col },
            Self::Left => Tile { row: tile.row, col: tile.col - 1 },
            Self::Down => Tile { row: tile.row + 1, col: tile.col },
            Self::Right => Tile { row: tile.row, col: tile.col + 1 },
        }
    }
}

/// Behavior state of a ghost. Closed set, handled exhaustively wherever
/// phases matter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhostPhase {
    Pursuing,
    Frightened,
    Returning,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PelletKind {
    Pellet,
    Power,
}

/// Which decision strategy drives the agent this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// External input steers the agent; the engine stays idle.
    Player,
    /// Shortest-hop pellet chase that ignores ghosts entirely.
    Greedy,
    /// Risk-aware routing that trades path length for ghost distance.
    Cautious,
}

/// Why the current goal (or non-goal) was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalReason {
    Idle,
    NearestPellet,
    PowerPellet,
    FrightenedGhost,
    Escape,
    Fallback,
}

/// One decision tick's output: the steering command plus the goal and path
/// behind it for diagnostic display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub direction: Option<Direction>,
    pub goal: Option<Tile>,
    pub path: Vec<Tile>,
    pub reason: GoalReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogEvent {
    GoalChanged { reason: GoalReason, target: Option<Tile> },
    PelletEaten { tile: Tile, kind: PelletKind },
    FrightTriggered { tile: Tile },
    PathUnavailable { mode: Mode },
}

/// Tuning knobs for the cost field and the decision policy.
///
/// `danger_base >> hops` is the penalty a pursuing ghost contributes at a
/// node `hops` away, cut off past `danger_radius`; `pursuit_base` mirrors it
/// as a bonus around frightened ghosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub danger_base: i64,
    pub danger_radius: u32,
    pub pursuit_base: i64,
    pub pursuit_radius: u32,
    /// Chase a frightened ghost at most this many hops away.
    pub pursuit_range: u32,
    /// A pursuing ghost within this many hops makes a power pellet the
    /// preferred goal.
    pub alarm_range: u32,
    /// Penalty at the agent's own node that triggers an immediate escape
    /// move instead of goal routing.
    pub escape_threshold: i64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            danger_base: 100_000,
            danger_radius: 10,
            pursuit_base: 800,
            pursuit_radius: 8,
            pursuit_range: 8,
            alarm_range: 6,
            escape_threshold: 20_000,
        }
    }
}

/// Caller contract violations surfaced at the tick boundary. These are never
/// absorbed: an entity standing on a tile the graph does not know is an
/// integration bug, not a routing problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateError {
    UnknownTile { tile: Tile },
    UnknownGhost,
    MissingEdge { tile: Tile, direction: Direction },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTile { tile } => {
                write!(f, "tile ({}, {}) is not a graph node", tile.row, tile.col)
            }
            Self::UnknownGhost => write!(f, "ghost id is not registered"),
            Self::MissingEdge { tile, direction } => {
                write!(f, "no edge {direction:?} out of tile ({}, {})", tile.row, tile.col)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_up_left_down_right() {
        assert_eq!(
            Direction::ALL,
            [Direction::Up, Direction::Left, Direction::Down, Direction::Right]
        );
    }

    #[test]
    fn opposite_pairs_are_involutive() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn step_and_opposite_step_cancel_out() {
        let origin = Tile { row: 3, col: 7 };
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().step(direction.step(origin)), origin);
        }
    }
}
