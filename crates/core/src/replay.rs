//! Journal-driven re-execution for determinism verification.
//! A replay feeds a fresh session the exact inputs a live one saw and checks
//! every recorded decision along the way.

use std::fmt;

use crate::engine::Navigator;
use crate::journal::{InputJournal, InputPayload, layout_hash};
use crate::types::{Direction, GhostId, Policy, StateError, Tile};

#[derive(Debug, PartialEq, Eq)]
pub enum ReplayError {
    /// The journal was recorded against a different layout.
    LayoutMismatch,
    /// A record addresses a ghost ordinal that was never spawned.
    UnknownGhost { seq: u64 },
    /// The engine answered a decision differently than the journal recorded.
    DirectionMismatch {
        seq: u64,
        recorded: Option<Direction>,
        computed: Option<Direction>,
    },
    /// The engine rejected a journaled input.
    EngineFault { seq: u64, message: String },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayoutMismatch => write!(f, "journal was recorded against a different layout"),
            Self::UnknownGhost { seq } => write!(f, "record {seq} addresses an unspawned ghost"),
            Self::DirectionMismatch { seq, recorded, computed } => write!(
                f,
                "record {seq} expected direction {recorded:?}, engine answered {computed:?}"
            ),
            Self::EngineFault { seq, message } => {
                write!(f, "engine rejected record {seq}: {message}")
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub final_tick: u64,
    pub snapshot_hash: u64,
    pub pellets_remaining: usize,
}

/// Re-drive a fresh session from `journal` and verify every decision.
pub fn replay_to_end(
    layout: &str,
    policy: Policy,
    journal: &InputJournal,
) -> Result<ReplayOutcome, ReplayError> {
    if journal.layout_hash != layout_hash(layout) {
        return Err(ReplayError::LayoutMismatch);
    }

    let mut navigator = Navigator::from_layout(layout, policy)
        .map_err(|e| ReplayError::EngineFault { seq: 0, message: e.to_string() })?;
    let mut ghosts: Vec<GhostId> = Vec::new();
    let mut agent: Option<Tile> = None;

    for record in &journal.records {
        let seq = record.seq;
        let fault = |e: StateError| ReplayError::EngineFault { seq, message: e.to_string() };

        match record.payload {
            InputPayload::SpawnGhost { tile, phase, active } => {
                ghosts.push(navigator.spawn_ghost(tile, phase, active).map_err(fault)?);
            }
            InputPayload::SyncGhost { ghost, tile, phase, active } => {
                let id = *ghosts
                    .get(ghost as usize)
                    .ok_or(ReplayError::UnknownGhost { seq })?;
                navigator.sync_ghost(id, tile, phase, active).map_err(fault)?;
            }
            InputPayload::AgentAt { tile } => {
                navigator.record_agent(tile).map_err(fault)?;
                agent = Some(tile);
            }
            InputPayload::RestrictEdge { tile, direction } => {
                navigator.restrict_edge(tile, direction).map_err(fault)?;
            }
            InputPayload::UnrestrictEdge { tile, direction } => {
                navigator.unrestrict_edge(tile, direction).map_err(fault)?;
            }
            InputPayload::Decide { mode, direction } => {
                let tile = agent.ok_or_else(|| ReplayError::EngineFault {
                    seq,
                    message: "decision before any agent report".to_string(),
                })?;
                let decision = navigator.decide(tile, mode).map_err(fault)?;
                if decision.direction != direction {
                    return Err(ReplayError::DirectionMismatch {
                        seq,
                        recorded: direction,
                        computed: decision.direction,
                    });
                }
            }
        }
    }

    Ok(ReplayOutcome {
        final_tick: navigator.current_tick(),
        snapshot_hash: navigator.snapshot_hash(),
        pellets_remaining: navigator.pellets().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::InputRecord;
    use crate::types::{GhostPhase, Mode};

    const LAYOUT: &str = "-----\n-----\n-----\n-----\n-...o";

    /// Drive a live session while journaling every input, exactly as a game
    /// loop would.
    fn record_session() -> (InputJournal, u64) {
        let mut journal = InputJournal::new(LAYOUT);
        let mut navigator =
            Navigator::from_layout(LAYOUT, Policy::default()).expect("layout parses");

        let spawn = InputPayload::SpawnGhost {
            tile: Tile { row: 0, col: 4 },
            phase: GhostPhase::Pursuing,
            active: true,
        };
        journal.append(spawn);
        let ghost = match spawn {
            InputPayload::SpawnGhost { tile, phase, active } => {
                navigator.spawn_ghost(tile, phase, active).expect("spawn")
            }
            _ => unreachable!(),
        };

        let mut agent = Tile { row: 4, col: 0 };
        journal.append(InputPayload::AgentAt { tile: agent });
        navigator.record_agent(agent).expect("agent report");

        for _ in 0..6 {
            let decision = navigator.decide(agent, Mode::Cautious).expect("decision");
            journal.append(InputPayload::Decide {
                mode: Mode::Cautious,
                direction: decision.direction,
            });

            if let Some(direction) = decision.direction {
                agent = direction.step(agent);
                journal.append(InputPayload::AgentAt { tile: agent });
                navigator.record_agent(agent).expect("agent report");
            }

            let ghost_tile = navigator.ghost(ghost).expect("ghost exists").tile;
            let chased = Direction::Down.step(ghost_tile);
            if navigator.graph().has_node(chased) {
                journal.append(InputPayload::SyncGhost {
                    ghost: 0,
                    tile: chased,
                    phase: GhostPhase::Pursuing,
                    active: true,
                });
                navigator
                    .sync_ghost(ghost, chased, GhostPhase::Pursuing, true)
                    .expect("sync");
            }
        }

        (journal, navigator.snapshot_hash())
    }

    #[test]
    fn replay_reproduces_a_recorded_session() {
        let (journal, live_hash) = record_session();
        let outcome =
            replay_to_end(LAYOUT, Policy::default(), &journal).expect("replay succeeds");
        assert_eq!(outcome.snapshot_hash, live_hash);

        let again = replay_to_end(LAYOUT, Policy::default(), &journal).expect("replay again");
        assert_eq!(outcome, again);
    }

    #[test]
    fn tampered_decision_is_a_direction_mismatch() {
        let (mut journal, _) = record_session();
        let tampered = journal
            .records
            .iter_mut()
            .find_map(|record| match &mut record.payload {
                InputPayload::Decide { direction: direction @ Some(_), .. } => {
                    *direction = Some(Direction::Down);
                    Some(record.seq)
                }
                _ => None,
            })
            .expect("at least one steering decision");
        // The first recorded decision cannot be Down: the agent starts in the
        // bottom row, so a Down answer would have been rejected live.
        match replay_to_end(LAYOUT, Policy::default(), &journal) {
            Err(ReplayError::DirectionMismatch { seq, .. }) => assert_eq!(seq, tampered),
            other => panic!("expected a direction mismatch, got {other:?}"),
        }
    }

    #[test]
    fn wrong_layout_is_rejected_before_any_replaying() {
        let (journal, _) = record_session();
        assert_eq!(
            replay_to_end("---\n---", Policy::default(), &journal),
            Err(ReplayError::LayoutMismatch)
        );
    }

    #[test]
    fn unspawned_ghost_ordinal_is_rejected() {
        let mut journal = InputJournal::new(LAYOUT);
        journal.append(InputPayload::SyncGhost {
            ghost: 3,
            tile: Tile { row: 0, col: 0 },
            phase: GhostPhase::Idle,
            active: false,
        });
        assert_eq!(
            replay_to_end(LAYOUT, Policy::default(), &journal),
            Err(ReplayError::UnknownGhost { seq: 0 })
        );
    }

    #[test]
    fn decision_before_agent_report_is_an_engine_fault() {
        let mut journal = InputJournal::new(LAYOUT);
        journal.append(InputPayload::Decide { mode: Mode::Greedy, direction: None });
        match replay_to_end(LAYOUT, Policy::default(), &journal) {
            Err(ReplayError::EngineFault { seq: 0, .. }) => {}
            other => panic!("expected an engine fault, got {other:?}"),
        }
    }

    #[test]
    fn journal_seq_numbers_are_contiguous() {
        let (journal, _) = record_session();
        for (index, InputRecord { seq, .. }) in journal.records.iter().enumerate() {
            assert_eq!(*seq, index as u64);
        }
    }
}
