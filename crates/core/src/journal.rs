use serde::{Deserialize, Serialize};

use crate::types::{Direction, GhostPhase, Mode, Tile};

/// Everything the game loop fed into a session, in order. Replaying the
/// records against the same layout must reproduce every decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub build_id: String,
    pub layout_hash: u64,
    pub records: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub payload: InputPayload,
}

/// One session input. Ghosts are addressed by spawn ordinal, which is stable
/// across replays because spawns are journaled too.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputPayload {
    SpawnGhost { tile: Tile, phase: GhostPhase, active: bool },
    SyncGhost { ghost: u32, tile: Tile, phase: GhostPhase, active: bool },
    AgentAt { tile: Tile },
    RestrictEdge { tile: Tile, direction: Direction },
    UnrestrictEdge { tile: Tile, direction: Direction },
    /// A decision request plus the direction the engine answered with, kept
    /// so replays can verify determinism.
    Decide { mode: Mode, direction: Option<Direction> },
}

impl InputJournal {
    pub fn new(layout: &str) -> Self {
        Self {
            format_version: 1,
            build_id: "dev".to_string(),
            layout_hash: layout_hash(layout),
            records: Vec::new(),
        }
    }

    pub fn append(&mut self, payload: InputPayload) {
        let seq = self.records.len() as u64;
        self.records.push(InputRecord { seq, payload });
    }
}

/// Digest of the layout text a journal was recorded against.
pub fn layout_hash(layout: &str) -> u64 {
    use xxhash_rust::xxh3::xxh3_64;

    xxh3_64(layout.as_bytes())
}
