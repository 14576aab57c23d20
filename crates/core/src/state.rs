use std::collections::BTreeMap;

use crate::types::{GhostId, GhostPhase, PelletKind, Tile};

/// Snapshot of one ghost as reported by the game loop. The engine never moves
/// ghosts; it only reads them when building the cost field and picking goals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ghost {
    pub id: GhostId,
    pub tile: Tile,
    pub phase: GhostPhase,
    /// Inactive ghosts are off the board and contribute nothing to cost.
    pub active: bool,
}

/// The remaining collectibles, partitioned by kind. Populated once from the
/// layout; only ever shrinks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PelletField {
    pellets: BTreeMap<Tile, PelletKind>,
}

impl PelletField {
    pub(crate) fn new(seed: Vec<(Tile, PelletKind)>) -> Self {
        Self { pellets: seed.into_iter().collect() }
    }

    pub fn kind_at(&self, tile: Tile) -> Option<PelletKind> {
        self.pellets.get(&tile).copied()
    }

    pub(crate) fn remove(&mut self, tile: Tile) -> Option<PelletKind> {
        self.pellets.remove(&tile)
    }

    pub fn len(&self) -> usize {
        self.pellets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pellets.is_empty()
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Tile, PelletKind)> + '_ {
        self.pellets.iter().map(|(&tile, &kind)| (tile, kind))
    }

    pub fn power_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.tiles().filter(|(_, kind)| *kind == PelletKind::Power).map(|(tile, _)| tile)
    }

    pub fn ordinary_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.tiles().filter(|(_, kind)| *kind == PelletKind::Pellet).map(|(tile, _)| tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> PelletField {
        PelletField::new(vec![
            (Tile { row: 0, col: 0 }, PelletKind::Pellet),
            (Tile { row: 0, col: 1 }, PelletKind::Power),
            (Tile { row: 2, col: 0 }, PelletKind::Pellet),
        ])
    }

    #[test]
    fn partition_by_kind() {
        let field = field();
        assert_eq!(field.power_tiles().collect::<Vec<_>>(), vec![Tile { row: 0, col: 1 }]);
        assert_eq!(field.ordinary_tiles().count(), 2);
        assert_eq!(field.len(), 3);
    }

    #[test]
    fn removal_shrinks_monotonically() {
        let mut field = field();
        assert_eq!(field.remove(Tile { row: 0, col: 1 }), Some(PelletKind::Power));
        assert_eq!(field.remove(Tile { row: 0, col: 1 }), None);
        assert_eq!(field.len(), 2);
        assert_eq!(field.kind_at(Tile { row: 0, col: 1 }), None);
    }
}
