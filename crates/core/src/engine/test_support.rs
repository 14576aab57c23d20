//! Shared fixtures for the engine test suites.
//! This module exists to avoid repeating layout setup across many tests.
//! It does not own production logic.

use super::Navigator;
use crate::types::Policy;

pub(super) fn session_of(text: &str) -> Navigator {
    Navigator::from_layout(text, Policy::default()).expect("fixture layout must parse")
}

/// 5x5 open grid with a single pellet in the far corner.
pub(super) fn open_grid_session() -> Navigator {
    session_of("-----\n-----\n-----\n-----\n----.")
}

/// 5x5 open grid with ordinary pellets along the bottom row and a power
/// pellet in the corner.
pub(super) fn power_corner_session() -> Navigator {
    session_of("-----\n-----\n-----\n-----\n-...o")
}

/// Two corridors joined at both ends; the only pellet sits at the end of the
/// top corridor, so a ghost parked there forces a choice between routes.
pub(super) fn detour_session() -> Navigator {
    session_of("#########\n#------.#\n#-#####-#\n#-------#\n#########")
}
