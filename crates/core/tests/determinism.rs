use navcore::{
    GhostPhase, InputJournal, InputPayload, Mode, Navigator, Policy, Tile, layout_hash,
    replay_to_end,
};

const MAZE: &str = "#########\n\
                    #...#...#\n\
                    #.#.#.#.#\n\
                    0.#...#.0\n\
                    #.##=##.#\n\
                    #...o...#\n\
                    #########";

/// Drive a session through a fixed script, journaling every input, and
/// return the journal plus the live snapshot hash. The ghost cycles through
/// its open exits by tick index and turns frightened at `fright_tick`.
fn scripted_session(fright_tick: u64) -> (InputJournal, u64) {
    let mut journal = InputJournal::new(MAZE);
    let mut navigator = Navigator::from_layout(MAZE, Policy::default()).expect("maze parses");

    let spawn_tile = Tile { row: 3, col: 3 };
    journal.append(InputPayload::SpawnGhost {
        tile: spawn_tile,
        phase: GhostPhase::Pursuing,
        active: true,
    });
    let ghost = navigator.spawn_ghost(spawn_tile, GhostPhase::Pursuing, true).expect("spawn");

    let mut agent = Tile { row: 1, col: 1 };
    journal.append(InputPayload::AgentAt { tile: agent });
    navigator.record_agent(agent).expect("agent report");

    for tick in 0..12u64 {
        let ghost_tile = navigator.ghost(ghost).expect("ghost exists").tile;
        let node = navigator.graph().node_at(ghost_tile).expect("ghost tile is a node");
        let exits: Vec<Tile> = navigator
            .graph()
            .neighbors(node)
            .map(|(_, to, _)| navigator.graph().tile_of(to))
            .collect();
        let target = exits[(tick as usize) % exits.len()];
        let phase =
            if tick >= fright_tick { GhostPhase::Frightened } else { GhostPhase::Pursuing };
        journal.append(InputPayload::SyncGhost { ghost: 0, tile: target, phase, active: true });
        navigator.sync_ghost(ghost, target, phase, true).expect("sync");

        let mode = if tick % 2 == 0 { Mode::Cautious } else { Mode::Greedy };
        let decision = navigator.decide(agent, mode).expect("decision");
        journal.append(InputPayload::Decide { mode, direction: decision.direction });

        if let Some(direction) = decision.direction {
            agent = direction.step(agent);
            journal.append(InputPayload::AgentAt { tile: agent });
            navigator.record_agent(agent).expect("agent report");

            // The game loop owns tunnel warps: walking onto a mouth drops
            // the agent at the twin.
            let agent_node = navigator.graph().node_at(agent).expect("agent tile is a node");
            if let Some(twin) = navigator.graph().portal_of(agent_node) {
                agent = navigator.graph().tile_of(twin);
                journal.append(InputPayload::AgentAt { tile: agent });
                navigator.record_agent(agent).expect("agent report");
            }
        }
    }

    (journal, navigator.snapshot_hash())
}

#[test]
fn identical_scripts_produce_identical_hashes() {
    let (_, left) = scripted_session(4);
    let (_, right) = scripted_session(4);
    assert_eq!(left, right, "identically driven sessions must hash identically");
}

#[test]
fn replay_matches_the_live_session() {
    let (journal, live) = scripted_session(4);
    assert_eq!(journal.layout_hash, layout_hash(MAZE));

    let outcome = replay_to_end(MAZE, Policy::default(), &journal).expect("replay succeeds");
    assert_eq!(outcome.snapshot_hash, live);

    let again = replay_to_end(MAZE, Policy::default(), &journal).expect("replay again");
    assert_eq!(outcome.snapshot_hash, again.snapshot_hash);
    assert_eq!(outcome.final_tick, again.final_tick);
}

#[test]
fn diverging_scripts_produce_different_hashes() {
    // An early fright flips the agent into pursuit for most of the script;
    // a late one keeps it avoiding. The trajectories, and therefore the
    // pellets consumed, must differ.
    let (_, early_fright) = scripted_session(2);
    let (_, late_fright) = scripted_session(9);
    assert_ne!(early_fright, late_fright);
}
