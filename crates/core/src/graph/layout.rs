//! Layout text parsing: the construction contract a level loader must meet.
//! A layout is a rectangular grid of single-character cells; anything that
//! violates the grid is a fatal construction error, never a partial graph.

use std::collections::BTreeMap;
use std::fmt;

use slotmap::SlotMap;

use super::{Edge, Graph, Node};
use crate::types::{Direction, NodeId, PelletKind, Tile};

/// Cell alphabet:
/// - `#` wall
/// - `.` corridor holding a pellet
/// - `o` corridor holding a power pellet
/// - `-` empty corridor
/// - `=` gate: walkable, but every edge entering it starts restricted
/// - `0`..`9` portal endpoint; each digit must appear exactly twice and the
///   two cells are linked regardless of grid distance
pub fn parse_layout(text: &str) -> Result<ParsedLayout, LayoutError> {
    let rows: Vec<&str> = text.lines().collect();
    let width = rows.first().map_or(0, |row| row.chars().count());
    if width == 0 {
        return Err(LayoutError::Empty);
    }

    let mut graph = Graph { nodes: SlotMap::with_key(), by_tile: BTreeMap::new() };
    let mut pellets = Vec::new();
    let mut gates = Vec::new();
    let mut portals: BTreeMap<char, Vec<Tile>> = BTreeMap::new();

    for (row_index, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != width {
            return Err(LayoutError::RaggedRow { row: row_index, expected: width, found });
        }
        for (col_index, cell) in row.chars().enumerate() {
            let tile = Tile { row: row_index as i32, col: col_index as i32 };
            match cell {
                '#' => continue,
                '.' => pellets.push((tile, PelletKind::Pellet)),
                'o' => pellets.push((tile, PelletKind::Power)),
                '-' => {}
                '=' => gates.push(tile),
                label @ '0'..='9' => portals.entry(label).or_default().push(tile),
                other => {
                    return Err(LayoutError::UnknownCell {
                        row: row_index,
                        col: col_index,
                        cell: other,
                    });
                }
            }
            insert_node(&mut graph, tile);
        }
    }

    link_adjacent(&mut graph);
    close_gate_entries(&mut graph, &gates);
    link_portals(&mut graph, portals)?;
    mark_junctions(&mut graph);

    Ok(ParsedLayout { graph, pellets })
}

/// A parsed layout: the graph plus the pellet seed positions the session
/// state is populated from.
pub struct ParsedLayout {
    pub graph: Graph,
    pub pellets: Vec<(Tile, PelletKind)>,
}

fn insert_node(graph: &mut Graph, tile: Tile) {
    let id = graph.nodes.insert(Node {
        id: NodeId::default(), // overwritten below
        tile,
        edges: [None; 4],
        portal: None,
        is_junction: false,
    });
    graph.nodes[id].id = id;
    graph.by_tile.insert(tile, id);
}

fn link_adjacent(graph: &mut Graph) {
    for (&tile, &id) in &graph.by_tile {
        for direction in Direction::ALL {
            if let Some(&next) = graph.by_tile.get(&direction.step(tile)) {
                graph.nodes[id].edges[direction as usize] =
                    Some(Edge { to: next, distance: 1, open: true });
            }
        }
    }
}

fn close_gate_entries(graph: &mut Graph, gates: &[Tile]) {
    for &tile in gates {
        let gate = graph.by_tile[&tile];
        let edges = graph.nodes[gate].edges;
        for (direction, edge) in Direction::ALL.into_iter().zip(edges) {
            let Some(edge) = edge else { continue };
            let back = direction.opposite();
            if let Some(entry) = graph.nodes[edge.to].edges[back as usize].as_mut() {
                entry.open = false;
            }
        }
    }
}

fn link_portals(graph: &mut Graph, portals: BTreeMap<char, Vec<Tile>>) -> Result<(), LayoutError> {
    for (label, tiles) in portals {
        match tiles.as_slice() {
            [a, b] => {
                let first = graph.by_tile[a];
                let second = graph.by_tile[b];
                graph.nodes[first].portal = Some(second);
                graph.nodes[second].portal = Some(first);
            }
            [_] => return Err(LayoutError::DanglingPortal { label }),
            _ => return Err(LayoutError::OverloadedPortal { label }),
        }
    }
    Ok(())
}

fn mark_junctions(graph: &mut Graph) {
    for node in graph.nodes.values_mut() {
        let present: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| node.edges[*direction as usize].is_some())
            .collect();
        node.is_junction = match present.as_slice() {
            [first, second] => first.opposite() != *second,
            _ => true,
        };
    }
}

/// Construction-time failures. The session must abort on any of these; a
/// partial graph never escapes the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    Empty,
    RaggedRow { row: usize, expected: usize, found: usize },
    UnknownCell { row: usize, col: usize, cell: char },
    DanglingPortal { label: char },
    OverloadedPortal { label: char },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "layout has no cells"),
            Self::RaggedRow { row, expected, found } => {
                write!(f, "row {row} has {found} cells, expected {expected}")
            }
            Self::UnknownCell { row, col, cell } => {
                write!(f, "unknown cell {cell:?} at row {row}, col {col}")
            }
            Self::DanglingPortal { label } => {
                write!(f, "portal {label:?} has a single endpoint")
            }
            Self::OverloadedPortal { label } => {
                write!(f, "portal {label:?} has more than two endpoints")
            }
        }
    }
}
