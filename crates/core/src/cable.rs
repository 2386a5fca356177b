//! The cable graph: Solder and Bridge wires between adjacent grid cells, and
//! the flood-fill that resolves a "net" of electrically-joined cables/buses.
//!
//! Solders join at any shared endpoint. Bridges cross solders without
//! connecting; a bridge only continues a net through another bridge
//! sharing the same endpoint.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::grid::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CableKind {
    Solder,
    Bridge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cable {
    pub a: Position,
    pub b: Position,
    pub kind: CableKind,
}

impl Cable {
    pub fn new(a: Position, b: Position, kind: CableKind) -> Self {
        Self { a, b, kind }
    }

    /// Endpoint-set equality used for deduplication.
    pub fn same_endpoints(&self, other: &Cable) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }

    pub fn contains(&self, p: Position) -> bool {
        self.a == p || self.b == p
    }

    pub fn other_end(&self, p: Position) -> Option<Position> {
        if self.a == p {
            Some(self.b)
        } else if self.b == p {
            Some(self.a)
        } else {
            None
        }
    }
}

/// A reference to one cable in the board's partitioned storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CableId {
    pub kind: CableKind,
    pub index: usize,
}

impl CableId {
    pub fn new(kind: CableKind, index: usize) -> Self {
        Self { kind, index }
    }
}

/// Anything the flood fill needs to know about the board, kept narrow so the
/// algorithm doesn't depend on `Board`'s full definition.
pub trait CableLookup {
    fn solders(&self) -> &[Cable];
    fn bridges(&self) -> &[Cable];
    /// True if `p` lies inside some component's footprint (a net may not
    /// continue flood-filling past such a point).
    fn is_inside_component(&self, p: Position) -> bool;

    fn cable(&self, id: CableId) -> &Cable {
        match id.kind {
            CableKind::Solder => &self.solders()[id.index],
            CableKind::Bridge => &self.bridges()[id.index],
        }
    }

    fn all_cables(&self) -> Vec<CableId> {
        let mut ids: Vec<CableId> = (0..self.solders().len())
            .map(|i| CableId::new(CableKind::Solder, i))
            .collect();
        ids.extend((0..self.bridges().len()).map(|i| CableId::new(CableKind::Bridge, i)));
        ids
    }

    fn find_by_endpoints(&self, a: Position, b: Position) -> Option<CableId> {
        self.all_cables().into_iter().find(|id| {
            let c = self.cable(*id);
            (c.a == a && c.b == b) || (c.a == b && c.b == a)
        })
    }

    /// Count of bridges containing a given grid point.
    fn bridge_count_at(&self, p: Position) -> usize {
        self.bridges().iter().filter(|c| c.contains(p)).count()
    }
}

/// Flood-fill the net reachable from `seed`, returning the set of cables it
/// contains, following the frontier/expansion rule above.
pub fn resolve_net(board: &impl CableLookup, seed: CableId) -> HashSet<CableId> {
    let mut visited: HashSet<CableId> = HashSet::new();
    visited.insert(seed);

    let seed_cable = board.cable(seed);
    let mut frontier: Vec<Position> = [seed_cable.a, seed_cable.b]
        .into_iter()
        .filter(|p| !board.is_inside_component(*p))
        .collect();

    while let Some(p) = frontier.pop() {
        let b = board.bridge_count_at(p);

        for id in board.all_cables() {
            if visited.contains(&id) {
                continue;
            }
            let candidate = board.cable(id);
            if !candidate.contains(p) {
                continue;
            }

            // Determine the kind of whichever already-visited cable we are
            // expanding from by re-deriving it from `p`'s membership; since a
            // given point may be shared by cables of both kinds, the rule is
            // evaluated per-candidate against the set of *all* visited cables
            // touching `p` of the opposite kind.
            let touches_same_kind_visited = visited
                .iter()
                .any(|v| board.cable(*v).kind == candidate.kind && board.cable(*v).contains(p));
            let touches_other_kind_visited = visited
                .iter()
                .any(|v| board.cable(*v).kind != candidate.kind && board.cable(*v).contains(p));

            let eligible = if touches_same_kind_visited {
                true
            } else if touches_other_kind_visited {
                b > 1
            } else {
                false
            };

            if !eligible {
                continue;
            }

            visited.insert(id);
            if let Some(other) = candidate.other_end(p) {
                if !board.is_inside_component(other) {
                    frontier.push(other);
                }
            }
        }
    }

    visited
}
