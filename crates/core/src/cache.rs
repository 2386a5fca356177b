//! The connectivity cache: for every bus on the board, the list of peer
//! buses it shares a net with. Built once per `Board::initialise()` and
//! stable until the next one.

use std::collections::HashMap;

use crate::bus::BusId;

/// Entries are kept in a fixed, deterministic order — component placement
/// order, then S-buses before X-buses, then bus index — so that the XBus
/// delivery sweep has a well-defined "connectivity cache iteration order"
/// to break ties by.
#[derive(Debug, Default, Clone)]
pub struct ConnectivityCache {
    order: Vec<BusId>,
    peers: HashMap<BusId, Vec<BusId>>,
}

impl ConnectivityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bus: BusId, peers: Vec<BusId>) {
        self.order.push(bus);
        self.peers.insert(bus, peers);
    }

    pub fn peers_of(&self, bus: BusId) -> Option<&[BusId]> {
        self.peers.get(&bus).map(|v| v.as_slice())
    }

    /// Iterates cache entries in the deterministic order they were built
    /// (placement order, then S-before-X, then bus index).
    pub fn iter_in_order(&self) -> impl Iterator<Item = (BusId, &[BusId])> {
        self.order
            .iter()
            .map(move |b| (*b, self.peers.get(b).map(|v| v.as_slice()).unwrap_or(&[])))
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
