//! The read-only view of *other* components a component's `tick` needs.
//!
//! The connectivity cache is modeled as indices into the board's
//! component/bus tables rather than owned references, which avoids cyclic
//! structures. `TickEnv` is the borrow-split
//! view that lets the currently-ticking component read its peers' bus
//! values without the board handing out an aliased `&mut` to itself.

use crate::bus::{BusId, BusKind};
use crate::cache::ConnectivityCache;
use crate::components::Component;

pub struct TickEnv<'a> {
    before: &'a [Component],
    current_index: usize,
    after: &'a [Component],
    cache: &'a ConnectivityCache,
}

impl<'a> TickEnv<'a> {
    pub fn new(
        before: &'a [Component],
        current_index: usize,
        after: &'a [Component],
        cache: &'a ConnectivityCache,
    ) -> Self {
        Self {
            before,
            current_index,
            after,
            cache,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    fn component(&self, index: usize) -> &Component {
        if index < self.current_index {
            &self.before[index]
        } else {
            &self.after[index - self.current_index - 1]
        }
    }

    fn sbus_value(&self, component: usize, index: usize) -> i64 {
        self.component(component).sbuses[index].value
    }

    /// The net value of one of the current component's own S-buses: the max
    /// of its own raw value and every peer's raw value.
    pub fn sbus_net_value(&self, own_value: i64, bus_index: usize) -> i64 {
        let bus = BusId::new(self.current_index, BusKind::S, bus_index);
        match self.peer_sbus_max(bus) {
            Some(peer) => own_value.max(peer),
            None => own_value,
        }
    }

    /// The maximum raw value among a bus's peers that live on *other*
    /// components (callers fold in their own, same-component value — see
    /// `Component::sbus_net_value`). Returns `None` if there are no such
    /// peers.
    pub fn peer_sbus_max(&self, bus: BusId) -> Option<i64> {
        debug_assert_eq!(bus.kind, BusKind::S);
        let peers = self.cache.peers_of(bus)?;
        peers
            .iter()
            .filter(|p| p.component != self.current_index)
            .map(|p| self.sbus_value(p.component, p.index))
            .max()
    }
}
