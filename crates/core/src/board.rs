//! The board: placement, the cable graph, the connectivity cache, and the
//! tick scheduler.

use std::collections::HashSet;

use crate::bus::{BusId, BusKind, XState};
use crate::cable::{resolve_net, Cable, CableId, CableKind, CableLookup};
use crate::components::{Component, ComponentKind};
use crate::env::TickEnv;
use crate::error::SimResult;
use crate::cache::ConnectivityCache;
use crate::grid::{Direction, Position};

pub struct Board {
    pub width: i32,
    pub height: i32,
    components: Vec<Component>,
    solders: Vec<Cable>,
    bridges: Vec<Cable>,
    cache: ConnectivityCache,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            components: Vec::new(),
            solders: Vec::new(),
            bridges: Vec::new(),
            cache: ConnectivityCache::new(),
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut [Component] {
        &mut self.components
    }

    /// Sum of `ops` across every microcontroller on the board.
    pub fn total_ops(&self) -> u64 {
        self.components
            .iter()
            .filter_map(|c| match &c.kind {
                ComponentKind::MicroController(m) => Some(m.ops),
                _ => None,
            })
            .sum()
    }

    /// The error message of the first microcontroller whose last tick
    /// faulted, if any.
    pub fn first_error(&self) -> Option<&str> {
        self.components.iter().find_map(|c| match &c.kind {
            ComponentKind::MicroController(m) => m.error.as_deref(),
            _ => None,
        })
    }

    /// Footprint must stay inside bounds, and no two components may share a
    /// cell.
    pub fn add_component(&mut self, component: Component) -> bool {
        for cell in component.cells() {
            if !cell.in_bounds(self.width, self.height) {
                tracing::warn!(?cell, "component footprint out of bounds");
                return false;
            }
        }
        for existing in &self.components {
            for cell in component.cells() {
                if existing.contains_cell(cell) {
                    tracing::warn!(?cell, "component footprint overlaps an existing component");
                    return false;
                }
            }
        }
        self.components.push(component);
        true
    }

    pub fn remove_component(&mut self, index: usize) -> bool {
        if index < self.components.len() {
            self.components.remove(index);
            true
        } else {
            false
        }
    }

    /// Cable placement rules: both endpoints in bounds and adjacent, no
    /// duplicate cable between the same two endpoints.
    pub fn add_cable(&mut self, cable: Cable) -> bool {
        if !cable.a.in_bounds(self.width, self.height) || !cable.b.in_bounds(self.width, self.height)
        {
            return false;
        }
        if !cable.a.is_adjacent(&cable.b) {
            return false;
        }
        if self.find_by_endpoints(cable.a, cable.b).is_some() {
            return false;
        }

        for component in &self.components {
            let a_inside = component.contains_cell(cable.a);
            let b_inside = component.contains_cell(cable.b);
            if !a_inside && !b_inside {
                continue;
            }
            if a_inside && b_inside {
                tracing::warn!("cable endpoints both land inside the same component");
                return false;
            }
            if cable.kind == CableKind::Bridge {
                tracing::warn!("bridges may not terminate inside a component");
                return false;
            }
            let (inside, outside) = if a_inside {
                (cable.a, cable.b)
            } else {
                (cable.b, cable.a)
            };
            let aligned = component
                .bus_ports()
                .any(|(_, _, p, d)| p == inside && inside.neighbour(d) == outside);
            if !aligned {
                tracing::warn!("cable endpoint does not align with a facing bus port");
                return false;
            }
        }

        let kind = cable.kind;
        let seed = match kind {
            CableKind::Solder => {
                self.solders.push(cable);
                CableId::new(CableKind::Solder, self.solders.len() - 1)
            }
            CableKind::Bridge => {
                self.bridges.push(cable);
                CableId::new(CableKind::Bridge, self.bridges.len() - 1)
            }
        };

        let net = resolve_net(self, seed);
        if self.net_mixes_bus_kinds(&net) {
            tracing::warn!("cable would join a net carrying both S-buses and X-buses");
            match kind {
                CableKind::Solder => {
                    self.solders.pop();
                }
                CableKind::Bridge => {
                    self.bridges.pop();
                }
            }
            return false;
        }

        true
    }

    pub fn remove_cable(&mut self, kind: CableKind, index: usize) -> bool {
        let store = match kind {
            CableKind::Solder => &mut self.solders,
            CableKind::Bridge => &mut self.bridges,
        };
        if index < store.len() {
            store.remove(index);
            true
        } else {
            false
        }
    }

    /// The unique cable the bus `(port, dir)` is wired to, if any.
    fn wired_cable(&self, port: Position, dir: Direction) -> Option<CableId> {
        let other = port.neighbour(dir);
        self.all_cables().into_iter().find(|id| {
            let c = self.cable(*id);
            c.contains(port) && c.other_end(port) == Some(other)
        })
    }

    fn net_mixes_bus_kinds(&self, net: &HashSet<CableId>) -> bool {
        let mut saw_s = false;
        let mut saw_x = false;
        for component in &self.components {
            for (kind, _idx, p, d) in component.bus_ports() {
                if let Some(wired) = self.wired_cable(p, d) {
                    if net.contains(&wired) {
                        match kind {
                            BusKind::S => saw_s = true,
                            BusKind::X => saw_x = true,
                        }
                    }
                }
            }
        }
        saw_s && saw_x
    }

    /// Every other bus in the same net as `(port, dir)`.
    fn peers_of_bus(&self, bus_id: BusId, port: Position, dir: Direction) -> Vec<BusId> {
        let Some(seed) = self.wired_cable(port, dir) else {
            return Vec::new();
        };
        let net = resolve_net(self, seed);
        let mut peers = Vec::new();
        for (ci, component) in self.components.iter().enumerate() {
            for (kind, idx, p, d) in component.bus_ports() {
                let candidate = BusId::new(ci, kind, idx);
                if candidate == bus_id {
                    continue;
                }
                if let Some(wired) = self.wired_cable(p, d) {
                    if net.contains(&wired) {
                        peers.push(candidate);
                    }
                }
            }
        }
        peers
    }

    /// Recompiles every microcontroller and rebuilds the connectivity cache.
    /// Must be called before `tick`.
    pub fn initialise(&mut self) -> SimResult<()> {
        tracing::info!(components = self.components.len(), "initialising board");

        for component in &mut self.components {
            let Component {
                sbuses,
                xbuses,
                kind,
                ..
            } = component;
            if let ComponentKind::MicroController(mcu) = kind {
                crate::mcu::compile(mcu, sbuses.as_slice(), xbuses.as_slice())?;
            }
        }

        let mut cache = ConnectivityCache::new();
        for (ci, component) in self.components.iter().enumerate() {
            for (kind, idx, port, dir) in component.bus_ports() {
                let bus_id = BusId::new(ci, kind, idx);
                let peers = self.peers_of_bus(bus_id, port, dir);
                cache.insert(bus_id, peers);
            }
        }
        self.cache = cache;

        Ok(())
    }

    /// One tick runs every component, then one XBus delivery sweep. `dt` is
    /// the caller's elapsed-time bookkeeping — the scheduler itself is
    /// discrete and tick-driven, not a function of `dt`.
    pub fn tick(&mut self, dt: u64) -> SimResult<()> {
        tracing::debug!(dt, "board tick");

        let len = self.components.len();
        for i in 0..len {
            let (before, rest) = self.components.split_at_mut(i);
            let (current, after) = rest.split_at_mut(1);
            let env = TickEnv::new(&*before, i, &*after, &self.cache);
            current[0].tick(&env)?;
        }

        self.deliver_xbus_messages();
        Ok(())
    }

    /// One pass over the connectivity cache, in its deterministic order,
    /// matching each writer to its first eligible reader.
    fn deliver_xbus_messages(&mut self) {
        let entries: Vec<(BusId, Vec<BusId>)> = self
            .cache
            .iter_in_order()
            .map(|(id, peers)| (id, peers.to_vec()))
            .collect();

        for (bus_id, peers) in entries {
            if bus_id.kind != BusKind::X {
                continue;
            }
            let writer_state = self.components[bus_id.component].xbuses[bus_id.index].state;
            if !writer_state.is_writer() {
                continue;
            }
            let matched = peers.into_iter().find(|peer| {
                peer.kind == BusKind::X
                    && self.components[peer.component].xbuses[peer.index]
                        .state
                        .is_reader()
            });
            if let Some(peer) = matched {
                let value = self.components[bus_id.component].xbuses[bus_id.index].value;
                self.components[peer.component].xbuses[peer.index].value = value;
                self.components[peer.component].xbuses[peer.index].state = XState::ReadComplete;
                self.components[bus_id.component].xbuses[bus_id.index].state =
                    XState::WriteComplete;
            }
        }
    }

    pub fn reset(&mut self) {
        tracing::info!("resetting board");
        for component in &mut self.components {
            component.reset();
        }
    }
}

impl CableLookup for Board {
    fn solders(&self) -> &[Cable] {
        &self.solders
    }

    fn bridges(&self) -> &[Cable] {
        &self.bridges
    }

    fn is_inside_component(&self, p: Position) -> bool {
        self.components.iter().any(|c| c.contains_cell(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{SBus, XBus};
    use crate::components::{LedState, PressButtonState};
    use crate::mcu::McuState;
    use crate::register::Register;

    fn button_with_port(x: i32, y: i32) -> Component {
        let mut c = Component::new(
            Position::new(x, y),
            1,
            1,
            ComponentKind::PressButton(PressButtonState { state: true }),
        );
        c.sbuses
            .push(SBus::new("s0", Position::new(0, 0), Direction::Right));
        c
    }

    fn led_with_port(x: i32, y: i32) -> Component {
        let mut c = Component::new(
            Position::new(x, y),
            1,
            1,
            ComponentKind::Led(LedState::default()),
        );
        c.sbuses
            .push(SBus::new("s0", Position::new(0, 0), Direction::Left));
        c
    }

    #[test]
    fn press_button_drives_led_through_a_solder() {
        let mut board = Board::new(3, 1);
        assert!(board.add_component(button_with_port(0, 0)));
        assert!(board.add_component(led_with_port(2, 0)));
        assert!(board.add_cable(Cable::new(
            Position::new(0, 0),
            Position::new(1, 0),
            CableKind::Solder,
        )));
        assert!(board.add_cable(Cable::new(
            Position::new(1, 0),
            Position::new(2, 0),
            CableKind::Solder,
        )));
        board.initialise().unwrap();
        board.tick(1).unwrap();

        let ComponentKind::Led(led) = &board.components()[1].kind else {
            panic!("expected led");
        };
        assert_eq!(led.value, 255);
    }

    #[test]
    fn bridge_does_not_join_crossed_solders() {
        let mut board = Board::new(2, 2);
        assert!(board.add_cable(Cable::new(
            Position::new(0, 0),
            Position::new(1, 0),
            CableKind::Solder,
        )));
        assert!(board.add_cable(Cable::new(
            Position::new(0, 1),
            Position::new(1, 1),
            CableKind::Solder,
        )));
        assert!(board.add_cable(Cable::new(
            Position::new(0, 0),
            Position::new(0, 1),
            CableKind::Bridge,
        )));
        let net = resolve_net(&board, CableId::new(CableKind::Solder, 0));
        assert_eq!(net.len(), 1);
    }

    fn mcu_component(position: Position, source: &str) -> Component {
        Component::new(
            position,
            1,
            1,
            ComponentKind::MicroController(McuState::new(source, vec![Register::new("acc", 0)])),
        )
    }

    #[test]
    fn two_microcontrollers_hand_off_over_xbus() {
        let mut board = Board::new(3, 1);
        let mut writer = mcu_component(Position::new(0, 0), "mov 9 x0\nstop\n");
        writer
            .xbuses
            .push(XBus::new("x0", Position::new(0, 0), Direction::Right));
        let mut reader = mcu_component(Position::new(2, 0), "mov x0 acc\nstop\n");
        reader
            .xbuses
            .push(XBus::new("x0", Position::new(0, 0), Direction::Left));

        assert!(board.add_component(writer));
        assert!(board.add_component(reader));
        assert!(board.add_cable(Cable::new(
            Position::new(0, 0),
            Position::new(1, 0),
            CableKind::Solder,
        )));
        assert!(board.add_cable(Cable::new(
            Position::new(1, 0),
            Position::new(2, 0),
            CableKind::Solder,
        )));

        board.initialise().unwrap();
        for _ in 0..4 {
            board.tick(1).unwrap();
        }

        let ComponentKind::MicroController(reader_state) = &board.components()[1].kind else {
            panic!("expected microcontroller");
        };
        assert_eq!(
            reader_state
                .registers
                .iter()
                .find(|r| r.address == "acc")
                .unwrap()
                .value,
            9
        );
    }

    #[test]
    fn wrong_arity_reports_fatal_with_line_number() {
        let mut board = Board::new(1, 1);
        assert!(board.add_component(mcu_component(Position::new(0, 0), "mov 1 0 2\n")));
        board.initialise().unwrap();
        let err = board.tick(1).unwrap_err();
        assert_eq!(err.to_string(), "Line 1 - 'mov' expects 2 operand(s), got 3");
    }

    #[test]
    fn divide_by_zero_halts_with_fatal_error() {
        let mut board = Board::new(1, 1);
        assert!(board.add_component(mcu_component(Position::new(0, 0), "mov 0 acc\ndiv acc\n")));
        board.initialise().unwrap();
        board.tick(1).unwrap();
        let err = board.tick(1).unwrap_err();
        assert_eq!(err.to_string(), "Line 2 - division by zero");
        assert_eq!(board.first_error(), Some("Line 2 - division by zero"));
    }
}
