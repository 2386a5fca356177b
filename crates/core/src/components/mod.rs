//! Components: the placeable devices of a board.
//!
//! `Component` is a single tagged-variant type. The fields common to every
//! component (footprint, position, bus arrays) live on `Component` itself;
//! each variant's own state lives in `ComponentKind`.

pub mod buttons;
pub mod displays;
pub mod led;
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::bus::{BusId, BusKind, SBus, XBus};
use crate::env::TickEnv;
use crate::error::SimResult;
use crate::grid::{Direction, Position};
use crate::mcu::McuState;

pub use buttons::{PressButtonState, ToggleButtonState};
pub use displays::{BitmapDisplayState, NumericDisplayState, TextDisplayState};
pub use led::LedState;
pub use memory::MemoryState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub position: Position,
    pub width: i32,
    pub height: i32,
    pub sbuses: Vec<SBus>,
    pub xbuses: Vec<XBus>,
    pub kind: ComponentKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComponentKind {
    PressButton(PressButtonState),
    ToggleButton(ToggleButtonState),
    Led(LedState),
    NumericDisplay(NumericDisplayState),
    TextDisplay(TextDisplayState),
    BitmapDisplay(BitmapDisplayState),
    Memory(MemoryState),
    MicroController(McuState),
}

impl Component {
    pub fn new(position: Position, width: i32, height: i32, kind: ComponentKind) -> Self {
        Self {
            position,
            width,
            height,
            sbuses: Vec::new(),
            xbuses: Vec::new(),
            kind,
        }
    }

    /// All grid cells this component's footprint occupies.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        let pos = self.position;
        (0..self.height).flat_map(move |dy| {
            (0..self.width).map(move |dx| Position::new(pos.x + dx, pos.y + dy))
        })
    }

    pub fn contains_cell(&self, p: Position) -> bool {
        p.x >= self.position.x
            && p.y >= self.position.y
            && p.x < self.position.x + self.width
            && p.y < self.position.y + self.height
    }

    /// Absolute position of bus `index` of `kind` on this component.
    pub fn bus_port(&self, kind: BusKind, index: usize) -> Position {
        let local = match kind {
            BusKind::S => self.sbuses[index].position,
            BusKind::X => self.xbuses[index].position,
        };
        self.position + local
    }

    pub fn bus_direction(&self, kind: BusKind, index: usize) -> crate::grid::Direction {
        match kind {
            BusKind::S => self.sbuses[index].direction,
            BusKind::X => self.xbuses[index].direction,
        }
    }

    /// Every (kind, index, address) triple of this component's buses, in
    /// address-uniqueness-checking order: S-buses then X-buses.
    pub fn bus_addresses(&self) -> impl Iterator<Item = &str> + '_ {
        self.sbuses
            .iter()
            .map(|b| b.address.as_str())
            .chain(self.xbuses.iter().map(|b| b.address.as_str()))
    }

    /// Every bus port in absolute board coordinates, as `(kind, index,
    /// position, direction)`. Used by the board to resolve cable wiring and
    /// validate placement.
    pub fn bus_ports(&self) -> impl Iterator<Item = (BusKind, usize, Position, Direction)> + '_ {
        let pos = self.position;
        self.sbuses
            .iter()
            .enumerate()
            .map(move |(i, b)| (BusKind::S, i, pos + b.position, b.direction))
            .chain(
                self.xbuses
                    .iter()
                    .enumerate()
                    .map(move |(i, b)| (BusKind::X, i, pos + b.position, b.direction)),
            )
    }

    pub fn find_sbus(&self, address: &str) -> Option<usize> {
        self.sbuses.iter().position(|b| b.address == address)
    }

    pub fn find_xbus(&self, address: &str) -> Option<usize> {
        self.xbuses.iter().position(|b| b.address == address)
    }

    pub fn tick(&mut self, env: &TickEnv) -> SimResult<()> {
        let Component {
            sbuses,
            xbuses,
            kind,
            ..
        } = self;
        match kind {
            ComponentKind::PressButton(s) => {
                buttons::tick_press_button(s, sbuses);
                Ok(())
            }
            ComponentKind::ToggleButton(s) => {
                buttons::tick_toggle_button(s, sbuses);
                Ok(())
            }
            ComponentKind::Led(s) => {
                led::tick_led(s, sbuses, env);
                Ok(())
            }
            ComponentKind::NumericDisplay(s) => {
                displays::tick_numeric_display(s, xbuses);
                Ok(())
            }
            ComponentKind::TextDisplay(s) => {
                displays::tick_text_display(s, xbuses);
                Ok(())
            }
            ComponentKind::BitmapDisplay(s) => {
                displays::tick_bitmap_display(s, xbuses);
                Ok(())
            }
            ComponentKind::Memory(s) => memory::tick_memory(s, xbuses),
            ComponentKind::MicroController(s) => {
                crate::mcu::tick_mcu(s, sbuses, xbuses, env)
            }
        }
    }

    pub fn reset(&mut self) {
        for b in &mut self.sbuses {
            b.reset();
        }
        for b in &mut self.xbuses {
            b.reset();
        }
        match &mut self.kind {
            ComponentKind::PressButton(s) => s.state = false,
            ComponentKind::ToggleButton(s) => s.state = false,
            ComponentKind::Led(s) => s.value = 0,
            ComponentKind::NumericDisplay(s) => s.text.clear(),
            ComponentKind::TextDisplay(s) => s.text = " ".repeat(s.max_len),
            ComponentKind::BitmapDisplay(s) => s.reset(),
            ComponentKind::Memory(s) => s.reset(),
            ComponentKind::MicroController(s) => s.reset(),
        }
    }
}
