//! The pin model: typed connection points ("buses") attached to components.
//!
//! `SBus` carries a saturated 0..=255 signal with no protocol state. `XBus`
//! carries a small request/response state machine, kept in one place so
//! every transition is visible here.

use crate::grid::{Direction, Position};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusKind {
    S,
    X,
}

/// The XBus request/response protocol state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum XState {
    #[default]
    Idle,
    Reading,
    Writing,
    ReadingWriting,
    WriteComplete,
    ReadComplete,
}

impl XState {
    pub fn is_writer(&self) -> bool {
        matches!(self, XState::Writing | XState::ReadingWriting)
    }

    pub fn is_reader(&self) -> bool {
        matches!(self, XState::Reading | XState::ReadingWriting)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SBus {
    pub address: String,
    pub position: Position,
    pub direction: Direction,
    pub value: i64,
}

impl SBus {
    pub fn new(address: impl Into<String>, position: Position, direction: Direction) -> Self {
        Self {
            address: address.into(),
            position,
            direction,
            value: 0,
        }
    }

    /// Clamp and store a value: writes saturate to [0,255].
    pub fn write(&mut self, value: i64) {
        self.value = value.clamp(0, 255);
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XBus {
    pub address: String,
    pub position: Position,
    pub direction: Direction,
    pub state: XState,
    pub value: i64,
}

impl XBus {
    pub fn new(address: impl Into<String>, position: Position, direction: Direction) -> Self {
        Self {
            address: address.into(),
            position,
            direction,
            state: XState::Idle,
            value: 0,
        }
    }

    pub fn reset(&mut self) {
        self.state = XState::Idle;
        self.value = 0;
    }
}

/// Identifies a single bus (pin) anywhere on the board: which component, which
/// array (S or X), and its index within that array. Non-owning — used only
/// as a key/reference into the board's connectivity cache, never to reach
/// into another component's storage directly outside the XBus delivery sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusId {
    pub component: usize,
    pub kind: BusKind,
    pub index: usize,
}

impl BusId {
    pub fn new(component: usize, kind: BusKind, index: usize) -> Self {
        Self {
            component,
            kind,
            index,
        }
    }
}
