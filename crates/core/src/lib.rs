//! The simulation domain model: grid geometry, buses, cables, components,
//! the microcontroller, and the board that ties them together.

pub mod board;
pub mod bus;
pub mod cable;
pub mod cache;
pub mod components;
pub mod env;
pub mod error;
pub mod grid;
pub mod mcu;
pub mod register;

pub use board::Board;
pub use bus::{BusId, BusKind, SBus, XBus, XState};
pub use cable::{Cable, CableId, CableKind, CableLookup};
pub use components::{Component, ComponentKind};
pub use error::{Fault, SimResult, SimulationError};
pub use grid::{Direction, Position};
pub use mcu::McuState;
pub use register::Register;
