//! Addressable memory: paired `xp*`/`xd*` XBus pins.

use serde::{Deserialize, Serialize};

use crate::bus::{XBus, XState};
use crate::error::{Fault, SimResult, SimulationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryState {
    pub cells: Vec<i64>,
}

impl MemoryState {
    /// Capacity is clamped to [0, 2048].
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(2048);
        Self {
            cells: vec![0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn reset(&mut self) {
        for c in &mut self.cells {
            *c = 0;
        }
    }
}

/// Pairs each `xp*` pin with the `xd*` pin sharing its suffix. Fatal if a
/// pointer pin has zero or more than one matching data pin.
fn resolve_pairs(xbuses: &[XBus]) -> SimResult<Vec<(usize, usize)>> {
    let mut pairs = Vec::new();
    for (pi, p) in xbuses.iter().enumerate() {
        let Some(suffix) = p.address.strip_prefix("xp") else {
            continue;
        };
        let data_address = format!("xd{suffix}");
        let matches: Vec<usize> = xbuses
            .iter()
            .enumerate()
            .filter(|(_, b)| b.address == data_address)
            .map(|(i, _)| i)
            .collect();
        match matches.len() {
            0 => {
                return Err(SimulationError::Peripheral(Fault::MissingDataPin(
                    p.address.clone(),
                )))
            }
            1 => pairs.push((pi, matches[0])),
            _ => {
                return Err(SimulationError::Peripheral(Fault::DuplicateDataPin(
                    p.address.clone(),
                )))
            }
        }
    }
    Ok(pairs)
}

pub fn tick_memory(state: &mut MemoryState, xbuses: &mut [XBus]) -> SimResult<()> {
    let pairs = resolve_pairs(xbuses)?;
    let capacity = state.capacity();

    for (pointer_idx, data_idx) in pairs {
        let pointer = xbuses[pointer_idx].value;
        if pointer < 0 || pointer as usize >= capacity {
            return Err(SimulationError::Peripheral(Fault::MemoryPointerOutOfRange {
                pointer,
                capacity,
            }));
        }
        let p = pointer as usize;

        xbuses[pointer_idx].state = XState::ReadingWriting;

        if xbuses[data_idx].state == XState::ReadComplete {
            state.cells[p] = xbuses[data_idx].value;
            xbuses[data_idx].state = XState::ReadingWriting;
        }

        xbuses[data_idx].value = state.cells[p];
    }

    Ok(())
}
