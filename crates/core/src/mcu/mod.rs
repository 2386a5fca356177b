//! Microcontroller: registers, compiled program, and per-tick execution.
//! The microcontroller is the one component that carries its own program
//! counter and executes instructions.

mod compiler;
mod interp;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bus::{SBus, XBus};
use crate::env::TickEnv;
use crate::error::{Fault, SimResult, SimulationError};
use crate::register::Register;

use interp::{execute, ExecCtx, StepOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McuState {
    pub registers: Vec<Register>,
    pub source: String,
    #[serde(skip)]
    pub(crate) compiled: Vec<Vec<String>>,
    #[serde(skip)]
    pub(crate) labels: HashMap<String, usize>,
    #[serde(skip)]
    pub(crate) source_lines: Vec<usize>,
    pub line: usize,
    pub sleep_cycles: i64,
    pub ops: u64,
    pub running: bool,
    pub error: Option<String>,
}

impl McuState {
    pub fn new(source: impl Into<String>, registers: Vec<Register>) -> Self {
        Self {
            registers,
            source: source.into(),
            compiled: Vec::new(),
            labels: HashMap::new(),
            source_lines: Vec::new(),
            line: 0,
            sleep_cycles: 0,
            ops: 0,
            running: false,
            error: None,
        }
    }

    /// Registers reset to zero; there is no separately stored "placement
    /// default" to revert to, so reset treats zero as the natural
    /// power-on value.
    pub fn reset(&mut self) {
        for r in &mut self.registers {
            r.value = 0;
        }
        self.line = 0;
        self.sleep_cycles = 0;
        self.ops = 0;
        self.error = None;
        self.running = !self.compiled.is_empty();
    }
}

/// (Re)compiles the program and resets execution position. Called once
/// per `Board::initialise`.
pub(crate) fn compile(mcu: &mut McuState, sbuses: &[SBus], xbuses: &[XBus]) -> SimResult<()> {
    compiler::compile(mcu, sbuses, xbuses)
}

fn wrap_line(next: usize, len: usize) -> usize {
    if next >= len {
        0
    } else {
        next
    }
}

fn validate_jump(target: i64, len: usize) -> Result<usize, Fault> {
    if target < 0 || target as usize > len {
        return Err(Fault::JumpOutOfRange(target));
    }
    let target = target as usize;
    Ok(if target == len { 0 } else { target })
}

/// At most one instruction per tick, with stall-no-advance semantics.
pub fn tick_mcu(
    state: &mut McuState,
    sbuses: &mut [SBus],
    xbuses: &mut [XBus],
    env: &TickEnv,
) -> SimResult<()> {
    if !state.running || state.error.is_some() {
        return Ok(());
    }
    if state.sleep_cycles > 0 {
        state.sleep_cycles -= 1;
        return Ok(());
    }
    if state.compiled.is_empty() {
        return Ok(());
    }

    let line = state.line;
    let tokens = state.compiled[line].clone();
    let source_line = state.source_lines[line];

    let outcome = {
        let mut ctx = ExecCtx {
            mcu: state,
            sbuses,
            xbuses,
            env,
        };
        execute(&tokens, &mut ctx)
    };

    match outcome {
        Ok(StepOutcome::Stall) => Ok(()),
        Ok(StepOutcome::Advance) => {
            state.ops += 1;
            state.line = wrap_line(line + 1, state.compiled.len());
            Ok(())
        }
        Ok(StepOutcome::Jump(target)) => match validate_jump(target, state.compiled.len()) {
            Ok(next) => {
                state.ops += 1;
                state.line = next;
                Ok(())
            }
            Err(fault) => {
                state.error = Some(format!("Line {source_line} - {fault}"));
                Err(SimulationError::at_line(source_line, fault))
            }
        },
        Err(fault) => {
            state.error = Some(format!("Line {source_line} - {fault}"));
            Err(SimulationError::at_line(source_line, fault))
        }
    }
}
