//! Simulation error types. Placement errors are not modeled as `Error` at
//! all — `add_component`/`add_cable` simply return `bool` — only fatal,
//! per-tick simulation errors get a typed representation here.

/// The underlying reason a microcontroller instruction faulted, or a
/// peripheral hit an unrecoverable condition (e.g. a `Memory` pointer out of
/// range, or a malformed `xp`/`xd` pairing).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("failed to convert '{0}' to value")]
    BadOperand(String),

    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),

    #[error("'{mnemonic}' expects {expected} operand(s), got {got}")]
    WrongArity {
        mnemonic: String,
        expected: usize,
        got: usize,
    },

    #[error("jmp target {0} out of range")]
    JumpOutOfRange(i64),

    #[error("division by zero")]
    DivideByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    #[error("duplicate data-location address '{0}'")]
    DuplicateAddress(String),

    #[error("label '{0}' collides with a register or bus address")]
    LabelCollision(String),

    #[error("invalid label name '{0}'")]
    InvalidLabel(String),

    #[error("memory pointer {pointer} out of range for capacity {capacity}")]
    MemoryPointerOutOfRange { pointer: i64, capacity: usize },

    #[error("memory pointer pin '{0}' has no matching data pin")]
    MissingDataPin(String),

    #[error("memory pointer pin '{0}' matches more than one data pin")]
    DuplicateDataPin(String),
}

/// A fatal simulation error, as raised from `Board::tick`. Carries the
/// 1-based source line for microcontroller faults, in `"Line <N> -
/// <reason>"` message form; peripheral faults (e.g. a `Memory` pointer
/// violation) have no source line and are reported bare.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Line {line} - {fault}")]
    Instruction { line: usize, fault: Fault },

    #[error("{0}")]
    Peripheral(Fault),
}

impl SimulationError {
    pub fn at_line(line: usize, fault: Fault) -> Self {
        SimulationError::Instruction { line, fault }
    }
}

pub type SimResult<T> = Result<T, SimulationError>;
