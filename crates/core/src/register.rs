//! Microcontroller registers.

use serde::{Deserialize, Serialize};

/// The reserved address of a microcontroller's accumulator register.
pub const ACCUMULATOR: &str = "acc";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Register {
    pub address: String,
    pub value: i64,
}

impl Register {
    pub fn new(address: impl Into<String>, value: i64) -> Self {
        Self {
            address: address.into(),
            value,
        }
    }
}
