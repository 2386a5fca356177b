//! LED: value = max of the net on each S-bus, clamped to [0,255].

use serde::{Deserialize, Serialize};

use crate::bus::SBus;
use crate::env::TickEnv;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedState {
    pub color: String,
    pub value: i64,
}

pub fn tick_led(state: &mut LedState, sbuses: &[SBus], env: &TickEnv) {
    let mut value = 0i64;
    for (i, bus) in sbuses.iter().enumerate() {
        value = value.max(env.sbus_net_value(bus.value, i));
    }
    state.value = value.clamp(0, 255);
}
