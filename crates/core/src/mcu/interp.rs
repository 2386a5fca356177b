//! The microcontroller interpreter: argument resolution, the instruction
//! set, `mov` destination semantics, and the per-tick execution contract.
//!
//! An attempted instruction yields one of three outcomes instead of a
//! threaded sentinel boolean: it stalls (operand not ready this tick),
//! advances (falls through or takes a validated jump), or faults fatally.

use crate::bus::{SBus, XBus, XState};
use crate::env::TickEnv;
use crate::error::Fault;
use crate::mcu::McuState;

pub(crate) enum StepOutcome {
    Stall,
    Advance,
    Jump(i64),
}

pub(crate) struct ExecCtx<'a> {
    pub mcu: &'a mut McuState,
    pub sbuses: &'a mut [SBus],
    pub xbuses: &'a mut [XBus],
    pub env: &'a TickEnv<'a>,
}

impl<'a> ExecCtx<'a> {
    fn acc(&self) -> Result<i64, Fault> {
        self.mcu
            .registers
            .iter()
            .find(|r| r.address == crate::register::ACCUMULATOR)
            .map(|r| r.value)
            .ok_or_else(|| Fault::BadOperand(crate::register::ACCUMULATOR.to_string()))
    }

    fn set_acc(&mut self, value: i64) {
        if let Some(r) = self
            .mcu
            .registers
            .iter_mut()
            .find(|r| r.address == crate::register::ACCUMULATOR)
        {
            r.value = value;
        }
    }

    /// Argument resolution order.
    fn resolve(&mut self, arg: &str) -> Result<Option<i64>, Fault> {
        if let Some(r) = self.mcu.registers.iter().find(|r| r.address == arg) {
            return Ok(Some(r.value));
        }

        if let Some(idx) = self.sbuses.iter().position(|b| b.address == arg) {
            let own = self.sbuses[idx].value;
            return Ok(Some(self.env.sbus_net_value(own, idx)));
        }

        if let Some(idx) = self.xbuses.iter().position(|b| b.address == arg) {
            return Ok(self.resolve_xbus_read(idx));
        }

        if arg == "%" {
            return Ok(Some(self.mcu.line as i64));
        }

        if let Some(&idx) = self.mcu.labels.get(arg) {
            return Ok(Some(idx as i64));
        }

        if arg.len() == 3 && arg.starts_with('\'') && arg.ends_with('\'') {
            return Ok(Some(arg.chars().nth(1).unwrap() as i64));
        }

        if let Some(last) = arg.chars().last() {
            if arg.len() > 1 && "bodx".contains(last) {
                let body: String = arg[..arg.len() - 1].chars().filter(|c| *c != '_').collect();
                let radix = match last {
                    'b' => 2,
                    'o' => 8,
                    'd' => 10,
                    'x' => 16,
                    _ => unreachable!(),
                };
                if let Ok(v) = i64::from_str_radix(&body, radix) {
                    return Ok(Some(v));
                }
            }
        }

        let cleaned: String = arg.chars().filter(|c| *c != '_').collect();
        if let Ok(v) = cleaned.parse::<i64>() {
            return Ok(Some(v));
        }

        Err(Fault::BadOperand(arg.to_string()))
    }

    fn resolve_xbus_read(&mut self, idx: usize) -> Option<i64> {
        match self.xbuses[idx].state {
            XState::Idle => {
                self.xbuses[idx].state = XState::Reading;
                None
            }
            XState::ReadComplete => {
                let v = self.xbuses[idx].value;
                self.xbuses[idx].state = XState::Idle;
                Some(v)
            }
            _ => None,
        }
    }

    /// `mov` destination semantics.
    fn write_destination(&mut self, dest: &str, value: i64) -> Result<StepOutcome, Fault> {
        if let Some(r) = self.mcu.registers.iter_mut().find(|r| r.address == dest) {
            r.value = value;
            return Ok(StepOutcome::Advance);
        }
        if let Some(idx) = self.sbuses.iter().position(|b| b.address == dest) {
            self.sbuses[idx].write(value);
            return Ok(StepOutcome::Advance);
        }
        if let Some(idx) = self.xbuses.iter().position(|b| b.address == dest) {
            return Ok(self.write_xbus_destination(idx, value));
        }
        Err(Fault::BadOperand(dest.to_string()))
    }

    fn write_xbus_destination(&mut self, idx: usize, value: i64) -> StepOutcome {
        match self.xbuses[idx].state {
            XState::Idle => {
                self.xbuses[idx].value = value;
                self.xbuses[idx].state = XState::Writing;
                StepOutcome::Stall
            }
            XState::WriteComplete => {
                self.xbuses[idx].state = XState::Idle;
                StepOutcome::Advance
            }
            _ => StepOutcome::Stall,
        }
    }
}

fn expect_arity(mnemonic: &str, args: &[String], expected: usize) -> Result<(), Fault> {
    if args.len() != expected {
        Err(Fault::WrongArity {
            mnemonic: mnemonic.to_string(),
            expected,
            got: args.len(),
        })
    } else {
        Ok(())
    }
}

fn compare_and_jump(
    ctx: &mut ExecCtx,
    cond: fn(i64, i64) -> bool,
    a: &str,
    b: &str,
    l: &str,
) -> Result<StepOutcome, Fault> {
    let Some(av) = ctx.resolve(a)? else {
        return Ok(StepOutcome::Stall);
    };
    let Some(bv) = ctx.resolve(b)? else {
        return Ok(StepOutcome::Stall);
    };
    if cond(av, bv) {
        let Some(target) = ctx.resolve(l)? else {
            return Ok(StepOutcome::Stall);
        };
        Ok(StepOutcome::Jump(target))
    } else {
        Ok(StepOutcome::Advance)
    }
}

/// Executes the single instruction at `tokens`.
pub(crate) fn execute(tokens: &[String], ctx: &mut ExecCtx) -> Result<StepOutcome, Fault> {
    let mnemonic = tokens[0].as_str();
    let args = &tokens[1..];

    match mnemonic {
        "mov" => {
            expect_arity(mnemonic, args, 2)?;
            let Some(v) = ctx.resolve(&args[0])? else {
                return Ok(StepOutcome::Stall);
            };
            ctx.write_destination(&args[1], v)
        }
        "add" | "sub" | "mul" | "div" | "mod" => {
            expect_arity(mnemonic, args, 1)?;
            let Some(v) = ctx.resolve(&args[0])? else {
                return Ok(StepOutcome::Stall);
            };
            let acc = ctx.acc()?;
            let result = match mnemonic {
                "add" => acc.wrapping_add(v),
                "sub" => acc.wrapping_sub(v),
                "mul" => acc.wrapping_mul(v),
                "div" => {
                    if v == 0 {
                        return Err(Fault::DivideByZero);
                    }
                    acc.wrapping_div(v)
                }
                "mod" => {
                    if v == 0 {
                        return Err(Fault::ModuloByZero);
                    }
                    acc.wrapping_rem(v)
                }
                _ => unreachable!(),
            };
            ctx.set_acc(result);
            Ok(StepOutcome::Advance)
        }
        "or" | "and" | "xor" => {
            expect_arity(mnemonic, args, 1)?;
            let Some(v) = ctx.resolve(&args[0])? else {
                return Ok(StepOutcome::Stall);
            };
            let acc = ctx.acc()?;
            let result = match mnemonic {
                "or" => acc | v,
                "and" => acc & v,
                "xor" => acc ^ v,
                _ => unreachable!(),
            };
            ctx.set_acc(result);
            Ok(StepOutcome::Advance)
        }
        "not" => {
            expect_arity(mnemonic, args, 0)?;
            let acc = ctx.acc()?;
            ctx.set_acc(!acc);
            Ok(StepOutcome::Advance)
        }
        "bsl" | "bsr" => {
            expect_arity(mnemonic, args, 1)?;
            let Some(v) = ctx.resolve(&args[0])? else {
                return Ok(StepOutcome::Stall);
            };
            let acc = ctx.acc()?;
            let shift = (v as i32).rem_euclid(64) as u32;
            let result = if mnemonic == "bsl" {
                acc.checked_shl(shift).unwrap_or(0)
            } else {
                acc.checked_shr(shift).unwrap_or(0)
            };
            ctx.set_acc(result);
            Ok(StepOutcome::Advance)
        }
        "slp" => {
            expect_arity(mnemonic, args, 1)?;
            let Some(v) = ctx.resolve(&args[0])? else {
                return Ok(StepOutcome::Stall);
            };
            ctx.mcu.sleep_cycles = v;
            Ok(StepOutcome::Advance)
        }
        "stop" => {
            expect_arity(mnemonic, args, 0)?;
            ctx.mcu.running = false;
            Ok(StepOutcome::Advance)
        }
        "jmp" => {
            expect_arity(mnemonic, args, 1)?;
            let Some(target) = ctx.resolve(&args[0])? else {
                return Ok(StepOutcome::Stall);
            };
            Ok(StepOutcome::Jump(target))
        }
        // `jif` is implemented by dispatching to the three-argument
        // not-equal-zero form with a literal "0".
        "jif" => {
            expect_arity(mnemonic, args, 2)?;
            compare_and_jump(ctx, |a, b| a != b, &args[0], "0", &args[1])
        }
        "jeq" => {
            expect_arity(mnemonic, args, 3)?;
            compare_and_jump(ctx, |a, b| a == b, &args[0], &args[1], &args[2])
        }
        "jne" => {
            expect_arity(mnemonic, args, 3)?;
            compare_and_jump(ctx, |a, b| a != b, &args[0], &args[1], &args[2])
        }
        "jgt" => {
            expect_arity(mnemonic, args, 3)?;
            compare_and_jump(ctx, |a, b| a > b, &args[0], &args[1], &args[2])
        }
        "jlt" => {
            expect_arity(mnemonic, args, 3)?;
            compare_and_jump(ctx, |a, b| a < b, &args[0], &args[1], &args[2])
        }
        "jge" => {
            expect_arity(mnemonic, args, 3)?;
            compare_and_jump(ctx, |a, b| a >= b, &args[0], &args[1], &args[2])
        }
        "jle" => {
            expect_arity(mnemonic, args, 3)?;
            compare_and_jump(ctx, |a, b| a <= b, &args[0], &args[1], &args[2])
        }
        other => Err(Fault::UnknownMnemonic(other.to_string())),
    }
}
