//! Microcontroller compile step: source text to a tokenized program plus a
//! label table.

use std::collections::HashSet;

use crate::bus::{SBus, XBus};
use crate::error::{Fault, SimResult, SimulationError};
use crate::mcu::McuState;

fn is_valid_label(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn compile(mcu: &mut McuState, sbuses: &[SBus], xbuses: &[XBus]) -> SimResult<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for addr in mcu
        .registers
        .iter()
        .map(|r| r.address.as_str())
        .chain(sbuses.iter().map(|b| b.address.as_str()))
        .chain(xbuses.iter().map(|b| b.address.as_str()))
    {
        if !seen.insert(addr) {
            return Err(SimulationError::Peripheral(Fault::DuplicateAddress(
                addr.to_string(),
            )));
        }
    }

    mcu.compiled.clear();
    mcu.labels.clear();
    mcu.source_lines.clear();

    for (idx, raw_line) in mcu.source.split('\n').enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim_matches(|c: char| c == ' ' || c == '\t' || c == '\r');
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if trimmed.ends_with(':') && !trimmed.contains(char::is_whitespace) {
            let name = &trimmed[..trimmed.len() - 1];
            if !is_valid_label(name) {
                return Err(SimulationError::at_line(
                    line_no,
                    Fault::InvalidLabel(name.to_string()),
                ));
            }
            if seen.contains(name) || mcu.labels.contains_key(name) {
                return Err(SimulationError::at_line(
                    line_no,
                    Fault::LabelCollision(name.to_string()),
                ));
            }
            mcu.labels.insert(name.to_string(), mcu.compiled.len());
            continue;
        }

        let tokens: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();
        mcu.compiled.push(tokens);
        mcu.source_lines.push(line_no);
    }

    mcu.running = !mcu.compiled.is_empty();
    mcu.line = 0;
    mcu.sleep_cycles = 0;
    mcu.ops = 0;
    mcu.error = None;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, Position};
    use crate::register::Register;

    fn mcu(source: &str) -> McuState {
        McuState::new(source, vec![Register::new("acc", 0)])
    }

    #[test]
    fn compiles_instructions_and_skips_comments_and_blanks() {
        let mut m = mcu("# header\n\nmov 1 acc\nadd 2\n");
        compile(&mut m, &[], &[]).unwrap();
        assert_eq!(m.compiled.len(), 2);
        assert_eq!(m.source_lines, vec![3, 4]);
    }

    #[test]
    fn records_label_index() {
        let mut m = mcu("loop:\nadd 1\njmp loop\n");
        compile(&mut m, &[], &[]).unwrap();
        assert_eq!(m.labels.get("loop"), Some(&0));
        assert_eq!(m.compiled.len(), 2);
    }

    #[test]
    fn duplicate_address_is_fatal() {
        let mut m = mcu("mov 1 acc\n");
        let sbuses = vec![SBus::new("acc", Position::new(0, 0), Direction::Right)];
        let err = compile(&mut m, &sbuses, &[]).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Peripheral(Fault::DuplicateAddress(_))
        ));
    }

    #[test]
    fn label_colliding_with_register_is_fatal() {
        let mut m = mcu("acc:\nadd 1\n");
        let err = compile(&mut m, &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Instruction {
                line: 1,
                fault: Fault::LabelCollision(_)
            }
        ));
        assert_eq!(err.to_string(), "Line 1 - label 'acc' collides with a register or bus address");
    }

    #[test]
    fn invalid_label_name_is_fatal() {
        let mut m = mcu("1bad:\nadd 1\n");
        let err = compile(&mut m, &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Instruction {
                line: 1,
                fault: Fault::InvalidLabel(_)
            }
        ));
    }

    #[test]
    fn empty_program_does_not_run() {
        let mut m = mcu("# nothing here\n");
        compile(&mut m, &[], &[]).unwrap();
        assert!(!m.running);
    }
}
