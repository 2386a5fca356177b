use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use breadboard_core::components::PressButtonState;
use breadboard_core::{Board, CableKind, Cable, Component, ComponentKind, Direction, Position, SBus};

fn temp_bbd_path(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push("breadboard-cli-tests");
    let _ = std::fs::create_dir_all(&dir);
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.join(format!("{prefix}-{nonce}.bbd"))
}

fn press_button_and_led_board() -> Board {
    let mut board = Board::new(3, 1);

    let mut button = Component::new(
        Position::new(0, 0),
        1,
        1,
        ComponentKind::PressButton(PressButtonState { state: true }),
    );
    button.sbuses = vec![SBus::new("s0", Position::new(0, 0), Direction::Right)];
    assert!(board.add_component(button));

    let mut led = Component::new(Position::new(2, 0), 1, 1, ComponentKind::Led(Default::default()));
    led.sbuses = vec![SBus::new("s0", Position::new(0, 0), Direction::Left)];
    assert!(board.add_component(led));

    assert!(board.add_cable(Cable::new(
        Position::new(0, 0),
        Position::new(1, 0),
        CableKind::Solder,
    )));
    assert!(board.add_cable(Cable::new(
        Position::new(1, 0),
        Position::new(2, 0),
        CableKind::Solder,
    )));

    board
}

#[test]
fn test_cli_runs_a_board_to_completion() {
    let path = temp_bbd_path("wired");
    let board = press_button_and_led_board();
    breadboard_loader::save(&path, &board).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_breadboard"))
        .args(["--board", path.to_str().unwrap(), "--ticks", "5"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Executed"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_cli_exits_non_zero_on_fatal_mcu_error() {
    use breadboard_core::McuState;
    use breadboard_core::Register;

    let mut board = Board::new(1, 1);
    let mcu = Component::new(
        Position::new(0, 0),
        1,
        1,
        ComponentKind::MicroController(McuState::new(
            "mov 0 acc\ndiv acc\n",
            vec![Register::new("acc", 0)],
        )),
    );
    assert!(board.add_component(mcu));

    let path = temp_bbd_path("fatal");
    breadboard_loader::save(&path, &board).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_breadboard"))
        .args(["--board", path.to_str().unwrap(), "--ticks", "5"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("division by zero"));

    let _ = std::fs::remove_file(&path);
}
