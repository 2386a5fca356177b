//! Reads a `.bbd` board document and replays it onto a fresh `Board`,
//! and the inverse: walks a live `Board` back out into a document.
//!
//! A single entry point returning `anyhow::Result`, `.context(..)` at
//! every fallible boundary, and `tracing` narration of what was found.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use breadboard_core::{Board, CableLookup};
use breadboard_persistence::{BoardDocument, CableRecord, CablesSection, ComponentRecord, ComponentsSection};

/// The outcome of loading a board document. `non_perfect` is set when one or
/// more component or cable adds were dropped because they violated a
/// placement rule — the board still loads, just not exactly as the
/// document described.
#[derive(Debug)]
pub struct LoadReport {
    pub board: Board,
    pub non_perfect: bool,
}

pub fn load(path: &Path) -> Result<LoadReport> {
    let document = BoardDocument::from_file(path)
        .with_context(|| format!("failed to read board document: {:?}", path))?;

    info!(width = document.width, height = document.height, "loading board");

    let mut board = Board::new(document.width, document.height);
    let mut non_perfect = false;

    for record in &document.components.items {
        let component = record.to_component();
        if !board.add_component(component) {
            warn!("dropped a component that violated placement rules");
            non_perfect = true;
        } else {
            debug!("placed component");
        }
    }

    // Bridges must replay before solders: net resolution and the S/X-mixing
    // check depend on which cables already exist, regardless of the order
    // they were serialized in.
    let (bridges, solders): (Vec<_>, Vec<_>) = document
        .cables
        .items
        .iter()
        .partition(|record| matches!(record, CableRecord::Bridge(_)));

    for record in bridges.into_iter().chain(solders) {
        let cable = record.to_cable();
        if !board.add_cable(cable) {
            warn!("dropped a cable that violated wiring rules");
            non_perfect = true;
        } else {
            debug!("wired cable");
        }
    }

    if non_perfect {
        warn!("board loaded, but was not a perfect replay of the document");
    }

    Ok(LoadReport { board, non_perfect })
}

pub fn save(path: &Path, board: &Board) -> Result<()> {
    let components = board
        .components()
        .iter()
        .map(ComponentRecord::from_component)
        .collect();

    let mut cables: Vec<CableRecord> = board.bridges().iter().map(CableRecord::from_cable).collect();
    cables.extend(board.solders().iter().map(CableRecord::from_cable));

    let document = BoardDocument {
        width: board.width,
        height: board.height,
        components: ComponentsSection { items: components },
        cables: CablesSection { items: cables },
    };

    document
        .to_file(path)
        .with_context(|| format!("failed to write board document: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use breadboard_core::components::PressButtonState;
    use breadboard_core::{Cable, CableKind, Component, ComponentKind, Direction, Position, SBus};
    use breadboard_persistence::CableFields;

    #[test]
    fn cables_replay_bridges_first_regardless_of_document_order() {
        // A document listing a solder before the bridges that cross it: load
        // must still place bridges before solders, not document order.
        let document = BoardDocument {
            width: 2,
            height: 2,
            components: ComponentsSection { items: vec![] },
            cables: CablesSection {
                items: vec![
                    CableRecord::Solder(CableFields {
                        ax: 0,
                        ay: 0,
                        bx: 1,
                        by: 0,
                    }),
                    CableRecord::Solder(CableFields {
                        ax: 0,
                        ay: 1,
                        bx: 1,
                        by: 1,
                    }),
                    CableRecord::Bridge(CableFields {
                        ax: 0,
                        ay: 0,
                        bx: 0,
                        by: 1,
                    }),
                ],
            },
        };

        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("breadboard-loader-order-test-{nonce}.bbd"));
        document.to_file(&path).unwrap();

        let report = load(&path).unwrap();
        assert!(!report.non_perfect);
        assert_eq!(report.board.solders().len(), 2);
        assert_eq!(report.board.bridges().len(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn save_then_load_preserves_components_and_cables() {
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

        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("breadboard-loader-test-{nonce}.bbd"));
        save(&path, &board).unwrap();

        let report = load(&path).unwrap();
        assert!(!report.non_perfect);
        assert_eq!(report.board.components().len(), 2);

        let _ = std::fs::remove_file(&path);
    }
}
