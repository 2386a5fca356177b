//! The `.bbd` board document: a structured, hierarchical on-disk
//! representation of a board's components and cables, independent of the
//! in-memory `Board`'s layout. The data shape ("hierarchical records with
//! attributes and child lists") is XML's natural encoding, so this crate
//! reaches for `quick-xml`'s serde integration.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use breadboard_core::{
    Cable, CableKind, Component, ComponentKind, Direction, Position, Register, SBus, XBus,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "Board")]
pub struct BoardDocument {
    #[serde(rename = "@Width")]
    pub width: i32,
    #[serde(rename = "@Height")]
    pub height: i32,
    pub components: ComponentsSection,
    pub cables: CablesSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentsSection {
    #[serde(rename = "$value", default)]
    pub items: Vec<ComponentRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CablesSection {
    #[serde(rename = "$value", default)]
    pub items: Vec<CableRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusRecord {
    #[serde(rename = "@Address")]
    pub address: String,
    #[serde(rename = "@X")]
    pub x: i32,
    #[serde(rename = "@Y")]
    pub y: i32,
    #[serde(rename = "@Direction")]
    pub direction: DirectionRecord,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum DirectionRecord {
    Up,
    Down,
    Left,
    Right,
}

impl From<Direction> for DirectionRecord {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Up => DirectionRecord::Up,
            Direction::Down => DirectionRecord::Down,
            Direction::Left => DirectionRecord::Left,
            Direction::Right => DirectionRecord::Right,
        }
    }
}

impl From<DirectionRecord> for Direction {
    fn from(d: DirectionRecord) -> Self {
        match d {
            DirectionRecord::Up => Direction::Up,
            DirectionRecord::Down => Direction::Down,
            DirectionRecord::Left => Direction::Left,
            DirectionRecord::Right => Direction::Right,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRecord {
    #[serde(rename = "@Address")]
    pub address: String,
    #[serde(rename = "@Value")]
    pub value: i64,
}

/// Fields common to every component record: footprint and bus ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentFields {
    #[serde(rename = "@X")]
    pub x: i32,
    #[serde(rename = "@Y")]
    pub y: i32,
    #[serde(rename = "@Width")]
    pub width: i32,
    #[serde(rename = "@Height")]
    pub height: i32,
    #[serde(rename = "SBuses", default)]
    pub sbuses: BusListSection,
    #[serde(rename = "XBuses", default)]
    pub xbuses: BusListSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusListSection {
    #[serde(rename = "Bus", default)]
    pub items: Vec<BusRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedFields {
    #[serde(flatten)]
    pub common: ComponentFields,
    #[serde(rename = "@Color", default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericDisplayFields {
    #[serde(flatten)]
    pub common: ComponentFields,
    #[serde(rename = "@Base")]
    pub base: u32,
    #[serde(rename = "@Min")]
    pub min: i64,
    #[serde(rename = "@Max")]
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDisplayFields {
    #[serde(flatten)]
    pub common: ComponentFields,
    #[serde(rename = "@MaxLen")]
    pub max_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitmapDisplayFields {
    #[serde(flatten)]
    pub common: ComponentFields,
    #[serde(rename = "@PixelWidth")]
    pub pixel_width: i32,
    #[serde(rename = "@PixelHeight")]
    pub pixel_height: i32,
    #[serde(rename = "@DefaultR", default)]
    pub default_r: u8,
    #[serde(rename = "@DefaultG", default)]
    pub default_g: u8,
    #[serde(rename = "@DefaultB", default)]
    pub default_b: u8,
    #[serde(rename = "@InactiveR", default)]
    pub inactive_r: u8,
    #[serde(rename = "@InactiveG", default)]
    pub inactive_g: u8,
    #[serde(rename = "@InactiveB", default)]
    pub inactive_b: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFields {
    #[serde(flatten)]
    pub common: ComponentFields,
    #[serde(rename = "@Capacity")]
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroControllerFields {
    #[serde(flatten)]
    pub common: ComponentFields,
    #[serde(rename = "Registers", default)]
    pub registers: RegisterListSection,
    #[serde(rename = "Source")]
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterListSection {
    #[serde(rename = "Register", default)]
    pub items: Vec<RegisterRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComponentRecord {
    PressButton(ComponentFields),
    ToggleButton(ComponentFields),
    Led(LedFields),
    NumericDisplay(NumericDisplayFields),
    TextDisplay(TextDisplayFields),
    BitmapDisplay(BitmapDisplayFields),
    Memory(MemoryFields),
    MicroController(MicroControllerFields),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CableRecord {
    Solder(CableFields),
    Bridge(CableFields),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CableFields {
    #[serde(rename = "@Ax")]
    pub ax: i32,
    #[serde(rename = "@Ay")]
    pub ay: i32,
    #[serde(rename = "@Bx")]
    pub bx: i32,
    #[serde(rename = "@By")]
    pub by: i32,
}

fn record_to_bus_list(section: &BusListSection) -> Vec<(String, Position, Direction)> {
    section
        .items
        .iter()
        .map(|b| (b.address.clone(), Position::new(b.x, b.y), b.direction.into()))
        .collect()
}

fn sbus_list(section: &BusListSection) -> Vec<SBus> {
    record_to_bus_list(section)
        .into_iter()
        .map(|(address, position, direction)| SBus::new(address, position, direction))
        .collect()
}

fn xbus_list(section: &BusListSection) -> Vec<XBus> {
    record_to_bus_list(section)
        .into_iter()
        .map(|(address, position, direction)| XBus::new(address, position, direction))
        .collect()
}

fn bus_list_record(sbuses: &[SBus]) -> BusListSection {
    BusListSection {
        items: sbuses
            .iter()
            .map(|b| BusRecord {
                address: b.address.clone(),
                x: b.position.x,
                y: b.position.y,
                direction: b.direction.into(),
            })
            .collect(),
    }
}

fn xbus_list_record(xbuses: &[XBus]) -> BusListSection {
    BusListSection {
        items: xbuses
            .iter()
            .map(|b| BusRecord {
                address: b.address.clone(),
                x: b.position.x,
                y: b.position.y,
                direction: b.direction.into(),
            })
            .collect(),
    }
}

impl ComponentRecord {
    /// Builds the live `Component` this record describes. Records are
    /// replayed onto a fresh board, not deserialized directly into it.
    pub fn to_component(&self) -> Component {
        let (common, kind) = match self {
            ComponentRecord::PressButton(c) => (c, ComponentKind::PressButton(Default::default())),
            ComponentRecord::ToggleButton(c) => {
                (c, ComponentKind::ToggleButton(Default::default()))
            }
            ComponentRecord::Led(c) => {
                let kind = ComponentKind::Led(breadboard_core::components::LedState {
                    color: c.color.clone(),
                    value: 0,
                });
                (&c.common, kind)
            }
            ComponentRecord::NumericDisplay(c) => {
                let kind = ComponentKind::NumericDisplay(
                    breadboard_core::components::NumericDisplayState::new(c.base, c.min, c.max),
                );
                (&c.common, kind)
            }
            ComponentRecord::TextDisplay(c) => {
                let kind = ComponentKind::TextDisplay(
                    breadboard_core::components::TextDisplayState::new(c.max_len),
                );
                (&c.common, kind)
            }
            ComponentRecord::BitmapDisplay(c) => {
                let kind = ComponentKind::BitmapDisplay(
                    breadboard_core::components::BitmapDisplayState::new(
                        c.pixel_width,
                        c.pixel_height,
                        breadboard_core::components::displays::Color::rgb(
                            c.default_r,
                            c.default_g,
                            c.default_b,
                        ),
                        breadboard_core::components::displays::Color::rgb(
                            c.inactive_r,
                            c.inactive_g,
                            c.inactive_b,
                        ),
                    ),
                );
                (&c.common, kind)
            }
            ComponentRecord::Memory(c) => {
                let kind = ComponentKind::Memory(breadboard_core::components::MemoryState::new(
                    c.capacity,
                ));
                (&c.common, kind)
            }
            ComponentRecord::MicroController(c) => {
                let registers = c
                    .registers
                    .items
                    .iter()
                    .map(|r| Register::new(r.address.clone(), r.value))
                    .collect();
                let kind =
                    ComponentKind::MicroController(breadboard_core::McuState::new(
                        c.source.clone(),
                        registers,
                    ));
                (&c.common, kind)
            }
        };

        let mut component = Component::new(
            Position::new(common.x, common.y),
            common.width,
            common.height,
            kind,
        );
        component.sbuses = sbus_list(&common.sbuses);
        component.xbuses = xbus_list(&common.xbuses);
        component
    }

    /// The inverse of `to_component`, for saving a live board back out.
    pub fn from_component(component: &Component) -> Self {
        let common = ComponentFields {
            x: component.position.x,
            y: component.position.y,
            width: component.width,
            height: component.height,
            sbuses: bus_list_record(&component.sbuses),
            xbuses: xbus_list_record(&component.xbuses),
        };
        match &component.kind {
            ComponentKind::PressButton(_) => ComponentRecord::PressButton(common),
            ComponentKind::ToggleButton(_) => ComponentRecord::ToggleButton(common),
            ComponentKind::Led(s) => ComponentRecord::Led(LedFields {
                common,
                color: s.color.clone(),
            }),
            ComponentKind::NumericDisplay(s) => ComponentRecord::NumericDisplay(NumericDisplayFields {
                common,
                base: s.base,
                min: s.min,
                max: s.max,
            }),
            ComponentKind::TextDisplay(s) => ComponentRecord::TextDisplay(TextDisplayFields {
                common,
                max_len: s.max_len,
            }),
            ComponentKind::BitmapDisplay(s) => {
                ComponentRecord::BitmapDisplay(BitmapDisplayFields {
                    common,
                    pixel_width: s.width,
                    pixel_height: s.height,
                    default_r: s.default_color.r,
                    default_g: s.default_color.g,
                    default_b: s.default_color.b,
                    inactive_r: s.inactive_color.r,
                    inactive_g: s.inactive_color.g,
                    inactive_b: s.inactive_color.b,
                })
            }
            ComponentKind::Memory(s) => ComponentRecord::Memory(MemoryFields {
                common,
                capacity: s.capacity(),
            }),
            ComponentKind::MicroController(s) => {
                ComponentRecord::MicroController(MicroControllerFields {
                    common,
                    registers: RegisterListSection {
                        items: s
                            .registers
                            .iter()
                            .map(|r| RegisterRecord {
                                address: r.address.clone(),
                                value: r.value,
                            })
                            .collect(),
                    },
                    source: s.source.clone(),
                })
            }
        }
    }
}

impl CableRecord {
    pub fn to_cable(&self) -> Cable {
        match self {
            CableRecord::Solder(f) => Cable::new(
                Position::new(f.ax, f.ay),
                Position::new(f.bx, f.by),
                CableKind::Solder,
            ),
            CableRecord::Bridge(f) => Cable::new(
                Position::new(f.ax, f.ay),
                Position::new(f.bx, f.by),
                CableKind::Bridge,
            ),
        }
    }

    pub fn from_cable(cable: &Cable) -> Self {
        let fields = CableFields {
            ax: cable.a.x,
            ay: cable.a.y,
            bx: cable.b.x,
            by: cable.b.y,
        };
        match cable.kind {
            CableKind::Solder => CableRecord::Solder(fields),
            CableKind::Bridge => CableRecord::Bridge(fields),
        }
    }
}

impl BoardDocument {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref())
            .with_context(|| format!("failed to open board document {:?}", path.as_ref()))?;
        quick_xml::de::from_reader(std::io::BufReader::new(f))
            .context("failed to parse board document")
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let xml = quick_xml::se::to_string(self).context("failed to serialize board document")?;
        std::fs::write(path.as_ref(), xml)
            .with_context(|| format!("failed to write board document {:?}", path.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breadboard_core::components::PressButtonState;

    #[test]
    fn press_button_round_trips_through_a_record() {
        let mut component = Component::new(
            Position::new(1, 2),
            1,
            1,
            ComponentKind::PressButton(PressButtonState { state: true }),
        );
        component.sbuses = vec![SBus::new("s0", Position::new(0, 0), Direction::Right)];

        let record = ComponentRecord::from_component(&component);
        let rebuilt = record.to_component();

        assert_eq!(rebuilt.position, component.position);
        assert_eq!(rebuilt.sbuses.len(), 1);
        assert_eq!(rebuilt.sbuses[0].address, "s0");
    }

    #[test]
    fn bitmap_display_colors_round_trip_through_a_record() {
        use breadboard_core::components::displays::Color;
        use breadboard_core::components::BitmapDisplayState;

        let component = Component::new(
            Position::new(0, 0),
            2,
            2,
            ComponentKind::BitmapDisplay(BitmapDisplayState::new(
                2,
                2,
                Color::rgb(10, 20, 30),
                Color::rgb(40, 50, 60),
            )),
        );

        let record = ComponentRecord::from_component(&component);
        let rebuilt = record.to_component();

        let ComponentKind::BitmapDisplay(state) = rebuilt.kind else {
            panic!("expected bitmap display");
        };
        assert_eq!(state.default_color, Color::rgb(10, 20, 30));
        assert_eq!(state.inactive_color, Color::rgb(40, 50, 60));
    }

    #[test]
    fn solder_cable_round_trips_through_a_record() {
        let cable = Cable::new(Position::new(0, 0), Position::new(1, 0), CableKind::Solder);
        let record = CableRecord::from_cable(&cable);
        let rebuilt = record.to_cable();
        assert_eq!(rebuilt.a, cable.a);
        assert_eq!(rebuilt.b, cable.b);
        assert_eq!(rebuilt.kind, CableKind::Solder);
    }
}
