//! Red Rescue Team memory map.
//!
//! Addresses are absolute GBA bus addresses into combined work RAM.
//! Other known locations that no effect uses yet:
//! - level: `0x02004199`
//! - move PP: `0x020042AC`, `0x020042B4`, `0x020042BC`, `0x020042C4`
//! - player / partner / partner shadow visibility: `0x020262AA`, `0x020262BA`, `0x020262C6` (-1 hides)
//! - player / partner screen offset: `0x020262B0`, `0x020262C0` (around -60 moves off screen)
//! - next move direction: `0x020041D6`

use serde::Serialize;
use std::fmt;

/// Native width of a memory field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    Byte,
    Half,
    Word,
}

impl Width {
    pub fn bytes(self) -> u32 {
        match self {
            Width::Byte => 1,
            Width::Half => 2,
            Width::Word => 4,
        }
    }

    pub fn bits(self) -> u32 {
        self.bytes() * 8
    }
}

/// A fixed field in the game's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryAddress {
    pub address: u32,
    pub width: Width,
    pub meaning: &'static str,
}

impl MemoryAddress {
    pub const fn new(address: u32, width: Width, meaning: &'static str) -> Self {
        Self {
            address,
            width,
            meaning,
        }
    }
}

impl fmt::Display for MemoryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ 0x{:08X} ({}-bit)", self.meaning, self.address, self.width.bits())
    }
}

/// Readiness status byte; the game accepts effects while it is below
/// [`crate::config::PackConfig::ready_threshold`].
pub const STATUS: MemoryAddress = MemoryAddress::new(0x0000_00B1, Width::Byte, "status");

pub const FLOOR: MemoryAddress = MemoryAddress::new(0x0200_4139, Width::Byte, "floor");
pub const MONEY: MemoryAddress = MemoryAddress::new(0x0203_8C08, Width::Word, "money");
/// Turns left until the unseen force (wind) appears on the current floor.
pub const UNSEEN_FORCE: MemoryAddress =
    MemoryAddress::new(0x0200_415A, Width::Half, "unseen force countdown");
pub const EXPERIENCE: MemoryAddress = MemoryAddress::new(0x0200_41A8, Width::Word, "experience");
pub const CURRENT_HP: MemoryAddress = MemoryAddress::new(0x0200_419E, Width::Byte, "current hp");
pub const MAX_HP: MemoryAddress = MemoryAddress::new(0x0200_41A0, Width::Word, "max hp");
pub const DIRECTION: MemoryAddress = MemoryAddress::new(0x0201_737C, Width::Byte, "facing direction");
pub const INPUT: MemoryAddress = MemoryAddress::new(0x0202_5638, Width::Half, "player input");
pub const HELD_ITEM: MemoryAddress = MemoryAddress::new(0x0200_41F2, Width::Half, "held item");
/// Non-zero while the player may act and the turn can progress.
pub const CAN_GO: MemoryAddress = MemoryAddress::new(0x0200_41D4, Width::Byte, "turn ready");
/// Menu open button.
pub const MENU_INPUT_1: MemoryAddress = MemoryAddress::new(0x0202_563E, Width::Half, "menu input");
/// Menu A button and left/right movement.
pub const MENU_INPUT_2: MemoryAddress =
    MemoryAddress::new(0x0202_563A, Width::Half, "menu selection input");
pub const MENU_LOCATION: MemoryAddress =
    MemoryAddress::new(0x0202_EE28, Width::Half, "menu location");
/// First of eight weather flag bytes.
pub const WEATHER_BASE: MemoryAddress = MemoryAddress::new(0x0201_1D64, Width::Byte, "weather flags");
pub const WEATHER_FLAG_COUNT: u32 = 8;

/// Limits the game itself enforces on these fields.
pub const FLOOR_RANGE: (u8, u8) = (0, 99);
pub const MONEY_RANGE: (u32, u32) = (0, 9999);
pub const MAX_HP_RANGE: (u32, u32) = (0, 999);

/// Fields served to host data requests, by key.
pub const DATA_FIELDS: &[(&str, MemoryAddress)] = &[
    ("floor", FLOOR),
    ("money", MONEY),
    ("current_hp", CURRENT_HP),
    ("max_hp", MAX_HP),
    ("experience", EXPERIENCE),
    ("held_item", HELD_ITEM),
];
