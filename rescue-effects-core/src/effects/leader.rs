//! Party leader swapping.
//!
//! Control, camera and partner ownership are each mirrored in three places.
//! Swapping writes one byte of the leader profile to every address of the
//! matching group.

use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;

use crate::error::EffectError;
use crate::memory::MemoryConnector;

/// Which party member is in control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leader {
    First,
    Second,
}

/// Ownership / control bytes.
pub const OWNERSHIP_ADDRESSES: [u32; 3] = [0x0200_3BAC, 0x0203_B450, 0x0201_BCEC];
/// Partner flag bytes.
pub const PARTNER_ADDRESSES: [u32; 3] = [0x0200_4197, 0x0203_415A, 0x0203_81FA];
/// Camera target bytes.
pub const CAMERA_ADDRESSES: [u32; 3] = [0x0200_439F, 0x0203_13A2, 0x0203_825E];

impl Leader {
    pub const ALL: [Leader; 2] = [Leader::First, Leader::Second];

    pub fn key(self) -> &'static str {
        match self {
            Leader::First => "first",
            Leader::Second => "second",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Leader::First => "First",
            Leader::Second => "Second",
        }
    }

    /// Ownership, partner and camera values.
    pub fn profile(self) -> [u8; 3] {
        match self {
            Leader::First => [0x10, 0x01, 0x00],
            Leader::Second => [0x84, 0x00, 0x01],
        }
    }

    /// Every (address, value) pair a swap to this leader writes.
    pub fn writes(self) -> impl Iterator<Item = (u32, u8)> {
        let [owner, partner, camera] = self.profile();
        OWNERSHIP_ADDRESSES
            .into_iter()
            .map(move |a| (a, owner))
            .chain(PARTNER_ADDRESSES.into_iter().map(move |a| (a, partner)))
            .chain(CAMERA_ADDRESSES.into_iter().map(move |a| (a, camera)))
    }

    /// Write all nine leader bytes.
    ///
    /// Does nothing useful while the party has a single member
    /// (e.g. Purity Forest).
    pub fn apply(self, memory: &dyn MemoryConnector) -> Result<()> {
        for (address, value) in self.writes() {
            memory
                .write8(address, value)
                .with_context(|| format!("set leader {} at 0x{:08X}", self.key(), address))?;
        }
        log::debug!("Leader set to {}", self.key());
        Ok(())
    }
}

impl FromStr for Leader {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Leader::ALL
            .into_iter()
            .find(|l| l.key() == s)
            .ok_or_else(|| EffectError::UnknownVariant {
                effect: "leader",
                key: s.to_string(),
            })
    }
}

impl fmt::Display for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
