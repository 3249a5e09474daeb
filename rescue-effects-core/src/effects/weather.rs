//! Floor weather override.
//!
//! The game keeps one flag byte per weather kind. Forcing a weather clears
//! all eight flags and sets the one for the requested kind. Only the current
//! floor is affected.

use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;

use crate::error::EffectError;
use crate::memory::addresses::{WEATHER_BASE, WEATHER_FLAG_COUNT};
use crate::memory::MemoryConnector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weather {
    Sunny,
    Sandstorm,
    Cloudy,
    Rain,
    Hail,
    Fog,
    Snow,
}

impl Weather {
    pub const ALL: [Weather; 7] = [
        Weather::Sunny,
        Weather::Sandstorm,
        Weather::Cloudy,
        Weather::Rain,
        Weather::Hail,
        Weather::Fog,
        Weather::Snow,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Sandstorm => "sandstorm",
            Weather::Cloudy => "cloudy",
            Weather::Rain => "rain",
            Weather::Hail => "hail",
            Weather::Fog => "fog",
            Weather::Snow => "snow",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Weather::Sunny => "Sunny",
            Weather::Sandstorm => "Sandstorm",
            Weather::Cloudy => "Cloudy",
            Weather::Rain => "Rain",
            Weather::Hail => "Hail",
            Weather::Fog => "Fog",
            Weather::Snow => "Snow",
        }
    }

    /// Offset of this weather's flag from [`WEATHER_BASE`].
    pub fn offset(self) -> u32 {
        match self {
            Weather::Sunny => 0,
            Weather::Sandstorm => 1,
            Weather::Cloudy => 2,
            Weather::Rain => 3,
            Weather::Hail => 4,
            Weather::Fog => 5,
            Weather::Snow => 6,
        }
    }

    /// Clear every weather flag, then raise this one.
    pub fn apply(self, memory: &dyn MemoryConnector) -> Result<()> {
        for i in 0..WEATHER_FLAG_COUNT {
            let address = WEATHER_BASE.address + i;
            memory
                .write8(address, 0)
                .with_context(|| format!("clear weather flag 0x{:08X}", address))?;
        }
        let address = WEATHER_BASE.address + self.offset();
        memory
            .write8(address, 1)
            .with_context(|| format!("set weather {} at 0x{:08X}", self.key(), address))?;
        log::debug!("Weather forced to {}", self.key());
        Ok(())
    }
}

impl FromStr for Weather {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weather::ALL
            .into_iter()
            .find(|w| w.key() == s)
            .ok_or_else(|| EffectError::UnknownVariant {
                effect: "weather",
                key: s.to_string(),
            })
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
