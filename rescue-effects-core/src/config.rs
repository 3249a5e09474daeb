//! Pack configuration.
//!
//! Every duration and threshold the pack uses, loadable from JSON. Missing
//! fields fall back to the defaults, so a config file only needs the values it
//! overrides.
//!
//! ```json
//! {
//!   "immunity_duration_secs": 30,
//!   "level_up": { "poll_interval_ms": 20 }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::EffectError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Delay before a request is retried while the game is not ready.
    pub retry_delay_secs: u64,
    /// The game accepts effects while the status byte is below this value.
    pub ready_threshold: u8,
    pub immunity_duration_secs: u64,
    /// Turns written to the unseen force countdown.
    pub unseen_force_turns: u16,
    pub level_up: LevelUpTiming,
}

/// Polling parameters for the level-up menu driver.
///
/// The values need calibrating against the game's real frame and turn
/// cadence; the defaults are one frame per poll and roughly half a second
/// per menu step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelUpTiming {
    pub poll_interval_ms: u64,
    /// How long one menu step may take to show up in memory.
    pub step_timeout_ms: u64,
    /// How long to wait for the player's turn before giving up.
    pub turn_timeout_ms: u64,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            retry_delay_secs: 5,
            ready_threshold: 0x80,
            immunity_duration_secs: 45,
            unseen_force_turns: 150,
            level_up: LevelUpTiming::default(),
        }
    }
}

impl Default for LevelUpTiming {
    fn default() -> Self {
        Self {
            poll_interval_ms: 17,
            step_timeout_ms: 500,
            turn_timeout_ms: 3000,
        }
    }
}

impl PackConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn immunity_duration(&self) -> Duration {
        Duration::from_secs(self.immunity_duration_secs)
    }

    /// Reject values that would make the pack spin or never expire effects.
    pub fn validate(&self) -> Result<(), EffectError> {
        if self.retry_delay_secs == 0 {
            return Err(EffectError::Config("retry_delay_secs must be non-zero".into()));
        }
        if self.ready_threshold == 0 {
            return Err(EffectError::Config(
                "ready_threshold of 0 never lets the game be ready".into(),
            ));
        }
        if self.immunity_duration_secs == 0 {
            return Err(EffectError::Config("immunity_duration_secs must be non-zero".into()));
        }
        if self.level_up.poll_interval_ms == 0 {
            return Err(EffectError::Config("level_up.poll_interval_ms must be non-zero".into()));
        }
        if self.level_up.step_timeout_ms < self.level_up.poll_interval_ms {
            return Err(EffectError::Config(
                "level_up.step_timeout_ms must be at least one poll interval".into(),
            ));
        }
        if self.level_up.turn_timeout_ms == 0 {
            return Err(EffectError::Config("level_up.turn_timeout_ms must be non-zero".into()));
        }
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: PackConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

impl LevelUpTiming {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }
}
