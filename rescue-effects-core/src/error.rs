//! Effect Error Handling
//!
//! Error types for the effect pack using `thiserror`.
//!
//! # Error Categories
//! - **Validation errors**: quantity or variant parameters that fail to parse
//! - **Readiness errors**: the game is in a state where mutation is unsafe
//! - **Memory errors**: the connector failed to read, write or freeze
//! - **Lifecycle errors**: cancellation and step timeouts in long-running effects

use std::time::Duration;
use thiserror::Error;

/// Effect pack error types.
#[derive(Error, Debug)]
pub enum EffectError {
    /// Quantity parameter is not an integer in the effect's slider range.
    #[error("Invalid {effect} quantity '{raw}' (must be {min}-{max}).")]
    InvalidQuantity {
        effect: &'static str,
        raw: String,
        min: u32,
        max: u32,
    },

    /// Variant key does not name a known leader or weather.
    #[error("Unknown {effect} option '{key}'.")]
    UnknownVariant { effect: &'static str, key: String },

    /// Effect needs a sub-parameter and none was supplied.
    #[error("Missing parameter for {effect}.")]
    MissingParameter { effect: &'static str },

    /// Base code is not handled by this pack.
    #[error("Unknown effect code '{0}'")]
    UnknownCode(String),

    /// Readiness byte is at or above the threshold.
    #[error("Game not ready (status byte 0x{status:02X})")]
    NotReady { status: u8 },

    /// A timed effect of the same kind is still running.
    #[error("{effect} is already active ({seconds_left}s left).")]
    AlreadyActive {
        effect: &'static str,
        seconds_left: u64,
    },

    /// The pack is shutting down.
    #[error("Effect cancelled: pack is shutting down.")]
    Cancelled,

    /// A polled step never reached its expected state.
    #[error("Timed out after {waited:?} waiting for {step}.")]
    Timeout { step: &'static str, waited: Duration },

    /// Memory connector failure.
    #[error("Memory access failed: {0:#}")]
    Memory(#[from] anyhow::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EffectError {
    /// Whether this error came from parameter validation.
    ///
    /// Validation failures never touch memory.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuantity { .. } | Self::UnknownVariant { .. } | Self::MissingParameter { .. }
        )
    }
}

pub type EffectResult<T> = std::result::Result<T, EffectError>;
