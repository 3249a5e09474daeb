//! Crowd-interaction effect pack for *Pokemon Mystery Dungeon: Red Rescue Team* (GBA).
//!
//! Viewers trigger named effects ("give money", "floor up", "swap leader");
//! the pack turns each one into a small set of reads, writes and freezes on
//! the running game's memory through a host-supplied connector.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rescue_effects_core::{EffectPack, EffectRequest, LogMessenger, PackConfig, SimulatedWram};
//!
//! let pack = EffectPack::new(
//!     Arc::new(SimulatedWram::new()),
//!     Arc::new(LogMessenger),
//!     PackConfig::default(),
//! );
//! let response = pack.start_effect(&EffectRequest::new(1, "viewer", "givemoney_250"));
//! ```

/// Static effect list and host slider definitions.
pub mod catalog;

/// Effect code parsing and validation.
pub mod command;

/// Durations and thresholds.
pub mod config;

/// Leader, weather and level-up routines.
pub mod effects;

/// Error types.
pub mod error;

/// Request/response protocol, bid wars, timers and shutdown.
pub mod host;

/// Memory connector trait, memory map and simulated work RAM.
pub mod memory;

/// Viewer notifications.
pub mod messaging;

/// The effect dispatcher.
pub mod pack;

pub use catalog::PackManifest;
pub use command::EffectCommand;
pub use config::PackConfig;
pub use error::{EffectError, EffectResult};
pub use host::{EffectRequest, EffectResponse, EffectStatus};
pub use memory::{MemoryConnector, SimulatedWram};
pub use messaging::{LogMessenger, Messenger, RecordingMessenger};
pub use pack::EffectPack;
