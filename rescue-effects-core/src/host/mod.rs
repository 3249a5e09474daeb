//! Host Request Protocol
//!
//! Types exchanged with the crowd-interaction host, plus the host-side
//! mechanisms the pack leans on.
//!
//! # Overview
//!
//! The host sends an [`EffectRequest`] for every viewer purchase and expects an
//! [`EffectResponse`] back:
//!
//! - `Success` - the effect ran
//! - `FailTemporary` - the effect could not run now; the host may refund or retry
//! - `FailPermanent` - the effect will never run (e.g. the pack is shutting down)
//! - `Delayed(d)` - the game is busy; resend the same request after `d`
//! - `Finished` - a timed effect has expired
//!
//! Unknown codes get no response at all.
//!
//! # Mechanisms
//!
//! - [`bid_war`]: exclusive choices decided by viewer bids
//! - [`timers`]: deadlines for timed effects, driven by [`crate::EffectPack::tick`]
//! - [`cancel`]: shutdown signal observed by long-running effects

pub mod bid_war;
pub mod cancel;
pub mod timers;

use serde::Serialize;
use std::time::Duration;

pub use bid_war::{BidAction, BidOutcome, BidWar, LocalBidWar};
pub use cancel::CancellationToken;
pub use timers::{TimedEffect, TimedEffects, TimedState};

/// One viewer-triggered effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectRequest {
    pub id: u64,
    /// Display name of the viewer who triggered the effect.
    pub viewer: String,
    /// Base code plus `_`-separated parameters, e.g. `givemoney_250`.
    pub code: String,
    /// Bid weight; only bid wars look at it.
    pub bid: u64,
}

impl EffectRequest {
    pub fn new(id: u64, viewer: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id,
            viewer: viewer.into(),
            code: code.into(),
            bid: 1,
        }
    }

    pub fn with_bid(mut self, bid: u64) -> Self {
        self.bid = bid;
        self
    }

    pub fn base_code(&self) -> &str {
        crate::command::base_code(&self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EffectStatus {
    Success,
    FailTemporary,
    FailPermanent,
    Delayed(Duration),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectResponse {
    pub id: u64,
    pub status: EffectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Set for timed effects that just started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<Duration>,
}

impl EffectResponse {
    pub fn new(id: u64, status: EffectStatus) -> Self {
        Self {
            id,
            status,
            message: None,
            time_remaining: None,
        }
    }

    pub fn success(id: u64) -> Self {
        Self::new(id, EffectStatus::Success)
    }

    pub fn fail_temporary(id: u64, message: impl Into<String>) -> Self {
        Self::new(id, EffectStatus::FailTemporary).with_message(message)
    }

    pub fn fail_permanent(id: u64, message: impl Into<String>) -> Self {
        Self::new(id, EffectStatus::FailPermanent).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_time_remaining(mut self, remaining: Duration) -> Self {
        self.time_remaining = Some(remaining);
        self
    }
}

/// Answer to a host data request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataResponse {
    pub key: String,
    pub value: Option<u32>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
