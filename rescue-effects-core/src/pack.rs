//! Effect Dispatcher
//!
//! [`EffectPack`] receives host requests, validates them into an
//! [`EffectCommand`], checks that the game is in a safe state, and applies the
//! command through the memory connector.
//!
//! # Request flow
//! 1. Parse the code. Unknown codes are dropped without a response; bad
//!    parameters fail before any memory access.
//! 2. Read the status byte. While it is at or above the threshold the request
//!    is answered with `Delayed` and the host resends it later.
//! 3. Run the command and broadcast a one-line message naming the viewer.
//!
//! Timed effects register a deadline; the host calls [`EffectPack::tick`] to
//! expire them, which runs [`EffectPack::stop_effect`] exactly once per effect.

use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::LEADER_GROUP;
use crate::command::EffectCommand;
use crate::config::PackConfig;
use crate::effects::{Leader, LevelUpDriver, Weather};
use crate::error::{EffectError, EffectResult};
use crate::host::{
    BidAction, BidOutcome, BidWar, CancellationToken, DataResponse, EffectRequest, EffectResponse,
    EffectStatus, LocalBidWar, TimedEffect, TimedEffects,
};
use crate::memory::addresses::{
    self, CURRENT_HP, FLOOR, FLOOR_RANGE, MAX_HP, MAX_HP_RANGE, MONEY, MONEY_RANGE, STATUS,
    UNSEEN_FORCE,
};
use crate::memory::{MemoryConnector, Width};
use crate::messaging::Messenger;

/// What a successfully applied command reports back.
struct Applied {
    message: Option<String>,
    time_remaining: Option<std::time::Duration>,
}

impl Applied {
    fn message(text: String) -> Self {
        Self {
            message: Some(text),
            time_remaining: None,
        }
    }

    fn silent() -> Self {
        Self {
            message: None,
            time_remaining: None,
        }
    }
}

pub struct EffectPack {
    memory: Arc<dyn MemoryConnector>,
    messenger: Arc<dyn Messenger>,
    bid_war: Arc<dyn BidWar>,
    timers: TimedEffects,
    cancel: CancellationToken,
    config: PackConfig,
}

impl EffectPack {
    pub fn new(
        memory: Arc<dyn MemoryConnector>,
        messenger: Arc<dyn Messenger>,
        config: PackConfig,
    ) -> Self {
        Self {
            memory,
            messenger,
            bid_war: Arc::new(LocalBidWar::new()),
            timers: TimedEffects::new(),
            cancel: CancellationToken::new(),
            config,
        }
    }

    /// Use the host's bid war instead of the in-process one.
    pub fn with_bid_war(mut self, bid_war: Arc<dyn BidWar>) -> Self {
        self.bid_war = bid_war;
        self
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Token observed by long-running effects; cancelled on shutdown.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn active_timed_effects(&self) -> usize {
        self.timers.len()
    }

    /// Whether the game is in a state where memory can be changed safely.
    pub fn is_ready(&self) -> anyhow::Result<bool> {
        match self.check_ready() {
            Ok(()) => Ok(true),
            Err(EffectError::NotReady { .. }) => Ok(false),
            Err(EffectError::Memory(e)) => Err(e),
            Err(e) => Err(e.into()),
        }
    }

    fn check_ready(&self) -> EffectResult<()> {
        let status = self
            .memory
            .read8(STATUS.address)
            .context("Failed to read status byte")?;
        if status < self.config.ready_threshold {
            Ok(())
        } else {
            Err(EffectError::NotReady { status })
        }
    }

    pub fn start_effect(&self, request: &EffectRequest) -> Option<EffectResponse> {
        self.start_effect_at(request, Instant::now())
    }

    /// Like [`Self::start_effect`] with an explicit clock for timed effects.
    pub fn start_effect_at(&self, request: &EffectRequest, now: Instant) -> Option<EffectResponse> {
        if self.cancel.is_cancelled() {
            return Some(EffectResponse::fail_permanent(
                request.id,
                EffectError::Cancelled.to_string(),
            ));
        }

        let command = match EffectCommand::parse(&request.code) {
            Ok(command) => command,
            Err(EffectError::UnknownCode(code)) => {
                log::debug!("Ignoring unknown effect code '{}' from {}", code, request.viewer);
                return None;
            }
            Err(e) => {
                log::info!("Rejected '{}' from {}: {}", request.code, request.viewer, e);
                return Some(EffectResponse::fail_temporary(request.id, e.to_string()));
            }
        };

        match self.check_ready() {
            Ok(()) => {}
            Err(e @ EffectError::NotReady { .. }) => {
                log::debug!("{}, delaying '{}'", e, request.code);
                return Some(EffectResponse::new(
                    request.id,
                    EffectStatus::Delayed(self.config.retry_delay()),
                ));
            }
            Err(e) => {
                log::warn!("Readiness check failed: {}", e);
                return Some(EffectResponse::fail_temporary(request.id, e.to_string()));
            }
        }

        let response = match self.execute(command, request, now) {
            Ok(applied) => {
                if let Some(message) = &applied.message {
                    self.messenger.send_message(message);
                }
                let mut response = EffectResponse::success(request.id);
                response.message = applied.message;
                response.time_remaining = applied.time_remaining;
                response
            }
            Err(e @ EffectError::Memory(_)) => {
                log::warn!("'{}' from {} failed: {}", request.code, request.viewer, e);
                EffectResponse::fail_temporary(request.id, e.to_string())
            }
            Err(e) => {
                log::info!("'{}' from {} not applied: {}", request.code, request.viewer, e);
                EffectResponse::fail_temporary(request.id, e.to_string())
            }
        };
        Some(response)
    }

    fn execute(
        &self,
        command: EffectCommand,
        request: &EffectRequest,
        now: Instant,
    ) -> EffectResult<Applied> {
        let viewer = request.viewer.as_str();
        let memory = self.memory.as_ref();
        let (floor_min, floor_max) = FLOOR_RANGE;
        let (money_min, money_max) = MONEY_RANGE;
        let (hp_min, hp_max) = MAX_HP_RANGE;

        let applied = match command {
            EffectCommand::FloorUp(n) => {
                memory.range_add8(FLOOR.address, -(n as i64), floor_min, floor_max, false)?;
                Applied::message(format!("{} sent you {} floors up.", viewer, n))
            }
            EffectCommand::FloorDown(n) => {
                memory.range_add8(FLOOR.address, n as i64, floor_min, floor_max, false)?;
                Applied::message(format!("{} sent you {} floors down.", viewer, n))
            }
            EffectCommand::GiveMoney(n) => {
                memory.range_add32(MONEY.address, n as i64, money_min, money_max, false)?;
                Applied::message(format!("{} sent you {} dollars.", viewer, n))
            }
            EffectCommand::StealMoney(n) => {
                memory.range_add32(MONEY.address, -(n as i64), money_min, money_max, false)?;
                Applied::message(format!("{} stole {} dollars from you.", viewer, n))
            }
            EffectCommand::RaiseMaxHp(n) => {
                memory.range_add32(MAX_HP.address, n as i64, hp_min, hp_max, false)?;
                Applied::message(format!("{} raised your health by {}.", viewer, n))
            }
            EffectCommand::DropMaxHp(n) => {
                memory.range_add32(MAX_HP.address, -(n as i64), hp_min, hp_max, false)?;
                Applied::message(format!("{} lowered your health by {}.", viewer, n))
            }
            EffectCommand::UnseenForce => {
                memory
                    .write16(UNSEEN_FORCE.address, self.config.unseen_force_turns)
                    .context("Failed to set unseen force countdown")?;
                Applied::message(format!("{} summoned the unseen force.", viewer))
            }
            EffectCommand::Immunity => return self.start_immunity(request, now),
            EffectCommand::SwapLeader(leader) => return self.swap_leader(leader, request),
            EffectCommand::ChangeWeather(weather) => {
                weather.apply(memory)?;
                Applied::message(weather_message(viewer, weather))
            }
            EffectCommand::LevelUp => {
                LevelUpDriver::new(memory, &self.config.level_up, &self.cancel).run()?;
                Applied::message(format!("{} leveled you up!", viewer))
            }
        };
        Ok(applied)
    }

    /// Pin current HP to its present value until the timer runs out.
    fn start_immunity(&self, request: &EffectRequest, now: Instant) -> EffectResult<Applied> {
        let effect = TimedEffect::new(request.clone(), self.config.immunity_duration());
        let remaining = self
            .timers
            .try_start(effect, now)
            .map_err(|left| EffectError::AlreadyActive {
                effect: "Immunity",
                seconds_left: left.as_secs(),
            })?;

        let hp = match self.pin_current_hp() {
            Ok(hp) => hp,
            Err(e) => {
                self.timers.remove(request.id);
                return Err(e);
            }
        };
        log::info!("Immunity pinned HP at {} for {:?}", hp, remaining);

        Ok(Applied {
            message: Some(format!("{} gave you immunity!", request.viewer)),
            time_remaining: Some(remaining),
        })
    }

    fn pin_current_hp(&self) -> EffectResult<u8> {
        let hp = self
            .memory
            .read8(CURRENT_HP.address)
            .context("Failed to read current HP")?;
        if !self.memory.freeze8(CURRENT_HP.address, hp)? {
            return Err(anyhow::anyhow!("Connector refused to freeze current HP").into());
        }
        Ok(hp)
    }

    fn swap_leader(&self, leader: Leader, request: &EffectRequest) -> EffectResult<Applied> {
        let memory = self.memory.as_ref();
        let action: BidAction<'_> = Box::new(move || leader.apply(memory));
        let outcome = self
            .bid_war
            .resolve(LEADER_GROUP, request, vec![(leader.key(), action)])?;
        match outcome {
            BidOutcome::Won { key } => {
                log::info!("{} swapped the leader to {}", request.viewer, key);
                Ok(Applied::silent())
            }
            BidOutcome::Trailing { key, leader: current } => {
                log::debug!("Bid on {} recorded, {:?} still leads", key, current);
                Ok(Applied::silent())
            }
            BidOutcome::NoCandidate => Err(EffectError::UnknownVariant {
                effect: "leader",
                key: leader.key().to_string(),
            }),
        }
    }

    /// Stop a timed effect. Called once per effect when its timer expires.
    pub fn stop_effect(&self, request: &EffectRequest) -> EffectResponse {
        match request.base_code() {
            "immunity" => {
                if let Err(e) = self.memory.unfreeze(CURRENT_HP.address) {
                    log::warn!("Failed to release current HP: {:#}", e);
                }
                let message = format!("{}'s immunity wore off.", request.viewer);
                self.messenger.send_message(&message);
                EffectResponse::new(request.id, EffectStatus::Finished).with_message(message)
            }
            _ => EffectResponse::new(request.id, EffectStatus::Finished),
        }
    }

    /// Expire timed effects whose deadline is at or before `now`.
    pub fn tick(&self, now: Instant) -> Vec<EffectResponse> {
        self.timers
            .take_expired(now)
            .into_iter()
            .map(|effect| self.stop_effect(&effect.request))
            .collect()
    }

    /// Serve a host data request for one of the known fields.
    pub fn request_data(&self, key: &str) -> DataResponse {
        let field = addresses::DATA_FIELDS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, field)| *field);
        let Some(field) = field else {
            return DataResponse {
                key: key.to_string(),
                value: None,
                success: false,
                message: Some(format!("Variable name \"{}\" not known", key)),
            };
        };

        let value = match field.width {
            Width::Byte => self.memory.read8(field.address).map(u32::from),
            Width::Half => self.memory.read16(field.address).map(u32::from),
            Width::Word => self.memory.read32(field.address),
        };
        match value {
            Ok(value) => DataResponse {
                key: key.to_string(),
                value: Some(value),
                success: true,
                message: None,
            },
            Err(e) => DataResponse {
                key: key.to_string(),
                value: None,
                success: false,
                message: Some(format!("{:#}", e)),
            },
        }
    }

    /// Stop accepting work, cancel running effects and release every pin.
    ///
    /// Returns the `Finished` responses of the timed effects that were cut short.
    pub fn shutdown(&self) -> Vec<EffectResponse> {
        if self.cancel.is_cancelled() && self.timers.is_empty() {
            return Vec::new();
        }
        log::info!("Shutting down effect pack");
        self.cancel.cancel();
        self.timers
            .drain()
            .into_iter()
            .map(|effect| self.stop_effect(&effect.request))
            .collect()
    }
}

impl Drop for EffectPack {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn weather_message(viewer: &str, weather: Weather) -> String {
    format!("{} changed the weather to {}.", viewer, weather)
}
