//! Test Utilities
//!
//! Builds an effect pack over simulated memory with a recording messenger,
//! plus helpers for seeding fields and reading them back. [`FaultyMemory`]
//! wraps the simulated memory to inject connector failures and delays.
#![allow(dead_code)]

use anyhow::{bail, Result};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rescue_effects_core::config::LevelUpTiming;
use rescue_effects_core::host::LocalBidWar;
use rescue_effects_core::memory::addresses::{CURRENT_HP, FLOOR, MAX_HP, MONEY, STATUS};
use rescue_effects_core::{
    EffectPack, EffectRequest, MemoryConnector, PackConfig, RecordingMessenger, SimulatedWram,
};

/// Failures and delays injected by [`FaultyMemory`].
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Reads of this address fail.
    pub read_error: Option<u32>,
    /// Writes to this address fail.
    pub write_error: Option<u32>,
    /// Every freeze reports that the pin did not take hold.
    pub refuse_freeze: bool,
    /// Reads of this address sleep first.
    pub slow_read: Option<(u32, Duration)>,
}

/// Connector over [`SimulatedWram`] that misbehaves on request.
pub struct FaultyMemory {
    inner: Arc<SimulatedWram>,
    faults: Faults,
}

impl FaultyMemory {
    pub fn new(inner: Arc<SimulatedWram>, faults: Faults) -> Self {
        Self { inner, faults }
    }

    fn before_read(&self, address: u32) -> Result<()> {
        if let Some((slow, delay)) = self.faults.slow_read {
            if slow == address {
                thread::sleep(delay);
            }
        }
        if self.faults.read_error == Some(address) {
            bail!("injected read failure at 0x{:08X}", address);
        }
        Ok(())
    }

    fn before_write(&self, address: u32) -> Result<()> {
        if self.faults.write_error == Some(address) {
            bail!("injected write failure at 0x{:08X}", address);
        }
        Ok(())
    }
}

impl MemoryConnector for FaultyMemory {
    fn read8(&self, address: u32) -> Result<u8> {
        self.before_read(address)?;
        self.inner.read8(address)
    }

    fn read16(&self, address: u32) -> Result<u16> {
        self.before_read(address)?;
        self.inner.read16(address)
    }

    fn read32(&self, address: u32) -> Result<u32> {
        self.before_read(address)?;
        self.inner.read32(address)
    }

    fn write8(&self, address: u32, value: u8) -> Result<()> {
        self.before_write(address)?;
        self.inner.write8(address, value)
    }

    fn write16(&self, address: u32, value: u16) -> Result<()> {
        self.before_write(address)?;
        self.inner.write16(address, value)
    }

    fn write32(&self, address: u32, value: u32) -> Result<()> {
        self.before_write(address)?;
        self.inner.write32(address, value)
    }

    fn freeze8(&self, address: u32, value: u8) -> Result<bool> {
        if self.faults.refuse_freeze {
            return Ok(false);
        }
        self.inner.freeze8(address, value)
    }

    fn freeze16(&self, address: u32, value: u16) -> Result<bool> {
        if self.faults.refuse_freeze {
            return Ok(false);
        }
        self.inner.freeze16(address, value)
    }

    fn unfreeze(&self, address: u32) -> Result<()> {
        self.inner.unfreeze(address)
    }
}

pub struct Harness {
    /// Backing memory; reads and writes here bypass injected faults.
    pub wram: Arc<SimulatedWram>,
    pub messenger: Arc<RecordingMessenger>,
    pub bid_war: Arc<LocalBidWar>,
    pub pack: EffectPack,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PackConfig::default())
    }

    pub fn with_config(config: PackConfig) -> Self {
        let wram = Arc::new(SimulatedWram::new());
        Self::build(wram.clone(), wram, config)
    }

    /// Pack whose connector injects `faults` in front of the simulated memory.
    pub fn with_faults(faults: Faults) -> Self {
        let wram = Arc::new(SimulatedWram::new());
        let memory = Arc::new(FaultyMemory::new(wram.clone(), faults));
        Self::build(wram, memory, PackConfig::default())
    }

    fn build(wram: Arc<SimulatedWram>, memory: Arc<dyn MemoryConnector>, config: PackConfig) -> Self {
        let messenger = Arc::new(RecordingMessenger::new());
        let bid_war = Arc::new(LocalBidWar::new());
        let pack = EffectPack::new(memory, messenger.clone(), config).with_bid_war(bid_war.clone());
        Self {
            wram,
            messenger,
            bid_war,
            pack,
        }
    }

    /// Seed the usual in-dungeon state without counting writes.
    pub fn seeded(floor: u8, money: u32, current_hp: u8, max_hp: u32) -> Self {
        let harness = Self::new();
        harness.seed(floor, money, current_hp, max_hp);
        harness
    }

    pub fn seed(&self, floor: u8, money: u32, current_hp: u8, max_hp: u32) {
        self.wram.load_bytes(FLOOR.address, &[floor]).unwrap();
        self.wram.load_bytes(MONEY.address, &money.to_le_bytes()).unwrap();
        self.wram.load_bytes(CURRENT_HP.address, &[current_hp]).unwrap();
        self.wram.load_bytes(MAX_HP.address, &max_hp.to_le_bytes()).unwrap();
    }

    pub fn set_status(&self, status: u8) {
        self.wram.load_bytes(STATUS.address, &[status]).unwrap();
    }

    pub fn floor(&self) -> u8 {
        self.wram.read8(FLOOR.address).unwrap()
    }

    pub fn money(&self) -> u32 {
        self.wram.read32(MONEY.address).unwrap()
    }

    pub fn max_hp(&self) -> u32 {
        self.wram.read32(MAX_HP.address).unwrap()
    }

    pub fn current_hp(&self) -> u8 {
        self.wram.read8(CURRENT_HP.address).unwrap()
    }
}

/// Request from a fixed viewer.
pub fn request(id: u64, code: &str) -> EffectRequest {
    EffectRequest::new(id, "Ash", code)
}

/// Level-up timing short enough for tests.
pub fn fast_level_up() -> LevelUpTiming {
    LevelUpTiming {
        poll_interval_ms: 1,
        step_timeout_ms: 50,
        turn_timeout_ms: 50,
    }
}
