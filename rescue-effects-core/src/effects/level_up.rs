//! Level-up by menu automation.
//!
//! Writing the level field does not raise stats; the player has to level up
//! through the game itself. This driver takes over input and walks the menus
//! so the leader eats a leveling item.
//!
//! Each step pins an input or menu field, waits until the field reads back
//! the pinned value, and holds it for one poll interval so the game sees it
//! for at least a frame. Every pin is released on every exit path.

use std::time::Instant;

use crate::config::LevelUpTiming;
use crate::error::{EffectError, EffectResult};
use crate::host::CancellationToken;
use crate::memory::addresses::{CAN_GO, INPUT, MENU_INPUT_1, MENU_INPUT_2, MENU_LOCATION};
use crate::memory::{MemoryAddress, MemoryConnector};

/// One pinned write in the menu script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuStep {
    pub label: &'static str,
    pub target: MemoryAddress,
    pub value: u16,
}

const fn step(label: &'static str, target: MemoryAddress, value: u16) -> MenuStep {
    MenuStep {
        label,
        target,
        value,
    }
}

const BUTTON_A: u16 = 1;
const BUTTON_RIGHT: u16 = 32;
const BUTTON_START: u16 = 2;

/// Open menu, move to the item, select it, confirm eating it.
pub const LEVEL_UP_SCRIPT: &[MenuStep] = &[
    step("open menu", MENU_INPUT_1, BUTTON_START),
    step("release menu button", MENU_INPUT_1, 0),
    step("focus items", MENU_LOCATION, 1),
    step("enter items", MENU_INPUT_2, BUTTON_A),
    step("release A", MENU_INPUT_2, 0),
    step("move to item", MENU_INPUT_2, BUTTON_RIGHT),
    step("release right", MENU_INPUT_2, 0),
    step("select item", MENU_LOCATION, 0),
    step("open item actions", MENU_INPUT_2, BUTTON_A),
    step("release A", MENU_INPUT_2, 0),
    step("focus eat", MENU_LOCATION, 1),
    step("confirm eat", MENU_INPUT_2, BUTTON_A),
];

/// Fields held at zero so the player cannot interfere.
const LOCKED_INPUTS: [MemoryAddress; 3] = [MENU_INPUT_1, MENU_INPUT_2, INPUT];

/// Releases every pin it took when dropped.
struct Pins<'a> {
    memory: &'a dyn MemoryConnector,
    addresses: Vec<u32>,
}

impl<'a> Pins<'a> {
    fn new(memory: &'a dyn MemoryConnector) -> Self {
        Self {
            memory,
            addresses: Vec::new(),
        }
    }

    fn pin(&mut self, target: MemoryAddress, value: u16) -> EffectResult<()> {
        if !self.addresses.contains(&target.address) {
            self.addresses.push(target.address);
        }
        if !self.memory.freeze16(target.address, value)? {
            return Err(anyhow::anyhow!("freeze refused for {}", target).into());
        }
        Ok(())
    }
}

impl Drop for Pins<'_> {
    fn drop(&mut self) {
        for address in self.addresses.drain(..) {
            if let Err(e) = self.memory.unfreeze(address) {
                log::warn!("Failed to release 0x{:08X}: {:#}", address, e);
            }
        }
    }
}

pub struct LevelUpDriver<'a> {
    memory: &'a dyn MemoryConnector,
    timing: &'a LevelUpTiming,
    cancel: &'a CancellationToken,
}

impl<'a> LevelUpDriver<'a> {
    pub fn new(
        memory: &'a dyn MemoryConnector,
        timing: &'a LevelUpTiming,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            memory,
            timing,
            cancel,
        }
    }

    pub fn run(&self) -> EffectResult<()> {
        let mut pins = Pins::new(self.memory);
        for target in LOCKED_INPUTS {
            pins.pin(target, 0)?;
        }

        self.wait_until("player turn", self.timing.turn_timeout(), || {
            Ok(self.memory.read8(CAN_GO.address)? != 0)
        })?;

        for step in LEVEL_UP_SCRIPT {
            log::debug!("level up: {}", step.label);
            pins.pin(step.target, step.value)?;
            self.wait_until(step.label, self.timing.step_timeout(), || {
                Ok(self.memory.read16(step.target.address)? == step.value)
            })?;
            self.hold()?;
        }
        Ok(())
    }

    fn hold(&self) -> EffectResult<()> {
        if self.cancel.sleep(self.timing.poll_interval()) {
            Ok(())
        } else {
            Err(EffectError::Cancelled)
        }
    }

    fn wait_until(
        &self,
        step: &'static str,
        timeout: std::time::Duration,
        mut reached: impl FnMut() -> anyhow::Result<bool>,
    ) -> EffectResult<()> {
        let started = Instant::now();
        loop {
            if self.cancel.is_cancelled() {
                return Err(EffectError::Cancelled);
            }
            if reached()? {
                return Ok(());
            }
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(EffectError::Timeout { step, waited });
            }
            self.hold()?;
        }
    }
}
