//! Simulated GBA Work RAM
//!
//! An in-process [`MemoryConnector`] used by the CLI simulator and by tests.
//! It models the two regions the effect pack touches:
//! - **0x00000000 - 0x00003FFF**: low system area (16KB), holds the status byte
//! - **0x02000000 - 0x0203FFFF**: on-board work RAM (256KB)
//!
//! Values are little-endian like the real hardware. Pinned addresses are
//! re-applied after every write, so a frozen field always reads back its
//! pinned value until it is released.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::MemoryConnector;

const LOW_BASE: u32 = 0x0000_0000;
const LOW_SIZE: usize = 16 * 1024;
const EWRAM_BASE: u32 = 0x0200_0000;
const EWRAM_SIZE: usize = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pin {
    Byte(u8),
    Half(u16),
}

#[derive(Debug)]
struct Inner {
    low: Vec<u8>,
    ewram: Vec<u8>,
    pins: HashMap<u32, Pin>,
    writes: u64,
}

impl Inner {
    /// Translate a bus address to a byte slot.
    #[inline]
    fn slot(&mut self, address: u32) -> Result<&mut u8> {
        let low_end = LOW_BASE + LOW_SIZE as u32;
        let ewram_end = EWRAM_BASE + EWRAM_SIZE as u32;
        if (LOW_BASE..low_end).contains(&address) {
            Ok(&mut self.low[(address - LOW_BASE) as usize])
        } else if (EWRAM_BASE..ewram_end).contains(&address) {
            Ok(&mut self.ewram[(address - EWRAM_BASE) as usize])
        } else {
            anyhow::bail!("Unmapped address: 0x{:08X}", address);
        }
    }

    fn load(&mut self, address: u32, len: u32) -> Result<u32> {
        let mut value = 0u32;
        for i in 0..len {
            let byte = *self.slot(address.wrapping_add(i))?;
            value |= (byte as u32) << (8 * i);
        }
        Ok(value)
    }

    fn store(&mut self, address: u32, len: u32, value: u32) -> Result<()> {
        // Check the whole range first so a failed store leaves memory untouched.
        for i in 0..len {
            self.slot(address.wrapping_add(i))?;
        }
        for i in 0..len {
            *self.slot(address.wrapping_add(i))? = (value >> (8 * i)) as u8;
        }
        Ok(())
    }

    fn apply_pins(&mut self) -> Result<()> {
        let pins: Vec<(u32, Pin)> = self.pins.iter().map(|(a, p)| (*a, *p)).collect();
        for (address, pin) in pins {
            match pin {
                Pin::Byte(v) => self.store(address, 1, v as u32)?,
                Pin::Half(v) => self.store(address, 2, v as u32)?,
            }
        }
        Ok(())
    }

    fn write(&mut self, address: u32, len: u32, value: u32) -> Result<()> {
        self.store(address, len, value)?;
        self.writes += 1;
        self.apply_pins()
    }
}

/// Simulated memory connector.
#[derive(Debug)]
pub struct SimulatedWram {
    inner: Mutex<Inner>,
}

impl SimulatedWram {
    /// Create zeroed memory with no pins.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                low: vec![0u8; LOW_SIZE],
                ewram: vec![0u8; EWRAM_SIZE],
                pins: HashMap::new(),
                writes: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of write calls made through the connector interface.
    pub fn write_count(&self) -> u64 {
        self.lock().writes
    }

    /// Whether `address` is currently pinned.
    pub fn is_frozen(&self, address: u32) -> bool {
        self.lock().pins.contains_key(&address)
    }

    /// Number of pinned addresses.
    pub fn frozen_count(&self) -> usize {
        self.lock().pins.len()
    }

    /// Copy raw bytes in, bypassing the write counter. Pins still win.
    pub fn load_bytes(&self, address: u32, data: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        for (i, byte) in data.iter().enumerate() {
            *inner.slot(address.wrapping_add(i as u32))? = *byte;
        }
        inner.apply_pins()
    }
}

impl Default for SimulatedWram {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConnector for SimulatedWram {
    fn read8(&self, address: u32) -> Result<u8> {
        Ok(self.lock().load(address, 1)? as u8)
    }

    fn read16(&self, address: u32) -> Result<u16> {
        Ok(self.lock().load(address, 2)? as u16)
    }

    fn read32(&self, address: u32) -> Result<u32> {
        self.lock().load(address, 4)
    }

    fn write8(&self, address: u32, value: u8) -> Result<()> {
        self.lock().write(address, 1, value as u32)
    }

    fn write16(&self, address: u32, value: u16) -> Result<()> {
        self.lock().write(address, 2, value as u32)
    }

    fn write32(&self, address: u32, value: u32) -> Result<()> {
        self.lock().write(address, 4, value)
    }

    fn freeze8(&self, address: u32, value: u8) -> Result<bool> {
        let mut inner = self.lock();
        inner
            .store(address, 1, value as u32)
            .with_context(|| format!("freeze8 0x{:08X}", address))?;
        inner.pins.insert(address, Pin::Byte(value));
        Ok(true)
    }

    fn freeze16(&self, address: u32, value: u16) -> Result<bool> {
        let mut inner = self.lock();
        inner
            .store(address, 2, value as u32)
            .with_context(|| format!("freeze16 0x{:08X}", address))?;
        inner.pins.insert(address, Pin::Half(value));
        Ok(true)
    }

    fn unfreeze(&self, address: u32) -> Result<()> {
        self.lock().pins.remove(&address);
        Ok(())
    }
}
