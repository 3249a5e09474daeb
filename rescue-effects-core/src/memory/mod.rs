//! Emulator Memory Access
//!
//! The effect pack never owns emulator memory. Every read, write and freeze goes
//! through a [`MemoryConnector`] supplied by the host, which talks to the
//! running emulator. All addresses are absolute GBA bus addresses
//! (EWRAM lives at `0x0200_0000`).
//!
//! # Range-add
//! Connectors only have to provide the width-specific primitives. The
//! range-add operations have default implementations built on top of them:
//! read, add a signed delta, clamp (or wrap) into `[min, max]`, write back.
//! A result is never allowed to overflow the field's native width.
//!
//! # Freezing
//! A frozen address is continuously overwritten with a fixed value by the
//! connector until [`MemoryConnector::unfreeze`] is called. The pack uses this
//! for timed effects such as immunity and for taking over player input.

pub mod addresses;
pub mod wram;

use anyhow::{Context, Result};

pub use addresses::{MemoryAddress, Width};
pub use wram::SimulatedWram;

/// Memory access capability provided by the host connector.
pub trait MemoryConnector: Send + Sync {
    fn read8(&self, address: u32) -> Result<u8>;
    fn read16(&self, address: u32) -> Result<u16>;
    fn read32(&self, address: u32) -> Result<u32>;

    fn write8(&self, address: u32, value: u8) -> Result<()>;
    fn write16(&self, address: u32, value: u16) -> Result<()>;
    fn write32(&self, address: u32, value: u32) -> Result<()>;

    /// Pin an 8-bit address to `value`. Returns whether the pin took hold.
    fn freeze8(&self, address: u32, value: u8) -> Result<bool>;

    /// Pin a 16-bit address to `value`. Returns whether the pin took hold.
    fn freeze16(&self, address: u32, value: u16) -> Result<bool>;

    /// Release a pin. Releasing an address that is not pinned is a no-op.
    fn unfreeze(&self, address: u32) -> Result<()>;

    /// Add `delta` to an 8-bit field, keeping the result in `[min, max]`.
    ///
    /// Returns `true` if the stored value changed.
    fn range_add8(&self, address: u32, delta: i64, min: u8, max: u8, wrap: bool) -> Result<bool> {
        let current = self
            .read8(address)
            .with_context(|| format!("range_add8 read 0x{:08X}", address))?;
        let next = bounded_add(current as i64, delta, min as i64, max as i64, wrap) as u8;
        if next != current {
            self.write8(address, next)
                .with_context(|| format!("range_add8 write 0x{:08X}", address))?;
        }
        Ok(next != current)
    }

    /// Add `delta` to a 32-bit field, keeping the result in `[min, max]`.
    ///
    /// Returns `true` if the stored value changed.
    fn range_add32(&self, address: u32, delta: i64, min: u32, max: u32, wrap: bool) -> Result<bool> {
        let current = self
            .read32(address)
            .with_context(|| format!("range_add32 read 0x{:08X}", address))?;
        let next = bounded_add(current as i64, delta, min as i64, max as i64, wrap) as u32;
        if next != current {
            self.write32(address, next)
                .with_context(|| format!("range_add32 write 0x{:08X}", address))?;
        }
        Ok(next != current)
    }
}

/// Add `delta` to `value` and bring the result into `[min, max]`.
///
/// With `wrap` the result wraps around the range, otherwise it saturates at
/// the nearest bound. A current value that is already outside the range is
/// treated the same way.
pub fn bounded_add(value: i64, delta: i64, min: i64, max: i64, wrap: bool) -> i64 {
    debug_assert!(min <= max);
    let raw = value.saturating_add(delta);
    if wrap {
        let span = max - min + 1;
        min + (raw - min).rem_euclid(span)
    } else {
        raw.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_add_saturates() {
        assert_eq!(bounded_add(5, -10, 0, 99, false), 0);
        assert_eq!(bounded_add(5000, 9999, 0, 9999, false), 9999);
        assert_eq!(bounded_add(40, 9, 0, 99, false), 49);
    }

    #[test]
    fn test_bounded_add_wraps() {
        assert_eq!(bounded_add(98, 3, 0, 99, true), 1);
        assert_eq!(bounded_add(1, -3, 0, 99, true), 98);
    }

    #[test]
    fn test_bounded_add_pulls_out_of_range_value_back() {
        assert_eq!(bounded_add(1200, 1, 0, 999, false), 999);
    }
}
