//! Counter store capability traits.
//!
//! A [`CounterStore`] hands out durable integer counters addressed by
//! numeric slot ids. Opening a slot creates its fixed-size region if it
//! does not exist yet, and a region that has never been written reads as
//! zero. Resetting a counter deletes the region, so the next open starts
//! from a clean slate. Slots are independent and never alias.

use crate::error::StoreError;

/// Identifies one durable counter slot.
pub type SlotId = u32;

/// A durable integer store addressed by numeric slot ids.
pub trait CounterStore: Send + Sync {
    /// Open (creating if absent) the counter in `slot`, sized `size_bytes`.
    fn open(&self, slot: SlotId, size_bytes: usize) -> Result<Box<dyn Counter>, StoreError>;
}

/// One open counter region.
pub trait Counter: Send {
    /// Current value. A fresh or zero-filled region reads 0.
    fn read(&self) -> Result<u64, StoreError>;

    /// Overwrite the value. Must fit the region width.
    fn write(&mut self, value: u64) -> Result<(), StoreError>;

    /// Delete the backing region and consume the handle. A subsequent
    /// open of the same slot recreates a zeroed region.
    fn reset(self: Box<Self>) -> Result<(), StoreError>;

    /// Read-modify-write increment; returns the new value.
    ///
    /// Not atomic against a crash between read and write; at most one
    /// increment is lost.
    fn increment(&mut self) -> Result<u64, StoreError> {
        let next = self.read()? + 1;
        self.write(next)?;
        Ok(next)
    }
}
