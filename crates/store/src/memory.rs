//! In-memory counter store.
//!
//! Same contract as the mmap backend without touching the filesystem.
//! Clones share the underlying slot map, so a test can hand one clone to
//! the engine and inspect counters through another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::counter::{Counter, CounterStore, SlotId};
use crate::error::StoreError;

type SlotMap = Arc<Mutex<HashMap<SlotId, Vec<u8>>>>;

#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    slots: SlotMap,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    fn open(&self, slot: SlotId, size_bytes: usize) -> Result<Box<dyn Counter>, StoreError> {
        if size_bytes == 0 || size_bytes > 8 {
            return Err(StoreError::InvalidSize(size_bytes));
        }

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(slot)
            .or_insert_with(|| vec![0; size_bytes])
            .resize(size_bytes, 0);

        Ok(Box::new(MemoryCounter {
            slot,
            size_bytes,
            slots: self.slots.clone(),
        }))
    }
}

struct MemoryCounter {
    slot: SlotId,
    size_bytes: usize,
    slots: SlotMap,
}

impl Counter for MemoryCounter {
    fn read(&self) -> Result<u64, StoreError> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut buf = [0u8; 8];
        // A slot removed behind our back reads as a fresh region.
        if let Some(region) = slots.get(&self.slot) {
            buf[..region.len()].copy_from_slice(region);
        }
        Ok(u64::from_le_bytes(buf))
    }

    fn write(&mut self, value: u64) -> Result<(), StoreError> {
        let bytes = value.to_le_bytes();
        if bytes[self.size_bytes..].iter().any(|b| *b != 0) {
            return Err(StoreError::Overflow {
                slot: self.slot,
                value,
                size_bytes: self.size_bytes,
            });
        }
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let region = slots
            .entry(self.slot)
            .or_insert_with(|| vec![0; self.size_bytes]);
        region.resize(self.size_bytes, 0);
        region.copy_from_slice(&bytes[..self.size_bytes]);
        Ok(())
    }

    fn reset(self: Box<Self>) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(&self.slot);
        Ok(())
    }
}
