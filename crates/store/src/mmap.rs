//! Memory-mapped counter store.
//!
//! One fixed-size file per slot under a base directory (e.g. a tmpfs
//! mount). The value is a little-endian integer occupying the whole
//! region, so a freshly created, zero-filled file reads as zero.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use memmap2::MmapMut;
use tracing::debug;

use crate::counter::{Counter, CounterStore, SlotId};
use crate::error::StoreError;

pub struct MmapCounterStore {
    base_dir: PathBuf,
}

impl MmapCounterStore {
    /// Create a store rooted at `base_dir` (created if missing).
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn slot_path(&self, slot: SlotId) -> PathBuf {
        self.base_dir.join(format!("slot-{slot}.ctr"))
    }
}

impl CounterStore for MmapCounterStore {
    fn open(&self, slot: SlotId, size_bytes: usize) -> Result<Box<dyn Counter>, StoreError> {
        if size_bytes == 0 || size_bytes > 8 {
            return Err(StoreError::InvalidSize(size_bytes));
        }

        let path = self.slot_path(slot);
        let created = !path.exists();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        file.set_len(size_bytes as u64)?;
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        if created {
            debug!(slot, size_bytes, path = %path.display(), "created counter region");
        }

        Ok(Box::new(MmapCounter { slot, path, mmap }))
    }
}

struct MmapCounter {
    slot: SlotId,
    path: PathBuf,
    mmap: MmapMut,
}

impl Counter for MmapCounter {
    fn read(&self) -> Result<u64, StoreError> {
        let mut buf = [0u8; 8];
        buf[..self.mmap.len()].copy_from_slice(&self.mmap);
        Ok(u64::from_le_bytes(buf))
    }

    fn write(&mut self, value: u64) -> Result<(), StoreError> {
        let width = self.mmap.len();
        let bytes = value.to_le_bytes();
        if bytes[width..].iter().any(|b| *b != 0) {
            return Err(StoreError::Overflow {
                slot: self.slot,
                value,
                size_bytes: width,
            });
        }
        self.mmap.copy_from_slice(&bytes[..width]);
        self.mmap.flush()?;
        Ok(())
    }

    fn reset(self: Box<Self>) -> Result<(), StoreError> {
        let MmapCounter { slot, path, mmap } = *self;
        drop(mmap);
        fs::remove_file(&path)?;
        debug!(slot, path = %path.display(), "counter region deleted");
        Ok(())
    }
}
