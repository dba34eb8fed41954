//! Counter store error types.

use thiserror::Error;

use crate::counter::SlotId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("value {value} does not fit in {size_bytes}-byte slot {slot}")]
    Overflow {
        slot: SlotId,
        value: u64,
        size_bytes: usize,
    },

    #[error("slot size {0} not supported (1..=8 bytes)")]
    InvalidSize(usize),
}
