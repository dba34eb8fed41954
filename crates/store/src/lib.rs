pub mod counter;
pub mod error;
pub mod memory;
pub mod mmap;

pub use counter::{Counter, CounterStore, SlotId};
pub use error::StoreError;
pub use memory::MemoryCounterStore;
pub use mmap::MmapCounterStore;
