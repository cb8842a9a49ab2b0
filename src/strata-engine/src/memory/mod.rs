//! Memory accounting for execution.

mod manager;

pub use manager::{MemoryManager, MemoryReservation, TrackingMemoryManager};
