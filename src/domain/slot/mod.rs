//! Slot aggregate

pub mod model;

pub use model::{Slot, SlotStatus};
