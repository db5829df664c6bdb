//! Venue aggregate

pub mod model;

pub use model::{DepositPolicy, Venue};
