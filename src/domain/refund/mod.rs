//! Refund aggregate

pub mod model;

pub use model::{ActorRole, Refund, RefundOutcome, RefundType};
