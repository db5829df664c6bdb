//! Booking aggregate
//!
//! Contains the Booking entity and its lifecycle state machine.

pub mod model;

pub use model::{Booking, BookingStatus, PaymentMethod, PaymentStatus};
