//! Core business entities and types

pub mod booking;
pub mod error;
pub mod refund;
pub mod slot;
pub mod venue;
pub mod voucher;

// Re-export commonly used types
pub use booking::{Booking, BookingStatus, PaymentMethod, PaymentStatus};
pub use error::{DomainError, DomainResult};
pub use refund::{ActorRole, Refund, RefundOutcome, RefundType};
pub use slot::{Slot, SlotStatus};
pub use venue::{DepositPolicy, Venue};
pub use voucher::{Voucher, VoucherKind};
