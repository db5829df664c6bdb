//! Application services

pub mod availability;
pub mod booking;
pub mod expiry;
pub mod payment;
pub mod refund;
pub mod voucher;

pub use availability::SlotAvailabilityResolver;
pub use booking::{BookingService, CreateBookingCommand};
pub use expiry::start_booking_expiry_task;
pub use payment::{
    CallbackStatus, GatewayCallback, PaymentOrchestrator, SettlementOutcome,
};
pub use refund::{Eligibility, ProcessRefundCommand, RefundResult, RefundService};
pub use voucher::{VoucherCheck, VoucherValidator};
