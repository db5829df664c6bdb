//! Business logic and use cases

pub mod services;

pub use services::{
    BookingService, CreateBookingCommand, PaymentOrchestrator, ProcessRefundCommand,
    RefundService, SlotAvailabilityResolver, VoucherValidator,
};
