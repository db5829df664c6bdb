//! API DTOs

pub mod booking;
pub mod common;
pub mod payment;
pub mod refund;
pub mod slot;
pub mod voucher;

pub use booking::{
    BookingDto, CancelBookingRequest, CancelBookingResponse, CreateBookingRequest,
    CreateBookingResponse, CustomerDto,
};
pub use common::ApiResponse;
pub use payment::{GatewayCallbackRequest, GatewayCallbackResponse};
pub use refund::{RefundRequest, RefundResponse};
pub use slot::{SlotDto, SlotsQuery};
pub use voucher::{ValidateVoucherRequest, ValidateVoucherResponse, VoucherSummaryDto};
