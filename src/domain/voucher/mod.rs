//! Voucher aggregate

pub mod model;

pub use model::{Voucher, VoucherKind};
