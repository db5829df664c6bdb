//! External concerns: storage and payment gateway ports

pub mod gateway;
pub mod storage;

pub use gateway::{CustomerDetails, GatewayOrder, PaymentGateway, SandboxGateway};
pub use storage::{InMemoryStorage, Storage};
