//! # Courtbook Reservation Engine
//!
//! Slot reservation and settlement engine for sports venues.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, state machines and errors
//! - **application**: Services orchestrating availability, bookings, payments and refunds
//! - **infrastructure**: External concerns (storage, payment gateway)
//! - **api**: REST API with Swagger documentation
//! - **shared**: Cross-cutting utilities (shutdown signalling)

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export storage types for easy access
pub use infrastructure::{InMemoryStorage, Storage};

// Re-export API router
pub use api::create_api_router;
