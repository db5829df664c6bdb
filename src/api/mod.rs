//! REST API layer: DTOs, handlers and the router

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::AppState;
pub use router::create_api_router;
