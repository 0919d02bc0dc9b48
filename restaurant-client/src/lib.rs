//! Restaurant Client - HTTP client for the reservation server
//!
//! Typed wrappers for every REST endpoint. Failures carry the server's message
//! verbatim; every call accepts a cancellation token and falls back to an empty
//! value when cancelled.

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::ApiResponse;
pub use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, Reservation, ReservationCreate,
    ReservationQuery, ReservationStatus,
};
pub use tokio_util::sync::CancellationToken;
