//! Shared types for the restaurant reservation workspace
//!
//! Common types used by the server and the client: domain models, the
//! unified error system, the service-hours time types and the request/response
//! envelopes.

pub mod error;
pub mod models;
pub mod request;
pub mod schedule;
pub mod serde_helpers;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use request::DataEnvelope;
pub use schedule::{ServiceHours, ServiceSlot, SlotError};
